// This file is part of Opcannon.
//
// Opcannon is free software: you can redistribute it and/or modify it under the
// terms of the GNU Lesser General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later version.
//
// Opcannon is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with Opcannon.
// If not, see https://www.gnu.org/licenses/.

//! Trait for interacting with a sponsoring paymaster service.

use alloy_primitives::Address;
#[cfg(feature = "test-utils")]
use mockall::automock;

use super::error::ProviderResult;
use crate::types::{RpcUserOperation, SponsorUserOperationResult};

/// Trait for interacting with a sponsoring paymaster service.
#[cfg_attr(feature = "test-utils", automock)]
#[async_trait::async_trait]
pub trait PaymasterProvider: Send + Sync + 'static {
    /// Request sponsorship for a not-yet-signed user operation. The result
    /// carries the paymaster fields and the gas limits the paymaster
    /// validated against.
    async fn sponsor_user_operation(
        &self,
        op: &RpcUserOperation,
        entry_point: Address,
    ) -> ProviderResult<SponsorUserOperationResult>;
}
