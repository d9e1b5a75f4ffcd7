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

//! Trait for interacting with an ERC-4337 bundler.

use alloy_primitives::{Address, B256};
#[cfg(feature = "test-utils")]
use mockall::automock;
use opcannon_types::UserOperation;

use super::error::ProviderResult;
use crate::types::{UserOperationGasPrice, UserOperationReceipt};

/// Trait for interacting with an ERC-4337 bundler.
#[cfg_attr(feature = "test-utils", automock)]
#[async_trait::async_trait]
pub trait BundlerProvider: Send + Sync + 'static {
    /// Submit a signed user operation to the bundler, returning the hash the
    /// bundler computed for it.
    async fn send_user_operation(
        &self,
        op: &UserOperation,
        entry_point: Address,
    ) -> ProviderResult<B256>;

    /// Query the receipt for a user operation hash. `None` when the
    /// operation has not been mined.
    async fn get_user_operation_receipt(
        &self,
        hash: B256,
    ) -> ProviderResult<Option<UserOperationReceipt>>;

    /// Get the gas prices the bundler will accept.
    async fn get_user_operation_gas_price(&self) -> ProviderResult<UserOperationGasPrice>;
}
