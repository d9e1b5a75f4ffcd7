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

use std::marker::PhantomData;

use alloy_primitives::Address;
use alloy_provider::Provider as AlloyProvider;
use alloy_transport::Transport;

use crate::{PaymasterProvider, ProviderResult, RpcUserOperation, SponsorUserOperationResult};

/// Paymaster provider implementation over a raw alloy JSON-RPC client
#[derive(Clone)]
pub(crate) struct AlloyPaymasterProvider<AP, T> {
    inner: AP,
    _marker: PhantomData<T>,
}

impl<AP, T> AlloyPaymasterProvider<AP, T> {
    /// Create a new `AlloyPaymasterProvider`
    pub(crate) fn new(inner: AP) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }
}

#[async_trait::async_trait]
impl<AP, T> PaymasterProvider for AlloyPaymasterProvider<AP, T>
where
    T: Transport + Clone,
    AP: AlloyProvider<T> + 'static,
{
    async fn sponsor_user_operation(
        &self,
        op: &RpcUserOperation,
        entry_point: Address,
    ) -> ProviderResult<SponsorUserOperationResult> {
        Ok(self
            .inner
            .raw_request("pm_sponsorUserOperation".into(), (op.clone(), entry_point))
            .await?)
    }
}
