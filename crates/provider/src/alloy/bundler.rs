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

use alloy_primitives::{Address, B256};
use alloy_provider::Provider as AlloyProvider;
use alloy_transport::Transport;
use opcannon_types::UserOperation;

use crate::{
    BundlerProvider, ProviderResult, RpcUserOperation, UserOperationGasPrice,
    UserOperationReceipt,
};

/// Bundler provider implementation over a raw alloy JSON-RPC client
#[derive(Clone)]
pub(crate) struct AlloyBundlerProvider<AP, T> {
    inner: AP,
    _marker: PhantomData<T>,
}

impl<AP, T> AlloyBundlerProvider<AP, T> {
    /// Create a new `AlloyBundlerProvider`
    pub(crate) fn new(inner: AP) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }
}

#[async_trait::async_trait]
impl<AP, T> BundlerProvider for AlloyBundlerProvider<AP, T>
where
    T: Transport + Clone,
    AP: AlloyProvider<T> + 'static,
{
    async fn send_user_operation(
        &self,
        op: &UserOperation,
        entry_point: Address,
    ) -> ProviderResult<B256> {
        let rpc_op = RpcUserOperation::from(op);
        Ok(self
            .inner
            .raw_request("eth_sendUserOperation".into(), (rpc_op, entry_point))
            .await?)
    }

    async fn get_user_operation_receipt(
        &self,
        hash: B256,
    ) -> ProviderResult<Option<UserOperationReceipt>> {
        Ok(self
            .inner
            .raw_request("eth_getUserOperationReceipt".into(), (hash,))
            .await?)
    }

    async fn get_user_operation_gas_price(&self) -> ProviderResult<UserOperationGasPrice> {
        Ok(self
            .inner
            .raw_request("pimlico_getUserOperationGasPrice".into(), [(); 0])
            .await?)
    }
}
