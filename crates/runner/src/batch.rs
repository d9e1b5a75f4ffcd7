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

//! Concurrent construction of the pending operation batch.
//!
//! Failure policy: all-or-nothing. Any single account setup failure aborts
//! the whole batch.

use anyhow::Context;
use futures::future;
use opcannon_account::build_signed_user_operation;
use opcannon_provider::{BundlerProvider, EvmProvider, PaymasterProvider};
use opcannon_types::{ChainSpec, UserOperation};
use tracing::info;

/// Build `count` signed user operations concurrently, each from its own
/// fresh smart account.
pub(crate) async fn build_batch<E, B, P>(
    count: usize,
    chain_spec: &ChainSpec,
    evm: &E,
    bundler: &B,
    paymaster: &P,
) -> anyhow::Result<Vec<UserOperation>>
where
    E: EvmProvider,
    B: BundlerProvider,
    P: PaymasterProvider,
{
    let ops = future::try_join_all(
        (0..count).map(|_| build_signed_user_operation(chain_spec, evm, bundler, paymaster)),
    )
    .await
    .context("account setup failed, aborting batch")?;
    info!("built {} user operations", ops.len());
    Ok(ops)
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{Address, U128, U256};
    use alloy_sol_types::{SolCall, SolValue};
    use opcannon_provider::{
        GasPriceFees, MockBundlerProvider, MockEvmProvider, MockPaymasterProvider,
        SponsorUserOperationResult, UserOperationGasPrice,
    };
    use opcannon_types::contracts::ISimpleAccountFactory;

    use super::*;

    fn mock_evm() -> MockEvmProvider {
        let mut evm = MockEvmProvider::new();
        evm.expect_call().returning(|tx, _| {
            let input = tx.input.input().expect("call should have input");
            if input.starts_with(&ISimpleAccountFactory::getAddressCall::SELECTOR) {
                Ok(Address::from_slice(&input[16..36]).abi_encode().into())
            } else {
                Ok(U256::ZERO.abi_encode().into())
            }
        });
        evm
    }

    fn mock_bundler() -> MockBundlerProvider {
        let mut bundler = MockBundlerProvider::new();
        bundler.expect_get_user_operation_gas_price().returning(|| {
            let fees = GasPriceFees {
                max_fee_per_gas: U128::from(400),
                max_priority_fee_per_gas: U128::from(200),
            };
            Ok(UserOperationGasPrice {
                slow: fees,
                standard: fees,
                fast: fees,
            })
        });
        bundler
    }

    fn mock_paymaster() -> MockPaymasterProvider {
        let mut paymaster = MockPaymasterProvider::new();
        paymaster.expect_sponsor_user_operation().returning(|_, _| {
            Ok(SponsorUserOperationResult {
                paymaster: Address::repeat_byte(3),
                paymaster_data: vec![0xa1, 0xb2].into(),
                paymaster_verification_gas_limit: U128::from(60_000),
                paymaster_post_op_gas_limit: U128::from(70_000),
                pre_verification_gas: U256::from(50_000),
                verification_gas_limit: U128::from(200_000),
                call_gas_limit: U128::from(100_000),
            })
        });
        paymaster
    }

    #[tokio::test]
    async fn test_builds_n_distinct_operations() {
        let chain_spec = ChainSpec::base_sepolia();
        let ops = build_batch(3, &chain_spec, &mock_evm(), &mock_bundler(), &mock_paymaster())
            .await
            .unwrap();

        assert_eq!(ops.len(), 3);
        let mut senders: Vec<_> = ops.iter().map(|op| op.sender).collect();
        senders.sort();
        senders.dedup();
        assert_eq!(senders.len(), 3);
    }

    #[tokio::test]
    async fn test_zero_count_builds_empty_batch() {
        let chain_spec = ChainSpec::base_sepolia();
        let ops = build_batch(0, &chain_spec, &mock_evm(), &mock_bundler(), &mock_paymaster())
            .await
            .unwrap();
        assert!(ops.is_empty());
    }

    #[tokio::test]
    async fn test_any_setup_failure_aborts_batch() {
        let chain_spec = ChainSpec::base_sepolia();
        let mut paymaster = MockPaymasterProvider::new();
        paymaster
            .expect_sponsor_user_operation()
            .returning(|_, _| Err(anyhow::anyhow!("sponsorship rejected").into()));

        let result =
            build_batch(3, &chain_spec, &mock_evm(), &mock_bundler(), &paymaster).await;
        assert!(result.is_err());
    }
}
