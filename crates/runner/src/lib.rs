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

#![warn(missing_docs, unreachable_pub)]
#![deny(unused_must_use, rust_2018_idioms)]
#![doc(test(
    no_crate_inject,
    attr(deny(warnings, rust_2018_idioms), allow(dead_code, unused_variables))
))]

//! Run orchestration.
//!
//! A run builds a batch of sponsored, signed user operations up front, then
//! watches for new blocks. The first observed block is warm-up; the second
//! triggers a jittered drain of the batch. After a fixed delay the receipts
//! are collected and tallied into a [`Report`].

use std::{sync::Arc, time::Duration};

use opcannon_provider::{BundlerProvider, EvmProvider, PaymasterProvider};
use opcannon_types::ChainSpec;
use rand::{rngs::StdRng, SeedableRng};
use tracing::info;

mod batch;
mod block_watcher;
mod collect;
mod dispatch;
mod retry;
mod trigger;

pub use collect::Report;
use trigger::{BlockTrigger, TriggerAction};

/// Tunables of a single run.
#[derive(Clone, Copy, Debug)]
pub struct Settings {
    /// Number of user operations to build and send
    pub op_count: usize,
    /// Upper bound of the random delay before each send
    pub jitter_max: Duration,
    /// How long to wait after dispatch before querying receipts
    pub receipt_delay: Duration,
    /// Block number polling interval
    pub poll_interval: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            op_count: 5,
            jitter_max: Duration::from_millis(50),
            receipt_delay: Duration::from_secs(10),
            poll_interval: Duration::from_millis(50),
        }
    }
}

/// Drives one run end to end: batch construction, block-triggered dispatch,
/// receipt collection.
pub struct Runner<E, B, P> {
    chain_spec: ChainSpec,
    settings: Settings,
    evm: E,
    bundler: Arc<B>,
    paymaster: P,
}

impl<E, B, P> Runner<E, B, P>
where
    E: EvmProvider,
    B: BundlerProvider,
    P: PaymasterProvider,
{
    /// Create a runner from its providers.
    pub fn new(
        chain_spec: ChainSpec,
        settings: Settings,
        evm: E,
        bundler: B,
        paymaster: P,
    ) -> Self {
        Self {
            chain_spec,
            settings,
            evm,
            bundler: Arc::new(bundler),
            paymaster,
        }
    }

    /// Run to completion and return the final tally.
    ///
    /// Fails only if batch construction fails. Once the batch is built,
    /// every downstream problem is absorbed into the failure count.
    pub async fn run(self) -> anyhow::Result<Report> {
        info!(
            network = self.chain_spec.name,
            ops = self.settings.op_count,
            "starting run"
        );
        let mut pending = batch::build_batch(
            self.settings.op_count,
            &self.chain_spec,
            &self.evm,
            &*self.bundler,
            &self.paymaster,
        )
        .await?;

        let mut trigger = BlockTrigger::new();
        let mut last_block = 0;
        let mut rng = StdRng::from_entropy();
        loop {
            let block = block_watcher::wait_for_new_block_number(
                &self.evm,
                last_block,
                self.settings.poll_interval,
            )
            .await;
            last_block = block;

            match trigger.on_block() {
                TriggerAction::Skip => info!(block, "skipping warm-up block"),
                TriggerAction::Dispatch => {
                    info!(block, "dispatching {} user operations", pending.len());
                    let hashes = dispatch::drain_pending(
                        &self.bundler,
                        &mut pending,
                        self.chain_spec.entry_point_address,
                        self.settings.jitter_max,
                        &mut rng,
                    )
                    .await;
                    let report = collect::collect_receipts(
                        &*self.bundler,
                        &hashes,
                        self.settings.receipt_delay,
                    )
                    .await;
                    info!("{report}");
                    return Ok(report);
                }
                TriggerAction::Ignore => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};

    use alloy_primitives::{Address, B256, U128, U256};
    use alloy_sol_types::{SolCall, SolValue};
    use opcannon_provider::{
        GasPriceFees, MockBundlerProvider, MockEvmProvider, MockPaymasterProvider,
        SponsorUserOperationResult, UserOperationGasPrice, UserOperationReceipt,
    };
    use opcannon_types::contracts::ISimpleAccountFactory;

    use super::*;

    fn mock_evm() -> MockEvmProvider {
        let blocks = AtomicU64::new(0);
        let mut evm = MockEvmProvider::new();
        evm.expect_get_block_number()
            .returning(move || Ok(blocks.fetch_add(1, Ordering::SeqCst) + 1));
        evm.expect_call().returning(|tx, _| {
            let input = tx.input.input().expect("call should have input");
            if input.starts_with(&ISimpleAccountFactory::getAddressCall::SELECTOR) {
                // echo the owner back as the account address so each
                // generated account is distinct
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
            .expect_send_user_operation()
            .returning(|_, _| Ok(B256::ZERO));
        bundler
            .expect_get_user_operation_receipt()
            .returning(|hash| {
                Ok(Some(UserOperationReceipt {
                    user_op_hash: hash,
                    entry_point: Address::repeat_byte(1),
                    sender: Address::repeat_byte(2),
                    nonce: U256::ZERO,
                    paymaster: Some(Address::repeat_byte(3)),
                    actual_gas_cost: U256::from(1000),
                    actual_gas_used: U256::from(500),
                    success: true,
                    reason: String::new(),
                    logs: vec![],
                }))
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

    #[tokio::test(start_paused = true)]
    async fn test_run_reports_all_successful() {
        let settings = Settings {
            op_count: 2,
            ..Default::default()
        };
        let runner = Runner::new(
            ChainSpec::base_sepolia(),
            settings,
            mock_evm(),
            mock_bundler(),
            mock_paymaster(),
        );

        let report = runner.run().await.unwrap();
        assert_eq!(
            report,
            Report {
                success_count: 2,
                failure_count: 0
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_with_zero_operations() {
        let mut bundler = MockBundlerProvider::new();
        bundler.expect_get_user_operation_gas_price().never();
        bundler.expect_send_user_operation().never();
        bundler.expect_get_user_operation_receipt().never();
        let mut paymaster = MockPaymasterProvider::new();
        paymaster.expect_sponsor_user_operation().never();

        let settings = Settings {
            op_count: 0,
            ..Default::default()
        };
        let runner = Runner::new(
            ChainSpec::base_sepolia(),
            settings,
            mock_evm(),
            bundler,
            paymaster,
        );

        let report = runner.run().await.unwrap();
        assert_eq!(report, Report::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_counts_missing_receipts_as_failures() {
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
            .expect_send_user_operation()
            .returning(|_, _| Ok(B256::ZERO));
        // nothing gets mined
        bundler
            .expect_get_user_operation_receipt()
            .returning(|_| Ok(None));

        let settings = Settings {
            op_count: 3,
            ..Default::default()
        };
        let runner = Runner::new(
            ChainSpec::base_sepolia(),
            settings,
            mock_evm(),
            bundler,
            mock_paymaster(),
        );

        let report = runner.run().await.unwrap();
        assert_eq!(
            report,
            Report {
                success_count: 0,
                failure_count: 3
            }
        );
    }
}
