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

//! Receipt collection and the final tally.

use std::{fmt, time::Duration};

use alloy_primitives::B256;
use futures::future;
use opcannon_provider::BundlerProvider;
use tokio::time;
use tracing::{info, warn};

/// Final tally of a run.
///
/// A missing receipt counts as a failure, the same as a mined-but-reverted
/// operation. The two cases are only distinguished in the per-receipt log
/// lines.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Report {
    /// Operations with a receipt reporting success
    pub success_count: usize,
    /// Everything else: reverted, not mined, or query failed
    pub failure_count: usize,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Successful operations: {}, Failed operations: {}",
            self.success_count, self.failure_count
        )
    }
}

/// Wait `delay` for mining, then query the receipt of every hash
/// concurrently and tally the outcomes. Each hash is queried exactly once;
/// nothing is retried.
pub(crate) async fn collect_receipts<B: BundlerProvider>(
    bundler: &B,
    hashes: &[B256],
    delay: Duration,
) -> Report {
    time::sleep(delay).await;

    let results = future::join_all(hashes.iter().map(|&hash| async move {
        (hash, bundler.get_user_operation_receipt(hash).await)
    }))
    .await;

    let mut report = Report::default();
    for (hash, result) in results {
        match result {
            Ok(Some(receipt)) if receipt.success => {
                info!(
                    %hash,
                    actual_gas_cost = %receipt.actual_gas_cost,
                    logs = receipt.logs.len(),
                    "user operation succeeded"
                );
                report.success_count += 1;
            }
            Ok(Some(receipt)) => {
                info!(%hash, reason = %receipt.reason, "user operation reverted");
                report.failure_count += 1;
            }
            Ok(None) => {
                info!(%hash, "no receipt found");
                report.failure_count += 1;
            }
            Err(error) => {
                warn!(%hash, "receipt query failed: {error:?}");
                report.failure_count += 1;
            }
        }
    }
    report
}
