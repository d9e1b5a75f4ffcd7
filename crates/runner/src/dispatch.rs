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

//! Jittered drain of the pending operation pool.

use std::{sync::Arc, time::Duration};

use alloy_primitives::{Address, B256};
use opcannon_provider::BundlerProvider;
use opcannon_types::UserOperation;
use rand::Rng;
use tokio::time;
use tracing::{info, warn};

/// Drain the pending pool, last-in-first-out. Each iteration waits a random
/// jitter in `[0, jitter_max)`, pops one operation, records its hash, and
/// fires the send without awaiting it. The bundler's own response hash is
/// discarded in favor of the locally computed one.
///
/// Returns the hashes in send order. The hash of an operation is always
/// recorded before its send is issued.
pub(crate) async fn drain_pending<B, R>(
    bundler: &Arc<B>,
    pending: &mut Vec<UserOperation>,
    entry_point: Address,
    jitter_max: Duration,
    rng: &mut R,
) -> Vec<B256>
where
    B: BundlerProvider,
    R: Rng + Send,
{
    let mut hashes = Vec::with_capacity(pending.len());
    loop {
        if !jitter_max.is_zero() {
            let jitter = rng.gen_range(Duration::ZERO..jitter_max);
            time::sleep(jitter).await;
        }

        let Some(op) = pending.pop() else {
            break;
        };

        let hash = op.hash();
        hashes.push(hash);
        info!(%hash, sender = %op.sender, "sending user operation");

        let bundler = Arc::clone(bundler);
        tokio::spawn(async move {
            // Fire and forget. A rejected send is not retried; the hash
            // simply shows up as failed at receipt collection.
            if let Err(error) = bundler.send_user_operation(&op, entry_point).await {
                warn!(%hash, "failed to send user operation: {error:?}");
            }
        });
    }
    hashes
}
