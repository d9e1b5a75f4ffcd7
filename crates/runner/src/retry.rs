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

//! Utilities for retrying operations.

use std::{future::Future, time::Duration};

use rand::Rng;
use tokio::time;
use tracing::warn;

/// Options for retrying an operation forever using exponential backoff
/// with jitter.
#[derive(Clone, Copy, Debug)]
pub(crate) struct UnlimitedRetryOpts {
    /// The first retry is immediately after the first failure (plus jitter).
    /// The next retry after that will wait this long.
    pub(crate) min_nonzero_wait: Duration,
    /// The maximum amount of time to wait between retries.
    pub(crate) max_wait: Duration,
    /// The maximum amount of jitter to add to the wait time.
    pub(crate) max_jitter: Duration,
}

impl Default for UnlimitedRetryOpts {
    fn default() -> Self {
        Self {
            min_nonzero_wait: Duration::from_secs(1),
            max_wait: Duration::from_secs(10),
            max_jitter: Duration::from_secs(1),
        }
    }
}

/// Retry a function until it succeeds, using exponential backoff with jitter.
pub(crate) async fn with_unlimited_retries<Func, Fut, Out, Err>(
    description: &str,
    func: Func,
    opts: UnlimitedRetryOpts,
) -> Out
where
    Func: Fn() -> Fut,
    Fut: Future<Output = Result<Out, Err>>,
{
    let mut next_wait = Duration::ZERO;
    let mut attempt_number = 1_u64;
    loop {
        match func().await {
            Ok(out) => return out,
            Err(_) => warn!("Failed to {description} (attempt {attempt_number})"),
        }
        // Grab a new rng each iteration because we can't hold it across awaits.
        let jitter = rand::thread_rng().gen_range(Duration::ZERO..opts.max_jitter);
        time::sleep(next_wait + jitter).await;
        next_wait = (2 * next_wait).clamp(opts.min_nonzero_wait, opts.max_wait);
        attempt_number += 1;
    }
}
