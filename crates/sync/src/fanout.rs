//! Bounded fan-out for venues that only expose per-contract live fetch.
//!
//! The worker bound is a fixed constant, not derived from the contract
//! count, so a venue's rate and connection limits hold no matter how many
//! contracts a section lists. A failed fetch means that contract is simply
//! absent from the result map.

use std::collections::HashMap;

use funding_tracker_core::{Contract, FundingPoint, SingleLiveFetch};
use futures_util::{stream, StreamExt};
use tracing::debug;

/// Concurrent in-flight live fetches per venue.
pub const LIVE_FETCH_CONCURRENCY: usize = 8;

/// Fetches live rates for each contract individually, at most `concurrency`
/// calls in flight, and merges the successes into a map keyed by contract
/// id. Per-contract failures are logged and dropped.
pub async fn fetch_live_parallel(
    adapter: &dyn SingleLiveFetch,
    contracts: &[Contract],
    concurrency: usize,
) -> HashMap<i64, FundingPoint> {
    let mut fetches = Vec::with_capacity(contracts.len());
    for contract in contracts {
        fetches.push(fetch_one(adapter, contract));
    }
    stream::iter(fetches)
        .buffer_unordered(concurrency.max(1))
        .filter_map(|result| async move { result })
        .collect()
        .await
}

/// Fetches one contract's live rate, logging and dropping a failure.
async fn fetch_one(
    adapter: &dyn SingleLiveFetch,
    contract: &Contract,
) -> Option<(i64, FundingPoint)> {
    match adapter.fetch_live(contract).await {
        Ok(point) => Some((contract.id, point)),
        Err(e) => {
            debug!("Live fetch failed for {}: {}", contract, e);
            None
        }
    }
}
