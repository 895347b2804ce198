//! Live unsettled-rate collection for one exchange section.
//!
//! A single pass: read the section's active contracts, take one snapshot via
//! the adapter's live-fetch capability, and insert-ignore the results.
//! Partial coverage is expected - one contract's missing rate never blocks
//! storage of the rest.

use std::collections::HashMap;

use anyhow::Result;
use funding_tracker_core::{
    ExchangeAdapter, FundingPoint, FundingStore, LiveFetch, LiveFundingPoint,
};
use tracing::{debug, info, warn};

use crate::fanout::{fetch_live_parallel, LIVE_FETCH_CONCURRENCY};

/// Result of one live collection pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LiveCollectOutcome {
    /// Active contracts the section asked rates for.
    pub requested: usize,
    /// Contracts a rate came back for.
    pub collected: usize,
    /// Snapshot rows actually written.
    pub inserted: u64,
}

/// Collects unsettled rates for every active contract of a section.
///
/// Batch-capable adapters answer with one call; single-fetch adapters are
/// fanned out with bounded concurrency. An empty contract set or an empty
/// rate map is a logged no-op.
///
/// # Errors
/// Returns an error if reading the contract set, the batch live call, or
/// the snapshot insert fails. Individual fan-out failures are not errors.
pub async fn collect_live(
    adapter: &dyn ExchangeAdapter,
    section: &str,
    store: &dyn FundingStore,
) -> Result<LiveCollectOutcome> {
    debug!("Starting live rate collection for {}", section);

    let contracts = store.active_contracts(section).await?;
    if contracts.is_empty() {
        warn!("No active contracts found for {}", section);
        return Ok(LiveCollectOutcome::default());
    }

    debug!("Collecting live rates for {} contracts", contracts.len());

    let rates: HashMap<i64, FundingPoint> = match adapter.live_fetch() {
        LiveFetch::Batch(batch) => {
            let by_symbol = batch.fetch_live_batch().await?;
            contracts
                .iter()
                .filter_map(|c| {
                    by_symbol
                        .get(&adapter.format_symbol(c))
                        .map(|point| (c.id, point.clone()))
                })
                .collect()
        }
        LiveFetch::Single(single) => {
            fetch_live_parallel(single, &contracts, LIVE_FETCH_CONCURRENCY).await
        }
    };

    if rates.is_empty() {
        warn!("No live rates collected for {}", section);
        return Ok(LiveCollectOutcome {
            requested: contracts.len(),
            ..LiveCollectOutcome::default()
        });
    }

    let records: Vec<LiveFundingPoint> = rates
        .iter()
        .map(|(contract_id, point)| LiveFundingPoint::from_point(*contract_id, point))
        .collect();

    let inserted = store.insert_live(&records).await?;

    let success = records.len();
    let failed = contracts.len() - success;
    if failed > 0 {
        info!(
            "Live rate collection for {}: {} success, {} failed",
            section, success, failed
        );
    } else {
        debug!(
            "Live rate collection for {}: all {} rates collected successfully",
            section, success
        );
    }

    Ok(LiveCollectOutcome {
        requested: contracts.len(),
        collected: success,
        inserted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::support::{FakeExchange, MemoryStore};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn rate(value: rust_decimal::Decimal) -> FundingPoint {
        FundingPoint::new(value, Utc::now())
    }

    // ==================== Batch Adapter ====================

    #[tokio::test]
    async fn test_batch_collects_all_contracts() {
        let adapter = FakeExchange::new(2)
            .with_live_rate("BTCUSDT", rate(dec!(0.0001)))
            .with_live_rate("ETHUSDT", rate(dec!(0.0002)));
        let store = MemoryStore::default();
        store.add_contract("BTC", "USDT", "fake", 8);
        store.add_contract("ETH", "USDT", "fake", 8);

        let outcome = collect_live(&adapter, "fake", &store).await.unwrap();

        assert_eq!(outcome.requested, 2);
        assert_eq!(outcome.collected, 2);
        assert_eq!(outcome.inserted, 2);
        assert_eq!(store.live_count(), 2);
    }

    #[tokio::test]
    async fn test_batch_partial_coverage_stores_what_came_back() {
        // Batch answers for 3 of 5 contracts: 3 stored, 2 reported failed.
        let adapter = FakeExchange::new(2)
            .with_live_rate("BTCUSDT", rate(dec!(0.0001)))
            .with_live_rate("ETHUSDT", rate(dec!(0.0002)))
            .with_live_rate("SOLUSDT", rate(dec!(0.0003)));
        let store = MemoryStore::default();
        for asset in ["BTC", "ETH", "SOL", "XRP", "DOGE"] {
            store.add_contract(asset, "USDT", "fake", 8);
        }

        let outcome = collect_live(&adapter, "fake", &store).await.unwrap();

        assert_eq!(outcome.requested, 5);
        assert_eq!(outcome.collected, 3);
        assert_eq!(outcome.inserted, 3);
    }

    // ==================== Single-Fetch Adapter ====================

    #[tokio::test]
    async fn test_single_fetch_failure_does_not_block_the_rest() {
        let adapter = FakeExchange::new(2)
            .single_live()
            .with_live_rate("BTCUSDT", rate(dec!(0.0001)))
            .with_live_rate("ETHUSDT", rate(dec!(0.0002)))
            .with_live_rate("SOLUSDT", rate(dec!(0.0003)))
            .with_failing_asset("ETH");
        let store = MemoryStore::default();
        for asset in ["BTC", "ETH", "SOL"] {
            store.add_contract(asset, "USDT", "fake", 8);
        }

        let outcome = collect_live(&adapter, "fake", &store).await.unwrap();

        assert_eq!(outcome.requested, 3);
        assert_eq!(outcome.collected, 2);
        assert_eq!(store.live_count(), 2);
    }

    // ==================== No-op Paths ====================

    #[tokio::test]
    async fn test_no_active_contracts_is_noop() {
        let adapter = FakeExchange::new(2);
        let store = MemoryStore::default();

        let outcome = collect_live(&adapter, "fake", &store).await.unwrap();

        assert_eq!(outcome, LiveCollectOutcome::default());
        assert_eq!(store.live_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_rate_map_is_noop() {
        let adapter = FakeExchange::new(2);
        let store = MemoryStore::default();
        store.add_contract("BTC", "USDT", "fake", 8);

        let outcome = collect_live(&adapter, "fake", &store).await.unwrap();

        assert_eq!(outcome.requested, 1);
        assert_eq!(outcome.collected, 0);
        assert_eq!(store.live_count(), 0);
    }

    #[tokio::test]
    async fn test_inactive_contracts_are_not_requested() {
        let adapter = FakeExchange::new(2).with_live_rate("BTCUSDT", rate(dec!(0.0001)));
        let store = MemoryStore::default();
        store.add_contract("BTC", "USDT", "fake", 8);
        let delisted = store.add_contract("LUNA", "USDT", "fake", 8);
        store.deactivate(delisted.id);

        let outcome = collect_live(&adapter, "fake", &store).await.unwrap();

        assert_eq!(outcome.requested, 1);
        assert_eq!(outcome.collected, 1);
    }
}
