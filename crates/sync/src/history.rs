//! Historical funding synchronization for one contract.
//!
//! Backward backfill walks fetch-step windows from now toward the start of
//! available history; forward catch-up closes the gap between the newest
//! stored point and now. Both persist every window before requesting the
//! next one, so a crash or cancellation leaves only fully committed windows
//! behind and a re-run redoes at most one window's worth of fetching. The
//! (contract, timestamp) uniqueness in storage makes that redo harmless.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use funding_tracker_core::{
    Contract, ExchangeAdapter, FundingPoint, FundingStore, HistoricalFundingPoint,
};
use tracing::{debug, info};

/// Result of one backward backfill run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackfillOutcome {
    /// Non-empty windows fetched and persisted.
    pub windows_fetched: u32,
    /// Points returned by the exchange, duplicates included.
    pub points_fetched: u64,
    /// Points actually written (post-dedup).
    pub points_inserted: u64,
}

/// Result of one forward catch-up run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatchUpOutcome {
    pub windows_fetched: u32,
    pub points_fetched: u64,
    pub points_inserted: u64,
}

/// Fully backfills a contract's funding history, newest window first.
///
/// Walks backward in fetch-step windows: each window's oldest timestamp
/// becomes the next request's anchor, so windows for one contract are
/// strictly sequential. Terminates on an empty window (the exchange has no
/// older data) or when a window makes no backward progress, which happens on
/// venues whose window bounds are inclusive once the earliest record is
/// reached.
///
/// # Errors
/// Returns the adapter or storage error of the failing window; windows
/// persisted before the failure stay committed.
pub async fn sync_contract(
    adapter: &dyn ExchangeAdapter,
    contract: &Contract,
    store: &dyn FundingStore,
) -> Result<BackfillOutcome> {
    debug!(
        "Starting backfill for {}/{}",
        adapter.exchange_id(),
        contract
    );

    let mut outcome = BackfillOutcome::default();
    let mut anchor: Option<DateTime<Utc>> = None;

    loop {
        let points = adapter.fetch_history_before(contract, anchor).await?;
        let Some(oldest) = points.iter().map(|p| p.timestamp).min() else {
            break;
        };

        outcome.points_fetched += points.len() as u64;
        outcome.points_inserted += store
            .insert_historical(&to_records(contract.id, &points))
            .await?;
        outcome.windows_fetched += 1;

        let stalled = anchor.is_some_and(|a| oldest >= a);
        anchor = Some(oldest);
        if stalled {
            debug!(
                "Backfill window for {}/{} made no backward progress, stopping",
                adapter.exchange_id(),
                contract
            );
            break;
        }
    }

    info!(
        "Backfill for {}/{}: {} windows, {} points fetched, {} new",
        adapter.exchange_id(),
        contract,
        outcome.windows_fetched,
        outcome.points_fetched,
        outcome.points_inserted
    );
    Ok(outcome)
}

/// Catches a contract's history up from the newest stored point to now.
///
/// The max stored timestamp is the cursor; no separate cursor field exists.
/// A gap within one fetch step is closed with a single call. A wider gap
/// (long scheduler outage) is sliced into step-sized forward windows so no
/// single request can exceed the venue's per-call record cap, each window
/// persisted before the next is requested. A contract with no stored history
/// falls back to the backward backfill, which converges to the same full
/// history in a number of calls proportional to the data that exists.
///
/// # Errors
/// Returns the adapter or storage error of the failing window; windows
/// persisted before the failure stay committed.
pub async fn update_contract(
    adapter: &dyn ExchangeAdapter,
    contract: &Contract,
    store: &dyn FundingStore,
) -> Result<CatchUpOutcome> {
    let Some(anchor) = store.latest_historical(contract.id).await? else {
        debug!(
            "No stored history for {}/{}, running full backfill",
            adapter.exchange_id(),
            contract
        );
        let backfill = sync_contract(adapter, contract, store).await?;
        return Ok(CatchUpOutcome {
            windows_fetched: backfill.windows_fetched,
            points_fetched: backfill.points_fetched,
            points_inserted: backfill.points_inserted,
        });
    };

    let now = Utc::now();
    let step = Duration::hours(adapter.fetch_step_hours());
    let mut outcome = CatchUpOutcome::default();

    if now - anchor <= step {
        let points = adapter.fetch_history_after(contract, anchor).await?;
        outcome.points_fetched += points.len() as u64;
        outcome.points_inserted += store
            .insert_historical(&to_records(contract.id, &points))
            .await?;
        outcome.windows_fetched += 1;
    } else {
        // Persist-before-advance, same discipline as the backward crawl.
        let mut cursor = anchor;
        while cursor < now {
            let end = (cursor + step).min(now);
            let points = adapter.fetch_history(contract, cursor, end).await?;
            outcome.points_fetched += points.len() as u64;
            outcome.points_inserted += store
                .insert_historical(&to_records(contract.id, &points))
                .await?;
            outcome.windows_fetched += 1;
            cursor = end;
        }
    }

    info!(
        "Catch-up for {}/{}: {} windows, {} new points since {}",
        adapter.exchange_id(),
        contract,
        outcome.windows_fetched,
        outcome.points_inserted,
        anchor
    );
    Ok(outcome)
}

fn to_records(contract_id: i64, points: &[FundingPoint]) -> Vec<HistoricalFundingPoint> {
    points
        .iter()
        .map(|p| HistoricalFundingPoint::from_point(contract_id, p))
        .collect()
}
