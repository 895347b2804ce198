//! Trait seams between the coordinators, the exchange adapters, and storage.
//!
//! `ExchangeAdapter` is the capability contract every venue implements.
//! Exactly one live-fetch style is exposed through [`LiveFetch`]: either a
//! whole-venue batch call or a per-contract call that the collector fans out.
//! `FundingStore` is the persistence contract the coordinators are written
//! against; the Postgres implementation lives in the data crate and tests
//! substitute an in-memory one.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::domain::{
    Contract, ContractInfo, FundingPoint, HistoricalFundingPoint, LiveFundingPoint,
    ReconcileSummary,
};

/// Batch live fetch: one call returns the unsettled rate for every listed
/// contract, keyed by exchange-native symbol. Preferred when the venue
/// supports it.
#[async_trait]
pub trait BatchLiveFetch: Send + Sync {
    async fn fetch_live_batch(&self) -> Result<HashMap<String, FundingPoint>>;
}

/// Single-contract live fetch, fanned out with bounded concurrency by the
/// live collector when the venue has no batch endpoint.
#[async_trait]
pub trait SingleLiveFetch: Send + Sync {
    async fn fetch_live(&self, contract: &Contract) -> Result<FundingPoint>;
}

/// The live-fetch capability an adapter exposes, resolved once at
/// construction rather than probed at each call site.
pub enum LiveFetch<'a> {
    Batch(&'a dyn BatchLiveFetch),
    Single(&'a dyn SingleLiveFetch),
}

/// Capability contract for one exchange venue.
#[async_trait]
pub trait ExchangeAdapter: Send + Sync {
    /// Stable venue identifier, also used as the section name.
    fn exchange_id(&self) -> &str;

    /// Maximum time span, in hours, safely requestable in one history call:
    /// the venue's per-call record cap times its minimum funding interval,
    /// minus a safety margin. Bounds the window size for both backward and
    /// forward crawling.
    fn fetch_step_hours(&self) -> i64;

    /// Formats the exchange-native symbol for a contract. Pure.
    fn format_symbol(&self, contract: &Contract) -> String;

    /// Enumerates all currently listed perpetual contracts. If the venue
    /// paginates, every page is drained before returning.
    async fn get_contracts(&self) -> Result<Vec<ContractInfo>>;

    /// Fetches funding history within `[start, end]`, chronological
    /// ascending. May contain duplicates; deduplication is the persistence
    /// layer's job.
    async fn fetch_history(
        &self,
        contract: &Contract,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<FundingPoint>>;

    /// The live-fetch variant this adapter supports.
    fn live_fetch(&self) -> LiveFetch<'_>;

    /// Fetches one fetch-step window ending at `before` (backward backfill).
    ///
    /// `None` anchors the window at now. Override if the venue's pagination
    /// works differently.
    async fn fetch_history_before(
        &self,
        contract: &Contract,
        before: Option<DateTime<Utc>>,
    ) -> Result<Vec<FundingPoint>> {
        let end = before.unwrap_or_else(Utc::now);
        let start = end - Duration::hours(self.fetch_step_hours());
        self.fetch_history(contract, start, end).await
    }

    /// Fetches `[after, now]` (forward catch-up). The window width is not
    /// clamped to the fetch step; callers slice spans wider than one step.
    async fn fetch_history_after(
        &self,
        contract: &Contract,
        after: DateTime<Utc>,
    ) -> Result<Vec<FundingPoint>> {
        self.fetch_history(contract, after, Utc::now()).await
    }
}

/// Persistence contract consumed by the coordinators.
///
/// Each operation is its own scoped transactional unit; nothing is held open
/// across network calls. The insert operations use bulk-insert-ignore
/// semantics: rows violating the (contract, timestamp) uniqueness are
/// silently skipped and the returned count covers only rows actually
/// written.
#[async_trait]
pub trait FundingStore: Send + Sync {
    /// All active contracts for a section.
    async fn active_contracts(&self, section: &str) -> Result<Vec<Contract>>;

    /// Timestamp of the newest stored historical point for a contract, or
    /// `None` if nothing is stored yet. This is the catch-up cursor; no
    /// separate cursor field exists.
    async fn latest_historical(&self, contract_id: i64) -> Result<Option<DateTime<Utc>>>;

    async fn insert_historical(&self, points: &[HistoricalFundingPoint]) -> Result<u64>;

    async fn insert_live(&self, points: &[LiveFundingPoint]) -> Result<u64>;

    /// Reconciles one section's fresh listing into storage inside a single
    /// transaction: get-or-create section/asset/quote rows, upsert contracts
    /// as active with their current funding interval, and deactivate (never
    /// delete) previously active contracts absent from the listing.
    async fn reconcile_contracts(
        &self,
        section: &str,
        listing: &[ContractInfo],
    ) -> Result<ReconcileSummary>;
}
