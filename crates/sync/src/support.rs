//! Test doubles: a scriptable exchange and an in-memory store.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicI64, AtomicU32, Ordering};
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use funding_tracker_core::{
    BatchLiveFetch, Contract, ContractInfo, ExchangeAdapter, FundingPoint, FundingStore,
    HistoricalFundingPoint, LiveFetch, LiveFundingPoint, ReconcileSummary, SingleLiveFetch,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Timestamp at `h` hours past a fixed base instant.
pub fn hour(h: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::hours(h)
}

/// A funding point settled at [`hour`]`(h)`.
pub fn point_at(h: i64) -> FundingPoint {
    FundingPoint::new(dec!(0.0001), hour(h))
}

pub fn contract(id: i64, asset: &str, quote: &str, section: &str) -> Contract {
    Contract {
        id,
        asset: asset.to_string(),
        quote: quote.to_string(),
        section: section.to_string(),
        funding_interval_hours: 8,
        active: true,
    }
}

/// Scriptable exchange adapter.
///
/// Backward windows are served from a queue (empty queue means empty
/// window); forward fetches filter a fixed point set by the requested
/// range. Live behavior switches between batch and single fetch with
/// [`FakeExchange::single_live`].
#[derive(Default)]
pub struct FakeExchange {
    step_hours: i64,
    backward_windows: Mutex<VecDeque<Vec<FundingPoint>>>,
    repeating_window: Option<Vec<FundingPoint>>,
    fail_after_windows: Option<u32>,
    before_calls: AtomicU32,
    range_points: Vec<FundingPoint>,
    history_calls: Mutex<Vec<(DateTime<Utc>, DateTime<Utc>)>>,
    listing: Vec<ContractInfo>,
    live_rates: HashMap<String, FundingPoint>,
    failing_assets: HashSet<String>,
    single: bool,
}

impl FakeExchange {
    pub fn new(step_hours: i64) -> Self {
        Self {
            step_hours,
            ..Self::default()
        }
    }

    pub fn with_backward_windows(self, windows: Vec<Vec<FundingPoint>>) -> Self {
        *self.backward_windows.lock().unwrap() = windows.into();
        self
    }

    /// Serve this window for every call once the scripted queue is drained.
    pub fn with_repeating_window(mut self, window: Vec<FundingPoint>) -> Self {
        self.repeating_window = Some(window);
        self
    }

    /// Fail every backward fetch after `n` windows have been served.
    pub fn with_failure_after_windows(mut self, n: u32) -> Self {
        self.fail_after_windows = Some(n);
        self
    }

    pub fn with_range_points(mut self, points: Vec<FundingPoint>) -> Self {
        self.range_points = points;
        self
    }

    pub fn with_listing(mut self, listing: Vec<ContractInfo>) -> Self {
        self.listing = listing;
        self
    }

    pub fn with_live_rate(mut self, symbol: &str, point: FundingPoint) -> Self {
        self.live_rates.insert(symbol.to_string(), point);
        self
    }

    pub fn with_failing_asset(mut self, asset: &str) -> Self {
        self.failing_assets.insert(asset.to_string());
        self
    }

    /// Expose single-contract live fetch instead of the batch call.
    pub fn single_live(mut self) -> Self {
        self.single = true;
        self
    }

    pub fn before_call_count(&self) -> u32 {
        self.before_calls.load(Ordering::SeqCst)
    }

    pub fn history_calls(&self) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
        self.history_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExchangeAdapter for FakeExchange {
    fn exchange_id(&self) -> &str {
        "fake"
    }

    fn fetch_step_hours(&self) -> i64 {
        self.step_hours
    }

    fn format_symbol(&self, contract: &Contract) -> String {
        format!("{}{}", contract.asset, contract.quote)
    }

    async fn get_contracts(&self) -> Result<Vec<ContractInfo>> {
        Ok(self.listing.clone())
    }

    async fn fetch_history(
        &self,
        _contract: &Contract,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<FundingPoint>> {
        self.history_calls.lock().unwrap().push((start, end));
        Ok(self
            .range_points
            .iter()
            .filter(|p| p.timestamp >= start && p.timestamp <= end)
            .cloned()
            .collect())
    }

    fn live_fetch(&self) -> LiveFetch<'_> {
        if self.single {
            LiveFetch::Single(self)
        } else {
            LiveFetch::Batch(self)
        }
    }

    async fn fetch_history_before(
        &self,
        _contract: &Contract,
        _before: Option<DateTime<Utc>>,
    ) -> Result<Vec<FundingPoint>> {
        let call = self.before_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_after_windows.is_some_and(|n| call >= n) {
            bail!("simulated venue failure");
        }

        let popped = self.backward_windows.lock().unwrap().pop_front();
        Ok(popped
            .or_else(|| self.repeating_window.clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl BatchLiveFetch for FakeExchange {
    async fn fetch_live_batch(&self) -> Result<HashMap<String, FundingPoint>> {
        Ok(self.live_rates.clone())
    }
}

#[async_trait]
impl SingleLiveFetch for FakeExchange {
    async fn fetch_live(&self, contract: &Contract) -> Result<FundingPoint> {
        if self.failing_assets.contains(&contract.asset) {
            bail!("simulated venue failure for {}", contract);
        }
        let symbol = self.format_symbol(contract);
        match self.live_rates.get(&symbol) {
            Some(point) => Ok(point.clone()),
            None => bail!("no live rate for {}", symbol),
        }
    }
}

/// In-memory [`FundingStore`] mirroring the Postgres semantics: insert-ignore
/// on (contract, timestamp), reconcile upserts by (asset, quote, section) and
/// deactivates instead of deleting.
#[derive(Default)]
pub struct MemoryStore {
    contracts: Mutex<Vec<Contract>>,
    next_id: AtomicI64,
    historical: Mutex<BTreeMap<(i64, DateTime<Utc>), Decimal>>,
    live: Mutex<BTreeMap<(i64, DateTime<Utc>), Decimal>>,
}

impl MemoryStore {
    pub fn add_contract(&self, asset: &str, quote: &str, section: &str, interval: i32) -> Contract {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let contract = Contract {
            id,
            asset: asset.to_string(),
            quote: quote.to_string(),
            section: section.to_string(),
            funding_interval_hours: interval,
            active: true,
        };
        self.contracts.lock().unwrap().push(contract.clone());
        contract
    }

    pub fn deactivate(&self, contract_id: i64) {
        let mut contracts = self.contracts.lock().unwrap();
        if let Some(c) = contracts.iter_mut().find(|c| c.id == contract_id) {
            c.active = false;
        }
    }

    pub fn contract_by_id(&self, contract_id: i64) -> Option<Contract> {
        self.contracts
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == contract_id)
            .cloned()
    }

    pub fn active_in_section(&self, section: &str) -> Vec<Contract> {
        self.contracts
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.section == section && c.active)
            .cloned()
            .collect()
    }

    pub fn seed_historical(&self, contract_id: i64, timestamps: &[DateTime<Utc>]) {
        let mut historical = self.historical.lock().unwrap();
        for ts in timestamps {
            historical.insert((contract_id, *ts), Decimal::ZERO);
        }
    }

    pub fn historical_count(&self, contract_id: i64) -> usize {
        self.historical
            .lock()
            .unwrap()
            .keys()
            .filter(|(id, _)| *id == contract_id)
            .count()
    }

    pub fn historical_timestamps(&self, contract_id: i64) -> Vec<DateTime<Utc>> {
        self.historical
            .lock()
            .unwrap()
            .keys()
            .filter(|(id, _)| *id == contract_id)
            .map(|(_, ts)| *ts)
            .collect()
    }

    pub fn live_count(&self) -> usize {
        self.live.lock().unwrap().len()
    }
}

#[async_trait]
impl FundingStore for MemoryStore {
    async fn active_contracts(&self, section: &str) -> Result<Vec<Contract>> {
        Ok(self.active_in_section(section))
    }

    async fn latest_historical(&self, contract_id: i64) -> Result<Option<DateTime<Utc>>> {
        Ok(self
            .historical
            .lock()
            .unwrap()
            .keys()
            .filter(|(id, _)| *id == contract_id)
            .map(|(_, ts)| *ts)
            .max())
    }

    async fn insert_historical(&self, points: &[HistoricalFundingPoint]) -> Result<u64> {
        let mut historical = self.historical.lock().unwrap();
        let mut inserted = 0;
        for point in points {
            if historical
                .insert((point.contract_id, point.timestamp), point.rate)
                .is_none()
            {
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn insert_live(&self, points: &[LiveFundingPoint]) -> Result<u64> {
        let mut live = self.live.lock().unwrap();
        let mut inserted = 0;
        for point in points {
            if live
                .insert((point.contract_id, point.timestamp), point.rate)
                .is_none()
            {
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn reconcile_contracts(
        &self,
        section: &str,
        listing: &[ContractInfo],
    ) -> Result<ReconcileSummary> {
        let mut contracts = self.contracts.lock().unwrap();
        let mut listed_ids = HashSet::new();

        for info in listing {
            if let Some(existing) = contracts
                .iter_mut()
                .find(|c| c.asset == info.asset && c.quote == info.quote && c.section == section)
            {
                existing.funding_interval_hours = info.funding_interval_hours;
                existing.active = true;
                listed_ids.insert(existing.id);
            } else {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
                contracts.push(Contract {
                    id,
                    asset: info.asset.clone(),
                    quote: info.quote.clone(),
                    section: section.to_string(),
                    funding_interval_hours: info.funding_interval_hours,
                    active: true,
                });
                listed_ids.insert(id);
            }
        }

        let mut deactivated = 0;
        for c in contracts
            .iter_mut()
            .filter(|c| c.section == section && c.active && !listed_ids.contains(&c.id))
        {
            c.active = false;
            deactivated += 1;
        }

        Ok(ReconcileSummary {
            section: section.to_string(),
            listed: listing.len(),
            deactivated,
        })
    }
}
