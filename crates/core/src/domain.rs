//! Domain types for funding rate tracking.
//!
//! A tracked venue is a `Section`; a perpetual instrument on a venue is a
//! `Contract` over an `Asset`/`Quote` pair. Funding observations come in two
//! flavors: settled `HistoricalFundingPoint`s and unsettled
//! `LiveFundingPoint` snapshots. Both are unique on (contract, timestamp),
//! which is what makes re-fetching overlapping windows safe.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An exchange venue tracked by the system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: i64,
    /// Unique venue name (e.g. "bybit").
    pub name: String,
}

/// A base currency (e.g. BTC). Created on first sighting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub id: i64,
    pub name: String,
}

/// A quote currency (e.g. USDT). Created on first sighting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub id: i64,
    pub name: String,
}

/// A tradable perpetual instrument: (asset, quote, section), unique on the
/// triple. Deactivated on delisting, never deleted, so stored funding points
/// keep their referent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    pub id: i64,
    pub asset: String,
    pub quote: String,
    pub section: String,
    pub funding_interval_hours: i32,
    pub active: bool,
}

impl fmt::Display for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.asset, self.quote)
    }
}

/// One listing entry returned by an exchange's contract enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractInfo {
    pub asset: String,
    pub quote: String,
    pub funding_interval_hours: i32,
    pub section: String,
}

/// A single (rate, timestamp) funding observation as returned by an adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingPoint {
    pub rate: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl FundingPoint {
    #[must_use]
    pub fn new(rate: Decimal, timestamp: DateTime<Utc>) -> Self {
        Self { rate, timestamp }
    }
}

/// A settled funding observation bound to a stored contract.
///
/// Immutable once stored; unique on (`contract_id`, `timestamp`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalFundingPoint {
    pub contract_id: i64,
    pub timestamp: DateTime<Utc>,
    pub rate: Decimal,
}

impl HistoricalFundingPoint {
    #[must_use]
    pub fn from_point(contract_id: i64, point: &FundingPoint) -> Self {
        Self {
            contract_id,
            timestamp: point.timestamp,
            rate: point.rate,
        }
    }
}

/// A best-effort snapshot of the currently accruing, unsettled rate.
///
/// Same uniqueness as historical points; later snapshots supersede earlier
/// ones rather than merging. A live point may coexist with the historical
/// point for the same instant - readers prefer historical data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveFundingPoint {
    pub contract_id: i64,
    pub timestamp: DateTime<Utc>,
    pub rate: Decimal,
}

impl LiveFundingPoint {
    #[must_use]
    pub fn from_point(contract_id: i64, point: &FundingPoint) -> Self {
        Self {
            contract_id,
            timestamp: point.timestamp,
            rate: point.rate,
        }
    }
}

/// Outcome of reconciling one section's contract listing into storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileSummary {
    pub section: String,
    /// Entries in the fresh listing (all upserted as active).
    pub listed: usize,
    /// Previously active contracts absent from the listing, flipped inactive.
    pub deactivated: u64,
}
