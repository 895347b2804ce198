use chrono::{DateTime, Utc};
use funding_tracker_core::HistoricalFundingPoint;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One stored funding observation, shared row shape for the historical and
/// live tables.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FundingPointRow {
    pub contract_id: i64,
    pub timestamp: DateTime<Utc>,
    pub funding_rate: Decimal,
}

impl From<FundingPointRow> for HistoricalFundingPoint {
    fn from(row: FundingPointRow) -> Self {
        Self {
            contract_id: row.contract_id,
            timestamp: row.timestamp,
            rate: row.funding_rate,
        }
    }
}
