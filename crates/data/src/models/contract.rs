use funding_tracker_core::Contract;
use serde::{Deserialize, Serialize};

/// A contract joined with its asset, quote, and section names.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ContractRow {
    pub id: i64,
    pub asset: String,
    pub quote: String,
    pub section: String,
    pub funding_interval_hours: i32,
    pub active: bool,
}

impl From<ContractRow> for Contract {
    fn from(row: ContractRow) -> Self {
        Self {
            id: row.id,
            asset: row.asset,
            quote: row.quote,
            section: row.section,
            funding_interval_hours: row.funding_interval_hours,
            active: row.active,
        }
    }
}
