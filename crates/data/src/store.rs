//! Postgres implementation of the persistence contract.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use funding_tracker_core::{
    Contract, ContractInfo, FundingStore, HistoricalFundingPoint, LiveFundingPoint,
    ReconcileSummary,
};
use sqlx::PgPool;

use crate::repositories::{
    ContractRepository, HistoricalFundingPointRepository, LiveFundingPointRepository,
};

/// All repositories over a single connection pool, implementing
/// [`FundingStore`] for the coordinators.
pub struct PostgresFundingStore {
    pub contracts: ContractRepository,
    pub historical: HistoricalFundingPointRepository,
    pub live: LiveFundingPointRepository,
}

impl PostgresFundingStore {
    /// Creates the repository set from a database pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            contracts: ContractRepository::new(pool.clone()),
            historical: HistoricalFundingPointRepository::new(pool.clone()),
            live: LiveFundingPointRepository::new(pool),
        }
    }
}

#[async_trait]
impl FundingStore for PostgresFundingStore {
    async fn active_contracts(&self, section: &str) -> Result<Vec<Contract>> {
        self.contracts.get_active_by_section(section).await
    }

    async fn latest_historical(&self, contract_id: i64) -> Result<Option<DateTime<Utc>>> {
        self.historical.latest_timestamp(contract_id).await
    }

    async fn insert_historical(&self, points: &[HistoricalFundingPoint]) -> Result<u64> {
        self.historical.bulk_insert_ignore(points).await
    }

    async fn insert_live(&self, points: &[LiveFundingPoint]) -> Result<u64> {
        self.live.bulk_insert_ignore(points).await
    }

    async fn reconcile_contracts(
        &self,
        section: &str,
        listing: &[ContractInfo],
    ) -> Result<ReconcileSummary> {
        self.contracts.reconcile(section, listing).await
    }
}
