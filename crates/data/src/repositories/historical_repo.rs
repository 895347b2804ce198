//! Historical funding point repository.
//!
//! Insert-only: settled observations are never updated or deleted. The
//! (contract_id, timestamp) primary key plus `ON CONFLICT DO NOTHING` gives
//! the bulk-insert-ignore semantics the sync coordinators rely on.

use anyhow::Result;
use chrono::{DateTime, Utc};
use funding_tracker_core::HistoricalFundingPoint;
use sqlx::PgPool;

use crate::models::FundingPointRow;

/// Repository for settled funding observations.
#[derive(Debug, Clone)]
pub struct HistoricalFundingPointRepository {
    pool: PgPool,
}

impl HistoricalFundingPointRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a batch of funding points, silently skipping rows that
    /// violate the (contract_id, timestamp) uniqueness.
    ///
    /// Returns the number of rows actually written.
    ///
    /// # Errors
    /// Returns an error if the database transaction fails.
    pub async fn bulk_insert_ignore(&self, points: &[HistoricalFundingPoint]) -> Result<u64> {
        if points.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut inserted = 0u64;

        for chunk in points.chunks(100) {
            for point in chunk {
                let result = sqlx::query(
                    r"
                    INSERT INTO historical_funding_points
                        (contract_id, timestamp, funding_rate)
                    VALUES ($1, $2, $3)
                    ON CONFLICT (contract_id, timestamp) DO NOTHING
                    ",
                )
                .bind(point.contract_id)
                .bind(point.timestamp)
                .bind(point.rate)
                .execute(&mut *tx)
                .await?;

                inserted += result.rows_affected();
            }
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Timestamp of the newest stored point for a contract.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn latest_timestamp(&self, contract_id: i64) -> Result<Option<DateTime<Utc>>> {
        let row: Option<(DateTime<Utc>,)> = sqlx::query_as(
            r"
            SELECT timestamp
            FROM historical_funding_points
            WHERE contract_id = $1
            ORDER BY timestamp DESC
            LIMIT 1
            ",
        )
        .bind(contract_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.0))
    }

    /// Queries stored points for a contract within a time range, ascending.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn query_by_time_range(
        &self,
        contract_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<HistoricalFundingPoint>> {
        let rows = sqlx::query_as::<_, FundingPointRow>(
            r"
            SELECT contract_id, timestamp, funding_rate
            FROM historical_funding_points
            WHERE contract_id = $1
              AND timestamp >= $2 AND timestamp <= $3
            ORDER BY timestamp ASC
            ",
        )
        .bind(contract_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(HistoricalFundingPoint::from).collect())
    }
}
