//! Live funding point repository.
//!
//! Stores unsettled-rate snapshots with the same insert-ignore discipline as
//! the historical table. Snapshots are superseded by later ones rather than
//! merged, so the table grows until pruned.

use anyhow::Result;
use chrono::{DateTime, Utc};
use funding_tracker_core::LiveFundingPoint;
use sqlx::PgPool;

/// Repository for unsettled funding rate snapshots.
#[derive(Debug, Clone)]
pub struct LiveFundingPointRepository {
    pool: PgPool,
}

impl LiveFundingPointRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a batch of snapshots, silently skipping rows that violate
    /// the (contract_id, timestamp) uniqueness.
    ///
    /// Returns the number of rows actually written.
    ///
    /// # Errors
    /// Returns an error if the database transaction fails.
    pub async fn bulk_insert_ignore(&self, points: &[LiveFundingPoint]) -> Result<u64> {
        if points.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut inserted = 0u64;

        for chunk in points.chunks(100) {
            for point in chunk {
                let result = sqlx::query(
                    r"
                    INSERT INTO live_funding_points
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

    /// Deletes snapshots older than a given timestamp.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn delete_before(&self, before: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(
            r"
            DELETE FROM live_funding_points
            WHERE timestamp < $1
            ",
        )
        .bind(before)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
