//! Contract registry repository.
//!
//! Reconciliation of an exchange listing runs inside one transaction per
//! section: a crashed or partial listing fetch can never leave the contract
//! set half-updated.

use anyhow::Result;
use funding_tracker_core::{Contract, ContractInfo, ReconcileSummary};
use sqlx::{PgConnection, PgPool};
use tracing::debug;

use crate::models::ContractRow;

/// Repository for contract, asset, quote, and section rows.
#[derive(Debug, Clone)]
pub struct ContractRepository {
    pool: PgPool,
}

impl ContractRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All active contracts for a section, with their asset/quote/section
    /// names resolved.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn get_active_by_section(&self, section: &str) -> Result<Vec<Contract>> {
        let rows = sqlx::query_as::<_, ContractRow>(
            r"
            SELECT c.id, a.name AS asset, q.name AS quote, s.name AS section,
                   c.funding_interval_hours, c.active
            FROM contracts c
            JOIN assets a ON a.id = c.asset_id
            JOIN quotes q ON q.id = c.quote_id
            JOIN sections s ON s.id = c.section_id
            WHERE s.name = $1 AND c.active
            ORDER BY a.name, q.name
            ",
        )
        .bind(section)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Contract::from).collect())
    }

    /// Reconciles a fresh exchange listing into the contract set, in one
    /// transaction.
    ///
    /// Every listed entry is upserted as active with its current funding
    /// interval; previously active contracts absent from the listing are
    /// flipped inactive. Nothing is deleted.
    ///
    /// # Errors
    /// Returns an error if the database transaction fails.
    pub async fn reconcile(
        &self,
        section: &str,
        listing: &[ContractInfo],
    ) -> Result<ReconcileSummary> {
        let mut tx = self.pool.begin().await?;

        let section_id = get_or_create_section(&mut *tx, section).await?;

        let mut listed_ids = Vec::with_capacity(listing.len());
        for info in listing {
            let asset_id = get_or_create_asset(&mut *tx, &info.asset).await?;
            let quote_id = get_or_create_quote(&mut *tx, &info.quote).await?;

            let (contract_id,): (i64,) = sqlx::query_as(
                r"
                INSERT INTO contracts
                    (asset_id, quote_id, section_id, funding_interval_hours, active)
                VALUES ($1, $2, $3, $4, TRUE)
                ON CONFLICT (asset_id, quote_id, section_id) DO UPDATE
                SET funding_interval_hours = EXCLUDED.funding_interval_hours,
                    active = TRUE
                RETURNING id
                ",
            )
            .bind(asset_id)
            .bind(quote_id)
            .bind(section_id)
            .bind(info.funding_interval_hours)
            .fetch_one(&mut *tx)
            .await?;

            listed_ids.push(contract_id);
        }

        let deactivated = sqlx::query(
            r"
            UPDATE contracts
            SET active = FALSE
            WHERE section_id = $1 AND active AND NOT (id = ANY($2))
            ",
        )
        .bind(section_id)
        .bind(&listed_ids)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;

        debug!(
            "Reconciled {} contracts for {} ({} deactivated)",
            listing.len(),
            section,
            deactivated
        );

        Ok(ReconcileSummary {
            section: section.to_string(),
            listed: listing.len(),
            deactivated,
        })
    }
}

async fn get_or_create_section(conn: &mut PgConnection, name: &str) -> Result<i64> {
    get_or_create(conn, "sections", name).await
}

async fn get_or_create_asset(conn: &mut PgConnection, name: &str) -> Result<i64> {
    get_or_create(conn, "assets", name).await
}

async fn get_or_create_quote(conn: &mut PgConnection, name: &str) -> Result<i64> {
    get_or_create(conn, "quotes", name).await
}

// The no-op DO UPDATE makes RETURNING yield the id for the pre-existing row
// as well as for a fresh insert.
async fn get_or_create(conn: &mut PgConnection, table: &str, name: &str) -> Result<i64> {
    let query = format!(
        "INSERT INTO {table} (name) VALUES ($1) \
         ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name \
         RETURNING id"
    );
    let (id,): (i64,) = sqlx::query_as(&query).bind(name).fetch_one(conn).await?;
    Ok(id)
}
