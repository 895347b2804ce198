//! Contract registry synchronization.
//!
//! Reconciles an exchange's live contract listing into the stored contract
//! set, one transaction per section. Contracts that disappeared from the
//! listing are deactivated, never deleted, so stored funding points keep
//! their referential integrity.

use std::collections::BTreeMap;

use anyhow::Result;
use funding_tracker_core::{ContractInfo, ExchangeAdapter, FundingStore, ReconcileSummary};
use tracing::{debug, info, warn};

/// Fetches the adapter's full contract listing and reconciles it into
/// storage, grouped by section.
///
/// An empty listing is a logged no-op: deactivation only ever happens
/// against a listing the exchange actually returned, so a failed or empty
/// enumeration cannot delist everything.
///
/// # Errors
/// Returns an error if the listing fetch or a section's reconciliation
/// fails; sections reconciled before the failure stay committed.
pub async fn register_contracts(
    adapter: &dyn ExchangeAdapter,
    store: &dyn FundingStore,
) -> Result<Vec<ReconcileSummary>> {
    debug!("Fetching contract listing from {}", adapter.exchange_id());

    let listing = adapter.get_contracts().await?;
    if listing.is_empty() {
        warn!(
            "Exchange {} returned no contracts, skipping registry sync",
            adapter.exchange_id()
        );
        return Ok(Vec::new());
    }

    let mut by_section: BTreeMap<String, Vec<ContractInfo>> = BTreeMap::new();
    for info in listing {
        by_section.entry(info.section.clone()).or_default().push(info);
    }

    let mut summaries = Vec::with_capacity(by_section.len());
    for (section, entries) in by_section {
        let summary = store.reconcile_contracts(&section, &entries).await?;
        info!(
            "Registry sync for {}: {} listed, {} deactivated",
            section, summary.listed, summary.deactivated
        );
        summaries.push(summary);
    }

    Ok(summaries)
}
