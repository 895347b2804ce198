//! Hyperliquid exchange adapter.
//!
//! Hyperliquid funds every hour and serves up to 500 history records per
//! call, so the fetch step is 498 hours (500 - 2 safety buffer). All
//! endpoints hang off a single `/info` POST route; symbols are bare asset
//! names and every contract quotes in USD. Live rates come from the
//! `metaAndAssetCtxs` batch call.

use std::collections::HashMap;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use funding_tracker_core::{
    BatchLiveFetch, Contract, ContractInfo, ExchangeAdapter, FundingPoint, LiveFetch,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::client::HyperliquidClient;

pub const EXCHANGE_ID: &str = "hyperliquid";

/// 500 records max, 1-hour interval: 498 hours (500 - 2 safety buffer).
pub const FETCH_STEP_HOURS: i64 = 498;

#[derive(Debug, Deserialize)]
struct Meta {
    universe: Vec<UniverseEntry>,
}

#[derive(Debug, Deserialize)]
struct UniverseEntry {
    name: String,
}

#[derive(Debug, Deserialize)]
struct FundingHistoryEntry {
    #[serde(rename = "fundingRate")]
    funding_rate: String,
    time: i64,
}

/// Per-asset context from `metaAndAssetCtxs`; entries without a funding
/// field (spot-only contexts) are skipped.
#[derive(Debug, Deserialize)]
struct AssetCtx {
    funding: Option<String>,
}

pub struct HyperliquidAdapter {
    client: HyperliquidClient,
}

impl HyperliquidAdapter {
    #[must_use]
    pub fn new(client: HyperliquidClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ExchangeAdapter for HyperliquidAdapter {
    fn exchange_id(&self) -> &str {
        EXCHANGE_ID
    }

    fn fetch_step_hours(&self) -> i64 {
        FETCH_STEP_HOURS
    }

    fn format_symbol(&self, contract: &Contract) -> String {
        contract.asset.clone()
    }

    async fn get_contracts(&self) -> Result<Vec<ContractInfo>> {
        debug!("Fetching contracts from {}", EXCHANGE_ID);

        let meta: Meta = self.client.post_info(json!({ "type": "meta" })).await?;

        let contracts = meta
            .universe
            .into_iter()
            .map(|listing| ContractInfo {
                asset: listing.name,
                quote: "USD".to_string(),
                funding_interval_hours: 1,
                section: EXCHANGE_ID.to_string(),
            })
            .collect::<Vec<_>>();

        debug!("Fetched {} contracts from {}", contracts.len(), EXCHANGE_ID);
        Ok(contracts)
    }

    async fn fetch_history(
        &self,
        contract: &Contract,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<FundingPoint>> {
        let symbol = self.format_symbol(contract);

        debug!(
            "Fetching history for {}/{} from {} to {}",
            EXCHANGE_ID, symbol, start, end
        );

        let entries: Vec<FundingHistoryEntry> = self
            .client
            .post_info(json!({
                "type": "fundingHistory",
                "coin": symbol,
                "startTime": start.timestamp_millis(),
                "endTime": end.timestamp_millis(),
            }))
            .await?;

        let mut points = Vec::with_capacity(entries.len());
        for entry in entries {
            let rate = Decimal::from_str(&entry.funding_rate)?;
            let timestamp = DateTime::from_timestamp_millis(entry.time)
                .ok_or_else(|| anyhow!("funding timestamp out of range: {}", entry.time))?;
            points.push(FundingPoint::new(rate, timestamp));
        }

        debug!(
            "Fetched {} funding points for {}/{}",
            points.len(),
            EXCHANGE_ID,
            symbol
        );
        Ok(points)
    }

    fn live_fetch(&self) -> LiveFetch<'_> {
        LiveFetch::Batch(self)
    }
}

#[async_trait]
impl BatchLiveFetch for HyperliquidAdapter {
    async fn fetch_live_batch(&self) -> Result<HashMap<String, FundingPoint>> {
        debug!("Fetching live rates batch from {}", EXCHANGE_ID);

        let (meta, contexts): (Meta, Vec<AssetCtx>) = self
            .client
            .post_info(json!({ "type": "metaAndAssetCtxs" }))
            .await?;

        let now = Utc::now();
        let mut rates = HashMap::new();
        for (entry, ctx) in meta.universe.iter().zip(contexts.iter()) {
            let Some(funding) = &ctx.funding else {
                continue;
            };
            let rate = Decimal::from_str(funding)?;
            rates.insert(entry.name.clone(), FundingPoint::new(rate, now));
        }

        debug!("Fetched {} live rates from {}", rates.len(), EXCHANGE_ID);
        Ok(rates)
    }
}
