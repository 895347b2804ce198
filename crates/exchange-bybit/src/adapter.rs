//! Bybit exchange adapter.
//!
//! Bybit lists both USDT and USDC linear perpetuals; USDC contracts use the
//! `PERP` symbol suffix. The funding history endpoint serves at most 200
//! records per call and the minimum funding interval is 1 hour, so the
//! fetch step is 198 hours (200 - 2 safety buffer). There is no batch live
//! endpoint; unsettled rates come from per-symbol ticker calls fanned out
//! by the collector.

use std::str::FromStr;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use funding_tracker_core::{
    Contract, ContractInfo, ExchangeAdapter, FundingPoint, LiveFetch, SingleLiveFetch,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::client::BybitClient;

pub const EXCHANGE_ID: &str = "bybit";

/// 200 records max, 1-hour minimum interval: 198 hours (200 - 2 safety buffer).
pub const FETCH_STEP_HOURS: i64 = 198;

/// Quote-currency symbol suffixes; quotes not listed here use their own name.
const QUOTE_SUFFIXES: &[(&str, &str)] = &[("USDT", "USDT"), ("USDC", "PERP")];

#[derive(Debug, Deserialize)]
struct InstrumentsResult {
    list: Vec<Instrument>,
    #[serde(rename = "nextPageCursor")]
    next_page_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Instrument {
    #[serde(rename = "contractType")]
    contract_type: String,
    #[serde(rename = "baseCoin")]
    base_coin: String,
    #[serde(rename = "quoteCoin")]
    quote_coin: String,
    /// Funding interval in minutes.
    #[serde(rename = "fundingInterval")]
    funding_interval: i32,
}

#[derive(Debug, Deserialize)]
struct FundingHistoryResult {
    list: Vec<FundingHistoryEntry>,
}

#[derive(Debug, Deserialize)]
struct FundingHistoryEntry {
    #[serde(rename = "fundingRate")]
    funding_rate: String,
    #[serde(rename = "fundingRateTimestamp")]
    funding_rate_timestamp: String,
}

#[derive(Debug, Deserialize)]
struct TickersResult {
    list: Vec<Ticker>,
}

#[derive(Debug, Deserialize)]
struct Ticker {
    #[serde(rename = "fundingRate")]
    funding_rate: String,
}

pub struct BybitAdapter {
    client: BybitClient,
}

impl BybitAdapter {
    #[must_use]
    pub fn new(client: BybitClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ExchangeAdapter for BybitAdapter {
    fn exchange_id(&self) -> &str {
        EXCHANGE_ID
    }

    fn fetch_step_hours(&self) -> i64 {
        FETCH_STEP_HOURS
    }

    fn format_symbol(&self, contract: &Contract) -> String {
        let suffix = QUOTE_SUFFIXES
            .iter()
            .find(|(quote, _)| *quote == contract.quote)
            .map_or(contract.quote.as_str(), |(_, suffix)| *suffix);
        format!("{}{}", contract.asset, suffix)
    }

    async fn get_contracts(&self) -> Result<Vec<ContractInfo>> {
        debug!("Fetching contracts from {}", EXCHANGE_ID);

        let mut instruments = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut params = vec![("category", "linear".to_string())];
            if let Some(cursor) = &cursor {
                params.push(("cursor", cursor.clone()));
            }

            let page: InstrumentsResult = self
                .client
                .get("/v5/market/instruments-info", &params)
                .await?;
            instruments.extend(page.list);

            match page.next_page_cursor {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => break,
            }
        }

        let contracts = instruments
            .into_iter()
            .filter(|instrument| instrument.contract_type == "LinearPerpetual")
            .map(|instrument| ContractInfo {
                asset: instrument.base_coin,
                quote: instrument.quote_coin,
                funding_interval_hours: instrument.funding_interval / 60,
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

        let result: FundingHistoryResult = self
            .client
            .get(
                "/v5/market/funding/history",
                &[
                    ("symbol", symbol.clone()),
                    ("category", "linear".to_string()),
                    ("startTime", start.timestamp_millis().to_string()),
                    ("endTime", end.timestamp_millis().to_string()),
                ],
            )
            .await?;

        let mut points = Vec::with_capacity(result.list.len());
        for entry in result.list {
            let rate = Decimal::from_str(&entry.funding_rate)?;
            let millis: i64 = entry.funding_rate_timestamp.parse()?;
            let timestamp = DateTime::from_timestamp_millis(millis)
                .ok_or_else(|| anyhow!("funding timestamp out of range: {millis}"))?;
            points.push(FundingPoint::new(rate, timestamp));
        }

        // The venue returns newest-first; the adapter contract promises
        // chronological order.
        points.sort_by_key(|p| p.timestamp);

        debug!(
            "Fetched {} funding points for {}/{}",
            points.len(),
            EXCHANGE_ID,
            symbol
        );
        Ok(points)
    }

    fn live_fetch(&self) -> LiveFetch<'_> {
        LiveFetch::Single(self)
    }
}

#[async_trait]
impl SingleLiveFetch for BybitAdapter {
    async fn fetch_live(&self, contract: &Contract) -> Result<FundingPoint> {
        let symbol = self.format_symbol(contract);

        debug!("Fetching live rate for {}/{}", EXCHANGE_ID, symbol);

        let result: TickersResult = self
            .client
            .get(
                "/v5/market/tickers",
                &[
                    ("symbol", symbol.clone()),
                    ("category", "linear".to_string()),
                ],
            )
            .await?;

        let Some(ticker) = result.list.first() else {
            bail!("no funding rate data for {symbol}");
        };

        let rate = Decimal::from_str(&ticker.funding_rate)?;
        Ok(FundingPoint::new(rate, Utc::now()))
    }
}
