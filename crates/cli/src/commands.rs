//! Command implementations: wire config into a store plus adapter registry
//! and invoke the coordinators.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use funding_tracker_bybit::{BybitAdapter, BybitClient};
use funding_tracker_core::{AdapterRegistry, AppConfig, ExchangeAdapter, FundingStore};
use funding_tracker_data::{DatabaseClient, PostgresFundingStore};
use funding_tracker_hyperliquid::{HyperliquidAdapter, HyperliquidClient};
use funding_tracker_scheduler::FundingScheduler;
use funding_tracker_sync::{collect_live as collect_live_once, register_contracts, sync_contract, update_contract};
use tracing::{error, info, warn};

struct AppContext {
    store: Arc<PostgresFundingStore>,
    adapters: Arc<AdapterRegistry>,
}

async fn build_context(config: &AppConfig) -> Result<AppContext> {
    let db = DatabaseClient::new(&config.database.url, config.database.max_connections).await?;
    db.migrate().await?;
    let store = Arc::new(PostgresFundingStore::new(db.pool()));

    let mut adapters = AdapterRegistry::new();
    if config.exchanges.hyperliquid.enabled {
        let client = HyperliquidClient::new(config.exchanges.hyperliquid.api_url.clone());
        adapters.register(Arc::new(HyperliquidAdapter::new(client)))?;
    }
    if config.exchanges.bybit.enabled {
        let client = BybitClient::new(config.exchanges.bybit.api_url.clone());
        adapters.register(Arc::new(BybitAdapter::new(client)))?;
    }

    Ok(AppContext {
        store,
        adapters: Arc::new(adapters),
    })
}

fn adapter<'a>(
    ctx: &'a AppContext,
    exchange: &str,
) -> Result<&'a Arc<dyn ExchangeAdapter>> {
    ctx.adapters
        .get(exchange)
        .ok_or_else(|| anyhow!("unknown or disabled exchange: {exchange}"))
}

pub async fn run(config: AppConfig) -> Result<()> {
    let ctx = build_context(&config).await?;
    if ctx.adapters.is_empty() {
        warn!("No exchanges enabled, nothing to schedule");
        return Ok(());
    }

    FundingScheduler::new(config.scheduler.clone(), ctx.store, ctx.adapters)
        .start()
        .await
}

pub async fn register(config: AppConfig, exchange: Option<&str>) -> Result<()> {
    let ctx = build_context(&config).await?;

    match exchange {
        Some(exchange) => {
            register_contracts(adapter(&ctx, exchange)?.as_ref(), ctx.store.as_ref()).await?;
        }
        None => {
            for adapter in ctx.adapters.iter() {
                register_contracts(adapter.as_ref(), ctx.store.as_ref()).await?;
            }
        }
    }
    Ok(())
}

pub async fn backfill(config: AppConfig, exchange: &str, asset: Option<&str>) -> Result<()> {
    let ctx = build_context(&config).await?;
    let adapter = adapter(&ctx, exchange)?;

    let mut contracts = ctx.store.active_contracts(exchange).await?;
    if let Some(asset) = asset {
        contracts.retain(|c| c.asset.eq_ignore_ascii_case(asset));
    }
    if contracts.is_empty() {
        warn!("No matching active contracts for {}", exchange);
        return Ok(());
    }

    info!("Backfilling {} contracts on {}", contracts.len(), exchange);
    for contract in contracts {
        if let Err(e) = sync_contract(adapter.as_ref(), &contract, ctx.store.as_ref()).await {
            error!("Backfill failed for {}/{}: {}", exchange, contract, e);
        }
    }
    Ok(())
}

pub async fn update(config: AppConfig, exchange: &str) -> Result<()> {
    let ctx = build_context(&config).await?;
    let adapter = adapter(&ctx, exchange)?;

    let contracts = ctx.store.active_contracts(exchange).await?;
    if contracts.is_empty() {
        warn!("No active contracts for {}", exchange);
        return Ok(());
    }

    for contract in contracts {
        if let Err(e) = update_contract(adapter.as_ref(), &contract, ctx.store.as_ref()).await {
            error!("Catch-up failed for {}/{}: {}", exchange, contract, e);
        }
    }
    Ok(())
}

pub async fn collect_live(config: AppConfig, exchange: &str) -> Result<()> {
    let ctx = build_context(&config).await?;
    let adapter = adapter(&ctx, exchange)?;

    let outcome = collect_live_once(adapter.as_ref(), exchange, ctx.store.as_ref()).await?;
    info!(
        "Collected {}/{} live rates for {}",
        outcome.collected, outcome.requested, exchange
    );
    Ok(())
}

pub async fn show(
    config: AppConfig,
    exchange: &str,
    asset: &str,
    quote: &str,
    days: i64,
) -> Result<()> {
    let ctx = build_context(&config).await?;

    let contracts = ctx.store.active_contracts(exchange).await?;
    let contract = contracts
        .iter()
        .find(|c| c.asset.eq_ignore_ascii_case(asset) && c.quote.eq_ignore_ascii_case(quote))
        .ok_or_else(|| anyhow!("no active contract {asset}/{quote} on {exchange}"))?;

    let end = Utc::now();
    let start = end - Duration::days(days);
    let points = ctx
        .store
        .historical
        .query_by_time_range(contract.id, start, end)
        .await?;

    println!("{} {} ({} points over {} days)", exchange, contract, points.len(), days);
    for point in points {
        println!("{}  {}", point.timestamp, point.rate);
    }
    Ok(())
}

pub async fn prune_live(config: AppConfig, older_than_days: i64) -> Result<()> {
    let ctx = build_context(&config).await?;

    let cutoff = Utc::now() - Duration::days(older_than_days);
    let deleted = ctx.store.live.delete_before(cutoff).await?;
    info!(
        "Pruned {} live snapshots older than {} days",
        deleted, older_than_days
    );
    Ok(())
}
