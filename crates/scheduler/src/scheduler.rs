use std::sync::Arc;

use anyhow::Result;
use funding_tracker_core::{AdapterRegistry, FundingStore, SchedulerConfig};
use funding_tracker_data::PostgresFundingStore;
use funding_tracker_sync::{collect_live, register_contracts, update_contract};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

/// Runs the three coordinator jobs on their configured cron cadences.
///
/// The scheduler holds no sync state of its own: every trigger is a
/// fire-and-await coordinator call, and a failed contract or exchange is
/// logged and retried on the next trigger.
pub struct FundingScheduler {
    config: SchedulerConfig,
    store: Arc<PostgresFundingStore>,
    adapters: Arc<AdapterRegistry>,
}

impl FundingScheduler {
    /// Creates a new funding scheduler.
    #[must_use]
    pub fn new(
        config: SchedulerConfig,
        store: Arc<PostgresFundingStore>,
        adapters: Arc<AdapterRegistry>,
    ) -> Self {
        Self {
            config,
            store,
            adapters,
        }
    }

    /// Starts the scheduler and runs until the process is stopped.
    ///
    /// # Errors
    /// Returns an error if the scheduler fails to start or if job
    /// scheduling fails.
    pub async fn start(self) -> Result<()> {
        if !self.config.enabled {
            info!("Funding scheduler is disabled");
            return Ok(());
        }

        info!(
            "Starting funding scheduler (registry: {}, history: {}, live: {})",
            self.config.registry_cron, self.config.history_cron, self.config.live_cron
        );

        let scheduler = JobScheduler::new().await?;

        let store = self.store.clone();
        let adapters = self.adapters.clone();
        let registry_job = Job::new_async(self.config.registry_cron.as_str(), move |_uuid, _lock| {
            let store = store.clone();
            let adapters = adapters.clone();
            Box::pin(async move {
                run_registry_sync(&store, &adapters).await;
            })
        })?;
        scheduler.add(registry_job).await?;

        let store = self.store.clone();
        let adapters = self.adapters.clone();
        let history_job = Job::new_async(self.config.history_cron.as_str(), move |_uuid, _lock| {
            let store = store.clone();
            let adapters = adapters.clone();
            Box::pin(async move {
                run_history_catch_up(&store, &adapters).await;
            })
        })?;
        scheduler.add(history_job).await?;

        let store = self.store.clone();
        let adapters = self.adapters.clone();
        let live_job = Job::new_async(self.config.live_cron.as_str(), move |_uuid, _lock| {
            let store = store.clone();
            let adapters = adapters.clone();
            Box::pin(async move {
                run_live_collection(&store, &adapters).await;
            })
        })?;
        scheduler.add(live_job).await?;

        scheduler.start().await?;
        info!("Funding scheduler started successfully");

        // Keep scheduler running
        loop {
            tokio::time::sleep(tokio::time::Duration::from_secs(60)).await;
        }
    }

    /// Runs the registry sync job once (one-shot execution).
    pub async fn run_registry_once(&self) {
        run_registry_sync(&self.store, &self.adapters).await;
    }

    /// Runs the history catch-up job once (one-shot execution).
    pub async fn run_catch_up_once(&self) {
        run_history_catch_up(&self.store, &self.adapters).await;
    }

    /// Runs the live collection job once (one-shot execution).
    pub async fn run_live_once(&self) {
        run_live_collection(&self.store, &self.adapters).await;
    }
}

async fn run_registry_sync(store: &PostgresFundingStore, adapters: &AdapterRegistry) {
    for adapter in adapters.iter() {
        if let Err(e) = register_contracts(adapter.as_ref(), store).await {
            error!("Registry sync failed for {}: {}", adapter.exchange_id(), e);
        }
    }
}

async fn run_history_catch_up(store: &PostgresFundingStore, adapters: &AdapterRegistry) {
    for adapter in adapters.iter() {
        let contracts = match store.active_contracts(adapter.exchange_id()).await {
            Ok(contracts) => contracts,
            Err(e) => {
                error!(
                    "Could not read active contracts for {}: {}",
                    adapter.exchange_id(),
                    e
                );
                continue;
            }
        };

        for contract in contracts {
            // One contract's failure never blocks the rest; the next
            // trigger retries it.
            if let Err(e) = update_contract(adapter.as_ref(), &contract, store).await {
                error!(
                    "Catch-up failed for {}/{}: {}",
                    adapter.exchange_id(),
                    contract,
                    e
                );
            }
        }
    }
}

async fn run_live_collection(store: &PostgresFundingStore, adapters: &AdapterRegistry) {
    for adapter in adapters.iter() {
        if let Err(e) = collect_live(adapter.as_ref(), adapter.exchange_id(), store).await {
            error!(
                "Live collection failed for {}: {}",
                adapter.exchange_id(),
                e
            );
        }
    }
}
