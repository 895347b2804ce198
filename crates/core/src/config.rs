use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub scheduler: SchedulerConfig,
    pub exchanges: ExchangesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Cron cadences for the three coordinator jobs. Expressions use the
/// seconds-first format of `tokio-cron-scheduler`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub enabled: bool,
    /// Contract registry reconciliation.
    pub registry_cron: String,
    /// Forward history catch-up for active contracts.
    pub history_cron: String,
    /// Live unsettled-rate collection.
    pub live_cron: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangesConfig {
    pub hyperliquid: ExchangeConfig,
    pub bybit: ExchangeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    pub enabled: bool,
    pub api_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "postgresql://localhost/funding_tracker".to_string(),
                max_connections: 10,
            },
            scheduler: SchedulerConfig {
                enabled: true,
                registry_cron: "0 0 * * * *".to_string(),
                history_cron: "0 15 * * * *".to_string(),
                live_cron: "0 */5 * * * *".to_string(),
            },
            exchanges: ExchangesConfig {
                hyperliquid: ExchangeConfig {
                    enabled: true,
                    api_url: "https://api.hyperliquid.xyz".to_string(),
                },
                bybit: ExchangeConfig {
                    enabled: true,
                    api_url: "https://api.bybit.com".to_string(),
                },
            },
        }
    }
}
