use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "funding-tracker")]
#[command(about = "Perpetual funding rate tracker", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config/Config.toml", global = true)]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the cron-driven tracker daemon
    Run,
    /// Synchronize the contract registry from the exchanges
    Register {
        /// Limit to one exchange (default: all enabled)
        #[arg(long)]
        exchange: Option<String>,
    },
    /// Full backward backfill for an exchange's active contracts
    Backfill {
        /// Exchange identifier (e.g. "bybit")
        #[arg(long)]
        exchange: String,
        /// Limit to one asset symbol (e.g. "BTC")
        #[arg(long)]
        asset: Option<String>,
    },
    /// Forward catch-up for an exchange's active contracts
    Update {
        /// Exchange identifier (e.g. "bybit")
        #[arg(long)]
        exchange: String,
    },
    /// One-shot live unsettled-rate collection
    CollectLive {
        /// Exchange identifier (e.g. "hyperliquid")
        #[arg(long)]
        exchange: String,
    },
    /// Print recent stored history for one contract
    Show {
        /// Exchange identifier
        #[arg(long)]
        exchange: String,
        /// Asset symbol (e.g. "BTC")
        #[arg(long)]
        asset: String,
        /// Quote symbol (e.g. "USDT")
        #[arg(long)]
        quote: String,
        /// Days of history to print
        #[arg(long, default_value_t = 7)]
        days: i64,
    },
    /// Delete live snapshots older than the given number of days
    PruneLive {
        #[arg(long, default_value_t = 30)]
        older_than_days: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = funding_tracker_core::ConfigLoader::load_from(&cli.config)?;

    match cli.command {
        Commands::Run => commands::run(config).await,
        Commands::Register { exchange } => commands::register(config, exchange.as_deref()).await,
        Commands::Backfill { exchange, asset } => {
            commands::backfill(config, &exchange, asset.as_deref()).await
        }
        Commands::Update { exchange } => commands::update(config, &exchange).await,
        Commands::CollectLive { exchange } => commands::collect_live(config, &exchange).await,
        Commands::Show {
            exchange,
            asset,
            quote,
            days,
        } => commands::show(config, &exchange, &asset, &quote, days).await,
        Commands::PruneLive { older_than_days } => {
            commands::prune_live(config, older_than_days).await
        }
    }
}
