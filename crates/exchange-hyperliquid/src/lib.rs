pub mod adapter;
pub mod client;

pub use adapter::{HyperliquidAdapter, EXCHANGE_ID, FETCH_STEP_HOURS};
pub use client::{HyperliquidClient, HYPERLIQUID_API_URL};
