pub mod adapter;
pub mod client;

pub use adapter::{BybitAdapter, EXCHANGE_ID, FETCH_STEP_HOURS};
pub use client::{BybitClient, BYBIT_API_URL};
