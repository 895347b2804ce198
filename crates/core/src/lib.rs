//! Core types and contracts for the funding tracker.
//!
//! This crate provides:
//! - Domain types for sections, contracts, and funding points
//! - The exchange adapter capability contract and live-fetch variants
//! - The persistence contract the coordinators are written against
//! - The validated adapter registry and application configuration

pub mod config;
pub mod config_loader;
pub mod domain;
pub mod error;
pub mod registry;
pub mod traits;

pub use config::{AppConfig, DatabaseConfig, ExchangeConfig, ExchangesConfig, SchedulerConfig};
pub use config_loader::ConfigLoader;
pub use domain::{
    Asset, Contract, ContractInfo, FundingPoint, HistoricalFundingPoint, LiveFundingPoint, Quote,
    ReconcileSummary, Section,
};
pub use error::AdapterError;
pub use registry::AdapterRegistry;
pub use traits::{BatchLiveFetch, ExchangeAdapter, FundingStore, LiveFetch, SingleLiveFetch};
