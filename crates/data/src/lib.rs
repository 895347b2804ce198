//! Postgres storage for the funding tracker.
//!
//! This crate provides:
//! - Database client with embedded schema migrations
//! - Row models for stored contracts and funding points
//! - Repositories with bulk-insert-ignore write paths
//! - `PostgresFundingStore`, the persistence-contract implementation

pub mod database;
pub mod models;
pub mod repositories;
pub mod store;

// Re-export commonly used types
pub use database::DatabaseClient;
pub use models::{ContractRow, FundingPointRow};
pub use repositories::{
    ContractRepository, HistoricalFundingPointRepository, LiveFundingPointRepository,
};
pub use store::PostgresFundingStore;
