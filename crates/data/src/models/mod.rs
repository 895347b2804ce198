//! Row types backing the domain model.
//!
//! Queries deserialize into these `sqlx::FromRow` types, which convert into
//! the sqlx-free domain types from the core crate.

pub mod contract;
pub mod funding_point;

pub use contract::ContractRow;
pub use funding_point::FundingPointRow;
