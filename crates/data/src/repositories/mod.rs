//! Database repositories for funding rate tracking.
//!
//! Each repository provides typed access to its tables; the insert paths
//! all use bulk-insert-ignore so overlapping window fetches deduplicate in
//! the database rather than in application code.

pub mod contract_repo;
pub mod historical_repo;
pub mod live_repo;

pub use contract_repo::ContractRepository;
pub use historical_repo::HistoricalFundingPointRepository;
pub use live_repo::LiveFundingPointRepository;
