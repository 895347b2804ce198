//! Synchronization coordinators for the funding tracker.
//!
//! Each entry point is a single fire-and-await operation with no in-process
//! state between invocations; all state lives in storage. Coordinators are
//! written against the adapter and store contracts from the core crate, so
//! any exchange and any storage backend plug in:
//!
//! - `register_contracts`: reconcile an exchange's listing into storage
//! - `sync_contract`: backward backfill of a contract's full history
//! - `update_contract`: forward catch-up from the newest stored point
//! - `collect_live`: snapshot unsettled rates for a section's contracts

pub mod fanout;
pub mod history;
pub mod live;
pub mod registry;

pub use fanout::{fetch_live_parallel, LIVE_FETCH_CONCURRENCY};
pub use history::{sync_contract, update_contract, BackfillOutcome, CatchUpOutcome};
pub use live::{collect_live, LiveCollectOutcome};
pub use registry::register_contracts;

#[cfg(test)]
pub(crate) mod support;
