//! Cron-driven trigger layer for the funding tracker.
//!
//! Wires the coordinators from `funding-tracker-sync` to configured cron
//! cadences. Retry policy lives here by omission: failures are logged and
//! the next trigger retries; the coordinators themselves never loop.

pub mod scheduler;

pub use scheduler::FundingScheduler;
