//! Typed errors for adapter contract violations.
//!
//! These are construction-time failures: an adapter that trips one of them
//! never reaches the registry, so no network call is ever attempted on its
//! behalf. Transient fetch and storage failures flow through `anyhow`
//! unchanged instead.

use thiserror::Error;

/// Violations of the exchange adapter contract, detected at registration.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The adapter reports a blank exchange identifier.
    #[error("adapter has a blank exchange identifier")]
    MissingExchangeId,

    /// The fetch step must be a positive number of hours.
    #[error("{exchange_id}: invalid fetch step of {hours} hours")]
    InvalidFetchStep {
        exchange_id: String,
        hours: i64,
    },

    /// Two adapters claimed the same exchange identifier.
    #[error("{0}: an adapter with this exchange identifier is already registered")]
    DuplicateExchangeId(String),
}
