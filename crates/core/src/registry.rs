//! Registry of validated exchange adapters.
//!
//! Registration is the runtime half of the adapter contract check: the type
//! system already guarantees every adapter implements history fetching and
//! exactly one live-fetch variant, so what remains to validate is the
//! identifier and the fetch-step constant. An adapter that fails here is
//! rejected before any network call is attempted.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::AdapterError;
use crate::traits::ExchangeAdapter;

/// Validated, identifier-keyed set of exchange adapters.
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: BTreeMap<String, Arc<dyn ExchangeAdapter>>,
}

impl AdapterRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and registers an adapter.
    ///
    /// # Errors
    /// Returns an [`AdapterError`] if the exchange identifier is blank or
    /// already taken, or if the fetch step is not positive.
    pub fn register(&mut self, adapter: Arc<dyn ExchangeAdapter>) -> Result<(), AdapterError> {
        let id = adapter.exchange_id().trim();
        if id.is_empty() {
            return Err(AdapterError::MissingExchangeId);
        }
        let step = adapter.fetch_step_hours();
        if step <= 0 {
            return Err(AdapterError::InvalidFetchStep {
                exchange_id: id.to_string(),
                hours: step,
            });
        }
        if self.adapters.contains_key(id) {
            return Err(AdapterError::DuplicateExchangeId(id.to_string()));
        }

        self.adapters.insert(id.to_string(), adapter);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, exchange_id: &str) -> Option<&Arc<dyn ExchangeAdapter>> {
        self.adapters.get(exchange_id)
    }

    /// Registered adapters in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ExchangeAdapter>> {
        self.adapters.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Contract, ContractInfo, FundingPoint};
    use crate::traits::{BatchLiveFetch, LiveFetch};
    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::collections::HashMap;

    struct StubAdapter {
        id: &'static str,
        step: i64,
    }

    #[async_trait]
    impl BatchLiveFetch for StubAdapter {
        async fn fetch_live_batch(&self) -> Result<HashMap<String, FundingPoint>> {
            Ok(HashMap::new())
        }
    }

    #[async_trait]
    impl ExchangeAdapter for StubAdapter {
        fn exchange_id(&self) -> &str {
            self.id
        }

        fn fetch_step_hours(&self) -> i64 {
            self.step
        }

        fn format_symbol(&self, contract: &Contract) -> String {
            format!("{}{}", contract.asset, contract.quote)
        }

        async fn get_contracts(&self) -> Result<Vec<ContractInfo>> {
            Ok(Vec::new())
        }

        async fn fetch_history(
            &self,
            _contract: &Contract,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> Result<Vec<FundingPoint>> {
            Ok(Vec::new())
        }

        fn live_fetch(&self) -> LiveFetch<'_> {
            LiveFetch::Batch(self)
        }
    }

    #[test]
    fn test_register_valid_adapter() {
        let mut registry = AdapterRegistry::new();
        registry
            .register(Arc::new(StubAdapter { id: "stub", step: 198 }))
            .unwrap();

        assert_eq!(registry.len(), 1);
        assert!(registry.get("stub").is_some());
        assert!(registry.get("other").is_none());
    }

    #[test]
    fn test_register_rejects_blank_id() {
        let mut registry = AdapterRegistry::new();
        let err = registry
            .register(Arc::new(StubAdapter { id: "  ", step: 198 }))
            .unwrap_err();

        assert!(matches!(err, AdapterError::MissingExchangeId));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_rejects_non_positive_step() {
        let mut registry = AdapterRegistry::new();
        let err = registry
            .register(Arc::new(StubAdapter { id: "stub", step: 0 }))
            .unwrap_err();

        assert!(matches!(err, AdapterError::InvalidFetchStep { hours: 0, .. }));
    }

    #[test]
    fn test_register_rejects_duplicate_id() {
        let mut registry = AdapterRegistry::new();
        registry
            .register(Arc::new(StubAdapter { id: "stub", step: 198 }))
            .unwrap();
        let err = registry
            .register(Arc::new(StubAdapter { id: "stub", step: 498 }))
            .unwrap_err();

        assert!(matches!(err, AdapterError::DuplicateExchangeId(_)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_iter_in_identifier_order() {
        let mut registry = AdapterRegistry::new();
        registry
            .register(Arc::new(StubAdapter { id: "zeta", step: 1 }))
            .unwrap();
        registry
            .register(Arc::new(StubAdapter { id: "alpha", step: 1 }))
            .unwrap();

        let ids: Vec<&str> = registry.iter().map(|a| a.exchange_id()).collect();
        assert_eq!(ids, vec!["alpha", "zeta"]);
    }
}
