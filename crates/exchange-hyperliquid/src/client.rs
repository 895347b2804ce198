use anyhow::Result;
use governor::{clock::DefaultClock, state::InMemoryState, Quota, RateLimiter};
use nonzero_ext::nonzero;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Hyperliquid production API base URL.
pub const HYPERLIQUID_API_URL: &str = "https://api.hyperliquid.xyz";

/// Rate-limited client for the Hyperliquid info endpoint.
pub struct HyperliquidClient {
    http_client: Client,
    base_url: String,
    rate_limiter: Arc<RateLimiter<governor::state::direct::NotKeyed, InMemoryState, DefaultClock>>,
}

impl HyperliquidClient {
    #[must_use]
    pub fn new(base_url: String) -> Self {
        // Info endpoint weight budget is 1200/min; 10/s keeps headroom for
        // other consumers of the same IP.
        let quota = Quota::per_second(nonzero!(10u32));
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Self {
            http_client: Client::new(),
            base_url,
            rate_limiter,
        }
    }

    /// Posts a typed info request.
    ///
    /// # Errors
    /// Returns an error if the request fails, the venue answers with an
    /// error status, or the body does not deserialize.
    pub async fn post_info<T: DeserializeOwned>(&self, body: serde_json::Value) -> Result<T> {
        self.rate_limiter.until_ready().await;
        let url = format!("{}/info", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}
