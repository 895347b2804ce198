use anyhow::{bail, Result};
use governor::{clock::DefaultClock, state::InMemoryState, Quota, RateLimiter};
use nonzero_ext::nonzero;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;

/// Bybit production API base URL.
pub const BYBIT_API_URL: &str = "https://api.bybit.com";

/// Envelope wrapping every v5 API response.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    #[serde(rename = "retCode")]
    ret_code: i64,
    #[serde(rename = "retMsg")]
    ret_msg: String,
    result: T,
}

/// Rate-limited client for the Bybit v5 market endpoints.
pub struct BybitClient {
    http_client: Client,
    base_url: String,
    rate_limiter: Arc<RateLimiter<governor::state::direct::NotKeyed, InMemoryState, DefaultClock>>,
}

impl BybitClient {
    #[must_use]
    pub fn new(base_url: String) -> Self {
        // Public market endpoints allow 10 req/s per IP.
        let quota = Quota::per_second(nonzero!(10u32));
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Self {
            http_client: Client::new(),
            base_url,
            rate_limiter,
        }
    }

    /// Issues a typed GET request and unwraps the v5 response envelope.
    ///
    /// # Errors
    /// Returns an error if the request fails, the venue answers with an
    /// error status or a non-zero `retCode`, or the body does not
    /// deserialize.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        self.rate_limiter.until_ready().await;
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http_client
            .get(&url)
            .query(params)
            .send()
            .await?
            .error_for_status()?;

        let envelope: ApiResponse<T> = response.json().await?;
        if envelope.ret_code != 0 {
            bail!(
                "bybit API error {}: {}",
                envelope.ret_code,
                envelope.ret_msg
            );
        }
        Ok(envelope.result)
    }
}
