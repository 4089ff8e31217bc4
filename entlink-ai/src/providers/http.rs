//! Shared HTTP plumbing for provider clients
//!
//! Every provider gets its own `reqwest` client (identifying user agent,
//! per-provider timeout) and its own token-bucket limiter. The limiter is
//! awaited before each call, so calls to one provider are spaced by at least
//! `min_interval` regardless of outcome, even when entities are enriched
//! concurrently.

use crate::config::ProviderSettings;
use crate::types::LookupError;
use governor::{Quota, RateLimiter};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

type DirectLimiter = RateLimiter<
    governor::state::direct::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Rate-limited HTTP client for one provider
pub struct ProviderHttp {
    name: &'static str,
    client: Client,
    base_url: String,
    /// `None` when the configured interval is zero
    limiter: Option<DirectLimiter>,
}

impl ProviderHttp {
    pub fn new(
        name: &'static str,
        settings: &ProviderSettings,
        user_agent: &str,
    ) -> Result<Self, LookupError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(settings.timeout)
            .build()
            .map_err(|e| LookupError::Configuration(format!("{} client: {}", name, e)))?;

        // Quota::with_period returns None for a zero period
        let limiter = Quota::with_period(settings.min_interval).map(RateLimiter::direct);

        Ok(Self {
            name,
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            limiter,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `{base_url}{path}` and decode a JSON body
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, LookupError> {
        let response = self.send(path, query).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| LookupError::Parse(format!("{}: {}", self.name, e)))
    }

    /// GET `{base_url}{path}` and return the body as text
    pub async fn get_text(&self, path: &str, query: &[(&str, &str)]) -> Result<String, LookupError> {
        let response = self.send(path, query).await?;
        response.text().await.map_err(LookupError::from)
    }

    async fn send(&self, path: &str, query: &[(&str, &str)]) -> Result<Response, LookupError> {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }

        let url = format!("{}{}", self.base_url, path);
        debug!(provider = self.name, url = %url, ?query, "Provider request");

        let response = self.client.get(&url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn settings(min_interval_ms: u64) -> ProviderSettings {
        ProviderSettings {
            base_url: "http://127.0.0.1:9/".to_string(),
            timeout: Duration::from_secs(1),
            min_interval: Duration::from_millis(min_interval_ms),
        }
    }

    #[test]
    fn test_client_creation() {
        let http = ProviderHttp::new("test", &settings(100), "entlink-test").unwrap();
        assert_eq!(http.name(), "test");
        assert_eq!(http.base_url(), "http://127.0.0.1:9");
        assert!(http.limiter.is_some());
    }

    #[test]
    fn test_zero_interval_disables_limiter() {
        let http = ProviderHttp::new("test", &settings(0), "entlink-test").unwrap();
        assert!(http.limiter.is_none());
    }

    #[tokio::test]
    async fn test_limiter_spaces_calls() {
        let http = ProviderHttp::new("test", &settings(200), "entlink-test").unwrap();
        let limiter = http.limiter.as_ref().unwrap();

        let start = Instant::now();
        limiter.until_ready().await;
        let first = start.elapsed();
        limiter.until_ready().await;
        limiter.until_ready().await;
        let third = start.elapsed();

        assert!(first < Duration::from_millis(100));
        assert!(third >= Duration::from_millis(350));
    }

    #[tokio::test]
    async fn test_connection_failure_is_a_lookup_error() {
        let http = ProviderHttp::new("test", &settings(0), "entlink-test").unwrap();
        let result = http.get_text("/nothing", &[]).await;
        assert!(matches!(
            result,
            Err(LookupError::Network(_)) | Err(LookupError::Timeout)
        ));
    }
}
