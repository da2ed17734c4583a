use reqwest::Url;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::ApiCache;
use crate::client::{MealDbClient, RetryPolicy};
use crate::config::ClientConfig;
use crate::transport::{HttpTransport, Transport};
use crate::ApiError;

/// Builder for [`MealDbClient`]
///
/// Starts from [`ClientConfig::default`] (or the config passed to
/// [`MealDbClientBuilder::config`]); individual setters override it.
#[derive(Default)]
pub struct MealDbClientBuilder {
    config: Option<ClientConfig>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    max_attempts: Option<u32>,
    retry_delay: Option<Duration>,
    cache_ttl: Option<Duration>,
    cache: Option<Arc<ApiCache>>,
    transport: Option<Arc<dyn Transport>>,
}

impl MealDbClientBuilder {
    /// Use a loaded configuration as the starting point
    ///
    /// # Example
    /// ```no_run
    /// use mealdb_client::{ClientConfig, MealDbClient};
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = MealDbClient::builder()
    ///     .config(ClientConfig::load()?)
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Point the client at another deployment of the API
    ///
    /// # Example
    /// ```
    /// use mealdb_client::MealDbClient;
    ///
    /// let client = MealDbClient::builder()
    ///     .base_url("https://www.themealdb.com/api/json/v1/1/")
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(client.base_url(), "https://www.themealdb.com/api/json/v1/1");
    /// ```
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the per-attempt request timeout
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Set the total number of attempts per request
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Set the base backoff delay
    ///
    /// # Example
    /// ```
    /// use mealdb_client::MealDbClient;
    /// use std::time::Duration;
    ///
    /// let client = MealDbClient::builder()
    ///     .retry_delay(Duration::from_millis(250))
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(client.policy().backoff(1), Duration::from_millis(500));
    /// ```
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = Some(delay);
        self
    }

    /// Set the TTL of the cache the builder creates
    ///
    /// Ignored when a cache is supplied with [`MealDbClientBuilder::cache`].
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    /// Share an existing cache, e.g. between several clients
    pub fn cache(mut self, cache: Arc<ApiCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Replace the HTTP transport
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client
    ///
    /// # Errors
    /// Returns `ApiError` if:
    /// - the base URL is not an absolute URL
    /// - the default HTTP transport cannot be created
    pub fn build(self) -> Result<MealDbClient, ApiError> {
        let config = self.config.unwrap_or_default();

        let base_url = self
            .base_url
            .unwrap_or_else(|| config.base_url.clone())
            .trim_end_matches('/')
            .to_string();
        Url::parse(&base_url).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let policy = RetryPolicy {
            max_attempts: self.max_attempts.unwrap_or(config.max_attempts),
            base_delay: self.retry_delay.unwrap_or_else(|| config.retry_delay()),
            request_timeout: self.timeout.unwrap_or_else(|| config.request_timeout()),
        };

        let cache = match self.cache {
            Some(cache) => cache,
            None => Arc::new(ApiCache::new(
                self.cache_ttl.unwrap_or_else(|| config.cache_ttl()),
            )),
        };

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(&config.user_agent, None)?),
        };

        Ok(MealDbClient::from_parts(base_url, transport, cache, policy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_config() {
        let client = MealDbClient::builder().build().unwrap();
        let policy = client.policy();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay, Duration::from_secs(1));
        assert_eq!(policy.request_timeout, Duration::from_secs(10));
        assert_eq!(client.cache().ttl(), Duration::from_secs(300));
        assert_eq!(client.base_url(), crate::config::DEFAULT_BASE_URL);
    }

    #[test]
    fn test_setters_override_config() {
        let config = ClientConfig {
            max_attempts: 5,
            timeout_secs: 30,
            ..Default::default()
        };
        let client = MealDbClient::builder()
            .config(config)
            .max_attempts(2)
            .cache_ttl(Duration::from_secs(1))
            .build()
            .unwrap();

        assert_eq!(client.policy().max_attempts, 2);
        assert_eq!(client.policy().request_timeout, Duration::from_secs(30));
        assert_eq!(client.cache().ttl(), Duration::from_secs(1));
    }

    #[test]
    fn test_shared_cache() {
        let cache = Arc::new(ApiCache::new(Duration::from_secs(42)));
        let a = MealDbClient::builder().cache(cache.clone()).build().unwrap();
        let b = MealDbClient::builder()
            .cache(cache.clone())
            .cache_ttl(Duration::from_secs(1))
            .build()
            .unwrap();

        assert!(Arc::ptr_eq(a.cache(), b.cache()));
        assert_eq!(b.cache().ttl(), Duration::from_secs(42));
    }

    #[test]
    fn test_invalid_base_url() {
        let result = MealDbClient::builder().base_url("not a url").build();
        assert!(matches!(result, Err(ApiError::InvalidUrl(_))));
    }
}
