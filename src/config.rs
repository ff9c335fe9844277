//! Client configuration
//!
//! Everything process-specific lives here and is handed to the transport
//! explicitly; the fetch layer itself holds no global state.

use std::collections::HashMap;
use std::env;
use std::time::Duration;

use crate::rate_limit::RateLimiter;
use crate::retry::RetryConfig;
use crate::source::Source;

/// Environment variable read by [`ClientConfig::from_env`]
pub const OPENFDA_API_KEY_ENV: &str = "OPENFDA_API_KEY";

const DEFAULT_RATE_LIMIT: f64 = 4.0;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the HTTP transport and the query builder
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// openFDA API key, appended as `api_key` to Drugs@FDA requests
    pub api_key: Option<String>,
    /// Requests per second across all sources; `None` uses the default
    pub rate_limit: Option<f64>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Custom User-Agent header
    pub user_agent: Option<String>,
    /// Per-source base URL overrides
    pub base_urls: HashMap<Source, String>,
    /// Per-source page size overrides
    pub page_sizes: HashMap<Source, usize>,
    /// Backoff policy for transient failures
    pub retry_config: RetryConfig,
}

impl ClientConfig {
    /// Default configuration: public endpoints, no API key, 4 requests/second
    pub fn new() -> Self {
        Self {
            api_key: None,
            rate_limit: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: None,
            base_urls: HashMap::new(),
            page_sizes: HashMap::new(),
            retry_config: RetryConfig::default(),
        }
    }

    /// Default configuration plus the openFDA API key from `OPENFDA_API_KEY`, if set
    pub fn from_env() -> Self {
        let config = Self::new();
        match env::var(OPENFDA_API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => config.with_api_key(key.trim()),
            _ => config,
        }
    }

    /// Set the openFDA API key
    ///
    /// # Example
    ///
    /// ```
    /// use regbot_client::ClientConfig;
    ///
    /// let config = ClientConfig::new().with_api_key("your_api_key_here");
    /// assert_eq!(config.api_key.as_deref(), Some("your_api_key_here"));
    /// ```
    pub fn with_api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the shared rate limit in requests per second
    pub fn with_rate_limit(mut self, rate: f64) -> Self {
        self.rate_limit = Some(rate);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_timeout_seconds(self, seconds: u64) -> Self {
        self.with_timeout(Duration::from_secs(seconds))
    }

    pub fn with_user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Point one source at a different base URL (mirrors, test servers)
    ///
    /// # Example
    ///
    /// ```
    /// use regbot_client::{ClientConfig, Source};
    ///
    /// let config = ClientConfig::new().with_base_url(Source::DrugsFda, "http://localhost:8080/");
    /// assert_eq!(config.effective_base_url(Source::DrugsFda), "http://localhost:8080");
    /// ```
    pub fn with_base_url<S: Into<String>>(mut self, source: Source, base_url: S) -> Self {
        self.base_urls.insert(source, base_url.into());
        self
    }

    /// Override the page size requested from a paginated source
    ///
    /// Values are clamped to the source's accepted range when the query is built.
    pub fn with_page_size(mut self, source: Source, page_size: usize) -> Self {
        self.page_sizes.insert(source, page_size);
        self
    }

    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    /// Base URL for `source` without a trailing slash
    pub fn effective_base_url(&self, source: Source) -> &str {
        self.base_urls
            .get(&source)
            .map(String::as_str)
            .unwrap_or_else(|| source.default_base_url())
            .trim_end_matches('/')
    }

    /// Page size for `source`, clamped to what the API accepts
    pub fn effective_page_size(&self, source: Source) -> Option<usize> {
        let requested = self
            .page_sizes
            .get(&source)
            .copied()
            .or_else(|| source.default_page_size())?;
        let max = source.max_page_size().unwrap_or(requested);
        Some(requested.clamp(1, max))
    }

    pub fn effective_rate_limit(&self) -> f64 {
        self.rate_limit.unwrap_or(DEFAULT_RATE_LIMIT)
    }

    pub fn effective_user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("regbot-client/{}", env!("CARGO_PKG_VERSION")))
    }

    /// Extra query parameters the transport appends for `source`
    pub fn build_api_params(&self, source: Source) -> Vec<(String, String)> {
        match (source, &self.api_key) {
            (Source::DrugsFda, Some(key)) => vec![("api_key".to_string(), key.clone())],
            _ => Vec::new(),
        }
    }

    pub fn create_rate_limiter(&self) -> RateLimiter {
        RateLimiter::new(self.effective_rate_limit())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}
