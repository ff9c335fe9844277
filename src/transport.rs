//! The HTTP boundary
//!
//! The fetch layer only sees [`Transport`]: give it a [`RequestDescriptor`],
//! get parsed JSON back. [`HttpTransport`] is the production implementation;
//! tests substitute recorded fixtures.

use std::result;
use std::sync::Arc;

use reqwest::blocking::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::ClientConfig;
use crate::query::RequestDescriptor;
use crate::rate_limit::RateLimiter;
use crate::retry::{with_retry, RetryableError};

/// Failure reported by a [`Transport`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The server answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The connection could not be established or was interrupted
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The response body was not valid JSON
    #[error("Undecodable response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_decode() {
            TransportError::Decode(err.to_string())
        } else {
            TransportError::Connection(err.to_string())
        }
    }
}

impl RetryableError for TransportError {
    fn is_retryable(&self) -> bool {
        match self {
            TransportError::Status { status, .. } => *status == 429 || (500..=599).contains(status),
            TransportError::Connection(_) | TransportError::Timeout(_) | TransportError::Decode(_) => true,
        }
    }

    fn retry_reason(&self) -> &str {
        match self {
            TransportError::Status { status: 429, .. } => "Rate limit exceeded",
            TransportError::Status { status, .. } if (500..=599).contains(status) => "Server error",
            TransportError::Status { .. } => "Client error",
            TransportError::Connection(_) => "Network error",
            TransportError::Timeout(_) => "Request timeout",
            TransportError::Decode(_) => "Invalid response body",
        }
    }
}

/// Performs one request and returns the parsed JSON body
///
/// Implementations own timeouts, rate limiting and any retrying. Whether an
/// implementation may be shared across threads is its own contract.
pub trait Transport {
    fn send(&self, request: &RequestDescriptor) -> result::Result<Value, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &RequestDescriptor) -> result::Result<Value, TransportError> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, request: &RequestDescriptor) -> result::Result<Value, TransportError> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: &RequestDescriptor) -> result::Result<Value, TransportError> {
        (**self).send(request)
    }
}

/// Blocking HTTP transport over reqwest
///
/// Resolves each request against the configured base URL of its source,
/// appends the openFDA API key when one is set, waits on a shared token bucket
/// and retries 429/5xx/network failures with exponential backoff.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    rate_limiter: RateLimiter,
    config: ClientConfig,
}

impl HttpTransport {
    /// Create a transport from `config`
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Connection` if the TLS backend cannot be initialized.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use regbot_client::{ClientConfig, HttpTransport};
    ///
    /// let transport = HttpTransport::new(ClientConfig::new().with_rate_limit(2.0))?;
    /// # Ok::<(), regbot_client::TransportError>(())
    /// ```
    pub fn new(config: ClientConfig) -> result::Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(config.effective_user_agent())
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::Connection(format!("failed to create HTTP client: {e}")))?;

        Ok(Self::with_client(client, config))
    }

    /// Create a transport around a preconfigured reqwest client
    ///
    /// The client's own settings (timeout, user agent, proxies) are used as is.
    pub fn with_client(client: Client, config: ClientConfig) -> Self {
        Self {
            client,
            rate_limiter: config.create_rate_limiter(),
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn get_json(&self, url: &str) -> result::Result<Value, TransportError> {
        self.rate_limiter.acquire();
        debug!("Making API request to: {}", redact_api_key(url));

        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: if body.trim().is_empty() {
                    status.canonical_reason().unwrap_or("Unknown error").to_string()
                } else {
                    body
                },
            });
        }

        response.json::<Value>().map_err(|e| TransportError::Decode(e.to_string()))
    }
}

impl Transport for HttpTransport {
    #[instrument(skip(self, request), fields(source = %request.source, path = %request.path))]
    fn send(&self, request: &RequestDescriptor) -> result::Result<Value, TransportError> {
        let url = request.to_url(
            self.config.effective_base_url(request.source),
            &self.config.build_api_params(request.source),
        );

        let result = with_retry(|| self.get_json(&url), &self.config.retry_config, "source API request");
        if let Err(err) = &result {
            warn!(error = %err, "API request failed");
        }
        result
    }
}

/// Strip the API key value before a URL is logged
fn redact_api_key(url: &str) -> String {
    match url.find("api_key=") {
        Some(start) => {
            let value_start = start + "api_key=".len();
            let value_end = url[value_start..]
                .find('&')
                .map_or(url.len(), |offset| value_start + offset);
            format!("{}***{}", &url[..value_start], &url[value_end..])
        }
        None => url.to_string(),
    }
}
