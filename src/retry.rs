//! Retry with exponential backoff for transient transport failures
//!
//! The core fetch layer never retries on its own; it classifies errors through
//! [`RetryableError`] so callers can decide. The HTTP transport uses
//! [`with_retry`] for failures that are safe to repeat.

use std::thread;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, warn};

/// Classification of errors into retryable and terminal ones
pub trait RetryableError {
    /// Whether repeating the same request may succeed
    fn is_retryable(&self) -> bool;

    /// Short human-readable reason used in logs
    fn retry_reason(&self) -> &str {
        if self.is_retryable() {
            "Transient error"
        } else {
            "Non-transient error"
        }
    }
}

/// Backoff policy
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
    /// Factor applied to the delay after each retry
    pub backoff_multiplier: f64,
    /// Randomize delays by up to ±25%
    pub use_jitter: bool,
}

impl RetryConfig {
    /// Default policy: 3 retries starting at 1s, capped at 60s
    pub fn new() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
            use_jitter: true,
        }
    }

    /// A policy that never retries
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Self::new()
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn without_jitter(mut self) -> Self {
        self.use_jitter = false;
        self
    }

    /// Delay before retry number `attempt` (0-based)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(attempt as i32);
        let capped = base.min(self.max_delay.as_secs_f64());
        let secs = if self.use_jitter {
            let factor = rand::thread_rng().gen_range(0.75..=1.25);
            (capped * factor).min(self.max_delay.as_secs_f64())
        } else {
            capped
        };
        Duration::from_secs_f64(secs.max(0.0))
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Run `operation`, retrying retryable failures according to `config`
///
/// Non-retryable errors are returned immediately. After the last retry the
/// final error is returned unchanged.
pub fn with_retry<T, E, F>(mut operation: F, config: &RetryConfig, operation_name: &str) -> Result<T, E>
where
    F: FnMut() -> Result<T, E>,
    E: RetryableError + std::fmt::Display,
{
    let mut attempt = 0;
    loop {
        match operation() {
            Ok(value) => {
                if attempt > 0 {
                    debug!(operation = operation_name, attempt, "Succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) if err.is_retryable() && attempt < config.max_retries => {
                let delay = config.delay_for_attempt(attempt);
                warn!(
                    operation = operation_name,
                    attempt = attempt + 1,
                    max_retries = config.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    reason = err.retry_reason(),
                    error = %err,
                    "Retrying after transient failure"
                );
                thread::sleep(delay);
                attempt += 1;
            }
            Err(err) => {
                if err.is_retryable() {
                    warn!(operation = operation_name, error = %err, "Giving up after retries");
                }
                return Err(err);
            }
        }
    }
}
