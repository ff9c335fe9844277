use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, instrument};

/// Rate limiter using token bucket algorithm
///
/// openFDA allows 240 requests per minute per client; ClinicalTrials.gov and
/// RxNav publish looser limits. One bucket is shared by every request the
/// transport issues, so the strictest limit is the one to configure.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    bucket: Arc<Mutex<TokenBucket>>,
}

#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    capacity: f64,
    refill_rate: f64, // tokens per second
    last_refill: Instant,
}

impl RateLimiter {
    /// Create a new rate limiter with the specified rate
    ///
    /// # Arguments
    ///
    /// * `rate` - Maximum requests per second
    ///
    /// # Example
    ///
    /// ```
    /// use regbot_client::rate_limit::RateLimiter;
    ///
    /// let limiter = RateLimiter::new(4.0);
    /// assert_eq!(limiter.rate(), 4.0);
    /// ```
    pub fn new(rate: f64) -> Self {
        let rate = if rate.is_finite() && rate > 0.0 { rate } else { 1.0 };
        let capacity = rate.max(1.0);
        Self {
            bucket: Arc::new(Mutex::new(TokenBucket {
                tokens: capacity,
                capacity,
                refill_rate: rate,
                last_refill: Instant::now(),
            })),
        }
    }

    /// openFDA default: 240 requests per minute
    pub fn openfda_default() -> Self {
        Self::new(4.0)
    }

    /// Acquire a token, blocking the current thread until one is available
    #[instrument(skip(self))]
    pub fn acquire(&self) {
        loop {
            let wait = {
                let mut bucket = self.bucket.lock().unwrap_or_else(PoisonError::into_inner);
                bucket.refill();

                if bucket.tokens >= 1.0 {
                    bucket.tokens -= 1.0;
                    debug!(remaining_tokens = %bucket.tokens, "Token acquired");
                    return;
                }

                let missing = 1.0 - bucket.tokens;
                Duration::from_secs_f64(missing / bucket.refill_rate)
            };

            debug!(wait_ms = wait.as_millis() as u64, "Sleeping to respect rate limit");
            thread::sleep(wait);
        }
    }

    /// Check if a token is available without consuming it
    pub fn check_available(&self) -> bool {
        let mut bucket = self.bucket.lock().unwrap_or_else(PoisonError::into_inner);
        bucket.refill();
        bucket.tokens >= 1.0
    }

    /// Current token count (for testing and monitoring)
    pub fn token_count(&self) -> f64 {
        let mut bucket = self.bucket.lock().unwrap_or_else(PoisonError::into_inner);
        bucket.refill();
        bucket.tokens
    }

    /// Configured rate in requests per second
    pub fn rate(&self) -> f64 {
        let bucket = self.bucket.lock().unwrap_or_else(PoisonError::into_inner);
        bucket.refill_rate
    }
}

impl TokenBucket {
    /// Refill tokens based on elapsed time
    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill);
        let new_tokens = elapsed.as_secs_f64() * self.refill_rate;

        self.tokens = (self.tokens + new_tokens).min(self.capacity);
        self.last_refill = now;
    }
}
