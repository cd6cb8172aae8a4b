use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

use crate::domain::models::RateLimitConfig;

/// Shortest pause between two attempts to take a token
const MIN_WAIT: Duration = Duration::from_millis(10);

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    refilled_at: Instant,
}

impl Bucket {
    /// Credit the tokens earned since the last refill, capped at `capacity`
    fn refill(&mut self, rate: f64, capacity: f64, now: Instant) {
        let earned = now.duration_since(self.refilled_at).as_secs_f64() * rate;
        self.tokens = (self.tokens + earned).min(capacity);
        self.refilled_at = now;
    }
}

#[derive(Debug, Clone, Copy, Error, PartialEq)]
#[error("requests_per_second must be a positive number, got {0}")]
pub struct InvalidRateError(pub f64);

/// Token bucket shared by every request a provider client sends
///
/// Refills continuously at `requests_per_second` and holds one second's
/// worth of tokens, but never less than one, so slow rates still admit
/// a request. Clones share the same bucket.
#[derive(Debug, Clone)]
pub struct TokenBucketRateLimiter {
    bucket: Arc<Mutex<Bucket>>,
    rate: f64,
    capacity: f64,
}

impl TokenBucketRateLimiter {
    pub fn new(requests_per_second: f64) -> Result<Self, InvalidRateError> {
        if !requests_per_second.is_finite() || requests_per_second <= 0.0 {
            return Err(InvalidRateError(requests_per_second));
        }

        let capacity = requests_per_second.max(1.0);
        Ok(Self {
            bucket: Arc::new(Mutex::new(Bucket {
                tokens: capacity,
                refilled_at: Instant::now(),
            })),
            rate: requests_per_second,
            capacity,
        })
    }

    /// Wait until a token is available and take it
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut bucket = self.bucket.lock().await;
                bucket.refill(self.rate, self.capacity, Instant::now());
                if bucket.tokens >= 1.0 {
                    bucket.tokens -= 1.0;
                    return;
                }
                Duration::from_secs_f64((1.0 - bucket.tokens) / self.rate)
            };
            sleep(wait.max(MIN_WAIT)).await;
        }
    }

    pub async fn available_tokens(&self) -> f64 {
        let mut bucket = self.bucket.lock().await;
        bucket.refill(self.rate, self.capacity, Instant::now());
        bucket.tokens
    }
}

impl TryFrom<&RateLimitConfig> for TokenBucketRateLimiter {
    type Error = InvalidRateError;

    fn try_from(config: &RateLimitConfig) -> Result<Self, Self::Error> {
        Self::new(config.requests_per_second)
    }
}
