//! Shared plumbing for outbound provider requests.

pub mod client;
pub mod rate_limiter;
pub mod retry;

pub use client::{HttpFailure, JsonHttpClient, TransportError};
pub use rate_limiter::{InvalidRateError, TokenBucketRateLimiter};
pub use retry::{RetryPolicy, Transient};
