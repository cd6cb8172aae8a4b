use reqwest::header::HeaderMap;
use reqwest::Client as ReqwestClient;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use super::rate_limiter::{InvalidRateError, TokenBucketRateLimiter};
use super::retry::{RetryPolicy, Transient};
use crate::domain::errors::{ModelError, SearchError};
use crate::domain::models::{RateLimitConfig, RetryConfig};
use crate::infrastructure::logging::scrub;

/// Longest error body excerpt kept in an error message
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Error types a [`JsonHttpClient`] can produce
pub trait HttpFailure: Transient + std::fmt::Display + Sized {
    /// Non-success HTTP status with its (scrubbed) body
    fn from_status(status: u16, body: String) -> Self;
    /// The client-side timeout elapsed
    fn timeout(message: String) -> Self;
    /// A 2xx body that could not be decoded
    fn malformed(message: String) -> Self;
    /// Connection, DNS or TLS failure
    fn transport(message: String) -> Self;
}

impl HttpFailure for ModelError {
    fn from_status(status: u16, body: String) -> Self {
        Self::from_status(status, body)
    }

    fn timeout(message: String) -> Self {
        Self::Timeout(message)
    }

    fn malformed(message: String) -> Self {
        Self::MalformedResponse(message)
    }

    fn transport(message: String) -> Self {
        Self::provider(message)
    }
}

impl HttpFailure for SearchError {
    fn from_status(status: u16, body: String) -> Self {
        Self::from_status(status, body)
    }

    fn timeout(message: String) -> Self {
        Self::Timeout(message)
    }

    fn malformed(message: String) -> Self {
        Self::Provider {
            status: None,
            message: format!("undecodable response: {message}"),
        }
    }

    fn transport(message: String) -> Self {
        Self::provider(message)
    }
}

/// A [`JsonHttpClient`] could not be built from its settings
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),

    #[error("invalid rate limit: {0}")]
    RateLimit(#[from] InvalidRateError),
}

/// HTTP client for JSON provider APIs
///
/// Features:
/// - Connection pooling and reuse (via reqwest::Client)
/// - Token bucket rate limiting, one token per attempt
/// - Exponential backoff retry for transient failures
/// - Status and transport errors mapped onto the caller's error type
#[derive(Debug, Clone)]
pub struct JsonHttpClient {
    http_client: ReqwestClient,
    rate_limiter: TokenBucketRateLimiter,
    retry_policy: RetryPolicy,
}

impl JsonHttpClient {
    pub fn new(
        timeout_secs: u64,
        rate_limit: &RateLimitConfig,
        retry: &RetryConfig,
    ) -> Result<Self, TransportError> {
        let rate_limiter = TokenBucketRateLimiter::try_from(rate_limit)?;
        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .pool_max_idle_per_host(10)
            .tcp_nodelay(true)
            .build()?;

        Ok(Self {
            http_client,
            rate_limiter,
            retry_policy: RetryPolicy::from(retry),
        })
    }

    /// POST `body` as JSON and decode the JSON reply, retrying transient failures
    pub async fn post_json<B, T, E>(&self, url: &str, headers: &HeaderMap, body: &B) -> Result<T, E>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
        E: HttpFailure,
    {
        self.retry_policy
            .execute(|| async move {
                self.rate_limiter.acquire().await;
                self.send_once(url, headers, body).await
            })
            .await
    }

    async fn send_once<B, T, E>(&self, url: &str, headers: &HeaderMap, body: &B) -> Result<T, E>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
        E: HttpFailure,
    {
        debug!(url = %url, "sending provider request");

        let response = self
            .http_client
            .post(url)
            .headers(headers.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| classify_transport_error::<E>(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());
            let body = excerpt(&scrub(&body));
            warn!(status = status.as_u16(), body = %body, "provider returned error status");
            return Err(E::from_status(status.as_u16(), body));
        }

        let text = response
            .text()
            .await
            .map_err(|e| classify_transport_error::<E>(&e))?;

        serde_json::from_str(&text).map_err(|e| {
            E::malformed(format!("{e}; body: {}", excerpt(&scrub(&text))))
        })
    }
}

fn classify_transport_error<E: HttpFailure>(error: &reqwest::Error) -> E {
    let message = scrub(&error.to_string());
    if error.is_timeout() {
        E::timeout(message)
    } else if error.is_decode() {
        E::malformed(message)
    } else {
        E::transport(message)
    }
}

fn excerpt(text: &str) -> String {
    if text.chars().count() <= MAX_ERROR_BODY_CHARS {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(MAX_ERROR_BODY_CHARS).collect();
    cut.push_str("...");
    cut
}
