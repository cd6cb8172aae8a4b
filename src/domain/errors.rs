//! Error taxonomy for the verification core.
//!
//! Model failures abort a verification, search failures are recorded as
//! empty evidence, parse failures stay inside the decision step.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse classification of a [`ModelError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelErrorKind {
    Timeout,
    RateLimited,
    MalformedResponse,
    ProviderError,
}

/// Failure reported by a language model client.
///
/// Fatal to the verification call that triggered it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelError {
    /// The provider did not answer in time
    #[error("Model request timed out: {0}")]
    Timeout(String),

    /// The provider rejected the request because of rate limits (HTTP 429)
    #[error("Model rate limit exceeded: {0}")]
    RateLimited(String),

    /// The provider answered but the body could not be decoded or held no text
    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    /// Any other provider failure (auth, bad request, server error, network)
    #[error("Model provider error{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Provider {
        status: Option<u16>,
        message: String,
    },
}

impl ModelError {
    /// Build a provider error without an HTTP status (network, configuration).
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            status: None,
            message: message.into(),
        }
    }

    /// Map a non-success HTTP status and body to an error variant.
    ///
    /// - 429: rate limited
    /// - 408, 504: timeout
    /// - everything else: provider error carrying the status
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            429 => Self::RateLimited(body),
            408 | 504 => Self::Timeout(body),
            _ => Self::Provider {
                status: Some(status),
                message: body,
            },
        }
    }

    pub const fn kind(&self) -> ModelErrorKind {
        match self {
            Self::Timeout(_) => ModelErrorKind::Timeout,
            Self::RateLimited(_) => ModelErrorKind::RateLimited,
            Self::MalformedResponse(_) => ModelErrorKind::MalformedResponse,
            Self::Provider { .. } => ModelErrorKind::ProviderError,
        }
    }

    /// Returns true if the request may succeed when sent again.
    ///
    /// Rate limits, timeouts, 5xx responses and transport failures
    /// (no status) are transient; 4xx and undecodable bodies are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::RateLimited(_) => true,
            Self::MalformedResponse(_) => false,
            Self::Provider { status, .. } => status.is_none_or(|s| s >= 500),
        }
    }
}

/// Coarse classification of a [`SearchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchErrorKind {
    Timeout,
    RateLimited,
    NoResults,
    ProviderError,
}

/// Failure reported by a search client. Recoverable inside the loop.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("Search timed out: {0}")]
    Timeout(String),

    #[error("Search rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("No search results for query: {0}")]
    NoResults(String),

    #[error("Search provider error{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Provider {
        status: Option<u16>,
        message: String,
    },
}

impl SearchError {
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            status: None,
            message: message.into(),
        }
    }

    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            429 => Self::RateLimited(body),
            408 | 504 => Self::Timeout(body),
            _ => Self::Provider {
                status: Some(status),
                message: body,
            },
        }
    }

    pub const fn kind(&self) -> SearchErrorKind {
        match self {
            Self::Timeout(_) => SearchErrorKind::Timeout,
            Self::RateLimited(_) => SearchErrorKind::RateLimited,
            Self::NoResults(_) => SearchErrorKind::NoResults,
            Self::Provider { .. } => SearchErrorKind::ProviderError,
        }
    }

    /// An empty result set is an answer, not a transport failure.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::RateLimited(_) => true,
            Self::NoResults(_) => false,
            Self::Provider { status, .. } => status.is_none_or(|s| s >= 500),
        }
    }
}

/// The model reply carried neither a verdict nor a search query.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Completion was empty")]
    Empty,

    #[error("No verdict or search query found in completion: {excerpt}")]
    Unrecognized { excerpt: String },
}

/// Invalid claim text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClaimError {
    #[error("Claim cannot be empty")]
    Empty,
}

/// Evidence store rejected an append.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EvidenceError {
    #[error("Evidence store is full ({capacity} entries)")]
    Full { capacity: usize },
}

/// Errors surfaced by the top-level `verify` entry point.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error(transparent)]
    InvalidClaim(#[from] ClaimError),

    /// A client could not be built from its configuration
    #[error("Client configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Model(#[from] ModelError),
}
