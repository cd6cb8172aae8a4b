//! Infrastructure layer module
//!
//! - Configuration loading and validation (figment)
//! - Shared HTTP transport with rate limiting and retries
//! - Logging infrastructure
//!
//! Provider adapters build on the HTTP transport to satisfy the domain ports.

pub mod config;
pub mod http;
pub mod logging;
