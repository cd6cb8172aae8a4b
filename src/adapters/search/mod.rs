//! Web search adapters.

pub mod mock;
pub mod serper;

pub use mock::ScriptedSearchClient;
pub use serper::SerperClient;

use std::sync::Arc;

use crate::domain::errors::VerifyError;
use crate::domain::models::{SearchConfig, SearchProvider};
use crate::domain::ports::SearchClient;

/// Build the client for `config.provider`
pub fn create_search_client(config: &SearchConfig) -> Result<Arc<dyn SearchClient>, VerifyError> {
    match config.provider {
        SearchProvider::Serper => Ok(Arc::new(SerperClient::new(config)?)),
    }
}
