//! Web search port.

use async_trait::async_trait;

use crate::domain::errors::SearchError;
use crate::domain::models::SearchResult;

/// Port trait for web search clients
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Short provider name used in logs
    fn name(&self) -> &'static str;

    /// Run a query and return ranked results, best first
    ///
    /// Returns `SearchError::NoResults` rather than an empty vector when the
    /// provider found nothing.
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError>;
}
