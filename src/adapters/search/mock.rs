//! Scripted search client for testing.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use tokio::sync::Mutex;

use crate::domain::errors::SearchError;
use crate::domain::models::SearchResult;
use crate::domain::ports::SearchClient;

/// Search client answering from a script
///
/// Lookup order: a response registered for the exact query, then the next
/// queued response, then a single generated result echoing the query.
/// Every query received is recorded.
#[derive(Default)]
pub struct ScriptedSearchClient {
    by_query: HashMap<String, Result<Vec<SearchResult>, SearchError>>,
    queue: Mutex<VecDeque<Result<Vec<SearchResult>, SearchError>>>,
    queries: Mutex<Vec<String>>,
}

impl ScriptedSearchClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue responses consumed in call order
    pub fn with_queue<I>(responses: I) -> Self
    where
        I: IntoIterator<Item = Result<Vec<SearchResult>, SearchError>>,
    {
        Self {
            queue: Mutex::new(responses.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn with_response(
        mut self,
        query: impl Into<String>,
        response: Result<Vec<SearchResult>, SearchError>,
    ) -> Self {
        self.by_query.insert(query.into(), response);
        self
    }

    /// Queries received so far, oldest first
    pub async fn queries(&self) -> Vec<String> {
        self.queries.lock().await.clone()
    }
}

#[async_trait]
impl SearchClient for ScriptedSearchClient {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        self.queries.lock().await.push(query.to_string());

        if let Some(response) = self.by_query.get(query) {
            return response.clone();
        }
        if let Some(response) = self.queue.lock().await.pop_front() {
            return response;
        }

        Ok(vec![SearchResult::new(
            format!("Result for {query}"),
            format!("Snippet about {query}"),
            "https://example.com/result",
        )])
    }
}
