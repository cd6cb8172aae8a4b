//! Search results and the append-only evidence store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::EvidenceError;

/// One ranked hit returned by a search provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub snippet: String,
    /// Source link; empty when the provider gave none
    pub url: String,
}

impl SearchResult {
    pub fn new(
        title: impl Into<String>,
        snippet: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            snippet: snippet.into(),
            url: url.into(),
        }
    }
}

/// A search query and what it returned, stamped with the loop step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceEntry {
    pub query: String,
    pub results: Vec<SearchResult>,
    /// 1-based loop step that issued the search
    pub step_index: usize,
    /// Failure message when the search errored; results are then empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl EvidenceEntry {
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Ordered evidence gathered during one verification.
///
/// Insertion order is temporal order and the order entries are shown to the
/// model. Never holds more than `capacity` entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvidenceStore {
    entries: Vec<EvidenceEntry>,
    capacity: usize,
}

impl EvidenceStore {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    pub fn entries(&self) -> &[EvidenceEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EvidenceEntry> {
        self.entries.iter()
    }

    /// Append the results of a successful search.
    ///
    /// Returns the step index assigned to the new entry.
    pub fn record_results(
        &mut self,
        query: impl Into<String>,
        results: Vec<SearchResult>,
    ) -> Result<usize, EvidenceError> {
        self.push(query.into(), results, None)
    }

    /// Append a failed search as an entry with no results.
    pub fn record_failure(
        &mut self,
        query: impl Into<String>,
        error: impl Into<String>,
    ) -> Result<usize, EvidenceError> {
        self.push(query.into(), Vec::new(), Some(error.into()))
    }

    fn push(
        &mut self,
        query: String,
        results: Vec<SearchResult>,
        error: Option<String>,
    ) -> Result<usize, EvidenceError> {
        if self.is_full() {
            return Err(EvidenceError::Full {
                capacity: self.capacity,
            });
        }
        let step_index = self.entries.len() + 1;
        self.entries.push(EvidenceEntry {
            query,
            results,
            step_index,
            error,
            recorded_at: Utc::now(),
        });
        Ok(step_index)
    }

    /// Take the entries out, leaving the store empty.
    pub fn into_entries(self) -> Vec<EvidenceEntry> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a EvidenceStore {
    type Item = &'a EvidenceEntry;
    type IntoIter = std::slice::Iter<'a, EvidenceEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(n: usize) -> SearchResult {
        SearchResult::new(format!("title {n}"), format!("snippet {n}"), "")
    }

    #[test]
    fn test_step_indices_follow_insertion_order() {
        let mut store = EvidenceStore::with_capacity(3);
        assert_eq!(store.record_results("a", vec![hit(1)]), Ok(1));
        assert_eq!(store.record_failure("b", "timeout"), Ok(2));
        assert_eq!(store.record_results("a", vec![hit(2)]), Ok(3));

        let queries: Vec<_> = store.iter().map(|e| e.query.as_str()).collect();
        assert_eq!(queries, vec!["a", "b", "a"]);
        assert!(store.entries()[1].is_failed());
        assert!(store.entries()[1].results.is_empty());
    }

    #[test]
    fn test_store_refuses_append_beyond_capacity() {
        let mut store = EvidenceStore::with_capacity(1);
        store.record_results("q", vec![]).unwrap();
        assert!(store.is_full());
        assert_eq!(
            store.record_results("q2", vec![]),
            Err(EvidenceError::Full { capacity: 1 })
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_zero_capacity_store_is_full() {
        let store = EvidenceStore::with_capacity(0);
        assert!(store.is_full());
        assert!(store.is_empty());
    }
}
