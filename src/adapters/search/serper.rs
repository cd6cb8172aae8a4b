//! Serper (Google Search) client.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::domain::errors::{SearchError, VerifyError};
use crate::domain::models::{SearchConfig, SearchResult, SearchType};
use crate::domain::ports::SearchClient;
use crate::infrastructure::http::JsonHttpClient;

const ANSWER_BOX_TITLE: &str = "Answer Box";
const KNOWLEDGE_GRAPH_TITLE: &str = "Knowledge Graph";
const DEFAULT_RESULT_TITLE: &str = "Search Result";

#[derive(Debug, Serialize)]
struct SerperRequest<'a> {
    q: &'a str,
    gl: &'a str,
    hl: &'a str,
    num: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    tbs: Option<&'a str>,
}

/// Client for `POST https://google.serper.dev/{search_type}`
pub struct SerperClient {
    transport: JsonHttpClient,
    endpoint: String,
    headers: HeaderMap,
    gl: String,
    hl: String,
    num_results: usize,
    search_type: SearchType,
    tbs: Option<String>,
}

impl SerperClient {
    pub fn new(config: &SearchConfig) -> Result<Self, VerifyError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                VerifyError::Configuration(format!(
                    "no Serper API key (set search.api_key or {})",
                    config.provider.api_key_env()
                ))
            })?;

        let mut key_header = HeaderValue::from_str(api_key).map_err(|_| {
            VerifyError::Configuration("invalid characters in Serper API key".to_string())
        })?;
        key_header.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static("x-api-key"), key_header);

        let transport = JsonHttpClient::new(config.timeout_secs, &config.rate_limit, &config.retry)
            .map_err(|e| VerifyError::Configuration(e.to_string()))?;

        Ok(Self {
            transport,
            endpoint: format!(
                "{}/{}",
                config.base_url().trim_end_matches('/'),
                config.search_type.as_str()
            ),
            headers,
            gl: config.gl.clone(),
            hl: config.hl.clone(),
            num_results: config.num_results,
            search_type: config.search_type,
            tbs: config.tbs.clone(),
        })
    }
}

#[async_trait]
impl SearchClient for SerperClient {
    fn name(&self) -> &'static str {
        "serper"
    }

    #[instrument(skip(self), fields(search_type = self.search_type.as_str()))]
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        let request = SerperRequest {
            q: query,
            gl: &self.gl,
            hl: &self.hl,
            num: self.num_results,
            tbs: self.tbs.as_deref(),
        };

        let body: Value = self
            .transport
            .post_json(&self.endpoint, &self.headers, &request)
            .await?;

        let results = parse_results(&body, self.search_type, self.num_results);
        debug!(result_count = results.len(), "search completed");

        if results.is_empty() {
            return Err(SearchError::NoResults(query.to_string()));
        }
        Ok(results)
    }
}

/// Flatten a Serper response into result items
///
/// Order: answer box, knowledge graph, then the first `limit` entries of
/// the list for `search_type`.
pub fn parse_results(body: &Value, search_type: SearchType, limit: usize) -> Vec<SearchResult> {
    let mut items = Vec::new();

    if let Some(answer_box) = body.get("answerBox").and_then(Value::as_object) {
        let link = str_field(answer_box, "link").unwrap_or_default();
        if let Some(answer) = str_field(answer_box, "answer") {
            items.push(SearchResult::new(ANSWER_BOX_TITLE, answer, link));
        }
        if let Some(snippet) = str_field(answer_box, "snippet") {
            items.push(SearchResult::new(
                ANSWER_BOX_TITLE,
                snippet.replace('\n', " "),
                link,
            ));
        }
    }

    if let Some(graph) = body.get("knowledgeGraph").and_then(Value::as_object) {
        let title = str_field(graph, "title").unwrap_or_default();
        let link = str_field(graph, "descriptionLink")
            .or_else(|| str_field(graph, "website"))
            .unwrap_or_default();

        if let Some(entity_type) = str_field(graph, "type") {
            items.push(SearchResult::new(
                KNOWLEDGE_GRAPH_TITLE,
                format!("{title}: {entity_type}."),
                link,
            ));
        }
        if let Some(description) = str_field(graph, "description") {
            items.push(SearchResult::new(title, description, link));
        }
        for (attribute, value) in attributes(graph) {
            items.push(SearchResult::new(
                title,
                format!("{title} {attribute}: {}.", display_value(value)),
                link,
            ));
        }
    }

    if let Some(entries) = body.get(search_type.result_key()).and_then(Value::as_array) {
        for entry in entries.iter().take(limit).filter_map(Value::as_object) {
            let title = str_field(entry, "title").unwrap_or(DEFAULT_RESULT_TITLE);
            let link = str_field(entry, "link").unwrap_or_default();

            if let Some(snippet) = str_field(entry, "snippet") {
                items.push(SearchResult::new(title, snippet, link));
            }
            for (attribute, value) in attributes(entry) {
                items.push(SearchResult::new(
                    title,
                    format!("{attribute}: {}.", display_value(value)),
                    link,
                ));
            }
        }
    }

    items
}

fn str_field<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    object
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn attributes(object: &Map<String, Value>) -> impl Iterator<Item = (&String, &Value)> {
    object
        .get("attributes")
        .and_then(Value::as_object)
        .into_iter()
        .flat_map(|attrs| attrs.iter())
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_answer_box_first() {
        let body = json!({
            "answerBox": {"answer": "Paris", "snippet": "Paris is the\ncapital", "link": "https://a.example"},
            "organic": [{"title": "France", "snippet": "Capital: Paris", "link": "https://b.example"}]
        });

        let results = parse_results(&body, SearchType::Search, 3);

        assert_eq!(results.len(), 3);
        assert_eq!(results[0], SearchResult::new("Answer Box", "Paris", "https://a.example"));
        assert_eq!(results[1].snippet, "Paris is the capital");
        assert_eq!(results[2].title, "France");
    }

    #[test]
    fn test_parse_knowledge_graph() {
        let body = json!({
            "knowledgeGraph": {
                "title": "Eiffel Tower",
                "type": "Tower",
                "description": "Wrought-iron lattice tower",
                "website": "https://toureiffel.paris",
                "attributes": {"Height": "330 m", "Opened": 1889}
            }
        });

        let results = parse_results(&body, SearchType::Search, 3);
        let snippets: Vec<&str> = results.iter().map(|r| r.snippet.as_str()).collect();

        assert_eq!(snippets[0], "Eiffel Tower: Tower.");
        assert_eq!(results[0].title, "Knowledge Graph");
        assert_eq!(snippets[1], "Wrought-iron lattice tower");
        assert!(snippets.contains(&"Eiffel Tower Height: 330 m."));
        assert!(snippets.contains(&"Eiffel Tower Opened: 1889."));
        assert!(results.iter().all(|r| r.url == "https://toureiffel.paris"));
    }

    #[test]
    fn test_parse_limits_result_list() {
        let body = json!({
            "organic": [
                {"title": "one", "snippet": "1", "link": "l1"},
                {"title": "two", "snippet": "2", "link": "l2", "attributes": {"Born": "1900"}},
                {"title": "three", "snippet": "3", "link": "l3"}
            ]
        });

        let results = parse_results(&body, SearchType::Search, 2);

        assert_eq!(results.len(), 3);
        assert_eq!(results[2].snippet, "Born: 1900.");
        assert_eq!(results[2].title, "two");
    }

    #[test]
    fn test_parse_uses_type_specific_key() {
        let body = json!({
            "organic": [{"title": "web", "snippet": "ignored"}],
            "news": [{"snippet": "headline"}]
        });

        let results = parse_results(&body, SearchType::News, 3);

        assert_eq!(results, vec![SearchResult::new("Search Result", "headline", "")]);
    }

    #[test]
    fn test_parse_empty_body() {
        assert!(parse_results(&json!({"organic": []}), SearchType::Search, 3).is_empty());
    }
}
