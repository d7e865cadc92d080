use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use shopmate_core::{SearchError, SearchProvider, SearchResult};
use tracing::{debug, info};

pub const DEFAULT_BASE_URL: &str = "https://google.serper.dev";

/// Search backend backed by the Serper Google search API.
pub struct SerperProvider {
    client: Client,
    api_key: String,
    base_url: String,
    num_results: usize,
}

#[derive(Debug, Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    link: String,
}

impl SerperProvider {
    pub fn new(api_key: String, timeout: Duration) -> anyhow::Result<Self> {
        info!("Creating SerperProvider");
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            num_results: 10,
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    #[must_use]
    pub const fn with_num_results(mut self, num_results: usize) -> Self {
        self.num_results = num_results;
        self
    }

    #[must_use]
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

#[async_trait]
impl SearchProvider for SerperProvider {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        if !self.has_api_key() {
            return Err(SearchError::MissingApiKey);
        }

        debug!("Sending search request to Serper: {query}");

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .header("X-API-KEY", &self.api_key)
            .json(&json!({
                "q": query,
                "num": self.num_results,
            }))
            .send()
            .await
            .map_err(|e| map_transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_status(status.as_u16(), body));
        }

        let body = response
            .text()
            .await
            .map_err(|e| map_transport_error(&e))?;
        let results = parse_results(&body)?;

        info!("Serper returned {} results", results.len());
        Ok(results)
    }
}

fn parse_results(body: &str) -> Result<Vec<SearchResult>, SearchError> {
    let response: SerperResponse =
        serde_json::from_str(body).map_err(|e| SearchError::Parse(e.to_string()))?;

    Ok(response
        .organic
        .into_iter()
        .filter(|r| !r.title.trim().is_empty() || !r.snippet.trim().is_empty())
        .map(|r| SearchResult {
            title: r.title,
            snippet: r.snippet,
            url: r.link,
        })
        .collect())
}

fn map_status(status: u16, body: String) -> SearchError {
    match status {
        401 | 403 => SearchError::Auth(body),
        429 => SearchError::RateLimited,
        _ => SearchError::Http { status, body },
    }
}

fn map_transport_error(e: &reqwest::Error) -> SearchError {
    if e.is_timeout() {
        SearchError::Timeout
    } else {
        SearchError::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_organic_results() {
        let body = r#"{
            "searchParameters": {"q": "iphone 15 vs galaxy s24"},
            "organic": [
                {"title": "iPhone 15 vs Galaxy S24", "snippet": "We compare both.", "link": "https://a.example", "position": 1},
                {"title": "Galaxy S24 review", "snippet": "Great screen.", "link": "https://b.example", "position": 2},
                {"title": "", "snippet": "", "link": "https://empty.example"}
            ]
        }"#;
        let results = parse_results(body).unwrap_or_default();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "iPhone 15 vs Galaxy S24");
        assert_eq!(results[0].url, "https://a.example");
        assert_eq!(results[1].snippet, "Great screen.");
    }

    #[test]
    fn parse_without_organic_is_empty() {
        let results = parse_results(r#"{"answerBox": {}}"#).unwrap_or_default();
        assert!(results.is_empty());
    }

    #[test]
    fn parse_garbage_is_error() {
        assert!(matches!(
            parse_results("<html>oops</html>"),
            Err(SearchError::Parse(_))
        ));
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(map_status(403, String::new()), SearchError::Auth(_)));
        assert_eq!(map_status(429, String::new()), SearchError::RateLimited);
        assert!(matches!(
            map_status(500, String::new()),
            SearchError::Http { status: 500, .. }
        ));
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        let Ok(provider) = SerperProvider::new(String::new(), Duration::from_secs(1)) else {
            panic!("Failed to create SerperProvider");
        };
        let result = provider.search("best budget laptop").await;
        assert_eq!(result.err(), Some(SearchError::MissingApiKey));
    }
}
