use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SearchError;

pub const TAVILY_API_BASE: &str = "https://api.tavily.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    #[default]
    Basic,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchTopic {
    #[default]
    General,
    News,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    pub query: String,
    pub max_results: usize,
    pub search_depth: SearchDepth,
    pub topic: SearchTopic,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub include_domains: Vec<String>,
    pub include_images: bool,
    pub include_answer: bool,
    pub include_raw_content: bool,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            max_results: 5,
            search_depth: SearchDepth::Basic,
            topic: SearchTopic::General,
            include_domains: Vec::new(),
            include_images: true,
            include_answer: true,
            include_raw_content: false,
        }
    }

    pub fn with_topic(mut self, topic: SearchTopic) -> Self {
        self.topic = topic;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_include_domains(mut self, domains: Vec<String>) -> Self {
        self.include_domains = domains;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub results: Vec<SearchResult>,
    #[serde(default)]
    pub follow_up_questions: Option<Vec<String>>,
}

impl SearchResponse {
    pub fn has_images(&self) -> bool {
        self.results.iter().any(|r| !r.images.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub images: Vec<String>,
    #[serde(default)]
    pub raw_content: Option<String>,
    #[serde(default)]
    pub published_date: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Web search backend
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, SearchError>;
}

/// Tavily search API client
pub struct TavilyClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl TavilyClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, SearchError> {
        Self::with_timeout(api_key, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(api_key: impl Into<String>, timeout: Duration) -> Result<Self, SearchError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let auth = HeaderValue::from_str(&format!("Bearer {}", api_key.into()))
            .map_err(|_| SearchError::InvalidResponse("API key is not a valid header value".to_string()))?;
        headers.insert(AUTHORIZATION, auth);

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: TAVILY_API_BASE.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl SearchProvider for TavilyClient {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, SearchError> {
        debug!(
            query = %request.query,
            topic = ?request.topic,
            domains = request.include_domains.len(),
            "Calling Tavily search"
        );

        let response = self
            .http_client
            .post(format!("{}/search", self.base_url))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| SearchError::InvalidResponse(e.to_string()))?;

        debug!(
            results = parsed.results.len(),
            has_answer = parsed.answer.is_some(),
            has_images = parsed.has_images(),
            "Tavily search completed"
        );
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serialization() {
        let request = SearchRequest::new("ultime notizie")
            .with_topic(SearchTopic::News)
            .with_include_domains(vec!["ansa.it".to_string()]);
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["topic"], "news");
        assert_eq!(value["search_depth"], "basic");
        assert_eq!(value["max_results"], 5);
        assert_eq!(value["include_domains"], json!(["ansa.it"]));
        assert_eq!(value["include_raw_content"], false);
    }

    #[test]
    fn test_empty_domains_omitted() {
        let value = serde_json::to_value(SearchRequest::new("q")).unwrap();
        assert!(value.get("include_domains").is_none());
    }

    #[test]
    fn test_response_tolerates_missing_fields() {
        let response: SearchResponse = serde_json::from_value(json!({
            "query": "q",
            "results": [{"title": "t", "url": "https://a.it", "images": null}]
        }))
        .unwrap();

        assert_eq!(response.answer, None);
        assert!(response.results[0].images.is_empty());
        assert!(!response.has_images());
    }
}
