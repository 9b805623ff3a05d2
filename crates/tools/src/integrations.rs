//! External Integrations
//!
//! The vendor search collaborator: a trait, the SerpAPI-backed implementation
//! and a deterministic stub for tests and keyless development.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

use event_planner_config::SearchConfig;
use event_planner_core::{Error as CoreError, VendorQuery, VendorResult};

/// Integration errors
#[derive(Error, Debug)]
pub enum IntegrationError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<IntegrationError> for crate::mcp::ToolError {
    fn from(err: IntegrationError) -> Self {
        match err {
            IntegrationError::InvalidRequest(msg) => crate::mcp::ToolError::invalid_params(msg),
            IntegrationError::RateLimited => {
                crate::mcp::ToolError::internal("Rate limited - please retry later")
            },
            _ => crate::mcp::ToolError::internal(format!("Failed to find vendors: {}", err)),
        }
    }
}

impl From<IntegrationError> for CoreError {
    fn from(err: IntegrationError) -> Self {
        CoreError::Search(err.to_string())
    }
}

/// Vendor search collaborator
///
/// Results are returned in provider order. Failures are passed up unchanged;
/// implementations do not retry.
#[async_trait]
pub trait VendorSearch: Send + Sync {
    async fn search(&self, query: &VendorQuery) -> Result<Vec<VendorResult>, IntegrationError>;

    /// Provider name for logs and metrics
    fn provider(&self) -> &str;
}

/// Run a search and record its outcome
pub async fn search_vendors(
    search: &dyn VendorSearch,
    query: &VendorQuery,
) -> Result<Vec<VendorResult>, IntegrationError> {
    let start = Instant::now();
    let result = search.search(query).await;
    let elapsed = start.elapsed().as_secs_f64();

    metrics::histogram!("event_planner_vendor_search_seconds").record(elapsed);
    match &result {
        Ok(vendors) => {
            metrics::counter!("event_planner_vendor_search_total", "outcome" => "ok").increment(1);
            tracing::info!(
                provider = search.provider(),
                query = %query.search_text(),
                results = vendors.len(),
                elapsed_ms = (elapsed * 1000.0) as u64,
                "Vendor search completed"
            );
        },
        Err(e) => {
            metrics::counter!("event_planner_vendor_search_total", "outcome" => "error")
                .increment(1);
            tracing::warn!(
                provider = search.provider(),
                query = %query.search_text(),
                error = %e,
                "Vendor search failed"
            );
        },
    }

    result
}

/// Build the configured search collaborator
///
/// Without an API key the stub is used so the rest of the service still works.
pub fn create_vendor_search(config: &SearchConfig) -> Result<Arc<dyn VendorSearch>, IntegrationError> {
    match config.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
        Some(_) => Ok(Arc::new(SerpApiSearch::new(config.clone())?)),
        None => {
            tracing::warn!("No search API key configured, vendor search uses canned results");
            Ok(Arc::new(StubVendorSearch::new()))
        },
    }
}

// ============================================================================
// SerpAPI
// ============================================================================

/// Web search through SerpAPI's Google engine
pub struct SerpApiSearch {
    client: reqwest::Client,
    config: SearchConfig,
}

impl SerpApiSearch {
    pub fn new(config: SearchConfig) -> Result<Self, IntegrationError> {
        if config.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
            return Err(IntegrationError::AuthFailed("search API key is not set".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                IntegrationError::Internal(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client, config })
    }

    fn request_url(&self, query: &VendorQuery) -> Result<reqwest::Url, IntegrationError> {
        let api_key = self.config.api_key.as_deref().unwrap_or_default();
        let q = query.search_text();
        reqwest::Url::parse_with_params(
            &self.config.endpoint,
            &[
                ("engine", self.config.engine.as_str()),
                ("q", q.as_str()),
                ("api_key", api_key),
                ("hl", self.config.language.as_str()),
                ("gl", self.config.country.as_str()),
            ],
        )
        .map_err(|e| IntegrationError::InvalidRequest(format!("Bad search endpoint: {}", e)))
    }
}

#[async_trait]
impl VendorSearch for SerpApiSearch {
    async fn search(&self, query: &VendorQuery) -> Result<Vec<VendorResult>, IntegrationError> {
        if query.category.trim().is_empty() {
            return Err(IntegrationError::InvalidRequest("category is empty".to_string()));
        }

        let url = self.request_url(query)?;
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                IntegrationError::ConnectionFailed(format!(
                    "search timed out after {}s",
                    self.config.timeout_secs
                ))
            } else {
                // The request URL carries the API key
                IntegrationError::ConnectionFailed(e.without_url().to_string())
            }
        })?;

        let status = response.status();
        match status.as_u16() {
            401 | 403 => return Err(IntegrationError::AuthFailed(format!("HTTP {}", status))),
            429 => return Err(IntegrationError::RateLimited),
            _ if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                return Err(IntegrationError::Internal(format!("HTTP {}: {}", status, body)));
            },
            _ => {},
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| IntegrationError::InvalidResponse(e.without_url().to_string()))?;

        parse_search_results(&body, self.config.max_results)
    }

    fn provider(&self) -> &str {
        "serpapi"
    }
}

/// Vendors from a SerpAPI response body
///
/// Local (map) results come first, then organic results, truncated to `max_results`.
pub fn parse_search_results(
    body: &Value,
    max_results: usize,
) -> Result<Vec<VendorResult>, IntegrationError> {
    if let Some(error) = body.get("error").and_then(Value::as_str) {
        return Err(IntegrationError::Internal(error.to_string()));
    }

    let sections = ["local_results", "organic_results"];
    let vendors = sections
        .iter()
        .filter_map(|section| body.get(*section).and_then(Value::as_array))
        .flatten()
        .filter_map(vendor_from_item)
        .take(max_results)
        .collect();

    Ok(vendors)
}

fn vendor_from_item(item: &Value) -> Option<VendorResult> {
    let text = |key: &str| {
        item.get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let name = text("title")?;
    let reviews = item.get("reviews").and_then(|v| {
        v.as_u64().or_else(|| {
            v.as_str()
                .map(|s| s.chars().filter(char::is_ascii_digit).collect::<String>())
                .and_then(|digits| digits.parse().ok())
        })
    });

    Some(VendorResult {
        name,
        link: text("link").or_else(|| text("website")),
        rating: item.get("rating").and_then(Value::as_f64),
        reviews,
        snippet: text("snippet")
            .or_else(|| text("description"))
            .or_else(|| text("address")),
    })
}

// ============================================================================
// Stub
// ============================================================================

/// Deterministic vendor search
pub struct StubVendorSearch {
    results: Option<Vec<VendorResult>>,
    failure: Option<String>,
}

impl StubVendorSearch {
    /// Three generated vendors per query
    pub fn new() -> Self {
        Self {
            results: None,
            failure: None,
        }
    }

    /// Always return `results`
    pub fn with_results(results: Vec<VendorResult>) -> Self {
        Self {
            results: Some(results),
            failure: None,
        }
    }

    /// Always fail with a connection error
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            results: None,
            failure: Some(message.into()),
        }
    }

    fn generated(query: &VendorQuery) -> Vec<VendorResult> {
        let area = query.location.as_deref().unwrap_or("India");
        let slug: String = query
            .category
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-");

        (1..=3u32)
            .map(|i| VendorResult {
                name: format!("{} {}", query.category, i),
                link: Some(format!("https://vendors.example.com/{}/{}", slug, i)),
                rating: Some(5.0 - 0.2 * f64::from(i)),
                reviews: Some(u64::from(40 * i)),
                snippet: Some(format!("{} serving {}", query.category, area)),
            })
            .collect()
    }
}

impl Default for StubVendorSearch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VendorSearch for StubVendorSearch {
    async fn search(&self, query: &VendorQuery) -> Result<Vec<VendorResult>, IntegrationError> {
        if let Some(ref message) = self.failure {
            return Err(IntegrationError::ConnectionFailed(message.clone()));
        }
        Ok(self
            .results
            .clone()
            .unwrap_or_else(|| Self::generated(query)))
    }

    fn provider(&self) -> &str {
        "stub"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn query() -> VendorQuery {
        VendorQuery {
            category: "Wedding Photographer".into(),
            location: Some("Tiruchirappalli, Tamil Nadu".into()),
            budget_hint: Some("best".into()),
        }
    }

    #[test]
    fn test_parse_merges_local_then_organic() {
        let body = json!({
            "organic_results": [
                {"title": "Top 10 photographers", "link": "https://a.example", "snippet": "List"}
            ],
            "local_results": [
                {"title": "Lens Studio", "rating": 4.8, "reviews": 212, "address": "Thillai Nagar"},
                {"title": "Frame Works", "website": "https://fw.example", "reviews": "1,024"}
            ]
        });

        let vendors = parse_search_results(&body, 5).unwrap();
        assert_eq!(vendors.len(), 3);
        assert_eq!(vendors[0].name, "Lens Studio");
        assert_eq!(vendors[0].rating, Some(4.8));
        assert_eq!(vendors[0].snippet.as_deref(), Some("Thillai Nagar"));
        assert_eq!(vendors[1].link.as_deref(), Some("https://fw.example"));
        assert_eq!(vendors[1].reviews, Some(1024));
        assert_eq!(vendors[2].name, "Top 10 photographers");
    }

    #[test]
    fn test_parse_truncates_and_skips_untitled() {
        let items: Vec<Value> = (0..8).map(|i| json!({"title": format!("V{}", i)})).collect();
        let body = json!({"organic_results": items, "local_results": [{"link": "x"}]});
        let vendors = parse_search_results(&body, 5).unwrap();
        assert_eq!(vendors.len(), 5);
        assert_eq!(vendors[0].name, "V0");
    }

    #[test]
    fn test_parse_provider_error() {
        let body = json!({"error": "Invalid API key."});
        let err = parse_search_results(&body, 5).unwrap_err();
        assert!(matches!(err, IntegrationError::Internal(ref m) if m == "Invalid API key."));
    }

    #[test]
    fn test_parse_empty_body() {
        assert!(parse_search_results(&json!({}), 5).unwrap().is_empty());
    }

    #[test]
    fn test_serpapi_requires_key() {
        let config = SearchConfig {
            api_key: None,
            ..SearchConfig::default()
        };
        assert!(matches!(
            SerpApiSearch::new(config),
            Err(IntegrationError::AuthFailed(_))
        ));
    }

    #[test]
    fn test_request_url_params() {
        let config = SearchConfig {
            api_key: Some("secret".into()),
            ..SearchConfig::default()
        };
        let search = SerpApiSearch::new(config).unwrap();
        let url = search.request_url(&query()).unwrap();
        let params: std::collections::HashMap<String, String> =
            url.query_pairs().into_owned().collect();
        assert_eq!(params["engine"], "google");
        assert_eq!(
            params["q"],
            "best Wedding Photographer in Tiruchirappalli, Tamil Nadu reviews"
        );
        assert_eq!(params["hl"], "en");
        assert_eq!(params["gl"], "in");
        assert_eq!(params["api_key"], "secret");
    }

    #[tokio::test]
    async fn test_stub_is_deterministic() {
        let stub = StubVendorSearch::new();
        let first = stub.search(&query()).await.unwrap();
        let second = stub.search(&query()).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
        assert_eq!(
            first[0].link.as_deref(),
            Some("https://vendors.example.com/wedding-photographer/1")
        );
    }

    #[tokio::test]
    async fn test_failure_passes_through() {
        let stub = StubVendorSearch::failing("connection refused");
        let err = search_vendors(&stub, &query()).await.unwrap_err();
        assert!(matches!(err, IntegrationError::ConnectionFailed(_)));

        let core: CoreError = err.into();
        assert_eq!(core, CoreError::Search("Connection failed: connection refused".into()));
    }

    #[tokio::test]
    async fn test_connection_error_hides_api_key() {
        let config = SearchConfig {
            endpoint: "http://127.0.0.1:9/search".into(),
            api_key: Some("SUPERSECRETKEY".into()),
            timeout_secs: 5,
            ..SearchConfig::default()
        };
        let search = SerpApiSearch::new(config).unwrap();
        let err = search_vendors(&search, &query()).await.unwrap_err();
        assert!(matches!(err, IntegrationError::ConnectionFailed(_)));
        assert!(!err.to_string().contains("SUPERSECRETKEY"));

        let tool_err: crate::mcp::ToolError = err.into();
        assert!(!tool_err.message.contains("SUPERSECRETKEY"));
        assert!(!tool_err.message.contains("api_key"));
    }

    #[tokio::test]
    async fn test_fixed_results_are_returned_as_is() {
        let fixed = vec![VendorResult {
            name: "Marigold Caterers".into(),
            link: None,
            rating: Some(4.4),
            reviews: None,
            snippet: None,
        }];
        let stub = StubVendorSearch::with_results(fixed.clone());
        assert_eq!(search_vendors(&stub, &query()).await.unwrap(), fixed);
    }

    #[test]
    fn test_keyless_config_uses_stub() {
        let search = create_vendor_search(&SearchConfig::default()).unwrap();
        assert_eq!(search.provider(), "stub");
    }
}
