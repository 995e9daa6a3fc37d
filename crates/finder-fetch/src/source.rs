//! Upstream record sources.
//!
//! [`RecordSource`] is the transport seam: one call, one page of raw JSON.
//! [`HttpRecordSource`] talks to the real listing endpoint; [`MockRecordSource`]
//! replays scripted pages for tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use backoff::{backoff::Backoff, ExponentialBackoff};
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use finder_types::Settings;

use crate::error::FetchError;

/// One upstream page request, as sent on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number
    pub page: u32,

    /// Page size
    pub limit: u32,

    /// Sort field (e.g. "createdAt")
    pub sort_by: String,

    /// Sort order ("asc" or "desc")
    pub sort_order: String,
}

impl PageRequest {
    /// Build a request for the zero-based `page_index`.
    pub fn for_page(
        page_index: u32,
        page_size: u32,
        sort_by: impl Into<String>,
        sort_order: impl Into<String>,
    ) -> Self {
        Self {
            page: page_index + 1,
            limit: page_size,
            sort_by: sort_by.into(),
            sort_order: sort_order.into(),
        }
    }

    /// Zero-based index of this page.
    pub fn page_index(&self) -> u32 {
        self.page.saturating_sub(1)
    }

    /// Query string pairs for the listing endpoint.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
            ("sortBy", self.sort_by.clone()),
            ("sortOrder", self.sort_order.clone()),
        ]
    }
}

/// Source of raw upstream pages.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch one page and return the undecoded JSON payload.
    async fn fetch_raw(&self, request: &PageRequest) -> Result<Value, FetchError>;
}

/// Configuration for the HTTP record source.
#[derive(Debug, Clone)]
pub struct HttpSourceConfig {
    /// Listing endpoint URL
    pub endpoint: String,

    /// Request timeout
    pub timeout: Duration,

    /// Maximum retries on transient failure
    pub max_retries: u32,

    /// First backoff interval between retries
    pub retry_initial_interval: Duration,
}

impl HttpSourceConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: Duration::from_secs(15),
            max_retries: 2,
            retry_initial_interval: Duration::from_millis(200),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            endpoint: settings.endpoint.clone(),
            timeout: settings.request_timeout(),
            max_retries: settings.max_retries,
            retry_initial_interval: Duration::from_millis(200),
        }
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_initial_interval = interval;
        self
    }
}

/// Record source backed by the HTTP listing endpoint.
pub struct HttpRecordSource {
    client: Client,
    config: HttpSourceConfig,
}

impl HttpRecordSource {
    /// Create a new HTTP source.
    pub fn new(config: HttpSourceConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetchError::Config(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// Issue the request, retrying transient failures with backoff.
    async fn call_with_retry(&self, request: &PageRequest) -> Result<Value, FetchError> {
        let mut backoff = ExponentialBackoff {
            initial_interval: self.config.retry_initial_interval,
            max_elapsed_time: Some(self.config.timeout * (self.config.max_retries + 1)),
            ..Default::default()
        };

        let mut attempts = 0;

        loop {
            attempts += 1;
            debug!(page = request.page, attempt = attempts, "Requesting upstream page");

            match self.make_request(request).await {
                Ok(payload) => return Ok(payload),
                Err(e) => {
                    if !e.is_transient() || attempts > self.config.max_retries {
                        error!(page = request.page, error = %e, attempts, "Page request failed");
                        return Err(e);
                    }

                    match backoff.next_backoff() {
                        Some(duration) => {
                            warn!(
                                page = request.page,
                                error = %e,
                                retry_in_ms = duration.as_millis(),
                                "Page request failed, retrying"
                            );
                            tokio::time::sleep(duration).await;
                        }
                        None => {
                            error!(page = request.page, error = %e, "Backoff exhausted");
                            return Err(e);
                        }
                    }
                }
            }
        }
    }

    /// Make a single request.
    async fn make_request(&self, request: &PageRequest) -> Result<Value, FetchError> {
        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&request.query_pairs())
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        if response.status() == 429 {
            return Err(FetchError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| FetchError::Parse(e.to_string()))
    }
}

#[async_trait]
impl RecordSource for HttpRecordSource {
    async fn fetch_raw(&self, request: &PageRequest) -> Result<Value, FetchError> {
        self.call_with_retry(request).await
    }
}

/// Scripted record source for testing.
///
/// Pages are keyed by zero-based page index. Unscripted pages return the
/// fallback payload, or an empty `{"items": []}` envelope.
#[derive(Default)]
pub struct MockRecordSource {
    /// Payloads per page index
    pub pages: HashMap<u32, Value>,
    /// Payload for pages without a script
    pub fallback: Option<Value>,
    /// Simulated latency per page index
    pub delays: HashMap<u32, Duration>,
    /// Pages that fail
    pub failures: HashMap<u32, FetchError>,
    requests: Mutex<Vec<PageRequest>>,
}

impl MockRecordSource {
    /// Script the payload for a page.
    pub fn with_page(mut self, page_index: u32, payload: Value) -> Self {
        self.pages.insert(page_index, payload);
        self
    }

    /// Payload returned for every unscripted page.
    pub fn with_fallback(mut self, payload: Value) -> Self {
        self.fallback = Some(payload);
        self
    }

    /// Add latency to a page.
    pub fn with_delay(mut self, page_index: u32, delay: Duration) -> Self {
        self.delays.insert(page_index, delay);
        self
    }

    /// Make a page fail.
    pub fn with_failure(mut self, page_index: u32, error: FetchError) -> Self {
        self.failures.insert(page_index, error);
        self
    }

    /// Every request issued so far, in order.
    pub fn requests(&self) -> Vec<PageRequest> {
        self.requests
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    /// Zero-based page indexes requested so far, in order.
    pub fn requested_pages(&self) -> Vec<u32> {
        self.requests().iter().map(PageRequest::page_index).collect()
    }
}

#[async_trait]
impl RecordSource for MockRecordSource {
    async fn fetch_raw(&self, request: &PageRequest) -> Result<Value, FetchError> {
        let page_index = request.page_index();
        if let Ok(mut log) = self.requests.lock() {
            log.push(request.clone());
        }

        if let Some(delay) = self.delays.get(&page_index) {
            tokio::time::sleep(*delay).await;
        }

        if let Some(error) = self.failures.get(&page_index) {
            return Err(error.clone());
        }

        Ok(self
            .pages
            .get(&page_index)
            .or(self.fallback.as_ref())
            .cloned()
            .unwrap_or_else(|| json!({ "items": [] })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn source_for(server: &MockServer, retries: u32) -> HttpRecordSource {
        let config = HttpSourceConfig::new(format!("{}/api/athletes", server.uri()))
            .with_max_retries(retries)
            .with_retry_interval(Duration::from_millis(5));
        HttpRecordSource::new(config).unwrap()
    }

    fn request(page_index: u32) -> PageRequest {
        PageRequest::for_page(page_index, 50, "createdAt", "desc")
    }

    #[test]
    fn test_page_request_is_one_based_on_the_wire() {
        let req = request(0);
        assert_eq!(req.page, 1);
        assert_eq!(req.page_index(), 0);
        let pairs = req.query_pairs();
        assert_eq!(pairs[0], ("page", "1".to_string()));
        assert_eq!(pairs[1], ("limit", "50".to_string()));
        assert_eq!(pairs[2], ("sortBy", "createdAt".to_string()));
        assert_eq!(pairs[3], ("sortOrder", "desc".to_string()));
    }

    #[tokio::test]
    async fn test_http_sends_pagination_and_sort() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/athletes"))
            .and(query_param("page", "3"))
            .and(query_param("limit", "50"))
            .and(query_param("sortBy", "createdAt"))
            .and(query_param("sortOrder", "desc"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let payload = source_for(&server, 0).fetch_raw(&request(2)).await.unwrap();
        assert_eq!(payload, json!({ "items": [] }));
    }

    #[tokio::test]
    async fn test_http_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("missing"))
            .expect(1)
            .mount(&server)
            .await;

        let err = source_for(&server, 2)
            .fetch_raw(&request(0))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            FetchError::Status {
                status: 404,
                body: "missing".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_http_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = source_for(&server, 0)
            .fetch_raw(&request(0))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[tokio::test]
    async fn test_http_retries_transient_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [1] })))
            .with_priority(2)
            .mount(&server)
            .await;

        let payload = source_for(&server, 2).fetch_raw(&request(0)).await.unwrap();
        assert_eq!(payload["items"][0], 1);
    }

    #[tokio::test]
    async fn test_http_rate_limit_exhausts_retries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .expect(2)
            .mount(&server)
            .await;

        let err = source_for(&server, 1)
            .fetch_raw(&request(0))
            .await
            .unwrap_err();
        assert_eq!(err, FetchError::RateLimited);
    }

    #[tokio::test]
    async fn test_mock_source_scripts_and_logs() {
        let source = MockRecordSource::default()
            .with_page(0, json!({ "items": [1] }))
            .with_failure(1, FetchError::Timeout);

        assert_eq!(
            source.fetch_raw(&request(0)).await.unwrap(),
            json!({ "items": [1] })
        );
        assert_eq!(
            source.fetch_raw(&request(1)).await.unwrap_err(),
            FetchError::Timeout
        );
        assert_eq!(
            source.fetch_raw(&request(2)).await.unwrap(),
            json!({ "items": [] })
        );
        assert_eq!(source.requested_pages(), vec![0, 1, 2]);
    }
}
