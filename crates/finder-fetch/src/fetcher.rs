//! Page fetcher.
//!
//! Turns "give me page N" into one upstream request, locates the record array
//! in whatever envelope came back, normalizes the records and decides whether
//! another page may exist.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use finder_types::{CanonicalRecord, Settings};

use crate::envelope::{extract_records, resolve_has_more};
use crate::error::FetchError;
use crate::normalize::normalize_records;
use crate::source::{PageRequest, RecordSource};

/// One fetched, normalized page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    /// Records that survived normalization
    pub records: Vec<CanonicalRecord>,

    /// Best-effort "more pages may exist" signal
    pub has_more: bool,

    /// Records in the raw payload, before normalization
    pub raw_count: usize,
}

impl Page {
    /// The page returned in place of a failed fetch.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Fetches and normalizes one page at a time from a [`RecordSource`].
pub struct PageFetcher<S: RecordSource> {
    source: Arc<S>,
    sort_by: String,
    sort_order: String,
}

impl<S: RecordSource> PageFetcher<S> {
    /// Create a fetcher sorting by creation time, newest first.
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            sort_by: "createdAt".to_string(),
            sort_order: "desc".to_string(),
        }
    }

    /// Create a fetcher using the configured sort.
    pub fn from_settings(source: Arc<S>, settings: &Settings) -> Self {
        Self::new(source).with_sort(settings.sort_by.clone(), settings.sort_order.clone())
    }

    pub fn with_sort(mut self, sort_by: impl Into<String>, sort_order: impl Into<String>) -> Self {
        self.sort_by = sort_by.into();
        self.sort_order = sort_order.into();
        self
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// Fetch the zero-based page `page_index`.
    pub async fn fetch_page(&self, page_index: u32, page_size: u32) -> Result<Page, FetchError> {
        let start = Instant::now();
        let request = PageRequest::for_page(
            page_index,
            page_size,
            self.sort_by.as_str(),
            self.sort_order.as_str(),
        );

        let payload = self.source.fetch_raw(&request).await?;
        let raw = extract_records(&payload);
        let records = normalize_records(raw);
        let has_more = resolve_has_more(&payload, raw.len(), page_size);

        debug!(
            page_index,
            raw = raw.len(),
            kept = records.len(),
            has_more,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Fetched page"
        );

        Ok(Page {
            records,
            has_more,
            raw_count: raw.len(),
        })
    }

    /// Fetch a page, converting any failure into an empty final page.
    ///
    /// The error message is handed to `report` instead of being returned.
    pub async fn fetch_page_or_report<F>(&self, page_index: u32, page_size: u32, report: F) -> Page
    where
        F: FnOnce(&str),
    {
        match self.fetch_page(page_index, page_size).await {
            Ok(page) => page,
            Err(e) => {
                warn!(page_index, error = %e, "Page fetch failed");
                report(&e.to_string());
                Page::empty()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MockRecordSource;
    use serde_json::json;

    fn athlete(id: u64, name: &str) -> serde_json::Value {
        json!({ "id": id + 1000, "user": { "id": id }, "name": name })
    }

    #[tokio::test]
    async fn test_fetch_page_normalizes_and_infers_more() {
        let items: Vec<_> = (0..3).map(|i| athlete(i, &format!("Athlete {}", i))).collect();
        let source = Arc::new(MockRecordSource::default().with_page(0, json!({ "items": items })));
        let fetcher = PageFetcher::new(source.clone());

        let page = fetcher.fetch_page(0, 3).await.unwrap();
        assert_eq!(page.records.len(), 3);
        assert_eq!(page.raw_count, 3);
        assert!(page.has_more);

        let requests = source.requests();
        assert_eq!(requests[0].page, 1);
        assert_eq!(requests[0].limit, 3);
        assert_eq!(requests[0].sort_by, "createdAt");
        assert_eq!(requests[0].sort_order, "desc");
    }

    #[tokio::test]
    async fn test_has_more_counts_raw_records() {
        // One of two raw records is rejected; the page is still full.
        let payload = json!({ "data": { "items": [athlete(1, "Kept"), { "name": "orphan" }] } });
        let source = Arc::new(MockRecordSource::default().with_page(0, payload));
        let page = PageFetcher::new(source).fetch_page(0, 2).await.unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.raw_count, 2);
        assert!(page.has_more);
    }

    #[tokio::test]
    async fn test_explicit_signal_beats_heuristic() {
        let payload = json!({ "athletes": [athlete(1, "Solo")], "meta": { "hasNextPage": true } });
        let source = Arc::new(MockRecordSource::default().with_page(0, payload));
        let page = PageFetcher::new(source).fetch_page(0, 50).await.unwrap();
        assert!(page.has_more);
    }

    #[tokio::test]
    async fn test_failure_reports_and_returns_empty_page() {
        let source = Arc::new(MockRecordSource::default().with_failure(0, FetchError::Timeout));
        let fetcher = PageFetcher::new(source);

        let mut reported = None;
        let page = fetcher
            .fetch_page_or_report(0, 50, |msg| reported = Some(msg.to_string()))
            .await;

        assert_eq!(page, Page::empty());
        assert!(!page.has_more);
        assert_eq!(reported.as_deref(), Some("Timeout waiting for response"));
    }

    #[tokio::test]
    async fn test_custom_sort() {
        let source = Arc::new(MockRecordSource::default());
        let fetcher = PageFetcher::new(source.clone()).with_sort("name", "asc");
        fetcher.fetch_page(4, 10).await.unwrap();
        let request = &source.requests()[0];
        assert_eq!(request.page, 5);
        assert_eq!(request.sort_by, "name");
        assert_eq!(request.sort_order, "asc");
    }
}
