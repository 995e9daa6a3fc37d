//! End-to-end test infrastructure for athlete-finder.
//!
//! Provides a shared TestHarness and payload builders for E2E tests
//! covering the full fetch, accumulate, filter and auto-scan path.

use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use wiremock::MockServer;

use finder_core::{RecordingObserver, ScanConditions, SearchSession};
use finder_fetch::{HttpRecordSource, HttpSourceConfig, MockRecordSource, PageFetcher, RecordSource};

/// Shared test harness for E2E tests.
///
/// Owns one search session plus handles on its source and observer so tests
/// can inspect requests and emitted signals.
pub struct TestHarness<S: RecordSource = MockRecordSource> {
    pub session: SearchSession<S>,
    pub source: Arc<S>,
    pub observer: Arc<RecordingObserver>,
}

impl<S: RecordSource> TestHarness<S> {
    /// Build a harness around any record source.
    pub fn with_source(source: S, conditions: ScanConditions) -> Self {
        let source = Arc::new(source);
        let observer = Arc::new(RecordingObserver::default());
        let session = SearchSession::new(
            PageFetcher::new(source.clone()),
            conditions,
            observer.clone(),
        );
        Self {
            session,
            source,
            observer,
        }
    }
}

impl TestHarness<MockRecordSource> {
    /// Harness over a scripted source with default bounds.
    pub fn new(source: MockRecordSource) -> Self {
        Self::with_source(source, ScanConditions::default())
    }

    /// Zero-based page indexes requested so far.
    pub fn requested_pages(&self) -> Vec<u32> {
        self.source.requested_pages()
    }
}

impl TestHarness<HttpRecordSource> {
    /// Harness over HTTP against a mock server, with fast retries.
    pub fn http(server: &MockServer, conditions: ScanConditions) -> Self {
        let config = HttpSourceConfig::new(format!("{}/api/athletes", server.uri()))
            .with_max_retries(1)
            .with_retry_interval(Duration::from_millis(10));
        let source = HttpRecordSource::new(config).expect("Failed to build HTTP source");
        Self::with_source(source, conditions)
    }
}

/// One raw athlete profile in the common upstream shape.
pub fn athlete_json(id: u64, name: &str) -> Value {
    json!({
        "id": 900_000 + id,
        "user": { "id": id, "avatar": format!("https://cdn.example/u{}.png", id) },
        "name": name,
        "city": "Lisbon",
        "team": { "name": "Tejo Runners" }
    })
}

/// Raw athletes with ids from `ids`, named `"{prefix} {id}"`.
pub fn athletes(ids: Range<u64>, prefix: &str) -> Vec<Value> {
    ids.map(|id| athlete_json(id, &format!("{} {}", prefix, id)))
        .collect()
}

/// Page envelope with an explicit continuation flag.
pub fn page_payload(items: Vec<Value>, has_next_page: bool) -> Value {
    json!({ "items": items, "hasNextPage": has_next_page })
}

/// Page envelope of `athletes(ids, prefix)`.
pub fn athlete_page(ids: Range<u64>, prefix: &str, has_next_page: bool) -> Value {
    page_payload(athletes(ids, prefix), has_next_page)
}
