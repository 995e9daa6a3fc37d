//! # finder-core
//!
//! Incremental athlete search for athlete-finder.
//!
//! Upstream offers no server-side name search, so matches are found by
//! paging through the directory, accumulating normalized records and
//! filtering them locally. When the current query has too few matches the
//! session keeps fetching pages on its own, within fixed bounds.
//!
//! ## Core Concepts
//!
//! - **Accumulator**: ordered, deduplicated, capped working set of records
//! - **Query Filter**: case-insensitive substring match over name, location and affiliation
//! - **Auto-Scan**: bounded page loop that stops on target, exhaustion, page limit or reset
//! - **Generation**: counter bumped on every reset; stale responses are discarded
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use finder_core::{RecordingObserver, ScanConditions, SearchSession};
//! use finder_fetch::{HttpRecordSource, HttpSourceConfig, PageFetcher};
//!
//! let source = HttpRecordSource::new(HttpSourceConfig::new(endpoint))?;
//! let session = SearchSession::new(
//!     PageFetcher::new(Arc::new(source)),
//!     ScanConditions::default(),
//!     Arc::new(RecordingObserver::default()),
//! );
//!
//! session.open().await;
//! let outcome = session.search("ana").await;
//! println!("{}", outcome.explanation());
//! for record in session.matches() {
//!     println!("{} {}", record.id, record.display_name);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`types`]: ScanConditions, loading and scan states, stop reasons, outcomes
//! - [`accumulator`]: merge with dedupe and hard cap
//! - [`filter`]: query normalization and matching
//! - [`observer`]: outbound error, selection and close signals
//! - [`session`]: the per-surface search session and auto-scan controller

pub mod accumulator;
pub mod filter;
pub mod observer;
pub mod session;
pub mod types;

// Re-export main types at crate root
pub use accumulator::{is_at_cap, merge, merge_with_cap, Accumulator};
pub use filter::{count_matches, filter, filter_with_min_len, is_searchable, normalize_query};
pub use observer::{NoopObserver, RecordingObserver, SessionObserver};
pub use session::{SearchSession, SessionSnapshot};
pub use types::{LoadOutcome, LoadingState, ScanConditions, ScanOutcome, ScanState, StopReason};
