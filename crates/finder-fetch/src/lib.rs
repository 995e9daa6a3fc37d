//! # finder-fetch
//!
//! Upstream access for athlete-finder.
//!
//! ## Modules
//!
//! - [`normalize`]: raw profile JSON to [`finder_types::CanonicalRecord`]
//! - [`envelope`]: record array and pagination signal extraction
//! - [`source`]: the [`RecordSource`] transport seam (HTTP and scripted)
//! - [`fetcher`]: [`PageFetcher`], one normalized page per call
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use finder_fetch::{HttpRecordSource, HttpSourceConfig, PageFetcher};
//!
//! # async fn run() -> Result<(), finder_fetch::FetchError> {
//! let source = HttpRecordSource::new(HttpSourceConfig::new("https://clubs.example/api/athletes"))?;
//! let fetcher = PageFetcher::new(Arc::new(source));
//! let page = fetcher.fetch_page(0, 50).await?;
//! println!("{} athletes, more: {}", page.records.len(), page.has_more);
//! # Ok(())
//! # }
//! ```

pub mod envelope;
pub mod error;
pub mod fetcher;
pub mod normalize;
pub mod source;

pub use envelope::{explicit_has_more, extract_records, resolve_has_more};
pub use error::FetchError;
pub use fetcher::{Page, PageFetcher};
pub use normalize::{normalize_record, normalize_records, resolve_first, resolve_id, Candidate};
pub use source::{
    HttpRecordSource, HttpSourceConfig, MockRecordSource, PageRequest, RecordSource,
};
