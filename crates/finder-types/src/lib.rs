//! # finder-types
//!
//! Shared domain types for athlete-finder.
//!
//! - [`CanonicalRecord`]: the normalized athlete profile every session works on
//! - [`Settings`]: layered configuration
//! - [`FinderError`]: configuration/setup errors
//!
//! ## Usage
//!
//! ```rust
//! use finder_types::CanonicalRecord;
//!
//! let record = CanonicalRecord::new(42u64, "Ana Lima").with_location("Porto");
//! assert_eq!(record.dedupe_key().name, "ana lima");
//! ```

pub mod config;
pub mod error;
pub mod record;

pub use config::{
    Settings, DEFAULT_PAGE_SIZE, HARD_CAP, MAX_SCAN_PAGES, MIN_QUERY_LEN, TARGET_MATCHES,
};
pub use error::FinderError;
pub use record::{CanonicalRecord, DedupeKey, RecordId};
