//! Core search types.
//!
//! - `ScanConditions`: bounds for one search session
//! - `LoadingState` / `ScanState`: what the session is doing right now
//! - `StopReason`: why an auto-scan run ended
//! - `ScanOutcome` / `LoadOutcome`: results of scan and manual fetches

use std::fmt;

use serde::{Deserialize, Serialize};

use finder_types::{
    Settings, DEFAULT_PAGE_SIZE, HARD_CAP, MAX_SCAN_PAGES, MIN_QUERY_LEN, TARGET_MATCHES,
};

/// Bounds for a search session.
///
/// Every auto-scan run respects these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConditions {
    /// Matches to surface before the scan stops (default: 10)
    pub target_matches: usize,

    /// Pages one scan run may fetch (default: 10)
    pub max_scan_pages: u32,

    /// Records requested per page (default: 50)
    pub page_size: u32,

    /// Records retained per session (default: 5000)
    pub hard_cap: usize,

    /// Minimum normalized query length (default: 2)
    pub min_query_len: usize,
}

impl Default for ScanConditions {
    fn default() -> Self {
        Self {
            target_matches: TARGET_MATCHES,
            max_scan_pages: MAX_SCAN_PAGES,
            page_size: DEFAULT_PAGE_SIZE,
            hard_cap: HARD_CAP,
            min_query_len: MIN_QUERY_LEN,
        }
    }
}

impl ScanConditions {
    /// Take the scan bounds from loaded settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            target_matches: settings.target_matches,
            max_scan_pages: settings.max_scan_pages,
            page_size: settings.page_size,
            hard_cap: settings.hard_cap,
            min_query_len: settings.min_query_len,
        }
    }

    /// Builder: set page size (at least 1)
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Builder: set target matches (at least 1)
    pub fn with_target_matches(mut self, target: usize) -> Self {
        self.target_matches = target.max(1);
        self
    }

    /// Builder: set the per-run page limit (at least 1)
    pub fn with_max_scan_pages(mut self, pages: u32) -> Self {
        self.max_scan_pages = pages.max(1);
        self
    }

    /// Builder: set the hard cap (at least 1)
    pub fn with_hard_cap(mut self, cap: usize) -> Self {
        self.hard_cap = cap.max(1);
        self
    }
}

/// Fetch activity of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LoadingState {
    /// No fetch in flight
    #[default]
    Idle,

    /// First page after opening
    LoadingInitial,

    /// Any later page, manual or auto-scan
    LoadingMore,
}

impl LoadingState {
    pub fn is_loading(&self) -> bool {
        !matches!(self, LoadingState::Idle)
    }
}

/// Auto-scan state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScanState {
    #[default]
    Idle,
    Scanning,
}

/// Why an auto-scan run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Enough matches are visible
    TargetReached,

    /// Upstream has no more pages (or the hard cap was reached)
    Exhausted,

    /// The per-run page limit was hit
    SafetyLimit,

    /// Query is below the minimum length
    QueryTooShort,

    /// The tick's fetch failed; the error was reported
    FetchFailed,

    /// Another scan or fetch was already in flight
    Busy,

    /// The session was reset or closed mid-run
    Cancelled,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::TargetReached => "target_reached",
            StopReason::Exhausted => "exhausted",
            StopReason::SafetyLimit => "safety_limit",
            StopReason::QueryTooShort => "query_too_short",
            StopReason::FetchFailed => "fetch_failed",
            StopReason::Busy => "busy",
            StopReason::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of one auto-scan run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanOutcome {
    /// Why the run ended
    pub stop_reason: StopReason,

    /// Fetches issued by this run
    pub pages_scanned: u32,

    /// Matches for the current query when the run ended
    pub match_count: usize,

    /// Accumulated records when the run ended
    pub accumulated: usize,

    /// Wall time of the run
    pub elapsed_ms: u64,
}

impl ScanOutcome {
    /// Human-readable summary of the run.
    pub fn explanation(&self) -> String {
        let reason = match self.stop_reason {
            StopReason::TargetReached => "enough matches found",
            StopReason::Exhausted => "no more pages upstream",
            StopReason::SafetyLimit => "page limit for one scan reached",
            StopReason::QueryTooShort => "query too short to search",
            StopReason::FetchFailed => "page fetch failed",
            StopReason::Busy => "another fetch was in flight",
            StopReason::Cancelled => "session was reset",
        };
        format!(
            "{} match(es) in {} record(s) after {} page(s): {}",
            self.match_count, self.accumulated, self.pages_scanned, reason
        )
    }
}

/// Result of a single manual fetch (open or load more).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadOutcome {
    /// Page merged
    Loaded { added: usize, has_more: bool },

    /// Fetch failed; the error was reported
    Failed,

    /// Another fetch is in flight
    Busy,

    /// No more pages to fetch
    Exhausted,

    /// Session is not open
    Closed,

    /// Session was reset while the fetch was in flight
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_conditions() {
        let conditions = ScanConditions::default();
        assert_eq!(conditions.target_matches, 10);
        assert_eq!(conditions.max_scan_pages, 10);
        assert_eq!(conditions.page_size, 50);
        assert_eq!(conditions.hard_cap, 5000);
        assert_eq!(conditions.min_query_len, 2);
    }

    #[test]
    fn test_builders_clamp_to_one() {
        let conditions = ScanConditions::default()
            .with_page_size(0)
            .with_target_matches(0)
            .with_max_scan_pages(0)
            .with_hard_cap(0);
        assert_eq!(conditions.page_size, 1);
        assert_eq!(conditions.target_matches, 1);
        assert_eq!(conditions.max_scan_pages, 1);
        assert_eq!(conditions.hard_cap, 1);
    }

    #[test]
    fn test_from_settings() {
        let mut settings = Settings::default();
        settings.page_size = 20;
        settings.max_scan_pages = 3;
        let conditions = ScanConditions::from_settings(&settings);
        assert_eq!(conditions.page_size, 20);
        assert_eq!(conditions.max_scan_pages, 3);
        assert_eq!(conditions.target_matches, 10);
    }

    #[test]
    fn test_stop_reason_display() {
        assert_eq!(StopReason::SafetyLimit.to_string(), "safety_limit");
        assert_eq!(StopReason::Exhausted.as_str(), "exhausted");
    }

    #[test]
    fn test_outcome_explanation() {
        let outcome = ScanOutcome {
            stop_reason: StopReason::Exhausted,
            pages_scanned: 2,
            match_count: 12,
            accumulated: 150,
            elapsed_ms: 4,
        };
        let text = outcome.explanation();
        assert!(text.contains("12 match"));
        assert!(text.contains("no more pages"));
    }

    #[test]
    fn test_loading_state() {
        assert!(!LoadingState::Idle.is_loading());
        assert!(LoadingState::LoadingMore.is_loading());
    }
}
