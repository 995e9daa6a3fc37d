//! Search session and auto-scan controller.
//!
//! A [`SearchSession`] is the per-surface context: query, accumulated
//! records, page cursor and fetch state all live in one object, shared by
//! cheap clones of the handle. Nothing is global, so any number of surfaces
//! can search side by side.
//!
//! Every mutating step captures the session generation before it awaits a
//! fetch and re-checks it afterwards. `open` and `close` bump the generation,
//! so a response that resolves after a reset is discarded without touching
//! the new state, and a running scan loop ends at its next check.
//!
//! Each scan run also holds a run token. Clearing the query below the
//! minimum length invalidates the token, so the page in flight for that run
//! is dropped while the accumulated records stay.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info};

use finder_fetch::{PageFetcher, RecordSource};
use finder_types::CanonicalRecord;

use crate::accumulator::Accumulator;
use crate::filter::{count_matches, filter_with_min_len, is_searchable};
use crate::observer::{NoopObserver, SessionObserver};
use crate::types::{LoadOutcome, LoadingState, ScanConditions, ScanOutcome, ScanState, StopReason};

/// Mutable per-session fields.
#[derive(Debug)]
struct SessionState {
    open: bool,
    query: String,
    accumulator: Accumulator,
    page_cursor: u32,
    has_more_pages: bool,
    loading: LoadingState,
    scan: ScanState,
    scan_run: u64,
    last_error: Option<String>,
}

impl SessionState {
    fn fresh(hard_cap: usize) -> Self {
        Self {
            open: false,
            query: String::new(),
            accumulator: Accumulator::with_cap(hard_cap),
            page_cursor: 0,
            has_more_pages: true,
            loading: LoadingState::Idle,
            scan: ScanState::Idle,
            scan_run: 0,
            last_error: None,
        }
    }

    fn match_count(&self, min_query_len: usize) -> usize {
        count_matches(self.accumulator.records(), &self.query, min_query_len)
    }
}

/// Point-in-time copy of a session, for rendering and assertions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub generation: u64,
    pub open: bool,
    pub query: String,
    pub accumulated: Vec<CanonicalRecord>,
    pub matches: Vec<CanonicalRecord>,
    pub page_cursor: u32,
    pub has_more_pages: bool,
    pub loading_state: LoadingState,
    pub scan_state: ScanState,
    pub last_error: Option<String>,
}

/// Result of one fetch attempt against the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchStep {
    Applied { added: usize, has_more: bool },
    Failed,
    Busy,
    Exhausted,
    Closed,
    Cancelled,
}

struct SessionContext<S: RecordSource> {
    fetcher: PageFetcher<S>,
    conditions: ScanConditions,
    observer: Arc<dyn SessionObserver>,
    generation: AtomicU64,
    state: Mutex<SessionState>,
}

/// Handle to one search session.
pub struct SearchSession<S: RecordSource> {
    ctx: Arc<SessionContext<S>>,
}

impl<S: RecordSource> Clone for SearchSession<S> {
    fn clone(&self) -> Self {
        Self {
            ctx: Arc::clone(&self.ctx),
        }
    }
}

/// Returns the scan flag to idle when a scan run ends, even if its future is
/// dropped mid-fetch. A reset in the meantime already replaced the state.
struct ScanGuard<'a, S: RecordSource> {
    session: &'a SearchSession<S>,
    generation: u64,
}

impl<S: RecordSource> Drop for ScanGuard<'_, S> {
    fn drop(&mut self) {
        let mut state = self.session.lock_state();
        if self.session.generation() == self.generation {
            state.scan = ScanState::Idle;
        }
    }
}

/// Puts the loading state back to idle if a fetch future is dropped before
/// its response is applied.
struct FetchGuard<'a, S: RecordSource> {
    session: &'a SearchSession<S>,
    generation: u64,
    armed: bool,
}

impl<S: RecordSource> Drop for FetchGuard<'_, S> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.session.lock_state();
        if self.session.generation() == self.generation {
            state.loading = LoadingState::Idle;
        }
    }
}

impl<S: RecordSource> SearchSession<S> {
    /// Create a closed session.
    pub fn new(
        fetcher: PageFetcher<S>,
        conditions: ScanConditions,
        observer: Arc<dyn SessionObserver>,
    ) -> Self {
        let state = SessionState::fresh(conditions.hard_cap);
        Self {
            ctx: Arc::new(SessionContext {
                fetcher,
                conditions,
                observer,
                generation: AtomicU64::new(0),
                state: Mutex::new(state),
            }),
        }
    }

    /// Create a closed session with default bounds and no observer.
    pub fn with_defaults(fetcher: PageFetcher<S>) -> Self {
        Self::new(fetcher, ScanConditions::default(), Arc::new(NoopObserver))
    }

    /// Bounds this session scans with.
    pub fn conditions(&self) -> &ScanConditions {
        &self.ctx.conditions
    }

    /// Current session generation.
    pub fn generation(&self) -> u64 {
        self.ctx.generation.load(Ordering::SeqCst)
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.ctx
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace all state and bump the generation.
    fn reset(&self, open: bool) -> u64 {
        let mut state = self.lock_state();
        let generation = self.ctx.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *state = SessionState::fresh(self.ctx.conditions.hard_cap);
        state.open = open;
        generation
    }

    /// Surface opened: reset everything and load the first page.
    pub async fn open(&self) -> LoadOutcome {
        let generation = self.reset(true);
        info!(generation, "Search session opened");
        self.load(generation, LoadingState::LoadingInitial).await
    }

    /// Surface closed: cancel any scan and discard all state.
    pub fn close(&self) {
        let generation = self.reset(false);
        info!(generation, "Search session closed");
    }

    /// Fetch the next page on demand.
    pub async fn load_more(&self) -> LoadOutcome {
        self.load(self.generation(), LoadingState::LoadingMore).await
    }

    async fn load(&self, generation: u64, mode: LoadingState) -> LoadOutcome {
        match self.fetch_next(generation, None, mode).await {
            FetchStep::Applied { added, has_more } => LoadOutcome::Loaded { added, has_more },
            FetchStep::Failed => LoadOutcome::Failed,
            FetchStep::Busy => LoadOutcome::Busy,
            FetchStep::Exhausted => LoadOutcome::Exhausted,
            FetchStep::Closed => LoadOutcome::Closed,
            FetchStep::Cancelled => LoadOutcome::Cancelled,
        }
    }

    /// Fetch the page at the cursor and merge it, unless the session moved on
    /// or, for a scan fetch, the scan run was cancelled.
    async fn fetch_next(
        &self,
        generation: u64,
        scan_run: Option<u64>,
        mode: LoadingState,
    ) -> FetchStep {
        let page_size = self.ctx.conditions.page_size;
        let page_index = {
            let mut state = self.lock_state();
            if self.generation() != generation {
                return FetchStep::Cancelled;
            }
            if !state.open {
                return FetchStep::Closed;
            }
            if state.loading.is_loading() {
                return FetchStep::Busy;
            }
            if !state.has_more_pages {
                return FetchStep::Exhausted;
            }
            state.loading = mode;
            state.page_cursor
        };
        let mut guard = FetchGuard {
            session: self,
            generation,
            armed: true,
        };

        let mut failure: Option<String> = None;
        let page = self
            .ctx
            .fetcher
            .fetch_page_or_report(page_index, page_size, |message| {
                failure = Some(message.to_string())
            })
            .await;

        let mut state = self.lock_state();
        guard.armed = false;
        if self.generation() != generation {
            debug!(page_index, generation, "Discarding stale page response");
            return FetchStep::Cancelled;
        }
        state.loading = LoadingState::Idle;
        if scan_run.is_some_and(|run| run != state.scan_run) {
            debug!(page_index, "Discarding page for cancelled scan");
            return FetchStep::Cancelled;
        }

        if let Some(message) = failure {
            state.has_more_pages = false;
            state.last_error = Some(message.clone());
            drop(state);
            self.ctx.observer.on_error(&message);
            return FetchStep::Failed;
        }

        state.page_cursor += 1;
        let added = state.accumulator.extend(&page.records);
        state.has_more_pages = page.has_more && !state.accumulator.is_full();
        state.last_error = None;
        debug!(
            page_index,
            added,
            accumulated = state.accumulator.len(),
            has_more = state.has_more_pages,
            "Merged page"
        );
        FetchStep::Applied {
            added,
            has_more: state.has_more_pages,
        }
    }

    /// Store a new query and return its current matches.
    ///
    /// A query below the minimum length cancels a running scan.
    pub fn set_query(&self, query: &str) -> Vec<CanonicalRecord> {
        let mut state = self.lock_state();
        state.query = query.to_string();
        if state.scan == ScanState::Scanning
            && !is_searchable(&state.query, self.ctx.conditions.min_query_len)
        {
            state.scan_run += 1;
            debug!(scan_run = state.scan_run, "Query cleared, cancelling scan");
        }
        filter_with_min_len(
            state.accumulator.records(),
            &state.query,
            self.ctx.conditions.min_query_len,
        )
        .into_iter()
        .cloned()
        .collect()
    }

    /// Keystroke path: update the query, then scan if matches are short.
    pub async fn search(&self, query: &str) -> ScanOutcome {
        self.set_query(query);
        self.auto_scan().await
    }

    /// Whether an auto-scan run would fetch anything right now.
    pub fn needs_scan(&self) -> bool {
        let state = self.lock_state();
        let conditions = &self.ctx.conditions;
        state.open
            && state.scan == ScanState::Idle
            && is_searchable(&state.query, conditions.min_query_len)
            && state.has_more_pages
            && state.match_count(conditions.min_query_len) < conditions.target_matches
    }

    fn stop_condition(&self, state: &SessionState, pages_scanned: u32) -> Option<StopReason> {
        let conditions = &self.ctx.conditions;
        if !is_searchable(&state.query, conditions.min_query_len) {
            return Some(StopReason::QueryTooShort);
        }
        if !state.has_more_pages {
            return Some(StopReason::Exhausted);
        }
        if state.match_count(conditions.min_query_len) >= conditions.target_matches {
            return Some(StopReason::TargetReached);
        }
        if pages_scanned >= conditions.max_scan_pages {
            return Some(StopReason::SafetyLimit);
        }
        None
    }

    /// Fetch pages until the query has enough matches, upstream runs dry,
    /// the per-run page limit is hit, or the run is cancelled by a reset or a
    /// cleared query.
    ///
    /// Continuation is re-evaluated after every page against the current
    /// query, so a query edited mid-run is honoured on the next tick.
    pub async fn auto_scan(&self) -> ScanOutcome {
        let start = Instant::now();
        let generation = self.generation();

        let run = {
            let mut state = self.lock_state();
            if !state.open {
                return self.outcome(&state, StopReason::Cancelled, 0, start);
            }
            if state.scan == ScanState::Scanning || state.loading.is_loading() {
                return self.outcome(&state, StopReason::Busy, 0, start);
            }
            state.scan = ScanState::Scanning;
            state.scan_run += 1;
            state.scan_run
        };
        let _guard = ScanGuard {
            session: self,
            generation,
        };

        let mut pages_scanned = 0u32;
        let stop_reason = loop {
            {
                let state = self.lock_state();
                if self.generation() != generation || state.scan_run != run {
                    break StopReason::Cancelled;
                }
                if let Some(reason) = self.stop_condition(&state, pages_scanned) {
                    break reason;
                }
            }

            match self
                .fetch_next(generation, Some(run), LoadingState::LoadingMore)
                .await
            {
                FetchStep::Applied { .. } => pages_scanned += 1,
                FetchStep::Failed => {
                    pages_scanned += 1;
                    break StopReason::FetchFailed;
                }
                FetchStep::Busy => break StopReason::Busy,
                FetchStep::Exhausted => break StopReason::Exhausted,
                FetchStep::Closed | FetchStep::Cancelled => break StopReason::Cancelled,
            }
        };

        let state = self.lock_state();
        let outcome = self.outcome(&state, stop_reason, pages_scanned, start);
        drop(state);

        info!(
            generation,
            stop_reason = %outcome.stop_reason,
            pages_scanned = outcome.pages_scanned,
            matches = outcome.match_count,
            accumulated = outcome.accumulated,
            elapsed_ms = outcome.elapsed_ms,
            "Auto-scan finished"
        );
        outcome
    }

    fn outcome(
        &self,
        state: &SessionState,
        stop_reason: StopReason,
        pages_scanned: u32,
        start: Instant,
    ) -> ScanOutcome {
        ScanOutcome {
            stop_reason,
            pages_scanned,
            match_count: state.match_count(self.ctx.conditions.min_query_len),
            accumulated: state.accumulator.len(),
            elapsed_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// Current matches for the stored query.
    pub fn matches(&self) -> Vec<CanonicalRecord> {
        let state = self.lock_state();
        filter_with_min_len(
            state.accumulator.records(),
            &state.query,
            self.ctx.conditions.min_query_len,
        )
        .into_iter()
        .cloned()
        .collect()
    }

    /// Pick the `index`-th current match.
    ///
    /// Emits the record and a close request to the observer, then closes the
    /// session. Returns `None` (and does nothing) for an out-of-range index.
    pub fn select(&self, index: usize) -> Option<CanonicalRecord> {
        let record = self.matches().into_iter().nth(index)?;
        info!(id = %record.id, name = %record.display_name, "Record selected");
        self.ctx.observer.on_selected(&record);
        self.ctx.observer.on_close_requested();
        self.close();
        Some(record)
    }

    /// Records accumulated so far.
    pub fn accumulated_len(&self) -> usize {
        self.lock_state().accumulator.len()
    }

    /// Zero-based index of the next page to fetch.
    pub fn page_cursor(&self) -> u32 {
        self.lock_state().page_cursor
    }

    /// Whether another page may be fetched.
    pub fn has_more_pages(&self) -> bool {
        self.lock_state().has_more_pages
    }

    /// Message of the most recent failed fetch, cleared by the next success.
    pub fn last_error(&self) -> Option<String> {
        self.lock_state().last_error.clone()
    }

    /// Copy of the current session fields.
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.lock_state();
        let records = state.accumulator.records();
        SessionSnapshot {
            generation: self.generation(),
            open: state.open,
            query: state.query.clone(),
            accumulated: records.to_vec(),
            matches: filter_with_min_len(records, &state.query, self.ctx.conditions.min_query_len)
                .into_iter()
                .cloned()
                .collect(),
            page_cursor: state.page_cursor,
            has_more_pages: state.has_more_pages,
            loading_state: state.loading,
            scan_state: state.scan,
            last_error: state.last_error.clone(),
        }
    }
}
