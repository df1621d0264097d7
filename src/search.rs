//! Search controller
//!
//! Free-text search over movies and TV series. Input changes are debounced:
//! every keystroke aborts the pending scheduled query and schedules a new one,
//! so only the latest input ever reaches the API. A fresh query replaces the
//! results starting from page 1; [`SearchController::load_more`] appends the
//! next page.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::api::{TmdbClient, TmdbError};
use crate::models::{MediaRecord, Page, RecordKind};

/// Delay between the last keystroke and the query going out
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Message shown when a search request fails
pub const SEARCH_ERROR_MESSAGE: &str = "Failed to search movies. Please try again.";

/// Backend for [`SearchController`]
#[async_trait]
pub trait SearchSource: Send + Sync + 'static {
    async fn search(&self, query: &str, page: u32) -> Result<Page<MediaRecord>, TmdbError>;
}

#[async_trait]
impl SearchSource for TmdbClient {
    async fn search(&self, query: &str, page: u32) -> Result<Page<MediaRecord>, TmdbError> {
        self.search_multi(query, page).await
    }
}

/// Snapshot of the search view
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub query: String,
    /// Last page applied (1-based); 0 before any results
    pub page: u32,
    pub total_pages: Option<u32>,
    pub results: Vec<MediaRecord>,
    /// Any request in flight
    pub loading: bool,
    /// A fresh (page 1) query is in flight
    pub searching: bool,
    pub error: Option<String>,
}

impl SearchState {
    pub fn has_more(&self) -> bool {
        self.total_pages.is_some_and(|total| self.page < total)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Results were applied
    Loaded { added: usize },
    /// Query was empty; results cleared without a request
    Cleared,
    /// Nothing to do (request in flight, no more pages, or no query)
    Skipped,
    /// Response arrived for a query that is no longer current
    Discarded,
}

/// A failed search. Displays as the user-facing message.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct SearchError {
    pub message: String,
    #[source]
    pub source: TmdbError,
}

struct Inner {
    state: SearchState,
    generation: u64,
}

struct Shared<S> {
    source: S,
    inner: Mutex<Inner>,
}

impl<S: SearchSource> Shared<S> {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a fresh query from page 1
    async fn run_fresh(&self) -> Result<SearchOutcome, SearchError> {
        let (generation, query) = {
            let mut inner = self.lock();
            let query = inner.state.query.trim().to_string();
            inner.generation += 1;
            if query.is_empty() {
                clear_results(&mut inner.state);
                return Ok(SearchOutcome::Cleared);
            }
            inner.state.loading = true;
            inner.state.searching = true;
            inner.state.error = None;
            (inner.generation, query)
        };

        debug!(%query, "searching");
        let result = self.source.search(&query, 1).await;
        self.apply(generation, 1, result, true)
    }

    async fn run_more(&self) -> Result<SearchOutcome, SearchError> {
        let (generation, query, next) = {
            let mut inner = self.lock();
            let state = &mut inner.state;
            let query = state.query.trim().to_string();
            if state.loading || query.is_empty() || !state.has_more() {
                return Ok(SearchOutcome::Skipped);
            }
            state.loading = true;
            state.error = None;
            let next = state.page + 1;
            (inner.generation, query, next)
        };

        debug!(%query, page = next, "loading more search results");
        let result = self.source.search(&query, next).await;
        self.apply(generation, next, result, false)
    }

    fn apply(
        &self,
        generation: u64,
        page_number: u32,
        result: Result<Page<MediaRecord>, TmdbError>,
        replace: bool,
    ) -> Result<SearchOutcome, SearchError> {
        let mut inner = self.lock();
        if inner.generation != generation {
            return Ok(SearchOutcome::Discarded);
        }

        let state = &mut inner.state;
        state.loading = false;
        state.searching = false;
        match result {
            Ok(page) => {
                let results: Vec<_> = page
                    .results
                    .into_iter()
                    .filter(|r| matches!(r.kind(), RecordKind::Movie | RecordKind::Series))
                    .collect();
                let added = results.len();
                if replace {
                    state.results = results;
                } else {
                    state.results.extend(results);
                }
                state.page = page_number;
                state.total_pages = Some(page.total_pages);
                Ok(SearchOutcome::Loaded { added })
            }
            Err(e) => {
                warn!(page = page_number, error = %e, "Failed to search movies");
                state.error = Some(SEARCH_ERROR_MESSAGE.to_string());
                Err(SearchError {
                    message: SEARCH_ERROR_MESSAGE.to_string(),
                    source: e,
                })
            }
        }
    }
}

fn clear_results(state: &mut SearchState) {
    state.results.clear();
    state.page = 0;
    state.total_pages = None;
    state.loading = false;
    state.searching = false;
    state.error = None;
}

/// Debounced, paginated search
pub struct SearchController<S: SearchSource> {
    shared: Arc<Shared<S>>,
    pending: Mutex<Option<JoinHandle<()>>>,
    debounce: Duration,
}

impl<S: SearchSource> SearchController<S> {
    pub fn new(source: S) -> Self {
        Self::with_debounce(source, DEFAULT_DEBOUNCE)
    }

    pub fn with_debounce(source: S, debounce: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                source,
                inner: Mutex::new(Inner {
                    state: SearchState::default(),
                    generation: 0,
                }),
            }),
            pending: Mutex::new(None),
            debounce,
        }
    }

    pub fn snapshot(&self) -> SearchState {
        self.shared.lock().state.clone()
    }

    fn abort_pending(&self) {
        let handle = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
        }
    }

    /// Record new input and schedule a query after the debounce delay.
    ///
    /// Must be called from within a tokio runtime. Empty input clears the
    /// results immediately without scheduling anything.
    pub fn set_query(&self, text: impl Into<String>) {
        self.abort_pending();

        let text = text.into();
        {
            let mut inner = self.shared.lock();
            inner.generation += 1;
            inner.state.query = text.clone();
            inner.state.loading = false;
            inner.state.searching = false;
            if text.trim().is_empty() {
                clear_results(&mut inner.state);
                return;
            }
        }

        let shared = Arc::clone(&self.shared);
        let delay = self.debounce;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Failures are already recorded in the state
            let _ = shared.run_fresh().await;
        });
        *self.pending.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
    }

    /// Run the current query now, skipping the debounce delay
    pub async fn submit(&self) -> Result<SearchOutcome, SearchError> {
        self.abort_pending();
        self.shared.run_fresh().await
    }

    /// Append the next page of the current query
    pub async fn load_more(&self) -> Result<SearchOutcome, SearchError> {
        self.shared.run_more().await
    }

    /// Empty the query and results
    pub fn clear(&self) {
        self.abort_pending();
        let mut inner = self.shared.lock();
        inner.generation += 1;
        inner.state.query.clear();
        clear_results(&mut inner.state);
    }

    /// Wait for the scheduled query, if any, to finish
    pub async fn wait_pending(&self) {
        let handle = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}

impl<S: SearchSource> Drop for SearchController<S> {
    fn drop(&mut self) {
        self.abort_pending();
    }
}
