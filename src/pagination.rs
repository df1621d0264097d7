//! Paginated list controller
//!
//! Drives "load more on scroll" for one remote listing: tracks the current
//! page and the last known page count, appends each new page in fetch order,
//! and refuses to start a continuation while another fetch is in flight.
//!
//! Methods take `&self` so the controller can be shared with whatever drives
//! the UI. The state lock is never held across a request. A generation
//! counter lets a newer first-page load or refresh (or [`PaginatedList::cancel`])
//! invalidate whatever is still in flight, and stale results are dropped.

use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::{debug, warn};

use crate::api::{TmdbClient, TmdbError};
use crate::models::{Listing, MediaRecord, Page};

/// Message shown when a listing page fails to load
pub const LIST_ERROR_MESSAGE: &str = "Failed to load content. Please try again later.";

/// Anything that can hand out numbered pages
#[async_trait]
pub trait PageSource: Send + Sync {
    type Item: Send;

    async fn fetch_page(&self, page: u32) -> Result<Page<Self::Item>, TmdbError>;
}

#[async_trait]
impl<S: PageSource + ?Sized> PageSource for std::sync::Arc<S> {
    type Item = S::Item;

    async fn fetch_page(&self, page: u32) -> Result<Page<Self::Item>, TmdbError> {
        (**self).fetch_page(page).await
    }
}

/// A TMDB listing (top-rated or trending) as a [`PageSource`]
#[derive(Debug, Clone)]
pub struct ListingSource {
    client: TmdbClient,
    listing: Listing,
}

impl ListingSource {
    pub fn new(client: TmdbClient, listing: Listing) -> Self {
        Self { client, listing }
    }
}

#[async_trait]
impl PageSource for ListingSource {
    type Item = MediaRecord;

    async fn fetch_page(&self, page: u32) -> Result<Page<MediaRecord>, TmdbError> {
        self.client.listing(&self.listing, page).await
    }
}

/// What a fetch is doing, for the loading indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPhase {
    #[default]
    Idle,
    /// Full-screen load of the first page
    Loading,
    /// Pull-to-refresh of the first page
    Refreshing,
    /// Appending the next page
    LoadingMore,
}

/// Snapshot of a paginated list
#[derive(Debug, Clone)]
pub struct PaginationState<T> {
    /// Last page applied (1-based); 0 before anything loaded
    pub page: u32,
    /// Page count reported by the last successful fetch
    pub total_pages: Option<u32>,
    pub items: Vec<T>,
    pub phase: LoadPhase,
    pub error: Option<String>,
}

impl<T> Default for PaginationState<T> {
    fn default() -> Self {
        Self {
            page: 0,
            total_pages: None,
            items: Vec::new(),
            phase: LoadPhase::Idle,
            error: None,
        }
    }
}

impl<T> PaginationState<T> {
    pub fn in_flight(&self) -> bool {
        self.phase != LoadPhase::Idle
    }

    pub fn has_more(&self) -> bool {
        self.total_pages.map_or(true, |total| self.page < total)
    }
}

/// Result of a load call that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page was applied
    Loaded { added: usize },
    /// Nothing to do: a fetch is in flight or the last page is already loaded
    Skipped,
    /// The fetch finished after being superseded; its result was dropped
    Discarded,
}

/// A failed page fetch. Displays as the user-facing message.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct ListError {
    pub message: String,
    #[source]
    pub source: TmdbError,
}

struct Inner<T> {
    state: PaginationState<T>,
    generation: u64,
}

/// Incremental loader for one listing
pub struct PaginatedList<S: PageSource> {
    source: S,
    inner: Mutex<Inner<S::Item>>,
}

impl<S: PageSource> PaginatedList<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            inner: Mutex::new(Inner {
                state: PaginationState::default(),
                generation: 0,
            }),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    fn lock(&self) -> MutexGuard<'_, Inner<S::Item>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> PaginationState<S::Item>
    where
        S::Item: Clone,
    {
        self.lock().state.clone()
    }

    /// Load page 1 and replace the accumulated items with it
    pub async fn load_first_page(&self) -> Result<LoadOutcome, ListError> {
        self.reload(LoadPhase::Loading).await
    }

    /// Same as [`PaginatedList::load_first_page`] behind the refresh indicator
    pub async fn refresh(&self) -> Result<LoadOutcome, ListError> {
        self.reload(LoadPhase::Refreshing).await
    }

    /// Fetch the page after the last one applied and append it
    pub async fn load_next_page(&self) -> Result<LoadOutcome, ListError> {
        let (generation, next) = {
            let mut inner = self.lock();
            let state = &mut inner.state;
            if state.in_flight() || !state.has_more() {
                debug!(page = state.page, total = ?state.total_pages, "skipping next page");
                return Ok(LoadOutcome::Skipped);
            }
            state.phase = if state.page == 0 {
                LoadPhase::Loading
            } else {
                LoadPhase::LoadingMore
            };
            state.error = None;
            (inner.generation, inner.state.page + 1)
        };

        let result = self.source.fetch_page(next).await;
        self.apply(generation, next, result, false)
    }

    /// Drop whatever is in flight; its result will be discarded on arrival
    pub fn cancel(&self) {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.state.phase = LoadPhase::Idle;
    }

    async fn reload(&self, phase: LoadPhase) -> Result<LoadOutcome, ListError> {
        let generation = {
            let mut inner = self.lock();
            inner.generation += 1;
            inner.state.phase = phase;
            inner.state.error = None;
            inner.generation
        };

        let result = self.source.fetch_page(1).await;
        self.apply(generation, 1, result, true)
    }

    fn apply(
        &self,
        generation: u64,
        page_number: u32,
        result: Result<Page<S::Item>, TmdbError>,
        replace: bool,
    ) -> Result<LoadOutcome, ListError> {
        let mut inner = self.lock();
        if inner.generation != generation {
            debug!(page = page_number, "discarding superseded page");
            return Ok(LoadOutcome::Discarded);
        }

        let state = &mut inner.state;
        state.phase = LoadPhase::Idle;
        match result {
            Ok(page) => {
                let added = page.results.len();
                if replace {
                    state.items = page.results;
                } else {
                    state.items.extend(page.results);
                }
                state.page = page_number;
                state.total_pages = Some(page.total_pages);
                Ok(LoadOutcome::Loaded { added })
            }
            Err(e) => {
                warn!(page = page_number, error = %e, "Failed to fetch media");
                state.error = Some(LIST_ERROR_MESSAGE.to_string());
                Err(ListError {
                    message: LIST_ERROR_MESSAGE.to_string(),
                    source: e,
                })
            }
        }
    }
}
