//! cinedeck - browse TMDB movies and TV series from the terminal
//!
//! Paginated top-rated and trending listings, debounced search, detail views
//! with images and trailers, and a locally persisted watchlist.
//!
//! # Modules
//!
//! - `models` - Records, formatting helpers and detail bundles
//! - `api` - TMDB v3 client
//! - `pagination` - Incremental listing controller
//! - `search` - Debounced search controller
//! - `storage` - Key-value persistence backends
//! - `watchlist` - Watchlist store
//! - `config`, `logging`, `cli`, `commands` - The command-line front end

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod models;
pub mod pagination;
pub mod search;
pub mod storage;
pub mod watchlist;

// Re-export commonly used types
pub use models::{
    DateLocale, DisplaySummary, MediaKind, MediaRecord, Movie, Page, RecordKind, Summary,
    TvEpisode, TvSeries,
};

pub use api::{TmdbClient, TmdbError};
pub use config::Config;
pub use pagination::{ListingSource, PaginatedList};
pub use search::SearchController;
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use watchlist::WatchlistStore;
