//! Watchlist persistence
//!
//! The user's saved movies, series and episodes live in a single JSON document
//! stored under one key. Every operation is a read-modify-write of that whole
//! document. There is no locking: two overlapping mutations can race and the
//! slower writer wins (see `tests/watchlist_test.rs`).
//!
//! Storage faults never escape this module. Reads degrade to an empty
//! document and mutations report failure with `false`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::models::{Movie, TvEpisode, TvSeries};
use crate::storage::{Storage, StorageError};

/// Key the watchlist document is stored under
pub const STORAGE_KEY: &str = "user_watchlist";

// =============================================================================
// Persisted Shapes
// =============================================================================

/// Saved movie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieEntry {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    pub added_at: DateTime<Utc>,
}

/// Saved TV series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesEntry {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    pub added_at: DateTime<Utc>,
}

/// Saved episode, with the parent series and season names denormalized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeEntry {
    pub id: u64,
    pub tv_id: u64,
    pub series_name: String,
    pub season_name: String,
    pub season_number: u32,
    pub episode_number: u32,
    pub name: String,
    #[serde(default)]
    pub still_path: Option<String>,
    #[serde(default)]
    pub air_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    pub added_at: DateTime<Utc>,
}

impl EpisodeEntry {
    fn matches(&self, tv_id: u64, season_number: u32, episode_number: u32) -> bool {
        self.tv_id == tv_id
            && self.season_number == season_number
            && self.episode_number == episode_number
    }
}

/// The whole persisted watchlist, each list in insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistDocument {
    #[serde(default)]
    pub movies: Vec<MovieEntry>,
    #[serde(default)]
    pub tv_series: Vec<SeriesEntry>,
    /// Absent in documents written before episodes could be saved
    #[serde(default)]
    pub episodes: Vec<EpisodeEntry>,
}

impl WatchlistDocument {
    pub fn is_empty(&self) -> bool {
        self.movies.is_empty() && self.tv_series.is_empty() && self.episodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.movies.len() + self.tv_series.len() + self.episodes.len()
    }
}

// =============================================================================
// Store
// =============================================================================

/// Watchlist operations over an injected [`Storage`]
#[derive(Debug)]
pub struct WatchlistStore<S> {
    storage: S,
}

impl<S: Storage> WatchlistStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Current document; empty if nothing is stored or the stored value is unreadable
    pub async fn get_all(&self) -> WatchlistDocument {
        match self.load().await {
            Ok(doc) => doc,
            Err(e) => {
                warn!(error = %e, "Error reading watchlist from storage, using empty watchlist");
                WatchlistDocument::default()
            }
        }
    }

    async fn load(&self) -> Result<WatchlistDocument, StorageError> {
        match self.storage.get(STORAGE_KEY).await? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(WatchlistDocument::default()),
        }
    }

    async fn save(&self, doc: &WatchlistDocument) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec(doc)?;
        self.storage.set(STORAGE_KEY, bytes).await
    }

    /// Read, apply `change`, and write back if `change` reports a modification
    async fn update<F>(&self, op: &str, change: F) -> bool
    where
        F: FnOnce(&mut WatchlistDocument) -> bool,
    {
        let mut doc = self.get_all().await;
        if !change(&mut doc) {
            debug!(op, "watchlist unchanged");
            return true;
        }
        match self.save(&doc).await {
            Ok(()) => true,
            Err(e) => {
                error!(op, error = %e, "Error saving watchlist to storage");
                false
            }
        }
    }

    // =========================================================================
    // Movies
    // =========================================================================

    /// Save a movie; already-saved ids are left as they are
    pub async fn add_movie(&self, movie: &Movie) -> bool {
        let added_at = Utc::now();
        self.update("add_movie", |doc| {
            if doc.movies.iter().any(|m| m.id == movie.id) {
                return false;
            }
            doc.movies.push(MovieEntry {
                id: movie.id,
                title: movie.title.clone(),
                poster_path: movie.poster_path.clone(),
                release_date: movie.release_date.clone(),
                vote_average: movie.vote_average,
                added_at,
            });
            true
        })
        .await
    }

    pub async fn remove_movie(&self, id: u64) -> bool {
        self.update("remove_movie", |doc| {
            let before = doc.movies.len();
            doc.movies.retain(|m| m.id != id);
            doc.movies.len() != before
        })
        .await
    }

    pub async fn is_movie_in_watchlist(&self, id: u64) -> bool {
        self.get_all().await.movies.iter().any(|m| m.id == id)
    }

    // =========================================================================
    // TV Series
    // =========================================================================

    /// Save a series; already-saved ids are left as they are
    pub async fn add_tv_series(&self, series: &TvSeries) -> bool {
        let added_at = Utc::now();
        self.update("add_tv_series", |doc| {
            if doc.tv_series.iter().any(|s| s.id == series.id) {
                return false;
            }
            doc.tv_series.push(SeriesEntry {
                id: series.id,
                name: series.name.clone(),
                poster_path: series.poster_path.clone(),
                first_air_date: series.first_air_date.clone(),
                vote_average: series.vote_average,
                added_at,
            });
            true
        })
        .await
    }

    pub async fn remove_tv_series(&self, id: u64) -> bool {
        self.update("remove_tv_series", |doc| {
            let before = doc.tv_series.len();
            doc.tv_series.retain(|s| s.id != id);
            doc.tv_series.len() != before
        })
        .await
    }

    pub async fn is_tv_series_in_watchlist(&self, id: u64) -> bool {
        self.get_all().await.tv_series.iter().any(|s| s.id == id)
    }

    // =========================================================================
    // Episodes
    // =========================================================================

    /// Save an episode, keyed by `(tv_id, season_number, episode_number)`.
    ///
    /// The display names are stored exactly as passed in.
    pub async fn add_episode(
        &self,
        episode: &TvEpisode,
        tv_id: u64,
        series_name: &str,
        season_name: &str,
    ) -> bool {
        let added_at = Utc::now();
        self.update("add_episode", |doc| {
            if doc
                .episodes
                .iter()
                .any(|e| e.matches(tv_id, episode.season_number, episode.episode_number))
            {
                return false;
            }
            doc.episodes.push(EpisodeEntry {
                id: episode.id,
                tv_id,
                series_name: series_name.to_string(),
                season_name: season_name.to_string(),
                season_number: episode.season_number,
                episode_number: episode.episode_number,
                name: episode.name.clone(),
                still_path: episode.still_path.clone(),
                air_date: episode.air_date.clone(),
                vote_average: episode.vote_average,
                added_at,
            });
            true
        })
        .await
    }

    pub async fn remove_episode(&self, tv_id: u64, season_number: u32, episode_number: u32) -> bool {
        self.update("remove_episode", |doc| {
            let before = doc.episodes.len();
            doc.episodes
                .retain(|e| !e.matches(tv_id, season_number, episode_number));
            doc.episodes.len() != before
        })
        .await
    }

    pub async fn is_episode_in_watchlist(
        &self,
        tv_id: u64,
        season_number: u32,
        episode_number: u32,
    ) -> bool {
        self.get_all()
            .await
            .episodes
            .iter()
            .any(|e| e.matches(tv_id, season_number, episode_number))
    }
}
