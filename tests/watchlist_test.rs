//! Watchlist store tests
//!
//! Covers add/remove/check for every entry kind, persistence through the file
//! backend, storage failures and the unguarded read-modify-write race.

use async_trait::async_trait;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Barrier;

use cinedeck::models::{Movie, TvEpisode, TvSeries};
use cinedeck::storage::{FileStorage, MemoryStorage, Storage, StorageError};
use cinedeck::watchlist::{WatchlistStore, STORAGE_KEY};

fn movie(id: u64, title: &str) -> Movie {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "title": title,
        "poster_path": "/poster.jpg",
        "release_date": "2021-10-22",
        "vote_average": 7.8
    }))
    .unwrap()
}

fn series(id: u64, name: &str) -> TvSeries {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "name": name,
        "first_air_date": "2008-01-20",
        "vote_average": 8.9
    }))
    .unwrap()
}

fn episode(id: u64, season: u32, number: u32) -> TvEpisode {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "name": format!("Episode {}", number),
        "season_number": season,
        "episode_number": number,
        "air_date": "2008-01-20"
    }))
    .unwrap()
}

// =============================================================================
// Movies and Series
// =============================================================================

#[tokio::test]
async fn test_add_movie_twice_keeps_one_entry() {
    let store = WatchlistStore::new(MemoryStorage::new());
    let dune = movie(438631, "Dune");

    assert!(store.add_movie(&dune).await);
    assert!(store.add_movie(&dune).await);

    let doc = store.get_all().await;
    assert_eq!(doc.movies.len(), 1);
    assert_eq!(doc.movies[0].title, "Dune");
    assert_eq!(doc.movies[0].poster_path.as_deref(), Some("/poster.jpg"));
    assert!(store.is_movie_in_watchlist(438631).await);
}

#[tokio::test]
async fn test_movies_keep_insertion_order() {
    let store = WatchlistStore::new(MemoryStorage::new());
    for (id, title) in [(3, "C"), (1, "A"), (2, "B")] {
        store.add_movie(&movie(id, title)).await;
    }
    let ids: Vec<_> = store.get_all().await.movies.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![3, 1, 2]);
}

#[tokio::test]
async fn test_remove_movie() {
    let store = WatchlistStore::new(MemoryStorage::new());
    store.add_movie(&movie(1, "A")).await;
    store.add_movie(&movie(2, "B")).await;

    assert!(store.remove_movie(1).await);
    assert!(!store.is_movie_in_watchlist(1).await);
    assert!(store.is_movie_in_watchlist(2).await);

    // Absent id is a no-op success
    assert!(store.remove_movie(42).await);
    assert_eq!(store.get_all().await.movies.len(), 1);
}

#[tokio::test]
async fn test_add_then_remove_leaves_empty_lists() {
    let store = WatchlistStore::new(MemoryStorage::new());

    assert!(store.add_movie(&movie(78, "Blade Runner")).await);
    assert_eq!(store.get_all().await.movies.len(), 1);
    assert!(store.remove_movie(78).await);
    assert!(store.get_all().await.movies.is_empty());

    assert!(store.add_tv_series(&series(1396, "Breaking Bad")).await);
    assert_eq!(store.get_all().await.tv_series.len(), 1);
    assert!(store.remove_tv_series(1396).await);
    assert!(store.get_all().await.tv_series.is_empty());

    assert!(store.get_all().await.is_empty());
}

#[tokio::test]
async fn test_same_id_movie_and_series_are_independent() {
    let store = WatchlistStore::new(MemoryStorage::new());
    store.add_movie(&movie(100, "Movie 100")).await;
    store.add_tv_series(&series(100, "Series 100")).await;

    assert!(store.remove_tv_series(100).await);
    assert!(store.is_movie_in_watchlist(100).await);
    assert!(!store.is_tv_series_in_watchlist(100).await);
}

// =============================================================================
// Episodes
// =============================================================================

#[tokio::test]
async fn test_episode_is_keyed_by_series_season_and_number() {
    let store = WatchlistStore::new(MemoryStorage::new());
    let pilot = episode(62085, 1, 1);

    assert!(store.add_episode(&pilot, 1396, "Breaking Bad", "Season 1").await);
    assert!(store.add_episode(&pilot, 1396, "Breaking Bad", "Season 1").await);
    // Same numbers under another series is a different entry
    assert!(store.add_episode(&pilot, 60059, "Better Call Saul", "Season 1").await);

    let doc = store.get_all().await;
    assert_eq!(doc.episodes.len(), 2);
    assert_eq!(doc.episodes[0].series_name, "Breaking Bad");
    assert_eq!(doc.episodes[0].season_name, "Season 1");

    assert!(store.is_episode_in_watchlist(1396, 1, 1).await);
    assert!(!store.is_episode_in_watchlist(1396, 1, 2).await);

    assert!(store.remove_episode(1396, 1, 1).await);
    assert!(!store.is_episode_in_watchlist(1396, 1, 1).await);
    assert!(store.is_episode_in_watchlist(60059, 1, 1).await);
}

#[tokio::test]
async fn test_episode_with_new_remote_id_is_not_added_again() {
    let store = WatchlistStore::new(MemoryStorage::new());

    assert!(store.add_episode(&episode(62085, 1, 1), 1396, "Breaking Bad", "Season 1").await);
    assert!(store.add_episode(&episode(99999, 1, 1), 1396, "Breaking Bad", "Season 1").await);

    let doc = store.get_all().await;
    assert_eq!(doc.episodes.len(), 1);
    assert_eq!(doc.episodes[0].id, 62085);
}

// =============================================================================
// Persistence
// =============================================================================

#[tokio::test]
async fn test_file_storage_round_trip_across_stores() {
    let dir = tempfile::tempdir().unwrap();

    let store = WatchlistStore::new(FileStorage::new(dir.path()));
    store.add_movie(&movie(78, "Blade Runner")).await;
    store.add_tv_series(&series(1396, "Breaking Bad")).await;

    let reopened = WatchlistStore::new(FileStorage::new(dir.path()));
    let doc = reopened.get_all().await;
    assert_eq!(doc.movies[0].id, 78);
    assert_eq!(doc.tv_series[0].name, "Breaking Bad");

    let raw = std::fs::read_to_string(dir.path().join(format!("{}.json", STORAGE_KEY))).unwrap();
    assert!(raw.contains("\"tvSeries\""));
    assert!(raw.contains("\"addedAt\""));
}

#[tokio::test]
async fn test_corrupt_document_is_replaced_on_next_add() {
    let storage = Arc::new(MemoryStorage::new());
    storage.insert_raw(STORAGE_KEY, "[1, 2").await;

    let store = WatchlistStore::new(Arc::clone(&storage));
    assert!(store.get_all().await.is_empty());
    assert!(store.add_movie(&movie(1, "A")).await);
    assert_eq!(store.get_all().await.movies.len(), 1);
}

/// Storage whose writes always fail
struct ReadOnlyStorage(MemoryStorage);

#[async_trait]
impl Storage for ReadOnlyStorage {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        self.0.get(key).await
    }

    async fn set(&self, _key: &str, _value: Vec<u8>) -> Result<(), StorageError> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only").into())
    }
}

#[tokio::test]
async fn test_write_failure_reports_false() {
    let store = WatchlistStore::new(ReadOnlyStorage(MemoryStorage::new()));

    assert!(!store.add_movie(&movie(1, "A")).await);
    assert!(!store.add_tv_series(&series(2, "B")).await);
    assert!(!store.is_movie_in_watchlist(1).await);
    // Nothing to remove means nothing to write
    assert!(store.remove_movie(1).await);
}

// =============================================================================
// Concurrency
// =============================================================================

/// Holds the first two readers until both have read, so their writes overlap
struct InterleavingStorage {
    inner: MemoryStorage,
    reads: AtomicUsize,
    barrier: Barrier,
}

#[async_trait]
impl Storage for InterleavingStorage {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let value = self.inner.get(key).await;
        if self.reads.fetch_add(1, Ordering::SeqCst) < 2 {
            self.barrier.wait().await;
        }
        value
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        self.inner.set(key, value).await
    }
}

#[tokio::test]
async fn test_overlapping_adds_lose_one_update() {
    let storage = InterleavingStorage {
        inner: MemoryStorage::new(),
        reads: AtomicUsize::new(0),
        barrier: Barrier::new(2),
    };
    let store = WatchlistStore::new(storage);

    let a = movie(1, "A");
    let b = movie(2, "B");
    let (added_a, added_b) = tokio::join!(store.add_movie(&a), store.add_movie(&b));
    assert!(added_a && added_b);

    // Both read the empty document; the later write wins
    let doc = store.get_all().await;
    assert_eq!(doc.movies.len(), 1);
    assert!(matches!(doc.movies[0].id, 1 | 2));
}
