//! TMDB (The Movie Database) API client
//!
//! Listings, search, details, images and videos for movies, TV series and
//! episodes. Authenticated with a v4 bearer access token.
//! API docs: https://developer.themoviedb.org/docs

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{
    trailers, EpisodeBundle, ImageSet, Listing, MediaKind, MediaRecord, Movie, MovieBundle, Page,
    SeasonDetail, SeriesBundle, TimeWindow, TvEpisode, TvSeries, Video,
};

/// Production API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Applied when the caller does not configure a timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// TMDB API error types
#[derive(Error, Debug)]
pub enum TmdbError {
    #[error("Resource not found (404)")]
    NotFound,

    #[error("Rate limited (429)")]
    RateLimited,

    #[error("Request rejected ({status}): {message}")]
    Status { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Shape of TMDB's error bodies
#[derive(Debug, Deserialize)]
struct ErrorBody {
    status_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoList {
    #[serde(default)]
    results: Vec<Video>,
}

/// TMDB API client
#[derive(Debug, Clone)]
pub struct TmdbClient {
    access_token: String,
    base_url: String,
    language: String,
    client: reqwest::Client,
}

impl TmdbClient {
    /// Create a new TMDB client with the given access token
    pub fn new(access_token: impl Into<String>) -> Self {
        Self::with_base_url(access_token, DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (for testing)
    pub fn with_base_url(access_token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            base_url: base_url.into(),
            language: "en-US".to_string(),
            client: build_http_client(DEFAULT_TIMEOUT),
        }
    }

    /// Override the `language` sent with every request
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Override the per-request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.client = build_http_client(timeout);
        self
    }

    /// Make an authenticated GET request and decode the JSON body
    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, TmdbError> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(%endpoint, ?params, "tmdb request");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .header("Accept", "application/json")
            .query(&[("language", self.language.as_str())])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return serde_json::from_str(&body)
                .map_err(|e| TmdbError::InvalidResponse(format!("JSON parse error: {}", e)));
        }

        warn!(%endpoint, status = status.as_u16(), "tmdb request failed");
        match status {
            StatusCode::NOT_FOUND => Err(TmdbError::NotFound),
            StatusCode::TOO_MANY_REQUESTS => Err(TmdbError::RateLimited),
            status => {
                let message = serde_json::from_str::<ErrorBody>(&body)
                    .ok()
                    .and_then(|b| b.status_message)
                    .unwrap_or_else(|| {
                        status
                            .canonical_reason()
                            .unwrap_or("Unexpected status")
                            .to_string()
                    });
                Err(TmdbError::Status {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }

    // =========================================================================
    // Listings
    // =========================================================================

    /// Fetch one page of a listing, normalized by the listing's media kind
    pub async fn listing(&self, listing: &Listing, page: u32) -> Result<Page<MediaRecord>, TmdbError> {
        let mut params = vec![("page", page.to_string())];
        if listing == &Listing::top_rated(MediaKind::Movie) {
            params.extend([
                ("include_adult", "false".to_string()),
                ("include_video", "false".to_string()),
                ("sort_by", "vote_average.desc".to_string()),
                ("without_genres", "99,10755".to_string()),
                ("vote_count.gte", "200".to_string()),
            ]);
        }

        let raw: Page<serde_json::Value> = self.get(&listing.path(), &params).await?;
        let kind = listing.kind;
        let results = raw
            .results
            .into_iter()
            .map(|v| MediaRecord::from_listing(kind, v))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| TmdbError::InvalidResponse(format!("Listing item: {}", e)))?;

        Ok(Page {
            page: raw.page,
            total_pages: raw.total_pages,
            total_results: raw.total_results,
            results,
        })
    }

    pub async fn top_rated_movies(&self, page: u32) -> Result<Page<MediaRecord>, TmdbError> {
        self.listing(&Listing::top_rated(MediaKind::Movie), page).await
    }

    pub async fn top_rated_tv(&self, page: u32) -> Result<Page<MediaRecord>, TmdbError> {
        self.listing(&Listing::top_rated(MediaKind::Tv), page).await
    }

    pub async fn trending_movies(
        &self,
        window: TimeWindow,
        page: u32,
    ) -> Result<Page<MediaRecord>, TmdbError> {
        self.listing(&Listing::trending(MediaKind::Movie, window), page)
            .await
    }

    pub async fn trending_tv(&self, window: TimeWindow, page: u32) -> Result<Page<MediaRecord>, TmdbError> {
        self.listing(&Listing::trending(MediaKind::Tv, window), page)
            .await
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Multi-search, keeping only movies and TV series
    pub async fn search_multi(&self, query: &str, page: u32) -> Result<Page<MediaRecord>, TmdbError> {
        let params = [
            ("query", query.to_string()),
            ("include_adult", "false".to_string()),
            ("page", page.to_string()),
        ];
        let raw: Page<serde_json::Value> = self.get("/search/multi", &params).await?;

        let mut results = Vec::with_capacity(raw.results.len());
        for value in raw.results {
            match MediaRecord::from_search(value) {
                Ok(Some(record)) => results.push(record),
                Ok(None) => {}
                Err(e) => return Err(TmdbError::InvalidResponse(format!("Search item: {}", e))),
            }
        }

        Ok(Page {
            page: raw.page,
            total_pages: raw.total_pages,
            total_results: raw.total_results,
            results,
        })
    }

    // =========================================================================
    // Movies
    // =========================================================================

    pub async fn movie_details(&self, id: u64) -> Result<Movie, TmdbError> {
        self.get(&format!("/movie/{}", id), &[]).await
    }

    pub async fn movie_images(&self, id: u64) -> Result<ImageSet, TmdbError> {
        self.get(&format!("/movie/{}/images", id), &[]).await
    }

    pub async fn movie_videos(&self, id: u64) -> Result<Vec<Video>, TmdbError> {
        let list: VideoList = self.get(&format!("/movie/{}/videos", id), &[]).await?;
        Ok(list.results)
    }

    /// Details, images and trailers fetched concurrently
    pub async fn movie_bundle(&self, id: u64) -> Result<MovieBundle, TmdbError> {
        let (movie, images, videos) = tokio::try_join!(
            self.movie_details(id),
            self.movie_images(id),
            self.movie_videos(id),
        )?;
        Ok(MovieBundle {
            movie,
            images,
            trailers: trailers(videos),
        })
    }

    // =========================================================================
    // TV Series
    // =========================================================================

    pub async fn tv_details(&self, id: u64) -> Result<TvSeries, TmdbError> {
        self.get(&format!("/tv/{}", id), &[]).await
    }

    pub async fn tv_images(&self, id: u64) -> Result<ImageSet, TmdbError> {
        self.get(&format!("/tv/{}/images", id), &[]).await
    }

    pub async fn tv_videos(&self, id: u64) -> Result<Vec<Video>, TmdbError> {
        let list: VideoList = self.get(&format!("/tv/{}/videos", id), &[]).await?;
        Ok(list.results)
    }

    /// Details, images and trailers fetched concurrently; specials dropped
    pub async fn tv_bundle(&self, id: u64) -> Result<SeriesBundle, TmdbError> {
        let (series, images, videos) =
            tokio::try_join!(self.tv_details(id), self.tv_images(id), self.tv_videos(id))?;
        let seasons = series.regular_seasons();
        Ok(SeriesBundle {
            series,
            images,
            trailers: trailers(videos),
            seasons,
        })
    }

    pub async fn tv_season(&self, tv_id: u64, season: u32) -> Result<SeasonDetail, TmdbError> {
        self.get(&format!("/tv/{}/season/{}", tv_id, season), &[])
            .await
    }

    // =========================================================================
    // TV Episodes
    // =========================================================================

    pub async fn tv_episode(
        &self,
        tv_id: u64,
        season: u32,
        episode: u32,
    ) -> Result<TvEpisode, TmdbError> {
        self.get(&episode_path(tv_id, season, episode, ""), &[])
            .await
    }

    pub async fn tv_episode_images(
        &self,
        tv_id: u64,
        season: u32,
        episode: u32,
    ) -> Result<ImageSet, TmdbError> {
        self.get(&episode_path(tv_id, season, episode, "/images"), &[])
            .await
    }

    pub async fn tv_episode_videos(
        &self,
        tv_id: u64,
        season: u32,
        episode: u32,
    ) -> Result<Vec<Video>, TmdbError> {
        let list: VideoList = self
            .get(&episode_path(tv_id, season, episode, "/videos"), &[])
            .await?;
        Ok(list.results)
    }

    /// Episode, stills and trailers fetched concurrently
    pub async fn episode_bundle(
        &self,
        tv_id: u64,
        season: u32,
        episode: u32,
    ) -> Result<EpisodeBundle, TmdbError> {
        let (episode, images, videos) = tokio::try_join!(
            self.tv_episode(tv_id, season, episode),
            self.tv_episode_images(tv_id, season, episode),
            self.tv_episode_videos(tv_id, season, episode),
        )?;
        Ok(EpisodeBundle {
            episode,
            images,
            trailers: trailers(videos),
        })
    }
}

fn build_http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_default()
}

fn episode_path(tv_id: u64, season: u32, episode: u32, suffix: &str) -> String {
    format!("/tv/{}/season/{}/episode/{}{}", tv_id, season, episode, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_episode_path() {
        assert_eq!(episode_path(1396, 1, 2, ""), "/tv/1396/season/1/episode/2");
        assert_eq!(
            episode_path(1396, 3, 4, "/images"),
            "/tv/1396/season/3/episode/4/images"
        );
    }

    #[test]
    fn test_error_messages() {
        let err = TmdbError::Status {
            status: 401,
            message: "Invalid API key: You must be granted a valid key.".into(),
        };
        assert_eq!(
            err.to_string(),
            "Request rejected (401): Invalid API key: You must be granted a valid key."
        );
        assert_eq!(TmdbError::NotFound.to_string(), "Resource not found (404)");
    }
}
