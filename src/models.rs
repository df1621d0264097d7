//! Data structures and types for cinedeck
//!
//! Normalized records for everything the TMDB API hands back, organized by domain:
//! - **Records**: movies, TV series and episodes with their computed accessors
//! - **Assets**: images and videos attached to a record
//! - **Listings**: paginated result envelopes and listing selectors
//! - **Bundles**: the combined payloads a detail view needs
//!
//! Raw payloads are decoded through private `*Raw` structs and converted with
//! `#[serde(from = ...)]`, so callers only ever see the normalized shape.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Base URL every image path fragment is templated into
pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";

/// Default size token for posters
pub const POSTER_SIZE: &str = "w500";
/// Default size token for backdrops
pub const BACKDROP_SIZE: &str = "w1280";
/// Default size token for episode stills
pub const STILL_SIZE: &str = "original";

/// Sentinel for a missing or unparseable date
pub const UNKNOWN: &str = "Unknown";
/// Sentinel for a missing episode rating
pub const NOT_AVAILABLE: &str = "N/A";

// =============================================================================
// Shared Helpers
// =============================================================================

/// Locale used when rendering dates as `<day> <month name> <year>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateLocale {
    /// Indonesian (`id-ID`), e.g. "4 Maret 2022"
    #[default]
    Id,
    /// English, e.g. "4 March 2022"
    En,
}

impl DateLocale {
    fn month_name(&self, month: u32) -> &'static str {
        const ID: [&str; 12] = [
            "Januari", "Februari", "Maret", "April", "Mei", "Juni", "Juli", "Agustus",
            "September", "Oktober", "November", "Desember",
        ];
        const EN: [&str; 12] = [
            "January", "February", "March", "April", "May", "June", "July", "August",
            "September", "October", "November", "December",
        ];
        let idx = (month.clamp(1, 12) - 1) as usize;
        match self {
            DateLocale::Id => ID[idx],
            DateLocale::En => EN[idx],
        }
    }
}

/// Build a full image URL from a path fragment, or `None` when there is no path
pub fn image_url(path: Option<&str>, size: &str) -> Option<String> {
    let path = path.filter(|p| !p.is_empty())?;
    if path.starts_with('/') {
        Some(format!("{}/{}{}", IMAGE_BASE_URL, size, path))
    } else {
        Some(format!("{}/{}/{}", IMAGE_BASE_URL, size, path))
    }
}

/// Render an ISO date (`2022-03-04`) as `4 Maret 2022`, or `fallback` if absent
pub fn format_date(date: Option<&str>, locale: DateLocale, fallback: &str) -> String {
    date.and_then(parse_date)
        .map(|d| format!("{} {} {}", d.day(), locale.month_name(d.month()), d.year()))
        .unwrap_or_else(|| fallback.to_string())
}

fn parse_date(date: &str) -> Option<NaiveDate> {
    let date = date.get(..10).unwrap_or(date);
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Round a 0-10 vote average to one decimal place
pub fn round_rating(vote_average: f64) -> f64 {
    (vote_average * 10.0).round() / 10.0
}

/// Format minutes as `1h 5m` / `45m`
pub fn format_runtime(minutes: Option<u32>) -> String {
    match minutes {
        None | Some(0) => UNKNOWN.to_string(),
        Some(m) if m >= 60 => format!("{}h {}m", m / 60, m % 60),
        Some(m) => format!("{}m", m),
    }
}

// =============================================================================
// Kinds and Listings
// =============================================================================

/// Media kind as addressed by listing endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
}

impl MediaKind {
    /// Path segment used by the remote API
    pub fn path_segment(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Tv => "tv",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Movie => write!(f, "Movie"),
            MediaKind::Tv => write!(f, "TV Show"),
        }
    }
}

/// Time window qualifier for trending listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    #[default]
    Day,
    Week,
}

impl TimeWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::Day => "day",
            TimeWindow::Week => "week",
        }
    }
}

/// Which remote listing a paginated view walks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingEndpoint {
    TopRated,
    Trending(TimeWindow),
}

/// A single listing: media kind plus endpoint variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Listing {
    pub kind: MediaKind,
    pub endpoint: ListingEndpoint,
}

impl Listing {
    pub fn top_rated(kind: MediaKind) -> Self {
        Self {
            kind,
            endpoint: ListingEndpoint::TopRated,
        }
    }

    pub fn trending(kind: MediaKind, window: TimeWindow) -> Self {
        Self {
            kind,
            endpoint: ListingEndpoint::Trending(window),
        }
    }

    /// Request path relative to the API base URL
    pub fn path(&self) -> String {
        match self.endpoint {
            ListingEndpoint::TopRated => format!("/{}/top_rated", self.kind.path_segment()),
            ListingEndpoint::Trending(window) => {
                format!("/trending/{}/{}", self.kind.path_segment(), window.as_str())
            }
        }
    }
}

/// Paginated envelope returned by listing and search endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub page: u32,
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u64,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            page: self.page,
            total_pages: self.total_pages,
            total_results: self.total_results,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

// =============================================================================
// Nested Payload Types
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub logo_path: Option<String>,
    #[serde(default)]
    pub origin_country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub logo_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creator {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub profile_path: Option<String>,
}

/// Crew credit on an episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewMember {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub job: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
}

/// Guest star credit on an episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastMember {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
}

/// Season entry listed on a series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonSummary {
    #[serde(default)]
    pub id: u64,
    pub season_number: u32,
    #[serde(default)]
    pub episode_count: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub air_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
}

impl SeasonSummary {
    /// Display name, falling back to "Season N"
    pub fn display_name(&self) -> String {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("Season {}", self.season_number),
        }
    }

    pub fn poster_url(&self, size: &str) -> Option<String> {
        image_url(self.poster_path.as_deref(), size)
    }
}

impl fmt::Display for SeasonSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} episodes)", self.display_name(), self.episode_count)
    }
}

/// Full season with its episodes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonDetail {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    pub season_number: u32,
    #[serde(default)]
    pub air_date: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub episodes: Vec<TvEpisode>,
}

// =============================================================================
// Assets
// =============================================================================

/// One image (backdrop, poster or still)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAsset {
    pub file_path: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

impl ImageAsset {
    pub fn url(&self, size: &str) -> Option<String> {
        image_url(Some(&self.file_path), size)
    }
}

/// Images endpoint payload; episodes only populate `stills`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageSet {
    #[serde(default)]
    pub backdrops: Vec<ImageAsset>,
    #[serde(default)]
    pub posters: Vec<ImageAsset>,
    #[serde(default)]
    pub stills: Vec<ImageAsset>,
}

/// Video attached to a record (trailers, teasers, featurettes, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub key: String,
    pub name: String,
    #[serde(rename = "type")]
    pub video_type: String,
    pub site: String,
}

impl Video {
    /// YouTube-hosted trailer or teaser
    pub fn is_trailer(&self) -> bool {
        self.site == "YouTube" && matches!(self.video_type.as_str(), "Trailer" | "Teaser")
    }

    pub fn youtube_url(&self) -> Option<String> {
        (self.site == "YouTube").then(|| format!("https://www.youtube.com/watch?v={}", self.key))
    }
}

/// Keep only YouTube trailers and teasers, in payload order
pub fn trailers(videos: Vec<Video>) -> Vec<Video> {
    videos.into_iter().filter(Video::is_trailer).collect()
}

// =============================================================================
// Movie
// =============================================================================

/// Normalized movie record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "MovieRaw")]
pub struct Movie {
    pub id: u64,
    pub title: String,
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: f64,
    pub vote_count: u64,
    pub popularity: f64,
    pub original_language: Option<String>,
    pub genre_ids: Vec<u64>,
    pub genres: Vec<Genre>,
    pub runtime: Option<u32>,
    pub production_companies: Vec<Company>,
    pub media_type: String,
}

#[derive(Deserialize)]
struct MovieRaw {
    id: u64,
    // Movies use "title", TV-shaped payloads use "name"
    title: Option<String>,
    name: Option<String>,
    overview: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    // Movies use "release_date", TV uses "first_air_date"
    release_date: Option<String>,
    first_air_date: Option<String>,
    vote_average: Option<f64>,
    vote_count: Option<u64>,
    popularity: Option<f64>,
    original_language: Option<String>,
    genre_ids: Option<Vec<u64>>,
    genres: Option<Vec<Genre>>,
    runtime: Option<u32>,
    production_companies: Option<Vec<Company>>,
    media_type: Option<String>,
}

impl From<MovieRaw> for Movie {
    fn from(raw: MovieRaw) -> Self {
        Self {
            id: raw.id,
            title: raw.title.or(raw.name).unwrap_or_default(),
            overview: raw.overview.unwrap_or_default(),
            poster_path: raw.poster_path,
            backdrop_path: raw.backdrop_path,
            release_date: raw.release_date.or(raw.first_air_date),
            vote_average: raw.vote_average.unwrap_or(0.0),
            vote_count: raw.vote_count.unwrap_or(0),
            popularity: raw.popularity.unwrap_or(0.0),
            original_language: raw.original_language,
            genre_ids: raw.genre_ids.unwrap_or_default(),
            genres: raw.genres.unwrap_or_default(),
            runtime: raw.runtime,
            production_companies: raw.production_companies.unwrap_or_default(),
            media_type: raw.media_type.unwrap_or_else(|| "movie".to_string()),
        }
    }
}

impl Movie {
    pub fn poster_url(&self, size: &str) -> Option<String> {
        image_url(self.poster_path.as_deref(), size)
    }

    pub fn backdrop_url(&self, size: &str) -> Option<String> {
        image_url(self.backdrop_path.as_deref(), size)
    }

    pub fn poster_url_default(&self) -> Option<String> {
        self.poster_url(POSTER_SIZE)
    }

    pub fn backdrop_url_default(&self) -> Option<String> {
        self.backdrop_url(BACKDROP_SIZE)
    }

    pub fn formatted_release_date(&self) -> String {
        self.formatted_release_date_in(DateLocale::default())
    }

    pub fn formatted_release_date_in(&self, locale: DateLocale) -> String {
        format_date(self.release_date.as_deref(), locale, UNKNOWN)
    }

    pub fn rating_percentage(&self) -> f64 {
        round_rating(self.vote_average)
    }

    pub fn formatted_runtime(&self) -> String {
        format_runtime(self.runtime)
    }
}

impl fmt::Display for Movie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) - ⭐ {:.1}",
            self.title,
            self.formatted_release_date(),
            self.rating_percentage()
        )
    }
}

// =============================================================================
// TV Series
// =============================================================================

/// Normalized TV series record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TvSeriesRaw")]
pub struct TvSeries {
    pub id: u64,
    pub name: String,
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub first_air_date: Option<String>,
    pub last_air_date: Option<String>,
    pub vote_average: f64,
    pub vote_count: u64,
    pub popularity: f64,
    pub original_language: Option<String>,
    pub genre_ids: Vec<u64>,
    pub genres: Vec<Genre>,
    pub number_of_seasons: Option<u32>,
    pub number_of_episodes: Option<u32>,
    pub status: Option<String>,
    pub series_type: Option<String>,
    pub networks: Vec<Network>,
    pub seasons: Vec<SeasonSummary>,
    pub created_by: Vec<Creator>,
    pub media_type: String,
}

#[derive(Deserialize)]
struct TvSeriesRaw {
    id: u64,
    name: Option<String>,
    title: Option<String>,
    overview: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    first_air_date: Option<String>,
    last_air_date: Option<String>,
    vote_average: Option<f64>,
    vote_count: Option<u64>,
    popularity: Option<f64>,
    original_language: Option<String>,
    genre_ids: Option<Vec<u64>>,
    genres: Option<Vec<Genre>>,
    number_of_seasons: Option<u32>,
    number_of_episodes: Option<u32>,
    status: Option<String>,
    #[serde(alias = "type")]
    series_type: Option<String>,
    networks: Option<Vec<Network>>,
    seasons: Option<Vec<SeasonSummary>>,
    created_by: Option<Vec<Creator>>,
    media_type: Option<String>,
}

impl From<TvSeriesRaw> for TvSeries {
    fn from(raw: TvSeriesRaw) -> Self {
        Self {
            id: raw.id,
            name: raw.name.or(raw.title).unwrap_or_default(),
            overview: raw.overview.unwrap_or_default(),
            poster_path: raw.poster_path,
            backdrop_path: raw.backdrop_path,
            first_air_date: raw.first_air_date,
            last_air_date: raw.last_air_date,
            vote_average: raw.vote_average.unwrap_or(0.0),
            vote_count: raw.vote_count.unwrap_or(0),
            popularity: raw.popularity.unwrap_or(0.0),
            original_language: raw.original_language,
            genre_ids: raw.genre_ids.unwrap_or_default(),
            genres: raw.genres.unwrap_or_default(),
            number_of_seasons: raw.number_of_seasons,
            number_of_episodes: raw.number_of_episodes,
            status: raw.status,
            series_type: raw.series_type,
            networks: raw.networks.unwrap_or_default(),
            seasons: raw.seasons.unwrap_or_default(),
            created_by: raw.created_by.unwrap_or_default(),
            media_type: raw.media_type.unwrap_or_else(|| "tv".to_string()),
        }
    }
}

impl TvSeries {
    pub fn poster_url(&self, size: &str) -> Option<String> {
        image_url(self.poster_path.as_deref(), size)
    }

    pub fn backdrop_url(&self, size: &str) -> Option<String> {
        image_url(self.backdrop_path.as_deref(), size)
    }

    pub fn poster_url_default(&self) -> Option<String> {
        self.poster_url(POSTER_SIZE)
    }

    pub fn backdrop_url_default(&self) -> Option<String> {
        self.backdrop_url(BACKDROP_SIZE)
    }

    pub fn formatted_first_air_date(&self) -> String {
        self.formatted_first_air_date_in(DateLocale::default())
    }

    pub fn formatted_first_air_date_in(&self, locale: DateLocale) -> String {
        format_date(self.first_air_date.as_deref(), locale, UNKNOWN)
    }

    pub fn formatted_last_air_date(&self) -> String {
        self.formatted_last_air_date_in(DateLocale::default())
    }

    /// Last air date, "Present" while the series is running
    pub fn formatted_last_air_date_in(&self, locale: DateLocale) -> String {
        format_date(self.last_air_date.as_deref(), locale, "Present")
    }

    /// Same as [`TvSeries::formatted_first_air_date`], mirrors [`Movie`]
    pub fn formatted_release_date(&self) -> String {
        self.formatted_first_air_date()
    }

    pub fn formatted_release_date_in(&self, locale: DateLocale) -> String {
        self.formatted_first_air_date_in(locale)
    }

    pub fn rating_percentage(&self) -> f64 {
        round_rating(self.vote_average)
    }

    /// Regular seasons only; season 0 holds specials
    pub fn regular_seasons(&self) -> Vec<SeasonSummary> {
        self.seasons
            .iter()
            .filter(|s| s.season_number != 0)
            .cloned()
            .collect()
    }

    /// Display name of a season, falling back to "Season N" if not listed
    pub fn season_name(&self, season_number: u32) -> String {
        self.seasons
            .iter()
            .find(|s| s.season_number == season_number)
            .map(SeasonSummary::display_name)
            .unwrap_or_else(|| format!("Season {}", season_number))
    }
}

impl fmt::Display for TvSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) - {} seasons - ⭐ {:.1}",
            self.name,
            self.formatted_first_air_date(),
            self.number_of_seasons.unwrap_or(self.regular_seasons().len() as u32),
            self.rating_percentage()
        )
    }
}

// =============================================================================
// TV Episode
// =============================================================================

/// Normalized TV episode record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TvEpisodeRaw")]
pub struct TvEpisode {
    pub id: u64,
    pub name: String,
    pub overview: String,
    pub episode_number: u32,
    pub season_number: u32,
    pub air_date: Option<String>,
    pub still_path: Option<String>,
    pub vote_average: Option<f64>,
    pub vote_count: u64,
    pub crew: Vec<CrewMember>,
    pub guest_stars: Vec<CastMember>,
    pub runtime: Option<u32>,
    pub production_code: Option<String>,
}

#[derive(Deserialize)]
struct TvEpisodeRaw {
    id: u64,
    name: Option<String>,
    overview: Option<String>,
    episode_number: u32,
    season_number: u32,
    air_date: Option<String>,
    still_path: Option<String>,
    vote_average: Option<f64>,
    vote_count: Option<u64>,
    crew: Option<Vec<CrewMember>>,
    guest_stars: Option<Vec<CastMember>>,
    runtime: Option<u32>,
    production_code: Option<String>,
}

impl From<TvEpisodeRaw> for TvEpisode {
    fn from(raw: TvEpisodeRaw) -> Self {
        Self {
            id: raw.id,
            name: raw.name.unwrap_or_default(),
            overview: raw.overview.unwrap_or_default(),
            episode_number: raw.episode_number,
            season_number: raw.season_number,
            air_date: raw.air_date,
            still_path: raw.still_path,
            vote_average: raw.vote_average,
            vote_count: raw.vote_count.unwrap_or(0),
            crew: raw.crew.unwrap_or_default(),
            guest_stars: raw.guest_stars.unwrap_or_default(),
            runtime: raw.runtime,
            production_code: raw.production_code,
        }
    }
}

impl TvEpisode {
    pub fn still_url(&self, size: &str) -> Option<String> {
        image_url(self.still_path.as_deref(), size)
    }

    /// Full-size still
    pub fn still_url_default(&self) -> Option<String> {
        self.still_url(STILL_SIZE)
    }

    pub fn formatted_air_date(&self) -> String {
        self.formatted_air_date_in(DateLocale::default())
    }

    pub fn formatted_air_date_in(&self, locale: DateLocale) -> String {
        format_date(self.air_date.as_deref(), locale, UNKNOWN)
    }

    /// Rounded rating, `None` when the episode has no (or a zero) rating
    pub fn rating_percentage(&self) -> Option<f64> {
        self.vote_average
            .filter(|v| *v != 0.0 && v.is_finite())
            .map(round_rating)
    }

    pub fn rating_label(&self) -> String {
        self.rating_percentage()
            .map(|r| format!("{:.1}", r))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    pub fn directors(&self) -> Vec<&CrewMember> {
        self.crew.iter().filter(|c| c.job == "Director").collect()
    }

    pub fn writers(&self) -> Vec<&CrewMember> {
        self.crew
            .iter()
            .filter(|c| matches!(c.job.as_str(), "Writer" | "Screenplay" | "Story"))
            .collect()
    }

    pub fn formatted_runtime(&self) -> String {
        format_runtime(self.runtime)
    }
}

impl fmt::Display for TvEpisode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "S{:02}E{:02} - {}",
            self.season_number, self.episode_number, self.name
        )
    }
}

// =============================================================================
// MediaRecord
// =============================================================================

/// Discriminator for [`MediaRecord`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Movie,
    Series,
    Episode,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Movie => write!(f, "Movie"),
            RecordKind::Series => write!(f, "TV Show"),
            RecordKind::Episode => write!(f, "Episode"),
        }
    }
}

/// Any normalized record the API can return
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MediaRecord {
    Movie(Movie),
    Series(TvSeries),
    Episode(TvEpisode),
}

impl MediaRecord {
    pub fn kind(&self) -> RecordKind {
        match self {
            MediaRecord::Movie(_) => RecordKind::Movie,
            MediaRecord::Series(_) => RecordKind::Series,
            MediaRecord::Episode(_) => RecordKind::Episode,
        }
    }

    /// Normalize a listing item whose kind is known from the endpoint
    pub fn from_listing(kind: MediaKind, value: serde_json::Value) -> serde_json::Result<Self> {
        match kind {
            MediaKind::Movie => serde_json::from_value(value).map(MediaRecord::Movie),
            MediaKind::Tv => serde_json::from_value(value).map(MediaRecord::Series),
        }
    }

    /// Normalize a multi-search item by its `media_type` tag.
    ///
    /// Returns `Ok(None)` for kinds other than movies and series (people,
    /// collections, ...).
    pub fn from_search(value: serde_json::Value) -> serde_json::Result<Option<Self>> {
        let kind = match value.get("media_type").and_then(|t| t.as_str()) {
            Some("movie") => MediaKind::Movie,
            Some("tv") => MediaKind::Tv,
            _ => return Ok(None),
        };
        Self::from_listing(kind, value).map(Some)
    }

    pub fn as_summary(&self) -> &dyn DisplaySummary {
        match self {
            MediaRecord::Movie(m) => m,
            MediaRecord::Series(s) => s,
            MediaRecord::Episode(e) => e,
        }
    }
}

impl fmt::Display for MediaRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaRecord::Movie(m) => m.fmt(f),
            MediaRecord::Series(s) => s.fmt(f),
            MediaRecord::Episode(e) => e.fmt(f),
        }
    }
}

/// Capability shared by every record: enough to render a card
pub trait DisplaySummary {
    fn media_id(&self) -> u64;
    fn record_kind(&self) -> RecordKind;
    fn display_title(&self) -> &str;
    /// Rounded rating, `None` when not available
    fn rating(&self) -> Option<f64>;
    fn formatted_date_in(&self, locale: DateLocale) -> String;
    fn card_image_url(&self, size: &str) -> Option<String>;

    fn formatted_date(&self) -> String {
        self.formatted_date_in(DateLocale::default())
    }

    fn summary(&self, locale: DateLocale) -> Summary {
        Summary {
            id: self.media_id(),
            kind: self.record_kind(),
            title: self.display_title().to_string(),
            rating: self.rating(),
            date: self.formatted_date_in(locale),
            poster_url: self.card_image_url(POSTER_SIZE),
        }
    }
}

impl DisplaySummary for Movie {
    fn media_id(&self) -> u64 {
        self.id
    }
    fn record_kind(&self) -> RecordKind {
        RecordKind::Movie
    }
    fn display_title(&self) -> &str {
        &self.title
    }
    fn rating(&self) -> Option<f64> {
        Some(self.rating_percentage())
    }
    fn formatted_date_in(&self, locale: DateLocale) -> String {
        self.formatted_release_date_in(locale)
    }
    fn card_image_url(&self, size: &str) -> Option<String> {
        self.poster_url(size)
    }
}

impl DisplaySummary for TvSeries {
    fn media_id(&self) -> u64 {
        self.id
    }
    fn record_kind(&self) -> RecordKind {
        RecordKind::Series
    }
    fn display_title(&self) -> &str {
        &self.name
    }
    fn rating(&self) -> Option<f64> {
        Some(self.rating_percentage())
    }
    fn formatted_date_in(&self, locale: DateLocale) -> String {
        self.formatted_release_date_in(locale)
    }
    fn card_image_url(&self, size: &str) -> Option<String> {
        self.poster_url(size)
    }
}

impl DisplaySummary for TvEpisode {
    fn media_id(&self) -> u64 {
        self.id
    }
    fn record_kind(&self) -> RecordKind {
        RecordKind::Episode
    }
    fn display_title(&self) -> &str {
        &self.name
    }
    fn rating(&self) -> Option<f64> {
        self.rating_percentage()
    }
    fn formatted_date_in(&self, locale: DateLocale) -> String {
        self.formatted_air_date_in(locale)
    }
    fn card_image_url(&self, size: &str) -> Option<String> {
        self.still_url(size)
    }
}

/// Serializable card view of any record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub id: u64,
    pub kind: RecordKind,
    pub title: String,
    pub rating: Option<f64>,
    pub date: String,
    pub poster_url: Option<String>,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rating = self
            .rating
            .map(|r| format!("{:.1}", r))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        write!(
            f,
            "[{}] {} - {} ({}) - ⭐ {}",
            self.id, self.title, self.kind, self.date, rating
        )
    }
}

// =============================================================================
// Detail Bundles
// =============================================================================

/// Everything the movie detail view shows
#[derive(Debug, Clone, Serialize)]
pub struct MovieBundle {
    pub movie: Movie,
    pub images: ImageSet,
    pub trailers: Vec<Video>,
}

/// Everything the series detail view shows
#[derive(Debug, Clone, Serialize)]
pub struct SeriesBundle {
    pub series: TvSeries,
    pub images: ImageSet,
    pub trailers: Vec<Video>,
    /// Regular seasons, specials excluded
    pub seasons: Vec<SeasonSummary>,
}

/// Everything the episode detail view shows
#[derive(Debug, Clone, Serialize)]
pub struct EpisodeBundle {
    pub episode: TvEpisode,
    pub images: ImageSet,
    pub trailers: Vec<Video>,
}

// =============================================================================
// Tests
// =============================================================================
