//! TMDB API client tests
//!
//! Tests listings, search, detail bundles and error handling against a mock
//! server.

use cinedeck::api::{TmdbClient, TmdbError};
use cinedeck::models::{Listing, MediaKind, MediaRecord, RecordKind, TimeWindow};
use mockito::{Matcher, Server};

const TOKEN: &str = "test-token";

fn client(server: &Server) -> TmdbClient {
    TmdbClient::with_base_url(TOKEN, server.url())
}

// =============================================================================
// Listing Tests
// =============================================================================

#[tokio::test]
async fn test_top_rated_movies_sends_filters() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/movie/top_rated")
        .match_header("authorization", "Bearer test-token")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("language".into(), "en-US".into()),
            Matcher::UrlEncoded("page".into(), "2".into()),
            Matcher::UrlEncoded("include_adult".into(), "false".into()),
            Matcher::UrlEncoded("include_video".into(), "false".into()),
            Matcher::UrlEncoded("sort_by".into(), "vote_average.desc".into()),
            Matcher::UrlEncoded("without_genres".into(), "99,10755".into()),
            Matcher::UrlEncoded("vote_count.gte".into(), "200".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "page": 2,
                "total_pages": 40,
                "total_results": 800,
                "results": [
                    {"id": 278, "title": "The Shawshank Redemption", "release_date": "1994-09-23", "vote_average": 8.708},
                    {"id": 238, "title": "The Godfather", "release_date": "1972-03-14", "vote_average": 8.69}
                ]
            }"#,
        )
        .create_async()
        .await;

    let page = client(&server).top_rated_movies(2).await.unwrap();

    mock.assert_async().await;
    assert_eq!(page.page, 2);
    assert_eq!(page.total_pages, 40);
    assert_eq!(page.results.len(), 2);
    match &page.results[0] {
        MediaRecord::Movie(m) => {
            assert_eq!(m.title, "The Shawshank Redemption");
            assert_eq!(m.rating_percentage(), 8.7);
        }
        other => panic!("Expected movie, got {:?}", other),
    }
}

#[tokio::test]
async fn test_top_rated_tv_has_no_movie_filters() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/tv/top_rated")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("page".into(), "1".into()),
            Matcher::UrlEncoded("language".into(), "id-ID".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"{
                "page": 1,
                "total_pages": 1,
                "total_results": 1,
                "results": [
                    {"id": 1396, "name": "Breaking Bad", "first_air_date": "2008-01-20", "vote_average": 8.9}
                ]
            }"#,
        )
        .create_async()
        .await;

    let page = client(&server)
        .language("id-ID")
        .top_rated_tv(1)
        .await
        .unwrap();

    mock.assert_async().await;
    let record = &page.results[0];
    assert_eq!(record.kind(), RecordKind::Series);
    let summary = record.as_summary().summary(Default::default());
    assert_eq!(summary.title, "Breaking Bad");
    assert_eq!(summary.date, "20 Januari 2008");
}

#[tokio::test]
async fn test_trending_week() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/trending/movie/week")
        .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
        .with_status(200)
        .with_body(
            r#"{"page": 1, "total_pages": 3, "total_results": 60,
                "results": [{"id": 1, "title": "Dune", "media_type": "movie"}]}"#,
        )
        .create_async()
        .await;

    let page = client(&server)
        .listing(&Listing::trending(MediaKind::Movie, TimeWindow::Week), 1)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.results[0].kind(), RecordKind::Movie);
}

// =============================================================================
// Search Tests
// =============================================================================

#[tokio::test]
async fn test_search_drops_people() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/search/multi")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("query".into(), "batman".into()),
            Matcher::UrlEncoded("page".into(), "1".into()),
            Matcher::UrlEncoded("include_adult".into(), "false".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"{
                "page": 1,
                "total_pages": 1,
                "total_results": 3,
                "results": [
                    {"id": 414906, "media_type": "movie", "title": "The Batman", "release_date": "2022-03-01"},
                    {"id": 3894, "media_type": "person", "name": "Christian Bale"},
                    {"id": 2098, "media_type": "tv", "name": "Batman: The Animated Series"}
                ]
            }"#,
        )
        .create_async()
        .await;

    let page = client(&server).search_multi("batman", 1).await.unwrap();

    mock.assert_async().await;
    let kinds: Vec<_> = page.results.iter().map(|r| r.kind()).collect();
    assert_eq!(kinds, vec![RecordKind::Movie, RecordKind::Series]);
}

// =============================================================================
// Detail Tests
// =============================================================================

#[tokio::test]
async fn test_movie_bundle_keeps_only_youtube_trailers() {
    let mut server = Server::new_async().await;

    let details = server
        .mock("GET", "/movie/78")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            r#"{"id": 78, "title": "Blade Runner", "release_date": "1982-06-25",
                "runtime": 117, "vote_average": 7.9,
                "genres": [{"id": 878, "name": "Science Fiction"}]}"#,
        )
        .create_async()
        .await;
    let images = server
        .mock("GET", "/movie/78/images")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            r#"{"backdrops": [{"file_path": "/b.jpg", "width": 1920, "height": 1080}],
                "posters": [{"file_path": "/p.jpg"}]}"#,
        )
        .create_async()
        .await;
    let videos = server
        .mock("GET", "/movie/78/videos")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            r#"{"results": [
                {"id": "a", "key": "eogpIG53Cis", "name": "Trailer", "type": "Trailer", "site": "YouTube"},
                {"id": "b", "key": "xyz", "name": "Featurette", "type": "Featurette", "site": "YouTube"},
                {"id": "c", "key": "123", "name": "Vimeo Teaser", "type": "Teaser", "site": "Vimeo"},
                {"id": "d", "key": "tsr", "name": "Teaser", "type": "Teaser", "site": "YouTube"}
            ]}"#,
        )
        .create_async()
        .await;

    let bundle = client(&server).movie_bundle(78).await.unwrap();

    details.assert_async().await;
    images.assert_async().await;
    videos.assert_async().await;
    assert_eq!(bundle.movie.formatted_runtime(), "1h 57m");
    assert_eq!(bundle.images.backdrops.len(), 1);
    let names: Vec<_> = bundle.trailers.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["Trailer", "Teaser"]);
    assert_eq!(
        bundle.trailers[0].youtube_url().as_deref(),
        Some("https://www.youtube.com/watch?v=eogpIG53Cis")
    );
}

#[tokio::test]
async fn test_tv_bundle_drops_specials() {
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/tv/1396")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            r#"{"id": 1396, "name": "Breaking Bad", "first_air_date": "2008-01-20",
                "last_air_date": null,
                "seasons": [
                    {"id": 3577, "season_number": 0, "name": "Specials", "episode_count": 9},
                    {"id": 3572, "season_number": 1, "name": "Season 1", "episode_count": 7},
                    {"id": 3573, "season_number": 2, "name": "Season 2", "episode_count": 13}
                ]}"#,
        )
        .create_async()
        .await;
    server
        .mock("GET", "/tv/1396/images")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"backdrops": [], "posters": []}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/tv/1396/videos")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"results": []}"#)
        .create_async()
        .await;

    let bundle = client(&server).tv_bundle(1396).await.unwrap();

    let numbers: Vec<_> = bundle.seasons.iter().map(|s| s.season_number).collect();
    assert_eq!(numbers, vec![1, 2]);
    assert_eq!(bundle.series.seasons.len(), 3);
    assert_eq!(bundle.series.formatted_last_air_date(), "Present");
    assert!(bundle.trailers.is_empty());
}

#[tokio::test]
async fn test_episode_details() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/tv/1396/season/1/episode/1")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            r#"{"id": 62085, "name": "Pilot", "season_number": 1, "episode_number": 1,
                "air_date": "2008-01-20", "runtime": 58, "vote_average": 0,
                "crew": [
                    {"id": 66633, "name": "Vince Gilligan", "job": "Director"},
                    {"id": 66634, "name": "Vince Gilligan", "job": "Writer"}
                ]}"#,
        )
        .create_async()
        .await;

    let episode = client(&server).tv_episode(1396, 1, 1).await.unwrap();

    mock.assert_async().await;
    assert_eq!(episode.to_string(), "S01E01 - Pilot");
    assert_eq!(episode.rating_label(), "N/A");
    assert_eq!(episode.formatted_runtime(), "58m");
    assert_eq!(episode.directors().len(), 1);
    assert_eq!(episode.writers().len(), 1);
}

// =============================================================================
// Error Tests
// =============================================================================

#[tokio::test]
async fn test_not_found() {
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/movie/999999999")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body(r#"{"status_code": 34, "status_message": "The resource you requested could not be found."}"#)
        .create_async()
        .await;

    let result = client(&server).movie_details(999999999).await;
    assert!(matches!(result, Err(TmdbError::NotFound)));
}

#[tokio::test]
async fn test_status_message_is_surfaced() {
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/movie/top_rated")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(r#"{"status_code": 7, "status_message": "Invalid API key: You must be granted a valid key."}"#)
        .create_async()
        .await;

    let err = client(&server).top_rated_movies(1).await.unwrap_err();
    match err {
        TmdbError::Status { status, message } => {
            assert_eq!(status, 401);
            assert!(message.starts_with("Invalid API key"));
        }
        other => panic!("Expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_rate_limited() {
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/search/multi")
        .match_query(Matcher::Any)
        .with_status(429)
        .create_async()
        .await;

    let result = client(&server).search_multi("x", 1).await;
    assert!(matches!(result, Err(TmdbError::RateLimited)));
}

#[tokio::test]
async fn test_malformed_body() {
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/tv/top_rated")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let result = client(&server).top_rated_tv(1).await;
    assert!(matches!(result, Err(TmdbError::InvalidResponse(_))));
}

#[tokio::test]
async fn test_bundle_fails_when_one_request_fails() {
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/movie/78")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"id": 78, "title": "Blade Runner"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/movie/78/images")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;
    server
        .mock("GET", "/movie/78/videos")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"results": []}"#)
        .create_async()
        .await;

    let result = client(&server).movie_bundle(78).await;
    assert!(matches!(result, Err(TmdbError::Status { status: 500, .. })));
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let client = TmdbClient::with_base_url(TOKEN, "http://127.0.0.1:1");
    let result = client.movie_details(1).await;
    assert!(matches!(result, Err(TmdbError::Transport(_))));
}
