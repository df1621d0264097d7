//! CLI Command Handlers
//!
//! Implements all CLI commands on top of the API client, the controllers and
//! the watchlist store. Each handler takes parsed args and the Output sink and
//! returns an ExitCode.

use std::fmt::Write as _;

use crate::api::{TmdbClient, TmdbError};
use crate::cli::{
    EpisodeCmd, ExitCode, MovieCmd, Output, SearchCmd, SeasonCmd, TopRatedCmd, TrendingCmd, TvCmd,
    WatchTarget, WatchlistAction, WatchlistCmd, WatchlistStatus,
};
use crate::config::{Config, ConfigError};
use crate::models::{
    format_date, CrewMember, DateLocale, EpisodeBundle, Listing, MediaRecord,
    MovieBundle, SeasonDetail, SeriesBundle, Summary, Video, UNKNOWN,
};
use crate::pagination::{ListingSource, LoadOutcome, PaginatedList};
use crate::search::{SearchController, SearchOutcome};
use crate::storage::FileStorage;
use crate::watchlist::{WatchlistDocument, WatchlistStore};

/// Build the API client, failing fast when no access token is configured
pub fn client_from_config(config: &Config) -> Result<TmdbClient, ConfigError> {
    let token = Config::access_token()?;
    Ok(TmdbClient::new(token)
        .language(config.language.clone())
        .timeout(config.request_timeout()))
}

fn api_error(output: &Output, what: &str, e: TmdbError) -> ExitCode {
    let code = match e {
        TmdbError::NotFound => ExitCode::InvalidArgs,
        _ => ExitCode::NetworkError,
    };
    output.error(format!("Failed to load {}: {}", what, e), code)
}

fn print_or_fail<T: serde::Serialize>(
    output: &Output,
    data: &T,
    human: impl FnOnce(&T) -> String,
) -> ExitCode {
    match output.print(data, human) {
        Ok(()) => ExitCode::Success,
        Err(e) => output.error(format!("Failed to serialize: {}", e), ExitCode::Error),
    }
}

fn render_summaries(summaries: &Vec<Summary>) -> String {
    if summaries.is_empty() {
        return "No results".to_string();
    }
    summaries
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

fn summarize(records: &[MediaRecord], locale: DateLocale) -> Vec<Summary> {
    records
        .iter()
        .map(|r| r.as_summary().summary(locale))
        .collect()
}

fn render_trailers(out: &mut String, trailers: &[Video]) {
    if trailers.is_empty() {
        return;
    }
    let _ = writeln!(out, "Trailers:");
    for video in trailers {
        let url = video.youtube_url().unwrap_or_default();
        let _ = writeln!(out, "  {} ({}) {}", video.name, video.video_type, url);
    }
}

// =============================================================================
// Listing Commands
// =============================================================================

async fn load_listing(
    listing: Listing,
    pages: u32,
    client: &TmdbClient,
    locale: DateLocale,
    output: &Output,
) -> ExitCode {
    let list = PaginatedList::new(ListingSource::new(client.clone(), listing));

    for _ in 0..pages {
        match list.load_next_page().await {
            Ok(LoadOutcome::Loaded { added }) => {
                let state = list.snapshot();
                output.info(format!(
                    "Loaded page {}/{} ({} items)",
                    state.page,
                    state.total_pages.unwrap_or(0),
                    added
                ));
            }
            Ok(_) => break,
            Err(e) => return output.error(e.to_string(), ExitCode::NetworkError),
        }
    }

    let summaries = summarize(&list.snapshot().items, locale);
    print_or_fail(output, &summaries, render_summaries)
}

pub async fn top_rated_cmd(
    cmd: TopRatedCmd,
    client: &TmdbClient,
    locale: DateLocale,
    output: &Output,
) -> ExitCode {
    let listing = Listing::top_rated(cmd.media_type.into());
    output.info(format!("Fetching top-rated {}...", listing.kind));
    load_listing(listing, cmd.pages, client, locale, output).await
}

pub async fn trending_cmd(
    cmd: TrendingCmd,
    client: &TmdbClient,
    locale: DateLocale,
    output: &Output,
) -> ExitCode {
    let listing = Listing::trending(cmd.media_type.into(), cmd.window.into());
    output.info(format!("Fetching trending {} ({:?})...", listing.kind, cmd.window));
    load_listing(listing, cmd.pages, client, locale, output).await
}

// =============================================================================
// Search Command
// =============================================================================

pub async fn search_cmd(
    cmd: SearchCmd,
    client: &TmdbClient,
    locale: DateLocale,
    output: &Output,
) -> ExitCode {
    let controller = SearchController::new(client.clone());
    controller.set_query(cmd.query.as_str());

    output.info(format!("Searching for: {}", cmd.query));

    match controller.submit().await {
        Ok(SearchOutcome::Cleared) => {
            return output.error("Search query is empty", ExitCode::InvalidArgs)
        }
        Ok(_) => {}
        Err(e) => return output.error(e.to_string(), ExitCode::NetworkError),
    }

    for _ in 1..cmd.pages {
        match controller.load_more().await {
            Ok(SearchOutcome::Loaded { .. }) => {}
            Ok(_) => break,
            Err(e) => return output.error(e.to_string(), ExitCode::NetworkError),
        }
    }

    let summaries = summarize(&controller.snapshot().results, locale);
    print_or_fail(output, &summaries, render_summaries)
}

// =============================================================================
// Detail Commands
// =============================================================================

pub async fn movie_cmd(
    cmd: MovieCmd,
    client: &TmdbClient,
    locale: DateLocale,
    output: &Output,
) -> ExitCode {
    output.info(format!("Getting movie {}...", cmd.id));
    match client.movie_bundle(cmd.id).await {
        Ok(bundle) => print_or_fail(output, &bundle, |b| render_movie(b, locale)),
        Err(e) => api_error(output, "movie details", e),
    }
}

fn render_movie(bundle: &MovieBundle, locale: DateLocale) -> String {
    let movie = &bundle.movie;
    let mut out = String::new();
    let _ = writeln!(out, "{} [{}]", movie.title, movie.id);
    let _ = writeln!(out, "Released: {}", movie.formatted_release_date_in(locale));
    let _ = writeln!(out, "Rating:   ⭐ {:.1}", movie.rating_percentage());
    let _ = writeln!(out, "Runtime:  {}", movie.formatted_runtime());
    if !movie.genres.is_empty() {
        let genres: Vec<_> = movie.genres.iter().map(|g| g.name.as_str()).collect();
        let _ = writeln!(out, "Genres:   {}", genres.join(", "));
    }
    if let Some(url) = movie.poster_url_default() {
        let _ = writeln!(out, "Poster:   {}", url);
    }
    if let Some(url) = movie.backdrop_url_default() {
        let _ = writeln!(out, "Backdrop: {}", url);
    }
    let _ = writeln!(
        out,
        "Images:   {} backdrops, {} posters",
        bundle.images.backdrops.len(),
        bundle.images.posters.len()
    );
    let _ = writeln!(out, "\n{}\n", movie.overview);
    render_trailers(&mut out, &bundle.trailers);
    out.trim_end().to_string()
}

pub async fn tv_cmd(cmd: TvCmd, client: &TmdbClient, locale: DateLocale, output: &Output) -> ExitCode {
    output.info(format!("Getting TV series {}...", cmd.id));
    match client.tv_bundle(cmd.id).await {
        Ok(bundle) => print_or_fail(output, &bundle, |b| render_series(b, locale)),
        Err(e) => api_error(output, "TV series details", e),
    }
}

fn render_series(bundle: &SeriesBundle, locale: DateLocale) -> String {
    let series = &bundle.series;
    let mut out = String::new();
    let _ = writeln!(out, "{} [{}]", series.name, series.id);
    let _ = writeln!(
        out,
        "Aired:    {} - {}",
        series.formatted_first_air_date_in(locale),
        series.formatted_last_air_date_in(locale)
    );
    let _ = writeln!(out, "Rating:   ⭐ {:.1}", series.rating_percentage());
    if let Some(status) = &series.status {
        let _ = writeln!(out, "Status:   {}", status);
    }
    if let Some(url) = series.poster_url_default() {
        let _ = writeln!(out, "Poster:   {}", url);
    }
    let _ = writeln!(out, "\n{}\n", series.overview);
    if !bundle.seasons.is_empty() {
        let _ = writeln!(out, "Seasons:");
        for season in &bundle.seasons {
            let _ = writeln!(out, "  {}. {}", season.season_number, season);
        }
    }
    render_trailers(&mut out, &bundle.trailers);
    out.trim_end().to_string()
}

pub async fn season_cmd(
    cmd: SeasonCmd,
    client: &TmdbClient,
    locale: DateLocale,
    output: &Output,
) -> ExitCode {
    output.info(format!("Getting season {} of {}...", cmd.season, cmd.tv_id));
    match client.tv_season(cmd.tv_id, cmd.season).await {
        Ok(season) => print_or_fail(output, &season, |s| render_season(s, locale)),
        Err(e) => api_error(output, "season details", e),
    }
}

fn render_season(season: &SeasonDetail, locale: DateLocale) -> String {
    let mut out = String::new();
    let name = season
        .name
        .clone()
        .unwrap_or_else(|| format!("Season {}", season.season_number));
    let _ = writeln!(out, "{} ({} episodes)", name, season.episodes.len());
    for episode in &season.episodes {
        let _ = writeln!(
            out,
            "  {} - {} - ⭐ {}",
            episode,
            episode.formatted_air_date_in(locale),
            episode.rating_label()
        );
    }
    out.trim_end().to_string()
}

pub async fn episode_cmd(
    cmd: EpisodeCmd,
    client: &TmdbClient,
    locale: DateLocale,
    output: &Output,
) -> ExitCode {
    output.info(format!(
        "Getting episode S{:02}E{:02} of {}...",
        cmd.season, cmd.episode, cmd.tv_id
    ));
    match client
        .episode_bundle(cmd.tv_id, cmd.season, cmd.episode)
        .await
    {
        Ok(bundle) => print_or_fail(output, &bundle, |b| render_episode(b, locale)),
        Err(e) => api_error(output, "episode details", e),
    }
}

fn render_episode(bundle: &EpisodeBundle, locale: DateLocale) -> String {
    let episode = &bundle.episode;
    let mut out = String::new();
    let _ = writeln!(out, "{}", episode);
    let _ = writeln!(out, "Aired:     {}", episode.formatted_air_date_in(locale));
    let _ = writeln!(out, "Rating:    ⭐ {}", episode.rating_label());
    let _ = writeln!(out, "Runtime:   {}", episode.formatted_runtime());
    if let Some(url) = episode.still_url_default() {
        let _ = writeln!(out, "Still:     {}", url);
    }
    let names = |crew: Vec<&CrewMember>| {
        crew.iter().map(|c| c.name.as_str()).collect::<Vec<_>>().join(", ")
    };
    let directors = names(episode.directors());
    if !directors.is_empty() {
        let _ = writeln!(out, "Directed:  {}", directors);
    }
    let writers = names(episode.writers());
    if !writers.is_empty() {
        let _ = writeln!(out, "Written:   {}", writers);
    }
    let _ = writeln!(out, "Stills:    {}", bundle.images.stills.len());
    let _ = writeln!(out, "\n{}\n", episode.overview);
    render_trailers(&mut out, &bundle.trailers);
    out.trim_end().to_string()
}

// =============================================================================
// Watchlist Command
// =============================================================================

fn target_label(target: &WatchTarget) -> String {
    match target {
        WatchTarget::Movie { id } => format!("movie {}", id),
        WatchTarget::Tv { id } => format!("tv {}", id),
        WatchTarget::Episode(e) => format!("tv {} S{:02}E{:02}", e.tv_id, e.season, e.episode),
    }
}

pub async fn watchlist_cmd(
    cmd: WatchlistCmd,
    config: &Config,
    client: Option<&TmdbClient>,
    output: &Output,
) -> ExitCode {
    let store = WatchlistStore::new(FileStorage::new(config.data_dir()));

    match cmd.action {
        WatchlistAction::List => {
            let doc = store.get_all().await;
            print_or_fail(output, &doc, |d| render_watchlist(d, config.date_locale))
        }
        WatchlistAction::Add(args) => {
            let Some(client) = client else {
                return output.error(ConfigError::MissingAccessToken.to_string(), ExitCode::ConfigError);
            };
            add_to_watchlist(&store, client, args.target, output).await
        }
        WatchlistAction::Remove(args) => {
            let target = args.target;
            let ok = match target {
                WatchTarget::Movie { id } => store.remove_movie(id).await,
                WatchTarget::Tv { id } => store.remove_tv_series(id).await,
                WatchTarget::Episode(e) => store.remove_episode(e.tv_id, e.season, e.episode).await,
            };
            if !ok {
                return output.error("Failed to update watchlist", ExitCode::StorageError);
            }
            let status = WatchlistStatus {
                target: target_label(&target),
                in_watchlist: false,
            };
            print_or_fail(output, &status, |s| format!("Removed {}", s.target))
        }
        WatchlistAction::Check(args) => {
            let target = args.target;
            let in_watchlist = match target {
                WatchTarget::Movie { id } => store.is_movie_in_watchlist(id).await,
                WatchTarget::Tv { id } => store.is_tv_series_in_watchlist(id).await,
                WatchTarget::Episode(e) => {
                    store
                        .is_episode_in_watchlist(e.tv_id, e.season, e.episode)
                        .await
                }
            };
            let status = WatchlistStatus {
                target: target_label(&target),
                in_watchlist,
            };
            print_or_fail(output, &status, |s| {
                if s.in_watchlist {
                    format!("{} is in the watchlist", s.target)
                } else {
                    format!("{} is not in the watchlist", s.target)
                }
            })
        }
    }
}

async fn add_to_watchlist(
    store: &WatchlistStore<FileStorage>,
    client: &TmdbClient,
    target: WatchTarget,
    output: &Output,
) -> ExitCode {
    let added = match target {
        WatchTarget::Movie { id } => match client.movie_details(id).await {
            Ok(movie) => store.add_movie(&movie).await,
            Err(e) => return api_error(output, "movie details", e),
        },
        WatchTarget::Tv { id } => match client.tv_details(id).await {
            Ok(series) => store.add_tv_series(&series).await,
            Err(e) => return api_error(output, "TV series details", e),
        },
        WatchTarget::Episode(e) => {
            let fetched = tokio::try_join!(
                client.tv_episode(e.tv_id, e.season, e.episode),
                client.tv_details(e.tv_id),
            );
            match fetched {
                Ok((episode, series)) => {
                    let season_name = series.season_name(episode.season_number);
                    store
                        .add_episode(&episode, e.tv_id, &series.name, &season_name)
                        .await
                }
                Err(err) => return api_error(output, "episode details", err),
            }
        }
    };

    if !added {
        return output.error("Failed to update watchlist", ExitCode::StorageError);
    }
    let status = WatchlistStatus {
        target: target_label(&target),
        in_watchlist: true,
    };
    print_or_fail(output, &status, |s| format!("Added {}", s.target))
}

fn render_watchlist(doc: &WatchlistDocument, locale: DateLocale) -> String {
    if doc.is_empty() {
        return "Watchlist is empty".to_string();
    }
    let mut out = String::new();
    if !doc.movies.is_empty() {
        let _ = writeln!(out, "Movies:");
        for m in &doc.movies {
            let date = format_date(m.release_date.as_deref(), locale, UNKNOWN);
            let _ = writeln!(out, "  [{}] {} ({})", m.id, m.title, date);
        }
    }
    if !doc.tv_series.is_empty() {
        let _ = writeln!(out, "TV Series:");
        for s in &doc.tv_series {
            let date = format_date(s.first_air_date.as_deref(), locale, UNKNOWN);
            let _ = writeln!(out, "  [{}] {} ({})", s.id, s.name, date);
        }
    }
    if !doc.episodes.is_empty() {
        let _ = writeln!(out, "Episodes:");
        for e in &doc.episodes {
            let _ = writeln!(
                out,
                "  {} • {} - S{}E{}: {}",
                e.series_name, e.season_name, e.season_number, e.episode_number, e.name
            );
        }
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Movie, RecordKind};
    use chrono::Utc;

    #[test]
    fn test_target_label() {
        assert_eq!(target_label(&WatchTarget::Movie { id: 7 }), "movie 7");
        let ep = WatchTarget::Episode(EpisodeCmd {
            tv_id: 1396,
            season: 1,
            episode: 2,
        });
        assert_eq!(target_label(&ep), "tv 1396 S01E02");
    }

    #[test]
    fn test_render_summaries_empty() {
        assert_eq!(render_summaries(&Vec::new()), "No results");
    }

    #[test]
    fn test_summarize_keeps_order() {
        let movies: Vec<MediaRecord> = (1..=3)
            .map(|id| {
                let movie: Movie = serde_json::from_value(serde_json::json!({
                    "id": id, "title": format!("M{}", id)
                }))
                .unwrap();
                MediaRecord::Movie(movie)
            })
            .collect();
        let summaries = summarize(&movies, DateLocale::En);
        let ids: Vec<_> = summaries.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(summaries.iter().all(|s| s.kind == RecordKind::Movie));
    }

    #[test]
    fn test_render_watchlist() {
        let mut doc = WatchlistDocument::default();
        assert_eq!(render_watchlist(&doc, DateLocale::En), "Watchlist is empty");

        doc.movies.push(crate::watchlist::MovieEntry {
            id: 78,
            title: "Blade Runner".into(),
            poster_path: None,
            release_date: Some("1982-06-25".into()),
            vote_average: 7.9,
            added_at: Utc::now(),
        });
        let rendered = render_watchlist(&doc, DateLocale::En);
        assert!(rendered.contains("[78] Blade Runner (25 June 1982)"));
    }
}
