//! CLI - Command Line Interface for cinedeck
//!
//! Every browsing and watchlist action is scriptable. With `--json` (or when
//! stdout is not a terminal) all output is JSON-parseable.
//!
//! # Examples
//!
//! ```bash
//! # Browse listings
//! cinedeck top-rated --type tv --pages 2
//! cinedeck trending --window week
//!
//! # Search and details
//! cinedeck search "the batman" --json
//! cinedeck movie 414906
//! cinedeck episode 1396 1 1
//!
//! # Watchlist
//! cinedeck watchlist add movie 414906
//! cinedeck watchlist list
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::models::{MediaKind, TimeWindow};

// =============================================================================
// Exit Codes
// =============================================================================

/// Exit codes for CLI operations (semantic for scripting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// General error
    Error = 1,
    /// Invalid arguments
    InvalidArgs = 2,
    /// Network or API error
    NetworkError = 3,
    /// Missing or invalid configuration
    ConfigError = 4,
    /// Watchlist could not be written
    StorageError = 5,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> std::process::ExitCode {
        std::process::ExitCode::from(code as u8)
    }
}

// =============================================================================
// Main CLI Structure
// =============================================================================

/// cinedeck - browse movies and TV series, keep a watchlist
#[derive(Parser, Debug)]
#[command(
    name = "cinedeck",
    version,
    about = "Browse movies and TV series from TMDB and keep a local watchlist",
    long_about = "Browse top-rated and trending movies and TV series, search, \
                  look up details, and keep a local watchlist.\n\n\
                  Requires a TMDB API read access token in TMDB_ACCESS_TOKEN.",
    after_help = "EXAMPLES:\n\
                  cinedeck top-rated -t tv --pages 2     Two pages of top-rated series\n\
                  cinedeck search \"blade runner\"        Search movies and series\n\
                  cinedeck watchlist add movie 78        Save a movie\n\
                  cinedeck watchlist list --json         Dump the watchlist"
)]
pub struct Cli {
    /// Output format as JSON (default for non-TTY)
    #[arg(long, short = 'j', global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to config file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Check if JSON output should be used
    pub fn should_json(&self) -> bool {
        self.json || !std::io::stdout().is_terminal()
    }

    /// Whether the command talks to the remote API
    pub fn needs_api(&self) -> bool {
        match &self.command {
            Command::Watchlist(cmd) => matches!(cmd.action, WatchlistAction::Add(_)),
            _ => true,
        }
    }
}

// =============================================================================
// Subcommands
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Top-rated movies or TV series
    #[command(visible_alias = "top")]
    TopRated(TopRatedCmd),

    /// Trending movies or TV series
    #[command(visible_alias = "tr")]
    Trending(TrendingCmd),

    /// Search for movies and TV series
    #[command(visible_alias = "s")]
    Search(SearchCmd),

    /// Movie details, images and trailers
    Movie(MovieCmd),

    /// TV series details, images, trailers and seasons
    Tv(TvCmd),

    /// Episodes of one season
    Season(SeasonCmd),

    /// Episode details, stills and trailers
    Episode(EpisodeCmd),

    /// Manage the local watchlist
    #[command(visible_alias = "wl")]
    Watchlist(WatchlistCmd),
}

/// Media type selector for listings
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaTypeArg {
    /// Movies
    #[default]
    Movie,
    /// TV series
    Tv,
}

impl From<MediaTypeArg> for MediaKind {
    fn from(arg: MediaTypeArg) -> Self {
        match arg {
            MediaTypeArg::Movie => MediaKind::Movie,
            MediaTypeArg::Tv => MediaKind::Tv,
        }
    }
}

/// Time window for trending content
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrendingWindow {
    /// Today's trending
    #[default]
    Day,
    /// This week's trending
    Week,
}

impl From<TrendingWindow> for TimeWindow {
    fn from(window: TrendingWindow) -> Self {
        match window {
            TrendingWindow::Day => TimeWindow::Day,
            TrendingWindow::Week => TimeWindow::Week,
        }
    }
}

// =============================================================================
// Listing Commands
// =============================================================================

/// Top-rated listing
#[derive(Args, Debug)]
pub struct TopRatedCmd {
    /// Media type
    #[arg(long = "type", short = 't', value_enum, default_value = "movie")]
    pub media_type: MediaTypeArg,

    /// Number of pages to load
    #[arg(long, short = 'p', default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub pages: u32,
}

/// Trending listing
#[derive(Args, Debug)]
pub struct TrendingCmd {
    /// Media type
    #[arg(long = "type", short = 't', value_enum, default_value = "movie")]
    pub media_type: MediaTypeArg,

    /// Time window for trending
    #[arg(long, short = 'w', value_enum, default_value = "day")]
    pub window: TrendingWindow,

    /// Number of pages to load
    #[arg(long, short = 'p', default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub pages: u32,
}

// =============================================================================
// Search Command
// =============================================================================

/// Search for movies and TV series by query
#[derive(Args, Debug)]
pub struct SearchCmd {
    /// Search query (title, keywords)
    #[arg(required = true)]
    pub query: String,

    /// Number of pages to load
    #[arg(long, short = 'p', default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub pages: u32,
}

// =============================================================================
// Detail Commands
// =============================================================================

#[derive(Args, Debug)]
pub struct MovieCmd {
    /// TMDB movie ID
    pub id: u64,
}

#[derive(Args, Debug)]
pub struct TvCmd {
    /// TMDB series ID
    pub id: u64,
}

#[derive(Args, Debug)]
pub struct SeasonCmd {
    /// TMDB series ID
    pub tv_id: u64,
    /// Season number
    pub season: u32,
}

#[derive(Args, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeCmd {
    /// TMDB series ID
    pub tv_id: u64,
    /// Season number
    pub season: u32,
    /// Episode number
    pub episode: u32,
}

// =============================================================================
// Watchlist Command
// =============================================================================

#[derive(Args, Debug)]
pub struct WatchlistCmd {
    #[command(subcommand)]
    pub action: WatchlistAction,
}

#[derive(Subcommand, Debug)]
pub enum WatchlistAction {
    /// Show saved movies, series and episodes
    #[command(visible_alias = "ls")]
    List,

    /// Save an item (fetches it from TMDB first)
    Add(WatchTargetArgs),

    /// Remove an item
    #[command(visible_alias = "rm")]
    Remove(WatchTargetArgs),

    /// Check whether an item is saved
    Check(WatchTargetArgs),
}

#[derive(Args, Debug)]
pub struct WatchTargetArgs {
    #[command(subcommand)]
    pub target: WatchTarget,
}

/// Item addressed by a watchlist action
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchTarget {
    /// A movie by TMDB ID
    Movie { id: u64 },
    /// A TV series by TMDB ID
    Tv { id: u64 },
    /// An episode by series ID, season and episode number
    Episode(EpisodeCmd),
}

// =============================================================================
// JSON Output Types
// =============================================================================

/// Generic JSON output wrapper with status
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "is_zero")]
    pub exit_code: i32,
}

fn is_zero(n: &i32) -> bool {
    *n == 0
}

impl<T: Serialize> JsonOutput<T> {
    /// Create success output with data
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            exit_code: 0,
        }
    }

    /// Create error output (no data)
    pub fn error_msg(msg: impl Into<String>, code: ExitCode) -> JsonOutput<()> {
        JsonOutput::<()> {
            data: None,
            error: Some(msg.into()),
            exit_code: code.into(),
        }
    }
}

/// Result of a watchlist mutation or check
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WatchlistStatus {
    pub target: String,
    pub in_watchlist: bool,
}

// =============================================================================
// Output
// =============================================================================

/// Output sink honoring `--json` and `--quiet`
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
    pub quiet: bool,
}

impl Output {
    pub fn new(cli: &Cli) -> Self {
        Self {
            json: cli.should_json(),
            quiet: cli.quiet,
        }
    }

    /// Print success data: JSON envelope, or the human rendering
    pub fn print<T: Serialize>(&self, data: &T, human: impl FnOnce(&T) -> String) -> anyhow::Result<()> {
        if self.json {
            let output = JsonOutput::success(data);
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", human(data));
        }
        Ok(())
    }

    /// Print error and return exit code
    pub fn error(&self, msg: impl Into<String>, code: ExitCode) -> ExitCode {
        let msg = msg.into();
        if self.json {
            let output = JsonOutput::<()>::error_msg(&msg, code);
            if let Ok(json) = serde_json::to_string_pretty(&output) {
                eprintln!("{}", json);
            }
        } else if !self.quiet {
            eprintln!("Error: {}", msg);
        }
        code
    }

    /// Print info message (suppressed in quiet mode)
    pub fn info(&self, msg: impl std::fmt::Display) {
        if !self.quiet && !self.json {
            eprintln!("{}", msg);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
