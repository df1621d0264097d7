//! cinedeck - browse TMDB from the terminal
//!
//! # Usage
//!
//! ```bash
//! export TMDB_ACCESS_TOKEN=...
//!
//! cinedeck top-rated --type tv --pages 2
//! cinedeck search "blade runner"
//! cinedeck movie 78
//! cinedeck watchlist add episode 1396 1 1
//! cinedeck watchlist ls --json
//! ```

use clap::Parser;

use cinedeck::api::TmdbClient;
use cinedeck::cli::{Cli, Command, ExitCode, Output};
use cinedeck::commands;
use cinedeck::config::Config;
use cinedeck::logging::init_logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // A second init only fails in tests; logging is best effort
    let _ = init_logging(cli.verbose, cli.quiet);

    let exit_code = run_cli(cli).await;
    std::process::exit(exit_code.into());
}

/// Run CLI command and return exit code
async fn run_cli(cli: Cli) -> ExitCode {
    let output = Output::new(&cli);

    let loaded = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(e) => return output.error(e.to_string(), ExitCode::ConfigError),
    };

    let client: Option<TmdbClient> = if cli.needs_api() {
        match commands::client_from_config(&config) {
            Ok(client) => Some(client),
            Err(e) => return output.error(e.to_string(), ExitCode::ConfigError),
        }
    } else {
        None
    };
    let locale = config.date_locale;

    match (cli.command, client.as_ref()) {
        (Command::Watchlist(cmd), client) => {
            commands::watchlist_cmd(cmd, &config, client, &output).await
        }

        (Command::TopRated(cmd), Some(client)) => {
            commands::top_rated_cmd(cmd, client, locale, &output).await
        }

        (Command::Trending(cmd), Some(client)) => {
            commands::trending_cmd(cmd, client, locale, &output).await
        }

        (Command::Search(cmd), Some(client)) => {
            commands::search_cmd(cmd, client, locale, &output).await
        }

        (Command::Movie(cmd), Some(client)) => commands::movie_cmd(cmd, client, locale, &output).await,

        (Command::Tv(cmd), Some(client)) => commands::tv_cmd(cmd, client, locale, &output).await,

        (Command::Season(cmd), Some(client)) => {
            commands::season_cmd(cmd, client, locale, &output).await
        }

        (Command::Episode(cmd), Some(client)) => {
            commands::episode_cmd(cmd, client, locale, &output).await
        }

        (_, None) => output.error("TMDB client is not configured", ExitCode::ConfigError),
    }
}
