//! Logging setup for the cinedeck binary
//!
//! Logs go to stderr so stdout stays clean for command output.

use anyhow::Result;
use std::io::{self, IsTerminal};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Filter directive for a `-v` count
pub fn filter_directive(verbose_level: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose_level {
        0 => "warn",
        // -v: debug, without hyper's connection chatter
        1 => "debug,hyper_util=warn,hyper::proto=warn,reqwest=info",
        _ => "trace",
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `-v` unless `--quiet` is set. `RUST_LOG_JSON=true`
/// switches to JSON lines.
pub fn init_logging(verbose_level: u8, quiet: bool) -> Result<()> {
    let directive = filter_directive(verbose_level, quiet);
    let filter = if quiet {
        EnvFilter::new(directive)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive))
    };

    let json = std::env::var("RUST_LOG_JSON")
        .map(|v| v == "true")
        .unwrap_or(false);

    let registry = Registry::default().with(filter);

    if json {
        let json_layer = fmt::layer().json().with_writer(io::stderr);
        registry.with(json_layer).try_init()?;
    } else {
        let fmt_layer = fmt::layer()
            .with_ansi(io::stderr().is_terminal())
            .with_writer(io::stderr);
        registry.with(fmt_layer).try_init()?;
    }

    Ok(())
}
