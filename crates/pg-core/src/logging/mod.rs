//! Structured logging for the `guesser` CLI.
//!
//! - stdout is reserved for command output (guesses, scores)
//! - stderr receives all log output (human or JSONL)
//! - trained password strings are never logged at `info` or above; only
//!   counts, gram sizes, and timings are
//!
//! ```ignore
//! use pg_core::logging::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::from_env(None, None));
//! tracing::info!(rows = rows, "training complete");
//! ```

pub mod config;

pub use config::{LogConfig, LogFormat, LogLevel};

use std::io::IsTerminal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the logging subsystem. Must be called once at startup.
/// Respects `RUST_LOG`, falling back to `config.level` scoped to `pg_core`.
pub fn init_logging(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pg_core={}", config.level)));

    match config.format {
        LogFormat::Human => {
            let use_ansi = std::io::stderr().is_terminal();
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(use_ansi);
            tracing_subscriber::registry().with(filter).with(fmt_layer).init();
        }
        LogFormat::Jsonl => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .json()
                .with_target(false)
                .with_current_span(false);
            tracing_subscriber::registry().with(filter).with(fmt_layer).init();
        }
    }
}
