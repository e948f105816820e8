//! File-backed tracing for the CLI.
//!
//! Logs go to `${VIDRA_HOME}/logs/vidra.log.*`, never to the terminal;
//! stdout is reserved for command output. Filtering comes from the
//! `VIDRA_LOG` env var (`info` by default).

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use vidra_client::config::paths;

/// Initializes tracing. The returned guard must live until exit so the
/// non-blocking writer flushes.
pub fn init() -> Result<WorkerGuard> {
    let dir = paths::logs_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::daily(dir, "vidra.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env("VIDRA_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(guard)
}
