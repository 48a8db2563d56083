use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Log file written next to wherever the server was started
pub const DEFAULT_LOG_FILE: &str = "mcp-shell.log";

pub fn default_log_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(DEFAULT_LOG_FILE)
}

/// Install the global subscriber.
///
/// Human-readable lines go to stderr (stdout carries the protocol) and JSON
/// lines are appended to `log_file` through a non-blocking writer. If the file
/// cannot be opened, only the stderr layer is installed and a warning is
/// logged. The returned guard must be held for the life of the process so
/// buffered lines are flushed.
pub fn init(log_file: &Path) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false);

    let (file_layer, guard, open_error) = match open_append(log_file) {
        Ok(file) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking)
                .json();
            (Some(layer), Some(guard), None)
        }
        Err(e) => (None, None, Some(e)),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    if let Some(e) = open_error {
        tracing::warn!(path = %log_file.display(), error = %e, "Log file unavailable, logging to stderr only");
    }

    guard
}

fn open_append(path: &Path) -> std::io::Result<std::fs::File> {
    OpenOptions::new().create(true).append(true).open(path)
}
