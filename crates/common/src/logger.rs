//! Tracing setup for the two ways the navigator runs
//!
//! `serve` is long-lived: it logs to the console and appends to
//! `navigator.log` so cache rebuilds and request traces survive restarts.
//! The one-shot commands (`search`, `rebuild`, `clean`) print their results
//! on stdout, so their logs go to stderr only and nothing is written to disk.
//!
//! In both cases `RUST_LOG` overrides the configured level.

use crate::error::NavigatorError;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Log file written inside `log_dir`
pub const LOG_FILE_NAME: &str = "navigator.log";

fn level_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level))
}

fn open_log_file(log_dir: &Path) -> Result<(File, PathBuf), NavigatorError> {
    std::fs::create_dir_all(log_dir).map_err(|e| {
        NavigatorError::config(format!(
            "cannot create log directory {}: {}",
            log_dir.display(),
            e
        ))
    })?;

    let path = log_dir.join(LOG_FILE_NAME);
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| {
            NavigatorError::config(format!("cannot open log file {}: {}", path.display(), e))
        })?;

    Ok((file, path))
}

/// Server logging: console plus `log_dir/navigator.log`
pub fn setup_logging(log_dir: &Path, log_level: &str) -> Result<(), NavigatorError> {
    let (log_file, log_path) = open_log_file(log_dir)?;

    let console = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_filter(level_filter(log_level));

    // No colour codes in the file
    let file = fmt::layer()
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_filter(level_filter(log_level));

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| NavigatorError::config(format!("logging already initialized: {}", e)))?;

    tracing::info!(
        "Server logging at {} (file: {})",
        log_level,
        log_path.display()
    );
    Ok(())
}

/// CLI logging: stderr only, stdout stays free for command output
pub fn setup_console_logging(log_level: &str) -> Result<(), NavigatorError> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(level_filter(log_level))
        .try_init()
        .map_err(|e| NavigatorError::config(format!("logging already initialized: {}", e)))?;

    tracing::debug!("CLI logging at {}", log_level);
    Ok(())
}

/// Level for a configured name, `None` when the name is unknown
pub fn parse_log_level(level: &str) -> Option<Level> {
    match level.trim().to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" | "warning" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}
