//! Logging setup for shaker.
//!
//! Two tracing layers: a console layer on stderr limited to warnings and
//! errors, and a file layer writing `<config_dir>/shaker.log` at the level
//! selected by `--log-level` (debug, info, warning, error, none).

use crate::error::{Result, ShakerError};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::Layer;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Map a `--log-level` value to a file-layer filter.
pub fn parse_level(level: &str) -> Result<LevelFilter> {
    match level {
        "debug" => Ok(LevelFilter::DEBUG),
        "info" => Ok(LevelFilter::INFO),
        "warning" => Ok(LevelFilter::WARN),
        "error" => Ok(LevelFilter::ERROR),
        "none" => Ok(LevelFilter::OFF),
        other => Err(ShakerError::UserError(format!(
            "unknown log level '{}' (expected debug, info, warning, error, or none)",
            other
        ))),
    }
}

/// Install the global subscriber.
///
/// Must be called once, after the config directory is resolved (the log
/// file lives inside it). The log file is opened in append mode so repeated
/// invocations accumulate history.
pub fn init(level: &str, log_path: &Path) -> Result<()> {
    let file_filter = parse_level(level)?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .map_err(|e| {
            ShakerError::UserError(format!(
                "failed to open log file '{}': {}",
                log_path.display(),
                e
            ))
        })?;

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .with_filter(LevelFilter::WARN);

    let file_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_filter(file_filter);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| ShakerError::UserError(format!("failed to initialize logging: {}", e)))?;

    Ok(())
}
