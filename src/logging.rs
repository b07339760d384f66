//! Logging configuration for askdb.
//!
//! Logs go to stderr by default so they never mix with the reports printed on
//! stdout. `--log-file` redirects them to a file instead.

use std::fs::{self, File};
use std::path::Path;
use tracing_subscriber::EnvFilter;

use crate::error::{AskError, Result};

/// Level used when neither `--log-level` nor `RUST_LOG` is set.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Builds the filter: an explicit level wins, then `RUST_LOG`, then the default.
pub fn build_filter(level: Option<&str>) -> Result<EnvFilter> {
    match level {
        Some(level) => EnvFilter::try_new(level)
            .map_err(|e| AskError::config(format!("Invalid log level '{level}': {e}"))),
        None => Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))),
    }
}

/// Initializes logging to stderr.
pub fn init_stderr_logging(level: Option<&str>) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(build_filter(level)?)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| AskError::internal(format!("Failed to initialize logging: {e}")))
}

/// Initializes logging to `path`, truncating it on each run.
pub fn init_file_logging(path: &Path, level: Option<&str>) -> Result<()> {
    let log_file = open_log_file(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(build_filter(level)?)
        .with_writer(log_file)
        .with_ansi(false)
        .try_init()
        .map_err(|e| AskError::internal(format!("Failed to initialize logging: {e}")))
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            AskError::config(format!(
                "Could not create log directory {}: {e}",
                parent.display()
            ))
        })?;
    }

    File::create(path).map_err(|e| {
        AskError::config(format!("Could not create log file {}: {e}", path.display()))
    })
}
