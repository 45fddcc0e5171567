//! File-backed tracing setup.
//!
//! Stdout belongs to the line being edited, so diagnostics go to a file.

use std::env;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::LoggingError;

pub const LOG_PATH_VAR: &str = "TAPE_LINE_LOG";
pub const LOG_LEVEL_VAR: &str = "TAPE_LINE_LOG_LEVEL";

const DEFAULT_DIRECTIVE: &str = "info";

/// Install a global subscriber appending to `path`.
///
/// The filter is read from `TAPE_LINE_LOG_LEVEL` (an `EnvFilter` directive such as
/// `tape_line=debug`) and defaults to `info`.
pub fn init_file_logging(path: impl AsRef<Path>) -> Result<(), LoggingError> {
    let path = path.as_ref();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LoggingError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_env_filter(build_filter())
        .try_init()
        .map_err(|err| LoggingError::Init(err.to_string()))?;

    tracing::debug!(path = %path.display(), "file logging initialized");
    Ok(())
}

/// Install file logging when `TAPE_LINE_LOG` names a file.
///
/// Returns `Ok(false)` when the variable is unset or blank.
pub fn init_from_env() -> Result<bool, LoggingError> {
    match env::var(LOG_PATH_VAR) {
        Ok(path) if !path.trim().is_empty() => {
            init_file_logging(path.trim())?;
            Ok(true)
        }
        _ => Ok(false),
    }
}

fn build_filter() -> EnvFilter {
    let directive = env::var(LOG_LEVEL_VAR)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DIRECTIVE.to_string());
    EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}
