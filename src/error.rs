//! Error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Ways a `read_line` call can end without producing a line.
#[derive(Error, Debug)]
pub enum ReadlineError {
    /// The user cancelled the line with ctrl-C.
    #[error("line editing interrupted")]
    Interrupted,

    /// ctrl-D on an empty line, or the input stream ended.
    #[error("end of input")]
    Eof,

    /// Terminal I/O failed.
    #[error("terminal I/O error: {0}")]
    Io(#[from] io::Error),
}

/// History persistence failures.
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("failed to load history from {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to save history to {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Logging setup failures.
#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("failed to open log file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to initialize logging: {0}")]
    Init(String),
}

pub type Result<T> = std::result::Result<T, ReadlineError>;
