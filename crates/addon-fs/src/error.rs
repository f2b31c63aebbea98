//! Error types for addon-fs

use std::path::PathBuf;

/// Result type for addon-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in addon-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} record at {path}: {message}")]
    RecordParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Unsupported record format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Failed to parse options file at {path}: {message}")]
    OptionsParse { path: PathBuf, message: String },

    #[error("Option '{key}' is a table, not a value")]
    OptionNotAValue { key: String },

    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
