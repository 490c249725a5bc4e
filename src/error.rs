//! Error taxonomy for the proofreading pipeline.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Input path missing, unreadable, or over the configured limits
    #[error("cannot access {path}: {reason}")]
    FileAccess { path: String, reason: String },

    /// Input bytes are not a PDF we can parse
    #[error("unsupported input {path}: {reason}")]
    UnsupportedFormat { path: String, reason: String },

    /// Missing credential or unusable settings
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Completion request failed. `page` is 0 when the failure is not page-scoped.
    #[error("completion failed for page {page}: {reason}")]
    Completion { page: u32, reason: String },

    /// Interactive answer could not be used
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Output artifact could not be written
    #[error("cannot write {path}: {reason}")]
    Output { path: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn file_access(path: &std::path::Path, reason: impl std::fmt::Display) -> Self {
        Error::FileAccess {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn unsupported(path: &std::path::Path, reason: impl std::fmt::Display) -> Self {
        Error::UnsupportedFormat {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn output(path: &std::path::Path, reason: impl std::fmt::Display) -> Self {
        Error::Output {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}
