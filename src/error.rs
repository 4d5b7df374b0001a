use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Input file not found: {0:?}")]
    InputNotFound(PathBuf),

    #[error("Unsupported input format: {path:?} (expected .csv or .json)")]
    UnsupportedFormat {
        path: PathBuf,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File error: {path:?} - {message}")]
    FileError {
        path: PathBuf,
        message: String,
    },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),
}

impl ReportError {
    /// Build a `FileError` from an I/O failure on `path`
    pub fn file(path: impl Into<PathBuf>, error: impl std::fmt::Display) -> Self {
        ReportError::FileError {
            path: path.into(),
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(error: serde_json::Error) -> Self {
        ReportError::SerializationError(error.to_string())
    }
}

/// Failure reported by a remote issue publisher
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("remote returned {status}: {body}")]
    Status {
        status: u16,
        body: String,
    },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

impl PublishError {
    /// Numeric error code, when the remote answered at all
    pub fn status_code(&self) -> Option<u16> {
        match self {
            PublishError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type ReportResult<T> = std::result::Result<T, ReportError>;
