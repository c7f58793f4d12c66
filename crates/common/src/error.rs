//! Error types shared across Montage crates.

use std::path::PathBuf;

/// Top-level error type for Montage operations.
#[derive(Debug, thiserror::Error)]
pub enum MontageError {
    #[error("Media error: {message}")]
    Media { message: String },

    #[error("Upload rejected: {message}")]
    Upload { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using MontageError.
pub type MontageResult<T> = Result<T, MontageError>;

impl MontageError {
    pub fn media(msg: impl Into<String>) -> Self {
        Self::Media {
            message: msg.into(),
        }
    }

    pub fn upload(msg: impl Into<String>) -> Self {
        Self::Upload {
            message: msg.into(),
        }
    }
}
