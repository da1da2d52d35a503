//! Error types for asset I/O

use rotview_core::BackendError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while locating or reading assets
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Asset not found: {name}")]
    NotFound { name: String, searched: Vec<PathBuf> },

    #[error("Invalid file format: {format}")]
    InvalidFormat { format: String },

    #[error("Parse error in {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<AssetError> for BackendError {
    fn from(e: AssetError) -> Self {
        match e {
            AssetError::NotFound { name, searched } => BackendError::AssetNotFound { name, searched },
            other => BackendError::Asset(other.to_string()),
        }
    }
}

/// Result type alias for asset I/O
pub type AssetResult<T> = std::result::Result<T, AssetError>;
