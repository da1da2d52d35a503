//! Error types for rotview

use std::path::PathBuf;
use thiserror::Error;

use crate::handle::{ClientId, ObjectId};

/// Main error type for rotview operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Viewer is not connected")]
    NotConnected,

    #[error("Viewer is already connected")]
    AlreadyConnected,

    #[error("Expected {expected} rotations, got {found}")]
    ArityMismatch { expected: usize, found: usize },

    #[error("Sequence for slot {slot} has {found} steps, expected {expected}")]
    LengthMismatch {
        slot: usize,
        expected: usize,
        found: usize,
    },

    #[error("Slot index {index} is out of range for {slot_count} slots")]
    IndexOutOfRange { index: usize, slot_count: usize },

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures reported by a visualization backend.
///
/// The viewer passes these through untouched inside [`Error::Backend`].
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Connection refused: {0}")]
    ConnectionRefused(String),

    #[error("Client {0} is not connected")]
    NotConnected(ClientId),

    #[error("Unknown object {0}")]
    UnknownObject(ObjectId),

    #[error("Asset not found: {name} (searched {} location(s))", searched.len())]
    AssetNotFound { name: String, searched: Vec<PathBuf> },

    #[error("Asset error: {0}")]
    Asset(String),

    #[error("GPU error: {0}")]
    Gpu(String),

    #[error("Window error: {0}")]
    Window(String),
}

/// Result type alias for rotview operations
pub type Result<T> = std::result::Result<T, Error>;

/// Result type alias for backend calls
pub type BackendResult<T> = std::result::Result<T, BackendError>;
