//! Error types for the draft cache.

use thiserror::Error;

/// Failure of a key/value store operation.
///
/// The draft cache logs and swallows these; they only surface to callers
/// that use a store directly.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Key contains characters outside `[A-Za-z0-9_-]`.
    #[error("invalid store key {0:?}")]
    InvalidKey(String),

    /// Filesystem failure in a file-backed store.
    #[error("store io error for key {key:?}: {source}")]
    Io {
        key: String,
        source: std::io::Error,
    },
}

/// Errors raised while editing a draft.
#[derive(Error, Debug)]
pub enum DraftError {
    /// The selection does not exist in the catalog.
    #[error(transparent)]
    Selection(#[from] cdd_core::CddError),
}
