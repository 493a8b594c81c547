//! Error types for blob store operations.

use std::io;
use std::path::PathBuf;

/// Errors from blob store operations.
///
/// Every variant carries the path the operation was acting on; the
/// underlying `io::Error` is preserved as the source.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The blob directory could not be created.
    #[error("could not create blob directory {path}: {source}")]
    Init { path: PathBuf, source: io::Error },

    /// A working-tree path could not be resolved to an absolute path.
    #[error("could not resolve path {path}: {source}")]
    Resolve { path: PathBuf, source: io::Error },

    /// Copying working-tree content into the store failed.
    #[error("could not store {path}: {source}")]
    Store { path: PathBuf, source: io::Error },

    /// Copying stored content back to the working tree failed.
    #[error("could not restore {path}: {source}")]
    Restore { path: PathBuf, source: io::Error },
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
