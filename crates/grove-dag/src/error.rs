//! Error types for commit and graph operations.

use std::io;
use std::path::PathBuf;

use grove_types::CommitId;

/// Errors from commit and graph operations.
#[derive(Debug, thiserror::Error)]
pub enum DagError {
    /// Staging a file whose fingerprint matches the tracked one.
    #[error("file has not been modified since the last commit: {path}")]
    UnmodifiedFile { path: PathBuf },

    /// Finalizing a commit with empty pending sets.
    #[error("no changes added to the commit")]
    NothingStaged,

    /// A single-path checkout named a path absent from the manifest.
    #[error("file does not exist in that commit: {path}")]
    FileNotFound { path: PathBuf },

    /// A graph lookup named an id that was never recorded.
    #[error("no commit with id {0} exists")]
    CommitNotFound(CommitId),

    /// A working-tree path could not be resolved to an absolute path.
    #[error("could not resolve path {path}: {source}")]
    Resolve { path: PathBuf, source: io::Error },
}

/// Convenience alias for commit and graph results.
pub type DagResult<T> = Result<T, DagError>;
