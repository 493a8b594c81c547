//! The engine error taxonomy.
//!
//! Everything here is recovered locally by the CLI collaborator — nothing
//! in the engine is fatal. Staging and lookup failures from the commit
//! layer ([`DagError`]) and I/O failures from the blob store
//! ([`StoreError`]) pass through transparently; the variants declared here
//! are the registry- and algorithm-level failures only.

use grove_dag::DagError;
use grove_store::StoreError;

/// Errors from engine commands.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// A command named a branch that is not registered.
    #[error("a branch with that name does not exist: {0}")]
    BranchNotFound(String),

    /// `checkout` fell through both the branch and the file interpretation.
    #[error("file does not exist in the most recent commit, or no such branch exists: {0}")]
    BranchOrFileNotFound(String),

    /// `find` matched no commit message.
    #[error("found no commit with that message: {0:?}")]
    MessageNotFound(String),

    /// `add_branch` with a name already registered.
    #[error("a branch with that name already exists: {0}")]
    BranchExists(String),

    /// `remove_branch` aimed at the current branch.
    #[error("cannot remove the current branch: {0}")]
    RemoveCurrentBranch(String),

    /// Merge or rebase of the current branch into itself.
    #[error("cannot {op} a branch with itself")]
    SelfOperation { op: &'static str },

    /// Rebase found the target already in the current branch's history.
    #[error("already up-to-date")]
    AlreadyUpToDate,

    /// Whole-state persistence failed (load or save).
    #[error("snapshot error: {0}")]
    Snapshot(String),

    /// Staging, finalize, or graph lookup failure.
    #[error(transparent)]
    Dag(#[from] DagError),

    /// Blob store I/O failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result alias for engine commands.
pub type RepoResult<T> = Result<T, RepoError>;
