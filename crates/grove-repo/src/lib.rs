//! The Grove engine.
//!
//! [`Repository`] owns everything: the id allocator, the branch registry
//! with one current branch, the commit graph, and the blob store. Each
//! engine command is a single method returning a structured result or a
//! [`RepoError`]; the engine never formats output, never prompts, and
//! never parses arguments — those are the CLI collaborator's job, as is
//! deciding *when* to [`SnapshotStore::save`] the whole state.
//!
//! Failed operations leave the in-memory state exactly as before the
//! call, with one documented exception: a failing
//! [`commit`](Repository::commit) may leave already-copied blobs in
//! storage.
//!
//! # Modules
//!
//! - [`error`] — the engine error taxonomy
//! - [`repository`] — the repository object and the basic commands
//! - [`merge`] — three-way file-granularity merge
//! - [`rebase`] — replay-based rebase with an injected decision provider
//! - [`snapshot`] — opaque whole-state persistence

pub mod error;
pub mod merge;
pub mod rebase;
pub mod repository;
pub mod snapshot;

pub use error::{RepoError, RepoResult};
pub use merge::MergeReport;
pub use rebase::{RebaseDecider, RebaseOutcome, ReplayDecision};
pub use repository::{Checkout, CommitSummary, Repository, StatusReport};
pub use snapshot::{JsonSnapshotStore, SnapshotStore};
