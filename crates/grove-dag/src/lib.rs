//! The Grove commit model and commit graph.
//!
//! A [`Commit`] is an immutable-once-finalized manifest of tracked files
//! with a single parent link; while in progress it carries a staging area
//! of pending additions and removals. The [`CommitGraph`] is the arena that
//! owns every recorded commit, keyed by id, with an auxiliary by-message
//! index; parents are plain [`CommitId`](grove_types::CommitId) references
//! into the arena, so traversal is iterative and no commit ever owns
//! another.
//!
//! Manifests are materialized eagerly: a child copies its parent's
//! effective view at construction time, so `effective(commit)` is a local
//! computation — `(inherited ∪ added) \ removed` — and never walks the
//! parent chain.

pub mod commit;
pub mod error;
pub mod graph;

pub use commit::{Commit, Manifest};
pub use error::{DagError, DagResult};
pub use graph::CommitGraph;
