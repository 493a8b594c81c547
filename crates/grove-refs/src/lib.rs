//! Branches for Grove.
//!
//! A [`Branch`] is a named, mutable pointer to a head commit in the
//! repository's commit graph, owning at most one in-progress commit that
//! serves as its staging area. Branch operations take the collaborators
//! they need — the commit graph, the blob store, the id allocator — as
//! explicit parameters; a branch holds no back-reference to its
//! repository, which keeps it testable in isolation.
//!
//! Errors are the commit-layer errors from [`grove_dag`]; the branch adds
//! no failure modes of its own. Registry-level rules (name uniqueness,
//! protection of the current branch) belong to the repository.

pub mod branch;

pub use branch::Branch;
