//! Blob storage for Grove.
//!
//! The blob store copies working-tree file content into the repository's
//! internal directory under generated unique names, captures a
//! modification-time fingerprint at store time, and restores content back
//! over the working tree on checkout. It never interprets file content and
//! performs no deduplication: every store operation produces a fresh blob.
//!
//! Name generation is a capability, not a policy of this crate: callers
//! supply a [`BlobNamer`] (in practice the repository's id allocator) so
//! that the id authority stays in one place and tests can substitute their
//! own source of names.

pub mod blob;
pub mod error;
pub mod store;

pub use blob::Blob;
pub use error::{StoreError, StoreResult};
pub use store::{BlobNamer, BlobStore};
