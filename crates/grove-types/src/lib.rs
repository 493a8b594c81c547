//! Foundation types for Grove.
//!
//! This crate provides the identifier and fingerprint types used throughout
//! the Grove engine. Every other Grove crate depends on `grove-types`.
//!
//! # Key Types
//!
//! - [`CommitId`] — Monotonic integer commit identifier, never reused
//! - [`BlobId`] — Monotonic integer blob identifier, never reused
//! - [`IdAllocator`] — Repository-owned counters behind both id kinds
//! - [`Fingerprint`] — Modification-time proxy used for change detection

pub mod fingerprint;
pub mod ids;

pub use fingerprint::Fingerprint;
pub use ids::{BlobId, CommitId, IdAllocator};
