//! Commit and blob identifiers, and the allocator that mints them.
//!
//! Ids are plain monotonic integers. They are only meaningful within the
//! repository whose [`IdAllocator`] produced them, and they are never reused
//! or reset for the lifetime of that repository. The allocator is ordinary
//! owned state — two repositories (e.g. in tests) never share counters.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a commit within one repository.
///
/// Strictly increasing across the whole repository, including across
/// branches: a commit created later always has a larger id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CommitId(pub u64);

impl CommitId {
    /// The raw integer value.
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a stored blob within one repository.
///
/// Used to derive unique internal file names in the blob store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlobId(pub u64);

impl BlobId {
    /// The raw integer value.
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The repository-owned source of commit and blob ids.
///
/// Both counters are independent and monotonic. The first id of each kind
/// is `1`; `0` is never handed out, so it can never collide with a real id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdAllocator {
    last_commit: u64,
    last_blob: u64,
}

impl IdAllocator {
    /// Create an allocator with both counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint the next commit id.
    pub fn next_commit_id(&mut self) -> CommitId {
        self.last_commit += 1;
        CommitId(self.last_commit)
    }

    /// Mint the next blob id.
    pub fn next_blob_id(&mut self) -> BlobId {
        self.last_blob += 1;
        BlobId(self.last_blob)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_ids_strictly_increase() {
        let mut ids = IdAllocator::new();
        let a = ids.next_commit_id();
        let b = ids.next_commit_id();
        let c = ids.next_commit_id();
        assert!(a < b && b < c);
        assert_eq!(a, CommitId(1));
    }

    #[test]
    fn counters_are_independent() {
        let mut ids = IdAllocator::new();
        ids.next_commit_id();
        ids.next_commit_id();
        assert_eq!(ids.next_blob_id(), BlobId(1));
        assert_eq!(ids.next_commit_id(), CommitId(3));
    }

    #[test]
    fn separate_allocators_never_collide_with_themselves() {
        let mut a = IdAllocator::new();
        let mut b = IdAllocator::new();
        assert_eq!(a.next_commit_id(), b.next_commit_id());
        a.next_commit_id();
        assert_eq!(b.next_commit_id(), CommitId(2));
    }

    #[test]
    fn serde_roundtrip() {
        let mut ids = IdAllocator::new();
        ids.next_commit_id();
        ids.next_blob_id();
        let json = serde_json::to_string(&ids).unwrap();
        let parsed: IdAllocator = serde_json::from_str(&json).unwrap();
        assert_eq!(ids, parsed);
    }

    #[test]
    fn display_is_plain_integer() {
        assert_eq!(format!("{}", CommitId(7)), "7");
        assert_eq!(format!("{}", BlobId(12)), "12");
    }
}
