//! The commit graph arena: id-indexed ownership of every recorded commit.
//!
//! Commits reference their parents by [`CommitId`], so traversal is
//! iterative table lookup — no owning pointers between commits, no
//! recursion over long histories. Only *real* commits live here: a
//! branch's in-progress commit joins the arena when it is finalized, and
//! manifest views for computation come from the pure
//! [`materialize`](CommitGraph::materialize) function rather than from
//! disposable graph nodes.
//!
//! # Invariants
//!
//! - Every recorded commit's parent id, when present, resolves to an
//!   earlier recorded commit.
//! - Per-branch histories are simple chains; no merge commits exist, so
//!   every pair of branches shares the initial commit as a common ancestor.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use grove_types::CommitId;

use crate::commit::{Commit, Manifest};
use crate::error::{DagError, DagResult};

/// Owns all recorded commits, keyed by id, with a by-message index for
/// `find`. Duplicate messages are allowed; insertion order is preserved.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitGraph {
    commits: BTreeMap<CommitId, Commit>,
    by_message: BTreeMap<String, Vec<CommitId>>,
}

impl CommitGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded commits.
    pub fn len(&self) -> usize {
        self.commits.len()
    }

    /// Returns `true` if no commit has been recorded.
    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    // ---------------------------------------------------------------
    // Recording and lookup
    // ---------------------------------------------------------------

    /// Record a finalized commit in both indices.
    ///
    /// The by-id index is overwrite-safe; the by-message index appends,
    /// creating the entry if absent.
    pub fn record(&mut self, commit: Commit) {
        debug!(id = %commit.id, message = %commit.message, "recorded commit");
        self.by_message
            .entry(commit.message.clone())
            .or_default()
            .push(commit.id);
        self.commits.insert(commit.id, commit);
    }

    /// Retrieve a commit by id.
    pub fn get(&self, id: CommitId) -> Option<&Commit> {
        self.commits.get(&id)
    }

    /// Mutable access to a commit, for merge's manifest splicing.
    pub fn get_mut(&mut self, id: CommitId) -> Option<&mut Commit> {
        self.commits.get_mut(&id)
    }

    /// Like [`get`](Self::get) but failing with `CommitNotFound`.
    pub fn require(&self, id: CommitId) -> DagResult<&Commit> {
        self.get(id).ok_or(DagError::CommitNotFound(id))
    }

    /// All recorded commits in ascending id order.
    pub fn commits(&self) -> impl Iterator<Item = &Commit> {
        self.commits.values()
    }

    /// The ids of all commits with exactly this message, insertion order.
    pub fn ids_by_message(&self, message: &str) -> Option<&[CommitId]> {
        self.by_message.get(message).map(Vec::as_slice)
    }

    // ---------------------------------------------------------------
    // Traversal
    // ---------------------------------------------------------------

    /// The ids along the single-parent chain from `head` to the root,
    /// inclusive of `head` itself.
    pub fn ancestor_ids(&self, head: CommitId) -> BTreeSet<CommitId> {
        let mut ids = BTreeSet::new();
        let mut cursor = Some(head);
        while let Some(id) = cursor {
            if !ids.insert(id) {
                break;
            }
            cursor = self.get(id).and_then(|c| c.parent);
        }
        ids
    }

    /// The chain from `head` to the root, newest first.
    pub fn chain(&self, head: CommitId) -> Vec<&Commit> {
        let mut out = Vec::new();
        let mut cursor = Some(head);
        while let Some(id) = cursor {
            match self.get(id) {
                Some(commit) => {
                    out.push(commit);
                    cursor = commit.parent;
                }
                None => break,
            }
        }
        out
    }

    // ---------------------------------------------------------------
    // Pure manifest computation
    // ---------------------------------------------------------------

    /// The effective manifest of a recorded commit.
    ///
    /// This replaces the original design's scratch commits: no graph node
    /// is allocated purely to obtain a view.
    pub fn materialize(&self, id: CommitId) -> DagResult<Manifest> {
        Ok(self.require(id)?.effective())
    }

    /// Paths present in both commits' manifests whose fingerprints differ,
    /// mapped to `other`'s blob. Paths absent from either side are
    /// excluded — additions and deletions are not modifications.
    pub fn modified_between(&self, base: CommitId, other: CommitId) -> DagResult<Manifest> {
        let base_view = self.materialize(base)?;
        let other_view = self.materialize(other)?;
        let mut modified = Manifest::new();
        for (path, base_blob) in &base_view {
            if let Some(other_blob) = other_view.get(path) {
                if other_blob.fingerprint != base_blob.fingerprint {
                    modified.insert(path.clone(), other_blob.clone());
                }
            }
        }
        Ok(modified)
    }

    /// Paths in `head`'s manifest that did not exist at `base` — the
    /// newly-added side of rebase propagation.
    pub fn added_since(&self, base: CommitId, head: CommitId) -> DagResult<Manifest> {
        let base_view = self.materialize(base)?;
        let head_view = self.materialize(head)?;
        let mut added = Manifest::new();
        for (path, blob) in head_view {
            if !base_view.contains_key(&path) {
                added.insert(path, blob);
            }
        }
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grove_store::Blob;
    use grove_types::Fingerprint;
    use std::path::{Path, PathBuf};
    use std::time::{Duration, UNIX_EPOCH};

    fn blob(abs: &str, secs: u64) -> Blob {
        Blob {
            original_path: PathBuf::from(abs),
            absolute_path: PathBuf::from(abs),
            stored_name: format!("blob-{secs}.0"),
            fingerprint: Fingerprint::from_mtime(UNIX_EPOCH + Duration::from_secs(secs)),
        }
    }

    /// A recorded commit with the given parent and spliced manifest.
    fn seed(
        graph: &mut CommitGraph,
        id: u64,
        parent: Option<u64>,
        message: &str,
        blobs: &[(&str, u64)],
    ) {
        let mut commit = match parent {
            Some(pid) => {
                let parent = graph.get(CommitId(pid)).unwrap().clone();
                let mut c = Commit::child_of(&parent, CommitId(id));
                c.message = message.to_string();
                c
            }
            None => Commit::root(CommitId(id), message),
        };
        for (path, secs) in blobs {
            commit.splice_blob(blob(path, *secs));
        }
        graph.record(commit);
    }

    #[test]
    fn record_indexes_by_id_and_message() {
        let mut graph = CommitGraph::new();
        seed(&mut graph, 1, None, "initial commit", &[]);
        seed(&mut graph, 2, Some(1), "work", &[]);
        seed(&mut graph, 3, Some(2), "work", &[]);

        assert_eq!(graph.len(), 3);
        assert!(graph.get(CommitId(2)).is_some());
        assert_eq!(
            graph.ids_by_message("work"),
            Some(&[CommitId(2), CommitId(3)][..])
        );
        assert_eq!(graph.ids_by_message("absent"), None);
    }

    #[test]
    fn require_unknown_id_fails() {
        let graph = CommitGraph::new();
        assert!(matches!(
            graph.require(CommitId(5)).unwrap_err(),
            DagError::CommitNotFound(CommitId(5))
        ));
    }

    #[test]
    fn ancestor_ids_include_head_and_root() {
        let mut graph = CommitGraph::new();
        seed(&mut graph, 1, None, "initial commit", &[]);
        seed(&mut graph, 2, Some(1), "a", &[]);
        seed(&mut graph, 3, Some(2), "b", &[]);

        let ids = graph.ancestor_ids(CommitId(3));
        assert_eq!(
            ids.into_iter().collect::<Vec<_>>(),
            vec![CommitId(1), CommitId(2), CommitId(3)]
        );
    }

    #[test]
    fn chain_is_newest_first() {
        let mut graph = CommitGraph::new();
        seed(&mut graph, 1, None, "initial commit", &[]);
        seed(&mut graph, 2, Some(1), "a", &[]);
        seed(&mut graph, 3, Some(2), "b", &[]);

        let chain: Vec<_> = graph.chain(CommitId(3)).iter().map(|c| c.id).collect();
        assert_eq!(chain, vec![CommitId(3), CommitId(2), CommitId(1)]);
    }

    #[test]
    fn materialize_is_the_effective_view() {
        let mut graph = CommitGraph::new();
        seed(&mut graph, 1, None, "initial commit", &[("/w/a", 1)]);
        seed(&mut graph, 2, Some(1), "edit", &[("/w/a", 5), ("/w/b", 2)]);

        let view = graph.materialize(CommitId(2)).unwrap();
        assert_eq!(view.len(), 2);
        assert_eq!(
            view.get(Path::new("/w/a")).unwrap().fingerprint,
            Fingerprint::from_mtime(UNIX_EPOCH + Duration::from_secs(5))
        );
        assert!(matches!(
            graph.materialize(CommitId(9)).unwrap_err(),
            DagError::CommitNotFound(_)
        ));
    }

    #[test]
    fn modified_between_requires_presence_on_both_sides() {
        let mut graph = CommitGraph::new();
        seed(&mut graph, 1, None, "initial commit", &[("/w/a", 1), ("/w/c", 3)]);
        // "a" modified, "b" newly added, "c" untouched.
        seed(&mut graph, 2, Some(1), "edit", &[("/w/a", 7), ("/w/b", 2)]);

        let modified = graph.modified_between(CommitId(1), CommitId(2)).unwrap();
        assert_eq!(modified.len(), 1);
        assert_eq!(
            modified.get(Path::new("/w/a")).unwrap().fingerprint,
            Fingerprint::from_mtime(UNIX_EPOCH + Duration::from_secs(7))
        );
    }

    #[test]
    fn added_since_reports_only_new_paths() {
        let mut graph = CommitGraph::new();
        seed(&mut graph, 1, None, "initial commit", &[("/w/a", 1)]);
        seed(&mut graph, 2, Some(1), "add b", &[("/w/a", 9), ("/w/b", 2)]);

        let added = graph.added_since(CommitId(1), CommitId(2)).unwrap();
        assert_eq!(added.len(), 1);
        assert!(added.contains_key(Path::new("/w/b")));
    }
}
