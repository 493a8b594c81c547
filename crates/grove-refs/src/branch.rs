//! The branch: a named head pointer plus its staging area.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use grove_dag::{Commit, CommitGraph, DagError, DagResult};
use grove_store::BlobStore;
use grove_types::{CommitId, IdAllocator};

/// A named, mutable pointer to a head commit.
///
/// Staging is lazy: the in-progress commit is created from the current
/// head (with a freshly allocated id) the first time something is staged,
/// and discarded when the staged changes are committed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    name: String,
    head: CommitId,
    in_progress: Option<Commit>,
}

impl Branch {
    /// Create a branch pointing at `head`.
    pub fn new(name: &str, head: CommitId) -> Self {
        Self {
            name: name.to_string(),
            head,
            in_progress: None,
        }
    }

    /// The branch name, unique within a repository.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The id of the head commit.
    pub fn head(&self) -> CommitId {
        self.head
    }

    /// Move the head pointer. Used by reset, merge fast paths, and rebase;
    /// any in-progress staging is left alone.
    pub fn set_head(&mut self, head: CommitId) {
        debug!(branch = %self.name, %head, "moved branch head");
        self.head = head;
    }

    // ---------------------------------------------------------------
    // Staging
    // ---------------------------------------------------------------

    /// Stage `path` for addition, creating the in-progress commit from the
    /// current head if none exists yet.
    pub fn stage_add(
        &mut self,
        path: &Path,
        graph: &CommitGraph,
        ids: &mut IdAllocator,
    ) -> DagResult<()> {
        self.staging_commit(graph, ids)?.stage_add(path)
    }

    /// Stage `path` for removal, creating the in-progress commit from the
    /// current head if none exists yet.
    pub fn stage_remove(
        &mut self,
        path: &Path,
        graph: &CommitGraph,
        ids: &mut IdAllocator,
    ) -> DagResult<()> {
        self.staging_commit(graph, ids)?.stage_remove(path)
    }

    fn staging_commit(
        &mut self,
        graph: &CommitGraph,
        ids: &mut IdAllocator,
    ) -> DagResult<&mut Commit> {
        let commit = match self.in_progress.take() {
            Some(in_progress) => in_progress,
            None => Commit::child_of(graph.require(self.head)?, ids.next_commit_id()),
        };
        Ok(self.in_progress.insert(commit))
    }

    /// Finalize the in-progress commit, advance the head, and record the
    /// new commit in the graph. Returns the new head id.
    ///
    /// Fails with [`NothingStaged`](DagError::NothingStaged) when no
    /// commit is in progress or its pending sets are empty; in both cases
    /// the branch is left exactly as it was.
    pub fn commit(
        &mut self,
        message: &str,
        graph: &mut CommitGraph,
        store: &BlobStore,
        ids: &mut IdAllocator,
    ) -> DagResult<CommitId> {
        let mut commit = self.in_progress.take().ok_or(DagError::NothingStaged)?;
        match commit.finalize(message, store, ids) {
            Ok(()) => {
                let id = commit.id;
                graph.record(commit);
                self.head = id;
                debug!(branch = %self.name, %id, "committed");
                Ok(id)
            }
            Err(err) => {
                self.in_progress = Some(commit);
                Err(err)
            }
        }
    }

    /// Whether a commit is in progress with staged changes.
    pub fn has_staged_changes(&self) -> bool {
        self.in_progress
            .as_ref()
            .is_some_and(Commit::has_staged_changes)
    }

    /// Paths staged for addition, as the user gave them.
    pub fn staged_paths(&self) -> Vec<&Path> {
        self.in_progress
            .as_ref()
            .map(Commit::staged_paths)
            .unwrap_or_default()
    }

    /// Paths marked for removal, as the user gave them.
    pub fn removal_paths(&self) -> Vec<&Path> {
        self.in_progress
            .as_ref()
            .map(Commit::removal_paths)
            .unwrap_or_default()
    }

    // ---------------------------------------------------------------
    // Checkout
    // ---------------------------------------------------------------

    /// Restore the head commit's full manifest to the working tree.
    /// Returns the paths that failed to restore (reported, never fatal).
    pub fn checkout(&self, graph: &CommitGraph, store: &BlobStore) -> DagResult<Vec<PathBuf>> {
        Ok(graph.require(self.head)?.checkout_all(store))
    }

    /// Restore a single path from the head commit's manifest.
    pub fn checkout_path(
        &self,
        path: &Path,
        graph: &CommitGraph,
        store: &BlobStore,
    ) -> DagResult<()> {
        graph.require(self.head)?.checkout_one(path, store)
    }

    // ---------------------------------------------------------------
    // History
    // ---------------------------------------------------------------

    /// Whether `other`'s head is a *strict* ancestor of this branch's head.
    ///
    /// The walk starts at this head's parent: the head's own id is never
    /// compared, so two branches pointing at the same commit are not in
    /// each other's history. The merge and rebase algorithms rely on this
    /// asymmetry.
    pub fn in_history(&self, other: &Branch, graph: &CommitGraph) -> bool {
        let mut cursor = graph.get(self.head).and_then(|c| c.parent);
        while let Some(id) = cursor {
            if id == other.head {
                return true;
            }
            cursor = graph.get(id).and_then(|c| c.parent);
        }
        false
    }
}
