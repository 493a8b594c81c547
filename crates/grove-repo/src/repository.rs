//! The repository object and the basic engine commands.
//!
//! One [`Repository`] instance exclusively owns its storage location: the
//! blob directory and the commit indices must never be shared by two live
//! instances. The engine is single-threaded and synchronous; every command
//! mutates the in-memory state and relies on the caller to persist it
//! afterwards via [`SnapshotStore`](crate::SnapshotStore).

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use grove_dag::{Commit, CommitGraph, DagError};
use grove_refs::Branch;
use grove_store::BlobStore;
use grove_types::{CommitId, IdAllocator};

use crate::error::{RepoError, RepoResult};

/// Internal directory name under the working directory root.
pub const INTERNAL_DIR: &str = ".grove";

/// The name and message of the automatically created first commit.
const INITIAL_BRANCH: &str = "master";
const INITIAL_MESSAGE: &str = "initial commit";

/// A single-user local repository: id authority, branch registry, commit
/// graph, and blob store.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub(crate) work_dir: PathBuf,
    pub(crate) ids: IdAllocator,
    pub(crate) branches: Vec<Branch>,
    pub(crate) current: String,
    pub(crate) graph: CommitGraph,
    pub(crate) store: BlobStore,
}

/// What a name-based checkout ended up doing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Checkout {
    /// The name was the current branch; nothing to do.
    AlreadyCurrent,
    /// Switched to the named branch; `failed` lists files that could not
    /// be restored (reported, not fatal).
    Branch { name: String, failed: Vec<PathBuf> },
    /// The name matched no branch and was restored as a file from the
    /// current branch's head.
    File(PathBuf),
}

/// One commit, summarized for log output and rebase prompts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CommitSummary {
    pub id: CommitId,
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

impl From<&Commit> for CommitSummary {
    fn from(commit: &Commit) -> Self {
        Self {
            id: commit.id,
            timestamp: commit.timestamp,
            message: commit.message.clone(),
        }
    }
}

/// The `status` report: branches with the current one flagged, plus the
/// current branch's staging state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    /// Branch names in registration order, paired with the current flag.
    pub branches: Vec<(String, bool)>,
    /// Paths staged for addition, as the user gave them.
    pub staged: Vec<PathBuf>,
    /// Paths marked for removal, as the user gave them.
    pub marked_for_removal: Vec<PathBuf>,
}

impl Repository {
    /// Initialize a repository rooted at `work_dir`: creates the internal
    /// directory, the initial commit, and the `master` branch.
    pub fn init(work_dir: &Path) -> RepoResult<Self> {
        let store = BlobStore::new(work_dir.join(INTERNAL_DIR));
        store.init()?;

        let mut ids = IdAllocator::new();
        let mut graph = CommitGraph::new();
        let root = Commit::root(ids.next_commit_id(), INITIAL_MESSAGE);
        let head = root.id;
        graph.record(root);

        debug!(work_dir = %work_dir.display(), "initialized repository");
        Ok(Self {
            work_dir: work_dir.to_path_buf(),
            ids,
            branches: vec![Branch::new(INITIAL_BRANCH, head)],
            current: INITIAL_BRANCH.to_string(),
            graph,
            store,
        })
    }

    // ---------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------

    /// The working directory this repository tracks.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// The name of the current branch.
    pub fn current_branch(&self) -> &str {
        &self.current
    }

    /// All branches in registration order.
    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    /// The commit graph (read-only).
    pub fn graph(&self) -> &CommitGraph {
        &self.graph
    }

    pub(crate) fn graph_mut(&mut self) -> &mut CommitGraph {
        &mut self.graph
    }

    pub(crate) fn store(&self) -> &BlobStore {
        &self.store
    }

    /// Restore the indexed branch's head manifest to the working tree.
    pub(crate) fn checkout_tree(&self, index: usize) -> RepoResult<Vec<PathBuf>> {
        Ok(self.branches[index].checkout(&self.graph, &self.store)?)
    }

    pub(crate) fn branch_index(&self, name: &str) -> Option<usize> {
        self.branches.iter().position(|b| b.name() == name)
    }

    pub(crate) fn current_index(&self) -> RepoResult<usize> {
        self.branch_index(&self.current)
            .ok_or_else(|| RepoError::BranchNotFound(self.current.clone()))
    }

    // ---------------------------------------------------------------
    // Staging and committing
    // ---------------------------------------------------------------

    /// Stage `path` for addition on the current branch.
    pub fn add(&mut self, path: &Path) -> RepoResult<()> {
        let index = self.current_index()?;
        let Self {
            branches,
            graph,
            ids,
            ..
        } = self;
        branches[index].stage_add(path, graph, ids)?;
        Ok(())
    }

    /// Mark `path` for removal on the current branch.
    pub fn remove(&mut self, path: &Path) -> RepoResult<()> {
        let index = self.current_index()?;
        let Self {
            branches,
            graph,
            ids,
            ..
        } = self;
        branches[index].stage_remove(path, graph, ids)?;
        Ok(())
    }

    /// Finalize the current branch's staged changes into a new commit.
    pub fn commit(&mut self, message: &str) -> RepoResult<CommitId> {
        let index = self.current_index()?;
        let Self {
            branches,
            graph,
            store,
            ids,
            ..
        } = self;
        Ok(branches[index].commit(message, graph, store, ids)?)
    }

    // ---------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------

    /// The current branch's history, newest first.
    pub fn log(&self) -> RepoResult<Vec<CommitSummary>> {
        let index = self.current_index()?;
        Ok(self
            .graph
            .chain(self.branches[index].head())
            .into_iter()
            .map(CommitSummary::from)
            .collect())
    }

    /// Every recorded commit, in ascending id order.
    pub fn global_log(&self) -> Vec<CommitSummary> {
        self.graph.commits().map(CommitSummary::from).collect()
    }

    /// Ids of all commits with exactly this message, insertion order.
    pub fn find(&self, message: &str) -> RepoResult<Vec<CommitId>> {
        self.graph
            .ids_by_message(message)
            .map(<[CommitId]>::to_vec)
            .ok_or_else(|| RepoError::MessageNotFound(message.to_string()))
    }

    /// The current state: branch list and staging contents.
    pub fn status(&self) -> RepoResult<StatusReport> {
        let index = self.current_index()?;
        let current = &self.branches[index];
        Ok(StatusReport {
            branches: self
                .branches
                .iter()
                .map(|b| (b.name().to_string(), b.name() == self.current))
                .collect(),
            staged: current
                .staged_paths()
                .into_iter()
                .map(Path::to_path_buf)
                .collect(),
            marked_for_removal: current
                .removal_paths()
                .into_iter()
                .map(Path::to_path_buf)
                .collect(),
        })
    }

    // ---------------------------------------------------------------
    // Checkout
    // ---------------------------------------------------------------

    /// Name-based checkout: the current branch is a no-op signal, another
    /// branch switches to it on a successful full restore, and anything
    /// else falls back to restoring a single file from the current head.
    pub fn checkout(&mut self, name: &str) -> RepoResult<Checkout> {
        if name == self.current {
            return Ok(Checkout::AlreadyCurrent);
        }
        if let Some(index) = self.branch_index(name) {
            let failed = self.branches[index].checkout(&self.graph, &self.store)?;
            self.current = name.to_string();
            debug!(branch = name, "switched current branch");
            return Ok(Checkout::Branch {
                name: name.to_string(),
                failed,
            });
        }
        let index = self.current_index()?;
        let path = Path::new(name);
        match self.branches[index].checkout_path(path, &self.graph, &self.store) {
            Ok(()) => Ok(Checkout::File(path.to_path_buf())),
            Err(DagError::FileNotFound { .. }) => {
                Err(RepoError::BranchOrFileNotFound(name.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Restore a single path from the identified commit's manifest.
    pub fn checkout_file(&self, commit_id: CommitId, path: &Path) -> RepoResult<()> {
        Ok(self
            .graph
            .require(commit_id)?
            .checkout_one(path, &self.store)?)
    }

    // ---------------------------------------------------------------
    // Branch registry
    // ---------------------------------------------------------------

    /// Register a new branch pointing at the current branch's head.
    pub fn add_branch(&mut self, name: &str) -> RepoResult<()> {
        if self.branch_index(name).is_some() {
            return Err(RepoError::BranchExists(name.to_string()));
        }
        let head = self.branches[self.current_index()?].head();
        self.branches.push(Branch::new(name, head));
        debug!(branch = name, %head, "added branch");
        Ok(())
    }

    /// Remove a branch. The current branch is protected.
    pub fn remove_branch(&mut self, name: &str) -> RepoResult<()> {
        if name == self.current {
            return Err(RepoError::RemoveCurrentBranch(name.to_string()));
        }
        let index = self
            .branch_index(name)
            .ok_or_else(|| RepoError::BranchNotFound(name.to_string()))?;
        self.branches.remove(index);
        debug!(branch = name, "removed branch");
        Ok(())
    }

    // ---------------------------------------------------------------
    // Reset
    // ---------------------------------------------------------------

    /// Force the current branch's head to the identified commit and restore
    /// its manifest to the working tree.
    ///
    /// No ancestry check: any id in the global index is accepted, including
    /// commits from other branches' private history. That permissiveness is
    /// part of the contract.
    pub fn reset(&mut self, commit_id: CommitId) -> RepoResult<()> {
        self.graph.require(commit_id)?;
        let index = self.current_index()?;
        let Self {
            branches,
            graph,
            store,
            ..
        } = self;
        branches[index].set_head(commit_id);
        branches[index].checkout(graph, store)?;
        Ok(())
    }

    // ---------------------------------------------------------------
    // Shared ancestry
    // ---------------------------------------------------------------

    /// The earliest common ancestor of two heads: `first`'s full
    /// ancestor-id set, then a parent-by-parent walk from `second` until
    /// the first hit. Terminates at a unique commit because per-branch
    /// histories are simple chains sharing the initial commit.
    pub(crate) fn common_ancestor(
        &self,
        first: CommitId,
        second: CommitId,
    ) -> RepoResult<CommitId> {
        let history = self.graph.ancestor_ids(first);
        let mut cursor = Some(second);
        while let Some(id) = cursor {
            if history.contains(&id) {
                return Ok(id);
            }
            cursor = self.graph.require(id)?.parent;
        }
        // Unreachable while the shared-initial-commit invariant holds.
        Err(DagError::CommitNotFound(second).into())
    }
}
