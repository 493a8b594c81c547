//! The commit: a manifest of tracked files plus, while in progress, a
//! staging area of pending additions and removals.
//!
//! # Manifest model
//!
//! Three path-keyed sets describe a commit's view of the working tree:
//!
//! - `inherited` — the flattened, already-resolved view copied from the
//!   parent at construction time,
//! - `added` — blobs finalized in this commit,
//! - `removed` — paths deleted in this commit.
//!
//! The effective view is `(inherited ∪ added) \ removed`, with `added`
//! shadowing `inherited` per path. Because `inherited` is materialized
//! eagerly, the effective view never requires walking the parent chain.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use grove_store::{Blob, BlobNamer, BlobStore};
use grove_types::{CommitId, Fingerprint};

/// A materialized manifest: absolute path to the blob tracking it.
pub type Manifest = BTreeMap<PathBuf, Blob>;

/// Pending additions and removals, attached to a commit while it is in
/// progress and discarded at finalize. Both maps key by absolute path and
/// keep the path as the user gave it as the value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
struct Staging {
    pending_add: BTreeMap<PathBuf, PathBuf>,
    pending_remove: BTreeMap<PathBuf, PathBuf>,
}

impl Staging {
    fn is_empty(&self) -> bool {
        self.pending_add.is_empty() && self.pending_remove.is_empty()
    }
}

/// One commit in the graph.
///
/// Immutable once finalized, with two sanctioned exceptions: merge and
/// rebase may splice blobs into the manifest and retract pending removals
/// (see [`splice_blob`](Self::splice_blob) and
/// [`retract_removal`](Self::retract_removal)).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Strictly increasing id, assigned at construction, never reused.
    pub id: CommitId,
    /// Commit message; empty until finalized.
    pub message: String,
    /// Set at construction, refreshed at finalize.
    pub timestamp: DateTime<Utc>,
    /// Arena reference to the parent; `None` only for the initial commit
    /// and for freshly replayed commits awaiting re-parenting.
    pub parent: Option<CommitId>,
    inherited: Manifest,
    added: Manifest,
    removed: BTreeSet<PathBuf>,
    staging: Staging,
}

impl Commit {
    /// The repository's initial commit: no parent, empty manifest.
    pub fn root(id: CommitId, message: &str) -> Self {
        Self {
            id,
            message: message.to_string(),
            timestamp: Utc::now(),
            parent: None,
            inherited: Manifest::new(),
            added: Manifest::new(),
            removed: BTreeSet::new(),
            staging: Staging::default(),
        }
    }

    /// A child of `parent`: copies the parent's effective manifest as this
    /// commit's `inherited` set; `added` and `removed` start empty.
    pub fn child_of(parent: &Commit, id: CommitId) -> Self {
        Self {
            id,
            message: String::new(),
            timestamp: Utc::now(),
            parent: Some(parent.id),
            inherited: parent.effective(),
            added: Manifest::new(),
            removed: BTreeSet::new(),
            staging: Staging::default(),
        }
    }

    // ---------------------------------------------------------------
    // Manifest views
    // ---------------------------------------------------------------

    /// The effective manifest: `(inherited ∪ added) \ removed`.
    pub fn effective(&self) -> Manifest {
        let mut view = self.inherited.clone();
        for (path, blob) in &self.added {
            view.insert(path.clone(), blob.clone());
        }
        for path in &self.removed {
            view.remove(path);
        }
        view
    }

    /// The blob tracking `absolute` in the effective manifest, if any.
    pub fn effective_blob(&self, absolute: &Path) -> Option<&Blob> {
        if self.removed.contains(absolute) {
            return None;
        }
        self.added
            .get(absolute)
            .or_else(|| self.inherited.get(absolute))
    }

    /// The inherited set (the parent chain's resolved view).
    pub fn inherited(&self) -> &Manifest {
        &self.inherited
    }

    /// Blobs finalized in this commit.
    pub fn added(&self) -> &Manifest {
        &self.added
    }

    /// Paths deleted in this commit.
    pub fn removed(&self) -> &BTreeSet<PathBuf> {
        &self.removed
    }

    // ---------------------------------------------------------------
    // Staging
    // ---------------------------------------------------------------

    /// Stage `path` for addition.
    ///
    /// Fails with [`UnmodifiedFile`](crate::DagError::UnmodifiedFile) when
    /// the on-disk fingerprint equals the one already tracked for the path
    /// — in that case nothing is staged and no state changes. Fingerprints
    /// are modification times, not content hashes: a touched file with
    /// identical bytes counts as modified.
    pub fn stage_add(&mut self, path: &Path) -> crate::DagResult<()> {
        let absolute = resolve(path)?;
        if let Some(tracked) = self.effective_blob(&absolute) {
            if let Ok(current) = Fingerprint::of(&absolute) {
                if current == tracked.fingerprint {
                    return Err(crate::DagError::UnmodifiedFile {
                        path: path.to_path_buf(),
                    });
                }
            }
        }
        self.staging.pending_remove.remove(&absolute);
        self.staging.pending_add.insert(absolute, path.to_path_buf());
        Ok(())
    }

    /// Stage `path` for removal.
    ///
    /// Only paths present in the effective manifest are marked; the pending
    /// addition for the path is cleared unconditionally, so add-then-remove
    /// nets to nothing staged.
    pub fn stage_remove(&mut self, path: &Path) -> crate::DagResult<()> {
        let absolute = resolve(path)?;
        if self.effective_blob(&absolute).is_some() {
            self.staging
                .pending_remove
                .insert(absolute.clone(), path.to_path_buf());
        }
        self.staging.pending_add.remove(&absolute);
        Ok(())
    }

    /// Whether any addition or removal is pending.
    pub fn has_staged_changes(&self) -> bool {
        !self.staging.is_empty()
    }

    /// Paths staged for addition, as the user gave them.
    pub fn staged_paths(&self) -> Vec<&Path> {
        self.staging.pending_add.values().map(PathBuf::as_path).collect()
    }

    /// Paths marked for removal, as the user gave them.
    pub fn removal_paths(&self) -> Vec<&Path> {
        self.staging
            .pending_remove
            .values()
            .map(PathBuf::as_path)
            .collect()
    }

    /// Finalize the commit: persist every pending addition through the blob
    /// store, append pending removals to `removed`, set the message, and
    /// refresh the timestamp.
    ///
    /// Fails with [`NothingStaged`](crate::DagError::NothingStaged) when
    /// both pending sets are empty. A blob that fails to store is reported
    /// and excluded from the manifest; blobs already copied by the time a
    /// later one fails stay in storage — that is a documented gap, not a
    /// guarantee.
    pub fn finalize(
        &mut self,
        message: &str,
        store: &BlobStore,
        namer: &mut dyn BlobNamer,
    ) -> crate::DagResult<()> {
        if self.staging.is_empty() {
            return Err(crate::DagError::NothingStaged);
        }
        let staging = std::mem::take(&mut self.staging);
        let suffix = self.id.to_string();
        for (absolute, given) in staging.pending_add {
            match store.store(&given, namer, &suffix) {
                Ok(blob) => {
                    self.added.insert(blob.absolute_path.clone(), blob);
                }
                Err(err) => {
                    warn!(path = %absolute.display(), error = %err, "excluding blob that failed to store");
                }
            }
        }
        for absolute in staging.pending_remove.into_keys() {
            self.removed.insert(absolute);
        }
        self.message = message.to_string();
        self.timestamp = Utc::now();
        debug!(id = %self.id, added = self.added.len(), removed = self.removed.len(), "finalized commit");
        Ok(())
    }

    // ---------------------------------------------------------------
    // Working-tree restore
    // ---------------------------------------------------------------

    /// Restore every entry of the effective manifest to the working tree.
    ///
    /// Per-file store failures are reported and returned, never fatal.
    pub fn checkout_all(&self, store: &BlobStore) -> Vec<PathBuf> {
        let mut failed = Vec::new();
        for blob in self.effective().values() {
            if let Err(err) = store.restore(blob) {
                warn!(path = %blob.absolute_path.display(), error = %err, "failed to restore file");
                failed.push(blob.absolute_path.clone());
            }
        }
        failed
    }

    /// Restore a single path from the effective manifest.
    ///
    /// Fails with [`FileNotFound`](crate::DagError::FileNotFound) when the
    /// path is not tracked by this commit.
    pub fn checkout_one(&self, path: &Path, store: &BlobStore) -> crate::DagResult<()> {
        let absolute = resolve(path)?;
        let blob = self
            .effective_blob(&absolute)
            .ok_or_else(|| crate::DagError::FileNotFound {
                path: path.to_path_buf(),
            })?;
        if let Err(err) = store.restore(blob) {
            warn!(path = %absolute.display(), error = %err, "failed to restore file");
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // Merge / rebase support
    // ---------------------------------------------------------------

    /// Splice a blob from another branch into this commit's manifest,
    /// replacing any previous entry for the same path. Used by merge and by
    /// rebase propagation.
    pub fn splice_blob(&mut self, blob: Blob) {
        self.inherited.insert(blob.absolute_path.clone(), blob);
    }

    /// Un-mark a path scheduled for deletion in this commit, if it was.
    pub fn retract_removal(&mut self, absolute: &Path) {
        self.removed.remove(absolute);
    }

    /// A structural copy for rebase replay: same message and manifest
    /// contents under a fresh id and timestamp, with a detached parent.
    /// The caller re-parents it onto the rebase's running head.
    pub fn replay(&self, new_id: CommitId) -> Self {
        Self {
            id: new_id,
            message: self.message.clone(),
            timestamp: Utc::now(),
            parent: None,
            inherited: self.inherited.clone(),
            added: self.added.clone(),
            removed: self.removed.clone(),
            staging: Staging::default(),
        }
    }
}

fn resolve(path: &Path) -> crate::DagResult<PathBuf> {
    std::path::absolute(path).map_err(|source| crate::DagError::Resolve {
        path: path.to_path_buf(),
        source,
    })
}
