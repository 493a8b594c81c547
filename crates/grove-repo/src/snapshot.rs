//! Whole-state persistence.
//!
//! The engine treats persistence as opaque: the CLI collaborator loads one
//! [`Repository`] at startup and saves it back after a mutating command.
//! [`JsonSnapshotStore`] is the shipped implementation — a single JSON
//! document inside the repository's internal directory. Nothing in the
//! snapshot format is part of the engine's contract; the trait exists so
//! tests and future formats can substitute their own.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{RepoError, RepoResult};
use crate::repository::{Repository, INTERNAL_DIR};

/// Loads and saves complete repository state.
pub trait SnapshotStore {
    fn load(&self) -> RepoResult<Repository>;
    fn save(&self, repo: &Repository) -> RepoResult<()>;
}

/// Snapshot file name inside the internal directory.
const SNAPSHOT_FILE: &str = "repository.json";

/// One JSON document holding the entire repository state.
#[derive(Clone, Debug)]
pub struct JsonSnapshotStore {
    path: PathBuf,
}

impl JsonSnapshotStore {
    /// The snapshot location for a repository rooted at `work_dir`.
    pub fn in_dir(work_dir: &Path) -> Self {
        Self {
            path: work_dir.join(INTERNAL_DIR).join(SNAPSHOT_FILE),
        }
    }

    /// The snapshot file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a snapshot exists at this location.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl SnapshotStore for JsonSnapshotStore {
    fn load(&self) -> RepoResult<Repository> {
        let bytes = fs::read(&self.path)
            .map_err(|err| RepoError::Snapshot(format!("read {}: {err}", self.path.display())))?;
        let repo = serde_json::from_slice(&bytes)
            .map_err(|err| RepoError::Snapshot(format!("parse {}: {err}", self.path.display())))?;
        debug!(path = %self.path.display(), "loaded snapshot");
        Ok(repo)
    }

    fn save(&self, repo: &Repository) -> RepoResult<()> {
        let json = serde_json::to_vec_pretty(repo)
            .map_err(|err| RepoError::Snapshot(format!("serialize: {err}")))?;
        fs::write(&self.path, json)
            .map_err(|err| RepoError::Snapshot(format!("write {}: {err}", self.path.display())))?;
        debug!(path = %self.path.display(), "saved snapshot");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::tests::fixture;

    #[test]
    fn roundtrip_preserves_full_state() {
        let mut fx = fixture();
        fx.commit_file("a.txt", "alpha", "add a");
        fx.repo.add_branch("feature").unwrap();
        // Leave something staged so staging state is covered too.
        let staged = fx.rewrite("a.txt", "alpha2");
        fx.repo.add(&staged).unwrap();

        let snapshots = JsonSnapshotStore::in_dir(fx.dir.path());
        assert!(!snapshots.exists());
        snapshots.save(&fx.repo).unwrap();
        assert!(snapshots.exists());

        let loaded = snapshots.load().unwrap();
        assert_eq!(loaded, fx.repo);
        assert_eq!(loaded.status().unwrap().staged, vec![staged]);
    }

    #[test]
    fn load_without_snapshot_fails() {
        let dir = tempfile::tempdir().unwrap();
        let snapshots = JsonSnapshotStore::in_dir(dir.path());
        assert!(matches!(
            snapshots.load().unwrap_err(),
            RepoError::Snapshot(_)
        ));
    }

    #[test]
    fn loaded_repository_keeps_working() {
        let mut fx = fixture();
        fx.commit_file("a.txt", "alpha", "add a");
        let snapshots = JsonSnapshotStore::in_dir(fx.dir.path());
        snapshots.save(&fx.repo).unwrap();

        let mut loaded = snapshots.load().unwrap();
        let id = {
            let path = fx.rewrite("a.txt", "alpha2");
            loaded.add(&path).unwrap();
            loaded.commit("edit a").unwrap()
        };
        assert_eq!(loaded.log().unwrap()[0].id, id);
    }
}
