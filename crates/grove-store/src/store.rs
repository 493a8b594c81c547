//! The directory-backed blob store.
//!
//! Blobs live as flat files directly under the store's root directory (the
//! repository's internal directory). The store itself is just the root path;
//! all state that matters — which blob corresponds to which manifest entry —
//! lives in [`Blob`] records owned by commits.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use grove_types::{Fingerprint, IdAllocator};

use crate::blob::Blob;
use crate::error::{StoreError, StoreResult};

/// A source of unique blob names.
///
/// Injected into [`BlobStore::store`] so the repository — the single id
/// authority — decides what names look like, and so tests can substitute a
/// scripted namer. A namer must never return the same name twice for one
/// repository.
pub trait BlobNamer {
    /// Produce a fresh unique name. `suffix` is appended after a dot;
    /// Grove passes the staging commit's id.
    fn unique_blob_name(&mut self, suffix: &str) -> String;
}

/// The repository's id allocator is the canonical namer: names are
/// `blob-<n>.<suffix>` with `n` drawn from the monotonic blob counter.
impl BlobNamer for IdAllocator {
    fn unique_blob_name(&mut self, suffix: &str) -> String {
        format!("blob-{}.{}", self.next_blob_id(), suffix)
    }
}

/// Copies working-tree content into the repository's internal directory
/// and back out again.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    /// Create a store rooted at `root`. The directory is not touched until
    /// [`init`](Self::init) or the first [`store`](Self::store).
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// The store's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the blob directory if it does not exist yet.
    pub fn init(&self) -> StoreResult<()> {
        fs::create_dir_all(&self.root).map_err(|source| StoreError::Init {
            path: self.root.clone(),
            source,
        })
    }

    /// Copy the current content of `path` into the store under a name drawn
    /// from `namer`, capturing the source's modification time as the blob's
    /// fingerprint.
    ///
    /// On failure nothing is recorded: the caller must not add the path to
    /// any manifest.
    pub fn store(
        &self,
        path: &Path,
        namer: &mut dyn BlobNamer,
        suffix: &str,
    ) -> StoreResult<Blob> {
        let absolute_path = std::path::absolute(path).map_err(|source| StoreError::Resolve {
            path: path.to_path_buf(),
            source,
        })?;
        let stored_name = namer.unique_blob_name(suffix);
        let store_err = |source| StoreError::Store {
            path: path.to_path_buf(),
            source,
        };
        fs::copy(path, self.root.join(&stored_name)).map_err(store_err)?;
        let fingerprint = Fingerprint::of(path).map_err(store_err)?;
        debug!(path = %absolute_path.display(), name = %stored_name, "stored blob");
        Ok(Blob {
            original_path: path.to_path_buf(),
            absolute_path,
            stored_name,
            fingerprint,
        })
    }

    /// Copy stored content back over the blob's path, overwriting whatever
    /// is there.
    pub fn restore(&self, blob: &Blob) -> StoreResult<()> {
        self.copy_out(blob, &blob.absolute_path)
    }

    /// Copy stored content to the blob's path with `.conflicted` appended,
    /// leaving the original file untouched. Used by merge when both sides
    /// diverged from the ancestor.
    pub fn restore_conflicted(&self, blob: &Blob) -> StoreResult<()> {
        self.copy_out(blob, &blob.conflicted_path())
    }

    fn copy_out(&self, blob: &Blob, dest: &Path) -> StoreResult<()> {
        fs::copy(self.root.join(&blob.stored_name), dest).map_err(|source| {
            StoreError::Restore {
                path: dest.to_path_buf(),
                source,
            }
        })?;
        debug!(path = %dest.display(), name = %blob.stored_name, "restored blob");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (tempfile::TempDir, BlobStore, IdAllocator) {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::new(dir.path().join(".grove"));
        store.init().unwrap();
        (dir, store, IdAllocator::new())
    }

    #[test]
    fn store_copies_content_and_captures_fingerprint() {
        let (dir, store, mut ids) = fixture();
        let file = dir.path().join("a.txt");
        fs::write(&file, "alpha").unwrap();

        let blob = store.store(&file, &mut ids, "1").unwrap();
        assert_eq!(blob.stored_name, "blob-1.1");
        assert_eq!(blob.absolute_path, file);
        assert_eq!(
            fs::read_to_string(store.root().join(&blob.stored_name)).unwrap(),
            "alpha"
        );
        assert_eq!(blob.fingerprint, Fingerprint::of(&file).unwrap());
    }

    #[test]
    fn namer_produces_distinct_names() {
        let (dir, store, mut ids) = fixture();
        let file = dir.path().join("a.txt");
        fs::write(&file, "alpha").unwrap();

        let first = store.store(&file, &mut ids, "3").unwrap();
        let second = store.store(&file, &mut ids, "3").unwrap();
        assert_ne!(first.stored_name, second.stored_name);
        assert_eq!(second.stored_name, "blob-2.3");
    }

    #[test]
    fn store_missing_source_fails() {
        let (dir, store, mut ids) = fixture();
        let err = store
            .store(&dir.path().join("absent.txt"), &mut ids, "1")
            .unwrap_err();
        assert!(matches!(err, StoreError::Store { .. }));
    }

    #[test]
    fn restore_overwrites_working_tree() {
        let (dir, store, mut ids) = fixture();
        let file = dir.path().join("a.txt");
        fs::write(&file, "v1").unwrap();
        let blob = store.store(&file, &mut ids, "1").unwrap();

        fs::write(&file, "v2 scribbled over").unwrap();
        store.restore(&blob).unwrap();
        assert_eq!(fs::read_to_string(&file).unwrap(), "v1");
    }

    #[test]
    fn restore_conflicted_leaves_original_alone() {
        let (dir, store, mut ids) = fixture();
        let file = dir.path().join("a.txt");
        fs::write(&file, "theirs").unwrap();
        let blob = store.store(&file, &mut ids, "1").unwrap();

        fs::write(&file, "ours").unwrap();
        store.restore_conflicted(&blob).unwrap();
        assert_eq!(fs::read_to_string(&file).unwrap(), "ours");
        assert_eq!(
            fs::read_to_string(dir.path().join("a.txt.conflicted")).unwrap(),
            "theirs"
        );
    }

    #[test]
    fn restore_missing_blob_fails() {
        let (dir, store, _) = fixture();
        let blob = Blob {
            original_path: dir.path().join("a.txt"),
            absolute_path: dir.path().join("a.txt"),
            stored_name: "blob-99.1".into(),
            fingerprint: Fingerprint::from_mtime(std::time::UNIX_EPOCH),
        };
        assert!(matches!(
            store.restore(&blob).unwrap_err(),
            StoreError::Restore { .. }
        ));
    }
}
