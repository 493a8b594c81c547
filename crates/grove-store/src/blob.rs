//! Blob metadata: the manifest-facing description of one stored file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use grove_types::Fingerprint;

/// An internally stored copy of a working-tree file.
///
/// Identity for manifest membership is the absolute path; change detection
/// is fingerprint equality. The stored name is only meaningful to the
/// [`BlobStore`](crate::BlobStore) that produced it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blob {
    /// The path exactly as the user gave it when staging.
    pub original_path: PathBuf,
    /// Absolute form of `original_path`; the manifest key.
    pub absolute_path: PathBuf,
    /// Unique generated name of the copy inside the blob directory.
    pub stored_name: String,
    /// Modification time of the source file, captured at store time.
    pub fingerprint: Fingerprint,
}

impl Blob {
    /// The path a merge conflict copy of this blob is written to:
    /// the absolute path with `.conflicted` appended.
    pub fn conflicted_path(&self) -> PathBuf {
        let mut name = self.absolute_path.clone().into_os_string();
        name.push(".conflicted");
        PathBuf::from(name)
    }

    /// Whether this blob tracks the given absolute path.
    pub fn tracks(&self, absolute: &Path) -> bool {
        self.absolute_path == absolute
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::UNIX_EPOCH;

    fn blob(abs: &str) -> Blob {
        Blob {
            original_path: PathBuf::from(abs),
            absolute_path: PathBuf::from(abs),
            stored_name: "blob-1.1".into(),
            fingerprint: Fingerprint::from_mtime(UNIX_EPOCH),
        }
    }

    #[test]
    fn conflicted_path_appends_suffix() {
        let b = blob("/work/a.txt");
        assert_eq!(b.conflicted_path(), PathBuf::from("/work/a.txt.conflicted"));
    }

    #[test]
    fn tracks_compares_absolute_path() {
        let b = blob("/work/a.txt");
        assert!(b.tracks(Path::new("/work/a.txt")));
        assert!(!b.tracks(Path::new("/work/b.txt")));
    }

    #[test]
    fn serde_roundtrip() {
        let b = blob("/work/a.txt");
        let json = serde_json::to_string(&b).unwrap();
        let parsed: Blob = serde_json::from_str(&json).unwrap();
        assert_eq!(b, parsed);
    }
}
