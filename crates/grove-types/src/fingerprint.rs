//! File fingerprints: modification time as a change proxy.
//!
//! Grove detects changes by comparing the source file's modification time
//! captured when the file was last stored against the current on-disk
//! modification time. No content hashing is involved: two different contents
//! with equal timestamps compare as unchanged, and identical content with a
//! newer timestamp compares as modified. Staging and merge-conflict
//! detection both depend on this exact behavior.

use std::fmt;
use std::io;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// The captured modification time of a file at stage time.
///
/// Equality is the whole contract: two fingerprints are the same change
/// state if and only if their timestamps are equal.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Fingerprint(SystemTime);

impl Fingerprint {
    /// Wrap an already-known modification time.
    pub fn from_mtime(mtime: SystemTime) -> Self {
        Self(mtime)
    }

    /// Capture the current modification time of the file at `path`.
    pub fn of(path: &Path) -> io::Result<Self> {
        Ok(Self(std::fs::metadata(path)?.modified()?))
    }

    /// The underlying modification time.
    pub fn mtime(self) -> SystemTime {
        self.0
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.duration_since(UNIX_EPOCH) {
            Ok(d) => write!(f, "Fingerprint({}.{:09}s)", d.as_secs(), d.subsec_nanos()),
            Err(_) => write!(f, "Fingerprint(pre-epoch)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;

    #[test]
    fn equal_mtimes_are_equal_fingerprints() {
        let t = SystemTime::now();
        assert_eq!(Fingerprint::from_mtime(t), Fingerprint::from_mtime(t));
    }

    #[test]
    fn differing_mtimes_differ() {
        let t = SystemTime::now();
        let earlier = t - Duration::from_secs(5);
        assert_ne!(Fingerprint::from_mtime(t), Fingerprint::from_mtime(earlier));
    }

    #[test]
    fn captures_file_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, "hello").unwrap();
        let fp = Fingerprint::of(&file).unwrap();
        let mtime = fs::metadata(&file).unwrap().modified().unwrap();
        assert_eq!(fp, Fingerprint::from_mtime(mtime));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Fingerprint::of(&dir.path().join("nope")).is_err());
    }

    #[test]
    fn serde_roundtrip() {
        let fp = Fingerprint::from_mtime(UNIX_EPOCH + Duration::from_secs(1_700_000_000));
        let json = serde_json::to_string(&fp).unwrap();
        let parsed: Fingerprint = serde_json::from_str(&json).unwrap();
        assert_eq!(fp, parsed);
    }
}
