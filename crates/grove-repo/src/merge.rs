//! Three-way merge at file granularity.
//!
//! Merge pulls changes from a given branch into the current branch's head
//! commit in place; it never creates a merge commit. Against the two heads'
//! common ancestor, each path falls into one of three cases:
//!
//! 1. present in the given head but absent from the current head — pulled,
//! 2. modified only on the given side — pulled,
//! 3. modified on both sides — a conflict: the given version is written
//!    next to the current file with a `.conflicted` suffix, and the
//!    current version stays in place.
//!
//! Conflicts are an outcome, not an error: the report lists them and the
//! user resolves them in the working tree.

use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{RepoError, RepoResult};
use crate::repository::Repository;

/// What a merge did: paths spliced into the current head, and paths that
/// conflicted (given-side content written as a `.conflicted` sibling).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub pulled: Vec<PathBuf>,
    pub conflicts: Vec<PathBuf>,
}

impl MergeReport {
    /// True when nothing was pulled and nothing conflicted.
    pub fn is_clean(&self) -> bool {
        self.pulled.is_empty() && self.conflicts.is_empty()
    }
}

impl Repository {
    /// Merge the named branch into the current branch.
    ///
    /// The current branch's head commit absorbs the pulled blobs directly;
    /// afterwards the working tree is restored to the (now merged) current
    /// head. The current branch stays current.
    pub fn merge(&mut self, name: &str) -> RepoResult<MergeReport> {
        if name == self.current_branch() {
            return Err(RepoError::SelfOperation { op: "merge" });
        }
        let given_index = self
            .branch_index(name)
            .ok_or_else(|| RepoError::BranchNotFound(name.to_string()))?;
        let current_index = self.current_index()?;

        let given_head = self.branches()[given_index].head();
        let current_head = self.branches()[current_index].head();
        let ancestor = self.common_ancestor(current_head, given_head)?;
        debug!(given = name, %given_head, %current_head, %ancestor, "merging");

        let graph = self.graph();
        let given_view = graph.materialize(given_head)?;
        let current_view = graph.materialize(current_head)?;
        let modified_in_given = graph.modified_between(ancestor, given_head)?;
        let modified_in_current = graph.modified_between(ancestor, current_head)?;

        let mut report = MergeReport::default();
        let mut splices = Vec::new();

        // Case 1: tracked by the given head only.
        for (path, blob) in &given_view {
            if !current_view.contains_key(path) {
                splices.push(blob.clone());
                report.pulled.push(path.clone());
            }
        }
        // Cases 2 and 3: modified on the given side.
        for (path, blob) in &modified_in_given {
            if modified_in_current.contains_key(path) {
                if let Err(err) = self.store().restore_conflicted(blob) {
                    warn!(path = %path.display(), error = %err, "failed to write conflicted copy");
                }
                report.conflicts.push(path.clone());
            } else if !report.pulled.contains(path) {
                splices.push(blob.clone());
                report.pulled.push(path.clone());
            }
        }

        if let Some(head) = self.graph_mut().get_mut(current_head) {
            for blob in splices {
                let path = blob.absolute_path.clone();
                head.splice_blob(blob);
                head.retract_removal(&path);
            }
        }

        // Settle the working tree on the merged current head. The given
        // branch's tree is restored first so a later reset back to it finds
        // its files in place.
        self.checkout_tree(given_index)?;
        self.checkout_tree(current_index)?;
        debug!(pulled = report.pulled.len(), conflicts = report.conflicts.len(), "merge finished");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::RepoError;
    use crate::repository::tests::fixture;

    #[test]
    fn merge_with_itself_fails() {
        let mut fx = fixture();
        assert!(matches!(
            fx.repo.merge("master").unwrap_err(),
            RepoError::SelfOperation { op: "merge" }
        ));
    }

    #[test]
    fn merge_unknown_branch_fails() {
        let mut fx = fixture();
        assert!(matches!(
            fx.repo.merge("ghost").unwrap_err(),
            RepoError::BranchNotFound(_)
        ));
    }

    #[test]
    fn merge_pulls_new_and_singly_modified_files() {
        let mut fx = fixture();
        fx.commit_file("a.txt", "base a", "base");
        fx.repo.add_branch("feature").unwrap();

        fx.repo.checkout("feature").unwrap();
        fx.commit_file("b.txt", "feature b", "add b");
        fx.commit_file("a.txt", "feature a", "edit a");

        fx.repo.checkout("master").unwrap();
        fx.commit_file("c.txt", "master c", "add c");

        let report = fx.repo.merge("feature").unwrap();
        let mut pulled = report.pulled.clone();
        pulled.sort();
        assert_eq!(
            pulled,
            vec![fx.dir.path().join("a.txt"), fx.dir.path().join("b.txt")]
        );
        assert!(report.conflicts.is_empty());

        // The current branch stays current; its head absorbed the blobs.
        assert_eq!(fx.repo.current_branch(), "master");
        assert_eq!(fx.read("a.txt"), "feature a");
        assert_eq!(fx.read("b.txt"), "feature b");
        assert_eq!(fx.read("c.txt"), "master c");

        let index = fx.repo.current_index().unwrap();
        let head = fx.repo.branches()[index].head();
        let view = fx.repo.graph().materialize(head).unwrap();
        assert!(view.contains_key(&fx.dir.path().join("b.txt")));
    }

    #[test]
    fn merge_writes_conflicted_sibling_for_double_edits() {
        let mut fx = fixture();
        fx.commit_file("a.txt", "base", "base");
        fx.repo.add_branch("feature").unwrap();

        fx.commit_file("a.txt", "master version", "master edit");
        fx.repo.checkout("feature").unwrap();
        fx.commit_file("a.txt", "feature version", "feature edit");

        fx.repo.checkout("master").unwrap();
        let report = fx.repo.merge("feature").unwrap();
        assert_eq!(report.conflicts, vec![fx.dir.path().join("a.txt")]);
        assert!(report.pulled.is_empty());

        // Current content untouched; the given side lands as a sibling.
        assert_eq!(fx.read("a.txt"), "master version");
        assert_eq!(fx.read("a.txt.conflicted"), "feature version");
    }

    #[test]
    fn merge_pull_overrides_current_side_removal() {
        let mut fx = fixture();
        fx.commit_file("a.txt", "base", "base");
        fx.repo.add_branch("feature").unwrap();

        // Current branch deletes the file; the given branch still tracks it.
        let path = fx.dir.path().join("a.txt");
        fx.repo.remove(&path).unwrap();
        fx.repo.commit("drop a").unwrap();

        let report = fx.repo.merge("feature").unwrap();
        assert_eq!(report.pulled, vec![path.clone()]);

        let index = fx.repo.current_index().unwrap();
        let head = fx.repo.branches()[index].head();
        let view = fx.repo.graph().materialize(head).unwrap();
        assert!(view.contains_key(&path));
        assert_eq!(fx.read("a.txt"), "base");
    }

    #[test]
    fn merge_of_identical_histories_is_clean() {
        let mut fx = fixture();
        fx.commit_file("a.txt", "alpha", "add a");
        fx.repo.add_branch("feature").unwrap();
        let report = fx.repo.merge("feature").unwrap();
        assert!(report.is_clean());
    }
}
