//! Replay-based rebase.
//!
//! Rebase re-homes the current branch onto the head of a target branch:
//! every commit the current branch made since the common ancestor is
//! replayed, oldest first, as a fresh commit on top of the target's head.
//! Replayed commits carry the target side's non-conflicting changes — a
//! path the target modified but the current branch did not, and every path
//! the target added since the ancestor — so the rebased history already
//! includes the target's work.
//!
//! An optional [`RebaseDecider`] is consulted once per replayed commit and
//! may skip it or reword its message; with no decider every commit is
//! replayed verbatim.

use serde::Serialize;
use tracing::debug;

use grove_dag::Manifest;
use grove_types::CommitId;

use crate::error::{RepoError, RepoResult};
use crate::repository::{CommitSummary, Repository};

/// What to do with one commit about to be replayed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReplayDecision {
    /// Replay the commit as it is.
    Continue,
    /// Drop the commit from the rebased history.
    Skip,
    /// Replay the commit under a new message.
    Reword(String),
}

/// Per-commit decision provider for an interactive rebase.
///
/// `may_skip` is `false` for the first and the last commit of the replay
/// sequence; a [`Skip`](ReplayDecision::Skip) returned for either is
/// treated as [`Continue`](ReplayDecision::Continue).
pub trait RebaseDecider {
    fn decide(&mut self, commit: &CommitSummary, may_skip: bool) -> ReplayDecision;
}

/// How a rebase concluded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum RebaseOutcome {
    /// The current branch had no commits of its own; its head was moved
    /// directly to the target's head. No commits were created.
    FastForwarded { new_head: CommitId },
    /// The current branch's commits were replayed onto the target's head.
    Replayed {
        new_head: CommitId,
        replayed: Vec<CommitId>,
        skipped: Vec<CommitId>,
    },
}

impl Repository {
    /// Rebase the current branch onto the named branch's head.
    ///
    /// Fails with [`AlreadyUpToDate`](RepoError::AlreadyUpToDate) when the
    /// target's head is already in the current branch's history (there is
    /// nothing to move onto). Afterwards the working tree reflects the
    /// current branch's new head.
    pub fn rebase(
        &mut self,
        name: &str,
        mut decider: Option<&mut dyn RebaseDecider>,
    ) -> RepoResult<RebaseOutcome> {
        if name == self.current_branch() {
            return Err(RepoError::SelfOperation { op: "rebase" });
        }
        let target_index = self
            .branch_index(name)
            .ok_or_else(|| RepoError::BranchNotFound(name.to_string()))?;
        let current_index = self.current_index()?;

        let target_head = self.branches[target_index].head();
        let current_head = self.branches[current_index].head();

        // Fast paths. Strict ancestry on both checks: equal heads fall
        // through to the replay scan, which then finds nothing to replay.
        if self.branches[target_index].in_history(&self.branches[current_index], &self.graph) {
            self.branches[current_index].set_head(target_head);
            self.checkout_tree(current_index)?;
            debug!(target = name, %target_head, "fast-forwarded");
            return Ok(RebaseOutcome::FastForwarded {
                new_head: target_head,
            });
        }
        if self.branches[current_index].in_history(&self.branches[target_index], &self.graph) {
            return Err(RepoError::AlreadyUpToDate);
        }

        // Collect the current branch's own commits, newest first, down to
        // the first commit shared with the target's history.
        let target_history = self.graph.ancestor_ids(target_head);
        let mut to_replay = Vec::new();
        let mut cursor = Some(current_head);
        let mut ancestor = None;
        while let Some(id) = cursor {
            if target_history.contains(&id) {
                ancestor = Some(id);
                break;
            }
            to_replay.push(id);
            cursor = self.graph.require(id)?.parent;
        }
        let Some(ancestor) = ancestor else {
            // Histories always share the initial commit.
            return Err(RepoError::AlreadyUpToDate);
        };
        if to_replay.is_empty() {
            return Err(RepoError::AlreadyUpToDate);
        }
        debug!(target = name, %ancestor, commits = to_replay.len(), "replaying");

        // The target side's changes to carry into every replayed commit:
        // paths only the target modified, plus paths the target added.
        let modified_in_current = self.graph.modified_between(ancestor, current_head)?;
        let mut propagated: Manifest = self
            .graph
            .modified_between(ancestor, target_head)?
            .into_iter()
            .filter(|(path, _)| !modified_in_current.contains_key(path))
            .collect();
        propagated.extend(self.graph.added_since(ancestor, target_head)?);

        let total = to_replay.len();
        let mut running_head = target_head;
        let mut replayed = Vec::new();
        let mut skipped = Vec::new();
        for (index, original_id) in to_replay.iter().rev().copied().enumerate() {
            let original = self.graph.require(original_id)?.clone();
            let may_skip = index != 0 && index != total - 1;
            let decision = match decider {
                Some(ref mut d) => d.decide(&CommitSummary::from(&original), may_skip),
                None => ReplayDecision::Continue,
            };
            if decision == ReplayDecision::Skip && may_skip {
                debug!(id = %original_id, "skipped during replay");
                skipped.push(original_id);
                continue;
            }

            let mut commit = original.replay(self.ids.next_commit_id());
            if let ReplayDecision::Reword(message) = decision {
                commit.message = message;
            }
            for blob in propagated.values() {
                commit.splice_blob(blob.clone());
            }
            commit.parent = Some(running_head);
            running_head = commit.id;
            replayed.push(commit.id);
            self.graph.record(commit);
        }

        self.branches[current_index].set_head(running_head);
        self.checkout_tree(current_index)?;
        debug!(new_head = %running_head, replayed = replayed.len(), skipped = skipped.len(), "rebase finished");
        Ok(RebaseOutcome::Replayed {
            new_head: running_head,
            replayed,
            skipped,
        })
    }
}
