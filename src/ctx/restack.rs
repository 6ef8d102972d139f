//! Restacking: rebasing tracked branches onto the current tips of their parents.
//!
//! A restack walks its branches one at a time, in depth-first pre-order, so that every
//! parent is current before its children are rebased onto it. The walk halts on the
//! first conflict and persists the conflicted branch together with its subtree, so that
//! a later invocation can resume it with [StContext::resume_restack].

use super::StContext;
use crate::{
    errors::{StError, StResult},
    git::{RebaseStatus, RepositoryExt},
    store::{KvStore, StackMetadataExt},
};
use tracing::{debug, info, warn};

/// The outcome of rebasing a single branch onto its parent.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RebaseStep {
    /// The branch already contained the parent's tip; nothing was done.
    Clean,
    /// The branch was rebased onto the parent's tip.
    Rebased,
    /// The rebase stopped on conflicts.
    Conflicted,
}

/// Which branches a walk persists when it stops on a conflict.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum Remaining {
    /// The conflicted branch and its subtree. Later siblings and stacks are dropped.
    Subtree,
    /// The conflicted branch and every branch after it in the walk. A resumed walk
    /// already consists of exactly the branches left over.
    Suffix,
}

/// The result of a restack.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct RestackOutcome {
    /// Branches that were rebased, in the order they were processed.
    pub rebased: Vec<String>,
    /// Branches that were already up to date, in the order they were processed.
    pub skipped: Vec<String>,
    /// The branch whose rebase stopped on conflicts, if any.
    pub conflict: Option<String>,
}

impl RestackOutcome {
    /// Returns `true` if the walk finished without a conflict.
    pub fn is_complete(&self) -> bool {
        self.conflict.is_none()
    }
}

impl<'a, R, S> StContext<'a, R, S>
where
    R: RepositoryExt + ?Sized,
    S: KvStore,
{
    /// Returns `true` if the parent of `branch_name` has advanced past the point where
    /// the branch last incorporated it.
    ///
    /// Untracked branches, and branches whose ancestry cannot be queried, do not need a
    /// restack.
    pub fn needs_restack(&self, branch_name: &str) -> bool {
        let Some(branch) = self.tree.get(branch_name) else {
            return false;
        };
        if branch.parent.is_empty() {
            return false;
        }

        let merge_base = self.repository.merge_base(&branch.name, &branch.parent);
        let parent_tip = self.repository.tip(&branch.parent);
        match (merge_base, parent_tip) {
            (Ok(merge_base), Ok(parent_tip)) => merge_base != parent_tip,
            _ => false,
        }
    }

    /// Rebases `branch_name` onto the tip of `parent_name` if it does not already
    /// contain it.
    ///
    /// ## Returns
    /// - `Ok(step)` - The [RebaseStep] taken. Conflicts are not errors.
    /// - `Err(_)` - If the ancestry of either ref could not be queried, or the rebase
    ///   could not be run.
    pub fn rebase_onto(&self, branch_name: &str, parent_name: &str) -> StResult<RebaseStep> {
        let merge_base = self.repository.merge_base(branch_name, parent_name)?;
        let parent_tip = self.repository.tip(parent_name)?;

        if merge_base == parent_tip {
            debug!(branch = branch_name, parent = parent_name, "Already up to date");
            return Ok(RebaseStep::Clean);
        }

        info!(branch = branch_name, parent = parent_name, "Rebasing");
        match self
            .repository
            .rebase_onto(parent_name, &merge_base, branch_name)?
        {
            RebaseStatus::Completed => Ok(RebaseStep::Rebased),
            RebaseStatus::Conflicted => Ok(RebaseStep::Conflicted),
        }
    }

    /// Restacks every stack, in the order of the stack roots.
    pub fn restack_all(&mut self) -> StResult<RestackOutcome> {
        self.ensure_no_restack_in_progress()?;

        let roots = self.tree.stack_roots.clone();
        let plan = self.plan(&roots);
        self.restack_plan(plan)
    }

    /// Restacks the stack containing the checked out branch.
    pub fn restack_current(&mut self) -> StResult<RestackOutcome> {
        self.ensure_no_restack_in_progress()?;

        let root = self.tree.current_stack_root()?.name.clone();
        let plan = self.plan(&[root]);
        self.restack_plan(plan)
    }

    /// Resumes a restack suspended on a conflict.
    ///
    /// The persisted branches are processed strictly in their persisted order, each onto
    /// its parent as currently declared in the store.
    ///
    /// ## Returns
    /// - `Ok(outcome)` - The outcome of the resumed walk.
    /// - `Err(StError::NothingToResume)` - If no restack is suspended.
    pub fn resume_restack(&mut self) -> StResult<RestackOutcome> {
        let state = self.store.restack_state()?.ok_or(StError::NothingToResume)?;
        info!(remaining = ?state.remaining, "Resuming restack");
        self.walk(&state.remaining, Remaining::Suffix)
    }

    /// Finishes the rebase the operator resolved, then resumes the suspended restack.
    ///
    /// A rebase in the working copy is only continued when a restack is suspended, so a
    /// rebase started outside of `st` is left alone.
    ///
    /// ## Returns
    /// - `Ok(outcome)` - The outcome of the resumed walk.
    /// - `Err(StError::NothingToResume)` - If no restack is suspended.
    /// - `Err(_)` - If the suspended rebase could not be continued.
    pub fn continue_restack(&mut self) -> StResult<RestackOutcome> {
        if self.store.restack_state()?.is_none() {
            return Err(StError::NothingToResume);
        }
        if self.repository.is_rebase_in_progress() {
            info!("Continuing the suspended rebase");
            self.repository.rebase_continue()?;
        }
        self.resume_restack()
    }

    /// Discards a restack suspended on a conflict. Rebases already performed are kept.
    pub fn abort_restack(&mut self) -> StResult<()> {
        if self.store.restack_state()?.is_none() {
            return Err(StError::NothingToResume);
        }
        self.store.clear_restack_state()
    }

    /// Orders the branches of the stacks rooted at `roots` for a restack: each stack in
    /// depth-first pre-order, stacks in the order given.
    fn plan(&self, roots: &[String]) -> Vec<String> {
        roots
            .iter()
            .flat_map(|root| self.tree.subtree(root))
            .map(|branch| branch.name.clone())
            .collect()
    }

    /// Walks `plan`, then returns to the originally checked out branch if the walk
    /// completed.
    fn restack_plan(&mut self, plan: Vec<String>) -> StResult<RestackOutcome> {
        let original = self.repository.current_branch_name().ok();
        let outcome = self.walk(&plan, Remaining::Subtree)?;

        if outcome.is_complete() {
            if let Some(original) = original {
                // Advisory: the restack itself has already succeeded.
                if let Err(e) = self.repository.checkout_branch(&original) {
                    warn!(branch = %original, error = %e, "Failed to return to the original branch");
                }
            }
        }
        Ok(outcome)
    }

    /// Rebases each branch of `plan` onto its declared parent, in order.
    ///
    /// On a conflict, the branches selected by `remaining` are persisted as the resumable
    /// state and the walk stops. A walk that finishes clears any persisted
    /// state. Backend failures propagate without touching the persisted state.
    fn walk(&mut self, plan: &[String], remaining: Remaining) -> StResult<RestackOutcome> {
        let mut outcome = RestackOutcome::default();

        for (i, branch) in plan.iter().enumerate() {
            let Some(parent) = self.store.parent_of(branch)? else {
                debug!(branch = %branch, "No longer tracked, skipping");
                continue;
            };

            match self.rebase_onto(branch, &parent)? {
                RebaseStep::Clean => outcome.skipped.push(branch.clone()),
                RebaseStep::Rebased => outcome.rebased.push(branch.clone()),
                RebaseStep::Conflicted => {
                    warn!(branch = %branch, parent = %parent, "Restack stopped on conflicts");
                    let remaining = match remaining {
                        Remaining::Subtree => self.unvisited_subtree(branch),
                        Remaining::Suffix => plan[i..].to_vec(),
                    };
                    self.store.save_restack_state(&remaining)?;
                    outcome.conflict = Some(branch.clone());
                    return Ok(outcome);
                }
            }
        }

        self.store.clear_restack_state()?;
        Ok(outcome)
    }

    /// The conflicted branch followed by its descendants, in pre-order.
    fn unvisited_subtree(&self, branch: &str) -> Vec<String> {
        match self.tree.subtree(branch) {
            subtree if subtree.is_empty() => vec![branch.to_string()],
            subtree => subtree.into_iter().map(|b| b.name.clone()).collect(),
        }
    }

    pub(super) fn ensure_no_restack_in_progress(&self) -> StResult<()> {
        match self.store.restack_state()? {
            Some(_) => Err(StError::RestackInProgress),
            None => Ok(()),
        }
    }
}
