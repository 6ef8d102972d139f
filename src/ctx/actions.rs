//! Actions that mutate the stack metadata or the branches it describes.

use super::{RestackOutcome, StContext};
use crate::{
    constants::TRUNK_CANDIDATES,
    errors::{StError, StResult},
    git::RepositoryExt,
    store::{KvStore, StackMetadataExt},
};
use itertools::Itertools;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// The result of [StContext::create_branch].
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CreatedBranch {
    /// The parent the new branch was tracked with.
    pub parent: String,
    /// The commit made on the parent before branching, if any.
    pub commit: Option<String>,
}

/// The result of [StContext::modify].
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Modification {
    /// `HEAD` was replaced by the contained commit.
    Amended(String),
    /// The contained commit was added on top of `HEAD`.
    Committed(String),
}

/// The result of [StContext::sync].
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct SyncOutcome {
    /// Branches found merged into trunk, then untracked and deleted.
    pub cleaned: Vec<String>,
    /// The outcome of restacking every stack afterwards.
    pub restack: RestackOutcome,
}

impl<'a, R, S> StContext<'a, R, S>
where
    R: RepositoryExt + ?Sized,
    S: KvStore,
{
    /// Configures the trunk branch of the repository.
    ///
    /// ## Takes
    /// - `trunk` - The trunk branch. If [None], the first of `main` and `master` that
    ///   exists is used.
    ///
    /// ## Returns
    /// - `Ok(trunk)` - The configured trunk branch.
    /// - `Err(_)` - If the branch does not exist or none could be detected.
    pub fn initialize(repository: &R, store: &mut S, trunk: Option<String>) -> StResult<String> {
        let trunk = match trunk {
            Some(trunk) if repository.branch_exists(&trunk) => trunk,
            Some(trunk) => return Err(StError::BranchDoesNotExist(trunk)),
            None => TRUNK_CANDIDATES
                .iter()
                .find(|candidate| repository.branch_exists(candidate))
                .map(|candidate| candidate.to_string())
                .ok_or(StError::TrunkNotDetected)?,
        };

        store.set_trunk(&trunk)?;
        info!(trunk = %trunk, "Initialized");
        Ok(trunk)
    }

    /// Tracks `branch_name` with `parent_name` as its parent. Tracking an already tracked
    /// branch reparents it.
    pub fn track(&mut self, branch_name: &str, parent_name: &str) -> StResult<()> {
        if !self.repository.branch_exists(branch_name) {
            return Err(StError::BranchDoesNotExist(branch_name.to_string()));
        }
        self.validate_parent(branch_name, parent_name)?;

        self.store.set_parent(branch_name, parent_name)?;
        self.reload()
    }

    /// Stops tracking `branch_name`. Its children are left in place, and become the roots
    /// of their own stacks.
    pub fn untrack(&mut self, branch_name: &str) -> StResult<()> {
        if !self.tree.contains(branch_name) {
            return Err(StError::BranchNotTracked(branch_name.to_string()));
        }

        self.store.remove_parent(branch_name)?;
        self.reload()
    }

    /// Changes the parent of the tracked branch `branch_name` to `parent_name`.
    ///
    /// ## Returns
    /// - `Ok(true)` - The parent was changed.
    /// - `Ok(false)` - `parent_name` already was the parent.
    /// - `Err(_)` - If the branch is untracked, or the new parent is invalid.
    pub fn reparent(&mut self, branch_name: &str, parent_name: &str) -> StResult<bool> {
        let current_parent = self
            .tree
            .get(branch_name)
            .map(|branch| branch.parent.clone())
            .ok_or_else(|| StError::BranchNotTracked(branch_name.to_string()))?;
        self.validate_parent(branch_name, parent_name)?;

        if current_parent == parent_name {
            return Ok(false);
        }
        self.store.set_parent(branch_name, parent_name)?;
        self.reload()?;
        Ok(true)
    }

    /// Creates `branch_name` at `HEAD`, checks it out, and tracks it on top of the
    /// previously checked out branch.
    ///
    /// ## Takes
    /// - `stage_all` - Stage every change in the working tree first.
    /// - `message` - If given and changes are staged, commit them on the previously
    ///   checked out branch before branching.
    pub fn create_branch(
        &mut self,
        branch_name: &str,
        stage_all: bool,
        message: Option<&str>,
    ) -> StResult<CreatedBranch> {
        if self.repository.branch_exists(branch_name) {
            return Err(StError::BranchAlreadyExists(branch_name.to_string()));
        }
        let parent = self.repository.current_branch_name()?;

        if stage_all {
            self.repository.stage_all()?;
        }
        let commit = match message {
            Some(message) if self.repository.has_staged_changes()? => {
                let commit = self.repository.commit_staged(message)?;
                info!(branch = %parent, commit = %commit, "Committed staged changes");
                Some(commit)
            }
            _ => None,
        };

        self.repository.create_branch(branch_name)?;
        self.store.set_parent(branch_name, &parent)?;
        self.reload()?;
        Ok(CreatedBranch { parent, commit })
    }

    /// Amends `HEAD` with the staged changes, or adds a new commit with them.
    ///
    /// ## Takes
    /// - `stage_all` - Stage every change in the working tree first.
    /// - `new_commit` - Commit on top of `HEAD` instead of amending it.
    /// - `message` - The commit message. Required for a new commit. When amending, [None]
    ///   keeps the message of `HEAD`.
    ///
    /// ## Returns
    /// - `Ok(modification)` - What was done to `HEAD`.
    /// - `Err(StError::CommitMessageRequired)` - A new commit was requested without a
    ///   message.
    /// - `Err(StError::NothingStaged)` - Amending with neither staged changes nor a message.
    pub fn modify(
        &self,
        stage_all: bool,
        new_commit: bool,
        message: Option<&str>,
    ) -> StResult<Modification> {
        if stage_all {
            self.repository.stage_all()?;
        }

        if new_commit {
            let message = message.ok_or(StError::CommitMessageRequired)?;
            return self
                .repository
                .commit_staged(message)
                .map(Modification::Committed);
        }

        if message.is_none() && !self.repository.has_staged_changes()? {
            return Err(StError::NothingStaged);
        }
        self.repository
            .amend_head(message)
            .map(Modification::Amended)
    }

    /// Deletes the tracked branch `branch_name`, moving its children onto its parent.
    ///
    /// If the branch is checked out, its parent is checked out first.
    ///
    /// ## Returns
    /// - `Ok(children)` - The children that were moved onto the deleted branch's parent.
    pub fn delete_branch(&mut self, branch_name: &str) -> StResult<Vec<String>> {
        let branch = self
            .tree
            .get(branch_name)
            .cloned()
            .ok_or_else(|| StError::BranchNotTracked(branch_name.to_string()))?;

        // Leave the branch before touching any metadata, so a failed checkout changes
        // nothing.
        if self.repository.current_branch_name().ok().as_deref() == Some(branch_name) {
            self.repository.checkout_branch(&branch.parent)?;
        }

        for child in &branch.children {
            debug!(child = %child, parent = %branch.parent, "Moving child onto grandparent");
            self.store.set_parent(child, &branch.parent)?;
        }

        self.store.remove_parent(branch_name)?;
        self.repository.delete_branch(branch_name)?;
        self.reload()?;
        Ok(branch.children)
    }

    /// Fetches `remote`, fast-forwards trunk, removes branches merged into trunk, and
    /// restacks every stack.
    pub fn sync(&mut self, remote: &str) -> StResult<SyncOutcome> {
        self.ensure_no_restack_in_progress()?;
        let trunk = self.tree.trunk_name.clone();

        if self.repository.has_remote() {
            info!(remote, "Fetching");
            self.repository.fetch(remote)?;
            if let Err(e) = self.repository.fast_forward(&trunk, remote) {
                warn!(trunk = %trunk, error = %e, "Could not fast-forward trunk");
            }
        }

        let cleaned = self.clean_merged_branches()?;
        self.reload()?;

        let restack = self.restack_all()?;
        Ok(SyncOutcome { cleaned, restack })
    }

    /// Untracks and deletes every tracked branch whose tip is contained in trunk, moving
    /// the children of each onto its nearest unmerged ancestor. Failures on individual
    /// branches are logged and skipped.
    fn clean_merged_branches(&mut self) -> StResult<Vec<String>> {
        let trunk = self.tree.trunk_name.clone();
        let trunk_tip = self.repository.tip(&trunk)?;

        let merged = self
            .tree
            .branches
            .keys()
            .filter(|name| self.is_merged_into(name, &trunk, &trunk_tip))
            .cloned()
            .sorted()
            .collect::<Vec<_>>();
        if merged.is_empty() {
            return Ok(Vec::new());
        }
        let merged_set = merged.iter().map(String::as_str).collect::<HashSet<_>>();

        let mut current = self.repository.current_branch_name().ok();
        let mut cleaned = Vec::new();
        for name in &merged {
            let new_parent = self.nearest_unmerged_ancestor(name, &merged_set);
            let children = self
                .tree
                .get(name)
                .map(|branch| branch.children.clone())
                .unwrap_or_default();
            for child in children.iter().filter(|c| !merged_set.contains(c.as_str())) {
                if let Err(e) = self.store.set_parent(child, &new_parent) {
                    warn!(branch = %child, error = %e, "Failed to reparent");
                }
            }

            if current.as_deref() == Some(name.as_str()) {
                if let Err(e) = self.repository.checkout_branch(&trunk) {
                    warn!(trunk = %trunk, error = %e, "Could not switch to trunk");
                    continue;
                }
                current = Some(trunk.clone());
            }

            if let Err(e) = self.store.remove_parent(name) {
                warn!(branch = %name, error = %e, "Failed to untrack");
            }
            if let Err(e) = self.repository.delete_branch(name) {
                warn!(branch = %name, error = %e, "Failed to delete");
            }
            info!(branch = %name, "Cleaned merged branch");
            cleaned.push(name.clone());
        }
        Ok(cleaned)
    }

    /// A branch is merged once its tip is an ancestor of trunk's tip. A branch sitting
    /// exactly on trunk's tip has no commits of its own yet, and is kept.
    fn is_merged_into(&self, branch_name: &str, trunk: &str, trunk_tip: &str) -> bool {
        let Ok(tip) = self.repository.tip(branch_name) else {
            return false;
        };
        if tip == trunk_tip {
            return false;
        }
        self.repository
            .merge_base(branch_name, trunk)
            .is_ok_and(|merge_base| merge_base == tip)
    }

    fn nearest_unmerged_ancestor(&self, branch_name: &str, merged: &HashSet<&str>) -> String {
        let mut seen = HashSet::new();
        let mut parent = self
            .tree
            .get(branch_name)
            .map(|branch| branch.parent.clone())
            .unwrap_or_else(|| self.tree.trunk_name.clone());
        while merged.contains(parent.as_str()) && seen.insert(parent.clone()) {
            match self.tree.get(&parent) {
                Some(branch) => parent = branch.parent.clone(),
                None => break,
            }
        }
        parent
    }

    /// Rejects trunk as the child, and parents that do not resolve, that are the branch
    /// itself, or that would make the branch its own ancestor.
    fn validate_parent(&self, branch_name: &str, parent_name: &str) -> StResult<()> {
        if branch_name == self.tree.trunk_name {
            return Err(StError::CannotTrackTrunk(branch_name.to_string()));
        }
        if branch_name == parent_name {
            return Err(StError::CannotReparentToSelf(branch_name.to_string()));
        }
        if self.repository.tip(parent_name).is_err() {
            return Err(StError::BranchDoesNotExist(parent_name.to_string()));
        }
        if self.tree.is_ancestor(branch_name, parent_name) {
            return Err(StError::ReparentCycle {
                branch: branch_name.to_string(),
                parent: parent_name.to_string(),
            });
        }
        Ok(())
    }
}
