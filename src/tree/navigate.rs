//! Read-only, stack-relative queries and movements over a built [StackTree].

use super::{StackTree, TrackedBranch};
use crate::errors::{StError, StResult};
use std::collections::HashSet;

impl StackTree {
    /// Returns the checked out branch, or [None] if it is not tracked.
    pub fn current_branch(&self) -> Option<&TrackedBranch> {
        self.branches.values().find(|branch| branch.is_current)
    }

    /// Returns the root of the stack containing the checked out branch.
    pub fn current_stack_root(&self) -> StResult<&TrackedBranch> {
        let current = self
            .current_branch()
            .ok_or(StError::CurrentBranchNotTracked)?;
        Ok(self.stack_root_of(current))
    }

    /// Walks up from `branch` while its parent is tracked and not trunk, and returns the
    /// last branch reached.
    pub fn stack_root_of<'a>(&'a self, branch: &'a TrackedBranch) -> &'a TrackedBranch {
        let mut seen = HashSet::from([branch.name.as_str()]);
        let mut root = branch;
        while root.parent != self.trunk_name {
            match self.get(&root.parent) {
                Some(parent) if seen.insert(parent.name.as_str()) => root = parent,
                _ => break,
            }
        }
        root
    }

    /// Returns the tracked ancestors of `branch_name` and the branch itself, ordered from
    /// the branch nearest trunk to `branch_name`.
    ///
    /// The walk stops at trunk or at the first untracked parent. Untracked
    /// `branch_name`s produce an empty path.
    pub fn path_to_trunk(&self, branch_name: &str) -> Vec<&TrackedBranch> {
        let mut path = Vec::new();
        let mut seen = HashSet::new();
        let mut current = self.get(branch_name);
        while let Some(branch) = current {
            if branch.name == self.trunk_name || !seen.insert(branch.name.as_str()) {
                break;
            }
            path.push(branch);
            current = self.get(&branch.parent);
        }
        path.reverse();
        path
    }

    /// Returns `root` and all of its descendants, depth-first, parents before children
    /// and siblings in name order.
    pub fn subtree(&self, root: &str) -> Vec<&TrackedBranch> {
        let mut branches = Vec::new();
        let mut seen = HashSet::new();
        self.fill_subtree(root, &mut seen, &mut branches);
        branches
    }

    /// Returns the branches without children below (and including) `root`, in the order
    /// of [StackTree::subtree].
    pub fn leaves(&self, root: &str) -> Vec<&TrackedBranch> {
        self.subtree(root)
            .into_iter()
            .filter(|branch| branch.children.is_empty())
            .collect()
    }

    /// Recursively fills `branches` with `name` and its descendants. Each branch is
    /// visited at most once, so cyclic input terminates.
    fn fill_subtree<'a>(
        &'a self,
        name: &str,
        seen: &mut HashSet<&'a str>,
        branches: &mut Vec<&'a TrackedBranch>,
    ) {
        let Some(branch) = self.get(name) else {
            return;
        };
        if !seen.insert(branch.name.as_str()) {
            return;
        }

        branches.push(branch);
        branch
            .children
            .iter()
            .for_each(|child| self.fill_subtree(child, seen, branches));
    }

    /// Moves `n` branches away from trunk from the checked out branch, always following
    /// the first child by name.
    ///
    /// ## Returns
    /// - `Ok(name)` - The branch `n` steps up.
    /// - `Err(StError::AlreadyAtTop)` - If a branch without children is reached first.
    /// - `Err(StError::CurrentBranchNotTracked)` - If the checked out branch is untracked.
    pub fn navigate_up(&self, n: usize) -> StResult<&str> {
        let mut target = self
            .current_branch()
            .ok_or(StError::CurrentBranchNotTracked)?;
        for _ in 0..n {
            target = target
                .children
                .first()
                .and_then(|child| self.get(child))
                .ok_or(StError::AlreadyAtTop)?;
        }
        Ok(target.name.as_str())
    }

    /// Moves `n` branches toward trunk from the checked out branch.
    ///
    /// ## Returns
    /// - `Ok(name)` - The branch `n` steps down.
    /// - `Err(StError::AlreadyAtBottom)` - If trunk or an untracked parent is reached
    ///   before `n` steps complete.
    /// - `Err(StError::CurrentBranchNotTracked)` - If the checked out branch is untracked.
    pub fn navigate_down(&self, n: usize) -> StResult<&str> {
        let mut target = self
            .current_branch()
            .ok_or(StError::CurrentBranchNotTracked)?;
        for _ in 0..n {
            if target.parent == self.trunk_name {
                return Err(StError::AlreadyAtBottom);
            }
            target = self.get(&target.parent).ok_or(StError::AlreadyAtBottom)?;
        }
        Ok(target.name.as_str())
    }

    /// Moves to the leaf reached by repeatedly following the first child of the checked
    /// out branch.
    pub fn navigate_top(&self) -> StResult<&str> {
        let current = self
            .current_branch()
            .ok_or(StError::CurrentBranchNotTracked)?;

        let mut seen = HashSet::from([current.name.as_str()]);
        let mut target = current;
        while let Some(child) = target.children.first().and_then(|c| self.get(c)) {
            if !seen.insert(child.name.as_str()) {
                break;
            }
            target = child;
        }

        if target.name == current.name {
            return Err(StError::AlreadyAtTop);
        }
        Ok(target.name.as_str())
    }

    /// Moves to the root of the current stack.
    pub fn navigate_bottom(&self) -> StResult<&str> {
        let current = self
            .current_branch()
            .ok_or(StError::CurrentBranchNotTracked)?;
        let root = self.stack_root_of(current);
        if root.name == current.name {
            return Err(StError::AlreadyAtBottom);
        }
        Ok(root.name.as_str())
    }
}
