//! A summary of the checked out branch and its place in its stack.

use super::StContext;
use crate::{
    errors::{StError, StResult},
    git::RepositoryExt,
    store::KvStore,
    tree::TrackedBranch,
};

/// Where the checked out branch sits in its stack.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BranchInfo {
    /// The branch name.
    pub name: String,
    /// The ref the branch is rebased onto.
    pub parent: String,
    /// The branches from the stack root down to this one, root first.
    pub path: Vec<String>,
    /// The tracked children, sorted by name.
    pub children: Vec<String>,
    /// The tips of the stack above this branch.
    pub tips: Vec<String>,
    /// Commits on the branch that are not on its parent, if the parent resolves.
    pub commits_ahead: Option<usize>,
    /// Whether the parent has moved on since the branch last incorporated it.
    pub needs_restack: bool,
}

impl<'a, R, S> StContext<'a, R, S>
where
    R: RepositoryExt + ?Sized,
    S: KvStore,
{
    /// Describes the checked out branch.
    ///
    /// ## Returns
    /// - `Ok(info)` - The [BranchInfo] of the checked out branch.
    /// - `Err(StError::CurrentBranchNotTracked)` - If the checked out branch is untracked.
    pub fn branch_info(&self) -> StResult<BranchInfo> {
        let branch = self
            .tree
            .current_branch()
            .ok_or(StError::CurrentBranchNotTracked)?;
        Ok(BranchInfo {
            name: branch.name.clone(),
            parent: branch.parent.clone(),
            path: names(self.tree.path_to_trunk(&branch.name)),
            children: branch.children.clone(),
            tips: names(self.tree.leaves(&branch.name)),
            commits_ahead: self
                .repository
                .commit_count(&branch.parent, &branch.name)
                .ok(),
            needs_restack: self.needs_restack(&branch.name),
        })
    }
}

fn names(branches: Vec<&TrackedBranch>) -> Vec<String> {
    branches.into_iter().map(|b| b.name.clone()).collect()
}

#[cfg(test)]
mod test {
    use crate::{
        ctx::StContext,
        errors::StError,
        store::StackMetadataExt,
        test_utils::{MemoryStore, MockRepository},
    };

    #[test]
    fn describes_the_current_branch() {
        let repo = MockRepository::new("main");
        repo.branch("a", "main");
        repo.branch("b", "a");
        repo.branch("c1", "b");
        repo.branch("c2", "b");
        repo.commit("a");
        repo.checkout("b");

        let mut store = MemoryStore::default();
        store.set_trunk("main").unwrap();
        for (branch, parent) in [("a", "main"), ("b", "a"), ("c1", "b"), ("c2", "b")] {
            store.set_parent(branch, parent).unwrap();
        }
        let ctx = StContext::load(&repo, store).unwrap();

        let info = ctx.branch_info().unwrap();
        assert_eq!(info.name, "b");
        assert_eq!(info.parent, "a");
        assert_eq!(info.path, vec!["a", "b"]);
        assert_eq!(info.children, vec!["c1", "c2"]);
        assert_eq!(info.tips, vec!["c1", "c2"]);
        assert_eq!(info.commits_ahead, Some(1));
        assert!(info.needs_restack);
    }

    #[test]
    fn untracked_branch_has_no_info() {
        let repo = MockRepository::new("main");
        let mut store = MemoryStore::default();
        store.set_trunk("main").unwrap();
        let ctx = StContext::load(&repo, store).unwrap();

        assert!(matches!(
            ctx.branch_info(),
            Err(StError::CurrentBranchNotTracked)
        ));
    }
}
