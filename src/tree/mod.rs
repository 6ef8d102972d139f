//! Structured representation of the stacks of branches tracked by `st`.

use std::collections::{HashMap, HashSet};

mod navigate;

/// An n-nary forest of branches, represented as a flat data structure.
///
/// `branches` is the single source of truth. `children` of every [TrackedBranch] and
/// `stack_roots` are derived by [StackTree::build], and are stale after any mutation
/// until the tree is built again.
///
/// By itself, [StackTree] has no context of its relationship with the local repository.
/// For this functionality, [StContext] holds onto the [StackTree], the repository and
/// the metadata store.
///
/// [StContext]: crate::ctx::StContext
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct StackTree {
    /// The name of the trunk branch. Trunk itself is never a [TrackedBranch].
    pub trunk_name: String,
    /// A map of branch names to [TrackedBranch]es.
    pub branches: HashMap<String, TrackedBranch>,
    /// Names of the branches whose parent is not tracked, sorted by name.
    pub stack_roots: Vec<String>,
}

impl StackTree {
    /// Creates a new, empty [StackTree] with the given trunk branch name.
    pub fn new(trunk_name: String) -> Self {
        Self {
            trunk_name,
            ..Default::default()
        }
    }

    /// Creates a [StackTree] from a flat set of branches, and builds it.
    pub fn from_branches(
        trunk_name: String,
        branches: impl IntoIterator<Item = TrackedBranch>,
    ) -> Self {
        let mut tree = Self::new(trunk_name);
        branches.into_iter().for_each(|branch| tree.insert(branch));
        tree.build();
        tree
    }

    /// Links every branch under its parent and collects the stack roots.
    ///
    /// Children and stack roots are sorted by name, so the result does not depend on the
    /// iteration order of `branches`. Building is idempotent. Cycles are accepted: a
    /// branch on a cycle has a tracked parent, so it is simply never a stack root.
    pub fn build(&mut self) {
        self.branches
            .values_mut()
            .for_each(|branch| branch.children.clear());

        let mut links = Vec::new();
        let mut roots = Vec::new();
        for branch in self.branches.values() {
            if self.branches.contains_key(&branch.parent) {
                links.push((branch.parent.clone(), branch.name.clone()));
            } else {
                roots.push(branch.name.clone());
            }
        }

        for (parent, child) in links {
            if let Some(parent) = self.branches.get_mut(&parent) {
                parent.children.push(child);
            }
        }
        self.branches
            .values_mut()
            .for_each(|branch| branch.children.sort());

        roots.sort();
        self.stack_roots = roots;
    }

    /// Gets a branch by name from the stack graph.
    ///
    /// ## Takes
    /// - `branch_name` - The name of the branch to get.
    ///
    /// ## Returns
    /// - `Some(branch)` - The branch.
    /// - `None` - The branch by the name of `branch_name` was not found.
    pub fn get(&self, branch_name: &str) -> Option<&TrackedBranch> {
        self.branches.get(branch_name)
    }

    /// Returns `true` if `branch_name` is tracked.
    pub fn contains(&self, branch_name: &str) -> bool {
        self.branches.contains_key(branch_name)
    }

    /// Inserts a branch, replacing any branch by the same name. The tree must be built
    /// again before it is traversed.
    pub fn insert(&mut self, branch: TrackedBranch) {
        self.branches.insert(branch.name.clone(), branch);
    }

    /// Returns `true` if `ancestor` is reachable from `branch_name` by following parent
    /// links through tracked branches. Terminates on cyclic input.
    pub fn is_ancestor(&self, ancestor: &str, branch_name: &str) -> bool {
        let mut seen = HashSet::new();
        let mut current = self.get(branch_name);
        while let Some(branch) = current {
            if !seen.insert(branch.name.as_str()) {
                return false;
            }
            if branch.parent == ancestor {
                return true;
            }
            current = self.get(&branch.parent);
        }
        false
    }
}

/// A local branch tracked by `st`.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct TrackedBranch {
    /// The branch name.
    pub name: String,
    /// The name of the ref this branch is rebased onto. Need not be tracked.
    pub parent: String,
    /// Names of the tracked branches whose parent is this branch, sorted by name.
    ///
    /// Derived by [StackTree::build]; never persisted.
    pub children: Vec<String>,
    /// Whether the branch was checked out when the tree was loaded.
    pub is_current: bool,
}

impl TrackedBranch {
    /// Creates a new [TrackedBranch] with the given name and parent branch name.
    ///
    /// Upon instantiation, the branch has no children.
    pub fn new(name: impl Into<String>, parent: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: parent.into(),
            ..Default::default()
        }
    }

    /// Marks the branch as the checked out branch.
    pub fn current(mut self, is_current: bool) -> Self {
        self.is_current = is_current;
        self
    }
}

#[cfg(test)]
mod test {
    use super::{StackTree, TrackedBranch};

    pub(crate) fn tree(trunk: &str, pairs: &[(&str, &str)], current: Option<&str>) -> StackTree {
        StackTree::from_branches(
            trunk.to_string(),
            pairs.iter().map(|(name, parent)| {
                TrackedBranch::new(*name, *parent).current(Some(*name) == current)
            }),
        )
    }

    #[test]
    fn trunk_parented_branches_are_roots() {
        let tree = tree("main", &[("feat-b", "main"), ("feat-a", "main")], None);

        assert_eq!(tree.stack_roots, vec!["feat-a", "feat-b"]);
        assert!(tree.get("feat-a").unwrap().children.is_empty());
    }

    #[test]
    fn children_link_under_tracked_parents() {
        let tree = tree(
            "main",
            &[("feat-a", "main"), ("feat-b", "feat-a")],
            Some("feat-b"),
        );

        assert_eq!(tree.stack_roots, vec!["feat-a"]);
        assert_eq!(tree.get("feat-a").unwrap().children, vec!["feat-b"]);
        assert!(tree.get("feat-b").unwrap().is_current);
    }

    #[test]
    fn children_and_roots_are_sorted() {
        let tree = tree(
            "main",
            &[
                ("zeta", "main"),
                ("base", "main"),
                ("c", "base"),
                ("a", "base"),
                ("b", "base"),
            ],
            None,
        );

        assert_eq!(tree.stack_roots, vec!["base", "zeta"]);
        assert_eq!(tree.get("base").unwrap().children, vec!["a", "b", "c"]);
    }

    #[test]
    fn untracked_parents_make_roots() {
        let tree = tree(
            "main",
            &[("orphan", "external/topic"), ("feat-a", "main"), ("gone", "deleted")],
            None,
        );

        assert_eq!(tree.stack_roots, vec!["feat-a", "gone", "orphan"]);
        for root in &tree.stack_roots {
            assert!(!tree.contains(&tree.get(root).unwrap().parent));
        }
    }

    #[test]
    fn build_is_deterministic_and_idempotent() {
        let pairs = [
            ("a", "main"),
            ("b", "a"),
            ("c", "a"),
            ("d", "c"),
            ("e", "main"),
            ("f", "x"),
        ];
        let mut reversed = pairs;
        reversed.reverse();

        let mut forward = tree("main", &pairs, None);
        let backward = tree("main", &reversed, None);
        assert_eq!(forward, backward);

        let once = forward.clone();
        forward.build();
        assert_eq!(forward, once);
    }

    #[test]
    fn cycles_are_accepted() {
        let tree = tree(
            "main",
            &[("self", "self"), ("x", "y"), ("y", "x"), ("a", "main")],
            None,
        );

        assert_eq!(tree.stack_roots, vec!["a"]);
        assert_eq!(tree.get("self").unwrap().children, vec!["self"]);
        assert_eq!(tree.get("x").unwrap().children, vec!["y"]);
        assert!(tree.is_ancestor("x", "x"));
        assert!(!tree.is_ancestor("a", "x"));
    }

    #[test]
    fn rebuild_after_mutation() {
        let mut tree = tree("main", &[("a", "main"), ("b", "a")], None);

        tree.insert(TrackedBranch::new("b", "main"));
        tree.insert(TrackedBranch::new("c", "b"));
        tree.build();

        assert_eq!(tree.stack_roots, vec!["a", "b"]);
        assert!(tree.get("a").unwrap().children.is_empty());
        assert_eq!(tree.get("b").unwrap().children, vec!["c"]);
    }
}
