//! The in-memory context of the `st` application.

use crate::{
    errors::{StError, StResult},
    git::RepositoryExt,
    store::{KvStore, StackMetadataExt},
    tree::{StackTree, TrackedBranch},
};
use tracing::{debug, warn};

mod actions;
mod fmt;
mod info;
mod restack;

pub use actions::{Modification, SyncOutcome};
pub use info::BranchInfo;
pub use restack::RestackOutcome;

/// The in-memory context of the `st` application.
///
/// Assembled fresh on every invocation from the metadata store and the checked out
/// branch; the tree itself is never persisted.
pub struct StContext<'a, R: ?Sized, S> {
    /// The repository associated with the context.
    pub repository: &'a R,
    /// The store holding the stack metadata.
    pub store: S,
    /// The tree of branches tracked by `st`.
    pub tree: StackTree,
}

impl<'a, R, S> StContext<'a, R, S>
where
    R: RepositoryExt + ?Sized,
    S: KvStore,
{
    /// Loads the tracked branches from `store`, marks the checked out branch, and builds
    /// the [StackTree].
    ///
    /// ## Returns
    /// - `Ok(ctx)` - The loaded context.
    /// - `Err(StError::NotInitialized)` - If no trunk branch has been configured.
    pub fn load(repository: &'a R, store: S) -> StResult<Self> {
        let trunk = store.trunk()?.ok_or(StError::NotInitialized)?;
        let tree = Self::load_tree(repository, &store, trunk)?;

        Ok(Self {
            repository,
            store,
            tree,
        })
    }

    /// Re-reads the tracked branches from the store and rebuilds the tree.
    pub fn reload(&mut self) -> StResult<()> {
        let trunk = self.store.trunk()?.ok_or(StError::NotInitialized)?;
        self.tree = Self::load_tree(self.repository, &self.store, trunk)?;
        Ok(())
    }

    fn load_tree(repository: &R, store: &S, trunk: String) -> StResult<StackTree> {
        // A detached HEAD simply leaves no branch marked as current.
        let current = match repository.current_branch_name() {
            Ok(name) => Some(name),
            Err(e) => {
                warn!(error = %e, "Could not determine the current branch");
                None
            }
        };

        let branches = store
            .tracked_parents()?
            .into_iter()
            .map(|(name, parent)| {
                let is_current = current.as_deref() == Some(name.as_str());
                TrackedBranch::new(name, parent).current(is_current)
            })
            .collect::<Vec<_>>();
        debug!(trunk = %trunk, tracked = branches.len(), "Loaded stack metadata");

        Ok(StackTree::from_branches(trunk, branches))
    }

    /// Checks out the branch `target`.
    pub fn checkout(&self, target: &str) -> StResult<()> {
        self.repository.checkout_branch(target)
    }
}
