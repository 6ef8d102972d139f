//! The repository-scoped key-value store backing `st`'s stack metadata.

use crate::{
    constants::{
        PARENT_KEY_SUFFIX, RESTACK_IN_PROGRESS_KEY, RESTACK_REMAINING_KEY, STACK_KEY_PREFIX,
        TRUNK_KEY,
    },
    errors::StResult,
};
use git2::{Config, ConfigLevel, ErrorCode, Repository};
use itertools::Itertools;
use tracing::debug;

/// A string key-value store scoped to a single repository, surviving process exit.
pub trait KvStore {
    /// Gets the value stored under `key`, or [None] if unset.
    fn get(&self, key: &str) -> StResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> StResult<()>;

    /// Removes `key`. Removing an unset key is not an error.
    fn unset(&mut self, key: &str) -> StResult<()>;

    /// Returns every `(key, value)` pair whose key starts with `prefix`.
    fn entries(&self, prefix: &str) -> StResult<Vec<(String, String)>>;
}

/// A [KvStore] over the local (`.git/config`) level of a repository's git config.
pub struct GitConfigStore {
    config: Config,
}

impl GitConfigStore {
    /// Opens the local git config of `repository`.
    pub fn open(repository: &Repository) -> StResult<Self> {
        let config = repository.config()?.open_level(ConfigLevel::Local)?;
        Ok(Self { config })
    }
}

impl KvStore for GitConfigStore {
    fn get(&self, key: &str) -> StResult<Option<String>> {
        match self.config.get_string(key) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> StResult<()> {
        self.config.set_str(key, value).map_err(Into::into)
    }

    fn unset(&mut self, key: &str) -> StResult<()> {
        match self.config.remove(key) {
            Err(e) if e.code() != ErrorCode::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    fn entries(&self, prefix: &str) -> StResult<Vec<(String, String)>> {
        let pattern = format!("^{}", prefix.replace('.', "\\."));
        let mut entries = self.config.entries(Some(pattern.as_str()))?;

        let mut pairs = Vec::new();
        while let Some(entry) = entries.next() {
            let entry = entry?;
            if let (Some(name), Some(value)) = (entry.name(), entry.value()) {
                if name.starts_with(prefix) {
                    pairs.push((name.to_string(), value.to_string()));
                }
            }
        }
        Ok(pairs)
    }
}

/// A restack suspended on a conflict, awaiting `st continue`.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct ResumableRestackState {
    /// Branches still to be restacked, in walk order. The first is the one that conflicted.
    pub remaining: Vec<String>,
}

/// Typed accessors for the stack metadata `st` keeps in a [KvStore].
pub trait StackMetadataExt: KvStore {
    /// Returns the configured trunk branch, if `st` has been initialized.
    fn trunk(&self) -> StResult<Option<String>> {
        self.get(TRUNK_KEY)
    }

    /// Configures the trunk branch.
    fn set_trunk(&mut self, trunk: &str) -> StResult<()> {
        self.set(TRUNK_KEY, trunk)
    }

    /// Returns the declared parent of `branch`, or [None] if it is not tracked.
    fn parent_of(&self, branch: &str) -> StResult<Option<String>> {
        self.get(parent_key(branch).as_str())
    }

    /// Declares `parent` as the parent of `branch`, tracking it if necessary.
    fn set_parent(&mut self, branch: &str, parent: &str) -> StResult<()> {
        debug!(branch, parent, "Persisting parent");
        self.set(parent_key(branch).as_str(), parent)
    }

    /// Forgets the parent of `branch`, untracking it.
    fn remove_parent(&mut self, branch: &str) -> StResult<()> {
        debug!(branch, "Removing parent");
        self.unset(parent_key(branch).as_str())
    }

    /// Returns every tracked `(branch, parent)` pair, in no particular order.
    fn tracked_parents(&self) -> StResult<Vec<(String, String)>> {
        let pairs = self
            .entries(STACK_KEY_PREFIX)?
            .into_iter()
            .filter_map(|(key, parent)| {
                let branch = key
                    .strip_prefix(STACK_KEY_PREFIX)?
                    .strip_suffix(PARENT_KEY_SUFFIX)?;
                (!branch.is_empty()).then(|| (branch.to_string(), parent))
            })
            .collect();
        Ok(pairs)
    }

    /// Loads the suspended restack, if any.
    fn restack_state(&self) -> StResult<Option<ResumableRestackState>> {
        if self.get(RESTACK_IN_PROGRESS_KEY)?.as_deref() != Some("true") {
            return Ok(None);
        }
        let remaining = self
            .get(RESTACK_REMAINING_KEY)?
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(ToOwned::to_owned)
            .collect();
        Ok(Some(ResumableRestackState { remaining }))
    }

    /// Persists `remaining` as the work left by a suspended restack.
    fn save_restack_state(&mut self, remaining: &[String]) -> StResult<()> {
        debug!(?remaining, "Persisting resumable restack state");
        self.set(RESTACK_IN_PROGRESS_KEY, "true")?;
        self.set(RESTACK_REMAINING_KEY, remaining.iter().join(",").as_str())
    }

    /// Discards any suspended restack.
    fn clear_restack_state(&mut self) -> StResult<()> {
        debug!("Clearing resumable restack state");
        self.unset(RESTACK_IN_PROGRESS_KEY)?;
        self.unset(RESTACK_REMAINING_KEY)
    }
}

impl<S: KvStore + ?Sized> StackMetadataExt for S {}

fn parent_key(branch: &str) -> String {
    format!("{}{}{}", STACK_KEY_PREFIX, branch, PARENT_KEY_SUFFIX)
}

#[cfg(test)]
mod test {
    use super::{GitConfigStore, KvStore, ResumableRestackState, StackMetadataExt};
    use crate::test_utils::{init_repository, MemoryStore};

    #[test]
    fn git_config_round_trip() {
        let (_dir, repo) = init_repository();
        let mut store = GitConfigStore::open(&repo).unwrap();

        assert_eq!(store.trunk().unwrap(), None);
        store.set_trunk("main").unwrap();
        store.set_parent("feat-a", "main").unwrap();
        store.set_parent("feat/b.v2", "feat-a").unwrap();

        // A fresh handle observes what the first one wrote.
        let reopened = GitConfigStore::open(&repo).unwrap();
        assert_eq!(reopened.trunk().unwrap().as_deref(), Some("main"));
        assert_eq!(reopened.parent_of("feat/b.v2").unwrap().as_deref(), Some("feat-a"));

        let mut parents = reopened.tracked_parents().unwrap();
        parents.sort();
        assert_eq!(
            parents,
            vec![
                ("feat-a".to_string(), "main".to_string()),
                ("feat/b.v2".to_string(), "feat-a".to_string()),
            ]
        );

        store.remove_parent("feat-a").unwrap();
        store.remove_parent("feat-a").unwrap();
        assert_eq!(store.parent_of("feat-a").unwrap(), None);
    }

    #[test]
    fn restack_state_lifecycle() {
        let mut store = MemoryStore::default();
        assert_eq!(store.restack_state().unwrap(), None);

        store
            .save_restack_state(&["b".to_string(), "c".to_string()])
            .unwrap();
        assert_eq!(
            store.restack_state().unwrap(),
            Some(ResumableRestackState {
                remaining: vec!["b".to_string(), "c".to_string()]
            })
        );

        store.clear_restack_state().unwrap();
        assert_eq!(store.restack_state().unwrap(), None);
        store.clear_restack_state().unwrap();
    }

    #[test]
    fn remaining_list_without_marker_is_ignored() {
        let mut store = MemoryStore::default();
        store.set("st.restack-remaining", "a,b").unwrap();
        assert_eq!(store.restack_state().unwrap(), None);
    }

    #[test]
    fn unrelated_stack_keys_are_skipped() {
        let mut store = MemoryStore::default();
        store.set("stack.feat-a.parent", "main").unwrap();
        store.set("stack.feat-a.description", "wip").unwrap();
        store.set("st.trunk", "main").unwrap();

        assert_eq!(
            store.tracked_parents().unwrap(),
            vec![("feat-a".to_string(), "main".to_string())]
        );
    }
}
