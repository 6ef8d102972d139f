//! Test doubles and fixtures shared by the unit tests.

use crate::{
    errors::{StError, StResult},
    git::{RebaseStatus, RepositoryExt},
    store::KvStore,
};
use git2::{Oid, Repository, RepositoryInitOptions, Signature};
use std::{
    cell::RefCell,
    collections::{BTreeMap, HashMap, HashSet},
    fs,
    path::Path,
};
use tempfile::TempDir;

/// A [KvStore] held in memory.
#[derive(Default, Debug, Clone)]
pub(crate) struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> StResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn unset(&mut self, key: &str) -> StResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn entries(&self, prefix: &str) -> StResult<Vec<(String, String)>> {
        Ok(self
            .entries
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }
}

/// A rebase halted on conflicts, waiting for [MockRepository::resolve].
#[derive(Debug, Clone)]
struct PendingRebase {
    branch: String,
    history: Vec<String>,
}

#[derive(Default, Debug)]
struct MockState {
    /// Each branch's history, oldest commit first.
    branches: HashMap<String, Vec<String>>,
    /// Histories of the remote's branches, once fetched.
    remote: Option<HashMap<String, Vec<String>>>,
    head: Option<String>,
    next_commit: usize,
    conflicts: HashSet<String>,
    pending: Option<PendingRebase>,
    rebase_calls: Vec<String>,
    fetches: Vec<String>,
    failing_queries: HashSet<String>,
    failing_checkouts: HashSet<String>,
    unstaged: bool,
    staged: bool,
    messages: Vec<String>,
}

impl MockState {
    fn new_commit(&mut self) -> String {
        let id = format!("c{}", self.next_commit);
        self.next_commit += 1;
        id
    }

    fn history(&self, reference: &str) -> StResult<&Vec<String>> {
        if self.failing_queries.contains(reference) {
            return Err(git_error("rev-parse", reference));
        }
        self.branches
            .get(reference)
            .ok_or_else(|| git_error("rev-parse", reference))
    }
}

fn git_error(command: &str, reference: &str) -> StError {
    StError::GitCommand {
        args: format!("{command} {reference}"),
        output: format!("fatal: bad revision '{reference}'"),
    }
}

/// An in-memory version control backend.
///
/// Branch histories are linear lists of commit ids. Rebasing replays the commits after
/// the old base as fresh commits on the new base, so merge-bases move the way they do in
/// `git`.
#[derive(Debug)]
pub(crate) struct MockRepository {
    state: RefCell<MockState>,
}

impl MockRepository {
    /// Creates a repository holding a single commit on `trunk`, which is checked out.
    pub(crate) fn new(trunk: &str) -> Self {
        let mut state = MockState::default();
        let root = state.new_commit();
        state.branches.insert(trunk.to_string(), vec![root]);
        state.head = Some(trunk.to_string());
        Self {
            state: RefCell::new(state),
        }
    }

    /// Creates `name` with one commit on top of `from`, and checks it out.
    pub(crate) fn branch(&self, name: &str, from: &str) {
        let mut state = self.state.borrow_mut();
        let mut history = state.branches[from].clone();
        history.push(state.new_commit());
        state.branches.insert(name.to_string(), history);
        state.head = Some(name.to_string());
    }

    /// Adds a commit to `name`.
    pub(crate) fn commit(&self, name: &str) {
        let mut state = self.state.borrow_mut();
        let id = state.new_commit();
        state
            .branches
            .get_mut(name)
            .expect("committing to a missing branch")
            .push(id);
    }

    /// Points `branch` at the tip of `onto`.
    pub(crate) fn reset_to(&self, branch: &str, onto: &str) {
        let mut state = self.state.borrow_mut();
        let history = state.branches[onto].clone();
        state.branches.insert(branch.to_string(), history);
    }

    pub(crate) fn checkout(&self, name: &str) {
        self.state.borrow_mut().head = Some(name.to_string());
    }

    pub(crate) fn head(&self) -> Option<String> {
        self.state.borrow().head.clone()
    }

    /// Makes the next rebase of `branch` stop on conflicts.
    pub(crate) fn conflict_on(&self, branch: &str) {
        self.state.borrow_mut().conflicts.insert(branch.to_string());
    }

    /// Resolves the conflicts of the suspended rebase and finishes it.
    pub(crate) fn resolve(&self) {
        self.rebase_continue().expect("no rebase to resolve");
    }

    /// Abandons the suspended rebase, leaving the branch as it was.
    pub(crate) fn abort_rebase(&self) {
        self.state.borrow_mut().pending = None;
    }

    pub(crate) fn is_rebasing(&self) -> bool {
        self.state.borrow().pending.is_some()
    }

    /// The branches passed to [RepositoryExt::rebase_onto], in call order.
    pub(crate) fn rebase_calls(&self) -> Vec<String> {
        self.state.borrow().rebase_calls.clone()
    }

    /// Makes every ancestry query involving `reference` fail.
    pub(crate) fn fail_queries_for(&self, reference: &str) {
        self.state
            .borrow_mut()
            .failing_queries
            .insert(reference.to_string());
    }

    /// Makes checking out `branch` fail.
    pub(crate) fn fail_checkout_of(&self, branch: &str) {
        self.state
            .borrow_mut()
            .failing_checkouts
            .insert(branch.to_string());
    }

    /// Configures a remote mirroring the current local branches.
    pub(crate) fn add_remote(&self) {
        let mut state = self.state.borrow_mut();
        let branches = state.branches.clone();
        state.remote = Some(branches);
    }

    /// Moves the remote's `branch` to one new commit on top of the local `onto`.
    pub(crate) fn advance_remote(&self, branch: &str, onto: &str) {
        let mut state = self.state.borrow_mut();
        let mut history = state.branches[onto].clone();
        history.push(state.new_commit());
        state
            .remote
            .as_mut()
            .expect("no remote configured")
            .insert(branch.to_string(), history);
    }

    /// Leaves an unstaged change in the working tree.
    pub(crate) fn edit(&self) {
        self.state.borrow_mut().unstaged = true;
    }

    /// The messages of every commit made or amended, in call order.
    pub(crate) fn messages(&self) -> Vec<String> {
        self.state.borrow().messages.clone()
    }

    /// The remotes fetched from, in call order.
    pub(crate) fn fetches(&self) -> Vec<String> {
        self.state.borrow().fetches.clone()
    }
}

impl RepositoryExt for MockRepository {
    fn current_branch_name(&self) -> StResult<String> {
        self.state.borrow().head.clone().ok_or(StError::DetachedHead)
    }

    fn branch_exists(&self, branch_name: &str) -> bool {
        self.state.borrow().branches.contains_key(branch_name)
    }

    fn create_branch(&self, branch_name: &str) -> StResult<()> {
        let mut state = self.state.borrow_mut();
        let head = state.head.clone().ok_or(StError::DetachedHead)?;
        let history = state.history(&head)?.clone();
        state.branches.insert(branch_name.to_string(), history);
        state.head = Some(branch_name.to_string());
        Ok(())
    }

    fn delete_branch(&self, branch_name: &str) -> StResult<()> {
        self.state
            .borrow_mut()
            .branches
            .remove(branch_name)
            .map(|_| ())
            .ok_or_else(|| StError::BranchDoesNotExist(branch_name.to_string()))
    }

    fn checkout_branch(&self, branch_name: &str) -> StResult<()> {
        let mut state = self.state.borrow_mut();
        if state.failing_checkouts.contains(branch_name) {
            return Err(git_error("checkout", branch_name));
        }
        if !state.branches.contains_key(branch_name) {
            return Err(StError::BranchDoesNotExist(branch_name.to_string()));
        }
        state.head = Some(branch_name.to_string());
        Ok(())
    }

    fn merge_base(&self, a: &str, b: &str) -> StResult<String> {
        let state = self.state.borrow();
        let (a_history, b_history) = (state.history(a)?, state.history(b)?);
        a_history
            .iter()
            .zip(b_history)
            .take_while(|(x, y)| x == y)
            .last()
            .map(|(commit, _)| commit.clone())
            .ok_or_else(|| git_error("merge-base", a))
    }

    fn tip(&self, reference: &str) -> StResult<String> {
        let state = self.state.borrow();
        state
            .history(reference)?
            .last()
            .cloned()
            .ok_or_else(|| git_error("rev-parse", reference))
    }

    fn commit_count(&self, ancestor: &str, descendant: &str) -> StResult<usize> {
        let state = self.state.borrow();
        let ancestor = state.history(ancestor)?;
        Ok(state
            .history(descendant)?
            .iter()
            .filter(|commit| !ancestor.contains(commit))
            .count())
    }

    fn rebase_onto(&self, new_base: &str, old_base: &str, branch: &str) -> StResult<RebaseStatus> {
        let mut state = self.state.borrow_mut();
        state.rebase_calls.push(branch.to_string());

        let current = state.history(branch)?.clone();
        let base = state.history(new_base)?.clone();
        let replay_from = current
            .iter()
            .position(|commit| commit == old_base)
            .map(|i| i + 1)
            .ok_or_else(|| git_error("rebase --onto", old_base))?;

        let mut history = base;
        for _ in replay_from..current.len() {
            history.push(state.new_commit());
        }
        state.head = Some(branch.to_string());

        if state.conflicts.remove(branch) {
            state.pending = Some(PendingRebase {
                branch: branch.to_string(),
                history,
            });
            return Ok(RebaseStatus::Conflicted);
        }
        state.branches.insert(branch.to_string(), history);
        Ok(RebaseStatus::Completed)
    }

    fn is_rebase_in_progress(&self) -> bool {
        self.is_rebasing()
    }

    fn rebase_continue(&self) -> StResult<()> {
        let mut state = self.state.borrow_mut();
        let pending = state
            .pending
            .take()
            .ok_or_else(|| git_error("rebase", "--continue"))?;
        state.branches.insert(pending.branch, pending.history);
        Ok(())
    }

    fn has_remote(&self) -> bool {
        self.state.borrow().remote.is_some()
    }

    fn fetch(&self, remote: &str) -> StResult<()> {
        self.state.borrow_mut().fetches.push(remote.to_string());
        Ok(())
    }

    fn fast_forward(&self, branch: &str, remote: &str) -> StResult<()> {
        let mut state = self.state.borrow_mut();
        let remote_history = state
            .remote
            .as_ref()
            .and_then(|branches| branches.get(branch))
            .cloned()
            .ok_or_else(|| git_error("merge --ff-only", remote))?;
        state.branches.insert(branch.to_string(), remote_history);
        Ok(())
    }

    fn stage_all(&self) -> StResult<()> {
        let mut state = self.state.borrow_mut();
        let unstaged = std::mem::take(&mut state.unstaged);
        state.staged |= unstaged;
        Ok(())
    }

    fn has_staged_changes(&self) -> StResult<bool> {
        Ok(self.state.borrow().staged)
    }

    fn commit_staged(&self, message: &str) -> StResult<String> {
        let mut state = self.state.borrow_mut();
        let head = state.head.clone().ok_or(StError::DetachedHead)?;
        let id = state.new_commit();
        state
            .branches
            .get_mut(&head)
            .ok_or_else(|| StError::BranchDoesNotExist(head.clone()))?
            .push(id.clone());
        state.staged = false;
        state.messages.push(message.to_string());
        Ok(id)
    }

    fn amend_head(&self, message: Option<&str>) -> StResult<String> {
        let mut state = self.state.borrow_mut();
        let head = state.head.clone().ok_or(StError::DetachedHead)?;
        let id = state.new_commit();
        let history = state
            .branches
            .get_mut(&head)
            .ok_or_else(|| StError::BranchDoesNotExist(head.clone()))?;
        history.pop();
        history.push(id.clone());
        state.staged = false;
        let message = message.unwrap_or("(amended)").to_string();
        state.messages.push(message);
        Ok(id)
    }
}

/// Creates a repository in a temporary directory, with `main` as its initial branch and
/// an identity configured for committing.
pub(crate) fn init_repository() -> (TempDir, Repository) {
    let dir = TempDir::new().unwrap();
    let mut opts = RepositoryInitOptions::new();
    opts.initial_head("main");
    let repo = Repository::init_opts(dir.path(), &opts).unwrap();

    {
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "st").unwrap();
        config.set_str("user.email", "st@example.com").unwrap();
    }
    (dir, repo)
}

/// Writes `contents` to `path` in the working directory and commits it on `HEAD`.
pub(crate) fn commit_file(repo: &Repository, path: &str, contents: &str, message: &str) -> Oid {
    let workdir = repo.workdir().unwrap();
    fs::write(workdir.join(path), contents).unwrap();

    let mut index = repo.index().unwrap();
    index.add_path(Path::new(path)).unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();

    let signature = Signature::now("st", "st@example.com").unwrap();
    let parent = repo.head().ok().and_then(|head| head.peel_to_commit().ok());
    let parents = parent.iter().collect::<Vec<_>>();
    repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
        .unwrap()
}
