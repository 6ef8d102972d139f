//! Utilities for interacting with `git` repositories for the `st` application.

use crate::errors::{StError, StResult};
use git2::{BranchType, ErrorCode, IndexAddOption, Repository, RepositoryState};
use std::{
    env,
    path::Path,
    process::{Command, Stdio},
};
use tracing::{debug, trace};

/// Returns the repository for the current working directory, and [None] if
/// the current working directory is not within a git repository or an error
/// occurs.
pub fn active_repository() -> Option<Repository> {
    Repository::discover(env::current_dir().ok()?).ok()
}

/// The result of asking the backend to rebase a branch.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RebaseStatus {
    /// Every commit was re-applied.
    Completed,
    /// The rebase stopped on conflicts that must be resolved by hand.
    Conflicted,
}

/// Extension trait exposing the version control capabilities `st` consumes.
///
/// Implemented for [Repository]; tests swap in an in-memory double.
pub trait RepositoryExt {
    /// Returns the name of the checked out branch.
    ///
    /// ## Returns
    /// - `Ok(name)` - The short name of the branch `HEAD` points at.
    /// - `Err(_)` - If `HEAD` is detached or cannot be read.
    fn current_branch_name(&self) -> StResult<String>;

    /// Returns `true` if a local branch named `branch_name` exists.
    fn branch_exists(&self, branch_name: &str) -> bool;

    /// Creates `branch_name` at `HEAD` and checks it out.
    fn create_branch(&self, branch_name: &str) -> StResult<()>;

    /// Deletes the local branch `branch_name`.
    fn delete_branch(&self, branch_name: &str) -> StResult<()>;

    /// Checks out the local branch `branch_name`.
    fn checkout_branch(&self, branch_name: &str) -> StResult<()>;

    /// Returns the merge-base of two refs, as a hex commit id.
    fn merge_base(&self, a: &str, b: &str) -> StResult<String>;

    /// Returns the commit a ref points at, as a hex commit id.
    fn tip(&self, reference: &str) -> StResult<String>;

    /// Counts the commits reachable from `descendant` but not from `ancestor`.
    fn commit_count(&self, ancestor: &str, descendant: &str) -> StResult<usize>;

    /// Re-applies the commits of `branch` after `old_base` on top of `new_base`.
    ///
    /// ## Returns
    /// - `Ok(RebaseStatus::Completed)` - The branch now sits on `new_base`.
    /// - `Ok(RebaseStatus::Conflicted)` - The rebase halted on conflicts and is left in
    ///   progress for the operator.
    /// - `Err(_)` - The rebase could not be run at all.
    fn rebase_onto(&self, new_base: &str, old_base: &str, branch: &str) -> StResult<RebaseStatus>;

    /// Returns `true` if a rebase is suspended in the working copy.
    fn is_rebase_in_progress(&self) -> bool;

    /// Continues a suspended rebase after its conflicts have been resolved.
    fn rebase_continue(&self) -> StResult<()>;

    /// Returns `true` if any remote is configured.
    fn has_remote(&self) -> bool;

    /// Fetches from `remote`.
    fn fetch(&self, remote: &str) -> StResult<()>;

    /// Fast-forwards the local `branch` to its counterpart on `remote`, if one exists.
    fn fast_forward(&self, branch: &str, remote: &str) -> StResult<()>;

    /// Stages every change in the working tree, including deletions.
    fn stage_all(&self) -> StResult<()>;

    /// Returns `true` if the index differs from `HEAD`.
    fn has_staged_changes(&self) -> StResult<bool>;

    /// Commits the index on top of `HEAD`, returning the new commit id.
    fn commit_staged(&self, message: &str) -> StResult<String>;

    /// Replaces `HEAD` with a commit of the index. [None] keeps the message of `HEAD`.
    fn amend_head(&self, message: Option<&str>) -> StResult<String>;
}

impl RepositoryExt for Repository {
    fn current_branch_name(&self) -> StResult<String> {
        let head = match self.head() {
            Ok(head) => head,
            // An unborn branch still has a name.
            Err(e) if e.code() == ErrorCode::UnbornBranch => {
                let head = self.find_reference("HEAD")?;
                let target = head.symbolic_target().ok_or(StError::DetachedHead)?;
                return Ok(target.trim_start_matches("refs/heads/").to_string());
            }
            Err(e) => return Err(e.into()),
        };
        if !head.is_branch() {
            return Err(StError::DetachedHead);
        }
        head.shorthand()
            .map(ToOwned::to_owned)
            .ok_or(StError::DetachedHead)
    }

    fn branch_exists(&self, branch_name: &str) -> bool {
        self.find_branch(branch_name, BranchType::Local).is_ok()
    }

    fn create_branch(&self, branch_name: &str) -> StResult<()> {
        let head_commit = self.head()?.peel_to_commit()?;
        self.branch(branch_name, &head_commit, false)?;
        self.checkout_branch(branch_name)
    }

    fn delete_branch(&self, branch_name: &str) -> StResult<()> {
        self.find_branch(branch_name, BranchType::Local)?.delete()?;
        Ok(())
    }

    fn checkout_branch(&self, branch_name: &str) -> StResult<()> {
        let refname = format!("refs/heads/{}", branch_name);
        let target = self.revparse_single(refname.as_str())?;
        self.checkout_tree(&target, None)?;
        self.set_head(refname.as_str())?;
        Ok(())
    }

    fn merge_base(&self, a: &str, b: &str) -> StResult<String> {
        let a = self.revparse_single(a)?.peel_to_commit()?.id();
        let b = self.revparse_single(b)?.peel_to_commit()?.id();
        Ok(Repository::merge_base(self, a, b)?.to_string())
    }

    fn tip(&self, reference: &str) -> StResult<String> {
        Ok(self.revparse_single(reference)?.peel_to_commit()?.id().to_string())
    }

    fn commit_count(&self, ancestor: &str, descendant: &str) -> StResult<usize> {
        let mut walk = self.revwalk()?;
        walk.push(self.revparse_single(descendant)?.peel_to_commit()?.id())?;
        walk.hide(self.revparse_single(ancestor)?.peel_to_commit()?.id())?;
        walk.try_fold(0, |count, oid| oid.map(|_| count + 1))
            .map_err(Into::into)
    }

    fn rebase_onto(&self, new_base: &str, old_base: &str, branch: &str) -> StResult<RebaseStatus> {
        // `git2` cannot leave a conflicted rebase in the working copy for the operator to
        // resolve, so the rebase itself is delegated to `git`.
        let args = ["rebase", "--onto", new_base, old_base, branch];
        match run_git(self, &args) {
            Ok(_) => Ok(RebaseStatus::Completed),
            Err(e) if self.is_rebase_in_progress() => {
                debug!(branch, error = %e, "Rebase stopped on conflicts");
                Ok(RebaseStatus::Conflicted)
            }
            Err(e) => Err(e),
        }
    }

    fn is_rebase_in_progress(&self) -> bool {
        matches!(
            self.state(),
            RepositoryState::Rebase
                | RepositoryState::RebaseInteractive
                | RepositoryState::RebaseMerge
                | RepositoryState::ApplyMailboxOrRebase
        )
    }

    fn rebase_continue(&self) -> StResult<()> {
        run_git(self, &["-c", "core.editor=true", "rebase", "--continue"]).map(|_| ())
    }

    fn has_remote(&self) -> bool {
        self.remotes().map(|r| !r.is_empty()).unwrap_or_default()
    }

    fn fetch(&self, remote: &str) -> StResult<()> {
        run_git(self, &["fetch", remote]).map(|_| ())
    }

    fn fast_forward(&self, branch: &str, remote: &str) -> StResult<()> {
        let remote_ref = format!("refs/remotes/{}/{}", remote, branch);
        let remote_oid = match self.refname_to_id(remote_ref.as_str()) {
            Ok(oid) => oid,
            Err(e) if e.code() == ErrorCode::NotFound => {
                debug!(branch, remote, "No remote counterpart to fast-forward to");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        // Updating the checked out branch must also update the working copy.
        if self.current_branch_name().ok().as_deref() == Some(branch) {
            let upstream = format!("{}/{}", remote, branch);
            return run_git(self, &["merge", "--ff-only", upstream.as_str()]).map(|_| ());
        }

        let mut local = self.find_branch(branch, BranchType::Local)?.into_reference();
        let local_oid = local
            .target()
            .ok_or_else(|| StError::BranchDoesNotExist(branch.to_string()))?;
        if local_oid == remote_oid {
            return Ok(());
        }
        if !self.graph_descendant_of(remote_oid, local_oid)? {
            return Err(StError::GitCommand {
                args: format!("fast-forward {} to {}/{}", branch, remote, branch),
                output: "branches have diverged".to_string(),
            });
        }
        local.set_target(remote_oid, "st: fast-forward")?;
        Ok(())
    }

    fn stage_all(&self) -> StResult<()> {
        let mut index = self.index()?;
        index.add_all(["*"], IndexAddOption::DEFAULT, None)?;
        index.update_all(["*"], None)?;
        index.write()?;
        Ok(())
    }

    fn has_staged_changes(&self) -> StResult<bool> {
        let index = self.index()?;
        let head_tree = match self.head() {
            Ok(head) => Some(head.peel_to_tree()?),
            Err(e) if e.code() == ErrorCode::UnbornBranch => None,
            Err(e) => return Err(e.into()),
        };
        let diff = self.diff_tree_to_index(head_tree.as_ref(), Some(&index), None)?;
        Ok(diff.deltas().len() > 0)
    }

    fn commit_staged(&self, message: &str) -> StResult<String> {
        let signature = self.signature()?;
        let tree = self.find_tree(self.index()?.write_tree()?)?;
        let parent = match self.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(e) if e.code() == ErrorCode::UnbornBranch => None,
            Err(e) => return Err(e.into()),
        };
        let parents = parent.iter().collect::<Vec<_>>();

        let oid = self.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)?;
        debug!(%oid, "Committed staged changes");
        Ok(oid.to_string())
    }

    fn amend_head(&self, message: Option<&str>) -> StResult<String> {
        let head = self.head()?.peel_to_commit()?;
        let tree = self.find_tree(self.index()?.write_tree()?)?;
        let committer = self.signature()?;

        let oid = head.amend(Some("HEAD"), None, Some(&committer), None, message, Some(&tree))?;
        debug!(%oid, "Amended HEAD");
        Ok(oid.to_string())
    }
}

/// Runs `git` with `args` in the working directory of `repository`.
///
/// ## Returns
/// - `Ok(stdout)` - The trimmed standard output of a successful invocation.
/// - `Err(StError::GitCommand)` - If `git` exited unsuccessfully, carrying its output.
fn run_git(repository: &Repository, args: &[&str]) -> StResult<String> {
    let dir = repository
        .workdir()
        .unwrap_or_else(|| repository.path())
        .to_path_buf();
    run_git_in(&dir, args)
}

fn run_git_in(dir: &Path, args: &[&str]) -> StResult<String> {
    trace!(?args, "Running git");
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::null())
        .output()?;

    if output.status.success() {
        return Ok(String::from_utf8_lossy(&output.stdout).trim().to_string());
    }

    let mut combined = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        if !combined.is_empty() {
            combined.push('\n');
        }
        combined.push_str(stderr.trim());
    }
    Err(StError::GitCommand {
        args: args.join(" "),
        output: combined,
    })
}
