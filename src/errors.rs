//! Error types for the `st` application.

use nu_ansi_term::Color;
use thiserror::Error;

/// The error type returned by every fallible operation within `st`.
#[derive(Error, Debug)]
pub enum StError {
    /// No trunk branch has been configured for the repository.
    #[error("`st` is not initialized in this repository. Run `st init` first.")]
    NotInitialized,
    /// The branch is not tracked with `st`.
    #[error("Branch `{}` is not tracked with `st`.", Color::Blue.paint(.0))]
    BranchNotTracked(String),
    /// The checked out branch is not tracked with `st`.
    #[error("The current branch is not tracked with `st`.")]
    CurrentBranchNotTracked,
    /// Moving further away from trunk is not possible.
    #[error("Already at the top of the stack.")]
    AlreadyAtTop,
    /// Moving further toward trunk is not possible.
    #[error("Already at the bottom of the stack.")]
    AlreadyAtBottom,
    /// There is no suspended restack to resume or abort.
    #[error("No restack in progress.")]
    NothingToResume,
    /// A suspended restack must be resumed or aborted first.
    #[error("A restack is already in progress. Resolve conflicts and run `st continue`, or run `st abort`.")]
    RestackInProgress,
    /// The trunk branch cannot be tracked, untracked or reparented.
    #[error("Cannot track or reparent the trunk branch `{}`.", Color::Blue.paint(.0))]
    CannotTrackTrunk(String),
    /// A branch cannot be its own parent.
    #[error("Cannot parent branch `{}` onto itself.", Color::Blue.paint(.0))]
    CannotReparentToSelf(String),
    /// The requested parent is a descendant of the branch.
    #[error(
        "Cannot parent `{}` onto `{}`: `{}` is a descendant of `{}`.",
        Color::Blue.paint(.branch),
        Color::Blue.paint(.parent),
        Color::Blue.paint(.parent),
        Color::Blue.paint(.branch)
    )]
    ReparentCycle { branch: String, parent: String },
    /// The branch does not exist in the repository.
    #[error("Branch `{}` does not exist.", Color::Blue.paint(.0))]
    BranchDoesNotExist(String),
    /// The branch already exists in the repository.
    #[error("Branch `{}` already exists.", Color::Blue.paint(.0))]
    BranchAlreadyExists(String),
    /// No trunk was given and none could be detected.
    #[error("Could not detect the trunk branch. Pass it with `--trunk`.")]
    TrunkNotDetected,
    /// Amending requires staged changes or a new message.
    #[error("No staged changes to commit. Use `-a` to stage all changes.")]
    NothingStaged,
    /// A new commit was requested without a message.
    #[error("A commit message is required. Pass it with `-m`.")]
    CommitMessageRequired,
    /// `HEAD` does not point at a local branch.
    #[error("HEAD is detached; check out a branch first.")]
    DetachedHead,
    /// A `git` subprocess exited unsuccessfully for reasons other than a conflict.
    #[error("`git {}` failed: {}", .args, .output)]
    GitCommand { args: String, output: String },
    /// A [git2::Error] occurred.
    #[error("libgit2 error: {}", .0)]
    Git(#[from] git2::Error),
    /// An [std::io::Error] occurred.
    #[error("I/O error: {}", .0)]
    Io(#[from] std::io::Error),
    /// The configuration file could not be parsed.
    #[error("Invalid configuration: {}", .0)]
    Config(#[from] toml::de::Error),
}

impl StError {
    /// Returns `true` if the error marks the edge of a stack rather than a failure.
    pub fn is_navigation_boundary(&self) -> bool {
        matches!(self, Self::AlreadyAtTop | Self::AlreadyAtBottom)
    }
}

/// Result alias for operations that fail with [StError].
pub type StResult<T> = Result<T, StError>;
