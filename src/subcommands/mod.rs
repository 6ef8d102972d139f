//! The subcommands for the `st` application.

use crate::{ctx::StContext, store::GitConfigStore};
use clap::Subcommand;
use git2::Repository;
use local::{
    BranchCmd, CreateCmd, DeleteCmd, InitCmd, ModifyCmd, ReparentCmd, TrackCmd, UntrackCmd,
};
use navigate::{BottomCmd, DownCmd, TopCmd, UpCmd};
use remote::SyncCmd;
use stack::{AbortCmd, ContinueCmd, RestackCmd};

mod local;
mod navigate;
mod remote;
mod stack;

/// The context the subcommands operate on: a git repository, with the stack metadata
/// held in its local config.
pub type RepositoryContext<'a> = StContext<'a, Repository, GitConfigStore>;

#[derive(Debug, Clone, Eq, PartialEq, Subcommand)]
pub enum Subcommands {
    /// Configure the trunk branch of the repository.
    Init(InitCmd),
    /// Create a new branch on top of the current one, and track it.
    #[clap(alias = "c")]
    Create(CreateCmd),
    /// Amend `HEAD` with the staged changes, or add a new commit with them.
    #[clap(alias = "m")]
    Modify(ModifyCmd),
    /// Show where the current branch sits in its stack.
    #[clap(alias = "br")]
    Branch(BranchCmd),
    /// Track an existing branch on top of a parent branch.
    #[clap(alias = "tr")]
    Track(TrackCmd),
    /// Stop tracking a branch. Its children become the roots of their own stacks.
    #[clap(alias = "ut")]
    Untrack(UntrackCmd),
    /// Move the current branch onto a different parent.
    #[clap(alias = "rp")]
    Reparent(ReparentCmd),
    /// Delete a tracked branch, moving its children onto its parent.
    #[clap(alias = "d")]
    Delete(DeleteCmd),
    /// Check out a child of the current branch.
    #[clap(alias = "u")]
    Up(UpCmd),
    /// Check out the parent of the current branch.
    #[clap(alias = "dn")]
    Down(DownCmd),
    /// Check out the tip of the current stack.
    #[clap(alias = "t")]
    Top(TopCmd),
    /// Check out the root of the current stack.
    #[clap(alias = "b")]
    Bottom(BottomCmd),
    /// Rebase every branch of the current stack onto its parent.
    #[clap(alias = "r")]
    Restack(RestackCmd),
    /// Resume a restack that stopped on conflicts.
    Continue(ContinueCmd),
    /// Discard a restack that stopped on conflicts.
    Abort(AbortCmd),
    /// Fetch the remote, clean up merged branches, and restack every stack.
    #[clap(alias = "s")]
    Sync(SyncCmd),
}

impl Subcommands {
    /// Run the subcommand with the given repository.
    pub async fn run(self, repository: &Repository, store: GitConfigStore) -> anyhow::Result<()> {
        match self {
            // `init` runs before the repository is configured.
            Self::Init(args) => args.run(repository, store),
            cmd => cmd.run_with(StContext::load(repository, store)?).await,
        }
    }

    async fn run_with(self, ctx: RepositoryContext<'_>) -> anyhow::Result<()> {
        match self {
            Self::Init(args) => args.run(ctx.repository, ctx.store),
            Self::Create(args) => args.run(ctx),
            Self::Modify(args) => args.run(ctx),
            Self::Branch(args) => args.run(ctx),
            Self::Track(args) => args.run(ctx),
            Self::Untrack(args) => args.run(ctx),
            Self::Reparent(args) => args.run(ctx),
            Self::Delete(args) => args.run(ctx),
            Self::Up(args) => args.run(ctx),
            Self::Down(args) => args.run(ctx),
            Self::Top(args) => args.run(ctx),
            Self::Bottom(args) => args.run(ctx),
            Self::Restack(args) => args.run(ctx),
            Self::Continue(args) => args.run(ctx),
            Self::Abort(args) => args.run(ctx),
            Self::Sync(args) => args.run(ctx).await,
        }
    }
}
