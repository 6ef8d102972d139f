//! `modify` subcommand.

use crate::{ctx::Modification, subcommands::RepositoryContext};
use anyhow::Result;
use clap::Args;

/// CLI arguments for the `modify` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct ModifyCmd {
    /// Stage all changes before committing.
    #[clap(long, short)]
    all: bool,
    /// Create a new commit instead of amending `HEAD`.
    #[clap(long, short)]
    commit: bool,
    /// The commit message. Required with `--commit`.
    #[clap(long, short)]
    message: Option<String>,
}

impl ModifyCmd {
    /// Run the `modify` subcommand.
    pub fn run(self, ctx: RepositoryContext<'_>) -> Result<()> {
        match ctx.modify(self.all, self.commit, self.message.as_deref())? {
            Modification::Amended(commit) => println!("Amended HEAD ({}).", commit),
            Modification::Committed(commit) => println!("Created new commit ({}).", commit),
        }

        // Children still sit on the commit that was just replaced or extended.
        if ctx
            .tree
            .current_branch()
            .is_some_and(|branch| !branch.children.is_empty())
        {
            println!("Children of the current branch need a restack. Run `st restack`.");
        }
        Ok(())
    }
}
