//! `untrack` subcommand.

use crate::{git::RepositoryExt, subcommands::RepositoryContext};
use anyhow::Result;
use clap::Args;
use nu_ansi_term::Color::Blue;

/// CLI arguments for the `untrack` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct UntrackCmd {
    /// Name of the branch to stop tracking. Defaults to the current branch.
    #[clap(index = 1)]
    branch_name: Option<String>,
}

impl UntrackCmd {
    /// Run the `untrack` subcommand.
    pub fn run(self, mut ctx: RepositoryContext<'_>) -> Result<()> {
        let branch_name = match self.branch_name {
            Some(name) => name,
            None => ctx.repository.current_branch_name()?,
        };

        ctx.untrack(&branch_name)?;

        println!("Stopped tracking `{}`.", Blue.paint(&branch_name));
        Ok(())
    }
}
