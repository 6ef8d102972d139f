//! `restack` subcommand.

use crate::subcommands::RepositoryContext;
use anyhow::Result;
use clap::Args;

/// CLI arguments for the `restack` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct RestackCmd {
    /// Restack every stack, rather than only the current one.
    #[clap(long, short)]
    all: bool,
}

impl RestackCmd {
    /// Run the `restack` subcommand.
    pub fn run(self, mut ctx: RepositoryContext<'_>) -> Result<()> {
        let outcome = if self.all {
            ctx.restack_all()?
        } else {
            ctx.restack_current()?
        };

        println!("{}", outcome);
        Ok(())
    }
}
