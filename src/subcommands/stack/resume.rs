//! `continue` subcommand.

use crate::subcommands::RepositoryContext;
use anyhow::Result;
use clap::Args;

/// CLI arguments for the `continue` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct ContinueCmd;

impl ContinueCmd {
    /// Run the `continue` subcommand.
    pub fn run(self, mut ctx: RepositoryContext<'_>) -> Result<()> {
        let outcome = ctx.continue_restack()?;
        println!("{}", outcome);
        Ok(())
    }
}
