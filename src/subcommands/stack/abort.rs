//! `abort` subcommand.

use crate::subcommands::RepositoryContext;
use anyhow::Result;
use clap::Args;

/// CLI arguments for the `abort` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct AbortCmd;

impl AbortCmd {
    /// Run the `abort` subcommand.
    pub fn run(self, mut ctx: RepositoryContext<'_>) -> Result<()> {
        ctx.abort_restack()?;
        println!("Discarded the suspended restack. Branches already rebased keep their new base.");
        Ok(())
    }
}
