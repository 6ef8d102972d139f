//! `branch` subcommand.

use crate::subcommands::RepositoryContext;
use anyhow::Result;
use clap::Args;

/// CLI arguments for the `branch` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct BranchCmd;

impl BranchCmd {
    /// Run the `branch` subcommand.
    pub fn run(self, ctx: RepositoryContext<'_>) -> Result<()> {
        println!("{}", ctx.branch_info()?);
        Ok(())
    }
}
