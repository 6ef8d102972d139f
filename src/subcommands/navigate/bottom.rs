//! `bottom` subcommand.

use super::checkout_resolved;
use crate::subcommands::RepositoryContext;
use anyhow::Result;
use clap::Args;

/// CLI arguments for the `bottom` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct BottomCmd;

impl BottomCmd {
    /// Run the `bottom` subcommand.
    pub fn run(self, ctx: RepositoryContext<'_>) -> Result<()> {
        checkout_resolved(&ctx, ctx.tree.navigate_bottom())
    }
}
