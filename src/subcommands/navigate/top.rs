//! `top` subcommand.

use super::checkout_resolved;
use crate::subcommands::RepositoryContext;
use anyhow::Result;
use clap::Args;

/// CLI arguments for the `top` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct TopCmd;

impl TopCmd {
    /// Run the `top` subcommand.
    pub fn run(self, ctx: RepositoryContext<'_>) -> Result<()> {
        checkout_resolved(&ctx, ctx.tree.navigate_top())
    }
}
