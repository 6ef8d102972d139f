//! `down` subcommand.

use super::checkout_resolved;
use crate::subcommands::RepositoryContext;
use anyhow::Result;
use clap::Args;

/// CLI arguments for the `down` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct DownCmd {
    /// How many branches to move.
    #[clap(index = 1, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    n: u32,
}

impl DownCmd {
    /// Run the `down` subcommand.
    pub fn run(self, ctx: RepositoryContext<'_>) -> Result<()> {
        checkout_resolved(&ctx, ctx.tree.navigate_down(self.n as usize))
    }
}
