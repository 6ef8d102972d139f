//! `up` subcommand.

use super::checkout_resolved;
use crate::subcommands::RepositoryContext;
use anyhow::Result;
use clap::Args;

/// CLI arguments for the `up` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct UpCmd {
    /// How many branches to move.
    #[clap(index = 1, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    n: u32,
}

impl UpCmd {
    /// Run the `up` subcommand.
    pub fn run(self, ctx: RepositoryContext<'_>) -> Result<()> {
        checkout_resolved(&ctx, ctx.tree.navigate_up(self.n as usize))
    }
}
