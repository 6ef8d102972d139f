//! `reparent` subcommand.

use crate::{git::RepositoryExt, subcommands::RepositoryContext};
use anyhow::Result;
use clap::Args;
use nu_ansi_term::Color::Blue;

/// CLI arguments for the `reparent` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct ReparentCmd {
    /// The new parent of the current branch.
    #[clap(index = 1)]
    parent: String,
}

impl ReparentCmd {
    /// Run the `reparent` subcommand.
    pub fn run(self, mut ctx: RepositoryContext<'_>) -> Result<()> {
        let branch_name = ctx.repository.current_branch_name()?;

        if !ctx.reparent(&branch_name, &self.parent)? {
            println!(
                "`{}` already sits on top of `{}`.",
                Blue.paint(&branch_name),
                Blue.paint(&self.parent)
            );
            return Ok(());
        }

        println!(
            "Moved `{}` onto `{}`. Run `st restack` to rebase it.",
            Blue.paint(&branch_name),
            Blue.paint(&self.parent)
        );
        Ok(())
    }
}
