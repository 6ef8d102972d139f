//! `delete` subcommand.

use crate::{git::RepositoryExt, subcommands::RepositoryContext};
use anyhow::{bail, Result};
use clap::Args;
use nu_ansi_term::Color;

/// CLI arguments for the `delete` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct DeleteCmd {
    /// Name of the branch to delete. Defaults to the current branch.
    #[clap(index = 1)]
    branch_name: Option<String>,
}

impl DeleteCmd {
    /// Run the `delete` subcommand.
    pub fn run(self, mut ctx: RepositoryContext<'_>) -> Result<()> {
        let branch_name = match self.branch_name {
            Some(name) => name,
            None => ctx.repository.current_branch_name()?,
        };

        if branch_name == ctx.tree.trunk_name {
            bail!("Cannot delete the trunk branch.");
        }

        let moved = ctx.delete_branch(&branch_name)?;

        println!(
            "Successfully deleted branch `{}`.",
            Color::Blue.paint(&branch_name)
        );
        for child in moved {
            println!("  Moved `{}` onto its grandparent.", Color::Blue.paint(child));
        }
        Ok(())
    }
}
