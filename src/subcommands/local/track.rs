//! `track` subcommand.

use crate::{git::RepositoryExt, subcommands::RepositoryContext};
use anyhow::Result;
use clap::Args;
use nu_ansi_term::Color::Blue;

/// CLI arguments for the `track` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct TrackCmd {
    /// Name of the branch to track. Defaults to the current branch.
    #[clap(index = 1)]
    branch_name: Option<String>,
    /// The parent of the branch. Defaults to the trunk branch.
    #[clap(long, short)]
    parent: Option<String>,
}

impl TrackCmd {
    /// Run the `track` subcommand.
    pub fn run(self, mut ctx: RepositoryContext<'_>) -> Result<()> {
        let branch_name = match self.branch_name {
            Some(name) => name,
            None => ctx.repository.current_branch_name()?,
        };
        let parent = self
            .parent
            .unwrap_or_else(|| ctx.tree.trunk_name.clone());

        ctx.track(&branch_name, &parent)?;

        println!(
            "Tracking `{}` on top of `{}`.",
            Blue.paint(&branch_name),
            Blue.paint(&parent)
        );
        if ctx.needs_restack(&branch_name) {
            println!("`{}` needs a restack. Run `st restack`.", Blue.paint(&branch_name));
        }
        Ok(())
    }
}
