//! `create` subcommand.

use crate::subcommands::RepositoryContext;
use anyhow::Result;
use clap::Args;
use nu_ansi_term::Color::Blue;

/// CLI arguments for the `create` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct CreateCmd {
    /// Name of the new branch to create.
    #[clap(index = 1)]
    branch_name: String,
    /// Stage all changes before committing.
    #[clap(long, short)]
    all: bool,
    /// Commit the staged changes on the current branch with this message before
    /// branching.
    #[clap(long, short)]
    message: Option<String>,
}

impl CreateCmd {
    /// Run the `create` subcommand.
    pub fn run(self, mut ctx: RepositoryContext<'_>) -> Result<()> {
        let created =
            ctx.create_branch(&self.branch_name, self.all, self.message.as_deref())?;

        if let Some(commit) = created.commit {
            println!(
                "Committed staged changes on `{}` ({}).",
                Blue.paint(&created.parent),
                commit
            );
        }
        println!(
            "Successfully created and tracked new branch `{}` on top of `{}`.",
            Blue.paint(&self.branch_name),
            Blue.paint(&created.parent)
        );
        Ok(())
    }
}
