//! `init` subcommand.

use crate::{ctx::StContext, store::GitConfigStore};
use anyhow::Result;
use clap::Args;
use git2::Repository;
use nu_ansi_term::Color;

/// CLI arguments for the `init` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct InitCmd {
    /// The trunk branch. Defaults to `main` or `master`, whichever exists.
    #[clap(long, short)]
    trunk: Option<String>,
}

impl InitCmd {
    /// Run the `init` subcommand.
    pub fn run(self, repository: &Repository, mut store: GitConfigStore) -> Result<()> {
        let trunk = StContext::initialize(repository, &mut store, self.trunk)?;
        println!(
            "Initialized `st` with trunk branch `{}`.",
            Color::Blue.paint(trunk)
        );
        Ok(())
    }
}
