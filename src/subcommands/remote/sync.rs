//! `sync` subcommand.

use crate::{config::StConfig, subcommands::RepositoryContext};
use anyhow::Result;
use clap::Args;

/// CLI arguments for the `sync` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct SyncCmd {
    /// The remote to fetch from. Defaults to the `remote` set in `~/.st.toml`, or `origin`.
    #[clap(long, short, env = "ST_REMOTE")]
    remote: Option<String>,
}

impl SyncCmd {
    /// Run the `sync` subcommand.
    pub async fn run(self, mut ctx: RepositoryContext<'_>) -> Result<()> {
        let remote = match self.remote {
            Some(remote) => remote,
            None => StConfig::load()?.remote,
        };

        let outcome = ctx.sync(&remote)?;
        println!("{}", outcome);
        Ok(())
    }
}
