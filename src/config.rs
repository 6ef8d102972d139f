//! User-level configuration for `st`, read from `~/.st.toml`.

use crate::{
    constants::{DEFAULT_REMOTE, ST_CFG_FILE_NAME},
    errors::StResult,
};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::{env, path::PathBuf};
use tracing::debug;

/// The path of the configuration file, or [None] if `$HOME` is not set.
static CONFIG_PATH: Lazy<Option<PathBuf>> =
    Lazy::new(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(ST_CFG_FILE_NAME)));

/// The user-level configuration for `st`.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StConfig {
    /// The remote `st sync` fetches from.
    pub remote: String,
}

impl Default for StConfig {
    fn default() -> Self {
        Self {
            remote: DEFAULT_REMOTE.to_string(),
        }
    }
}

impl StConfig {
    /// Loads the configuration file, falling back to defaults if it does not exist.
    pub fn load() -> StResult<Self> {
        match CONFIG_PATH.as_ref() {
            Some(path) if path.exists() => {
                debug!(path = %path.display(), "Loading configuration");
                Self::parse(&std::fs::read_to_string(path)?)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Parses a configuration from its TOML representation.
    pub fn parse(contents: &str) -> StResult<Self> {
        toml::from_str(contents).map_err(Into::into)
    }
}
