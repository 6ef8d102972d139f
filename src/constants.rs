//! Constants for the `st` application.

/// The name of the user-level configuration file, relative to `$HOME`.
pub(crate) const ST_CFG_FILE_NAME: &str = ".st.toml";

/// The default remote used by `st sync`.
pub(crate) const DEFAULT_REMOTE: &str = "origin";

/// Branch names tried, in order, when `st init` is run without `--trunk`.
pub(crate) const TRUNK_CANDIDATES: [&str; 2] = ["main", "master"];

/// Git config key holding the trunk branch name.
pub(crate) const TRUNK_KEY: &str = "st.trunk";
/// Prefix of the per-branch parent entries, `stack.<branch>.parent`.
pub(crate) const STACK_KEY_PREFIX: &str = "stack.";
/// Suffix of the per-branch parent entries, `stack.<branch>.parent`.
pub(crate) const PARENT_KEY_SUFFIX: &str = ".parent";
/// Git config key set to `true` while a restack is suspended on a conflict.
pub(crate) const RESTACK_IN_PROGRESS_KEY: &str = "st.restack-in-progress";
/// Git config key holding the comma-joined branches left to restack.
pub(crate) const RESTACK_REMAINING_KEY: &str = "st.restack-remaining";

pub(crate) const CHECK_MARK: char = '✓';
pub(crate) const CROSS_MARK: char = '✗';
pub(crate) const MIDDLE_DOT: char = '·';
