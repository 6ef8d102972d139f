//! Subcommands pertaining to the remote.

mod sync;
pub use sync::SyncCmd;
