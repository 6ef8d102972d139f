//! Subcommands pertaining to restacking.

mod restack;
pub use restack::RestackCmd;

mod resume;
pub use resume::ContinueCmd;

mod abort;
pub use abort::AbortCmd;
