//! Subcommands pertaining to the branches tracked with `st`.

mod init;
pub use init::InitCmd;

mod create;
pub use create::CreateCmd;

mod modify;
pub use modify::ModifyCmd;

mod branch;
pub use branch::BranchCmd;

mod track;
pub use track::TrackCmd;

mod untrack;
pub use untrack::UntrackCmd;

mod reparent;
pub use reparent::ReparentCmd;

mod delete;
pub use delete::DeleteCmd;
