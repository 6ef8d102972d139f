//! Subcommands for moving between the branches of a stack.

use super::RepositoryContext;
use crate::errors::StResult;
use anyhow::Result;
use nu_ansi_term::Color::Blue;

mod up;
pub use up::UpCmd;

mod down;
pub use down::DownCmd;

mod top;
pub use top::TopCmd;

mod bottom;
pub use bottom::BottomCmd;

/// Checks out the branch a navigation resolved to. Reaching the edge of the stack is
/// reported, not treated as a failure.
fn checkout_resolved(ctx: &RepositoryContext<'_>, target: StResult<&str>) -> Result<()> {
    match target {
        Ok(branch_name) => {
            ctx.checkout(branch_name)?;
            println!("Checked out `{}`.", Blue.paint(branch_name));
            Ok(())
        }
        Err(e) if e.is_navigation_boundary() => {
            println!("{}", e);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
