//! Contains the formatting logic for the outcomes of [StContext] operations.
//!
//! [StContext]: super::StContext

use super::{BranchInfo, RestackOutcome, SyncOutcome};
use crate::constants::{CHECK_MARK, CROSS_MARK, MIDDLE_DOT};
use nu_ansi_term::Color;
use std::fmt::{Display, Formatter, Result};

impl Display for RestackOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        for branch in &self.rebased {
            writeln!(
                f,
                "  {} Rebased `{}`",
                Color::Green.paint(CHECK_MARK.to_string()),
                Color::Blue.paint(branch)
            )?;
        }
        for branch in &self.skipped {
            writeln!(
                f,
                "  {} `{}` (already up to date)",
                MIDDLE_DOT,
                Color::Blue.paint(branch)
            )?;
        }

        match self.conflict {
            Some(ref branch) => {
                writeln!(
                    f,
                    "\n  {} Conflict on `{}`",
                    Color::Red.paint(CROSS_MARK.to_string()),
                    Color::Blue.paint(branch)
                )?;
                write!(f, "  Resolve the conflicts, then run `st continue`.")
            }
            None => write!(f, "Restack complete."),
        }
    }
}

impl Display for SyncOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        for branch in &self.cleaned {
            writeln!(f, "  Cleaned merged branch `{}`", Color::Blue.paint(branch))?;
        }
        write!(f, "{}", self.restack)
    }
}

impl Display for BranchInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        writeln!(f, "{}", Color::Blue.bold().paint(&self.name))?;
        writeln!(f, "  parent:   {}", Color::Blue.paint(&self.parent))?;
        writeln!(f, "  stack:    {}", self.path.join(" -> "))?;
        if !self.children.is_empty() {
            writeln!(f, "  children: {}", self.children.join(", "))?;
        }
        if self.tips.first() != Some(&self.name) {
            writeln!(f, "  tips:     {}", self.tips.join(", "))?;
        }
        if let Some(commits) = self.commits_ahead {
            writeln!(f, "  commits:  {}", commits)?;
        }

        if self.needs_restack {
            write!(
                f,
                "  {} Needs restack. Run `st restack`.",
                Color::Yellow.paint(CROSS_MARK.to_string())
            )
        } else {
            write!(f, "  {} Up to date", Color::Green.paint(CHECK_MARK.to_string()))
        }
    }
}
