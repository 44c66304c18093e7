// src/exec/action.rs

use anyhow::Result;

use crate::assets::copy_font_group;
use crate::dag::Action;
use crate::exec::BuildContext;
use crate::{script, style};

impl Action {
    /// Run the action to completion on the calling thread.
    ///
    /// Lint actions succeed whatever they find; their diagnostics are
    /// logged.
    pub fn execute(&self, ctx: &BuildContext) -> Result<()> {
        match *self {
            Action::CopyFonts(group) => {
                copy_font_group(ctx, group)?;
            }
            Action::StyleLint => {
                style::lint_styles(ctx)?;
            }
            Action::StyleBuild(entry) => {
                style::build_entry(ctx, entry)?;
            }
            Action::ScriptLint => {
                script::lint_scripts(ctx)?;
            }
            Action::ScriptBuild => {
                script::build_entry(ctx)?;
            }
        }
        Ok(())
    }
}
