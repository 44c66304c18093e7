// src/dag/task_id.rs

//! Named tasks and the leaf actions they run.

use std::fmt;
use std::str::FromStr;

use crate::assets::FontGroup;
use crate::errors::AssetflowError;
use crate::style::StyleEntry;

/// Every task the build knows about, by CLI name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskId {
    Default,
    Components,
    MoveFontAwesome,
    MoveFontSansSerif,
    MoveFontCondensed,
    MoveFontSlabSerif,
    Css,
    ScssLint,
    ScssBuild,
    ScssBuildThemeCss,
    Js,
    EsLint,
    JsBuild,
    Watch,
}

impl TaskId {
    pub const ALL: [TaskId; 14] = [
        TaskId::Default,
        TaskId::Components,
        TaskId::MoveFontAwesome,
        TaskId::MoveFontSansSerif,
        TaskId::MoveFontCondensed,
        TaskId::MoveFontSlabSerif,
        TaskId::Css,
        TaskId::ScssLint,
        TaskId::ScssBuild,
        TaskId::ScssBuildThemeCss,
        TaskId::Js,
        TaskId::EsLint,
        TaskId::JsBuild,
        TaskId::Watch,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TaskId::Default => "default",
            TaskId::Components => "components",
            TaskId::MoveFontAwesome => "move-components-fontawesome",
            TaskId::MoveFontSansSerif => "move-components-font-sans-serif",
            TaskId::MoveFontCondensed => "move-components-font-condensed",
            TaskId::MoveFontSlabSerif => "move-components-font-slab-serif",
            TaskId::Css => "css",
            TaskId::ScssLint => "scss-lint",
            TaskId::ScssBuild => "scss-build",
            TaskId::ScssBuildThemeCss => "scss-build-theme-css",
            TaskId::Js => "js",
            TaskId::EsLint => "es-lint",
            TaskId::JsBuild => "js-build",
            TaskId::Watch => "watch",
        }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TaskId {
    type Err = AssetflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        TaskId::ALL
            .into_iter()
            .find(|id| id.name() == wanted)
            .ok_or_else(|| AssetflowError::UnknownTask(wanted.to_string()))
    }
}

/// Unit of work behind a leaf task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    CopyFonts(FontGroup),
    StyleLint,
    StyleBuild(StyleEntry),
    /// Lint with autofix; rewrites sources.
    ScriptLint,
    ScriptBuild,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::CopyFonts(group) => write!(f, "copy fonts ({group})"),
            Action::StyleLint => f.write_str("lint styles"),
            Action::StyleBuild(entry) => write!(f, "build style {entry}"),
            Action::ScriptLint => f.write_str("lint + fix scripts"),
            Action::ScriptBuild => f.write_str("build script bundle"),
        }
    }
}
