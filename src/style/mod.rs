// src/style/mod.rs

//! Style builder: lint, compile, minify, prefix, write.
//!
//! - [`compile`] inlines `@import`ed partials into one document.
//! - [`sass`] compiles that document from SCSS to CSS.
//! - [`css`] minifies and prefixes with lightningcss.
//! - [`lint`] reports (never fixes) style problems.

pub mod compile;
pub mod css;
pub mod lint;
pub mod sass;

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::assets::FileSet;
use crate::exec::context::BuildContext;
use crate::lint::LintReport;
use crate::livesync::Notification;
use crate::pipeline::{Artifact, Pipeline, Rename, write_artifact};

pub use compile::ImportInliner;
pub use css::{Minify, Prefix};
pub use sass::SassCompile;

/// Theme stylesheet entry point, relative to `src.stylePath`.
pub const THEME_ENTRY: &str = "style.scss";
/// Output file name of the theme stylesheet.
pub const THEME_OUTPUT: &str = "style.min.css";

/// Style entry points known to the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StyleEntry {
    ThemeCss,
}

impl StyleEntry {
    pub fn entry_file(self) -> &'static str {
        match self {
            StyleEntry::ThemeCss => THEME_ENTRY,
        }
    }

    pub fn output_name(self) -> &'static str {
        match self {
            StyleEntry::ThemeCss => THEME_OUTPUT,
        }
    }
}

impl fmt::Display for StyleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.entry_file(), self.output_name())
    }
}

/// Directories searched for `@import` references, after the importing
/// file's own directory.
pub fn include_paths(ctx: &BuildContext) -> Vec<PathBuf> {
    vec![
        ctx.style_src_dir(),
        ctx.packages_dir(),
        ctx.vendor_style_dir(),
    ]
}

/// import -> compile -> minify -> autoprefix -> rename.
pub fn style_pipeline(ctx: &BuildContext, output_name: &str) -> Result<Pipeline> {
    let prefix = Prefix::from_config(&ctx.config.browsers)?;
    Ok(Pipeline::new()
        .then(ImportInliner::new(ctx.fs.clone(), include_paths(ctx)))
        .then(SassCompile::new(ctx.fs.clone(), include_paths(ctx)))
        .then(Minify)
        .then(prefix)
        .then(Rename::new(output_name)))
}

/// Compile `entry` into `dest/output_name`.
///
/// With live-sync active the new stylesheet is injected into connected
/// browsers.
pub fn build_style(
    ctx: &BuildContext,
    entry: &Path,
    output_name: &str,
    dest: &Path,
) -> Result<PathBuf> {
    let input = Artifact::read(ctx.fs.as_ref(), entry)
        .with_context(|| format!("reading style entry {entry:?}"))?;
    let pipeline = style_pipeline(ctx, output_name)?;
    let output = pipeline.run(input)?;
    let written = write_artifact(ctx.fs.as_ref(), dest, &output)?;

    info!(entry = ?entry, artifact = ?written, "stylesheet built");

    if let Some(sync) = &ctx.live_sync {
        sync.notify(Notification::InjectCss {
            path: written.to_string_lossy().into_owned(),
        });
    }

    Ok(written)
}

/// Build one of the known entry points into `dist.cssPath`.
pub fn build_entry(ctx: &BuildContext, entry: StyleEntry) -> Result<PathBuf> {
    let source = ctx.style_src_dir().join(entry.entry_file());
    build_style(ctx, &source, entry.output_name(), &ctx.css_dest_dir())
}

/// Top-level stylesheets checked by [`lint_styles`].
pub fn lint_set(ctx: &BuildContext) -> FileSet {
    FileSet::new(ctx.style_src_dir()).include("*.scss")
}

/// Lint every top-level stylesheet. Sources are never modified.
pub fn lint_styles(ctx: &BuildContext) -> Result<LintReport> {
    let mut report = LintReport::default();
    for file in lint_set(ctx).resolve(ctx.fs.as_ref())? {
        let source = ctx
            .fs
            .read_to_string(&file.path)
            .with_context(|| format!("reading {:?}", file.path))?;
        report
            .diagnostics
            .extend(lint::lint_style_source(&file.path, &source));
        report.files_checked += 1;
    }
    report.log("scss-lint");
    Ok(report)
}
