// src/assets/copier.rs

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, info};

use crate::assets::fileset::FileSet;
use crate::exec::BuildContext;
use crate::fs::FileSystem;
use crate::watch::hash::hash_bytes;

/// Marker file shipped inside the framework's font folders; never copied.
pub const GENERATOR_CONFIG_FILE: &str = "generator_config.txt";

/// Vendor font packages copied into `dist.fontPath`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FontGroup {
    FontAwesome,
    SansSerif,
    Condensed,
    SlabSerif,
}

impl FontGroup {
    pub const ALL: [FontGroup; 4] = [
        FontGroup::FontAwesome,
        FontGroup::SansSerif,
        FontGroup::Condensed,
        FontGroup::SlabSerif,
    ];

    /// Directory name, both under the vendor font folder and in the dist tree.
    pub fn dir_name(self) -> &'static str {
        match self {
            FontGroup::FontAwesome => "font-awesome",
            FontGroup::SansSerif => "ucf-sans-serif-alt",
            FontGroup::Condensed => "ucf-condensed-alt",
            FontGroup::SlabSerif => "tulia",
        }
    }

    /// Source files of this group for the given project context.
    pub fn source_set(self, ctx: &BuildContext) -> FileSet {
        match self {
            FontGroup::FontAwesome => FileSet::new(ctx.packages_dir().join("font-awesome/fonts"))
                .include("**/*"),
            _ => FileSet::new(ctx.vendor_font_dir().join(self.dir_name()))
                .include("*")
                .exclude(GENERATOR_CONFIG_FILE),
        }
    }

    /// Destination directory of this group.
    pub fn dest_dir(self, ctx: &BuildContext) -> PathBuf {
        ctx.font_dest_dir().join(self.dir_name())
    }
}

impl fmt::Display for FontGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Outcome of copying one asset set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopySummary {
    /// Destination paths that were (re)written.
    pub copied: Vec<PathBuf>,
    /// Destination paths that already held identical bytes.
    pub unchanged: Vec<PathBuf>,
}

impl CopySummary {
    pub fn total(&self) -> usize {
        self.copied.len() + self.unchanged.len()
    }
}

/// Copy every file selected by `sources` into `dest`, keeping each file's
/// path relative to the set's base. Bytes are copied unchanged.
///
/// An empty selection (missing vendor package, wrong path) is not an error.
pub fn copy_asset_set(fs: &dyn FileSystem, sources: &FileSet, dest: &Path) -> Result<CopySummary> {
    let mut summary = CopySummary::default();

    for file in sources.resolve(fs)? {
        let bytes = fs.read(&file.path)?;
        let target = dest.join(&file.relative);

        if fs.is_file(&target) {
            if let Ok(existing) = fs.read(&target) {
                if hash_bytes(&existing) == hash_bytes(&bytes) {
                    debug!(path = ?target, "destination identical; skipping");
                    summary.unchanged.push(target);
                    continue;
                }
            }
        }

        fs.write(&target, &bytes)?;
        debug!(from = ?file.path, to = ?target, "copied asset");
        summary.copied.push(target);
    }

    Ok(summary)
}

/// Copy one vendor font group into the dist tree.
pub fn copy_font_group(ctx: &BuildContext, group: FontGroup) -> Result<CopySummary> {
    let sources = group.source_set(ctx);
    let dest = group.dest_dir(ctx);
    let summary = copy_asset_set(ctx.fs.as_ref(), &sources, &dest)?;

    if summary.total() == 0 {
        info!(group = %group, base = ?sources.base(), "no files matched; nothing to copy");
    } else {
        info!(
            group = %group,
            copied = summary.copied.len(),
            unchanged = summary.unchanged.len(),
            dest = ?dest,
            "font group copied"
        );
    }

    Ok(summary)
}
