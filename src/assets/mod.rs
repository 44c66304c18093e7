// src/assets/mod.rs

//! Static vendor assets: glob-selected file sets and the font copier.

pub mod copier;
pub mod fileset;

pub use copier::{CopySummary, FontGroup, copy_asset_set, copy_font_group};
pub use fileset::{FileSet, MatchedFile};
