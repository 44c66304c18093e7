// src/style/sass.rs

//! Sass compile step, backed by `grass`.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use grass::{Options, OutputStyle};
use regex::Regex;

use crate::fs::FileSystem;
use crate::pipeline::{Artifact, Transform, TransformError};

/// Compiles SCSS (variables, nesting, mixins, functions) to plain CSS.
///
/// Runs after [`super::ImportInliner`], so `@import`ed partials are already
/// in the buffer. `@use`/`@forward` are resolved by grass against the load
/// paths, through the build's [`FileSystem`].
#[derive(Debug, Clone)]
pub struct SassCompile {
    fs: Arc<dyn FileSystem>,
    load_paths: Vec<PathBuf>,
}

impl SassCompile {
    pub fn new(fs: Arc<dyn FileSystem>, load_paths: Vec<PathBuf>) -> Self {
        Self { fs, load_paths }
    }

    pub fn load_paths(&self) -> &[PathBuf] {
        &self.load_paths
    }
}

impl Transform for SassCompile {
    fn name(&self) -> &str {
        "compile"
    }

    fn apply(&self, input: Artifact) -> Result<Artifact, TransformError> {
        let source = input.text()?.to_string();
        let fs = SassFs(self.fs.as_ref());
        let options = Options::default()
            .fs(&fs)
            .style(OutputStyle::Expanded)
            .unicode_error_messages(false)
            .load_paths(self.load_paths.as_slice());

        let css = grass::from_string(source, &options)
            .map_err(|e| sass_error(&input.name, &e.to_string()))?;
        Ok(input.with_contents(css))
    }
}

/// Lets grass read through the build's filesystem (real or mock).
struct SassFs<'a>(&'a dyn FileSystem);

impl fmt::Debug for SassFs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SassFs").field(&self.0).finish()
    }
}

impl grass::Fs for SassFs<'_> {
    fn is_dir(&self, path: &Path) -> bool {
        self.0.is_dir(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.0.is_file(path)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.0
            .read(path)
            .map_err(|e| io::Error::new(io::ErrorKind::NotFound, format!("{e:#}")))
    }
}

fn location_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+):(\d+)\s+root stylesheet").expect("static regex is valid"))
}

/// grass reports `Error: <message>` followed by a source excerpt and a
/// `<line>:<col>  root stylesheet` trace line.
fn sass_error(file: &str, rendered: &str) -> TransformError {
    let message = rendered
        .lines()
        .next()
        .unwrap_or_default()
        .trim_start_matches("Error: ")
        .trim()
        .to_string();

    let location = location_regex().captures(rendered).and_then(|caps| {
        let line = caps.get(1)?.as_str().parse().ok()?;
        let column = caps.get(2)?.as_str().parse().ok()?;
        Some((line, column))
    });

    match location {
        Some((line, column)) => TransformError::Located {
            file: file.to_string(),
            line,
            column,
            message,
        },
        None => TransformError::Message {
            file: file.to_string(),
            message,
        },
    }
}
