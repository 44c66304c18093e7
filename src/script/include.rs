// src/script/include.rs

//! `//= require` / `//= include` directive expansion.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, OnceLock};

use regex::Regex;
use tracing::{debug, warn};

use crate::assets::FileSet;
use crate::assets::fileset::is_glob;
use crate::fs::FileSystem;
use crate::pipeline::{Artifact, Transform, TransformError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    /// Inline once per bundle.
    Require,
    /// Inline every time.
    Include,
    RequireTree,
    IncludeTree,
}

impl DirectiveKind {
    fn parse(word: &str) -> Option<Self> {
        match word {
            "require" => Some(Self::Require),
            "include" => Some(Self::Include),
            "require_tree" => Some(Self::RequireTree),
            "include_tree" => Some(Self::IncludeTree),
            _ => None,
        }
    }

    fn once(self) -> bool {
        matches!(self, Self::Require | Self::RequireTree)
    }

    fn tree(self) -> bool {
        matches!(self, Self::RequireTree | Self::IncludeTree)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub kind: DirectiveKind,
    pub reference: String,
}

fn directive_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^\s*//=\s*(require_tree|include_tree|require|include)\s+["']?([^"'\s]+)["']?\s*$"#)
            .expect("static regex is valid")
    })
}

/// Parse a directive line; `None` for ordinary lines.
pub fn parse_directive(line: &str) -> Option<Directive> {
    let caps = directive_regex().captures(line.trim_end_matches(['\r', '\n']))?;
    Some(Directive {
        kind: DirectiveKind::parse(caps.get(1)?.as_str())?,
        reference: caps.get(2)?.as_str().to_string(),
    })
}

/// Expands include directives in place.
///
/// A reference is looked up relative to the including file's directory and
/// then each search path in order; the first base that yields files wins.
/// Unresolvable references and include cycles are logged and the directive
/// line is left as is (it is a comment, so the bundle stays valid).
#[derive(Debug, Clone)]
pub struct IncludeResolver {
    fs: Arc<dyn FileSystem>,
    search_paths: Vec<PathBuf>,
}

struct Expansion {
    stack: Vec<PathBuf>,
    required: HashSet<PathBuf>,
    unresolved: Vec<String>,
}

impl IncludeResolver {
    pub fn new(fs: Arc<dyn FileSystem>, search_paths: Vec<PathBuf>) -> Self {
        Self { fs, search_paths }
    }

    /// Files a directive in `from` refers to, sorted; empty when nothing
    /// matches.
    pub fn resolve(&self, from: &Path, directive: &Directive) -> Vec<PathBuf> {
        let own_dir = from.parent().map(Path::to_path_buf);
        for base in own_dir.iter().chain(self.search_paths.iter()) {
            let found = self.resolve_in(base, directive);
            if !found.is_empty() {
                return found;
            }
        }
        Vec::new()
    }

    fn resolve_in(&self, base: &Path, directive: &Directive) -> Vec<PathBuf> {
        let reference = directive.reference.as_str();

        if directive.kind.tree() {
            return self.select(FileSet::new(normalize(&base.join(reference))).include("**/*.js"));
        }

        if is_glob(reference) {
            let (dir, pattern) = split_glob(reference);
            return self.select(FileSet::new(normalize(&base.join(dir))).include(pattern));
        }

        let mut candidate = normalize(&base.join(reference));
        if candidate.extension().is_none() {
            candidate.set_extension("js");
        }
        if self.fs.is_file(&candidate) {
            vec![candidate]
        } else {
            Vec::new()
        }
    }

    fn select(&self, set: FileSet) -> Vec<PathBuf> {
        match set.resolve(self.fs.as_ref()) {
            Ok(files) => files.into_iter().map(|f| normalize(&f.path)).collect(),
            Err(e) => {
                warn!(base = ?set.base(), error = %e, "failed to list include candidates");
                Vec::new()
            }
        }
    }

    fn expand(
        &self,
        path: &Path,
        source: &str,
        state: &mut Expansion,
    ) -> Result<String, TransformError> {
        let mut out = String::with_capacity(source.len());

        for line in source.split_inclusive('\n') {
            let Some(directive) = parse_directive(line) else {
                out.push_str(line);
                continue;
            };

            let files = self.resolve(path, &directive);
            if files.is_empty() {
                warn!(file = ?path, reference = %directive.reference, "include not found; directive left in place");
                state.unresolved.push(directive.reference.clone());
                out.push_str(line);
                continue;
            }

            let mut keep_line = false;
            for file in files {
                if state.stack.contains(&file) {
                    warn!(file = ?path, include = ?file, "include cycle; directive left in place");
                    keep_line = true;
                    continue;
                }
                if directive.kind.once() && !state.required.insert(file.clone()) {
                    debug!(include = ?file, "already required; skipping");
                    continue;
                }

                let text = self
                    .fs
                    .read_to_string(&file)
                    .map_err(|e| TransformError::Message {
                        file: file.display().to_string(),
                        message: e.to_string(),
                    })?;

                debug!(include = ?file, "inlining");
                state.stack.push(file.clone());
                let inlined = self.expand(&file, &text, state);
                state.stack.pop();
                let inlined = inlined?;

                out.push_str(&inlined);
                if !inlined.ends_with('\n') {
                    out.push('\n');
                }
            }
            if keep_line {
                out.push_str(line);
            }
        }

        Ok(out)
    }

    /// Expand directives in `source` (read from `path`). Returns the bundle
    /// and the references that could not be resolved.
    pub fn expand_source(
        &self,
        path: &Path,
        source: &str,
    ) -> Result<(String, Vec<String>), TransformError> {
        let entry = normalize(path);
        let mut state = Expansion {
            stack: vec![entry.clone()],
            required: HashSet::from([entry.clone()]),
            unresolved: Vec::new(),
        };
        let bundle = self.expand(&entry, source, &mut state)?;
        Ok((bundle, state.unresolved))
    }
}

impl Transform for IncludeResolver {
    fn name(&self) -> &str {
        "include"
    }

    fn apply(&self, input: Artifact) -> Result<Artifact, TransformError> {
        let path = PathBuf::from(&input.name);
        let (bundle, _unresolved) = self.expand_source(&path, input.text()?)?;
        Ok(input.with_contents(bundle))
    }
}

/// Split `lib/**/*.js` into the literal directory `lib` and the pattern.
fn split_glob(reference: &str) -> (PathBuf, String) {
    let parts: Vec<&str> = reference.split('/').collect();
    let literal = parts.iter().take_while(|p| !is_glob(p)).count();
    let dir: PathBuf = parts[..literal].iter().collect();
    (dir, parts[literal..].join("/"))
}

/// Lexically drop `.` and fold `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
