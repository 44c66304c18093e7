// src/style/compile.rs

//! Import step: resolves `@import` directives and inlines partials.

use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use regex::Regex;
use tracing::debug;

use crate::fs::FileSystem;
use crate::pipeline::{Artifact, Transform, TransformError};

/// Step that turns an entry stylesheet and its partials into one document.
///
/// Each `@import "name";` is replaced by the contents of the partial it
/// names, recursively. Lookup order for a reference: the importing file's
/// directory, then every include path in order. For a reference `a/b` the
/// candidates are `a/_b.scss`, `a/b.scss`, `a/_b.css`, `a/b.css`,
/// `a/b/_index.scss` and `a/b/index.scss`.
///
/// Plain CSS imports (`url(..)`, absolute URLs, `*.css`, imports with a media
/// query) are kept verbatim. `@import` text inside block comments or strings
/// is not a directive. `//` line comments are dropped.
#[derive(Debug, Clone)]
pub struct ImportInliner {
    fs: Arc<dyn FileSystem>,
    include_paths: Vec<PathBuf>,
}

impl ImportInliner {
    pub fn new(fs: Arc<dyn FileSystem>, include_paths: Vec<PathBuf>) -> Self {
        Self { fs, include_paths }
    }

    pub fn include_paths(&self) -> &[PathBuf] {
        &self.include_paths
    }

    fn inline(
        &self,
        path: &Path,
        source: &str,
        stack: &mut Vec<PathBuf>,
    ) -> Result<String, TransformError> {
        let file = path.display().to_string();
        let Scanned { text: cleaned, opaque } = scan(source);
        let mut out = String::with_capacity(cleaned.len());
        let mut last = 0;
        let mut pos = 0;

        while let Some(caps) = import_regex().captures_at(&cleaned, pos) {
            let (Some(whole), Some(args)) = (caps.get(0), caps.get(1)) else {
                break;
            };
            // `@import` inside a comment or string is text, not a directive.
            if opaque.iter().any(|span| span.contains(&whole.start())) {
                pos = whole.start() + 1;
                continue;
            }
            pos = whole.end();
            let line = line_of(&cleaned, whole.start());
            out.push_str(&cleaned[last..whole.start()]);
            last = whole.end();

            let mut pieces = Vec::new();
            for item in split_import_list(args.as_str()) {
                match ImportRef::parse(&item) {
                    ImportRef::Plain(text) => pieces.push(format!("@import {text};")),
                    ImportRef::Partial(reference) => {
                        let resolved = self.resolve(path, &reference).ok_or_else(|| {
                            TransformError::UnresolvedImport {
                                file: file.clone(),
                                line,
                                reference: reference.clone(),
                            }
                        })?;
                        pieces.push(self.inline_partial(&resolved, &file, stack)?);
                    }
                }
            }
            out.push_str(&pieces.join("\n"));
        }

        out.push_str(&cleaned[last..]);
        Ok(out)
    }

    fn inline_partial(
        &self,
        resolved: &Path,
        importer: &str,
        stack: &mut Vec<PathBuf>,
    ) -> Result<String, TransformError> {
        if stack.iter().any(|p| p == resolved) {
            let chain: Vec<String> = stack
                .iter()
                .chain(std::iter::once(&resolved.to_path_buf()))
                .map(|p| p.display().to_string())
                .collect();
            return Err(TransformError::Message {
                file: importer.to_string(),
                message: format!("import cycle: {}", chain.join(" -> ")),
            });
        }

        let text = self
            .fs
            .read_to_string(resolved)
            .map_err(|e| TransformError::Message {
                file: resolved.display().to_string(),
                message: e.to_string(),
            })?;

        debug!(partial = ?resolved, "inlining import");
        stack.push(resolved.to_path_buf());
        let inlined = self.inline(resolved, &text, stack);
        stack.pop();
        inlined
    }

    /// First existing candidate for `reference`, imported from `importer`.
    pub fn resolve(&self, importer: &Path, reference: &str) -> Option<PathBuf> {
        let importer_dir = importer.parent().map(Path::to_path_buf);
        importer_dir
            .iter()
            .chain(self.include_paths.iter())
            .flat_map(|base| candidates(base, reference))
            .find(|candidate| self.fs.is_file(candidate))
    }
}

impl Transform for ImportInliner {
    fn name(&self) -> &str {
        "import"
    }

    fn apply(&self, input: Artifact) -> Result<Artifact, TransformError> {
        let path = PathBuf::from(&input.name);
        let compiled = {
            let source = input.text()?;
            let mut stack = vec![path.clone()];
            self.inline(&path, source, &mut stack)?
        };
        Ok(input.with_contents(compiled))
    }
}

enum ImportRef {
    /// Left in the output as a CSS `@import`.
    Plain(String),
    /// Name of a partial to inline.
    Partial(String),
}

impl ImportRef {
    fn parse(item: &str) -> Self {
        let item = item.trim();
        let Some(quote) = item.chars().next().filter(|c| *c == '"' || *c == '\'') else {
            return ImportRef::Plain(item.to_string());
        };

        let rest = &item[1..];
        let Some(end) = rest.find(quote) else {
            return ImportRef::Plain(item.to_string());
        };
        let reference = &rest[..end];
        let trailing = rest[end + 1..].trim();

        let is_plain = !trailing.is_empty()
            || reference.ends_with(".css")
            || reference.starts_with("http://")
            || reference.starts_with("https://")
            || reference.starts_with("//");

        if is_plain {
            ImportRef::Plain(item.to_string())
        } else {
            ImportRef::Partial(reference.to_string())
        }
    }
}

fn import_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"@import\s+([^;]+);").expect("static regex is valid"))
}

fn line_of(text: &str, offset: usize) -> u32 {
    let count = text[..offset].bytes().filter(|b| *b == b'\n').count();
    u32::try_from(count + 1).unwrap_or(u32::MAX)
}

/// Split `"a", "b" screen, url(c)` on top-level commas.
fn split_import_list(args: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut depth = 0usize;

    for c in args.chars() {
        match quote {
            Some(q) => {
                current.push(c);
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '"' | '\'' => {
                    quote = Some(c);
                    current.push(c);
                }
                '(' => {
                    depth += 1;
                    current.push(c);
                }
                ')' => {
                    depth = depth.saturating_sub(1);
                    current.push(c);
                }
                ',' if depth == 0 => {
                    items.push(std::mem::take(&mut current));
                }
                _ => current.push(c),
            },
        }
    }

    if !current.trim().is_empty() {
        items.push(current);
    }
    items
}

fn candidates(base: &Path, reference: &str) -> Vec<PathBuf> {
    let joined = base.join(reference);
    let (Some(dir), Some(file)) = (joined.parent(), joined.file_name()) else {
        return Vec::new();
    };
    let file = file.to_string_lossy();

    if reference.ends_with(".scss") || reference.ends_with(".sass") {
        return vec![dir.join(file.as_ref()), dir.join(format!("_{file}"))];
    }

    vec![
        dir.join(format!("_{file}.scss")),
        dir.join(format!("{file}.scss")),
        dir.join(format!("_{file}.css")),
        dir.join(format!("{file}.css")),
        joined.join("_index.scss"),
        joined.join("index.scss"),
    ]
}

/// Source with `//` comments removed, plus the byte ranges (in `text`) of
/// block comments and string literals.
struct Scanned {
    text: String,
    opaque: Vec<Range<usize>>,
}

/// Remove `//` comments outside strings, block comments and parentheses
/// (so `url(http://..)` survives). Newlines are kept to preserve line numbers.
pub fn strip_line_comments(source: &str) -> String {
    scan(source).text
}

fn scan(source: &str) -> Scanned {
    let mut out = String::with_capacity(source.len());
    let mut opaque = Vec::new();
    let mut chars = source.chars().peekable();
    let mut quote: Option<char> = None;
    let mut in_block = false;
    let mut span_start = 0;
    let mut depth = 0usize;

    while let Some(c) = chars.next() {
        if in_block {
            out.push(c);
            if c == '*' && chars.peek() == Some(&'/') {
                out.push('/');
                chars.next();
                in_block = false;
                opaque.push(span_start..out.len());
            }
            continue;
        }

        if let Some(q) = quote {
            out.push(c);
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else if c == q || c == '\n' {
                quote = None;
                opaque.push(span_start..out.len());
            }
            continue;
        }

        match c {
            '"' | '\'' => {
                quote = Some(c);
                span_start = out.len();
                out.push(c);
            }
            '(' => {
                depth += 1;
                out.push(c);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                out.push(c);
            }
            '/' if chars.peek() == Some(&'*') => {
                in_block = true;
                span_start = out.len();
                out.push(c);
                out.push('*');
                chars.next();
            }
            '/' if depth == 0 && chars.peek() == Some(&'/') => {
                while let Some(&next) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            _ => out.push(c),
        }
    }

    if in_block || quote.is_some() {
        opaque.push(span_start..out.len());
    }

    Scanned { text: out, opaque }
}
