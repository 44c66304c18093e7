// src/script/minify.rs

use crate::pipeline::{Artifact, Transform, TransformError};

use super::lexer::{SegmentKind, segments};

/// Characters around which whitespace is never needed.
const SQUEEZE: &[char] = &['{', '}', '(', ')', '[', ']', ';', ',', ':', '=', '?'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Pending {
    None,
    Space,
    Newline,
}

struct Writer {
    out: String,
    pending: Pending,
}

impl Writer {
    fn whitespace(&mut self, ws: Pending) {
        self.pending = self.pending.max(ws);
    }

    /// Emit a token starting with `first`, deciding first what happens to
    /// the whitespace seen before it.
    fn token(&mut self, first: char, text: &str) {
        match self.pending {
            Pending::Newline if !self.out.is_empty() && !self.out.ends_with('\n') => {
                self.out.push('\n');
            }
            Pending::Space => {
                let after_squeeze = self.out.ends_with(SQUEEZE) || self.out.ends_with('\n');
                if !self.out.is_empty() && !after_squeeze && !SQUEEZE.contains(&first) {
                    self.out.push(' ');
                }
            }
            _ => {}
        }
        self.pending = Pending::None;
        self.out.push_str(text);
    }
}

/// Whitespace- and comment-stripping minifier.
///
/// Line breaks are kept (one per logical line) so automatic semicolon
/// insertion sees the same program. Literals are copied byte for byte and
/// `/*!` banner comments survive. Identifiers are not renamed.
pub fn minify_script(source: &str) -> String {
    let mut w = Writer {
        out: String::with_capacity(source.len()),
        pending: Pending::None,
    };

    for seg in segments(source) {
        match seg.kind {
            SegmentKind::Code => {
                let mut chars = seg.text.chars().peekable();
                while let Some(c) = chars.next() {
                    if c.is_whitespace() {
                        w.whitespace(if c == '\n' {
                            Pending::Newline
                        } else {
                            Pending::Space
                        });
                    } else {
                        let mut buf = [0u8; 4];
                        w.token(c, c.encode_utf8(&mut buf));
                    }
                }
            }
            SegmentKind::LineComment => {}
            SegmentKind::BlockComment if seg.text.starts_with("/*!") => {
                w.whitespace(Pending::Newline);
                w.token('/', seg.text);
                w.whitespace(Pending::Newline);
            }
            SegmentKind::BlockComment => {
                w.whitespace(if seg.text.contains('\n') {
                    Pending::Newline
                } else {
                    Pending::Space
                });
            }
            SegmentKind::Str | SegmentKind::Template | SegmentKind::Regex => {
                let first = seg.text.chars().next().unwrap_or(' ');
                w.token(first, seg.text);
            }
        }
    }

    if !w.out.is_empty() {
        w.out.push('\n');
    }
    w.out
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Minify;

impl Transform for Minify {
    fn name(&self) -> &str {
        "minify"
    }

    fn apply(&self, input: Artifact) -> Result<Artifact, TransformError> {
        let minified = minify_script(input.text()?);
        Ok(input.with_contents(minified))
    }
}
