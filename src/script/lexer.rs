// src/script/lexer.rs

//! Coarse JavaScript segmenter.
//!
//! Splits a source file into code, string, template, regex and comment
//! segments. Nothing finer is needed: the minifier only rewrites code
//! segments and the linter only looks at code.
//!
//! Segment boundaries always fall on ASCII delimiters, so every segment is a
//! valid `&str` slice of the input.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Code,
    Str,
    Template,
    Regex,
    LineComment,
    BlockComment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub kind: SegmentKind,
    pub text: &'a str,
    /// Byte offset in the source.
    pub start: usize,
}

impl Segment<'_> {
    pub fn is_comment(&self) -> bool {
        matches!(
            self.kind,
            SegmentKind::LineComment | SegmentKind::BlockComment
        )
    }

    pub fn is_literal(&self) -> bool {
        matches!(
            self.kind,
            SegmentKind::Str | SegmentKind::Template | SegmentKind::Regex
        )
    }
}

/// Keywords after which a `/` starts a regex rather than a division.
const REGEX_PRECEDING_WORDS: &[&str] = &[
    "return", "typeof", "instanceof", "case", "do", "else", "in", "of", "new", "delete", "void",
    "throw", "yield", "await",
];

pub fn segments(source: &str) -> Vec<Segment<'_>> {
    let bytes = source.as_bytes();
    let mut out = Vec::new();
    let mut code_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let next = bytes.get(i + 1).copied();
        let found = match bytes[i] {
            quote @ (b'"' | b'\'') => Some((SegmentKind::Str, scan_string(bytes, i, quote))),
            b'`' => Some((SegmentKind::Template, scan_template(bytes, i))),
            b'/' if next == Some(b'/') => Some((SegmentKind::LineComment, scan_to_eol(bytes, i))),
            b'/' if next == Some(b'*') => {
                Some((SegmentKind::BlockComment, scan_block_comment(bytes, i)))
            }
            b'/' if regex_allowed(&source[code_start..i], out.last()) => {
                Some((SegmentKind::Regex, scan_regex(bytes, i)))
            }
            _ => None,
        };

        match found {
            Some((kind, end)) => {
                if code_start < i {
                    out.push(Segment {
                        kind: SegmentKind::Code,
                        text: &source[code_start..i],
                        start: code_start,
                    });
                }
                out.push(Segment {
                    kind,
                    text: &source[i..end],
                    start: i,
                });
                i = end;
                code_start = end;
            }
            None => i += 1,
        }
    }

    if code_start < bytes.len() {
        out.push(Segment {
            kind: SegmentKind::Code,
            text: &source[code_start..],
            start: code_start,
        });
    }
    out
}

/// Decide whether a `/` opens a regex, given the code preceding it in the
/// current code run and the segment before that run.
fn regex_allowed(code_before: &str, previous: Option<&Segment<'_>>) -> bool {
    let trimmed = code_before.trim_end();
    let Some(last) = trimmed.chars().last() else {
        // Only whitespace since the last literal/comment.
        return match previous {
            None => true,
            Some(seg) if seg.is_comment() => true,
            Some(_) => false,
        };
    };

    if last.is_ascii_alphanumeric() || last == '_' || last == '$' {
        let word_start = trimmed
            .rfind(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '$'))
            .map_or(0, |p| p + 1);
        return REGEX_PRECEDING_WORDS.contains(&&trimmed[word_start..]);
    }

    // A `}` ending its line closes a statement block; the next line starts
    // a new statement.
    if last == '}' && code_before[trimmed.len()..].contains('\n') {
        return true;
    }

    !matches!(last, ')' | ']' | '}' | '.')
}

fn scan_string(bytes: &[u8], start: usize, quote: u8) -> usize {
    let mut j = start + 1;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            b'\n' => return j,
            b if b == quote => return j + 1,
            _ => j += 1,
        }
    }
    bytes.len()
}

fn scan_template(bytes: &[u8], start: usize) -> usize {
    let mut j = start + 1;
    let mut depth = 0usize;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            b'`' if depth == 0 => return j + 1,
            b'`' => j = scan_template(bytes, j),
            b'$' if depth == 0 && bytes.get(j + 1) == Some(&b'{') => {
                depth = 1;
                j += 2;
            }
            b'{' if depth > 0 => {
                depth += 1;
                j += 1;
            }
            b'}' if depth > 0 => {
                depth -= 1;
                j += 1;
            }
            quote @ (b'"' | b'\'') if depth > 0 => j = scan_string(bytes, j, quote),
            _ => j += 1,
        }
    }
    bytes.len()
}

fn scan_to_eol(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|b| *b == b'\n')
        .map_or(bytes.len(), |p| start + p)
}

fn scan_block_comment(bytes: &[u8], start: usize) -> usize {
    let mut j = start + 2;
    while j + 1 < bytes.len() {
        if bytes[j] == b'*' && bytes[j + 1] == b'/' {
            return j + 2;
        }
        j += 1;
    }
    bytes.len()
}

fn scan_regex(bytes: &[u8], start: usize) -> usize {
    let mut j = start + 1;
    let mut in_class = false;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            b'\n' => return j,
            b'[' => {
                in_class = true;
                j += 1;
            }
            b']' => {
                in_class = false;
                j += 1;
            }
            b'/' if !in_class => {
                j += 1;
                while j < bytes.len() && bytes[j].is_ascii_alphabetic() {
                    j += 1;
                }
                return j;
            }
            _ => j += 1,
        }
    }
    bytes.len()
}

/// Source with literal bodies replaced by `_` and comments by spaces.
///
/// Newlines and the character count of every line are preserved, so line and
/// column positions in the mask match the source.
pub fn mask(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    for seg in segments(source) {
        match seg.kind {
            SegmentKind::Code => out.push_str(seg.text),
            SegmentKind::Str | SegmentKind::Template | SegmentKind::Regex => {
                for (n, c) in seg.text.chars().enumerate() {
                    out.push(match c {
                        '\n' => '\n',
                        _ if n == 0 => c,
                        _ => '_',
                    });
                }
            }
            SegmentKind::LineComment | SegmentKind::BlockComment => {
                out.extend(seg.text.chars().map(|c| if c == '\n' { '\n' } else { ' ' }));
            }
        }
    }
    out
}

/// Whether a line begins or ends inside a multi-line literal or comment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineState {
    pub starts_in: Option<SegmentKind>,
    pub ends_in: Option<SegmentKind>,
}

/// One [`LineState`] per line of `source` (as split by `str::lines`).
pub fn line_states(source: &str) -> Vec<LineState> {
    let mut states = vec![LineState::default(); source.lines().count().max(1)];
    let mut line = 0usize;

    for seg in segments(source) {
        for _ in seg.text.matches('\n') {
            if seg.kind != SegmentKind::Code {
                if let Some(state) = states.get_mut(line) {
                    state.ends_in = Some(seg.kind);
                }
                if let Some(state) = states.get_mut(line + 1) {
                    state.starts_in = Some(seg.kind);
                }
            }
            line += 1;
        }
    }
    states
}
