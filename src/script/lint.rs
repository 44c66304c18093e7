// src/script/lint.rs

//! Script lint rules.
//!
//! `no-trailing-spaces`, `eol-last` and `semi` are fixable;
//! `no-debugger` and `max-len` are only reported.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use super::lexer::{self, LineState, SegmentKind};
use crate::lint::{Diagnostic, Severity};

pub const MAX_LINE_LENGTH: usize = 120;

const STATEMENT_KEYWORDS: &[&str] = &[
    "var", "let", "const", "return", "throw", "break", "continue", "import", "export",
];

const CONTROL_KEYWORDS: &[&str] = &[
    "if", "else", "for", "while", "do", "switch", "case", "default", "try", "catch", "finally",
    "function", "class", "async", "with",
];

/// A line ending in one of these continues on the next line.
const CONTINUES_AFTER: &[char] = &[
    ';', '{', '}', '(', '[', ',', '.', '+', '-', '*', '/', '%', '=', '&', '|', '?', ':', '<', '>',
    '!', '~', '^', '\\',
];

/// A next line starting with one of these continues the previous one.
const CONTINUES_BEFORE: &[char] = &[
    '.', ',', '+', '-', '*', '/', '%', '=', '&', '|', '?', ':', '(', '[', '`', ')', ']',
];

fn expression_statement_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z_$][\w$]*(?:\.[A-Za-z_$][\w$]*)*\s*(?:\(|=(?:[^=>]|$)|\+\+|--|[-+*/]=)")
            .expect("static regex is valid")
    })
}

fn debugger_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bdebugger\b").expect("static regex is valid"))
}

fn first_word(code: &str) -> &str {
    let end = code
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '$'))
        .unwrap_or(code.len());
    &code[..end]
}

/// Per-line view used by the rules.
struct Lines<'a> {
    source: Vec<&'a str>,
    masked: Vec<String>,
    states: Vec<LineState>,
    /// `(`/`[` nesting depth at the start of each line.
    depth_before: Vec<i64>,
}

impl<'a> Lines<'a> {
    fn new(source: &'a str) -> Self {
        let masked_source = lexer::mask(source);
        let masked: Vec<String> = masked_source.lines().map(str::to_string).collect();
        let states = lexer::line_states(source);

        let mut depth = 0i64;
        let mut depth_before = Vec::with_capacity(masked.len());
        for line in &masked {
            depth_before.push(depth);
            for c in line.chars() {
                match c {
                    '(' | '[' => depth += 1,
                    ')' | ']' => depth -= 1,
                    _ => {}
                }
            }
        }

        Self {
            source: source.lines().collect(),
            masked,
            states,
            depth_before,
        }
    }

    fn state(&self, idx: usize) -> LineState {
        self.states.get(idx).copied().unwrap_or_default()
    }

    fn depth_after(&self, idx: usize) -> i64 {
        self.depth_before
            .get(idx + 1)
            .copied()
            .unwrap_or_else(|| self.depth_before.get(idx).copied().unwrap_or(0))
    }

    /// Char index at which a missing semicolon belongs, if the line needs one.
    fn missing_semicolon(&self, idx: usize) -> Option<usize> {
        let state = self.state(idx);
        if state.starts_in.is_some() || state.ends_in.is_some() {
            return None;
        }
        if self.depth_before.get(idx).copied().unwrap_or(0) != 0 || self.depth_after(idx) != 0 {
            return None;
        }

        let masked = self.masked.get(idx)?;
        let code = masked.trim();
        if code.is_empty() {
            return None;
        }

        let word = first_word(code);
        if CONTROL_KEYWORDS.contains(&word) {
            return None;
        }
        let is_statement = STATEMENT_KEYWORDS.contains(&word)
            || expression_statement_regex().is_match(code);
        if !is_statement {
            return None;
        }

        let last = code.chars().last()?;
        if CONTINUES_AFTER.contains(&last) {
            return None;
        }

        let next = self.masked[idx + 1..]
            .iter()
            .map(|l| l.trim_start())
            .find(|l| !l.is_empty());
        if let Some(next) = next {
            if next.starts_with(CONTINUES_BEFORE) {
                return None;
            }
        }

        Some(masked.trim_end().chars().count())
    }
}

/// Report every violation in `source`.
pub fn check_script_source(path: &Path, source: &str) -> Vec<Diagnostic> {
    let lines = Lines::new(source);
    let mut out = Vec::new();
    let diag = |line: usize, column: usize, rule: &'static str, severity, message: &str| {
        Diagnostic {
            file: path.to_path_buf(),
            line,
            column,
            rule,
            severity,
            message: message.to_string(),
        }
    };

    for (idx, line) in lines.source.iter().enumerate() {
        let number = idx + 1;
        let state = lines.state(idx);

        let trimmed = line.trim_end();
        if trimmed.len() != line.len() && state.ends_in != Some(SegmentKind::Template) {
            out.push(diag(
                number,
                trimmed.chars().count() + 1,
                "no-trailing-spaces",
                Severity::Warning,
                "Trailing spaces not allowed.",
            ));
        }

        if let Some(col) = lines.missing_semicolon(idx) {
            out.push(diag(
                number,
                col + 1,
                "semi",
                Severity::Warning,
                "Missing semicolon.",
            ));
        }

        if let Some(m) = lines.masked.get(idx).and_then(|l| debugger_regex().find(l)) {
            let col = lines.masked[idx][..m.start()].chars().count() + 1;
            out.push(diag(
                number,
                col,
                "no-debugger",
                Severity::Error,
                "Unexpected 'debugger' statement.",
            ));
        }

        let width = line.chars().count();
        if width > MAX_LINE_LENGTH {
            out.push(Diagnostic {
                file: path.to_path_buf(),
                line: number,
                column: MAX_LINE_LENGTH + 1,
                rule: "max-len",
                severity: Severity::Warning,
                message: format!(
                    "This line has a length of {width}. Maximum allowed is {MAX_LINE_LENGTH}."
                ),
            });
        }
    }

    if !source.is_empty() && !source.ends_with('\n') {
        let last = lines.source.last().copied().unwrap_or("");
        out.push(diag(
            lines.source.len().max(1),
            last.chars().count() + 1,
            "eol-last",
            Severity::Warning,
            "Newline required at end of file but not found.",
        ));
    }

    out
}

/// Apply every fixable rule. Returns the source unchanged when nothing
/// needed fixing.
pub fn fix_script_source(source: &str) -> String {
    let lines = Lines::new(source);
    let line_ending = if source.contains("\r\n") { "\r\n" } else { "\n" };
    let mut out = String::with_capacity(source.len() + 16);

    for (idx, line) in lines.source.iter().enumerate() {
        let mut fixed = if lines.state(idx).ends_in == Some(SegmentKind::Template) {
            line.to_string()
        } else {
            line.trim_end().to_string()
        };

        if let Some(col) = lines.missing_semicolon(idx) {
            let at = fixed
                .char_indices()
                .nth(col)
                .map_or(fixed.len(), |(byte, _)| byte);
            fixed.insert(at, ';');
        }

        out.push_str(&fixed);
        if idx + 1 < lines.source.len() {
            out.push_str(line_ending);
        }
    }

    if !source.is_empty() {
        out.push_str(line_ending);
    }
    out
}
