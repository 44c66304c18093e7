// src/style/lint.rs

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::lint::{Diagnostic, Severity};

pub const MAX_LINE_LENGTH: usize = 120;

fn zero_unit_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:^|[^0-9A-Za-z_.\-#])(0(?:px|em|rem|ex|ch|vw|vh|vmin|vmax|cm|mm|in|pt|pc))\b")
            .expect("static regex is valid")
    })
}

/// Check one stylesheet. Never modifies the source.
pub fn lint_style_source(path: &Path, source: &str) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    let diag = |line: usize, column: usize, rule: &'static str, message: String| Diagnostic {
        file: path.to_path_buf(),
        line,
        column,
        rule,
        severity: Severity::Warning,
        message,
    };

    let mut in_comment = false;
    for (idx, line) in source.lines().enumerate() {
        let number = idx + 1;

        let trimmed = line.trim_end_matches([' ', '\t']);
        if trimmed.len() != line.len() {
            out.push(diag(
                number,
                trimmed.chars().count() + 1,
                "trailing-whitespace",
                "unexpected whitespace at end of line".to_string(),
            ));
        }

        let width = line.chars().count();
        if width > MAX_LINE_LENGTH {
            out.push(diag(
                number,
                MAX_LINE_LENGTH + 1,
                "line-length",
                format!("line is {width} characters long (max {MAX_LINE_LENGTH})"),
            ));
        }

        let code = code_portion(line, &mut in_comment);

        if let Some(pos) = code.find("!important") {
            out.push(diag(
                number,
                code[..pos].chars().count() + 1,
                "important",
                "unexpected !important".to_string(),
            ));
        }

        for caps in zero_unit_regex().captures_iter(&code) {
            if let Some(m) = caps.get(1) {
                out.push(diag(
                    number,
                    code[..m.start()].chars().count() + 1,
                    "zero-unit",
                    format!("unexpected unit on zero length '{}'", m.as_str()),
                ));
            }
        }
    }

    if !source.is_empty() && !source.ends_with('\n') {
        out.push(diag(
            source.lines().count().max(1),
            source.lines().last().map_or(0, |l| l.chars().count()) + 1,
            "final-newline",
            "expected a newline at end of file".to_string(),
        ));
    }

    out
}

/// The line with comments blanked out (same length, so columns still line
/// up). Tracks `/* */` comments across lines.
fn code_portion(line: &str, in_comment: &mut bool) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        if *in_comment {
            out.push(' ');
            if c == '*' && chars.peek() == Some(&'/') {
                chars.next();
                out.push(' ');
                *in_comment = false;
            }
            continue;
        }
        match c {
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                out.push_str("  ");
                *in_comment = true;
            }
            '/' if chars.peek() == Some(&'/') => break,
            _ => out.push(c),
        }
    }
    out
}
