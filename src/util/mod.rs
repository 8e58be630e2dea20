use std::fmt::Write;
use crate::interpreter::lexer::TokenPos;

#[inline]
pub fn is_alphabetic(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

#[inline]
pub fn is_numeric(c: char) -> bool {
    c.is_ascii_digit()
}

#[inline]
pub fn is_alphanumeric(c: char) -> bool {
    is_alphabetic(c) || is_numeric(c)
}

/// Lines shown on each side of the failing line.
const CONTEXT_LINES: i32 = 2;
/// Width of the `{:>6}|` gutter in front of every line.
const GUTTER_WIDTH: usize = 7;

/// Renders the source surrounding `pos`, with a caret line under the failing column.
pub fn source_context(source: &str, pos: TokenPos) -> String {
    let mut out = String::new();

    for (index, line) in source.lines().enumerate() {
        let line_number = index as i32 + 1;

        if (pos.line - line_number).abs() > CONTEXT_LINES {
            continue;
        }

        let _ = writeln!(out, "{:>6}|{}", line_number, line);

        if line_number == pos.line {
            let offset = GUTTER_WIDTH + (pos.column.max(1) as usize - 1);
            let _ = writeln!(out, "{}^", "-".repeat(offset));
        }
    }

    out
}
