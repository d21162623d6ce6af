//! Placeholder dialects.
//!
//! Statements render with bare `?` markers. The outermost render rewrites them
//! once, left to right, into the target dialect. `??` is an escape for a
//! literal question mark and is never counted. Pre-finalized blocks travel
//! through the pass untouched and only advance the numbering.

use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Placeholder syntax of the target engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dialect {
    /// `?` (text passes through unchanged)
    #[default]
    Question,
    /// `$1, $2, ...`
    Dollar,
    /// `$p1, $p2, ...`
    DollarP,
    /// `:1, :2, ...`
    Colon,
    /// `@p1, @p2, ...`
    AtP,
}

impl Dialect {
    fn prefix(self) -> Option<&'static str> {
        match self {
            Dialect::Question => None,
            Dialect::Dollar => Some("$"),
            Dialect::DollarP => Some("$p"),
            Dialect::Colon => Some(":"),
            Dialect::AtP => Some("@p"),
        }
    }

    /// Rewrite `?` placeholders and return the new text with the number of
    /// parameters it binds.
    ///
    /// Pre-finalized blocks are unwrapped verbatim and advance the numbering
    /// by their argument count, so every later marker keeps its position in
    /// the parameter stream.
    pub fn replace_placeholders(self, sql: &str) -> (String, usize) {
        rewrite(sql, self.prefix())
    }

    /// Marker for the `n`-th (1-based) placeholder.
    pub fn marker(self, n: usize) -> String {
        match self.prefix() {
            None => "?".to_string(),
            Some(prefix) => format!("{prefix}{n}"),
        }
    }
}

// Delimiters of a pre-finalized block in raw text: OPEN <arg count> SEP <text> CLOSE.
const BLOCK_OPEN: char = '\u{1}';
const BLOCK_SEP: char = '\u{2}';
const BLOCK_CLOSE: char = '\u{3}';

/// Wrap already finalized text so the placeholder pass copies it unchanged
/// and counts `arg_count` parameters for it.
pub(crate) fn opaque_block(sql: &str, arg_count: usize) -> String {
    format!("{BLOCK_OPEN}{arg_count}{BLOCK_SEP}{sql}{BLOCK_CLOSE}")
}

/// Count the parameters bound by raw text: bare `?` markers plus the
/// arguments of embedded blocks. `??` is an escape and is not counted.
pub fn count_placeholders(sql: &str) -> usize {
    rewrite(sql, None).1
}

/// Single left-to-right pass. With no prefix, `?` and `??` are kept as they are.
fn rewrite(sql: &str, prefix: Option<&str>) -> (String, usize) {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut n = 0usize;
    let mut rest = sql;
    while let Some(pos) = rest.find(['?', BLOCK_OPEN]) {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        if rest.starts_with(BLOCK_OPEN) {
            match split_block(rest) {
                Some((text, arg_count, len)) => {
                    out.push_str(text);
                    n += arg_count;
                    rest = &rest[len..];
                }
                None => {
                    out.push(BLOCK_OPEN);
                    rest = &rest[BLOCK_OPEN.len_utf8()..];
                }
            }
        } else if rest.starts_with("??") {
            out.push_str(if prefix.is_some() { "?" } else { "??" });
            rest = &rest[2..];
        } else {
            n += 1;
            match prefix {
                Some(prefix) => {
                    let _ = write!(out, "{prefix}{n}");
                }
                None => out.push('?'),
            }
            rest = &rest[1..];
        }
    }
    out.push_str(rest);
    (out, n)
}

/// Parse a block at the start of `s`: (text, arg count, byte length).
fn split_block(s: &str) -> Option<(&str, usize, usize)> {
    let body = &s[BLOCK_OPEN.len_utf8()..];
    let sep = body.find(BLOCK_SEP)?;
    let arg_count = body[..sep].parse().ok()?;
    let text_start = sep + BLOCK_SEP.len_utf8();
    let close = body[text_start..].find(BLOCK_CLOSE)?;
    let len = BLOCK_OPEN.len_utf8() + text_start + close + BLOCK_CLOSE.len_utf8();
    Some((&body[text_start..text_start + close], arg_count, len))
}

/// `n` comma-separated placeholders: `?,?,?`.
pub fn placeholders(n: usize) -> String {
    vec!["?"; n].join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_passes_through() {
        let sql = "x = ? AND y = ?";
        let (s, n) = Dialect::Question.replace_placeholders(sql);
        assert_eq!(s, sql);
        assert_eq!(n, 2);
    }

    #[test]
    fn dollar_numbers_in_order() {
        let (s, n) = Dialect::Dollar.replace_placeholders("x = ? AND y = ?");
        assert_eq!(s, "x = $1 AND y = $2");
        assert_eq!(n, 2);
    }

    #[test]
    fn dollar_p_numbers_in_order() {
        let (s, _) = Dialect::DollarP.replace_placeholders("x = ? AND y = ?");
        assert_eq!(s, "x = $p1 AND y = $p2");
    }

    #[test]
    fn colon_and_at_p() {
        assert_eq!(Dialect::Colon.replace_placeholders("a = ?").0, "a = :1");
        assert_eq!(Dialect::AtP.replace_placeholders("a = ?, b = ?").0, "a = @p1, b = @p2");
    }

    #[test]
    fn escaped_marks_are_not_counted() {
        let sql = "SELECT uuid, \"data\" #> '{tags}' AS tags FROM nodes WHERE  \"data\" -> 'tags' ??| array['?'] AND enabled = ?";
        let (s, n) = Dialect::Dollar.replace_placeholders(sql);
        assert_eq!(
            s,
            "SELECT uuid, \"data\" #> '{tags}' AS tags FROM nodes WHERE  \"data\" -> 'tags' ?| array['$1'] AND enabled = $2"
        );
        assert_eq!(n, 2);

        let (s, _) = Dialect::DollarP.replace_placeholders(sql);
        assert_eq!(
            s,
            "SELECT uuid, \"data\" #> '{tags}' AS tags FROM nodes WHERE  \"data\" -> 'tags' ?| array['$p1'] AND enabled = $p2"
        );
    }

    #[test]
    fn counting_matches_rewriting() {
        for sql in ["", "?", "??", "???", "a ?? b ? c", "? ? ??? ?"] {
            let (_, rewritten) = Dialect::Dollar.replace_placeholders(sql);
            assert_eq!(count_placeholders(sql), rewritten, "{sql}");
        }
    }

    #[test]
    fn trailing_single_mark() {
        assert_eq!(Dialect::Dollar.replace_placeholders("a ??").0, "a ?");
        assert_eq!(Dialect::Dollar.replace_placeholders("a ???").0, "a ?$1");
    }

    #[test]
    fn blocks_are_copied_and_advance_numbering() {
        let raw = format!("{} AND c = ?", opaque_block("b = $p1 AND d ?? e", 1));
        let (s, n) = Dialect::DollarP.replace_placeholders(&raw);
        assert_eq!(s, "b = $p1 AND d ?? e AND c = $p2");
        assert_eq!(n, 2);
        assert_eq!(count_placeholders(&raw), 2);

        let (s, n) = Dialect::Question.replace_placeholders(&raw);
        assert_eq!(s, "b = $p1 AND d ?? e AND c = ?");
        assert_eq!(n, 2);
    }

    #[test]
    fn question_keeps_block_markers_single() {
        let raw = format!("x = ? AND {}", opaque_block("y = ?", 1));
        let (s, n) = Dialect::Question.replace_placeholders(&raw);
        assert_eq!(s, "x = ? AND y = ?");
        assert_eq!(n, 2);
    }

    #[test]
    fn placeholder_list() {
        assert_eq!(placeholders(2), "?,?");
        assert_eq!(placeholders(0), "");
    }
}
