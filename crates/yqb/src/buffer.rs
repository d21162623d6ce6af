//! Assembly buffer used by every statement renderer.
//!
//! Fragments are rendered one after another into a single text with a flat
//! argument list. The first failure sticks: later writes are ignored and
//! [`SqlBuffer::finish`] returns that error unchanged.

use crate::error::{QbError, QbResult};
use crate::fragment::Fragment;
use crate::qb::BuiltSql;
use crate::value::Value;

#[derive(Debug, Default)]
pub(crate) struct SqlBuffer {
    sql: String,
    args: Vec<Value>,
    err: Option<QbError>,
}

impl SqlBuffer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn is_failed(&self) -> bool {
        self.err.is_some()
    }

    pub(crate) fn fail(&mut self, err: QbError) {
        if self.err.is_none() {
            self.err = Some(err);
        }
    }

    /// Append raw text.
    pub(crate) fn push_str(&mut self, s: &str) {
        if !self.is_failed() {
            self.sql.push_str(s);
        }
    }

    /// Append one bound argument as a bare `?`.
    pub(crate) fn push_arg(&mut self, value: Value) {
        if !self.is_failed() {
            self.sql.push('?');
            self.args.push(value);
        }
    }

    /// Append an already rendered piece.
    pub(crate) fn append(&mut self, built: BuiltSql) {
        if !self.is_failed() {
            self.sql.push_str(&built.sql);
            self.args.extend(built.args);
        }
    }

    /// Render a fragment, recording a failure instead of returning it.
    pub(crate) fn render(&mut self, fragment: &Fragment) -> Option<BuiltSql> {
        if self.is_failed() {
            return None;
        }
        match fragment.render_raw() {
            Ok(built) => Some(built),
            Err(err) => {
                self.fail(err);
                None
            }
        }
    }

    /// Render and append a fragment. Returns whether any text was written.
    pub(crate) fn push_fragment(&mut self, fragment: &Fragment) -> bool {
        match self.render(fragment) {
            Some(built) if !built.sql.is_empty() => {
                self.append(built);
                true
            }
            _ => false,
        }
    }

    /// Render and append a fragment followed by a single space.
    pub(crate) fn push_fragment_spaced(&mut self, fragment: &Fragment) {
        if self.push_fragment(fragment) {
            self.sql.push(' ');
        }
    }

    /// Render fragments in order, skip the ones producing no text, and join
    /// the rest with `sep`. Returns whether any text was written.
    pub(crate) fn push_joined<'a>(
        &mut self,
        parts: impl IntoIterator<Item = &'a Fragment>,
        sep: &str,
    ) -> bool {
        let mut wrote = false;
        for part in parts {
            let Some(built) = self.render(part) else {
                return wrote;
            };
            if built.sql.is_empty() {
                continue;
            }
            if wrote {
                self.sql.push_str(sep);
            }
            self.append(built);
            wrote = true;
        }
        wrote
    }

    /// Open a new space-separated slot holding `text`.
    pub(crate) fn word(&mut self, text: &str) {
        if self.is_failed() || text.is_empty() {
            return;
        }
        if !self.sql.is_empty() {
            self.sql.push(' ');
        }
        self.sql.push_str(text);
    }

    /// Open a slot with `keyword` followed by the joined parts. Nothing is
    /// written when every part renders empty.
    pub(crate) fn clause<'a>(
        &mut self,
        keyword: &str,
        parts: impl IntoIterator<Item = &'a Fragment>,
        sep: &str,
    ) {
        self.clause_inner(keyword, parts, sep, false);
    }

    /// Like [`SqlBuffer::clause`], with the joined parts in parentheses.
    pub(crate) fn group<'a>(
        &mut self,
        keyword: &str,
        parts: impl IntoIterator<Item = &'a Fragment>,
        sep: &str,
    ) {
        self.clause_inner(keyword, parts, sep, true);
    }

    fn clause_inner<'a>(
        &mut self,
        keyword: &str,
        parts: impl IntoIterator<Item = &'a Fragment>,
        sep: &str,
        parens: bool,
    ) {
        let mut inner = SqlBuffer::new();
        let wrote = inner.push_joined(parts, sep);
        match inner.finish() {
            Err(err) => self.fail(err),
            Ok(mut built) if wrote => {
                if parens {
                    built.sql = format!("({})", built.sql);
                }
                if keyword.is_empty() {
                    self.word(&built.sql);
                } else {
                    self.word(keyword);
                    self.push_str(" ");
                    self.push_str(&built.sql);
                }
                if !self.is_failed() {
                    self.args.extend(built.args);
                }
            }
            Ok(_) => {}
        }
    }

    pub(crate) fn finish(self) -> QbResult<BuiltSql> {
        match self.err {
            Some(err) => Err(err),
            None => Ok(BuiltSql {
                sql: self.sql,
                args: self.args,
            }),
        }
    }
}
