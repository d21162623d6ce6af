//! CASE expression builder.

use crate::buffer::SqlBuffer;
use crate::error::{QbError, QbResult};
use crate::fragment::Fragment;
use crate::placeholder::Dialect;
use crate::qb::traits::{BuiltSql, SqlQb};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub(crate) struct CaseData {
    what: Option<Fragment>,
    when_parts: Vec<(Fragment, Fragment)>,
    else_part: Option<Fragment>,
}

impl CaseData {
    fn render_raw(&self) -> QbResult<BuiltSql> {
        if self.when_parts.is_empty() {
            return Err(QbError::validation(
                "case expression must contain at least one WHEN clause",
            ));
        }

        let mut buf = SqlBuffer::new();
        buf.push_str("CASE ");
        if let Some(what) = &self.what {
            buf.push_fragment_spaced(what);
        }
        for (when, then) in &self.when_parts {
            buf.push_str("WHEN ");
            buf.push_fragment_spaced(when);
            buf.push_str("THEN ");
            buf.push_fragment_spaced(then);
        }
        if let Some(else_part) = &self.else_part {
            buf.push_str("ELSE ");
            buf.push_fragment_spaced(else_part);
        }
        buf.push_str("END");
        buf.finish()
    }
}

/// Builds `CASE [<what>] WHEN <cond> THEN <result> ... [ELSE <else>] END`.
///
/// Used as a fragment inside other statements: a result column, an UPDATE
/// assignment or a predicate.
#[derive(Debug, Clone, Default)]
pub struct CaseBuilder {
    data: Arc<CaseData>,
    dialect: Dialect,
}

impl CaseBuilder {
    /// A searched CASE with no value: `CASE WHEN ...`.
    pub fn new() -> Self {
        Self::default()
    }

    /// A simple CASE over `what`: `CASE <what> WHEN ...`.
    pub fn on(what: impl Into<Fragment>) -> Self {
        let data = CaseData {
            what: Some(what.into()),
            ..CaseData::default()
        };
        Self {
            data: Arc::new(data),
            dialect: Dialect::default(),
        }
    }

    /// Add a `WHEN <when> THEN <then>` branch.
    pub fn when(mut self, when: impl Into<Fragment>, then: impl Into<Fragment>) -> Self {
        Arc::make_mut(&mut self.data)
            .when_parts
            .push((when.into(), then.into()));
        self
    }

    /// Set the `ELSE` branch.
    pub fn else_(mut self, else_part: impl Into<Fragment>) -> Self {
        Arc::make_mut(&mut self.data).else_part = Some(else_part.into());
        self
    }

    /// Set the placeholder dialect used when rendered on its own.
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }
}

impl SqlQb for CaseBuilder {
    fn render_raw(&self) -> QbResult<BuiltSql> {
        self.data.render_raw()
    }

    fn placeholder_dialect(&self) -> Dialect {
        self.dialect
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Equal;
    use crate::fragment::Expr;
    use crate::value::Value;

    #[test]
    fn test_simple_case_with_else() {
        let built = CaseBuilder::on("number")
            .when("1", "one")
            .when("2", "two")
            .else_(Expr::new("?", ["big number"]))
            .to_sql()
            .unwrap();
        assert_eq!(
            built.sql,
            "CASE number WHEN 1 THEN one WHEN 2 THEN two ELSE ? END"
        );
        assert_eq!(built.args, vec![Value::Text("big number".into())]);
    }

    #[test]
    fn test_searched_case() {
        let built = CaseBuilder::new()
            .when(Equal::new().with("x", 0), "x is zero")
            .when(
                Expr::new("x > ?", [1]),
                Expr::new("CONCAT('x is greater than ', ?)", [2]),
            )
            .dialect(Dialect::Dollar)
            .to_sql()
            .unwrap();
        assert_eq!(
            built.sql,
            "CASE WHEN x = $1 THEN x is zero WHEN x > $2 THEN CONCAT('x is greater than ', $3) END"
        );
        assert_eq!(built.args.len(), 3);
    }

    #[test]
    fn test_case_needs_a_when() {
        let err = CaseBuilder::on("something").else_("42").to_sql().unwrap_err();
        assert_eq!(
            err.to_string(),
            "case expression must contain at least one WHEN clause"
        );
    }

    #[test]
    fn test_one_when_is_enough() {
        let sql = CaseBuilder::new().when("true", "'T'").to_sql().unwrap().sql;
        assert_eq!(sql, "CASE WHEN true THEN 'T' END");
    }
}
