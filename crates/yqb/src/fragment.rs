//! The fragment model.
//!
//! A [`Fragment`] is anything that renders to SQL text plus an ordered list of
//! raw arguments. Rendering here is always *raw*: placeholders stay as bare
//! `?` so that a fragment nested inside a statement is numbered together with
//! its parent when the outermost statement is finalized.

use crate::buffer::SqlBuffer;
use crate::error::QbResult;
use crate::expr::{self, CompareOp, Operand};
use crate::placeholder::opaque_block;
use crate::qb::{
    BuiltSql, CaseBuilder, CreateBuilder, DeleteBuilder, DropBuilder, InsertBuilder, SelectBuilder,
    SqlQb, Statement, UpdateBuilder,
};
use crate::value::{for_each_scalar, ScalarKind, Value};
use std::collections::BTreeMap;

/// A raw SQL template with `?` placeholders and the values bound to them.
///
/// The number of `?` and the number of args are not checked against each
/// other.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    sql: String,
    args: Vec<Value>,
}

impl Expr {
    /// Create an expression with arguments.
    ///
    /// # Example
    /// ```ignore
    /// Expr::new("a > ? AND a < ?", [1, 10])
    /// ```
    pub fn new(sql: impl Into<String>, args: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        Self {
            sql: sql.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Create an expression without arguments.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            args: Vec::new(),
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub(crate) fn is_blank(&self) -> bool {
        self.sql.is_empty() && self.args.is_empty()
    }

    /// Prepend a keyword, e.g. `JOIN`, keeping the arguments.
    pub(crate) fn prefixed(self, keyword: &str) -> Self {
        Self {
            sql: format!("{keyword} {}", self.sql),
            args: self.args,
        }
    }
}

impl From<&str> for Expr {
    fn from(sql: &str) -> Self {
        Expr::raw(sql)
    }
}

impl From<String> for Expr {
    fn from(sql: String) -> Self {
        Expr::raw(sql)
    }
}

/// Closed set of renderable fragments.
#[derive(Debug, Clone)]
pub enum Fragment {
    /// Raw template with arguments.
    Expr(Expr),
    /// `col = ?` pairs joined with AND.
    Equal(BTreeMap<String, Operand>),
    /// `col <> ?` pairs joined with AND.
    NotEqual(BTreeMap<String, Operand>),
    /// Ordered comparison pairs joined with AND.
    Compare(CompareOp, BTreeMap<String, Operand>),
    /// Conjunction.
    And(Vec<Fragment>),
    /// Disjunction.
    Or(Vec<Fragment>),
    /// `(<fragment>) AS <alias>`
    Alias(Box<Fragment>, String),
    /// CASE expression.
    Case(CaseBuilder),
    /// Nested statement, rendered raw.
    Statement(Box<Statement>),
    /// Already finalized block spliced in verbatim.
    Rendered(BuiltSql),
}

impl Fragment {
    /// Conjunction of the given parts.
    pub fn and(parts: impl IntoIterator<Item = impl Into<Fragment>>) -> Self {
        Fragment::And(parts.into_iter().map(Into::into).collect())
    }

    /// Disjunction of the given parts.
    pub fn or(parts: impl IntoIterator<Item = impl Into<Fragment>>) -> Self {
        Fragment::Or(parts.into_iter().map(Into::into).collect())
    }

    /// Wrap this fragment as `(<fragment>) AS <alias>`.
    pub fn alias(self, alias: impl Into<String>) -> Self {
        Fragment::Alias(Box::new(self), alias.into())
    }

    /// Finalize `qb` under its own dialect now and embed the result as an
    /// opaque block.
    ///
    /// The block's text is copied verbatim by every later pass, whatever the
    /// outer dialect. Its arguments take their place in the parameter stream
    /// and the outer numbering continues after them, so the block's own
    /// markers line up only when it precedes every outer placeholder.
    pub fn finalized(qb: &impl SqlQb) -> QbResult<Self> {
        Ok(Fragment::Rendered(qb.to_sql()?))
    }

    pub(crate) fn is_blank(&self) -> bool {
        matches!(self, Fragment::Expr(e) if e.is_blank())
    }

    pub(crate) fn is_select(&self) -> bool {
        matches!(self, Fragment::Statement(s) if matches!(**s, Statement::Select(_)))
    }

    /// Render to text with bare `?` placeholders and unconverted args.
    pub fn render_raw(&self) -> QbResult<BuiltSql> {
        match self {
            Fragment::Expr(e) => Ok(BuiltSql {
                sql: e.sql.clone(),
                args: e.args.clone(),
            }),
            Fragment::Equal(map) => Ok(expr::render_equality(map, false)),
            Fragment::NotEqual(map) => Ok(expr::render_equality(map, true)),
            Fragment::Compare(op, map) => expr::render_comparison(*op, map),
            Fragment::And(parts) => expr::render_and(parts),
            Fragment::Or(parts) => expr::render_or(parts),
            Fragment::Alias(inner, alias) => {
                let built = inner.render_raw()?;
                Ok(BuiltSql {
                    sql: format!("({}) AS {}", built.sql, alias),
                    args: built.args,
                })
            }
            Fragment::Case(case) => case.render_raw(),
            Fragment::Statement(stmt) => stmt.render_raw(),
            Fragment::Rendered(built) if built.sql.is_empty() => Ok(built.clone()),
            Fragment::Rendered(built) => Ok(BuiltSql {
                sql: opaque_block(&built.sql, built.args.len()),
                args: built.args.clone(),
            }),
        }
    }
}

impl From<&str> for Fragment {
    fn from(sql: &str) -> Self {
        Fragment::Expr(Expr::raw(sql))
    }
}

impl From<String> for Fragment {
    fn from(sql: String) -> Self {
        Fragment::Expr(Expr::raw(sql))
    }
}

impl From<Expr> for Fragment {
    fn from(e: Expr) -> Self {
        Fragment::Expr(e)
    }
}

impl From<CaseBuilder> for Fragment {
    fn from(case: CaseBuilder) -> Self {
        Fragment::Case(case)
    }
}

impl From<Statement> for Fragment {
    fn from(stmt: Statement) -> Self {
        Fragment::Statement(Box::new(stmt))
    }
}

macro_rules! fragment_from_statement {
    ($($builder:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$builder> for Fragment {
                fn from(b: $builder) -> Self {
                    Fragment::Statement(Box::new(Statement::$variant(b)))
                }
            }
        )*
    };
}

fragment_from_statement! {
    SelectBuilder => Select,
    InsertBuilder => Insert,
    UpdateBuilder => Update,
    DeleteBuilder => Delete,
    CreateBuilder => Create,
    DropBuilder => Drop,
}

/// Right-hand side of an INSERT cell or an UPDATE assignment.
#[derive(Debug, Clone)]
pub enum SetValue {
    /// Bound as a single `?`.
    Arg(Value),
    /// Rendered inline; a nested SELECT is parenthesized.
    Fragment(Fragment),
}

impl SetValue {
    pub(crate) fn write_to(&self, buf: &mut SqlBuffer) {
        match self {
            SetValue::Arg(v) => buf.push_arg(v.clone()),
            SetValue::Fragment(f) if f.is_select() => {
                if let Some(built) = buf.render(f) {
                    buf.push_str("(");
                    buf.append(built);
                    buf.push_str(")");
                }
            }
            SetValue::Fragment(f) => {
                if let Some(built) = buf.render(f) {
                    buf.append(built);
                }
            }
        }
    }
}

macro_rules! set_value_from_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for SetValue {
                fn from(v: $ty) -> Self {
                    SetValue::Arg(Value::from(v))
                }
            }
        )*
    };
}

for_each_scalar!(set_value_from_scalar);

impl From<Vec<u8>> for SetValue {
    fn from(v: Vec<u8>) -> Self {
        SetValue::Arg(Value::Bytes(v))
    }
}

impl<T: Into<Value> + ScalarKind> From<Option<T>> for SetValue {
    fn from(v: Option<T>) -> Self {
        SetValue::Arg(Value::from(v))
    }
}

impl From<Fragment> for SetValue {
    fn from(f: Fragment) -> Self {
        SetValue::Fragment(f)
    }
}

impl From<Expr> for SetValue {
    fn from(e: Expr) -> Self {
        SetValue::Fragment(Fragment::Expr(e))
    }
}

impl From<CaseBuilder> for SetValue {
    fn from(case: CaseBuilder) -> Self {
        SetValue::Fragment(Fragment::Case(case))
    }
}

impl From<SelectBuilder> for SetValue {
    fn from(select: SelectBuilder) -> Self {
        SetValue::Fragment(select.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Equal;
    use crate::qb::select;

    #[test]
    fn expr_renders_verbatim() {
        let built = Fragment::from(Expr::new("a = ? OR b = ?", [1, 2]))
            .render_raw()
            .unwrap();
        assert_eq!(built.sql, "a = ? OR b = ?");
        assert_eq!(built.args, vec![Value::Int32(1), Value::Int32(2)]);
    }

    #[test]
    fn mismatched_args_are_not_validated() {
        let built = Fragment::from(Expr::new("a = ?", [1, 2, 3]))
            .render_raw()
            .unwrap();
        assert_eq!(built.sql, "a = ?");
        assert_eq!(built.args.len(), 3);
    }

    #[test]
    fn alias_wraps_in_parens() {
        let built = Fragment::from(Equal::new().with("b", vec![1, 2]))
            .alias("b_alias")
            .render_raw()
            .unwrap();
        assert_eq!(built.sql, "(b IN (?,?)) AS b_alias");
    }

    #[test]
    fn finalized_block_is_opaque() {
        let inner = select(["a"])
            .from("t")
            .where_(Expr::new("b = ?", [1]))
            .dialect(crate::Dialect::Dollar);
        let frag = Fragment::finalized(&inner).unwrap();
        let built = frag.render_raw().unwrap();
        assert_eq!(built.placeholder_count(), 1);
        assert_eq!(built.args, vec![Value::Int32(1)]);
        let built = built.finalize(crate::Dialect::AtP);
        assert_eq!(built.sql, "SELECT a FROM t WHERE b = $1");
    }

    #[test]
    fn nested_select_set_value_is_parenthesized() {
        let mut buf = SqlBuffer::new();
        SetValue::from(select(["a"]).from("b")).write_to(&mut buf);
        assert_eq!(buf.finish().unwrap().sql, "(SELECT a FROM b)");
    }
}
