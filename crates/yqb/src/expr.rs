//! Predicate expressions.
//!
//! Column maps render their pairs in key order, so the output never depends on
//! insertion order.
//!
//! # Example
//! ```ignore
//! use yqb::{Equal, Greater, and};
//!
//! let cond = and([
//!     Equal::new().with("status", "active").into(),
//!     Greater::new().with("age", 18).into(),
//! ]);
//! // (status = ? AND age > ?)
//! ```

use crate::buffer::SqlBuffer;
use crate::error::{QbError, QbResult};
use crate::fragment::Fragment;
use crate::qb::BuiltSql;
use crate::value::{for_each_scalar, ScalarKind, Value};
use std::collections::BTreeMap;

// ==================== Operands ====================

/// Right-hand side of a column predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A single bound value. [`Value::List`] renders as `IN ?`.
    Scalar(Value),
    /// A sequence expanded into `IN (?,?,...)`.
    Seq(Vec<Value>),
    /// Explicit NULL marker.
    Null,
}

impl Operand {
    fn is_null(&self) -> bool {
        match self {
            Operand::Null => true,
            Operand::Scalar(v) => v.is_null(),
            Operand::Seq(_) => false,
        }
    }
}

macro_rules! operand_from_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Operand {
                fn from(v: $ty) -> Self {
                    Operand::Scalar(Value::from(v))
                }
            }
        )*
    };
}

for_each_scalar!(operand_from_scalar);

impl<T: Into<Value>> From<Vec<T>> for Operand {
    fn from(items: Vec<T>) -> Self {
        Operand::Seq(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Operand {
    fn from(items: [T; N]) -> Self {
        Operand::Seq(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value> + ScalarKind> From<Option<T>> for Operand {
    fn from(v: Option<T>) -> Self {
        Operand::Scalar(Value::from(v))
    }
}

// ==================== Column maps ====================

/// Ordered comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl CompareOp {
    pub fn as_str(self) -> &'static str {
        match self {
            CompareOp::Less => "<",
            CompareOp::LessOrEqual => "<=",
            CompareOp::Greater => ">",
            CompareOp::GreaterOrEqual => ">=",
        }
    }
}

macro_rules! column_map {
    ($(#[$doc:meta])* $name:ident => |$map:ident| $into:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name(BTreeMap<String, Operand>);

        impl $name {
            pub fn new() -> Self {
                Self::default()
            }

            /// Add a column predicate.
            pub fn with(mut self, column: impl Into<String>, value: impl Into<Operand>) -> Self {
                self.0.insert(column.into(), value.into());
                self
            }

            pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Operand>) {
                self.0.insert(column.into(), value.into());
            }

            pub fn len(&self) -> usize {
                self.0.len()
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl<K: Into<String>, V: Into<Operand>> FromIterator<(K, V)> for $name {
            fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
                Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
            }
        }

        impl From<$name> for Fragment {
            fn from(m: $name) -> Self {
                let $map = m.0;
                $into
            }
        }
    };
}

column_map! {
    /// `col = ?` for every pair.
    Equal => |map| Fragment::Equal(map)
}

column_map! {
    /// `col <> ?` for every pair.
    NotEqual => |map| Fragment::NotEqual(map)
}

column_map! {
    /// `col < ?` for every pair.
    Less => |map| Fragment::Compare(CompareOp::Less, map)
}

column_map! {
    /// `col <= ?` for every pair.
    LessOrEqual => |map| Fragment::Compare(CompareOp::LessOrEqual, map)
}

column_map! {
    /// `col > ?` for every pair.
    Greater => |map| Fragment::Compare(CompareOp::Greater, map)
}

column_map! {
    /// `col >= ?` for every pair.
    GreaterOrEqual => |map| Fragment::Compare(CompareOp::GreaterOrEqual, map)
}

// ==================== Rendering ====================

pub(crate) fn render_equality(map: &BTreeMap<String, Operand>, negate: bool) -> BuiltSql {
    if map.is_empty() {
        return BuiltSql::from_sql("(1=1)");
    }

    let (eq, is_null, in_op, empty_seq) = if negate {
        ("<>", "IS NOT NULL", "NOT IN", "(1=1)")
    } else {
        ("=", "IS NULL", "IN", "(1=0)")
    };

    let mut parts = Vec::with_capacity(map.len());
    let mut args = Vec::new();
    for (column, operand) in map {
        if operand.is_null() {
            parts.push(format!("{column} {is_null}"));
            continue;
        }
        match operand {
            Operand::Seq(items) if items.is_empty() => parts.push(empty_seq.to_string()),
            Operand::Seq(items) => {
                parts.push(format!(
                    "{column} {in_op} ({})",
                    crate::placeholder::placeholders(items.len())
                ));
                args.extend(items.iter().cloned());
            }
            Operand::Scalar(list @ Value::List(_)) => {
                parts.push(format!("{column} {in_op} ?"));
                args.push(list.clone());
            }
            Operand::Scalar(v) => {
                parts.push(format!("{column} {eq} ?"));
                args.push(v.clone());
            }
            Operand::Null => {}
        }
    }

    BuiltSql {
        sql: parts.join(" AND "),
        args,
    }
}

pub(crate) fn render_comparison(
    op: CompareOp,
    map: &BTreeMap<String, Operand>,
) -> QbResult<BuiltSql> {
    let mut parts = Vec::with_capacity(map.len());
    let mut args = Vec::new();
    for (column, operand) in map {
        if operand.is_null() {
            return Err(QbError::invalid_operand(
                "cannot use null with less than or greater than operators",
            ));
        }
        match operand {
            Operand::Seq(_) => {
                return Err(QbError::invalid_operand(
                    "cannot use array or slice with less than or greater than operators",
                ));
            }
            Operand::Scalar(v) => {
                parts.push(format!("{column} {} ?", op.as_str()));
                args.push(v.clone());
            }
            Operand::Null => {}
        }
    }

    Ok(BuiltSql {
        sql: parts.join(" AND "),
        args,
    })
}

fn render_junction(parts: &[Fragment], sep: &str, empty: &str) -> QbResult<BuiltSql> {
    if parts.is_empty() {
        return Ok(BuiltSql::from_sql(empty));
    }

    let mut buf = SqlBuffer::new();
    let wrote = buf.push_joined(parts, sep);
    let built = buf.finish()?;
    if !wrote {
        return Ok(built);
    }
    Ok(BuiltSql {
        sql: format!("({})", built.sql),
        args: built.args,
    })
}

pub(crate) fn render_and(parts: &[Fragment]) -> QbResult<BuiltSql> {
    if let [only @ Fragment::Or(_)] = parts {
        return only.render_raw();
    }
    render_junction(parts, " AND ", "(1=1)")
}

pub(crate) fn render_or(parts: &[Fragment]) -> QbResult<BuiltSql> {
    render_junction(parts, " OR ", "(1=0)")
}

// ==================== Constructors ====================

/// Raw expression with arguments.
pub fn expr(sql: impl Into<String>, args: impl IntoIterator<Item = impl Into<Value>>) -> Fragment {
    Fragment::Expr(crate::fragment::Expr::new(sql, args))
}

/// Conjunction of the given parts.
pub fn and(parts: impl IntoIterator<Item = impl Into<Fragment>>) -> Fragment {
    Fragment::and(parts)
}

/// Disjunction of the given parts.
pub fn or(parts: impl IntoIterator<Item = impl Into<Fragment>>) -> Fragment {
    Fragment::or(parts)
}

/// `(<fragment>) AS <alias>`
pub fn alias(fragment: impl Into<Fragment>, alias: impl Into<String>) -> Fragment {
    fragment.into().alias(alias)
}
