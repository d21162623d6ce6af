//! # yqb
//!
//! A composable, immutable SQL statement builder with YQL-typed parameters.
//!
//! ## Features
//!
//! - **Immutable builders**: every call returns a new value; older values stay valid snapshots
//! - **Composable fragments**: predicates, CASE expressions and whole statements nest anywhere
//! - **Correct numbering**: placeholders are numbered once over the whole statement
//! - **Pluggable dialects**: `?`, `$N`, `$pN`, `:N`, `@pN`; `??` escapes a literal `?`
//! - **Typed parameters**: `to_typed_sql()` adds a `DECLARE $pN AS <type>;` preamble
//! - **Run capability**: inject a [`Runner`] and call `exec`/`query`/`query_row`/`scan`,
//!   or `exec_typed`/`query_typed`/`query_row_typed` to bind typed parameters
//!
//! ## Usage
//!
//! ```ignore
//! use yqb::{Dialect, Equal, Expr, SqlQb};
//!
//! // SELECT
//! let built = yqb::select(["id", "name"])
//!     .from("users")
//!     .where_(Equal::new().with("status", "active"))
//!     .order_by(["created_at DESC"])
//!     .limit(10)
//!     .dialect(Dialect::Dollar)
//!     .to_sql()?;
//!
//! // INSERT
//! let built = yqb::insert("users")
//!     .columns(["username", "email"])
//!     .values(["alice", "alice@example.com"])
//!     .to_sql()?;
//!
//! // UPDATE with a nested SELECT
//! let built = yqb::update("users")
//!     .set("score", yqb::select(["max(score)"]).from("scores"))
//!     .where_(Expr::new("id = ?", [7]))
//!     .to_sql()?;
//!
//! // Typed parameters
//! let typed = yqb::delete("users")
//!     .where_(Equal::new().with("id", 7i64))
//!     .to_typed_sql()?;
//! // DECLARE $p1 AS Int64;
//! // DELETE FROM users WHERE id = $p1
//! ```

mod buffer;

pub mod builder;
pub mod error;
pub mod expr;
pub mod fragment;
pub mod placeholder;
pub mod qb;
pub mod runner;
pub mod typed;
pub mod value;

pub use builder::StatementBuilder;
pub use error::{QbError, QbResult};
pub use expr::{
    alias, and, expr, or, CompareOp, Equal, Greater, GreaterOrEqual, Less, LessOrEqual, NotEqual,
    Operand,
};
pub use fragment::{Expr, Fragment, SetValue};
pub use placeholder::{placeholders, Dialect};
pub use runner::{
    exec_typed_with, exec_with, query_row_typed_with, query_row_with, query_typed_with, query_with,
    FromRow, Row, RunContext, Runner,
};
pub use typed::{TypedParam, TypedSql, TypedValue, YqlType};
pub use value::{Kind, ScalarKind, Value};

// Re-export qb module for easy access
pub use qb::{
    case, case_on, create_table, delete, drop_table, insert, replace, select, update, upsert,
    BuiltSql, CaseBuilder, CreateBuilder, DeleteBuilder, DropBuilder, FlattenMode, InsertBuilder,
    InsertVerb, RunQb, SelectBuilder, SqlQb, Statement, UpdateBuilder,
};
