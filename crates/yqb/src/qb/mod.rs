//! Statement builders.
//!
//! Every builder is an immutable value: each call returns a new builder and
//! leaves the receiver untouched. Builders nest freely. A builder used as a
//! fragment of another statement renders raw, and placeholders are numbered
//! once over the whole text by the outermost `to_sql`.
//!
//! # Usage
//!
//! ```ignore
//! use yqb::qb::{select, insert, update, delete};
//! use yqb::{Dialect, Equal, Expr, SqlQb};
//!
//! // SELECT a, b FROM t WHERE x = $1
//! let built = select(["a", "b"])
//!     .from("t")
//!     .where_(Equal::new().with("x", 1))
//!     .dialect(Dialect::Dollar)
//!     .to_sql()?;
//!
//! // INSERT INTO t VALUES (?,?),(?,?)
//! let built = insert("t").values([1, 2]).values([3, 4]).to_sql()?;
//!
//! // UPDATE users SET status = ? WHERE id = ?
//! let built = update("users")
//!     .set("status", "inactive")
//!     .where_(Expr::new("id = ?", [7]))
//!     .to_sql()?;
//! ```

mod case;
mod create;
mod delete;
mod drop;
mod insert;
mod select;
pub(crate) mod traits;
mod update;

pub use case::CaseBuilder;
pub use create::CreateBuilder;
pub use delete::DeleteBuilder;
pub use drop::DropBuilder;
pub use insert::{InsertBuilder, InsertVerb};
pub use select::{FlattenMode, SelectBuilder};
pub use traits::{BuiltSql, RunQb, SqlQb};
pub use update::UpdateBuilder;

use crate::error::QbResult;

/// Any statement, as embedded in a [`crate::Fragment`].
#[derive(Debug, Clone)]
pub enum Statement {
    Select(SelectBuilder),
    Insert(InsertBuilder),
    Update(UpdateBuilder),
    Delete(DeleteBuilder),
    Create(CreateBuilder),
    Drop(DropBuilder),
}

impl Statement {
    /// Render the wrapped statement raw, ignoring its own dialect.
    pub fn render_raw(&self) -> QbResult<BuiltSql> {
        match self {
            Statement::Select(b) => b.render_raw(),
            Statement::Insert(b) => b.render_raw(),
            Statement::Update(b) => b.render_raw(),
            Statement::Delete(b) => b.render_raw(),
            Statement::Create(b) => b.render_raw(),
            Statement::Drop(b) => b.render_raw(),
        }
    }
}

/// Create a SELECT over the given result columns.
///
/// # Example
/// ```ignore
/// let qb = yqb::qb::select(["id", "name"]).from("users");
/// ```
pub fn select(columns: impl IntoIterator<Item = impl Into<String>>) -> SelectBuilder {
    SelectBuilder::new(columns)
}

/// Create an INSERT into the given table.
pub fn insert(table: impl Into<String>) -> InsertBuilder {
    InsertBuilder::new(table)
}

/// Create a REPLACE into the given table.
pub fn replace(table: impl Into<String>) -> InsertBuilder {
    InsertBuilder::replace(table)
}

/// Create an UPSERT into the given table.
pub fn upsert(table: impl Into<String>) -> InsertBuilder {
    InsertBuilder::upsert(table)
}

/// Create an UPDATE of the given table.
pub fn update(table: impl Into<String>) -> UpdateBuilder {
    UpdateBuilder::new(table)
}

/// Create a DELETE from the given table.
pub fn delete(table: impl Into<String>) -> DeleteBuilder {
    DeleteBuilder::new(table)
}

/// Create a CREATE TABLE statement.
pub fn create_table(table: impl Into<String>) -> CreateBuilder {
    CreateBuilder::new(table)
}

/// Create a DROP TABLE statement.
pub fn drop_table(table: impl Into<String>) -> DropBuilder {
    DropBuilder::new(table)
}

/// Create a searched CASE expression: `CASE WHEN ...`.
pub fn case() -> CaseBuilder {
    CaseBuilder::new()
}

/// Create a simple CASE expression over `what`: `CASE <what> WHEN ...`.
pub fn case_on(what: impl Into<crate::Fragment>) -> CaseBuilder {
    CaseBuilder::on(what)
}

#[cfg(test)]
mod tests;
