//! Run capability.
//!
//! Builders never talk to a database themselves. A [`Runner`] is injected with
//! `run_with` (or through [`crate::StatementBuilder`]) and receives the
//! finalized text with its argument list. Without a runner every run method
//! fails with [`QbError::RunnerNotSet`] before rendering or any I/O.
//!
//! The `*_typed` methods render through `to_typed_sql` instead and hand the
//! runner a [`TypedSql`] with its `DECLARE` preamble and YQL-typed values.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use yqb::{RunQb, Runner};
//!
//! let runner: Arc<dyn Runner> = Arc::new(MySessionRunner::new(session));
//! let affected = yqb::update("users")
//!     .set("status", "inactive")
//!     .where_(yqb::Equal::new().with("id", 7))
//!     .run_with(runner)
//!     .exec()
//!     .await?;
//! ```

use crate::error::{QbError, QbResult};
use crate::qb::SqlQb;
use crate::typed::TypedSql;
use crate::value::Value;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::time::Instant;

/// Longest SQL text written to a log event, in bytes.
const MAX_LOGGED_SQL: usize = 200;

/// Executes finalized statements. Implemented over a session or a
/// transaction by the embedding application.
#[async_trait]
pub trait Runner: Send + Sync {
    /// Execute a statement and return the affected row count.
    async fn exec(&self, ctx: &RunContext, sql: &str, args: &[Value]) -> QbResult<u64>;

    /// Execute a query and return all rows.
    async fn query(&self, ctx: &RunContext, sql: &str, args: &[Value]) -> QbResult<Vec<Row>>;

    /// Execute a query and return its first row.
    ///
    /// The default runs [`Runner::query`] and fails with
    /// [`QbError::NotFound`] when no row comes back.
    async fn query_row(&self, ctx: &RunContext, sql: &str, args: &[Value]) -> QbResult<Row> {
        self.query(ctx, sql, args)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| QbError::not_found("query_row returned no rows"))
    }

    /// Execute a statement whose text carries a `DECLARE` preamble and
    /// `$pN` parameters bound to the typed values in `typed.params`.
    ///
    /// Runners without typed binding keep the default, which fails.
    async fn exec_typed(&self, ctx: &RunContext, typed: &TypedSql) -> QbResult<u64> {
        let _ = (ctx, typed);
        Err(QbError::runner("typed parameters are not supported by this runner"))
    }

    /// Typed counterpart of [`Runner::query`].
    async fn query_typed(&self, ctx: &RunContext, typed: &TypedSql) -> QbResult<Vec<Row>> {
        let _ = (ctx, typed);
        Err(QbError::runner("typed parameters are not supported by this runner"))
    }

    /// Typed counterpart of [`Runner::query_row`].
    async fn query_row_typed(&self, ctx: &RunContext, typed: &TypedSql) -> QbResult<Row> {
        self.query_typed(ctx, typed)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| QbError::not_found("query_row returned no rows"))
    }
}

/// Caller-supplied execution context, passed to the runner unchanged.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    /// Point in time after which the runner should give up.
    pub deadline: Option<Instant>,
    /// Optional query name/tag for identification.
    pub tag: Option<String>,
    /// Optional structured fields for observability.
    pub fields: BTreeMap<String, String>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an absolute deadline.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Set a deadline `timeout` from now.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    /// Set the tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Add a structured field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Time left until the deadline; zero once it has passed.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    pub fn is_expired(&self) -> bool {
        self.remaining().is_some_and(|r| r.is_zero())
    }
}

/// A result row as handed back by a runner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of the named column.
    pub fn get(&self, column: &str) -> Option<&Value> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.values.get(idx)
    }

    /// Value at position `idx`.
    pub fn get_idx(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    /// Value of the named column, or [`QbError::NotFound`].
    pub fn try_get(&self, column: &str) -> QbResult<&Value> {
        self.get(column)
            .ok_or_else(|| QbError::not_found(format!("column `{column}`")))
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

/// Maps a [`Row`] into a Rust type.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> QbResult<Self>;
}

impl FromRow for Row {
    fn from_row(row: &Row) -> QbResult<Self> {
        Ok(row.clone())
    }
}

impl FromRow for Vec<Value> {
    fn from_row(row: &Row) -> QbResult<Self> {
        Ok(row.values.clone())
    }
}

/// Single-column rows.
impl FromRow for Value {
    fn from_row(row: &Row) -> QbResult<Self> {
        row.get_idx(0)
            .cloned()
            .ok_or_else(|| QbError::not_found("row has no columns"))
    }
}

// ==================== Free functions ====================

/// Render `qb` and execute it on `runner`.
pub async fn exec_with(
    runner: &dyn Runner,
    ctx: &RunContext,
    qb: &(impl SqlQb + ?Sized),
) -> QbResult<u64> {
    let built = qb.to_sql()?;
    log_statement("exec", ctx, &built.sql, built.args.len());
    runner.exec(ctx, &built.sql, &built.args).await
}

/// Render `qb` and query it on `runner`.
pub async fn query_with(
    runner: &dyn Runner,
    ctx: &RunContext,
    qb: &(impl SqlQb + ?Sized),
) -> QbResult<Vec<Row>> {
    let built = qb.to_sql()?;
    log_statement("query", ctx, &built.sql, built.args.len());
    runner.query(ctx, &built.sql, &built.args).await
}

/// Render `qb` and query one row on `runner`.
pub async fn query_row_with(
    runner: &dyn Runner,
    ctx: &RunContext,
    qb: &(impl SqlQb + ?Sized),
) -> QbResult<Row> {
    let built = qb.to_sql()?;
    log_statement("query_row", ctx, &built.sql, built.args.len());
    runner.query_row(ctx, &built.sql, &built.args).await
}

/// Render `qb` with typed parameters and execute it on `runner`.
pub async fn exec_typed_with(
    runner: &dyn Runner,
    ctx: &RunContext,
    qb: &(impl SqlQb + ?Sized),
) -> QbResult<u64> {
    let typed = qb.to_typed_sql()?;
    log_statement("exec_typed", ctx, &typed.sql, typed.params.len());
    runner.exec_typed(ctx, &typed).await
}

/// Render `qb` with typed parameters and query it on `runner`.
pub async fn query_typed_with(
    runner: &dyn Runner,
    ctx: &RunContext,
    qb: &(impl SqlQb + ?Sized),
) -> QbResult<Vec<Row>> {
    let typed = qb.to_typed_sql()?;
    log_statement("query_typed", ctx, &typed.sql, typed.params.len());
    runner.query_typed(ctx, &typed).await
}

/// Render `qb` with typed parameters and query one row on `runner`.
pub async fn query_row_typed_with(
    runner: &dyn Runner,
    ctx: &RunContext,
    qb: &(impl SqlQb + ?Sized),
) -> QbResult<Row> {
    let typed = qb.to_typed_sql()?;
    log_statement("query_row_typed", ctx, &typed.sql, typed.params.len());
    runner.query_row_typed(ctx, &typed).await
}

fn log_statement(op: &'static str, ctx: &RunContext, sql: &str, param_count: usize) {
    let tag = ctx.tag.as_deref().unwrap_or("-");
    tracing::debug!(
        target: "yqb.sql",
        op,
        tag,
        param_count,
        sql = %display_sql(sql),
        "forwarding statement to runner"
    );
}

fn display_sql(sql: &str) -> String {
    if sql.len() > MAX_LOGGED_SQL {
        format!("{}...", truncate_sql(sql, MAX_LOGGED_SQL))
    } else {
        sql.to_string()
    }
}

/// Cut `sql` to at most `max_bytes`, on a char boundary.
pub(crate) fn truncate_sql(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
