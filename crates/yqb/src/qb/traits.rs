//! Trait definitions for statement builders.

use crate::error::{QbError, QbResult};
use crate::placeholder::{count_placeholders, Dialect};
use crate::runner::{self, FromRow, Row, RunContext, Runner};
use crate::typed::{self, TypedSql};
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Rendered SQL text with its ordered argument list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuiltSql {
    pub sql: String,
    pub args: Vec<Value>,
}

impl BuiltSql {
    /// Create a built statement.
    pub fn new(sql: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            args,
        }
    }

    pub(crate) fn from_sql(sql: &str) -> Self {
        Self {
            sql: sql.to_string(),
            args: Vec::new(),
        }
    }

    /// Rewrite the bare `?` markers into `dialect`.
    pub fn finalize(self, dialect: Dialect) -> Self {
        let (sql, _) = dialect.replace_placeholders(&self.sql);
        Self {
            sql,
            args: self.args,
        }
    }

    /// Number of parameters bound by raw text: unescaped `?` markers plus the
    /// arguments of pre-finalized blocks.
    pub fn placeholder_count(&self) -> usize {
        count_placeholders(&self.sql)
    }
}

/// Base trait for all statement builders.
///
/// Nested builders only ever use [`SqlQb::render_raw`]; the placeholder pass
/// runs once, in [`SqlQb::to_sql`] of the outermost builder.
pub trait SqlQb: Send + Sync {
    /// Render with bare `?` placeholders and unconverted arguments.
    fn render_raw(&self) -> QbResult<BuiltSql>;

    /// Dialect used by [`SqlQb::to_sql`].
    fn placeholder_dialect(&self) -> Dialect {
        Dialect::default()
    }

    /// Render and rewrite placeholders into this builder's dialect.
    fn to_sql(&self) -> QbResult<BuiltSql> {
        Ok(self.render_raw()?.finalize(self.placeholder_dialect()))
    }

    /// Render with `$pN` placeholders, typed parameters and a `DECLARE`
    /// preamble.
    fn to_typed_sql(&self) -> QbResult<TypedSql> {
        typed::to_typed_sql(self.render_raw()?)
    }
}

/// Statements that can be forwarded to an injected [`Runner`].
pub trait RunQb: SqlQb {
    /// The runner set with `run_with`, if any.
    fn runner(&self) -> Option<&Arc<dyn Runner>>;

    fn require_runner(&self) -> QbResult<&Arc<dyn Runner>> {
        self.runner().ok_or(QbError::RunnerNotSet)
    }

    /// Execute and return the affected row count.
    fn exec(&self) -> impl std::future::Future<Output = QbResult<u64>> + Send {
        async move {
            let ctx = RunContext::default();
            self.exec_ctx(&ctx).await
        }
    }

    /// Execute under `ctx`.
    fn exec_ctx(
        &self,
        ctx: &RunContext,
    ) -> impl std::future::Future<Output = QbResult<u64>> + Send {
        async move {
            let runner = self.require_runner()?;
            runner::exec_with(runner.as_ref(), ctx, self).await
        }
    }

    /// Execute and return all rows.
    fn query(&self) -> impl std::future::Future<Output = QbResult<Vec<Row>>> + Send {
        async move {
            let ctx = RunContext::default();
            self.query_ctx(&ctx).await
        }
    }

    /// Query under `ctx`.
    fn query_ctx(
        &self,
        ctx: &RunContext,
    ) -> impl std::future::Future<Output = QbResult<Vec<Row>>> + Send {
        async move {
            let runner = self.require_runner()?;
            runner::query_with(runner.as_ref(), ctx, self).await
        }
    }

    /// Execute and return exactly one row.
    fn query_row(&self) -> impl std::future::Future<Output = QbResult<Row>> + Send {
        async move {
            let ctx = RunContext::default();
            self.query_row_ctx(&ctx).await
        }
    }

    /// Query one row under `ctx`.
    fn query_row_ctx(
        &self,
        ctx: &RunContext,
    ) -> impl std::future::Future<Output = QbResult<Row>> + Send {
        async move {
            let runner = self.require_runner()?;
            runner::query_row_with(runner.as_ref(), ctx, self).await
        }
    }

    /// Query one row and map it to `T`.
    fn scan<T: FromRow>(&self) -> impl std::future::Future<Output = QbResult<T>> + Send {
        async move {
            let ctx = RunContext::default();
            self.scan_ctx(&ctx).await
        }
    }

    /// Query one row under `ctx` and map it to `T`.
    fn scan_ctx<T: FromRow>(
        &self,
        ctx: &RunContext,
    ) -> impl std::future::Future<Output = QbResult<T>> + Send {
        async move {
            let row = self.query_row_ctx(ctx).await?;
            T::from_row(&row)
        }
    }

    /// Execute with typed parameters and return the affected row count.
    fn exec_typed(&self) -> impl std::future::Future<Output = QbResult<u64>> + Send {
        async move {
            let ctx = RunContext::default();
            self.exec_typed_ctx(&ctx).await
        }
    }

    /// Execute with typed parameters under `ctx`.
    fn exec_typed_ctx(
        &self,
        ctx: &RunContext,
    ) -> impl std::future::Future<Output = QbResult<u64>> + Send {
        async move {
            let runner = self.require_runner()?;
            runner::exec_typed_with(runner.as_ref(), ctx, self).await
        }
    }

    fn query_typed(&self) -> impl std::future::Future<Output = QbResult<Vec<Row>>> + Send {
        async move {
            let ctx = RunContext::default();
            self.query_typed_ctx(&ctx).await
        }
    }

    fn query_typed_ctx(
        &self,
        ctx: &RunContext,
    ) -> impl std::future::Future<Output = QbResult<Vec<Row>>> + Send {
        async move {
            let runner = self.require_runner()?;
            runner::query_typed_with(runner.as_ref(), ctx, self).await
        }
    }

    fn query_row_typed(&self) -> impl std::future::Future<Output = QbResult<Row>> + Send {
        async move {
            let ctx = RunContext::default();
            self.query_row_typed_ctx(&ctx).await
        }
    }

    fn query_row_typed_ctx(
        &self,
        ctx: &RunContext,
    ) -> impl std::future::Future<Output = QbResult<Row>> + Send {
        async move {
            let runner = self.require_runner()?;
            runner::query_row_typed_with(runner.as_ref(), ctx, self).await
        }
    }
}

/// Per-builder execution settings carried alongside the statement data.
#[derive(Clone, Default)]
pub(crate) struct Settings {
    pub(crate) dialect: Dialect,
    pub(crate) runner: Option<Arc<dyn Runner>>,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("dialect", &self.dialect)
            .field("runner", &self.runner.as_ref().map(|_| "dyn Runner"))
            .finish()
    }
}

/// Shared surface of a statement builder over `Arc<$data>`, where `$data`
/// has `prefixes`/`suffixes` slots and a `render_raw` method.
macro_rules! impl_statement {
    ($builder:ident, $data:ident) => {
        impl $builder {
            /// Set the placeholder dialect used by `to_sql`.
            pub fn dialect(mut self, dialect: $crate::placeholder::Dialect) -> Self {
                self.settings.dialect = dialect;
                self
            }

            /// Attach a runner for `exec`/`query`/`query_row`/`scan`.
            pub fn run_with(
                mut self,
                runner: ::std::sync::Arc<dyn $crate::runner::Runner>,
            ) -> Self {
                self.settings.runner = Some(runner);
                self
            }

            /// Add a fragment written before the statement.
            pub fn prefix(mut self, fragment: impl Into<$crate::fragment::Fragment>) -> Self {
                self.data_mut().prefixes.push(fragment.into());
                self
            }

            /// Add a fragment written after the statement.
            pub fn suffix(mut self, fragment: impl Into<$crate::fragment::Fragment>) -> Self {
                self.data_mut().suffixes.push(fragment.into());
                self
            }

            fn data_mut(&mut self) -> &mut $data {
                ::std::sync::Arc::make_mut(&mut self.data)
            }
        }

        impl $crate::qb::traits::SqlQb for $builder {
            fn render_raw(&self) -> $crate::error::QbResult<$crate::qb::traits::BuiltSql> {
                self.data.render_raw()
            }

            fn placeholder_dialect(&self) -> $crate::placeholder::Dialect {
                self.settings.dialect
            }
        }

        impl $crate::qb::traits::RunQb for $builder {
            fn runner(
                &self,
            ) -> Option<&::std::sync::Arc<dyn $crate::runner::Runner>> {
                self.settings.runner.as_ref()
            }
        }
    };
}

pub(crate) use impl_statement;
