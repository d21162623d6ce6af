//! Statement defaults.
//!
//! [`StatementBuilder`] carries settings shared by every statement it starts:
//! the placeholder dialect, an optional runner and WHERE parts that are
//! prepended to every SELECT, UPDATE and DELETE.
//!
//! ```ignore
//! use yqb::{Dialect, Equal, StatementBuilder};
//!
//! let sb = StatementBuilder::default()
//!     .dialect(Dialect::Dollar)
//!     .where_(Equal::new().with("tenant_id", 42));
//!
//! // SELECT * FROM users WHERE tenant_id = $1 AND active = $2
//! let built = sb
//!     .select(["*"])
//!     .from("users")
//!     .where_(Equal::new().with("active", true))
//!     .to_sql()?;
//! ```

use crate::fragment::Fragment;
use crate::placeholder::Dialect;
use crate::qb::traits::Settings;
use crate::qb::{
    CaseBuilder, CreateBuilder, DeleteBuilder, DropBuilder, InsertBuilder, InsertVerb,
    SelectBuilder, UpdateBuilder,
};
use crate::runner::Runner;
use std::sync::Arc;

/// Default settings for new statements.
///
/// Immutable like the statement builders: every setter returns a new value.
#[derive(Debug, Clone, Default)]
pub struct StatementBuilder {
    settings: Settings,
    where_parts: Vec<Fragment>,
}

impl StatementBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Placeholder dialect for statements started from here.
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.settings.dialect = dialect;
        self
    }

    /// Runner for statements started from here.
    pub fn run_with(mut self, runner: Arc<dyn Runner>) -> Self {
        self.settings.runner = Some(runner);
        self
    }

    /// Add a WHERE part shared by SELECT, UPDATE and DELETE.
    pub fn where_(mut self, pred: impl Into<Fragment>) -> Self {
        let pred = pred.into();
        if !pred.is_blank() {
            self.where_parts.push(pred);
        }
        self
    }

    pub fn select(&self, columns: impl IntoIterator<Item = impl Into<String>>) -> SelectBuilder {
        SelectBuilder::with_settings(self.settings.clone(), self.where_parts.clone())
            .columns(columns)
    }

    pub fn insert(&self, table: impl Into<String>) -> InsertBuilder {
        InsertBuilder::with_settings(self.settings.clone(), InsertVerb::Insert, table)
    }

    pub fn replace(&self, table: impl Into<String>) -> InsertBuilder {
        InsertBuilder::with_settings(self.settings.clone(), InsertVerb::Replace, table)
    }

    pub fn upsert(&self, table: impl Into<String>) -> InsertBuilder {
        InsertBuilder::with_settings(self.settings.clone(), InsertVerb::Upsert, table)
    }

    pub fn update(&self, table: impl Into<String>) -> UpdateBuilder {
        UpdateBuilder::with_settings(self.settings.clone(), self.where_parts.clone(), table)
    }

    pub fn delete(&self, table: impl Into<String>) -> DeleteBuilder {
        DeleteBuilder::with_settings(self.settings.clone(), self.where_parts.clone(), table)
    }

    pub fn create_table(&self, table: impl Into<String>) -> CreateBuilder {
        CreateBuilder::with_settings(self.settings.clone(), table)
    }

    pub fn drop_table(&self, table: impl Into<String>) -> DropBuilder {
        DropBuilder::with_settings(self.settings.clone(), table)
    }

    /// A searched CASE in this dialect. CASE has no runner.
    pub fn case(&self) -> CaseBuilder {
        CaseBuilder::new().dialect(self.settings.dialect)
    }

    pub fn case_on(&self, what: impl Into<Fragment>) -> CaseBuilder {
        CaseBuilder::on(what).dialect(self.settings.dialect)
    }
}
