//! CREATE TABLE statement builder.

use crate::buffer::SqlBuffer;
use crate::error::{QbError, QbResult};
use crate::fragment::Fragment;
use crate::qb::traits::{impl_statement, BuiltSql, Settings};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub(crate) struct CreateData {
    prefixes: Vec<Fragment>,
    table: String,
    columns: Vec<String>,
    types: Vec<String>,
    primary_key: Vec<String>,
    suffixes: Vec<Fragment>,
}

impl CreateData {
    pub(crate) fn render_raw(&self) -> QbResult<BuiltSql> {
        if self.table.is_empty() {
            return Err(QbError::validation("create statements must specify a table"));
        }
        if self.columns.is_empty() {
            return Err(QbError::validation(
                "create statements must have at least one column",
            ));
        }
        if self.columns.len() != self.types.len() {
            return Err(QbError::validation(format!(
                "create statements must have as many types as columns ({} columns, {} types)",
                self.columns.len(),
                self.types.len()
            )));
        }

        let mut defs: Vec<String> = self
            .columns
            .iter()
            .zip(&self.types)
            .map(|(column, ty)| format!("{column} {ty}"))
            .collect();
        if !self.primary_key.is_empty() {
            defs.push(format!("PRIMARY KEY ({})", self.primary_key.join(", ")));
        }

        let mut buf = SqlBuffer::new();
        buf.clause("", &self.prefixes, " ");
        buf.word(&format!("CREATE TABLE {} ( {} )", self.table, defs.join(", ")));
        buf.clause("", &self.suffixes, " ");
        buf.finish()
    }
}

/// CREATE TABLE statement builder.
///
/// Columns and types are paired by position.
#[derive(Debug, Clone, Default)]
pub struct CreateBuilder {
    data: Arc<CreateData>,
    settings: Settings,
}

impl_statement!(CreateBuilder, CreateData);

impl CreateBuilder {
    /// `CREATE TABLE <table>`
    pub fn new(table: impl Into<String>) -> Self {
        Self::with_settings(Settings::default(), table)
    }

    pub(crate) fn with_settings(settings: Settings, table: impl Into<String>) -> Self {
        let data = CreateData {
            table: table.into(),
            ..CreateData::default()
        };
        Self {
            data: Arc::new(data),
            settings,
        }
    }

    /// Append column names.
    pub fn columns(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.data_mut()
            .columns
            .extend(columns.into_iter().map(Into::into));
        self
    }

    /// Append column types, matched to columns by position.
    pub fn types(mut self, types: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.data_mut()
            .types
            .extend(types.into_iter().map(Into::into));
        self
    }

    /// Replace columns and types with the entries of a column → type map,
    /// in key order.
    pub fn set_map<K, V>(mut self, map: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let sorted: BTreeMap<String, String> = map
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let data = self.data_mut();
        data.columns = sorted.keys().cloned().collect();
        data.types = sorted.into_values().collect();
        self
    }

    /// Set the PRIMARY KEY columns.
    pub fn primary_key(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.data_mut().primary_key = columns.into_iter().map(Into::into).collect();
        self
    }
}
