//! INSERT / REPLACE / UPSERT statement builder.

use crate::buffer::SqlBuffer;
use crate::error::{QbError, QbResult};
use crate::fragment::{Fragment, SetValue};
use crate::qb::select::SelectBuilder;
use crate::qb::traits::{impl_statement, BuiltSql, Settings};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Leading keyword of an insert-like statement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InsertVerb {
    #[default]
    Insert,
    Replace,
    /// YQL `UPSERT INTO`.
    Upsert,
}

impl InsertVerb {
    pub fn as_str(self) -> &'static str {
        match self {
            InsertVerb::Insert => "INSERT",
            InsertVerb::Replace => "REPLACE",
            InsertVerb::Upsert => "UPSERT",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct InsertData {
    prefixes: Vec<Fragment>,
    verb: InsertVerb,
    options: Vec<String>,
    into: String,
    columns: Vec<String>,
    values: Vec<Vec<SetValue>>,
    select: Option<Fragment>,
    suffixes: Vec<Fragment>,
}

impl InsertData {
    pub(crate) fn render_raw(&self) -> QbResult<BuiltSql> {
        if self.into.is_empty() {
            return Err(QbError::validation("insert statements must specify a table"));
        }
        if self.values.is_empty() && self.select.is_none() {
            return Err(QbError::validation(
                "insert statements must have at least one set of values or select clause",
            ));
        }

        let mut buf = SqlBuffer::new();
        buf.clause("", &self.prefixes, " ");

        let mut head = String::from(self.verb.as_str());
        for option in &self.options {
            head.push(' ');
            head.push_str(option);
        }
        head.push_str(" INTO ");
        head.push_str(&self.into);
        buf.word(&head);

        if !self.columns.is_empty() {
            buf.word(&format!("({})", self.columns.join(",")));
        }

        match &self.select {
            Some(select) => buf.clause("", [select], ""),
            None => {
                buf.word("VALUES ");
                for (i, row) in self.values.iter().enumerate() {
                    if i > 0 {
                        buf.push_str(",");
                    }
                    buf.push_str("(");
                    for (j, value) in row.iter().enumerate() {
                        if j > 0 {
                            buf.push_str(",");
                        }
                        value.write_to(&mut buf);
                    }
                    buf.push_str(")");
                }
            }
        }

        buf.clause("", &self.suffixes, " ");
        buf.finish()
    }
}

/// INSERT statement builder.
///
/// # Example
/// ```ignore
/// let built = yqb::insert("users")
///     .columns(["id", "name"])
///     .values([SetValue::from(1), SetValue::from("alice")])
///     .to_sql()?;
/// // INSERT INTO users (id,name) VALUES (?,?)
/// ```
#[derive(Debug, Clone, Default)]
pub struct InsertBuilder {
    data: Arc<InsertData>,
    settings: Settings,
}

impl_statement!(InsertBuilder, InsertData);

impl InsertBuilder {
    /// `INSERT INTO <table>`
    pub fn new(table: impl Into<String>) -> Self {
        Self::with_settings(Settings::default(), InsertVerb::Insert, table)
    }

    /// `REPLACE INTO <table>`
    pub fn replace(table: impl Into<String>) -> Self {
        Self::with_settings(Settings::default(), InsertVerb::Replace, table)
    }

    /// `UPSERT INTO <table>`
    pub fn upsert(table: impl Into<String>) -> Self {
        Self::with_settings(Settings::default(), InsertVerb::Upsert, table)
    }

    pub(crate) fn with_settings(
        settings: Settings,
        verb: InsertVerb,
        table: impl Into<String>,
    ) -> Self {
        let data = InsertData {
            verb,
            into: table.into(),
            ..InsertData::default()
        };
        Self {
            data: Arc::new(data),
            settings,
        }
    }

    /// Set the target table.
    pub fn into_table(mut self, table: impl Into<String>) -> Self {
        self.data_mut().into = table.into();
        self
    }

    /// Add keywords written between the verb and `INTO`.
    pub fn options(mut self, options: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.data_mut()
            .options
            .extend(options.into_iter().map(Into::into));
        self
    }

    /// Append target columns.
    pub fn columns(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.data_mut()
            .columns
            .extend(columns.into_iter().map(Into::into));
        self
    }

    /// Append one row of values.
    pub fn values(mut self, row: impl IntoIterator<Item = impl Into<SetValue>>) -> Self {
        let row = row.into_iter().map(Into::into).collect();
        self.data_mut().values.push(row);
        self
    }

    /// Set columns and a single row from a map; columns are written in key
    /// order.
    pub fn set_map<K, V>(mut self, map: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<SetValue>,
    {
        let sorted: BTreeMap<String, SetValue> = map
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let data = self.data_mut();
        data.columns = sorted.keys().cloned().collect();
        data.values = vec![sorted.into_values().collect()];
        self
    }

    /// Insert the rows of a SELECT instead of VALUES.
    pub fn select(mut self, select: SelectBuilder) -> Self {
        self.data_mut().select = Some(select.into());
        self
    }
}
