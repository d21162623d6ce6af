//! UPDATE statement builder.

use crate::buffer::SqlBuffer;
use crate::error::{QbError, QbResult};
use crate::fragment::{Fragment, SetValue};
use crate::qb::select::SelectBuilder;
use crate::qb::traits::{impl_statement, BuiltSql, Settings};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub(crate) struct UpdateData {
    prefixes: Vec<Fragment>,
    table: String,
    set_clauses: Vec<(String, SetValue)>,
    from: Option<Fragment>,
    where_parts: Vec<Fragment>,
    order_bys: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    suffixes: Vec<Fragment>,
}

impl UpdateData {
    pub(crate) fn render_raw(&self) -> QbResult<BuiltSql> {
        if self.table.is_empty() {
            return Err(QbError::validation("update statements must specify a table"));
        }
        if self.set_clauses.is_empty() {
            return Err(QbError::validation(
                "update statements must have at least one Set clause",
            ));
        }

        let mut buf = SqlBuffer::new();
        buf.clause("", &self.prefixes, " ");
        buf.word(&format!("UPDATE {} SET ", self.table));
        for (i, (column, value)) in self.set_clauses.iter().enumerate() {
            if i > 0 {
                buf.push_str(", ");
            }
            buf.push_str(column);
            buf.push_str(" = ");
            value.write_to(&mut buf);
        }

        if let Some(from) = &self.from {
            buf.clause("FROM", [from], "");
        }
        buf.clause("WHERE", &self.where_parts, " AND ");

        if !self.order_bys.is_empty() {
            buf.word(&format!("ORDER BY {}", self.order_bys.join(", ")));
        }
        if let Some(limit) = self.limit {
            buf.word(&format!("LIMIT {limit}"));
        }
        if let Some(offset) = self.offset {
            buf.word(&format!("OFFSET {offset}"));
        }

        buf.clause("", &self.suffixes, " ");
        buf.finish()
    }
}

/// UPDATE statement builder.
#[derive(Debug, Clone, Default)]
pub struct UpdateBuilder {
    data: Arc<UpdateData>,
    settings: Settings,
}

impl_statement!(UpdateBuilder, UpdateData);

impl UpdateBuilder {
    /// `UPDATE <table>`
    pub fn new(table: impl Into<String>) -> Self {
        Self::with_settings(Settings::default(), Vec::new(), table)
    }

    pub(crate) fn with_settings(
        settings: Settings,
        where_parts: Vec<Fragment>,
        table: impl Into<String>,
    ) -> Self {
        let data = UpdateData {
            table: table.into(),
            where_parts,
            ..UpdateData::default()
        };
        Self {
            data: Arc::new(data),
            settings,
        }
    }

    /// Set the target table.
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.data_mut().table = table.into();
        self
    }

    /// Add `column = value`. A nested SELECT value is parenthesized.
    pub fn set(mut self, column: impl Into<String>, value: impl Into<SetValue>) -> Self {
        self.data_mut()
            .set_clauses
            .push((column.into(), value.into()));
        self
    }

    /// Add one assignment per map entry, in key order.
    pub fn set_map<K, V>(mut self, map: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<SetValue>,
    {
        let sorted: BTreeMap<String, SetValue> = map
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.data_mut().set_clauses.extend(sorted);
        self
    }

    /// `FROM <table>`
    pub fn from(mut self, table: impl Into<String>) -> Self {
        self.data_mut().from = Some(Fragment::from(table.into()));
        self
    }

    /// `FROM (<select>) AS <alias>`
    pub fn from_select(mut self, from: SelectBuilder, alias: impl Into<String>) -> Self {
        self.data_mut().from = Some(Fragment::from(from).alias(alias));
        self
    }

    /// Add a WHERE predicate; blank parts are ignored.
    pub fn where_(mut self, pred: impl Into<Fragment>) -> Self {
        let pred = pred.into();
        if !pred.is_blank() {
            self.data_mut().where_parts.push(pred);
        }
        self
    }

    pub fn order_by(mut self, order_bys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.data_mut()
            .order_bys
            .extend(order_bys.into_iter().map(Into::into));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.data_mut().limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.data_mut().offset = Some(offset);
        self
    }
}
