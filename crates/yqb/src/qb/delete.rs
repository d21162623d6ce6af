//! DELETE statement builder.

use crate::buffer::SqlBuffer;
use crate::error::{QbError, QbResult};
use crate::fragment::Fragment;
use crate::qb::traits::{impl_statement, BuiltSql, Settings};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub(crate) struct DeleteData {
    prefixes: Vec<Fragment>,
    from: String,
    using: Option<String>,
    where_parts: Vec<Fragment>,
    order_bys: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    suffixes: Vec<Fragment>,
}

impl DeleteData {
    pub(crate) fn render_raw(&self) -> QbResult<BuiltSql> {
        if self.from.is_empty() {
            return Err(QbError::validation(
                "delete statements must specify a From table",
            ));
        }

        let mut buf = SqlBuffer::new();
        buf.clause("", &self.prefixes, " ");
        buf.word(&format!("DELETE FROM {}", self.from));
        if let Some(using) = &self.using {
            buf.word(&format!("USING {using}"));
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

/// DELETE statement builder.
#[derive(Debug, Clone, Default)]
pub struct DeleteBuilder {
    data: Arc<DeleteData>,
    settings: Settings,
}

impl_statement!(DeleteBuilder, DeleteData);

impl DeleteBuilder {
    /// `DELETE FROM <table>`
    pub fn new(table: impl Into<String>) -> Self {
        Self::with_settings(Settings::default(), Vec::new(), table)
    }

    pub(crate) fn with_settings(
        settings: Settings,
        where_parts: Vec<Fragment>,
        table: impl Into<String>,
    ) -> Self {
        let data = DeleteData {
            from: table.into(),
            where_parts,
            ..DeleteData::default()
        };
        Self {
            data: Arc::new(data),
            settings,
        }
    }

    /// Set the target table.
    pub fn from(mut self, table: impl Into<String>) -> Self {
        self.data_mut().from = table.into();
        self
    }

    /// `USING <table>`
    pub fn using(mut self, table: impl Into<String>) -> Self {
        self.data_mut().using = Some(table.into());
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
