//! DROP TABLE statement builder.

use crate::buffer::SqlBuffer;
use crate::error::{QbError, QbResult};
use crate::fragment::Fragment;
use crate::qb::traits::{impl_statement, BuiltSql, Settings};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub(crate) struct DropData {
    prefixes: Vec<Fragment>,
    table: String,
    suffixes: Vec<Fragment>,
}

impl DropData {
    pub(crate) fn render_raw(&self) -> QbResult<BuiltSql> {
        if self.table.is_empty() {
            return Err(QbError::validation("drop statements must specify a table"));
        }

        let mut buf = SqlBuffer::new();
        buf.clause("", &self.prefixes, " ");
        buf.word(&format!("DROP TABLE {}", self.table));
        buf.clause("", &self.suffixes, " ");
        buf.finish()
    }
}

/// DROP TABLE statement builder.
#[derive(Debug, Clone, Default)]
pub struct DropBuilder {
    data: Arc<DropData>,
    settings: Settings,
}

impl_statement!(DropBuilder, DropData);

impl DropBuilder {
    /// `DROP TABLE <table>`
    pub fn new(table: impl Into<String>) -> Self {
        Self::with_settings(Settings::default(), table)
    }

    pub(crate) fn with_settings(settings: Settings, table: impl Into<String>) -> Self {
        let data = DropData {
            table: table.into(),
            ..DropData::default()
        };
        Self {
            data: Arc::new(data),
            settings,
        }
    }
}
