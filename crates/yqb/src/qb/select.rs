//! SELECT statement builder.

use crate::buffer::SqlBuffer;
use crate::error::{QbError, QbResult};
use crate::fragment::{Expr, Fragment};
use crate::qb::traits::{impl_statement, BuiltSql, Settings};
use std::sync::Arc;

/// Mode of a YQL `FLATTEN` hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlattenMode {
    /// `FLATTEN BY`
    By,
    /// `FLATTEN LIST BY`
    ListBy,
    /// `FLATTEN DICT BY`
    DictBy,
    /// `FLATTEN OPTIONAL BY`
    OptionalBy,
}

impl FlattenMode {
    pub fn as_str(self) -> &'static str {
        match self {
            FlattenMode::By => "FLATTEN BY",
            FlattenMode::ListBy => "FLATTEN LIST BY",
            FlattenMode::DictBy => "FLATTEN DICT BY",
            FlattenMode::OptionalBy => "FLATTEN OPTIONAL BY",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct SelectData {
    prefixes: Vec<Fragment>,
    options: Vec<String>,
    columns: Vec<Fragment>,
    from: Option<Fragment>,
    index: Option<String>,
    hints: Vec<Fragment>,
    flatten: Option<(FlattenMode, String)>,
    joins: Vec<Fragment>,
    where_parts: Vec<Fragment>,
    group_bys: Vec<String>,
    having_parts: Vec<Fragment>,
    assume_order: bool,
    order_bys: Vec<Fragment>,
    limit: Option<u64>,
    offset: Option<u64>,
    suffixes: Vec<Fragment>,
}

impl SelectData {
    pub(crate) fn render_raw(&self) -> QbResult<BuiltSql> {
        let mut buf = SqlBuffer::new();
        buf.clause("", &self.prefixes, " ");

        let mut head = String::from("SELECT");
        for option in &self.options {
            head.push(' ');
            head.push_str(option);
        }
        buf.word(&head);
        buf.push_str(" ");
        // Columns that render to nothing do not count.
        if !buf.push_joined(&self.columns, ", ") {
            buf.fail(QbError::validation(
                "select statements must have at least one result column",
            ));
        }

        if let Some(from) = &self.from {
            buf.clause("FROM", [from], "");
        }
        if let Some(index) = &self.index {
            buf.word(&format!("VIEW {index}"));
        }
        // A single hint is written bare; several use the parenthesized form.
        if self.hints.len() > 1 {
            buf.group("WITH", &self.hints, ", ");
        } else {
            buf.clause("WITH", &self.hints, "");
        }
        if let Some((mode, column)) = &self.flatten {
            buf.word(&format!("{} {column}", mode.as_str()));
        }

        buf.clause("", &self.joins, " ");
        buf.clause("WHERE", &self.where_parts, " AND ");

        if !self.group_bys.is_empty() {
            buf.word(&format!("GROUP BY {}", self.group_bys.join(", ")));
        }
        buf.clause("HAVING", &self.having_parts, " AND ");

        let order_keyword = if self.assume_order {
            "ASSUME ORDER BY"
        } else {
            "ORDER BY"
        };
        buf.clause(order_keyword, &self.order_bys, ", ");

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

/// SELECT statement builder.
///
/// Every method returns a new builder; the receiver's data is shared until
/// it is modified, so earlier snapshots stay valid.
#[derive(Debug, Clone, Default)]
pub struct SelectBuilder {
    data: Arc<SelectData>,
    settings: Settings,
}

impl_statement!(SelectBuilder, SelectData);

impl SelectBuilder {
    /// Create a SELECT over the given result columns.
    pub fn new(columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::default().columns(columns)
    }

    pub(crate) fn with_settings(settings: Settings, where_parts: Vec<Fragment>) -> Self {
        let data = SelectData {
            where_parts,
            ..SelectData::default()
        };
        Self {
            data: Arc::new(data),
            settings,
        }
    }

    // ==================== Options ====================

    /// Add `DISTINCT`.
    pub fn distinct(self) -> Self {
        self.options(["DISTINCT"])
    }

    /// Add keywords written between `SELECT` and the column list.
    pub fn options(mut self, options: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.data_mut()
            .options
            .extend(options.into_iter().map(Into::into));
        self
    }

    // ==================== Columns ====================

    /// Append result columns.
    pub fn columns(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.data_mut()
            .columns
            .extend(columns.into_iter().map(|c| Fragment::from(c.into())));
        self
    }

    /// Append one result column given as any fragment.
    ///
    /// # Example
    /// ```ignore
    /// select(["a"]).column(Expr::new("IF(d IN (?,?), 1, 0) AS stat", [1, 2]))
    /// ```
    pub fn column(mut self, column: impl Into<Fragment>) -> Self {
        self.data_mut().columns.push(column.into());
        self
    }

    /// Drop every result column.
    pub fn remove_columns(mut self) -> Self {
        self.data_mut().columns.clear();
        self
    }

    // ==================== FROM ====================

    /// Set the FROM table.
    pub fn from(mut self, table: impl Into<String>) -> Self {
        self.data_mut().from = Some(Fragment::from(table.into()));
        self
    }

    /// Select FROM a sub-select: `FROM (<select>) AS <alias>`.
    pub fn from_select(mut self, from: SelectBuilder, alias: impl Into<String>) -> Self {
        self.data_mut().from = Some(Fragment::from(from).alias(alias));
        self
    }

    /// Read through a secondary index: `VIEW <index>`.
    pub fn index(mut self, index: impl Into<String>) -> Self {
        self.data_mut().index = Some(index.into());
        self
    }

    /// Add a table hint written after `WITH`.
    pub fn with(mut self, hint: impl Into<Fragment>) -> Self {
        let hint = hint.into();
        if !hint.is_blank() {
            self.data_mut().hints.push(hint);
        }
        self
    }

    /// Set the FLATTEN hint.
    pub fn flatten(mut self, mode: FlattenMode, column: impl Into<String>) -> Self {
        self.data_mut().flatten = Some((mode, column.into()));
        self
    }

    /// `FLATTEN OPTIONAL BY <column>`
    pub fn flatten_optional(self, column: impl Into<String>) -> Self {
        self.flatten(FlattenMode::OptionalBy, column)
    }

    // ==================== JOIN ====================

    /// Add a full join clause, e.g. a nested select with its own prefix.
    pub fn join_clause(mut self, clause: impl Into<Fragment>) -> Self {
        self.data_mut().joins.push(clause.into());
        self
    }

    /// Add `JOIN <join>`.
    pub fn join(self, join: impl Into<Expr>) -> Self {
        self.join_clause(join.into().prefixed("JOIN"))
    }

    /// Add `LEFT JOIN <join>`.
    pub fn left_join(self, join: impl Into<Expr>) -> Self {
        self.join_clause(join.into().prefixed("LEFT JOIN"))
    }

    /// Add `RIGHT JOIN <join>`.
    pub fn right_join(self, join: impl Into<Expr>) -> Self {
        self.join_clause(join.into().prefixed("RIGHT JOIN"))
    }

    /// Add `INNER JOIN <join>`.
    pub fn inner_join(self, join: impl Into<Expr>) -> Self {
        self.join_clause(join.into().prefixed("INNER JOIN"))
    }

    /// Add `CROSS JOIN <join>`.
    pub fn cross_join(self, join: impl Into<Expr>) -> Self {
        self.join_clause(join.into().prefixed("CROSS JOIN"))
    }

    // ==================== WHERE / GROUP BY / HAVING ====================

    /// Add a WHERE predicate. Parts are joined with AND; blank parts are
    /// ignored.
    pub fn where_(mut self, pred: impl Into<Fragment>) -> Self {
        let pred = pred.into();
        if !pred.is_blank() {
            self.data_mut().where_parts.push(pred);
        }
        self
    }

    /// Add GROUP BY expressions.
    pub fn group_by(mut self, group_bys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.data_mut()
            .group_bys
            .extend(group_bys.into_iter().map(Into::into));
        self
    }

    /// Add a HAVING predicate.
    pub fn having(mut self, pred: impl Into<Fragment>) -> Self {
        let pred = pred.into();
        if !pred.is_blank() {
            self.data_mut().having_parts.push(pred);
        }
        self
    }

    // ==================== ORDER BY / LIMIT / OFFSET ====================

    /// Add ORDER BY expressions.
    pub fn order_by(mut self, order_bys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.data_mut()
            .order_bys
            .extend(order_bys.into_iter().map(|o| Fragment::from(o.into())));
        self
    }

    /// Add an ORDER BY expression with arguments.
    pub fn order_by_clause(mut self, clause: impl Into<Fragment>) -> Self {
        self.data_mut().order_bys.push(clause.into());
        self
    }

    /// Write `ASSUME ORDER BY` instead of `ORDER BY`.
    pub fn assume_order_by(mut self) -> Self {
        self.data_mut().assume_order = true;
        self
    }

    /// Set LIMIT.
    pub fn limit(mut self, limit: u64) -> Self {
        self.data_mut().limit = Some(limit);
        self
    }

    /// Remove LIMIT.
    pub fn remove_limit(mut self) -> Self {
        self.data_mut().limit = None;
        self
    }

    /// Set OFFSET.
    pub fn offset(mut self, offset: u64) -> Self {
        self.data_mut().offset = Some(offset);
        self
    }

    /// Remove OFFSET.
    pub fn remove_offset(mut self) -> Self {
        self.data_mut().offset = None;
        self
    }

    /// Pagination helper.
    ///
    /// `page` is 1-based (clamped to >= 1).
    /// `per_page` is clamped to >= 1.
    pub fn paginate(self, page: u64, per_page: u64) -> Self {
        let page = page.max(1);
        let size = per_page.max(1);
        self.limit(size).offset((page - 1) * size)
    }
}
