use crate::{ColumnExpr, InsertOptions, Value};
use std::borrow::Cow;

/// Immutable description of a (possibly multi-row) insert.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertContext {
    pub table: Cow<'static, str>,
    pub columns: Vec<ColumnExpr>,
    /// One value list per row, aligned with `columns`.
    pub rows: Vec<Vec<Value>>,
    pub options: InsertOptions,
}

impl InsertContext {
    pub fn new(table: impl Into<Cow<'static, str>>, columns: Vec<ColumnExpr>) -> Self {
        Self {
            table: table.into(),
            columns,
            rows: Vec::new(),
            options: InsertOptions::default(),
        }
    }

    pub fn row(mut self, values: Vec<Value>) -> Self {
        self.rows.push(values);
        self
    }

    pub fn options(mut self, f: impl FnOnce(InsertOptions) -> InsertOptions) -> Self {
        self.options = f(self.options);
        self
    }
}
