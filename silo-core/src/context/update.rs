use crate::{ColumnExpr, Criterion, IntoOperand, Operand, UpdateOptions};
use std::borrow::Cow;

/// Immutable description of an update statement.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateContext {
    pub table: Cow<'static, str>,
    pub assignments: Vec<(ColumnExpr, Operand)>,
    pub where_clause: Vec<Criterion>,
    pub options: UpdateOptions,
}

impl UpdateContext {
    pub fn new(table: impl Into<Cow<'static, str>>) -> Self {
        Self {
            table: table.into(),
            assignments: Vec::new(),
            where_clause: Vec::new(),
            options: UpdateOptions::default(),
        }
    }

    pub fn set(mut self, column: ColumnExpr, value: impl IntoOperand) -> Self {
        self.assignments.push((column, value.into_operand()));
        self
    }

    pub fn filter(mut self, criterion: Criterion) -> Self {
        self.where_clause.push(criterion);
        self
    }

    pub fn options(mut self, f: impl FnOnce(UpdateOptions) -> UpdateOptions) -> Self {
        self.options = f(self.options);
        self
    }
}
