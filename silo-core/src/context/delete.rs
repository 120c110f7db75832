use crate::{Criterion, DeleteOptions};
use std::borrow::Cow;

/// Immutable description of a delete statement.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteContext {
    pub table: Cow<'static, str>,
    pub where_clause: Vec<Criterion>,
    pub options: DeleteOptions,
}

impl DeleteContext {
    pub fn new(table: impl Into<Cow<'static, str>>) -> Self {
        Self {
            table: table.into(),
            where_clause: Vec::new(),
            options: DeleteOptions::default(),
        }
    }

    pub fn filter(mut self, criterion: Criterion) -> Self {
        self.where_clause.push(criterion);
        self
    }

    pub fn options(mut self, f: impl FnOnce(DeleteOptions) -> DeleteOptions) -> Self {
        self.options = f(self.options);
        self
    }
}
