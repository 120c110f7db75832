use crate::{ColumnExpr, InsertOptions, Value};
use std::borrow::Cow;

/// What happens when an upsert hits an existing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertMode {
    /// Update the conflicting row from the attempted insert values.
    Update,
    /// Keep the existing row untouched.
    Ignore,
}

/// Immutable description of an insert-or-update statement.
///
/// The conflict key is the primary key; the version column is never part of
/// the key but is included in the update set, so a conflicting upsert still
/// moves the optimistic lock counter.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertContext {
    pub table: Cow<'static, str>,
    pub columns: Vec<ColumnExpr>,
    pub rows: Vec<Vec<Value>>,
    pub conflict_keys: Vec<ColumnExpr>,
    /// Columns rewritten from the attempted insert row on conflict.
    pub update_columns: Vec<ColumnExpr>,
    pub mode: UpsertMode,
    pub options: InsertOptions,
}
