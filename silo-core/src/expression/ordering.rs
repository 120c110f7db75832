use crate::ColumnExpr;
use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// What an ORDER BY item refers to: a column, or a projection alias (the only
/// way to order the result of a set operation across heterogeneous selects).
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Column(ColumnExpr),
    Alias(Cow<'static, str>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortItem {
    pub key: SortKey,
    pub order: SortOrder,
}

/// Order by a projection alias, ascending.
pub fn asc(alias: impl Into<Cow<'static, str>>) -> SortItem {
    SortItem {
        key: SortKey::Alias(alias.into()),
        order: SortOrder::Asc,
    }
}

/// Order by a projection alias, descending.
pub fn desc(alias: impl Into<Cow<'static, str>>) -> SortItem {
    SortItem {
        key: SortKey::Alias(alias.into()),
        order: SortOrder::Desc,
    }
}

impl From<ColumnExpr> for SortItem {
    fn from(column: ColumnExpr) -> Self {
        column.asc()
    }
}

impl From<&ColumnExpr> for SortItem {
    fn from(column: &ColumnExpr) -> Self {
        column.asc()
    }
}
