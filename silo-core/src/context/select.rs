use crate::{
    ColumnExpr, Criterion, EntityMetamodel, Projection, SelectOptions, SortItem,
};
use std::borrow::Cow;

/// How two selects are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOperator {
    Union,
    UnionAll,
    Except,
    Intersect,
}

impl SetOperator {
    pub fn keyword(&self) -> &'static str {
        match self {
            SetOperator::Union => "UNION",
            SetOperator::UnionAll => "UNION ALL",
            SetOperator::Except => "EXCEPT",
            SetOperator::Intersect => "INTERSECT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub kind: JoinKind,
    pub table: Cow<'static, str>,
    pub on: Vec<Criterion>,
}

/// Immutable description of one select statement.
///
/// Every modifier consumes the context and returns a new value; a context is
/// fully determined before it reaches a statement builder.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectContext {
    pub table: Cow<'static, str>,
    pub projection: Projection,
    pub joins: Vec<Join>,
    pub where_clause: Vec<Criterion>,
    pub group_by: Vec<ColumnExpr>,
    pub having: Vec<Criterion>,
    pub order_by: Vec<SortItem>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub distinct: bool,
    pub options: SelectOptions,
}

impl SelectContext {
    pub fn from_meta<M: EntityMetamodel>(meta: &M) -> Self {
        Self {
            table: Cow::Owned(meta.table_name().to_owned()),
            projection: meta.projection(),
            joins: Vec::new(),
            where_clause: Vec::new(),
            group_by: Vec::new(),
            having: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
            distinct: false,
            options: SelectOptions::default(),
        }
    }

    /// Replace the projection with an explicit column list.
    pub fn columns(mut self, columns: impl IntoIterator<Item = ColumnExpr>) -> Self {
        self.projection = Projection::Expressions(columns.into_iter().collect());
        self
    }

    /// Add a criterion; criteria accumulate with AND.
    pub fn filter(mut self, criterion: Criterion) -> Self {
        self.where_clause.push(criterion);
        self
    }

    pub fn join(mut self, kind: JoinKind, table: impl Into<Cow<'static, str>>, on: Vec<Criterion>) -> Self {
        self.joins.push(Join {
            kind,
            table: table.into(),
            on,
        });
        self
    }

    pub fn group_by(mut self, columns: impl IntoIterator<Item = ColumnExpr>) -> Self {
        self.group_by.extend(columns);
        self
    }

    pub fn having(mut self, criterion: Criterion) -> Self {
        self.having.push(criterion);
        self
    }

    pub fn order_by(mut self, item: impl Into<SortItem>) -> Self {
        self.order_by.push(item.into());
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn options(mut self, f: impl FnOnce(SelectOptions) -> SelectOptions) -> Self {
        self.options = f(self.options);
        self
    }

    pub fn union(self, other: impl Into<SelectNode>) -> SelectNode {
        SelectNode::from(self).union(other)
    }

    pub fn union_all(self, other: impl Into<SelectNode>) -> SelectNode {
        SelectNode::from(self).union_all(other)
    }

    pub fn except(self, other: impl Into<SelectNode>) -> SelectNode {
        SelectNode::from(self).except(other)
    }

    pub fn intersect(self, other: impl Into<SelectNode>) -> SelectNode {
        SelectNode::from(self).intersect(other)
    }
}

/// A select query: a single select, or a binary tree of selects combined by
/// set operators. Leaves keep their own where declarations and options.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectNode {
    Select(SelectContext),
    SetOperation(Box<SetOperationContext>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetOperationContext {
    pub operator: SetOperator,
    pub left: SelectNode,
    pub right: SelectNode,
    /// Applied to the combined result; keys usually refer to projection
    /// aliases or columns shared by both sides.
    pub order_by: Vec<SortItem>,
    pub options: SelectOptions,
}

impl SelectNode {
    fn combine(self, operator: SetOperator, other: impl Into<SelectNode>) -> SelectNode {
        SelectNode::SetOperation(Box::new(SetOperationContext {
            operator,
            left: self,
            right: other.into(),
            order_by: Vec::new(),
            options: SelectOptions::default(),
        }))
    }

    pub fn union(self, other: impl Into<SelectNode>) -> SelectNode {
        self.combine(SetOperator::Union, other)
    }

    pub fn union_all(self, other: impl Into<SelectNode>) -> SelectNode {
        self.combine(SetOperator::UnionAll, other)
    }

    pub fn except(self, other: impl Into<SelectNode>) -> SelectNode {
        self.combine(SetOperator::Except, other)
    }

    pub fn intersect(self, other: impl Into<SelectNode>) -> SelectNode {
        self.combine(SetOperator::Intersect, other)
    }

    pub fn order_by(self, item: impl Into<SortItem>) -> SelectNode {
        match self {
            SelectNode::Select(ctx) => SelectNode::Select(ctx.order_by(item)),
            SelectNode::SetOperation(mut set) => {
                set.order_by.push(item.into());
                SelectNode::SetOperation(set)
            }
        }
    }

    pub fn options(self, f: impl FnOnce(SelectOptions) -> SelectOptions) -> SelectNode {
        match self {
            SelectNode::Select(ctx) => SelectNode::Select(ctx.options(f)),
            SelectNode::SetOperation(mut set) => {
                set.options = f(set.options);
                SelectNode::SetOperation(set)
            }
        }
    }

    /// The options governing execution (fetch size, timeout) of this query.
    pub fn exec_options(&self) -> &SelectOptions {
        match self {
            SelectNode::Select(ctx) => &ctx.options,
            SelectNode::SetOperation(set) => &set.options,
        }
    }

    /// The projection of the leftmost leaf, which defines the shape and the
    /// column order of every row the query produces.
    pub fn projection(&self) -> &Projection {
        match self {
            SelectNode::Select(ctx) => &ctx.projection,
            SelectNode::SetOperation(set) => set.left.projection(),
        }
    }
}

impl From<SelectContext> for SelectNode {
    fn from(ctx: SelectContext) -> Self {
        SelectNode::Select(ctx)
    }
}

/// Start a select over all columns of an entity.
pub fn select_from<M: EntityMetamodel>(meta: &M) -> SelectContext {
    SelectContext::from_meta(meta)
}
