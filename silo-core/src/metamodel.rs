use crate::{ColumnExpr, Criterion, Error, Projection, Result, RowLabeled, TableProjection, Value};
use std::borrow::Cow;

/// How the primary key of an entity gets its value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum IdStrategy {
    /// The application assigns ids itself.
    #[default]
    None,
    /// The database assigns the id on insert; it is read back from the
    /// generated keys of the statement.
    AutoIncrement,
    /// The id is fetched from a database sequence before the insert.
    Sequence {
        name: Cow<'static, str>,
        start_with: i64,
        increment_by: i64,
    },
}

/// Description of a single persistent column.
#[derive(Default, Debug, Clone)]
pub struct ColumnDef {
    pub name: Cow<'static, str>,
    /// Prototype value carrying the semantic type of the column.
    pub value: Value,
    pub nullable: bool,
    pub primary_key: bool,
    pub unique: bool,
    /// Optimistic lock counter, stamped on insert and checked on update/delete.
    pub version: bool,
    /// Stamped with the configured clock on insert.
    pub created_at: bool,
    /// Stamped with the configured clock on insert and on every update.
    pub updated_at: bool,
}

impl ColumnDef {
    pub fn new(name: &'static str, prototype: Value) -> Self {
        Self {
            name: Cow::Borrowed(name),
            value: prototype,
            ..Default::default()
        }
    }

    pub fn expr(&self, table: impl Into<Cow<'static, str>>) -> ColumnExpr {
        ColumnExpr::new(table, self.name.clone(), self.value.as_null())
    }
}

/// Runtime description of a persistent entity type.
///
/// One instance per entity type, immutable and freely shared across
/// concurrent callers. Implementations are hand written or generated; the
/// runners only rely on this contract.
pub trait EntityMetamodel: Send + Sync {
    type Entity: Clone + Send + Sync + 'static;

    fn table_name(&self) -> &str;
    /// Column definitions in declaration order; `to_row` must align with it.
    fn columns(&self) -> &[ColumnDef];
    fn id_strategy(&self) -> IdStrategy {
        IdStrategy::None
    }

    /// The entity serialized into values, aligned with `columns()`.
    fn to_row(&self, entity: &Self::Entity) -> Vec<Value>;
    fn from_row(&self, row: &RowLabeled) -> Result<Self::Entity>;
    /// A copy of the entity with one column replaced. Used by the runner
    /// hooks for id assignment, version bumps and timestamp stamping; the
    /// caller's entity is never mutated in place.
    fn with_value(&self, entity: &Self::Entity, column: &str, value: Value) -> Result<Self::Entity>;

    fn column_def(&self, name: &str) -> Option<&ColumnDef> {
        self.columns().iter().find(|c| c.name == name)
    }

    fn column(&self, name: &str) -> Result<ColumnExpr> {
        let table: Cow<'static, str> = Cow::Owned(self.table_name().to_owned());
        self.column_def(name)
            .map(|c| c.expr(table))
            .ok_or_else(|| {
                Error::msg(format!(
                    "no column `{}` on table `{}`",
                    name,
                    self.table_name()
                ))
            })
    }

    fn id_columns(&self) -> Vec<&ColumnDef> {
        self.columns().iter().filter(|c| c.primary_key).collect()
    }

    fn version_column(&self) -> Option<&ColumnDef> {
        self.columns().iter().find(|c| c.version)
    }

    fn value_of(&self, entity: &Self::Entity, column: &str) -> Option<Value> {
        let index = self.columns().iter().position(|c| c.name == column)?;
        self.to_row(entity).into_iter().nth(index)
    }

    /// Where declaration matching this entity's primary key.
    fn id_criteria(&self, entity: &Self::Entity) -> Vec<Criterion> {
        let row = self.to_row(entity);
        let table: Cow<'static, str> = Cow::Owned(self.table_name().to_owned());
        self.columns()
            .iter()
            .zip(row)
            .filter(|(c, _)| c.primary_key)
            .map(|(c, v)| c.expr(table.clone()).eq(v))
            .collect()
    }

    /// All columns of this entity, in declaration order.
    fn projection(&self) -> Projection {
        let table: Cow<'static, str> = Cow::Owned(self.table_name().to_owned());
        Projection::Table(TableProjection {
            table: table.clone(),
            columns: self.columns().iter().map(|c| c.expr(table.clone())).collect(),
        })
    }
}
