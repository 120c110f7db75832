use crate::{DatabaseConfig, EntityMetamodel, Error, FromValue, Result, RowLabeled, SelectNode, Statement};

/// Builds a select statement from a query node and maps result rows into the
/// shapes the facades expose: entity, single column, pair, triple or the raw
/// labeled row.
pub struct SelectRunner<'a> {
    node: &'a SelectNode,
}

impl<'a> SelectRunner<'a> {
    pub fn new(node: &'a SelectNode) -> Self {
        Self { node }
    }

    pub fn statement(&self, config: &DatabaseConfig) -> Result<Statement> {
        let statement = config.dialect.build_select(self.node)?;
        log::debug!("select: {}", statement);
        Ok(statement)
    }

    pub fn dry_run(&self, config: &DatabaseConfig) -> Result<String> {
        self.statement(config)?.render(config.dialect.as_ref())
    }
}

pub fn map_entity<M: EntityMetamodel>(meta: &M, row: &RowLabeled) -> Result<M::Entity> {
    meta.from_row(row)
}

fn column_at<'r>(row: &'r RowLabeled, index: usize, arity: &str) -> Result<&'r crate::Value> {
    row.values.get(index).ok_or_else(|| {
        Error::msg(format!(
            "row has {} columns, expected {}",
            row.values.len(),
            arity
        ))
    })
}

/// First projected column. `T = Option<_>` reads a nullable column, a bare
/// type insists on NOT NULL.
pub fn map_single<T: FromValue>(row: &RowLabeled) -> Result<T> {
    T::from_value(column_at(row, 0, "at least 1")?)
}

pub fn map_pair<A: FromValue, B: FromValue>(row: &RowLabeled) -> Result<(A, B)> {
    Ok((
        A::from_value(column_at(row, 0, "2")?)?,
        B::from_value(column_at(row, 1, "2")?)?,
    ))
}

pub fn map_triple<A: FromValue, B: FromValue, C: FromValue>(
    row: &RowLabeled,
) -> Result<(A, B, C)> {
    Ok((
        A::from_value(column_at(row, 0, "3")?)?,
        B::from_value(column_at(row, 1, "3")?)?,
        C::from_value(column_at(row, 2, "3")?)?,
    ))
}
