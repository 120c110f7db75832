use crate::{
    DatabaseConfig, DeleteContext, DeleteOptions, EntityMetamodel, Error, QueryError, Result,
    Statement,
};
use std::borrow::Cow;

/// Orchestrates a single-entity delete keyed by id and, when the entity is
/// versioned, by the optimistic lock counter.
pub struct EntityDeleteRunner<'a, M: EntityMetamodel> {
    meta: &'a M,
    options: DeleteOptions,
}

impl<'a, M: EntityMetamodel> EntityDeleteRunner<'a, M> {
    pub fn new(meta: &'a M) -> Self {
        Self::with_options(meta, DeleteOptions::default())
    }

    pub fn with_options(meta: &'a M, options: DeleteOptions) -> Self {
        Self { meta, options }
    }

    pub fn options(&self) -> &DeleteOptions {
        &self.options
    }

    pub fn prepare(&self, config: &DatabaseConfig, entity: &M::Entity) -> Result<Statement> {
        let table: Cow<'static, str> = Cow::Owned(self.meta.table_name().to_owned());
        let mut context = DeleteContext::new(table.clone()).options(|_| self.options.clone());
        for criterion in self.meta.id_criteria(entity) {
            context = context.filter(criterion);
        }
        if let Some(column) = self.meta.version_column() {
            let current = self
                .meta
                .value_of(entity, &column.name)
                .ok_or_else(|| Error::msg("version column missing from entity row"))?;
            context = context.filter(column.expr(table).eq(current));
        }
        let statement = config.dialect.build_delete(&context)?;
        log::debug!("delete on `{}`: {}", self.meta.table_name(), statement);
        Ok(statement)
    }

    pub fn validate(&self, rows_affected: u64) -> Result<()> {
        if self.meta.version_column().is_some() && rows_affected == 0 {
            return Err(QueryError::OptimisticLock {
                table: self.meta.table_name().to_owned(),
                rows_affected,
            }
            .into());
        }
        Ok(())
    }

    pub fn dry_run(&self, config: &DatabaseConfig, entity: &M::Entity) -> Result<String> {
        self.prepare(config, entity)?.render(config.dialect.as_ref())
    }
}
