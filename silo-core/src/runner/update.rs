use crate::{
    next_version, pre_update, DatabaseConfig, EntityMetamodel, Error, Operand, QueryError, Result,
    Statement, UpdateContext, UpdateOptions,
};
use std::borrow::Cow;

/// Orchestrates a single-entity update with optimistic locking: timestamps
/// re-stamped, version bumped, `WHERE id = ? AND version = ?` when the entity
/// is versioned, affected-row validation afterwards.
pub struct EntityUpdateRunner<'a, M: EntityMetamodel> {
    meta: &'a M,
    options: UpdateOptions,
}

impl<'a, M: EntityMetamodel> EntityUpdateRunner<'a, M> {
    pub fn new(meta: &'a M) -> Self {
        Self::with_options(meta, UpdateOptions::default())
    }

    pub fn with_options(meta: &'a M, options: UpdateOptions) -> Self {
        Self { meta, options }
    }

    pub fn options(&self) -> &UpdateOptions {
        &self.options
    }

    /// Build the statement and the entity value the caller gets back on
    /// success (update timestamp stamped, version bumped).
    pub fn prepare(
        &self,
        config: &DatabaseConfig,
        entity: &M::Entity,
    ) -> Result<(M::Entity, Statement)> {
        let stamped = pre_update(self.meta, entity, config.clock.as_ref())?;
        let updated = match self.meta.version_column() {
            Some(column) => {
                let current = self
                    .meta
                    .value_of(entity, &column.name)
                    .ok_or_else(|| Error::msg("version column missing from entity row"))?;
                let name = column.name.clone();
                self.meta
                    .with_value(&stamped, &name, next_version(&current)?)?
            }
            None => stamped,
        };
        let table: Cow<'static, str> = Cow::Owned(self.meta.table_name().to_owned());
        let row = self.meta.to_row(&updated);
        let mut context = UpdateContext::new(table.clone()).options(|_| self.options.clone());
        for (column, value) in self.meta.columns().iter().zip(row) {
            // The primary key never moves; the creation stamp is written once.
            if column.primary_key || column.created_at {
                continue;
            }
            context = context.set(column.expr(table.clone()), Operand::Value(value));
        }
        for criterion in self.meta.id_criteria(entity) {
            context = context.filter(criterion);
        }
        if let Some(column) = self.meta.version_column() {
            let current = self
                .meta
                .value_of(entity, &column.name)
                .ok_or_else(|| Error::msg("version column missing from entity row"))?;
            context = context.filter(column.expr(table.clone()).eq(current));
        }
        let statement = config.dialect.build_update(&context)?;
        log::debug!("update on `{}`: {}", self.meta.table_name(), statement);
        Ok((updated, statement))
    }

    /// Zero affected rows on a versioned entity is an optimistic lock
    /// conflict, not a silent no-op.
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
        let (_, statement) = self.prepare(config, entity)?;
        statement.render(config.dialect.as_ref())
    }
}
