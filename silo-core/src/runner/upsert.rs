use crate::{
    id_value, pre_insert, DatabaseConfig, EntityMetamodel, Error, ExecuteResult, IdStrategy,
    InsertOptions, Result, RowLabeled, Statement, UpsertContext, UpsertMode, Value,
};
use std::borrow::Cow;

/// Orchestrates an insert-or-update through the dialect's upsert builder.
///
/// The conflict key is the primary key. The version column is never part of
/// the key; together with the data and update-stamp columns it is rewritten
/// from the attempted insert row on conflict, while the creation stamp keeps
/// its original value.
pub struct EntityUpsertRunner<'a, M: EntityMetamodel> {
    meta: &'a M,
    mode: UpsertMode,
    options: InsertOptions,
}

impl<'a, M: EntityMetamodel> EntityUpsertRunner<'a, M> {
    pub fn new(meta: &'a M, mode: UpsertMode) -> Self {
        Self::with_options(meta, mode, InsertOptions::default())
    }

    pub fn with_options(meta: &'a M, mode: UpsertMode, options: InsertOptions) -> Self {
        Self {
            meta,
            mode,
            options,
        }
    }

    pub fn options(&self) -> &InsertOptions {
        &self.options
    }

    pub fn sequence_statement(&self, config: &DatabaseConfig) -> Result<Option<Statement>> {
        match self.meta.id_strategy() {
            IdStrategy::Sequence { name, .. } if !self.options.disable_sequence_assignment => {
                let sql = config.dialect.sequence_next_value_sql(&name)?;
                Ok(Some(Statement::raw(sql)))
            }
            _ => Ok(None),
        }
    }

    pub fn sequence_id(&self, row: &RowLabeled) -> Result<Value> {
        let raw = row
            .values
            .first()
            .ok_or_else(|| Error::msg("sequence fetch returned an empty row"))?;
        let id_column = self.meta.id_columns().into_iter().next().ok_or_else(|| {
            Error::msg(format!(
                "table `{}` declares a sequence but no id column",
                self.meta.table_name()
            ))
        })?;
        id_value(&id_column.value, raw)
    }

    pub fn process(
        &self,
        config: &DatabaseConfig,
        entity: &M::Entity,
        sequence_id: Option<Value>,
    ) -> Result<M::Entity> {
        pre_insert(self.meta, entity, config.clock.as_ref(), sequence_id)
    }

    pub fn statement(&self, config: &DatabaseConfig, entities: &[M::Entity]) -> Result<Statement> {
        let table: Cow<'static, str> = Cow::Owned(self.meta.table_name().to_owned());
        let columns: Vec<_> = self
            .meta
            .columns()
            .iter()
            .map(|c| c.expr(table.clone()))
            .collect();
        let conflict_keys: Vec<_> = self
            .meta
            .columns()
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.expr(table.clone()))
            .collect();
        let update_columns: Vec<_> = self
            .meta
            .columns()
            .iter()
            .filter(|c| !c.primary_key && !c.created_at)
            .map(|c| c.expr(table.clone()))
            .collect();
        let context = UpsertContext {
            table,
            columns,
            rows: entities.iter().map(|e| self.meta.to_row(e)).collect(),
            conflict_keys,
            update_columns,
            mode: self.mode,
            options: self.options.clone(),
        };
        let statement = config.dialect.build_upsert(&context)?;
        log::debug!("upsert into `{}`: {}", self.meta.table_name(), statement);
        Ok(statement)
    }

    /// Assign a generated id when the insert path of the upsert produced one.
    pub fn post(&self, entity: M::Entity, result: &ExecuteResult) -> Result<M::Entity> {
        if self.meta.id_strategy() != IdStrategy::AutoIncrement {
            return Ok(entity);
        }
        let Some(key) = result.generated_keys.first() else {
            return Ok(entity);
        };
        let id_column = self
            .meta
            .id_columns()
            .into_iter()
            .next()
            .ok_or_else(|| Error::msg("auto-increment strategy without an id column"))?;
        let id = id_value(&id_column.value, key)?;
        self.meta.with_value(&entity, &id_column.name, id)
    }

    pub fn dry_run(&self, config: &DatabaseConfig, entity: &M::Entity) -> Result<String> {
        let processed = self.process(config, entity, None)?;
        let statement = self.statement(config, std::slice::from_ref(&processed))?;
        statement.render(config.dialect.as_ref())
    }
}
