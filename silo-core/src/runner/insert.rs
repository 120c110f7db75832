use crate::{
    id_value, insert_context, pre_insert, DatabaseConfig, DriverError, EntityMetamodel, Error,
    ExecuteResult, IdStrategy, InsertOptions, QueryError, Result, RowLabeled, Statement, Value,
};

/// Orchestrates one entity insert: sequence pre-fetch, hooks, statement
/// building, generated key read-back and unique constraint classification.
///
/// The runner is execution-model agnostic; the blocking and the reactive
/// facades drive the same steps.
pub struct EntityInsertRunner<'a, M: EntityMetamodel> {
    meta: &'a M,
    options: InsertOptions,
}

impl<'a, M: EntityMetamodel> EntityInsertRunner<'a, M> {
    pub fn new(meta: &'a M) -> Self {
        Self::with_options(meta, InsertOptions::default())
    }

    pub fn with_options(meta: &'a M, options: InsertOptions) -> Self {
        Self { meta, options }
    }

    pub fn options(&self) -> &InsertOptions {
        &self.options
    }

    /// The sequence fetch statement, when the id strategy asks for one and
    /// the options have not disabled the assignment.
    pub fn sequence_statement(&self, config: &DatabaseConfig) -> Result<Option<Statement>> {
        match self.meta.id_strategy() {
            IdStrategy::Sequence { name, .. } if !self.options.disable_sequence_assignment => {
                let sql = config.dialect.sequence_next_value_sql(&name)?;
                Ok(Some(Statement::raw(sql)))
            }
            _ => Ok(None),
        }
    }

    /// Read the fetched sequence value back as the id column's type.
    pub fn sequence_id(&self, row: &RowLabeled) -> Result<Value> {
        let raw = row
            .values
            .first()
            .ok_or_else(|| Error::msg("sequence fetch returned an empty row"))?;
        let id_column = self
            .meta
            .id_columns()
            .into_iter()
            .next()
            .ok_or_else(|| {
                Error::msg(format!(
                    "table `{}` declares a sequence but no id column",
                    self.meta.table_name()
                ))
            })?;
        id_value(&id_column.value, raw)
    }

    /// Apply the pre-insert hooks, yielding the entity that will be written.
    pub fn process(
        &self,
        config: &DatabaseConfig,
        entity: &M::Entity,
        sequence_id: Option<Value>,
    ) -> Result<M::Entity> {
        pre_insert(self.meta, entity, config.clock.as_ref(), sequence_id)
    }

    /// Build the insert statement over already processed entities.
    pub fn statement(&self, config: &DatabaseConfig, entities: &[M::Entity]) -> Result<Statement> {
        let context = insert_context(self.meta, entities, self.options.clone());
        let statement = config.dialect.build_insert(&context)?;
        log::debug!(
            "insert into `{}`: {}",
            self.meta.table_name(),
            statement
        );
        Ok(statement)
    }

    /// Populate auto-increment ids from the generated keys, pairing keys with
    /// entities in insertion order.
    pub fn post(&self, entities: Vec<M::Entity>, result: &ExecuteResult) -> Result<Vec<M::Entity>> {
        if self.meta.id_strategy() != IdStrategy::AutoIncrement {
            return Ok(entities);
        }
        let id_column = self
            .meta
            .id_columns()
            .into_iter()
            .next()
            .ok_or_else(|| Error::msg("auto-increment strategy without an id column"))?;
        if result.generated_keys.len() < entities.len() {
            return Err(Error::msg(format!(
                "driver returned {} generated keys for {} inserted rows",
                result.generated_keys.len(),
                entities.len()
            )));
        }
        entities
            .into_iter()
            .zip(&result.generated_keys)
            .map(|(entity, key)| {
                let id = id_value(&id_column.value, key)?;
                self.meta.with_value(&entity, &id_column.name, id)
            })
            .collect()
    }

    /// Translate a unique/primary key violation into its distinguished error
    /// kind; anything else passes through unchanged.
    pub fn classify(&self, config: &DatabaseConfig, error: Error) -> Error {
        if let Some(driver) = error.downcast_ref::<DriverError>() {
            match config.dialect.is_unique_violation(driver) {
                Ok(true) => return QueryError::UniqueConstraint(driver.clone()).into(),
                Ok(false) => {}
                Err(classification) => return classification,
            }
        }
        error
    }

    pub fn dry_run(&self, config: &DatabaseConfig, entity: &M::Entity) -> Result<String> {
        let processed = self.process(config, entity, None)?;
        let statement = self.statement(config, std::slice::from_ref(&processed))?;
        statement.render(config.dialect.as_ref())
    }
}
