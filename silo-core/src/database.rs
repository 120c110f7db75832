use crate::{
    map_entity, map_pair, map_single, map_triple, Clock, Connection, Dialect, EntityInsertRunner,
    EntityMetamodel, EntityUpdateRunner, EntityUpsertRunner, EntityDeleteRunner, Error,
    ExecOptions, DeleteOptions, InsertOptions, FromValue, Result, RowLabeled, ScriptContext,
    ScriptRunner, SelectNode, SelectOptions, SelectRunner, SystemClock, UpdateOptions, UpsertMode,
    Value,
};
use std::sync::Arc;

/// Process-wide configuration shared by every query: the dialect and the
/// clock feeding the timestamp hooks.
#[derive(Clone)]
pub struct DatabaseConfig {
    pub dialect: Arc<dyn Dialect>,
    pub clock: Arc<dyn Clock>,
}

impl DatabaseConfig {
    pub fn new(dialect: Arc<dyn Dialect>) -> Self {
        Self {
            dialect,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

/// Transaction propagation attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionAttribute {
    /// Join the active transaction, or start one when none is active.
    Required,
    /// Always start a new transaction, suspending any enclosing one.
    RequiresNew,
}

pub(crate) fn exec_options_for(query_timeout: Option<std::time::Duration>) -> ExecOptions {
    ExecOptions {
        fetch_size: None,
        query_timeout,
    }
}

pub(crate) fn exec_options_select(options: &SelectOptions) -> ExecOptions {
    ExecOptions {
        fetch_size: options.fetch_size,
        query_timeout: options.query_timeout,
    }
}

/// Blocking database facade: one connection, one call at a time, fully
/// materialized results.
pub struct Database<C: Connection> {
    connection: C,
    config: DatabaseConfig,
    transaction_depth: usize,
    rollback_only: Vec<bool>,
}

impl<C: Connection> Database<C> {
    pub fn new(connection: C, config: DatabaseConfig) -> Self {
        Self {
            connection,
            config,
            transaction_depth: 0,
            rollback_only: Vec::new(),
        }
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    pub fn connection(&mut self) -> &mut C {
        &mut self.connection
    }

    // ---- entity commands ----

    pub fn insert<M: EntityMetamodel>(&mut self, meta: &M, entity: &M::Entity) -> Result<M::Entity> {
        self.insert_with_options(meta, entity, InsertOptions::default())
    }

    pub fn insert_with_options<M: EntityMetamodel>(
        &mut self,
        meta: &M,
        entity: &M::Entity,
        options: InsertOptions,
    ) -> Result<M::Entity> {
        let mut inserted =
            self.insert_batch_with_options(meta, std::slice::from_ref(entity), options)?;
        inserted
            .pop()
            .ok_or_else(|| Error::msg("insert returned no entity"))
    }

    pub fn insert_batch<M: EntityMetamodel>(
        &mut self,
        meta: &M,
        entities: &[M::Entity],
    ) -> Result<Vec<M::Entity>> {
        self.insert_batch_with_options(meta, entities, InsertOptions::default())
    }

    pub fn insert_batch_with_options<M: EntityMetamodel>(
        &mut self,
        meta: &M,
        entities: &[M::Entity],
        options: InsertOptions,
    ) -> Result<Vec<M::Entity>> {
        let runner = EntityInsertRunner::with_options(meta, options.clone());
        let mut processed = Vec::with_capacity(entities.len());
        for entity in entities {
            let sequence_id = match runner.sequence_statement(&self.config)? {
                Some(statement) => {
                    let rows = self.connection.query(&statement, &ExecOptions::default())?;
                    let row = rows
                        .first()
                        .ok_or_else(|| Error::msg("sequence fetch returned no rows"))?;
                    Some(runner.sequence_id(row)?)
                }
                None => None,
            };
            processed.push(runner.process(&self.config, entity, sequence_id)?);
        }
        let exec = exec_options_for(options.query_timeout);
        let chunk_size = options
            .batch_size
            .filter(|n| *n > 0)
            .unwrap_or_else(|| processed.len().max(1));
        let mut out = Vec::with_capacity(processed.len());
        for chunk in processed.chunks(chunk_size) {
            let statement = runner.statement(&self.config, chunk)?;
            let result = self
                .connection
                .execute(&statement, &exec)
                .map_err(|e| runner.classify(&self.config, e))?;
            out.extend(runner.post(chunk.to_vec(), &result)?);
        }
        Ok(out)
    }

    pub fn update<M: EntityMetamodel>(&mut self, meta: &M, entity: &M::Entity) -> Result<M::Entity> {
        self.update_with_options(meta, entity, UpdateOptions::default())
    }

    pub fn update_with_options<M: EntityMetamodel>(
        &mut self,
        meta: &M,
        entity: &M::Entity,
        options: UpdateOptions,
    ) -> Result<M::Entity> {
        let runner = EntityUpdateRunner::with_options(meta, options.clone());
        let (updated, statement) = runner.prepare(&self.config, entity)?;
        let exec = exec_options_for(options.query_timeout);
        let result = self.connection.execute(&statement, &exec)?;
        runner.validate(result.rows_affected)?;
        Ok(updated)
    }

    pub fn update_batch<M: EntityMetamodel>(
        &mut self,
        meta: &M,
        entities: &[M::Entity],
    ) -> Result<Vec<M::Entity>> {
        entities
            .iter()
            .map(|entity| self.update(meta, entity))
            .collect()
    }

    pub fn delete<M: EntityMetamodel>(&mut self, meta: &M, entity: &M::Entity) -> Result<()> {
        self.delete_with_options(meta, entity, DeleteOptions::default())
    }

    pub fn delete_with_options<M: EntityMetamodel>(
        &mut self,
        meta: &M,
        entity: &M::Entity,
        options: DeleteOptions,
    ) -> Result<()> {
        let runner = EntityDeleteRunner::with_options(meta, options.clone());
        let statement = runner.prepare(&self.config, entity)?;
        let exec = exec_options_for(options.query_timeout);
        let result = self.connection.execute(&statement, &exec)?;
        runner.validate(result.rows_affected)
    }

    /// Insert, or update the existing row on a primary key conflict.
    pub fn upsert<M: EntityMetamodel>(&mut self, meta: &M, entity: &M::Entity) -> Result<M::Entity> {
        let (_, entity) = self.run_upsert(meta, entity, UpsertMode::Update)?;
        Ok(entity)
    }

    /// Insert, or keep the existing row on a primary key conflict. Returns
    /// the number of affected rows (zero when the conflict was ignored).
    pub fn upsert_ignore<M: EntityMetamodel>(
        &mut self,
        meta: &M,
        entity: &M::Entity,
    ) -> Result<u64> {
        let (rows_affected, _) = self.run_upsert(meta, entity, UpsertMode::Ignore)?;
        Ok(rows_affected)
    }

    fn run_upsert<M: EntityMetamodel>(
        &mut self,
        meta: &M,
        entity: &M::Entity,
        mode: UpsertMode,
    ) -> Result<(u64, M::Entity)> {
        let runner = EntityUpsertRunner::new(meta, mode);
        let sequence_id = match runner.sequence_statement(&self.config)? {
            Some(statement) => {
                let rows = self.connection.query(&statement, &ExecOptions::default())?;
                let row = rows
                    .first()
                    .ok_or_else(|| Error::msg("sequence fetch returned no rows"))?;
                Some(runner.sequence_id(row)?)
            }
            None => None,
        };
        let processed = runner.process(&self.config, entity, sequence_id)?;
        let statement = runner.statement(&self.config, std::slice::from_ref(&processed))?;
        let exec = exec_options_for(runner.options().query_timeout);
        let insert_runner = EntityInsertRunner::new(meta);
        let result = self
            .connection
            .execute(&statement, &exec)
            .map_err(|e| insert_runner.classify(&self.config, e))?;
        let entity = runner.post(processed, &result)?;
        Ok((result.rows_affected, entity))
    }

    // ---- queries ----

    pub fn select<M: EntityMetamodel>(
        &mut self,
        meta: &M,
        node: impl Into<SelectNode>,
    ) -> Result<Vec<M::Entity>> {
        let node = node.into();
        let rows = self.query_rows(&node)?;
        rows.iter().map(|row| map_entity(meta, row)).collect()
    }

    pub fn select_one<M: EntityMetamodel>(
        &mut self,
        meta: &M,
        node: impl Into<SelectNode>,
    ) -> Result<Option<M::Entity>> {
        Ok(self.select(meta, node)?.into_iter().next())
    }

    /// Fetch one entity by an ad-hoc criterion.
    pub fn find<M: EntityMetamodel>(
        &mut self,
        meta: &M,
        criterion: crate::Criterion,
    ) -> Result<Option<M::Entity>> {
        self.select_one(meta, crate::select_from(meta).filter(criterion))
    }

    /// First projected column of every row. `T = Option<_>` reads a nullable
    /// column; a bare type insists on NOT NULL.
    pub fn select_single<T: FromValue>(
        &mut self,
        node: impl Into<SelectNode>,
    ) -> Result<Vec<T>> {
        let node = node.into();
        let rows = self.query_rows(&node)?;
        rows.iter().map(map_single).collect()
    }

    pub fn select_pair<A: FromValue, B: FromValue>(
        &mut self,
        node: impl Into<SelectNode>,
    ) -> Result<Vec<(A, B)>> {
        let node = node.into();
        let rows = self.query_rows(&node)?;
        rows.iter().map(map_pair).collect()
    }

    pub fn select_triple<A: FromValue, B: FromValue, C2: FromValue>(
        &mut self,
        node: impl Into<SelectNode>,
    ) -> Result<Vec<(A, B, C2)>> {
        let node = node.into();
        let rows = self.query_rows(&node)?;
        rows.iter().map(map_triple).collect()
    }

    /// Generic row-as-mapping shape for arbitrary column counts.
    pub fn select_rows(&mut self, node: impl Into<SelectNode>) -> Result<Vec<RowLabeled>> {
        self.query_rows(&node.into())
    }

    fn query_rows(&mut self, node: &SelectNode) -> Result<Vec<RowLabeled>> {
        let statement = SelectRunner::new(node).statement(&self.config)?;
        let exec = exec_options_select(node.exec_options());
        self.connection.query(&statement, &exec)
    }

    /// Run a raw SQL script with no binds and no result capture.
    pub fn run_script(&mut self, sql: &str) -> Result<()> {
        let context = ScriptContext::new(sql);
        let statement = ScriptRunner::new(&context).statement(&self.config);
        log::debug!("script: {}", statement);
        self.connection.run_script(&statement.sql)
    }

    /// The select's SQL with bind values inlined; never sent to a driver.
    pub fn dry_run(&self, node: impl Into<SelectNode>) -> Result<String> {
        SelectRunner::new(&node.into()).dry_run(&self.config)
    }

    // ---- transactions ----

    /// Run `f` inside a transaction boundary.
    ///
    /// `Required` joins the active transaction when one is open; the driver
    /// is only asked to `begin` for the outermost scope or for
    /// `RequiresNew`, which suspends the enclosing transaction. The boundary
    /// commits on success unless the scope was marked rollback-only, and
    /// rolls back when `f` errors.
    pub fn with_transaction<T>(
        &mut self,
        attribute: TransactionAttribute,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let begins = match attribute {
            TransactionAttribute::Required => self.transaction_depth == 0,
            TransactionAttribute::RequiresNew => true,
        };
        if begins {
            self.connection.begin()?;
            self.rollback_only.push(false);
        }
        self.transaction_depth += 1;
        let result = f(self);
        self.transaction_depth -= 1;
        if begins {
            let rollback_only = self.rollback_only.pop().unwrap_or(false);
            match &result {
                Ok(_) if !rollback_only => self.connection.commit()?,
                _ => self.connection.rollback()?,
            }
        }
        result
    }

    /// Turn the commit at the owning boundary into a rollback. Work already
    /// performed stays visible inside the transaction until then.
    pub fn set_rollback_only(&mut self) {
        if let Some(flag) = self.rollback_only.last_mut() {
            *flag = true;
        }
    }

    pub fn is_rollback_only(&self) -> bool {
        self.rollback_only.last().copied().unwrap_or(false)
    }

    pub fn in_transaction(&self) -> bool {
        self.transaction_depth > 0
    }

    /// Sequence ids fetched outside the entity path, mostly for diagnostics.
    pub fn next_sequence_value(&mut self, sequence: &str) -> Result<Value> {
        let sql = self.config.dialect.sequence_next_value_sql(sequence)?;
        let statement = crate::Statement::raw(sql);
        let rows = self.connection.query(&statement, &ExecOptions::default())?;
        rows.first()
            .and_then(|row| row.values.first().cloned())
            .ok_or_else(|| Error::msg("sequence fetch returned no rows"))
    }
}
