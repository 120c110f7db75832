use crate::{
    database::{exec_options_for, exec_options_select},
    map_entity, map_pair, map_single, map_triple, AsyncConnection, AsyncConnectionFactory,
    DatabaseConfig, DeleteOptions, EntityDeleteRunner, EntityInsertRunner, EntityMetamodel,
    EntityUpdateRunner, EntityUpsertRunner, Error, ExecOptions, FromValue, InsertOptions, Result,
    RowLabeled, ScriptContext, ScriptRunner, SelectNode, SelectRunner, UpdateOptions, UpsertMode,
    Value,
};
use async_stream::try_stream;
use futures::{pin_mut, Stream, TryStreamExt};

/// Reactive database facade.
///
/// Every operation obtains an owned connection from the factory, so queries
/// and transactions never share a session. Materializing calls mirror the
/// blocking facade; the `stream_*` family returns lazily pulled row sequences
/// whose transaction stays open for the lifetime of consumption and is closed
/// exactly once — on completion, cancellation (drop) or error.
pub struct ReactiveDatabase<F: AsyncConnectionFactory> {
    factory: F,
    config: DatabaseConfig,
}

impl<F: AsyncConnectionFactory> ReactiveDatabase<F> {
    pub fn new(factory: F, config: DatabaseConfig) -> Self {
        Self { factory, config }
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    pub async fn connect(&self) -> Result<F::Connection> {
        self.factory.connect().await
    }

    /// Start a transaction on a dedicated connection. `RequiresNew` semantics
    /// come for free: every `begin` is independent of any other transaction.
    pub async fn begin(&self) -> Result<ReactiveTransaction<F::Connection>> {
        let mut connection = self.factory.connect().await?;
        connection.begin().await?;
        Ok(ReactiveTransaction {
            connection,
            config: self.config.clone(),
            rollback_only: false,
        })
    }

    // ---- auto-commit operations ----

    pub async fn insert<M: EntityMetamodel>(
        &self,
        meta: &M,
        entity: &M::Entity,
    ) -> Result<M::Entity> {
        let mut connection = self.factory.connect().await?;
        run_insert_one(&mut connection, &self.config, meta, entity, InsertOptions::default()).await
    }

    pub async fn insert_batch<M: EntityMetamodel>(
        &self,
        meta: &M,
        entities: &[M::Entity],
    ) -> Result<Vec<M::Entity>> {
        let mut connection = self.factory.connect().await?;
        run_insert_batch(
            &mut connection,
            &self.config,
            meta,
            entities,
            InsertOptions::default(),
        )
        .await
    }

    pub async fn update<M: EntityMetamodel>(
        &self,
        meta: &M,
        entity: &M::Entity,
    ) -> Result<M::Entity> {
        let mut connection = self.factory.connect().await?;
        run_update(&mut connection, &self.config, meta, entity, UpdateOptions::default()).await
    }

    pub async fn delete<M: EntityMetamodel>(&self, meta: &M, entity: &M::Entity) -> Result<()> {
        let mut connection = self.factory.connect().await?;
        run_delete(&mut connection, &self.config, meta, entity, DeleteOptions::default()).await
    }

    pub async fn upsert<M: EntityMetamodel>(
        &self,
        meta: &M,
        entity: &M::Entity,
    ) -> Result<M::Entity> {
        let mut connection = self.factory.connect().await?;
        let (_, entity) =
            run_upsert(&mut connection, &self.config, meta, entity, UpsertMode::Update).await?;
        Ok(entity)
    }

    pub async fn upsert_ignore<M: EntityMetamodel>(
        &self,
        meta: &M,
        entity: &M::Entity,
    ) -> Result<u64> {
        let mut connection = self.factory.connect().await?;
        let (rows_affected, _) =
            run_upsert(&mut connection, &self.config, meta, entity, UpsertMode::Ignore).await?;
        Ok(rows_affected)
    }

    pub async fn select<M: EntityMetamodel>(
        &self,
        meta: &M,
        node: impl Into<SelectNode>,
    ) -> Result<Vec<M::Entity>> {
        let node = node.into();
        let mut connection = self.factory.connect().await?;
        let rows = run_query_rows(&mut connection, &self.config, &node).await?;
        rows.iter().map(|row| map_entity(meta, row)).collect()
    }

    pub async fn select_rows(&self, node: impl Into<SelectNode>) -> Result<Vec<RowLabeled>> {
        let node = node.into();
        let mut connection = self.factory.connect().await?;
        run_query_rows(&mut connection, &self.config, &node).await
    }

    pub async fn run_script(&self, sql: &str) -> Result<()> {
        let mut connection = self.factory.connect().await?;
        run_script(&mut connection, &self.config, sql).await
    }

    pub fn dry_run(&self, node: impl Into<SelectNode>) -> Result<String> {
        SelectRunner::new(&node.into()).dry_run(&self.config)
    }

    // ---- transaction-scoped streams ----

    /// Entities produced one at a time inside a dedicated transaction.
    pub fn stream_entities<'a, M: EntityMetamodel>(
        &'a self,
        meta: &'a M,
        node: impl Into<SelectNode>,
    ) -> impl Stream<Item = Result<M::Entity>> + 'a {
        self.stream_mapped(node.into(), move |row| map_entity(meta, row))
    }

    pub fn stream_rows(
        &self,
        node: impl Into<SelectNode>,
    ) -> impl Stream<Item = Result<RowLabeled>> + '_ {
        self.stream_mapped(node.into(), |row| Ok(row.clone()))
    }

    /// First projected column of every row; `T = Option<_>` for nullable.
    pub fn stream_single<'a, T: FromValue + Send + 'a>(
        &'a self,
        node: impl Into<SelectNode>,
    ) -> impl Stream<Item = Result<T>> + 'a {
        self.stream_mapped(node.into(), |row| map_single(row))
    }

    pub fn stream_pair<'a, A, B>(
        &'a self,
        node: impl Into<SelectNode>,
    ) -> impl Stream<Item = Result<(A, B)>> + 'a
    where
        A: FromValue + Send + 'a,
        B: FromValue + Send + 'a,
    {
        self.stream_mapped(node.into(), |row| map_pair(row))
    }

    pub fn stream_triple<'a, A, B, C>(
        &'a self,
        node: impl Into<SelectNode>,
    ) -> impl Stream<Item = Result<(A, B, C)>> + 'a
    where
        A: FromValue + Send + 'a,
        B: FromValue + Send + 'a,
        C: FromValue + Send + 'a,
    {
        self.stream_mapped(node.into(), |row| map_triple(row))
    }

    /// The transaction begins when the first row is polled and closes exactly
    /// once: commit after the last row, discard on early drop or error. The
    /// stream owns its connection, so cancelling consumption releases the
    /// transaction deterministically.
    fn stream_mapped<'a, T: Send + 'a>(
        &'a self,
        node: SelectNode,
        map: impl Fn(&RowLabeled) -> Result<T> + Send + 'a,
    ) -> impl Stream<Item = Result<T>> + 'a {
        try_stream! {
            let mut connection = self.factory.connect().await?;
            connection.begin().await?;
            let statement = SelectRunner::new(&node).statement(&self.config)?;
            let exec = exec_options_select(node.exec_options());
            {
                let rows = connection.query(statement, exec);
                pin_mut!(rows);
                while let Some(row) = rows.try_next().await? {
                    yield map(&row)?;
                }
            }
            connection.commit().await?;
        }
    }
}

/// A transaction on its own connection. Dropping it without commit discards
/// the uncommitted work (the driver contract ties transaction lifetime to the
/// connection).
pub struct ReactiveTransaction<C: AsyncConnection> {
    connection: C,
    config: DatabaseConfig,
    rollback_only: bool,
}

impl<C: AsyncConnection> ReactiveTransaction<C> {
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    pub async fn insert<M: EntityMetamodel>(
        &mut self,
        meta: &M,
        entity: &M::Entity,
    ) -> Result<M::Entity> {
        run_insert_one(&mut self.connection, &self.config, meta, entity, InsertOptions::default())
            .await
    }

    pub async fn insert_batch<M: EntityMetamodel>(
        &mut self,
        meta: &M,
        entities: &[M::Entity],
    ) -> Result<Vec<M::Entity>> {
        run_insert_batch(
            &mut self.connection,
            &self.config,
            meta,
            entities,
            InsertOptions::default(),
        )
        .await
    }

    pub async fn insert_with_options<M: EntityMetamodel>(
        &mut self,
        meta: &M,
        entity: &M::Entity,
        options: InsertOptions,
    ) -> Result<M::Entity> {
        run_insert_one(&mut self.connection, &self.config, meta, entity, options).await
    }

    pub async fn update<M: EntityMetamodel>(
        &mut self,
        meta: &M,
        entity: &M::Entity,
    ) -> Result<M::Entity> {
        run_update(&mut self.connection, &self.config, meta, entity, UpdateOptions::default())
            .await
    }

    pub async fn delete<M: EntityMetamodel>(&mut self, meta: &M, entity: &M::Entity) -> Result<()> {
        run_delete(&mut self.connection, &self.config, meta, entity, DeleteOptions::default())
            .await
    }

    pub async fn upsert<M: EntityMetamodel>(
        &mut self,
        meta: &M,
        entity: &M::Entity,
    ) -> Result<M::Entity> {
        let (_, entity) = run_upsert(
            &mut self.connection,
            &self.config,
            meta,
            entity,
            UpsertMode::Update,
        )
        .await?;
        Ok(entity)
    }

    pub async fn select<M: EntityMetamodel>(
        &mut self,
        meta: &M,
        node: impl Into<SelectNode>,
    ) -> Result<Vec<M::Entity>> {
        let node = node.into();
        let rows = run_query_rows(&mut self.connection, &self.config, &node).await?;
        rows.iter().map(|row| map_entity(meta, row)).collect()
    }

    pub async fn select_rows(&mut self, node: impl Into<SelectNode>) -> Result<Vec<RowLabeled>> {
        let node = node.into();
        run_query_rows(&mut self.connection, &self.config, &node).await
    }

    pub async fn run_script(&mut self, sql: &str) -> Result<()> {
        run_script(&mut self.connection, &self.config, sql).await
    }

    /// Rows streamed within this transaction; the borrow keeps the
    /// transaction open until the stream is dropped.
    pub fn select_stream<'s, M: EntityMetamodel>(
        &'s mut self,
        meta: &'s M,
        node: impl Into<SelectNode>,
    ) -> impl Stream<Item = Result<M::Entity>> + 's {
        let node = node.into();
        let config = self.config.clone();
        let connection = &mut self.connection;
        try_stream! {
            let statement = SelectRunner::new(&node).statement(&config)?;
            let exec = exec_options_select(node.exec_options());
            let rows = connection.query(statement, exec);
            pin_mut!(rows);
            while let Some(row) = rows.try_next().await? {
                yield map_entity(meta, &row)?;
            }
        }
    }

    /// Turn the commit at the boundary into a rollback; reads inside the
    /// transaction still observe the uncommitted writes until then.
    pub fn set_rollback_only(&mut self) {
        self.rollback_only = true;
    }

    pub fn is_rollback_only(&self) -> bool {
        self.rollback_only
    }

    pub async fn commit(mut self) -> Result<()> {
        if self.rollback_only {
            self.connection.rollback().await
        } else {
            self.connection.commit().await
        }
    }

    pub async fn rollback(mut self) -> Result<()> {
        self.connection.rollback().await
    }
}

// ---- shared orchestration over an async connection ----

async fn collect_query<C: AsyncConnection>(
    connection: &mut C,
    statement: crate::Statement,
    options: ExecOptions,
) -> Result<Vec<RowLabeled>> {
    let rows = connection.query(statement, options);
    pin_mut!(rows);
    rows.try_collect().await
}

async fn fetch_sequence_id<C: AsyncConnection>(
    connection: &mut C,
    statement: Option<crate::Statement>,
    to_id: impl Fn(&RowLabeled) -> Result<Value>,
) -> Result<Option<Value>> {
    match statement {
        Some(statement) => {
            let rows = collect_query(connection, statement, ExecOptions::default()).await?;
            let row = rows
                .first()
                .ok_or_else(|| Error::msg("sequence fetch returned no rows"))?;
            Ok(Some(to_id(row)?))
        }
        None => Ok(None),
    }
}

async fn run_insert_one<C: AsyncConnection, M: EntityMetamodel>(
    connection: &mut C,
    config: &DatabaseConfig,
    meta: &M,
    entity: &M::Entity,
    options: InsertOptions,
) -> Result<M::Entity> {
    let mut inserted =
        run_insert_batch(connection, config, meta, std::slice::from_ref(entity), options).await?;
    inserted
        .pop()
        .ok_or_else(|| Error::msg("insert returned no entity"))
}

async fn run_insert_batch<C: AsyncConnection, M: EntityMetamodel>(
    connection: &mut C,
    config: &DatabaseConfig,
    meta: &M,
    entities: &[M::Entity],
    options: InsertOptions,
) -> Result<Vec<M::Entity>> {
    let runner = EntityInsertRunner::with_options(meta, options.clone());
    let mut processed = Vec::with_capacity(entities.len());
    for entity in entities {
        let sequence_id = fetch_sequence_id(
            connection,
            runner.sequence_statement(config)?,
            |row| runner.sequence_id(row),
        )
        .await?;
        processed.push(runner.process(config, entity, sequence_id)?);
    }
    let exec = exec_options_for(options.query_timeout);
    let chunk_size = options
        .batch_size
        .filter(|n| *n > 0)
        .unwrap_or_else(|| processed.len().max(1));
    let mut out = Vec::with_capacity(processed.len());
    for chunk in processed.chunks(chunk_size) {
        let statement = runner.statement(config, chunk)?;
        let result = match connection.execute(&statement, &exec).await {
            Ok(result) => result,
            Err(e) => return Err(runner.classify(config, e)),
        };
        out.extend(runner.post(chunk.to_vec(), &result)?);
    }
    Ok(out)
}

async fn run_update<C: AsyncConnection, M: EntityMetamodel>(
    connection: &mut C,
    config: &DatabaseConfig,
    meta: &M,
    entity: &M::Entity,
    options: UpdateOptions,
) -> Result<M::Entity> {
    let runner = EntityUpdateRunner::with_options(meta, options.clone());
    let (updated, statement) = runner.prepare(config, entity)?;
    let exec = exec_options_for(options.query_timeout);
    let result = connection.execute(&statement, &exec).await?;
    runner.validate(result.rows_affected)?;
    Ok(updated)
}

async fn run_delete<C: AsyncConnection, M: EntityMetamodel>(
    connection: &mut C,
    config: &DatabaseConfig,
    meta: &M,
    entity: &M::Entity,
    options: DeleteOptions,
) -> Result<()> {
    let runner = EntityDeleteRunner::with_options(meta, options.clone());
    let statement = runner.prepare(config, entity)?;
    let exec = exec_options_for(options.query_timeout);
    let result = connection.execute(&statement, &exec).await?;
    runner.validate(result.rows_affected)
}

async fn run_upsert<C: AsyncConnection, M: EntityMetamodel>(
    connection: &mut C,
    config: &DatabaseConfig,
    meta: &M,
    entity: &M::Entity,
    mode: UpsertMode,
) -> Result<(u64, M::Entity)> {
    let runner = EntityUpsertRunner::new(meta, mode);
    let sequence_id = fetch_sequence_id(
        connection,
        runner.sequence_statement(config)?,
        |row| runner.sequence_id(row),
    )
    .await?;
    let processed = runner.process(config, entity, sequence_id)?;
    let statement = runner.statement(config, std::slice::from_ref(&processed))?;
    let exec = exec_options_for(runner.options().query_timeout);
    let insert_runner = EntityInsertRunner::new(meta);
    let result = match connection.execute(&statement, &exec).await {
        Ok(result) => result,
        Err(e) => return Err(insert_runner.classify(config, e)),
    };
    let entity = runner.post(processed, &result)?;
    Ok((result.rows_affected, entity))
}

async fn run_query_rows<C: AsyncConnection>(
    connection: &mut C,
    config: &DatabaseConfig,
    node: &SelectNode,
) -> Result<Vec<RowLabeled>> {
    let statement = SelectRunner::new(node).statement(config)?;
    let exec = exec_options_select(node.exec_options());
    collect_query(connection, statement, exec).await
}

async fn run_script<C: AsyncConnection>(
    connection: &mut C,
    config: &DatabaseConfig,
    sql: &str,
) -> Result<()> {
    let context = ScriptContext::new(sql);
    let statement = ScriptRunner::new(&context).statement(config);
    log::debug!("script: {}", statement);
    connection.run_script(&statement.sql).await
}
