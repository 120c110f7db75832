use crate::{
    engine::{execute, CommandOutput},
    parser::{parse_command, Command},
    store::{MemoryStore, StoreInner},
};
use async_stream::try_stream;
use futures::Stream;
use silo_core::{
    AsyncConnection, AsyncConnectionFactory, Connection, Error, ExecOptions, ExecuteResult,
    Result, RowLabeled, Statement, Value,
};

fn lock_poisoned<T>(_: T) -> Error {
    Error::msg("memory store mutex poisoned")
}

/// Split a script into `;` separated statements, ignoring separators inside
/// quotes.
fn split_statements(sql: &str) -> Vec<&str> {
    let mut statements = Vec::new();
    let bytes = sql.as_bytes();
    let mut start = 0;
    let mut quote: Option<u8> = None;
    for (i, &b) in bytes.iter().enumerate() {
        match quote {
            Some(q) => {
                if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'\'' | b'"' => quote = Some(b),
                b';' => {
                    let piece = sql[start..i].trim();
                    if !piece.is_empty() {
                        statements.push(piece);
                    }
                    start = i + 1;
                }
                _ => {}
            },
        }
    }
    let piece = sql[start..].trim();
    if !piece.is_empty() {
        statements.push(piece);
    }
    statements
}

/// Blocking session on a [`MemoryStore`].
///
/// A transaction is a snapshot of the committed state; `begin` always pushes
/// an independent working copy (suspend semantics), reads and writes hit the
/// top of the stack, `commit` publishes it and `rollback` or dropping the
/// connection discards it.
pub struct MemoryConnection {
    store: MemoryStore,
    transactions: Vec<StoreInner>,
}

impl MemoryConnection {
    pub(crate) fn new(store: MemoryStore) -> Self {
        Self {
            store,
            transactions: Vec::new(),
        }
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    pub fn in_transaction(&self) -> bool {
        !self.transactions.is_empty()
    }

    fn run(&mut self, sql: &str, binds: &[Value]) -> Result<CommandOutput> {
        let command = parse_command(sql)?;
        match command {
            Command::Begin => {
                Connection::begin(self)?;
                Ok(CommandOutput::None)
            }
            Command::Commit => {
                Connection::commit(self)?;
                Ok(CommandOutput::None)
            }
            Command::Rollback => {
                Connection::rollback(self)?;
                Ok(CommandOutput::None)
            }
            command => {
                let mut sequences = self.store.sequences.lock().map_err(lock_poisoned)?;
                let output = match self.transactions.last_mut() {
                    Some(working) => execute(working, &mut sequences, &command, binds),
                    None => {
                        let mut committed = self.store.committed.lock().map_err(lock_poisoned)?;
                        execute(&mut committed, &mut sequences, &command, binds)
                    }
                };
                if let Err(error) = &output {
                    log::debug!("memory engine error: {error}");
                }
                output
            }
        }
    }
}

impl Connection for MemoryConnection {
    fn execute(&mut self, statement: &Statement, _options: &ExecOptions) -> Result<ExecuteResult> {
        match self.run(&statement.sql, &statement.binds)? {
            CommandOutput::Affected {
                rows_affected,
                generated_keys,
            } => Ok(ExecuteResult {
                rows_affected,
                generated_keys,
            }),
            CommandOutput::None => Ok(ExecuteResult::default()),
            CommandOutput::Rows(..) => {
                Err(Error::msg("execute called with a row producing statement"))
            }
        }
    }

    fn query(&mut self, statement: &Statement, _options: &ExecOptions) -> Result<Vec<RowLabeled>> {
        match self.run(&statement.sql, &statement.binds)? {
            CommandOutput::Rows(rows) => Ok(rows),
            _ => Err(Error::msg("query called with a non row producing statement")),
        }
    }

    fn run_script(&mut self, sql: &str) -> Result<()> {
        for statement in split_statements(sql) {
            self.run(statement, &[])?;
        }
        Ok(())
    }

    fn begin(&mut self) -> Result<()> {
        let snapshot = self
            .store
            .committed
            .lock()
            .map_err(lock_poisoned)?
            .clone();
        self.transactions.push(snapshot);
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        let working = self
            .transactions
            .pop()
            .ok_or_else(|| Error::msg("no active transaction to commit"))?;
        *self.store.committed.lock().map_err(lock_poisoned)? = working;
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        self.transactions
            .pop()
            .ok_or_else(|| Error::msg("no active transaction to roll back"))?;
        Ok(())
    }
}

/// Non-blocking session over the same engine. Rows are yielded one at a time
/// so consumption is pull-based; dropping the connection discards any open
/// transaction.
pub struct MemoryAsyncConnection {
    inner: MemoryConnection,
}

impl MemoryAsyncConnection {
    pub(crate) fn new(store: MemoryStore) -> Self {
        Self {
            inner: MemoryConnection::new(store),
        }
    }

    pub fn in_transaction(&self) -> bool {
        self.inner.in_transaction()
    }
}

impl AsyncConnection for MemoryAsyncConnection {
    async fn execute(
        &mut self,
        statement: &Statement,
        options: &ExecOptions,
    ) -> Result<ExecuteResult> {
        Connection::execute(&mut self.inner, statement, options)
    }

    fn query(
        &mut self,
        statement: Statement,
        options: ExecOptions,
    ) -> impl Stream<Item = Result<RowLabeled>> + Send + '_ {
        try_stream! {
            let rows = Connection::query(&mut self.inner, &statement, &options)?;
            for row in rows {
                yield row;
            }
        }
    }

    async fn run_script(&mut self, sql: &str) -> Result<()> {
        Connection::run_script(&mut self.inner, sql)
    }

    async fn begin(&mut self) -> Result<()> {
        Connection::begin(&mut self.inner)
    }

    async fn commit(&mut self) -> Result<()> {
        Connection::commit(&mut self.inner)
    }

    async fn rollback(&mut self) -> Result<()> {
        Connection::rollback(&mut self.inner)
    }
}

/// Hands out owned async connections to one shared store.
#[derive(Clone)]
pub struct MemoryConnectionFactory {
    store: MemoryStore,
}

impl MemoryConnectionFactory {
    pub fn new(store: &MemoryStore) -> Self {
        Self {
            store: store.clone(),
        }
    }
}

impl AsyncConnectionFactory for MemoryConnectionFactory {
    type Connection = MemoryAsyncConnection;

    async fn connect(&self) -> Result<MemoryAsyncConnection> {
        Ok(MemoryAsyncConnection::new(self.store.clone()))
    }
}
