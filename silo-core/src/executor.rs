use crate::{Result, RowLabeled, Statement, Value};
use futures::Stream;
use std::{future::Future, time::Duration};

/// Outcome of a mutating statement.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct ExecuteResult {
    pub rows_affected: u64,
    /// Database generated key values (identity columns), in insertion order.
    pub generated_keys: Vec<Value>,
}

/// Per-call execution hints derived from the operation options.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecOptions {
    pub fetch_size: Option<u32>,
    pub query_timeout: Option<Duration>,
}

/// Contract the core requires from a blocking database driver.
///
/// A connection owns one database session. Drivers raise database-level
/// failures as [`crate::DriverError`] wrapped in [`crate::Error`], so the
/// dialect can classify them.
///
/// `begin` always starts an independent transaction, suspending any
/// transaction already open on the session; joining an active transaction is
/// the transaction manager's business and never reaches the driver.
pub trait Connection: Send {
    fn execute(&mut self, statement: &Statement, options: &ExecOptions) -> Result<ExecuteResult>;

    /// Run a query and materialize every row.
    fn query(&mut self, statement: &Statement, options: &ExecOptions) -> Result<Vec<RowLabeled>>;

    /// Run a raw multi-statement script with no binds and no result capture.
    fn run_script(&mut self, sql: &str) -> Result<()>;

    fn begin(&mut self) -> Result<()>;
    fn commit(&mut self) -> Result<()>;
    fn rollback(&mut self) -> Result<()>;
}

/// Contract the core requires from a non-blocking database driver.
///
/// `query` returns a lazily pulled, single-pass, finite row stream: no row is
/// produced until the consumer polls, and dropping the stream releases the
/// cursor. Dropping a connection with an open transaction must discard the
/// uncommitted work, which is what makes cancellation deterministic.
pub trait AsyncConnection: Send {
    fn execute(
        &mut self,
        statement: &Statement,
        options: &ExecOptions,
    ) -> impl Future<Output = Result<ExecuteResult>> + Send;

    fn query(
        &mut self,
        statement: Statement,
        options: ExecOptions,
    ) -> impl Stream<Item = Result<RowLabeled>> + Send + '_;

    fn run_script(&mut self, sql: &str) -> impl Future<Output = Result<()>> + Send;

    fn begin(&mut self) -> impl Future<Output = Result<()>> + Send;
    fn commit(&mut self) -> impl Future<Output = Result<()>> + Send;
    fn rollback(&mut self) -> impl Future<Output = Result<()>> + Send;
}

/// Produces owned connections for the reactive facade; transaction-scoped
/// streams each own one connection for their whole lifetime.
pub trait AsyncConnectionFactory: Send + Sync {
    type Connection: AsyncConnection + 'static;

    fn connect(&self) -> impl Future<Output = Result<Self::Connection>> + Send;
}
