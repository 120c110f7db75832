use std::fmt::{self, Display, Formatter};
use thiserror::Error;

/// Classified failures surfaced by the query layer.
///
/// Everything travels as [`crate::Error`] (`anyhow`); callers that need to
/// distinguish the kind recover it with `error.downcast_ref::<QueryError>()`.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The dialect cannot map or format the requested value type.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// A mutating statement has no where clause while the guard is enabled.
    #[error(
        "missing WHERE clause on `{table}`; set allow_missing_where_clause to mutate every row"
    )]
    MissingWhereClause { table: String },
    /// The dialect does not provide the requested capability.
    #[error("the {dialect} dialect does not support {operation}")]
    Unsupported {
        dialect: &'static str,
        operation: &'static str,
    },
    /// A unique or primary key constraint was violated, as classified by the dialect.
    #[error("unique constraint violation: {0}")]
    UniqueConstraint(#[source] DriverError),
    /// A versioned update or delete affected no rows.
    #[error("optimistic lock failure on `{table}`: {rows_affected} rows affected")]
    OptimisticLock { table: String, rows_affected: u64 },
}

/// A failure raised by the underlying database driver, carried unchanged
/// through the executor so the dialect can classify it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverError {
    /// Backend specific error code (SQLSTATE, errno, ...), when available.
    pub code: Option<String>,
    pub message: String,
}

impl DriverError {
    pub fn new(code: impl Into<Option<String>>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }
}

impl Display for DriverError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} (code {})", self.message, code),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for DriverError {}
