use crate::{Dialect, DriverError, QueryError, Result};

/// Pseudo dialect for statement previews.
///
/// Quoting, formatting and statement building work; anything that would need
/// a live connection (sequence SQL, the upsert builder, constraint
/// classification) reports [`QueryError::Unsupported`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunDialect;

impl Dialect for DryRunDialect {
    fn as_dyn(&self) -> &dyn Dialect {
        self
    }

    fn name(&self) -> &'static str {
        "dry-run"
    }

    fn is_unique_violation(&self, _error: &DriverError) -> Result<bool> {
        Err(QueryError::Unsupported {
            dialect: self.name(),
            operation: "constraint classification",
        }
        .into())
    }
}
