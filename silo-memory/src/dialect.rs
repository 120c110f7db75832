use silo_core::{
    write_on_conflict_upsert, Dialect, DriverError, Result, Statement, UpsertContext,
};

/// Error code the engine attaches to primary key and unique violations.
pub const UNIQUE_VIOLATION: &str = "UNIQUE";

/// Dialect of the embedded in-memory engine: ANSI defaults, `?` placeholders,
/// `ON CONFLICT` upserts and `NEXT VALUE FOR` sequences.
#[derive(Debug, Default, Clone, Copy)]
pub struct MemoryDialect;

impl Dialect for MemoryDialect {
    fn as_dyn(&self) -> &dyn Dialect {
        self
    }

    fn name(&self) -> &'static str {
        "memory"
    }

    fn supports_sequence(&self) -> bool {
        true
    }

    fn supports_upsert(&self) -> bool {
        true
    }

    fn sequence_next_value_sql(&self, sequence: &str) -> Result<String> {
        Ok(format!("SELECT NEXT VALUE FOR {}", self.quote(sequence)))
    }

    fn is_unique_violation(&self, error: &DriverError) -> Result<bool> {
        Ok(error.code.as_deref() == Some(UNIQUE_VIOLATION))
    }

    fn build_upsert(&self, ctx: &UpsertContext) -> Result<Statement> {
        write_on_conflict_upsert(self, ctx)
    }
}
