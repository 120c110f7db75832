use silo_core::{
    write_on_conflict_upsert, Dialect, DriverError, Result, Statement, UpsertContext,
};

/// `SQLITE_CONSTRAINT_UNIQUE` and `SQLITE_CONSTRAINT_PRIMARYKEY` extended
/// result codes.
const CONSTRAINT_UNIQUE: &str = "2067";
const CONSTRAINT_PRIMARYKEY: &str = "1555";

#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDialect;

impl Dialect for SqliteDialect {
    fn as_dyn(&self) -> &dyn Dialect {
        self
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn supports_upsert(&self) -> bool {
        true
    }

    fn is_unique_violation(&self, error: &DriverError) -> Result<bool> {
        Ok(matches!(
            error.code.as_deref(),
            Some(CONSTRAINT_UNIQUE) | Some(CONSTRAINT_PRIMARYKEY)
        ) || error.message.contains("UNIQUE constraint failed"))
    }

    fn build_upsert(&self, ctx: &UpsertContext) -> Result<Statement> {
        write_on_conflict_upsert(self, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use silo_core::{ColumnDef, UpsertMode, Value};

    fn upsert_context() -> UpsertContext {
        let table: std::borrow::Cow<'static, str> = "account".into();
        let id = ColumnDef {
            primary_key: true,
            ..ColumnDef::new("id", Value::Int64(None))
        };
        let name = ColumnDef::new("name", Value::Varchar(None));
        let version = ColumnDef {
            version: true,
            ..ColumnDef::new("version", Value::Int32(None))
        };
        UpsertContext {
            table: table.clone(),
            columns: vec![
                id.expr(table.clone()),
                name.expr(table.clone()),
                version.expr(table.clone()),
            ],
            rows: vec![vec![
                Value::Int64(Some(1)),
                Value::Varchar(Some("a".to_owned())),
                Value::Int32(Some(0)),
            ]],
            conflict_keys: vec![id.expr(table.clone())],
            update_columns: vec![name.expr(table.clone()), version.expr(table)],
            mode: UpsertMode::Update,
            options: Default::default(),
        }
    }

    #[test]
    fn on_conflict_do_update() {
        let statement = SqliteDialect.build_upsert(&upsert_context()).unwrap();
        assert_eq!(
            statement.sql,
            "INSERT INTO \"account\" (\"id\", \"name\", \"version\") VALUES (?, ?, ?) \
             ON CONFLICT (\"id\") DO UPDATE SET \"name\" = excluded.\"name\", \
             \"version\" = excluded.\"version\""
        );
        assert_eq!(statement.binds.len(), 3);
    }

    #[test]
    fn classifies_unique_violation_by_message() {
        let error = DriverError::message("UNIQUE constraint failed: account.id");
        assert!(SqliteDialect.is_unique_violation(&error).unwrap());
    }
}
