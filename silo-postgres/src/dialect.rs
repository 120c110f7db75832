use silo_core::{
    format_value_ansi, write_on_conflict_upsert, Dialect, DriverError, Result, Statement,
    UpsertContext, Value,
};

/// SQLSTATE class for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresDialect;

impl Dialect for PostgresDialect {
    fn as_dyn(&self) -> &dyn Dialect {
        self
    }

    fn name(&self) -> &'static str {
        "postgres"
    }

    fn write_placeholder(&self, out: &mut String, index: usize) {
        out.push('$');
        let mut buffer = itoa::Buffer::new();
        out.push_str(buffer.format(index + 1));
    }

    fn supports_sequence(&self) -> bool {
        true
    }

    fn supports_upsert(&self) -> bool {
        true
    }

    fn sequence_next_value_sql(&self, sequence: &str) -> Result<String> {
        Ok(format!("SELECT nextval('{sequence}')"))
    }

    fn is_unique_violation(&self, error: &DriverError) -> Result<bool> {
        Ok(error.code.as_deref() == Some(UNIQUE_VIOLATION))
    }

    fn format_value(&self, value: &Value) -> Result<String> {
        match value {
            // bytea hex literal instead of the X'..' shape.
            Value::Blob(Some(v)) => Ok(format!("'\\x{}'", hex::encode(v))),
            other => format_value_ansi(other),
        }
    }

    fn build_upsert(&self, ctx: &UpsertContext) -> Result<Statement> {
        write_on_conflict_upsert(self, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use silo_core::{select_from, ColumnDef, EntityMetamodel, Result, RowLabeled, Value};

    struct ItemMeta {
        columns: Vec<ColumnDef>,
    }

    impl ItemMeta {
        fn new() -> Self {
            Self {
                columns: vec![
                    ColumnDef {
                        primary_key: true,
                        ..ColumnDef::new("id", Value::Int32(None))
                    },
                    ColumnDef::new("label", Value::Varchar(None)),
                ],
            }
        }
    }

    impl EntityMetamodel for ItemMeta {
        type Entity = (i32, String);

        fn table_name(&self) -> &str {
            "item"
        }
        fn columns(&self) -> &[ColumnDef] {
            &self.columns
        }
        fn to_row(&self, entity: &Self::Entity) -> Vec<Value> {
            vec![
                Value::Int32(Some(entity.0)),
                Value::Varchar(Some(entity.1.clone())),
            ]
        }
        fn from_row(&self, _row: &RowLabeled) -> Result<Self::Entity> {
            unimplemented!("not used in statement tests")
        }
        fn with_value(
            &self,
            entity: &Self::Entity,
            _column: &str,
            _value: Value,
        ) -> Result<Self::Entity> {
            Ok(entity.clone())
        }
    }

    #[test]
    fn numbered_placeholders() {
        let meta = ItemMeta::new();
        let id = meta.column("id").unwrap();
        let label = meta.column("label").unwrap();
        let node = select_from(&meta)
            .filter(id.gt(10))
            .filter(label.eq("a"));
        let statement = PostgresDialect.build_select(&node.into()).unwrap();
        assert_eq!(
            statement.sql,
            "SELECT \"id\", \"label\" FROM \"item\" WHERE \"id\" > $1 AND \"label\" = $2"
        );
        assert_eq!(statement.binds.len(), 2);
    }

    #[test]
    fn classifies_unique_violation() {
        let error = DriverError::new(Some(UNIQUE_VIOLATION.to_owned()), "duplicate key");
        assert!(PostgresDialect.is_unique_violation(&error).unwrap());
        let other = DriverError::new(Some("40001".to_owned()), "serialization");
        assert!(!PostgresDialect.is_unique_violation(&other).unwrap());
    }

    #[test]
    fn sequence_sql() {
        assert_eq!(
            PostgresDialect.sequence_next_value_sql("item_seq").unwrap(),
            "SELECT nextval('item_seq')"
        );
    }
}
