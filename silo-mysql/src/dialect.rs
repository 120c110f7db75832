use silo_core::{
    Dialect, DriverError, InsertContext, QueryError, Result, SetOperator, Statement,
    StatementBuffer, UpsertContext, UpsertMode,
};

/// `ER_DUP_ENTRY`.
const DUP_ENTRY: &str = "1062";

#[derive(Debug, Default, Clone, Copy)]
pub struct MysqlDialect;

impl Dialect for MysqlDialect {
    fn as_dyn(&self) -> &dyn Dialect {
        self
    }

    fn name(&self) -> &'static str {
        "mysql"
    }

    fn open_quote(&self) -> &str {
        "`"
    }

    fn close_quote(&self) -> &str {
        "`"
    }

    /// MySQL 5.7 has neither EXCEPT nor INTERSECT; the builder fails fast
    /// instead of shipping malformed SQL.
    fn supports_set_operation(&self, operator: SetOperator) -> bool {
        matches!(operator, SetOperator::Union | SetOperator::UnionAll)
    }

    fn supports_upsert(&self) -> bool {
        true
    }

    fn is_unique_violation(&self, error: &DriverError) -> Result<bool> {
        Ok(error.code.as_deref() == Some(DUP_ENTRY))
    }

    fn build_upsert(&self, ctx: &UpsertContext) -> Result<Statement> {
        let insert = InsertContext {
            table: ctx.table.clone(),
            columns: ctx.columns.clone(),
            rows: ctx.rows.clone(),
            options: ctx.options.clone(),
        };
        let mut buf = StatementBuffer::new(self.as_dyn());
        match ctx.mode {
            UpsertMode::Ignore => {
                // INSERT IGNORE swallows the duplicate instead of updating.
                if insert.rows.is_empty() || insert.columns.is_empty() {
                    return Err(QueryError::Configuration(format!(
                        "upsert into `{}` has no rows or no columns",
                        ctx.table
                    ))
                    .into());
                }
                buf.push("INSERT IGNORE INTO ");
                buf.push_identifier(&insert.table);
                buf.push(" (");
                for (i, column) in insert.columns.iter().enumerate() {
                    if i > 0 {
                        buf.push(", ");
                    }
                    buf.push_identifier(&column.name);
                }
                buf.push(") VALUES ");
                for (r, row) in insert.rows.iter().enumerate() {
                    if r > 0 {
                        buf.push(", ");
                    }
                    buf.push_char('(');
                    for (i, value) in row.iter().enumerate() {
                        if i > 0 {
                            buf.push(", ");
                        }
                        buf.bind(value.clone());
                    }
                    buf.push_char(')');
                }
            }
            UpsertMode::Update => {
                self.write_insert_values(&mut buf, &insert)?;
                if ctx.update_columns.is_empty() {
                    return Err(QueryError::Configuration(format!(
                        "upsert into `{}` updates no columns",
                        ctx.table
                    ))
                    .into());
                }
                buf.push(" ON DUPLICATE KEY UPDATE ");
                for (i, column) in ctx.update_columns.iter().enumerate() {
                    if i > 0 {
                        buf.push(", ");
                    }
                    buf.push_identifier(&column.name);
                    buf.push(" = VALUES(");
                    buf.push_identifier(&column.name);
                    buf.push_char(')');
                }
            }
        }
        Ok(buf.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use silo_core::{select_from, ColumnDef, EntityMetamodel, Result, RowLabeled, Value};

    struct TagMeta {
        columns: Vec<ColumnDef>,
    }

    impl TagMeta {
        fn new() -> Self {
            Self {
                columns: vec![
                    ColumnDef {
                        primary_key: true,
                        ..ColumnDef::new("id", Value::Int64(None))
                    },
                    ColumnDef::new("name", Value::Varchar(None)),
                ],
            }
        }
    }

    impl EntityMetamodel for TagMeta {
        type Entity = (i64, String);

        fn table_name(&self) -> &str {
            "tag"
        }
        fn columns(&self) -> &[ColumnDef] {
            &self.columns
        }
        fn to_row(&self, entity: &Self::Entity) -> Vec<Value> {
            vec![
                Value::Int64(Some(entity.0)),
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
    fn backtick_quoting() {
        let meta = TagMeta::new();
        let id = meta.column("id").unwrap();
        let node = select_from(&meta).filter(id.eq(7i64));
        let statement = MysqlDialect.build_select(&node.into()).unwrap();
        assert_eq!(
            statement.sql,
            "SELECT `id`, `name` FROM `tag` WHERE `id` = ?"
        );
    }

    #[test]
    fn except_fails_fast() {
        let meta = TagMeta::new();
        let id = meta.column("id").unwrap();
        let left = select_from(&meta).filter(id.eq(1i64));
        let right = select_from(&meta).filter(id.eq(2i64));
        let error = MysqlDialect
            .build_select(&left.except(right))
            .unwrap_err();
        let kind = error.downcast_ref::<QueryError>().unwrap();
        assert!(matches!(kind, QueryError::Unsupported { .. }));
    }

    #[test]
    fn on_duplicate_key_update() {
        let meta = TagMeta::new();
        let table: std::borrow::Cow<'static, str> = "tag".into();
        let ctx = UpsertContext {
            table: table.clone(),
            columns: meta.columns().iter().map(|c| c.expr(table.clone())).collect(),
            rows: vec![vec![
                Value::Int64(Some(1)),
                Value::Varchar(Some("a".to_owned())),
            ]],
            conflict_keys: vec![meta.column("id").unwrap()],
            update_columns: vec![meta.column("name").unwrap()],
            mode: UpsertMode::Update,
            options: Default::default(),
        };
        let statement = MysqlDialect.build_upsert(&ctx).unwrap();
        assert_eq!(
            statement.sql,
            "INSERT INTO `tag` (`id`, `name`) VALUES (?, ?) \
             ON DUPLICATE KEY UPDATE `name` = VALUES(`name`)"
        );
        assert_eq!(statement.binds.len(), 2);
    }
}
