use silo_core::{
    select_from, ColumnDef, DeleteContext, DeleteOptions, Dialect, DryRunDialect, DriverError,
    EntityMetamodel, Operand, QueryError, Result, RowLabeled, SelectOptions, UpdateContext,
    UpdateOptions, Value,
};

struct BookMeta {
    columns: Vec<ColumnDef>,
}

impl BookMeta {
    fn new() -> Self {
        Self {
            columns: vec![
                ColumnDef {
                    primary_key: true,
                    ..ColumnDef::new("id", Value::Int32(None))
                },
                ColumnDef::new("title", Value::Varchar(None)),
                ColumnDef {
                    nullable: true,
                    ..ColumnDef::new("pages", Value::Int32(None))
                },
            ],
        }
    }
}

impl EntityMetamodel for BookMeta {
    type Entity = (i32, String, Option<i32>);

    fn table_name(&self) -> &str {
        "book"
    }

    fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    fn to_row(&self, entity: &Self::Entity) -> Vec<Value> {
        vec![
            Value::Int32(Some(entity.0)),
            Value::Varchar(Some(entity.1.clone())),
            Value::Int32(entity.2),
        ]
    }

    fn from_row(&self, _row: &RowLabeled) -> Result<Self::Entity> {
        unimplemented!("not used in builder tests")
    }

    fn with_value(&self, entity: &Self::Entity, _column: &str, _value: Value) -> Result<Self::Entity> {
        Ok(entity.clone())
    }
}

#[test]
fn building_is_deterministic() {
    let meta = BookMeta::new();
    let title = meta.column("title").unwrap();
    let id = meta.column("id").unwrap();
    let node = select_from(&meta)
        .filter(title.contains("sql"))
        .filter(id.in_list([1, 2, 3]))
        .order_by(id.desc())
        .limit(10)
        .offset(5);
    let first = DryRunDialect.build_select(&node.clone().into()).unwrap();
    let second = DryRunDialect.build_select(&node.into()).unwrap();
    assert_eq!(first.sql, second.sql);
    assert_eq!(first.binds, second.binds);
}

#[test]
fn select_clause_assembly() {
    let meta = BookMeta::new();
    let id = meta.column("id").unwrap();
    let node = select_from(&meta)
        .filter(id.ge(10))
        .order_by(id.asc())
        .limit(3)
        .offset(6);
    let statement = DryRunDialect.build_select(&node.into()).unwrap();
    assert_eq!(
        statement.sql,
        "SELECT \"id\", \"title\", \"pages\" FROM \"book\" \
         WHERE \"id\" >= ? ORDER BY \"id\" ASC LIMIT 3 OFFSET 6"
    );
    assert_eq!(statement.binds, vec![Value::Int32(Some(10))]);
}

#[test]
fn literals_become_positional_binds() {
    let meta = BookMeta::new();
    let id = meta.column("id").unwrap();
    let title = meta.column("title").unwrap();
    let node = select_from(&meta)
        .filter(id.between(1, 9))
        .filter(title.eq("x"));
    let statement = DryRunDialect.build_select(&node.into()).unwrap();
    let placeholders = statement.sql.matches('?').count();
    assert_eq!(placeholders, statement.binds.len());
    assert_eq!(statement.binds.len(), 3);
}

#[test]
fn update_without_where_fails() {
    let meta = BookMeta::new();
    let title = meta.column("title").unwrap();
    let ctx = UpdateContext::new("book").set(title.clone(), "new title");
    let error = DryRunDialect.build_update(&ctx).unwrap_err();
    assert!(matches!(
        error.downcast_ref::<QueryError>(),
        Some(QueryError::MissingWhereClause { .. })
    ));
    let permitted = UpdateContext::new("book")
        .set(title, "new title")
        .options(|options| UpdateOptions {
            allow_missing_where_clause: true,
            ..options
        });
    assert!(DryRunDialect.build_update(&permitted).is_ok());
}

#[test]
fn delete_without_where_fails() {
    let ctx = DeleteContext::new("book");
    let error = DryRunDialect.build_delete(&ctx).unwrap_err();
    assert!(matches!(
        error.downcast_ref::<QueryError>(),
        Some(QueryError::MissingWhereClause { .. })
    ));
    let permitted = DeleteContext::new("book").options(|options| DeleteOptions {
        allow_missing_where_clause: true,
        ..options
    });
    assert!(DryRunDialect.build_delete(&permitted).is_ok());
}

/// The guard is evaluated per leaf of a set operation tree; relaxing it at
/// the top level does not reach into the leaves, and a leaf that opts in to
/// the check fails the whole build.
#[test]
fn set_operation_guard_is_per_leaf() {
    let meta = BookMeta::new();
    let id = meta.column("id").unwrap();
    let filtered = select_from(&meta).filter(id.eq(1));
    let open = select_from(&meta);
    let relaxed_top = filtered
        .clone()
        .union(open.clone())
        .options(|options| SelectOptions {
            allow_missing_where_clause: false,
            ..options
        });
    assert!(DryRunDialect.build_select(&relaxed_top).is_ok());

    let strict_leaf = open.options(|options| SelectOptions {
        allow_missing_where_clause: false,
        ..options
    });
    let error = DryRunDialect
        .build_select(&filtered.union(strict_leaf))
        .unwrap_err();
    assert!(matches!(
        error.downcast_ref::<QueryError>(),
        Some(QueryError::MissingWhereClause { .. })
    ));
}

#[test]
fn dry_run_inlines_literals() {
    let meta = BookMeta::new();
    let title = meta.column("title").unwrap();
    let node = select_from(&meta).filter(title.eq("O'Brien"));
    let statement = DryRunDialect.build_select(&node.into()).unwrap();
    let rendered = statement.render(&DryRunDialect).unwrap();
    assert!(rendered.ends_with("WHERE \"title\" = 'O''Brien'"));
    // The executable SQL still carries the placeholder.
    assert!(statement.sql.contains('?'));
}

#[test]
fn like_patterns_are_escaped_at_build_time() {
    let meta = BookMeta::new();
    let title = meta.column("title").unwrap();
    let node = select_from(&meta).filter(title.starts_with("50%_x"));
    let statement = DryRunDialect.build_select(&node.into()).unwrap();
    assert!(statement.sql.ends_with("\"title\" LIKE ? ESCAPE '\\'"));
    assert_eq!(
        statement.binds,
        vec![Value::Varchar(Some("50\\%\\_x%".to_owned()))]
    );
}

#[test]
fn arithmetic_operands_parenthesize() {
    let meta = BookMeta::new();
    let pages = meta.column("pages").unwrap();
    let node = select_from(&meta).filter(
        silo_core::Criterion::Greater(pages.add(10), Operand::Value(Value::Int32(Some(100)))),
    );
    let statement = DryRunDialect.build_select(&node.into()).unwrap();
    assert!(statement.sql.contains("(\"pages\" + ?) > ?"));
}

#[test]
fn dry_run_dialect_refuses_live_capabilities() {
    let sequence = DryRunDialect.sequence_next_value_sql("book_seq").unwrap_err();
    assert!(matches!(
        sequence.downcast_ref::<QueryError>(),
        Some(QueryError::Unsupported { .. })
    ));
    let classification = DryRunDialect
        .is_unique_violation(&DriverError::message("anything"))
        .unwrap_err();
    assert!(matches!(
        classification.downcast_ref::<QueryError>(),
        Some(QueryError::Unsupported { .. })
    ));
}

#[test]
fn quoting_and_escaping() {
    let dialect = DryRunDialect;
    assert_eq!(dialect.quote("schema.table"), "\"schema\".\"table\"");
    assert_eq!(dialect.quote("weird\"name"), "\"weird\"\"name\"");
    assert_eq!(dialect.escape("50%_x\\"), "50\\%\\_x\\\\");
}
