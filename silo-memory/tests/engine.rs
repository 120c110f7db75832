use silo_core::{Connection, DriverError, ExecOptions, Statement, Value};
use silo_memory::{MemoryStore, UNIQUE_VIOLATION};

fn options() -> ExecOptions {
    ExecOptions::default()
}

#[test]
fn script_then_query() {
    let store = MemoryStore::new();
    let mut connection = store.connect();
    connection
        .run_script(
            "CREATE TABLE t (id INTEGER PRIMARY KEY, name VARCHAR);\n\
             INSERT INTO t (id, name) VALUES (1, 'alpha'), (2, 'beta'), (3, NULL)",
        )
        .expect("script");
    let rows = connection
        .query(
            &Statement::raw("SELECT id, name FROM t WHERE name LIKE 'a%' ORDER BY id ASC"),
            &options(),
        )
        .expect("query");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get_column("id"), Some(&Value::Int32(Some(1))));
    assert_eq!(
        rows[0].get_column("name"),
        Some(&Value::Varchar(Some("alpha".to_owned())))
    );
}

#[test]
fn like_escape_matches_literally() {
    let store = MemoryStore::new();
    let mut connection = store.connect();
    connection
        .run_script(
            "CREATE TABLE t (id INTEGER PRIMARY KEY, v VARCHAR);\n\
             INSERT INTO t (id, v) VALUES (1, '50%'), (2, '50x')",
        )
        .expect("script");
    let rows = connection
        .query(
            &Statement::raw("SELECT id FROM t WHERE v LIKE '50\\%' ESCAPE '\\' ORDER BY id ASC"),
            &options(),
        )
        .expect("query");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get_column("id"), Some(&Value::Int32(Some(1))));
}

#[test]
fn in_and_between() {
    let store = MemoryStore::new();
    let mut connection = store.connect();
    connection
        .run_script(
            "CREATE TABLE t (id INTEGER PRIMARY KEY);\n\
             INSERT INTO t (id) VALUES (1), (2), (3), (4), (5)",
        )
        .expect("script");
    let rows = connection
        .query(
            &Statement::raw("SELECT id FROM t WHERE id IN (2, 4, 9) OR id BETWEEN 4 AND 5 ORDER BY id ASC"),
            &options(),
        )
        .expect("query");
    let ids: Vec<_> = rows
        .iter()
        .map(|r| r.get_column("id").cloned().unwrap())
        .collect();
    assert_eq!(
        ids,
        [
            Value::Int32(Some(2)),
            Value::Int32(Some(4)),
            Value::Int32(Some(5)),
        ]
    );
}

#[test]
fn nulls_sort_first_ascending() {
    let store = MemoryStore::new();
    let mut connection = store.connect();
    connection
        .run_script(
            "CREATE TABLE t (id INTEGER PRIMARY KEY, v INTEGER);\n\
             INSERT INTO t (id, v) VALUES (1, 10), (2, NULL), (3, 5)",
        )
        .expect("script");
    let rows = connection
        .query(
            &Statement::raw("SELECT id, v FROM t ORDER BY v ASC"),
            &options(),
        )
        .expect("query");
    let ids: Vec<_> = rows
        .iter()
        .map(|r| r.get_column("id").cloned().unwrap())
        .collect();
    assert_eq!(
        ids,
        [
            Value::Int32(Some(2)),
            Value::Int32(Some(3)),
            Value::Int32(Some(1)),
        ]
    );
}

#[test]
fn duplicate_key_reports_unique_code() {
    let store = MemoryStore::new();
    let mut connection = store.connect();
    connection
        .run_script("CREATE TABLE t (id INTEGER PRIMARY KEY)")
        .expect("script");
    connection
        .run_script("INSERT INTO t (id) VALUES (1)")
        .expect("first insert");
    let error = connection
        .run_script("INSERT INTO t (id) VALUES (1)")
        .expect_err("duplicate");
    let driver = error.downcast_ref::<DriverError>().expect("driver error");
    assert_eq!(driver.code.as_deref(), Some(UNIQUE_VIOLATION));
}

#[test]
fn bind_placeholders_resolve_in_order() {
    let store = MemoryStore::new();
    let mut connection = store.connect();
    connection
        .run_script(
            "CREATE TABLE t (id INTEGER PRIMARY KEY, v VARCHAR);\n\
             INSERT INTO t (id, v) VALUES (1, 'a'), (2, 'b')",
        )
        .expect("script");
    let mut statement = Statement::raw("SELECT id FROM t WHERE id = ? AND v = ?");
    statement.binds = vec![
        Value::Int32(Some(2)),
        Value::Varchar(Some("b".to_owned())),
    ];
    let rows = connection.query(&statement, &options()).expect("query");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get_column("id"), Some(&Value::Int32(Some(2))));
}
