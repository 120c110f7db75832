use crate::fixtures::{employees, Employee, EmployeeMeta, EMPLOYEE_SCHEMA};
use futures::{pin_mut, TryStreamExt};
use silo_core::{select_from, AsyncConnectionFactory, ReactiveDatabase};

async fn seed<F: AsyncConnectionFactory>(db: &ReactiveDatabase<F>) {
    db.run_script(EMPLOYEE_SCHEMA).await.expect("employee schema");
    let meta = EmployeeMeta::new();
    db.insert_batch(&meta, &employees())
        .await
        .expect("seed employees");
}

/// Draining a streamed query yields every row in order and commits its
/// transaction exactly once.
pub async fn stream_full_drain<F: AsyncConnectionFactory>(db: &ReactiveDatabase<F>) {
    seed(db).await;
    let e = EmployeeMeta::new();
    let list: Vec<Employee> = db
        .stream_entities(&e, select_from(&e).order_by(e.employee_id().asc()))
        .try_collect()
        .await
        .expect("drain stream");
    assert_eq!(
        list.iter().map(|e| e.employee_id).collect::<Vec<_>>(),
        [1, 2, 3, 4, 5]
    );
}

/// Rows are pulled lazily: consuming only part of the stream and dropping it
/// releases the underlying transaction, so unrelated work proceeds
/// immediately.
pub async fn stream_cancellation_releases_transaction<F: AsyncConnectionFactory>(
    db: &ReactiveDatabase<F>,
) {
    seed(db).await;
    let e = EmployeeMeta::new();
    {
        let stream = db.stream_entities(&e, select_from(&e).order_by(e.employee_id().asc()));
        pin_mut!(stream);
        let first = stream.try_next().await.expect("poll first").expect("a row");
        assert_eq!(first.employee_id, 1);
        // Dropped here, two rows in: cancellation.
    }
    let mut tx = db.begin().await.expect("begin after cancellation");
    tx.insert(
        &e,
        &Employee {
            employee_id: 6,
            employee_name: "EXTRA".to_owned(),
            manager_id: None,
        },
    )
    .await
    .expect("insert in fresh transaction");
    tx.commit().await.expect("commit fresh transaction");
    let all = db.select(&e, select_from(&e)).await.expect("select all");
    assert_eq!(all.len(), 6);
}

/// Single-column streaming: the not-null projection shape.
pub async fn stream_single_column<F: AsyncConnectionFactory>(db: &ReactiveDatabase<F>) {
    seed(db).await;
    let e = EmployeeMeta::new();
    let ids: Vec<i32> = db
        .stream_single::<i32>(
            select_from(&e)
                .columns([e.employee_id()])
                .order_by(e.employee_id().asc()),
        )
        .try_collect()
        .await
        .expect("stream ids");
    assert_eq!(ids, [1, 2, 3, 4, 5]);
}

/// The nullable single-column shape keeps NULLs.
pub async fn stream_nullable_column<F: AsyncConnectionFactory>(db: &ReactiveDatabase<F>) {
    seed(db).await;
    let e = EmployeeMeta::new();
    let managers: Vec<Option<i32>> = db
        .stream_single::<Option<i32>>(
            select_from(&e)
                .columns([e.manager_id()])
                .filter(e.employee_id().in_list([1, 2]))
                .order_by(e.employee_id().asc()),
        )
        .try_collect()
        .await
        .expect("stream managers");
    assert_eq!(managers, [None, Some(1)]);
}

/// Writes inside a reactive transaction are visible to the transaction's own
/// reads and disappear after a rollback.
pub async fn transaction_isolation<F: AsyncConnectionFactory>(db: &ReactiveDatabase<F>) {
    db.run_script(EMPLOYEE_SCHEMA).await.expect("employee schema");
    let e = EmployeeMeta::new();
    let mut tx = db.begin().await.expect("begin");
    tx.insert(
        &e,
        &Employee {
            employee_id: 1,
            employee_name: "TX".to_owned(),
            manager_id: None,
        },
    )
    .await
    .expect("insert inside transaction");
    let inside = tx.select(&e, select_from(&e)).await.expect("read inside");
    assert_eq!(inside.len(), 1);
    tx.rollback().await.expect("rollback");
    let outside = db.select(&e, select_from(&e)).await.expect("read outside");
    assert!(outside.is_empty());
}

/// Marking rollback-only turns the later commit into a rollback.
pub async fn rollback_only_reactive<F: AsyncConnectionFactory>(db: &ReactiveDatabase<F>) {
    db.run_script(EMPLOYEE_SCHEMA).await.expect("employee schema");
    let e = EmployeeMeta::new();
    let mut tx = db.begin().await.expect("begin");
    tx.insert(
        &e,
        &Employee {
            employee_id: 1,
            employee_name: "TX".to_owned(),
            manager_id: None,
        },
    )
    .await
    .expect("insert inside transaction");
    tx.set_rollback_only();
    tx.commit().await.expect("commit degrades to rollback");
    let outside = db.select(&e, select_from(&e)).await.expect("read outside");
    assert!(outside.is_empty());
}

/// A stream opened inside an explicit transaction observes that
/// transaction's uncommitted writes and keeps it open until dropped.
pub async fn transaction_scoped_stream<F: AsyncConnectionFactory>(db: &ReactiveDatabase<F>) {
    db.run_script(EMPLOYEE_SCHEMA).await.expect("employee schema");
    let e = EmployeeMeta::new();
    let mut tx = db.begin().await.expect("begin");
    for (id, name) in [(1, "A"), (2, "B"), (3, "C")] {
        tx.insert(
            &e,
            &Employee {
                employee_id: id,
                employee_name: name.to_owned(),
                manager_id: None,
            },
        )
        .await
        .expect("insert inside transaction");
    }
    {
        let stream = tx.select_stream(&e, select_from(&e).order_by(e.employee_id().asc()));
        pin_mut!(stream);
        let mut seen = 0;
        while let Some(row) = stream.try_next().await.expect("next row") {
            seen += 1;
            assert_eq!(row.employee_id, seen);
        }
        assert_eq!(seen, 3);
    }
    tx.commit().await.expect("commit");
    let all = db.select(&e, select_from(&e)).await.expect("select all");
    assert_eq!(all.len(), 3);
}
