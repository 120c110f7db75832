use crate::fixtures::{seed_employees, Address, AddressMeta, EmployeeMeta, ADDRESS_SCHEMA};
use silo_core::{asc, select_from, Connection, Database, QueryError, SelectOptions};

/// employees {1..5} EXCEPT {2,4,6,8} ordered by id is {1,3,5}.
pub fn except_entity<C: Connection>(db: &mut Database<C>) {
    seed_employees(db);
    let e = EmployeeMeta::new();
    let q1 = select_from(&e).filter(e.employee_id().in_list([1, 2, 3, 4, 5]));
    let q2 = select_from(&e).filter(e.employee_id().in_list([2, 4, 6, 8]));
    let query = q1.except(q2).order_by(e.employee_id().asc());
    let list = db.select(&e, query).expect("except query");
    assert_eq!(
        list.iter().map(|e| e.employee_id).collect::<Vec<_>>(),
        [1, 3, 5]
    );
}

/// INTERSECT keeps only the rows present in both branches.
pub fn intersect_entity<C: Connection>(db: &mut Database<C>) {
    seed_employees(db);
    let e = EmployeeMeta::new();
    let q1 = select_from(&e).filter(e.employee_id().in_list([1, 2, 3, 4, 5]));
    let q2 = select_from(&e).filter(e.employee_id().in_list([2, 4, 6, 8]));
    let query = q1.intersect(q2).order_by(e.employee_id().asc());
    let list = db.select(&e, query).expect("intersect query");
    assert_eq!(
        list.iter().map(|e| e.employee_id).collect::<Vec<_>>(),
        [2, 4]
    );
}

/// UNION removes the duplicate row; ordering applies across both branches.
pub fn union_entity<C: Connection>(db: &mut Database<C>) {
    seed_employees(db);
    let e = EmployeeMeta::new();
    let q1 = select_from(&e).filter(e.employee_id().eq(1));
    let q2 = select_from(&e).filter(e.employee_id().eq(1));
    let q3 = select_from(&e).filter(e.employee_id().eq(5));
    let query = q1.union(q2).union(q3).order_by(e.employee_id().desc());
    let list = db.select(&e, query).expect("union query");
    assert_eq!(
        list.iter().map(|e| e.employee_id).collect::<Vec<_>>(),
        [5, 1]
    );
}

/// UNION ALL keeps the duplicate.
pub fn union_all_entity<C: Connection>(db: &mut Database<C>) {
    seed_employees(db);
    let e = EmployeeMeta::new();
    let q1 = select_from(&e).filter(e.employee_id().eq(1));
    let q2 = select_from(&e).filter(e.employee_id().eq(1));
    let q3 = select_from(&e).filter(e.employee_id().eq(5));
    let query = q1.union_all(q2).union_all(q3).order_by(e.employee_id().desc());
    let list = db.select(&e, query).expect("union all query");
    assert_eq!(
        list.iter().map(|e| e.employee_id).collect::<Vec<_>>(),
        [5, 1, 1]
    );
}

/// Heterogeneous selects union under shared aliases, ordered by alias.
pub fn union_columns<C: Connection>(db: &mut Database<C>) {
    seed_employees(db);
    db.run_script(ADDRESS_SCHEMA).expect("address schema");
    let a = AddressMeta::new();
    for id in [2, 3] {
        db.insert(
            &a,
            &Address {
                address_id: id,
                street: format!("STREET {id}"),
                version: 0,
            },
        )
        .expect("insert address");
    }
    let e = EmployeeMeta::new();
    let q1 = select_from(&e)
        .columns([
            e.employee_id().alias("ID"),
            e.employee_name().alias("NAME"),
        ])
        .filter(e.employee_id().eq(1));
    let q2 = select_from(&a)
        .columns([a.address_id().alias("ID"), a.street().alias("NAME")])
        .filter(a.address_id().eq(2));
    let q3 = select_from(&a)
        .columns([a.address_id().alias("ID"), a.street().alias("NAME")])
        .filter(a.address_id().eq(3));
    let query = q1.union(q2).union(q3).order_by(asc("ID"));
    let list: Vec<(i32, String)> = db.select_pair(query).expect("union columns");
    assert_eq!(
        list,
        [
            (1, "SMITH".to_owned()),
            (2, "STREET 2".to_owned()),
            (3, "STREET 3".to_owned()),
        ]
    );
}

/// Relaxing the guard at the top of a set operation does not propagate to
/// the leaves: each leaf is checked against its own options.
pub fn missing_where_top_level_option_is_ignored<C: Connection>(db: &mut Database<C>) {
    seed_employees(db);
    let e = EmployeeMeta::new();
    let q1 = select_from(&e).filter(e.employee_id().eq(1));
    let q2 = select_from(&e);
    let query = q1.union(q2).options(|options| SelectOptions {
        allow_missing_where_clause: false,
        ..options
    });
    let list = db.select(&e, query).expect("top level option is ignored");
    assert_eq!(list.len(), 5);
}

/// A leaf that explicitly forbids a missing where clause fails the build
/// before anything reaches the executor.
pub fn missing_where_leaf_fails<C: Connection>(db: &mut Database<C>) {
    seed_employees(db);
    let e = EmployeeMeta::new();
    let q1 = select_from(&e).filter(e.employee_id().eq(1));
    let q2 = select_from(&e).options(|options| SelectOptions {
        allow_missing_where_clause: false,
        ..options
    });
    let error = db.select(&e, q1.union(q2)).expect_err("leaf guard fires");
    assert!(matches!(
        error.downcast_ref::<QueryError>(),
        Some(QueryError::MissingWhereClause { .. })
    ));
}
