use crate::fixtures::{
    Address, AddressMeta, Person, PersonMeta, ADDRESS_SCHEMA, PERSON_SCHEMA,
};
use silo_core::{Connection, Database, QueryError};

/// Insert then fetch back by id; the returned entity carries the stamped
/// version and equals what a fresh read sees.
pub fn insert_and_find<C: Connection>(db: &mut Database<C>) {
    db.run_script(ADDRESS_SCHEMA).expect("address schema");
    let a = AddressMeta::new();
    let address = Address {
        address_id: 16,
        street: "STREET 16".to_owned(),
        version: 0,
    };
    let inserted = db.insert(&a, &address).expect("insert address");
    assert_eq!(inserted, address);
    let found = db
        .find(&a, a.address_id().eq(16))
        .expect("find address")
        .expect("address 16 exists");
    assert_eq!(found, inserted);
}

pub fn update_bumps_version<C: Connection>(db: &mut Database<C>) {
    db.run_script(ADDRESS_SCHEMA).expect("address schema");
    let a = AddressMeta::new();
    let inserted = db
        .insert(
            &a,
            &Address {
                address_id: 1,
                street: "STREET 1".to_owned(),
                version: 0,
            },
        )
        .expect("insert address");
    let mut changed = inserted.clone();
    changed.street = "STREET 1b".to_owned();
    let updated = db.update(&a, &changed).expect("update address");
    assert_eq!(updated.version, inserted.version + 1);
    assert_eq!(updated.street, "STREET 1b");
    let found = db
        .find(&a, a.address_id().eq(1))
        .expect("find address")
        .expect("address 1 exists");
    assert_eq!(found, updated);
}

/// Updating from a stale version is an optimistic lock conflict, not a
/// silent no-op and not a generic error.
pub fn optimistic_lock_conflict<C: Connection>(db: &mut Database<C>) {
    db.run_script(ADDRESS_SCHEMA).expect("address schema");
    let a = AddressMeta::new();
    let inserted = db
        .insert(
            &a,
            &Address {
                address_id: 2,
                street: "STREET 2".to_owned(),
                version: 0,
            },
        )
        .expect("insert address");
    let mut first = inserted.clone();
    first.street = "STREET 2b".to_owned();
    db.update(&a, &first).expect("first update wins");
    // `inserted` still carries the old version.
    let mut stale = inserted;
    stale.street = "STREET 2c".to_owned();
    let error = db.update(&a, &stale).expect_err("stale update conflicts");
    assert!(matches!(
        error.downcast_ref::<QueryError>(),
        Some(QueryError::OptimisticLock { .. })
    ));
}

pub fn delete_checks_version<C: Connection>(db: &mut Database<C>) {
    db.run_script(ADDRESS_SCHEMA).expect("address schema");
    let a = AddressMeta::new();
    let inserted = db
        .insert(
            &a,
            &Address {
                address_id: 3,
                street: "STREET 3".to_owned(),
                version: 0,
            },
        )
        .expect("insert address");
    let bumped = db.update(&a, &inserted).expect("bump version");
    let error = db.delete(&a, &inserted).expect_err("stale delete conflicts");
    assert!(matches!(
        error.downcast_ref::<QueryError>(),
        Some(QueryError::OptimisticLock { .. })
    ));
    db.delete(&a, &bumped).expect("delete with current version");
    assert!(db
        .find(&a, a.address_id().eq(3))
        .expect("find after delete")
        .is_none());
}

/// A duplicate primary key surfaces as the distinguished unique constraint
/// error kind.
pub fn unique_constraint_violation<C: Connection>(db: &mut Database<C>) {
    db.run_script(ADDRESS_SCHEMA).expect("address schema");
    let a = AddressMeta::new();
    let address = Address {
        address_id: 1,
        street: "STREET 1".to_owned(),
        version: 0,
    };
    db.insert(&a, &address).expect("first insert");
    let error = db.insert(&a, &address).expect_err("duplicate pk");
    assert!(matches!(
        error.downcast_ref::<QueryError>(),
        Some(QueryError::UniqueConstraint(..))
    ));
}

/// The insert hooks stamp creation and update timestamps from the configured
/// clock; both carry the same instant on insert.
pub fn timestamps_stamped_on_insert<C: Connection>(db: &mut Database<C>) {
    db.run_script(PERSON_SCHEMA).expect("person schema");
    let p = PersonMeta::new();
    let inserted = db.insert(&p, &Person::new(1, "ABC")).expect("insert person");
    assert!(inserted.created_at.is_some());
    assert!(inserted.updated_at.is_some());
    assert_eq!(inserted.created_at, inserted.updated_at);
    let found = db
        .find(&p, p.person_id().eq(1))
        .expect("find person")
        .expect("person 1 exists");
    assert_eq!(found, inserted);
}

/// An update re-stamps updated_at but leaves created_at untouched.
pub fn update_keeps_created_at<C: Connection>(db: &mut Database<C>) {
    db.run_script(PERSON_SCHEMA).expect("person schema");
    let p = PersonMeta::new();
    let inserted = db.insert(&p, &Person::new(2, "DEF")).expect("insert person");
    let updated = db.update(&p, &inserted).expect("update person");
    let found = db
        .find(&p, p.person_id().eq(2))
        .expect("find person")
        .expect("person 2 exists");
    assert_eq!(found.created_at, inserted.created_at);
    assert_eq!(found.updated_at, updated.updated_at);
    assert_eq!(found.version, inserted.version + 1);
}
