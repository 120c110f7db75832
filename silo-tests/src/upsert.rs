use crate::fixtures::{Address, AddressMeta, ADDRESS_SCHEMA};
use silo_core::{Connection, Database};

/// The first upsert inserts; a second one with the same key updates the
/// existing row from the attempted insert values.
pub fn upsert_inserts_then_updates<C: Connection>(db: &mut Database<C>) {
    db.run_script(ADDRESS_SCHEMA).expect("address schema");
    let a = AddressMeta::new();
    let address = Address {
        address_id: 10,
        street: "STREET 10".to_owned(),
        version: 0,
    };
    db.upsert(&a, &address).expect("insert path");
    let mut changed = address.clone();
    changed.street = "STREET 10b".to_owned();
    db.upsert(&a, &changed).expect("update path");
    let found = db
        .find(&a, a.address_id().eq(10))
        .expect("find address")
        .expect("address 10 exists");
    assert_eq!(found.street, "STREET 10b");
    let all = db
        .select(&a, silo_core::select_from(&a))
        .expect("select all");
    assert_eq!(all.len(), 1);
}

/// Ignore mode keeps the existing row and reports zero affected rows.
pub fn upsert_ignore_keeps_existing<C: Connection>(db: &mut Database<C>) {
    db.run_script(ADDRESS_SCHEMA).expect("address schema");
    let a = AddressMeta::new();
    let address = Address {
        address_id: 11,
        street: "STREET 11".to_owned(),
        version: 0,
    };
    let first = db.upsert_ignore(&a, &address).expect("insert path");
    assert_eq!(first, 1);
    let mut changed = address.clone();
    changed.street = "CHANGED".to_owned();
    let second = db.upsert_ignore(&a, &changed).expect("ignore path");
    assert_eq!(second, 0);
    let found = db
        .find(&a, a.address_id().eq(11))
        .expect("find address")
        .expect("address 11 exists");
    assert_eq!(found.street, "STREET 11");
}
