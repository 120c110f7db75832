use silo_core::{Database, DatabaseConfig, FixedClock};
use silo_memory::{MemoryConnection, MemoryDialect, MemoryStore};
use std::sync::Arc;
use time::macros::datetime;

fn database() -> Database<MemoryConnection> {
    let _ = env_logger::builder().is_test(true).try_init();
    let store = MemoryStore::new();
    Database::new(store.connect(), DatabaseConfig::new(Arc::new(MemoryDialect)))
}

fn database_with_fixed_clock() -> Database<MemoryConnection> {
    let _ = env_logger::builder().is_test(true).try_init();
    let store = MemoryStore::new();
    let config = DatabaseConfig::new(Arc::new(MemoryDialect))
        .with_clock(Arc::new(FixedClock(datetime!(2021-01-01 00:00:00 UTC))));
    Database::new(store.connect(), config)
}

#[test]
fn insert_and_find() {
    silo_tests::crud::insert_and_find(&mut database());
}

#[test]
fn update_bumps_version() {
    silo_tests::crud::update_bumps_version(&mut database());
}

#[test]
fn optimistic_lock_conflict() {
    silo_tests::crud::optimistic_lock_conflict(&mut database());
}

#[test]
fn delete_checks_version() {
    silo_tests::crud::delete_checks_version(&mut database());
}

#[test]
fn unique_constraint_violation() {
    silo_tests::crud::unique_constraint_violation(&mut database());
}

#[test]
fn timestamps_stamped_on_insert() {
    silo_tests::crud::timestamps_stamped_on_insert(&mut database_with_fixed_clock());
}

#[test]
fn update_keeps_created_at() {
    silo_tests::crud::update_keeps_created_at(&mut database_with_fixed_clock());
}

#[test]
fn except_entity() {
    silo_tests::set_operations::except_entity(&mut database());
}

#[test]
fn intersect_entity() {
    silo_tests::set_operations::intersect_entity(&mut database());
}

#[test]
fn union_entity() {
    silo_tests::set_operations::union_entity(&mut database());
}

#[test]
fn union_all_entity() {
    silo_tests::set_operations::union_all_entity(&mut database());
}

#[test]
fn union_columns() {
    silo_tests::set_operations::union_columns(&mut database());
}

#[test]
fn missing_where_top_level_option_is_ignored() {
    silo_tests::set_operations::missing_where_top_level_option_is_ignored(&mut database());
}

#[test]
fn missing_where_leaf_fails() {
    silo_tests::set_operations::missing_where_leaf_fails(&mut database());
}

#[test]
fn commit_makes_writes_visible() {
    silo_tests::transactions::commit_makes_writes_visible(&mut database());
}

#[test]
fn read_your_own_writes() {
    silo_tests::transactions::read_your_own_writes(&mut database());
}

#[test]
fn rollback_only_discards_writes() {
    silo_tests::transactions::rollback_only_discards_writes(&mut database());
}

#[test]
fn error_rolls_back() {
    silo_tests::transactions::error_rolls_back(&mut database());
}

#[test]
fn required_joins_enclosing() {
    silo_tests::transactions::required_joins_enclosing(&mut database());
}

#[test]
fn requires_new_is_independent() {
    silo_tests::transactions::requires_new_is_independent(&mut database());
}

#[test]
fn identity_generator() {
    silo_tests::identity::identity_generator(&mut database());
}

#[test]
fn sequence_generator() {
    silo_tests::identity::sequence_generator(&mut database());
}

#[test]
fn disable_sequence_assignment() {
    silo_tests::identity::disable_sequence_assignment(&mut database());
}

#[test]
fn batch_insert_generates_keys() {
    silo_tests::identity::batch_insert_generates_keys(&mut database());
}

#[test]
fn upsert_inserts_then_updates() {
    silo_tests::upsert::upsert_inserts_then_updates(&mut database());
}

#[test]
fn upsert_ignore_keeps_existing() {
    silo_tests::upsert::upsert_ignore_keeps_existing(&mut database());
}
