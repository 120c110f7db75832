use silo_core::{DatabaseConfig, ReactiveDatabase};
use silo_memory::{MemoryConnectionFactory, MemoryDialect, MemoryStore};
use std::sync::Arc;

fn database() -> ReactiveDatabase<MemoryConnectionFactory> {
    let _ = env_logger::builder().is_test(true).try_init();
    let store = MemoryStore::new();
    ReactiveDatabase::new(
        MemoryConnectionFactory::new(&store),
        DatabaseConfig::new(Arc::new(MemoryDialect)),
    )
}

#[tokio::test]
async fn stream_full_drain() {
    silo_tests::streaming::stream_full_drain(&database()).await;
}

#[tokio::test]
async fn stream_cancellation_releases_transaction() {
    silo_tests::streaming::stream_cancellation_releases_transaction(&database()).await;
}

#[tokio::test]
async fn stream_single_column() {
    silo_tests::streaming::stream_single_column(&database()).await;
}

#[tokio::test]
async fn stream_nullable_column() {
    silo_tests::streaming::stream_nullable_column(&database()).await;
}

#[tokio::test]
async fn transaction_isolation() {
    silo_tests::streaming::transaction_isolation(&database()).await;
}

#[tokio::test]
async fn rollback_only_reactive() {
    silo_tests::streaming::rollback_only_reactive(&database()).await;
}

#[tokio::test]
async fn transaction_scoped_stream() {
    silo_tests::streaming::transaction_scoped_stream(&database()).await;
}
