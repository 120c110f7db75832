use silo_core::Value;
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

/// One column of an in-memory table.
#[derive(Debug, Clone)]
pub(crate) struct ColumnMeta {
    pub name: String,
    /// Prototype value carrying the semantic type.
    pub prototype: Value,
    pub nullable: bool,
    pub primary_key: bool,
    pub unique: bool,
    /// Identity column: assigned from the table counter when omitted.
    pub identity: bool,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Table {
    pub columns: Vec<ColumnMeta>,
    pub rows: Vec<Vec<Value>>,
    pub next_identity: i64,
}

impl Table {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Sequence {
    pub next: i64,
    pub increment: i64,
}

/// The committed state: every table with its rows.
///
/// Cloning it is what transactions are made of — a working copy is taken on
/// `begin` and published back on `commit`.
#[derive(Debug, Clone, Default)]
pub(crate) struct StoreInner {
    pub tables: BTreeMap<String, Table>,
}

/// A shared in-memory database.
///
/// Sequences live outside the transactional state: a fetched sequence value
/// never rolls back, matching what real databases guarantee.
#[derive(Clone, Default)]
pub struct MemoryStore {
    pub(crate) committed: Arc<Mutex<StoreInner>>,
    pub(crate) sequences: Arc<Mutex<BTreeMap<String, Sequence>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a blocking connection to this store.
    pub fn connect(&self) -> crate::MemoryConnection {
        crate::MemoryConnection::new(self.clone())
    }

    /// Open a non-blocking connection to this store.
    pub fn connect_async(&self) -> crate::MemoryAsyncConnection {
        crate::MemoryAsyncConnection::new(self.clone())
    }
}
