use crate::Dialect;
use std::{collections::HashMap, sync::Arc};

/// Maps a driver identifier (`postgres`, `mysql`, ...) to its dialect.
///
/// Populated at configuration time; lookups are read-only afterwards.
#[derive(Default, Clone)]
pub struct DialectRegistry {
    entries: HashMap<String, Arc<dyn Dialect>>,
}

impl DialectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, dialect: Arc<dyn Dialect>) {
        self.entries.insert(name.into(), dialect);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Dialect>> {
        self.entries.get(name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
