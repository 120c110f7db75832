use std::time::Duration;

/// Options recognized by select statements and set-operation leaves.
///
/// `allow_missing_where_clause` defaults to true for selects; a leaf that
/// sets it to false is checked individually, even inside a set operation
/// whose top level relaxed the option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOptions {
    pub allow_missing_where_clause: bool,
    /// Driver fetch buffering hint.
    pub fetch_size: Option<u32>,
    pub query_timeout: Option<Duration>,
}

impl Default for SelectOptions {
    fn default() -> Self {
        Self {
            allow_missing_where_clause: true,
            fetch_size: None,
            query_timeout: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsertOptions {
    /// Skip the sequence pre-fetch and leave the id as provided.
    pub disable_sequence_assignment: bool,
    /// Chunk size for multi-row inserts.
    pub batch_size: Option<usize>,
    pub query_timeout: Option<Duration>,
}

/// Mutating statements ship with the guard enabled: building fails on an
/// empty where declaration unless `allow_missing_where_clause` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    pub allow_missing_where_clause: bool,
    pub batch_size: Option<usize>,
    pub query_timeout: Option<Duration>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteOptions {
    pub allow_missing_where_clause: bool,
    pub query_timeout: Option<Duration>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptOptions {
    pub query_timeout: Option<Duration>,
}
