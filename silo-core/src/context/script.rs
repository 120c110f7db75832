use crate::ScriptOptions;

/// A raw SQL script: no bind parameters, no result capture.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptContext {
    pub sql: String,
    pub options: ScriptOptions,
}

impl ScriptContext {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            options: ScriptOptions::default(),
        }
    }
}
