use crate::{Dialect, Result, Value};
use std::fmt::{self, Display, Formatter};

/// One piece of a built statement: literal SQL text, or a reference to the
/// bind value at the given index.
#[derive(Debug, Clone, PartialEq)]
pub enum StatementFragment {
    Text(String),
    Bind(usize),
}

/// A parameterized SQL statement: final SQL text (with the dialect's
/// placeholder syntax), ordered bind values, and the fragment list the
/// dry-run rendering is produced from.
///
/// The number and order of placeholders always matches `binds`; both are laid
/// down by the same builder pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub binds: Vec<Value>,
    fragments: Vec<StatementFragment>,
}

impl Statement {
    /// A raw statement without bind parameters.
    pub fn raw(sql: impl Into<String>) -> Self {
        let sql = sql.into();
        Self {
            fragments: vec![StatementFragment::Text(sql.clone())],
            sql,
            binds: Vec::new(),
        }
    }

    pub fn fragments(&self) -> &[StatementFragment] {
        &self.fragments
    }

    /// The SQL with bind values inlined as literals.
    ///
    /// For inspection and logging only; the result is never sent to a driver.
    pub fn render(&self, dialect: &dyn Dialect) -> Result<String> {
        let mut out = String::with_capacity(self.sql.len() + self.binds.len() * 8);
        for fragment in &self.fragments {
            match fragment {
                StatementFragment::Text(text) => out.push_str(text),
                StatementFragment::Bind(index) => {
                    out.push_str(&dialect.format_value(&self.binds[*index])?)
                }
            }
        }
        Ok(out)
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Accumulates SQL text and bind values while a statement is built.
pub struct StatementBuffer<'a> {
    dialect: &'a dyn Dialect,
    fragments: Vec<StatementFragment>,
    binds: Vec<Value>,
    text: String,
}

impl<'a> StatementBuffer<'a> {
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        Self {
            dialect,
            fragments: Vec::new(),
            binds: Vec::new(),
            text: String::with_capacity(256),
        }
    }

    pub fn dialect(&self) -> &'a dyn Dialect {
        self.dialect
    }

    pub fn push(&mut self, sql: &str) {
        self.text.push_str(sql);
    }

    pub fn push_char(&mut self, c: char) {
        self.text.push(c);
    }

    pub fn push_identifier(&mut self, name: &str) {
        let mut quoted = String::with_capacity(name.len() + 2);
        self.dialect.write_identifier(&mut quoted, name);
        self.text.push_str(&quoted);
    }

    /// Append a positional bind parameter.
    pub fn bind(&mut self, value: Value) {
        self.flush_text();
        let index = self.binds.len();
        self.fragments.push(StatementFragment::Bind(index));
        self.binds.push(value);
    }

    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            let text = std::mem::take(&mut self.text);
            self.fragments.push(StatementFragment::Text(text));
        }
    }

    pub fn finish(mut self) -> Statement {
        self.flush_text();
        let mut sql = String::new();
        let mut placeholder_index = 0;
        for fragment in &self.fragments {
            match fragment {
                StatementFragment::Text(text) => sql.push_str(text),
                StatementFragment::Bind(_) => {
                    self.dialect.write_placeholder(&mut sql, placeholder_index);
                    placeholder_index += 1;
                }
            }
        }
        Statement {
            sql,
            binds: self.binds,
            fragments: self.fragments,
        }
    }
}
