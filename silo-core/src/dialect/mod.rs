mod dry_run;
mod upsert;

pub use dry_run::*;
pub use upsert::*;

use crate::{
    ArithmeticOp, Criterion, DeleteContext, DriverError, InsertContext, LikePattern, Operand,
    QueryError, Result, ScriptContext, SelectContext, SelectNode, SetOperator, SortItem, SortKey,
    SortOrder, Statement, StatementBuffer, UpdateContext, UpsertContext, Value,
};
use regex::Regex;
use std::sync::OnceLock;
use time::macros::format_description;

fn default_escape_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[\\%_]").expect("escape pattern"))
}

/// Generic ANSI literal formatting, shared by the dialect defaults and by
/// overrides that only special-case a few types.
pub fn format_value_ansi(value: &Value) -> Result<String> {
    let formatted = match value {
        Value::Null => "NULL".to_owned(),
        Value::Boolean(Some(v)) => if *v { "TRUE" } else { "FALSE" }.to_owned(),
        Value::Int16(Some(v)) => itoa::Buffer::new().format(*v).to_owned(),
        Value::Int32(Some(v)) => itoa::Buffer::new().format(*v).to_owned(),
        Value::Int64(Some(v)) => itoa::Buffer::new().format(*v).to_owned(),
        Value::Float32(Some(v)) => ryu::Buffer::new().format(*v).to_owned(),
        Value::Float64(Some(v)) => ryu::Buffer::new().format(*v).to_owned(),
        Value::Decimal(Some(v)) => v.to_string(),
        Value::Varchar(Some(v)) => format!("'{}'", v.replace('\'', "''")),
        Value::Blob(Some(v)) => format!("X'{}'", hex::encode_upper(v)),
        Value::Date(Some(v)) => {
            let text = v
                .format(format_description!("[year]-[month]-[day]"))
                .map_err(|e| QueryError::Configuration(e.to_string()))?;
            format!("DATE '{text}'")
        }
        Value::Time(Some(v)) => {
            let text = v
                .format(format_description!("[hour]:[minute]:[second]"))
                .map_err(|e| QueryError::Configuration(e.to_string()))?;
            format!("TIME '{text}'")
        }
        Value::Timestamp(Some(v)) => {
            let text = v
                .format(format_description!(
                    "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:6]"
                ))
                .map_err(|e| QueryError::Configuration(e.to_string()))?;
            format!("TIMESTAMP '{text}'")
        }
        Value::TimestampWithTimezone(Some(v)) => {
            let text = v
                .format(format_description!(
                    "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:6] \
                     [offset_hour sign:mandatory]:[offset_minute]"
                ))
                .map_err(|e| QueryError::Configuration(e.to_string()))?;
            format!("TIMESTAMP '{text}'")
        }
        Value::Uuid(Some(v)) => format!("'{v}'"),
        // A typed NULL formats like a plain one.
        _ => "NULL".to_owned(),
    };
    Ok(formatted)
}

/// Everything that varies between database products: identifier quoting, LIKE
/// escaping, literal formatting, capability flags, sequence SQL, upsert shape
/// and driver error classification — plus the statement builder itself.
///
/// The default method bodies implement the generic ANSI builder; a dialect
/// overrides only the pieces that differ. Building is a pure function of
/// context and dialect: the same inputs always produce the same SQL text and
/// the same bind order.
pub trait Dialect: Send + Sync {
    fn as_dyn(&self) -> &dyn Dialect;

    fn name(&self) -> &'static str;

    fn open_quote(&self) -> &str {
        "\""
    }

    fn close_quote(&self) -> &str {
        "\""
    }

    /// Escape character used for LIKE patterns.
    fn escape_char(&self) -> char {
        '\\'
    }

    /// Precompiled pattern matching the escape character and the LIKE
    /// wildcards. Dialects with a different escape character override this
    /// together with [`Dialect::escape_char`].
    fn escape_pattern(&self) -> &Regex {
        default_escape_pattern()
    }

    /// Escape LIKE wildcards in `text` so it matches literally.
    fn escape(&self, text: &str) -> String {
        let escape = self.escape_char();
        self.escape_pattern()
            .replace_all(text, |captures: &regex::Captures| {
                format!("{}{}", escape, &captures[0])
            })
            .into_owned()
    }

    /// Quote a possibly dotted identifier path.
    fn quote(&self, name: &str) -> String {
        let mut out = String::with_capacity(name.len() + 4);
        for (i, part) in name.split('.').enumerate() {
            if i > 0 {
                out.push('.');
            }
            self.write_identifier(&mut out, part);
        }
        out
    }

    /// Quote a single identifier, doubling any embedded closing quote.
    fn write_identifier(&self, out: &mut String, name: &str) {
        let close = self.close_quote();
        out.push_str(self.open_quote());
        if name.contains(close) {
            out.push_str(&name.replace(close, &format!("{close}{close}")));
        } else {
            out.push_str(name);
        }
        out.push_str(close);
    }

    /// Bind parameter placeholder; `index` is zero based.
    fn write_placeholder(&self, out: &mut String, _index: usize) {
        out.push('?');
    }

    fn supports_set_operation(&self, _operator: SetOperator) -> bool {
        true
    }

    fn supports_sequence(&self) -> bool {
        false
    }

    fn supports_upsert(&self) -> bool {
        false
    }

    /// SQL fetching the next value of a named sequence.
    fn sequence_next_value_sql(&self, _sequence: &str) -> Result<String> {
        Err(QueryError::Unsupported {
            dialect: self.name(),
            operation: "sequences",
        }
        .into())
    }

    /// Whether the driver error reports a unique or primary key violation.
    fn is_unique_violation(&self, error: &DriverError) -> Result<bool>;

    /// Human readable literal for dry-run renderings; total over the
    /// supported value set, a [`QueryError::Configuration`] otherwise.
    fn format_value(&self, value: &Value) -> Result<String> {
        format_value_ansi(value)
    }

    // ---- statement building ----

    fn build_select(&self, node: &SelectNode) -> Result<Statement> {
        let mut buf = StatementBuffer::new(self.as_dyn());
        self.write_select_node(&mut buf, node)?;
        Ok(buf.finish())
    }

    fn write_select_node(&self, buf: &mut StatementBuffer<'_>, node: &SelectNode) -> Result<()> {
        match node {
            SelectNode::Select(ctx) => self.write_select(buf, ctx),
            SelectNode::SetOperation(set) => {
                if !self.supports_set_operation(set.operator) {
                    return Err(QueryError::Unsupported {
                        dialect: self.name(),
                        operation: set.operator.keyword(),
                    }
                    .into());
                }
                buf.push_char('(');
                self.write_select_node(buf, &set.left)?;
                buf.push_char(')');
                buf.push_char(' ');
                buf.push(set.operator.keyword());
                buf.push_char(' ');
                buf.push_char('(');
                self.write_select_node(buf, &set.right)?;
                buf.push_char(')');
                if !set.order_by.is_empty() {
                    buf.push(" ORDER BY ");
                    self.write_sort_items(buf, &set.order_by, false)?;
                }
                Ok(())
            }
        }
    }

    fn write_select(&self, buf: &mut StatementBuffer<'_>, ctx: &SelectContext) -> Result<()> {
        if !ctx.options.allow_missing_where_clause && ctx.where_clause.is_empty() {
            return Err(QueryError::MissingWhereClause {
                table: ctx.table.to_string(),
            }
            .into());
        }
        if ctx.projection.is_empty() {
            return Err(QueryError::Configuration(format!(
                "select on `{}` has an empty projection",
                ctx.table
            ))
            .into());
        }
        let qualify = !ctx.joins.is_empty();
        buf.push("SELECT ");
        if ctx.distinct {
            buf.push("DISTINCT ");
        }
        for (i, column) in ctx.projection.expressions().iter().enumerate() {
            if i > 0 {
                buf.push(", ");
            }
            self.write_column(buf, &column.table, &column.name, qualify);
            if let Some(alias) = &column.alias {
                buf.push(" AS ");
                buf.push_identifier(alias);
            }
        }
        buf.push(" FROM ");
        buf.push_identifier(&ctx.table);
        for join in &ctx.joins {
            buf.push(match join.kind {
                crate::JoinKind::Inner => " INNER JOIN ",
                crate::JoinKind::Left => " LEFT JOIN ",
            });
            buf.push_identifier(&join.table);
            buf.push(" ON ");
            self.write_criteria(buf, &join.on, true)?;
        }
        if !ctx.where_clause.is_empty() {
            buf.push(" WHERE ");
            self.write_criteria(buf, &ctx.where_clause, qualify)?;
        }
        if !ctx.group_by.is_empty() {
            buf.push(" GROUP BY ");
            for (i, column) in ctx.group_by.iter().enumerate() {
                if i > 0 {
                    buf.push(", ");
                }
                self.write_column(buf, &column.table, &column.name, qualify);
            }
        }
        if !ctx.having.is_empty() {
            buf.push(" HAVING ");
            self.write_criteria(buf, &ctx.having, qualify)?;
        }
        if !ctx.order_by.is_empty() {
            buf.push(" ORDER BY ");
            self.write_sort_items(buf, &ctx.order_by, qualify)?;
        }
        self.write_pagination(buf, ctx.limit, ctx.offset);
        Ok(())
    }

    fn write_column(&self, buf: &mut StatementBuffer<'_>, table: &str, name: &str, qualify: bool) {
        if qualify && !table.is_empty() {
            buf.push_identifier(table);
            buf.push_char('.');
        }
        buf.push_identifier(name);
    }

    fn write_sort_items(
        &self,
        buf: &mut StatementBuffer<'_>,
        items: &[SortItem],
        qualify: bool,
    ) -> Result<()> {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                buf.push(", ");
            }
            match &item.key {
                SortKey::Column(column) => {
                    self.write_column(buf, &column.table, &column.name, qualify)
                }
                SortKey::Alias(alias) => buf.push_identifier(alias),
            }
            buf.push(match item.order {
                SortOrder::Asc => " ASC",
                SortOrder::Desc => " DESC",
            });
        }
        Ok(())
    }

    fn write_pagination(&self, buf: &mut StatementBuffer<'_>, limit: Option<u64>, offset: Option<u64>) {
        let mut buffer = itoa::Buffer::new();
        if let Some(limit) = limit {
            buf.push(" LIMIT ");
            buf.push(buffer.format(limit));
        }
        if let Some(offset) = offset {
            buf.push(" OFFSET ");
            buf.push(buffer.format(offset));
        }
    }

    fn write_criteria(
        &self,
        buf: &mut StatementBuffer<'_>,
        criteria: &[Criterion],
        qualify: bool,
    ) -> Result<()> {
        for (i, criterion) in criteria.iter().enumerate() {
            if i > 0 {
                buf.push(" AND ");
            }
            self.write_criterion(buf, criterion, qualify)?;
        }
        Ok(())
    }

    fn write_criterion(
        &self,
        buf: &mut StatementBuffer<'_>,
        criterion: &Criterion,
        qualify: bool,
    ) -> Result<()> {
        match criterion {
            Criterion::Eq(l, r) => self.write_comparison(buf, l, " = ", r, qualify)?,
            Criterion::NotEq(l, r) => self.write_comparison(buf, l, " <> ", r, qualify)?,
            Criterion::Less(l, r) => self.write_comparison(buf, l, " < ", r, qualify)?,
            Criterion::LessEq(l, r) => self.write_comparison(buf, l, " <= ", r, qualify)?,
            Criterion::Greater(l, r) => self.write_comparison(buf, l, " > ", r, qualify)?,
            Criterion::GreaterEq(l, r) => self.write_comparison(buf, l, " >= ", r, qualify)?,
            Criterion::IsNull(target) => {
                self.write_operand(buf, target, qualify)?;
                buf.push(" IS NULL");
            }
            Criterion::IsNotNull(target) => {
                self.write_operand(buf, target, qualify)?;
                buf.push(" IS NOT NULL");
            }
            Criterion::Like {
                target,
                pattern,
                negate,
            } => {
                self.write_operand(buf, target, qualify)?;
                buf.push(if *negate { " NOT LIKE " } else { " LIKE " });
                let (text, escaped) = match pattern {
                    LikePattern::Raw(text) => (text.clone(), false),
                    LikePattern::StartsWith(text) => (format!("{}%", self.escape(text)), true),
                    LikePattern::Contains(text) => (format!("%{}%", self.escape(text)), true),
                    LikePattern::EndsWith(text) => (format!("%{}", self.escape(text)), true),
                };
                buf.bind(Value::Varchar(Some(text)));
                if escaped {
                    buf.push(" ESCAPE '");
                    buf.push_char(self.escape_char());
                    buf.push_char('\'');
                }
            }
            Criterion::Between {
                target,
                lower,
                upper,
            } => {
                self.write_operand(buf, target, qualify)?;
                buf.push(" BETWEEN ");
                self.write_operand(buf, lower, qualify)?;
                buf.push(" AND ");
                self.write_operand(buf, upper, qualify)?;
            }
            Criterion::InList { target, values } => {
                if values.is_empty() {
                    // An empty IN list matches nothing.
                    buf.push("1 = 0");
                    return Ok(());
                }
                self.write_operand(buf, target, qualify)?;
                buf.push(" IN (");
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        buf.push(", ");
                    }
                    self.write_operand(buf, value, qualify)?;
                }
                buf.push_char(')');
            }
            Criterion::And(criteria) => {
                if criteria.is_empty() {
                    buf.push("1 = 1");
                    return Ok(());
                }
                buf.push_char('(');
                self.write_criteria(buf, criteria, qualify)?;
                buf.push_char(')');
            }
            Criterion::Or(criteria) => {
                if criteria.is_empty() {
                    buf.push("1 = 0");
                    return Ok(());
                }
                buf.push_char('(');
                for (i, criterion) in criteria.iter().enumerate() {
                    if i > 0 {
                        buf.push(" OR ");
                    }
                    self.write_criterion(buf, criterion, qualify)?;
                }
                buf.push_char(')');
            }
            Criterion::Not(inner) => {
                buf.push("NOT (");
                self.write_criterion(buf, inner, qualify)?;
                buf.push_char(')');
            }
        }
        Ok(())
    }

    fn write_comparison(
        &self,
        buf: &mut StatementBuffer<'_>,
        lhs: &Operand,
        op: &str,
        rhs: &Operand,
        qualify: bool,
    ) -> Result<()> {
        self.write_operand(buf, lhs, qualify)?;
        buf.push(op);
        self.write_operand(buf, rhs, qualify)
    }

    fn write_operand(
        &self,
        buf: &mut StatementBuffer<'_>,
        operand: &Operand,
        qualify: bool,
    ) -> Result<()> {
        match operand {
            Operand::Column(column) => {
                self.write_column(buf, &column.table, &column.name, qualify)
            }
            // Literals always become positional binds, never inline text.
            Operand::Value(value) => buf.bind(value.clone()),
            Operand::Binary { op, lhs, rhs } => {
                buf.push_char('(');
                self.write_operand(buf, lhs, qualify)?;
                buf.push(match op {
                    ArithmeticOp::Add => " + ",
                    ArithmeticOp::Sub => " - ",
                    ArithmeticOp::Mul => " * ",
                    ArithmeticOp::Div => " / ",
                    ArithmeticOp::Concat => " || ",
                });
                self.write_operand(buf, rhs, qualify)?;
                buf.push_char(')');
            }
        }
        Ok(())
    }

    fn build_insert(&self, ctx: &InsertContext) -> Result<Statement> {
        let mut buf = StatementBuffer::new(self.as_dyn());
        self.write_insert_values(&mut buf, ctx)?;
        Ok(buf.finish())
    }

    /// The `INSERT INTO t (...) VALUES (...)` body shared by inserts and the
    /// insert half of dialect upsert builders.
    fn write_insert_values(&self, buf: &mut StatementBuffer<'_>, ctx: &InsertContext) -> Result<()> {
        if ctx.rows.is_empty() || ctx.columns.is_empty() {
            return Err(QueryError::Configuration(format!(
                "insert into `{}` has no rows or no columns",
                ctx.table
            ))
            .into());
        }
        buf.push("INSERT INTO ");
        buf.push_identifier(&ctx.table);
        buf.push(" (");
        for (i, column) in ctx.columns.iter().enumerate() {
            if i > 0 {
                buf.push(", ");
            }
            buf.push_identifier(&column.name);
        }
        buf.push(") VALUES ");
        for (r, row) in ctx.rows.iter().enumerate() {
            if row.len() != ctx.columns.len() {
                return Err(QueryError::Configuration(format!(
                    "insert into `{}`: row {} has {} values for {} columns",
                    ctx.table,
                    r,
                    row.len(),
                    ctx.columns.len()
                ))
                .into());
            }
            if r > 0 {
                buf.push(", ");
            }
            buf.push_char('(');
            for (i, value) in row.iter().enumerate() {
                if i > 0 {
                    buf.push(", ");
                }
                buf.bind(value.clone());
            }
            buf.push_char(')');
        }
        Ok(())
    }

    fn build_update(&self, ctx: &UpdateContext) -> Result<Statement> {
        if !ctx.options.allow_missing_where_clause && ctx.where_clause.is_empty() {
            return Err(QueryError::MissingWhereClause {
                table: ctx.table.to_string(),
            }
            .into());
        }
        if ctx.assignments.is_empty() {
            return Err(QueryError::Configuration(format!(
                "update on `{}` has no assignments",
                ctx.table
            ))
            .into());
        }
        let mut buf = StatementBuffer::new(self.as_dyn());
        buf.push("UPDATE ");
        buf.push_identifier(&ctx.table);
        buf.push(" SET ");
        for (i, (column, value)) in ctx.assignments.iter().enumerate() {
            if i > 0 {
                buf.push(", ");
            }
            buf.push_identifier(&column.name);
            buf.push(" = ");
            self.write_operand(&mut buf, value, false)?;
        }
        if !ctx.where_clause.is_empty() {
            buf.push(" WHERE ");
            self.write_criteria(&mut buf, &ctx.where_clause, false)?;
        }
        Ok(buf.finish())
    }

    fn build_delete(&self, ctx: &DeleteContext) -> Result<Statement> {
        if !ctx.options.allow_missing_where_clause && ctx.where_clause.is_empty() {
            return Err(QueryError::MissingWhereClause {
                table: ctx.table.to_string(),
            }
            .into());
        }
        let mut buf = StatementBuffer::new(self.as_dyn());
        buf.push("DELETE FROM ");
        buf.push_identifier(&ctx.table);
        if !ctx.where_clause.is_empty() {
            buf.push(" WHERE ");
            self.write_criteria(&mut buf, &ctx.where_clause, false)?;
        }
        Ok(buf.finish())
    }

    /// Dialects differ fundamentally in upsert syntax, so there is no generic
    /// body; each dialect supplies its own builder.
    fn build_upsert(&self, _ctx: &UpsertContext) -> Result<Statement> {
        Err(QueryError::Unsupported {
            dialect: self.name(),
            operation: "upsert",
        }
        .into())
    }

    fn build_script(&self, ctx: &ScriptContext) -> Statement {
        Statement::raw(ctx.sql.clone())
    }
}
