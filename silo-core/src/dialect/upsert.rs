use crate::{
    Dialect, InsertContext, QueryError, Result, Statement, StatementBuffer, UpsertContext,
    UpsertMode,
};

/// `INSERT ... ON CONFLICT (keys) DO UPDATE SET c = excluded.c` builder shared
/// by the dialects that speak this shape (postgres, sqlite, memory).
pub fn write_on_conflict_upsert(dialect: &dyn Dialect, ctx: &UpsertContext) -> Result<Statement> {
    if ctx.conflict_keys.is_empty() {
        return Err(QueryError::Configuration(format!(
            "upsert into `{}` has no conflict key",
            ctx.table
        ))
        .into());
    }
    let insert = InsertContext {
        table: ctx.table.clone(),
        columns: ctx.columns.clone(),
        rows: ctx.rows.clone(),
        options: ctx.options.clone(),
    };
    let mut buf = StatementBuffer::new(dialect);
    dialect.write_insert_values(&mut buf, &insert)?;
    buf.push(" ON CONFLICT (");
    for (i, key) in ctx.conflict_keys.iter().enumerate() {
        if i > 0 {
            buf.push(", ");
        }
        buf.push_identifier(&key.name);
    }
    buf.push_char(')');
    match ctx.mode {
        UpsertMode::Ignore => buf.push(" DO NOTHING"),
        UpsertMode::Update => {
            if ctx.update_columns.is_empty() {
                return Err(QueryError::Configuration(format!(
                    "upsert into `{}` updates no columns",
                    ctx.table
                ))
                .into());
            }
            buf.push(" DO UPDATE SET ");
            for (i, column) in ctx.update_columns.iter().enumerate() {
                if i > 0 {
                    buf.push(", ");
                }
                buf.push_identifier(&column.name);
                buf.push(" = excluded.");
                buf.push_identifier(&column.name);
            }
        }
    }
    Ok(buf.finish())
}
