use crate::{
    Clock, ColumnExpr, EntityMetamodel, Error, IdStrategy, InsertContext, InsertOptions,
    QueryError, Result, Value,
};
use std::borrow::Cow;
use time::{PrimitiveDateTime, UtcOffset};

/// Timestamp value of the column's semantic type for the given instant.
pub fn stamp_value(prototype: &Value, now: time::OffsetDateTime) -> Result<Value> {
    match prototype {
        Value::Timestamp(..) => {
            let utc = now.to_offset(UtcOffset::UTC);
            Ok(Value::Timestamp(Some(PrimitiveDateTime::new(
                utc.date(),
                utc.time(),
            ))))
        }
        Value::TimestampWithTimezone(..) => Ok(Value::TimestampWithTimezone(Some(now))),
        other => Err(QueryError::Configuration(format!(
            "cannot stamp a timestamp into a {} column",
            other.type_name()
        ))
        .into()),
    }
}

/// Initial optimistic lock counter for the column's semantic type.
pub fn initial_version(prototype: &Value) -> Result<Value> {
    match prototype {
        Value::Int16(..) => Ok(Value::Int16(Some(0))),
        Value::Int32(..) => Ok(Value::Int32(Some(0))),
        Value::Int64(..) => Ok(Value::Int64(Some(0))),
        other => Err(QueryError::Configuration(format!(
            "a {} column cannot hold an optimistic lock counter",
            other.type_name()
        ))
        .into()),
    }
}

pub fn next_version(current: &Value) -> Result<Value> {
    let next = current
        .as_i64()
        .ok_or_else(|| Error::msg("version column is NULL or not an integer"))?
        + 1;
    match current {
        Value::Int16(..) => Ok(Value::Int16(Some(next as i16))),
        Value::Int32(..) => Ok(Value::Int32(Some(next as i32))),
        Value::Int64(..) => Ok(Value::Int64(Some(next))),
        _ => Err(Error::msg("version column is not an integer")),
    }
}

/// Convert a raw id (a sequence fetch or a generated key, typically BIGINT)
/// into the id column's semantic type.
pub fn id_value(prototype: &Value, raw: &Value) -> Result<Value> {
    let id = raw
        .as_i64()
        .ok_or_else(|| Error::msg(format!("driver returned a {} id", raw.type_name())))?;
    match prototype {
        Value::Int16(..) => Ok(Value::Int16(Some(id as i16))),
        Value::Int32(..) => Ok(Value::Int32(Some(id as i32))),
        Value::Int64(..) => Ok(Value::Int64(Some(id))),
        other => Err(QueryError::Configuration(format!(
            "a generated id cannot populate a {} column",
            other.type_name()
        ))
        .into()),
    }
}

/// Pre-insert hooks: assign the pre-fetched sequence id, stamp the creation
/// and update timestamps, initialize the version counter. Returns a new
/// entity value; the caller's entity is untouched.
pub fn pre_insert<M: EntityMetamodel>(
    meta: &M,
    entity: &M::Entity,
    clock: &dyn Clock,
    sequence_id: Option<Value>,
) -> Result<M::Entity> {
    let mut entity = entity.clone();
    if let Some(id) = sequence_id {
        let id_column = meta
            .id_columns()
            .first()
            .map(|c| c.name.clone())
            .ok_or_else(|| {
                Error::msg(format!(
                    "table `{}` declares a sequence but no id column",
                    meta.table_name()
                ))
            })?;
        entity = meta.with_value(&entity, &id_column, id)?;
    }
    let now = clock.now();
    for column in meta.columns() {
        if column.version {
            entity = meta.with_value(&entity, &column.name, initial_version(&column.value)?)?;
        }
        if column.created_at || column.updated_at {
            entity = meta.with_value(&entity, &column.name, stamp_value(&column.value, now)?)?;
        }
    }
    Ok(entity)
}

/// Pre-update hook: re-stamp the update timestamp columns.
pub fn pre_update<M: EntityMetamodel>(
    meta: &M,
    entity: &M::Entity,
    clock: &dyn Clock,
) -> Result<M::Entity> {
    let mut entity = entity.clone();
    let now = clock.now();
    for column in meta.columns() {
        if column.updated_at {
            entity = meta.with_value(&entity, &column.name, stamp_value(&column.value, now)?)?;
        }
    }
    Ok(entity)
}

/// Insert context over the given (already hook-processed) entities.
///
/// An auto-increment id column is omitted from the column list; its value
/// comes back through the driver's generated keys.
pub fn insert_context<M: EntityMetamodel>(
    meta: &M,
    entities: &[M::Entity],
    options: InsertOptions,
) -> InsertContext {
    let auto_increment = meta.id_strategy() == IdStrategy::AutoIncrement;
    let table: Cow<'static, str> = Cow::Owned(meta.table_name().to_owned());
    let included: Vec<usize> = meta
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, c)| !(auto_increment && c.primary_key))
        .map(|(i, _)| i)
        .collect();
    let columns: Vec<ColumnExpr> = included
        .iter()
        .map(|&i| meta.columns()[i].expr(table.clone()))
        .collect();
    let mut context = InsertContext::new(table, columns).options(|_| options);
    for entity in entities {
        let row = meta.to_row(entity);
        context = context.row(included.iter().map(|&i| row[i].clone()).collect());
    }
    context
}
