use crate::{
    coerce::{coerce, key_of, like_match, ValueKey},
    dialect::UNIQUE_VIOLATION,
    parser::{
        BinOp, Command, ConflictAction, Expr, OnConflict, SelectBody, SelectItem, SelectQuery,
        SetOpKind,
    },
    store::{ColumnMeta, Sequence, StoreInner, Table},
};
use silo_core::{DriverError, Error, Result, RowLabeled, RowNames, Value};
use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashSet},
};

pub(crate) enum CommandOutput {
    Rows(Vec<RowLabeled>),
    Affected {
        rows_affected: u64,
        generated_keys: Vec<Value>,
    },
    None,
}

fn driver_error(message: impl Into<String>) -> Error {
    Error::new(DriverError::message(message.into()))
}

fn unique_violation(detail: impl Into<String>) -> Error {
    Error::new(DriverError::new(
        Some(UNIQUE_VIOLATION.to_owned()),
        detail.into(),
    ))
}

pub(crate) fn execute(
    store: &mut StoreInner,
    sequences: &mut BTreeMap<String, Sequence>,
    command: &Command,
    binds: &[Value],
) -> Result<CommandOutput> {
    match command {
        Command::CreateTable {
            name,
            if_not_exists,
            columns,
            primary_key,
        } => {
            if store.tables.contains_key(name) {
                if *if_not_exists {
                    return Ok(CommandOutput::None);
                }
                return Err(driver_error(format!("table `{name}` already exists")));
            }
            let mut columns = columns.clone();
            for key in primary_key {
                let column = columns
                    .iter_mut()
                    .find(|c| &c.name == key)
                    .ok_or_else(|| driver_error(format!("unknown primary key column `{key}`")))?;
                column.primary_key = true;
                column.nullable = false;
            }
            store.tables.insert(
                name.clone(),
                Table {
                    columns,
                    rows: Vec::new(),
                    next_identity: 1,
                },
            );
            Ok(CommandOutput::None)
        }
        Command::DropTable { name, if_exists } => {
            if store.tables.remove(name).is_none() && !if_exists {
                return Err(driver_error(format!("table `{name}` does not exist")));
            }
            Ok(CommandOutput::None)
        }
        Command::CreateSequence {
            name,
            if_not_exists,
            start_with,
            increment_by,
        } => {
            if sequences.contains_key(name) {
                if *if_not_exists {
                    return Ok(CommandOutput::None);
                }
                return Err(driver_error(format!("sequence `{name}` already exists")));
            }
            sequences.insert(
                name.clone(),
                Sequence {
                    next: *start_with,
                    increment: *increment_by,
                },
            );
            Ok(CommandOutput::None)
        }
        Command::DropSequence { name, if_exists } => {
            if sequences.remove(name).is_none() && !if_exists {
                return Err(driver_error(format!("sequence `{name}` does not exist")));
            }
            Ok(CommandOutput::None)
        }
        Command::SequenceNext { name } => {
            let sequence = sequences
                .get_mut(name)
                .ok_or_else(|| driver_error(format!("sequence `{name}` does not exist")))?;
            let value = sequence.next;
            sequence.next += sequence.increment;
            let labels: RowNames = vec!["next_value".to_owned()].into();
            Ok(CommandOutput::Rows(vec![RowLabeled::new(
                labels,
                vec![Value::Int64(Some(value))].into(),
            )]))
        }
        Command::Insert {
            table,
            columns,
            rows,
            on_conflict,
        } => run_insert(store, table, columns, rows, on_conflict.as_ref(), binds),
        Command::Update {
            table,
            assignments,
            filter,
        } => run_update(store, table, assignments, filter.as_ref(), binds),
        Command::Delete { table, filter } => run_delete(store, table, filter.as_ref(), binds),
        Command::Select(query) => {
            let rows = run_select(store, query, binds)?;
            Ok(CommandOutput::Rows(rows))
        }
        Command::Begin | Command::Commit | Command::Rollback => Err(driver_error(
            "transaction control statements are handled by the connection",
        )),
    }
}

// ---- expression evaluation ----

struct Env<'a> {
    binds: &'a [Value],
    columns: Option<&'a [ColumnMeta]>,
    row: Option<&'a [Value]>,
    excluded: Option<(&'a [ColumnMeta], &'a [Value])>,
}

impl<'a> Env<'a> {
    fn statement(binds: &'a [Value]) -> Self {
        Self {
            binds,
            columns: None,
            row: None,
            excluded: None,
        }
    }

    fn row(binds: &'a [Value], columns: &'a [ColumnMeta], row: &'a [Value]) -> Self {
        Self {
            binds,
            columns: Some(columns),
            row: Some(row),
            excluded: None,
        }
    }
}

fn truth(value: &Value) -> Result<Option<bool>> {
    match value {
        Value::Boolean(v) => Ok(*v),
        Value::Null => Ok(None),
        other => Err(driver_error(format!(
            "expected a boolean condition, found {}",
            other.type_name()
        ))),
    }
}

fn eval(expr: &Expr, env: &Env<'_>) -> Result<Value> {
    match expr {
        Expr::Column { name, .. } => {
            let (columns, row) = match (env.columns, env.row) {
                (Some(columns), Some(row)) => (columns, row),
                _ => return Err(driver_error(format!("no row context for column `{name}`"))),
            };
            let index = columns
                .iter()
                .position(|c| c.name == *name)
                .ok_or_else(|| driver_error(format!("unknown column `{name}`")))?;
            Ok(row[index].clone())
        }
        Expr::Excluded(name) => {
            let (columns, row) = env
                .excluded
                .ok_or_else(|| driver_error("excluded is only valid in DO UPDATE SET"))?;
            let index = columns
                .iter()
                .position(|c| c.name == *name)
                .ok_or_else(|| driver_error(format!("unknown column `excluded.{name}`")))?;
            Ok(row[index].clone())
        }
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Placeholder(index) => env
            .binds
            .get(*index)
            .cloned()
            .ok_or_else(|| driver_error(format!("missing bind value for placeholder {index}"))),
        Expr::Neg(inner) => {
            let value = eval(inner, env)?;
            match value {
                Value::Int16(v) => Ok(Value::Int16(v.map(|v| -v))),
                Value::Int32(v) => Ok(Value::Int32(v.map(|v| -v))),
                Value::Int64(v) => Ok(Value::Int64(v.map(|v| -v))),
                Value::Float32(v) => Ok(Value::Float32(v.map(|v| -v))),
                Value::Float64(v) => Ok(Value::Float64(v.map(|v| -v))),
                Value::Decimal(v) => Ok(Value::Decimal(v.map(|v| -v))),
                other => Err(driver_error(format!("cannot negate {}", other.type_name()))),
            }
        }
        Expr::Not(inner) => {
            let value = eval(inner, env)?;
            Ok(Value::Boolean(truth(&value)?.map(|b| !b)))
        }
        Expr::Binary { op, lhs, rhs } => {
            let left = eval(lhs, env)?;
            let right = eval(rhs, env)?;
            eval_binary(*op, &left, &right)
        }
        Expr::InList { target, values } => {
            let target = eval(target, env)?;
            let mut unknown = false;
            for value in values {
                let value = eval(value, env)?;
                match truth(&eval_binary(BinOp::Eq, &target, &value)?)? {
                    Some(true) => return Ok(Value::Boolean(Some(true))),
                    Some(false) => {}
                    None => unknown = true,
                }
            }
            Ok(Value::Boolean(if unknown { None } else { Some(false) }))
        }
        Expr::Between {
            target,
            lower,
            upper,
        } => {
            let target = eval(target, env)?;
            let lower = eval(lower, env)?;
            let upper = eval(upper, env)?;
            let low = truth(&eval_binary(BinOp::GreaterEq, &target, &lower)?)?;
            let high = truth(&eval_binary(BinOp::LessEq, &target, &upper)?)?;
            Ok(Value::Boolean(match (low, high) {
                (Some(false), _) | (_, Some(false)) => Some(false),
                (Some(true), Some(true)) => Some(true),
                _ => None,
            }))
        }
        Expr::Like {
            target,
            pattern,
            escape,
            negate,
        } => {
            let target = eval(target, env)?;
            let pattern = eval(pattern, env)?;
            match (target, pattern) {
                (Value::Varchar(Some(text)), Value::Varchar(Some(pattern))) => {
                    let matched = like_match(&text, &pattern, *escape);
                    Ok(Value::Boolean(Some(matched != *negate)))
                }
                (t, p) if t.is_null() || p.is_null() => Ok(Value::Boolean(None)),
                (t, _) => Err(driver_error(format!(
                    "LIKE applies to strings, found {}",
                    t.type_name()
                ))),
            }
        }
        Expr::IsNull { target, negate } => {
            let value = eval(target, env)?;
            Ok(Value::Boolean(Some(value.is_null() != *negate)))
        }
    }
}

fn eval_binary(op: BinOp, left: &Value, right: &Value) -> Result<Value> {
    match op {
        BinOp::And | BinOp::Or => {
            let l = truth(left)?;
            let r = truth(right)?;
            let result = if op == BinOp::And {
                match (l, r) {
                    (Some(false), _) | (_, Some(false)) => Some(false),
                    (Some(true), Some(true)) => Some(true),
                    _ => None,
                }
            } else {
                match (l, r) {
                    (Some(true), _) | (_, Some(true)) => Some(true),
                    (Some(false), Some(false)) => Some(false),
                    _ => None,
                }
            };
            Ok(Value::Boolean(result))
        }
        BinOp::Eq | BinOp::NotEq | BinOp::Less | BinOp::LessEq | BinOp::Greater
        | BinOp::GreaterEq => {
            if left.is_null() || right.is_null() {
                return Ok(Value::Boolean(None));
            }
            let ordering = left.compare(right).ok_or_else(|| {
                driver_error(format!(
                    "cannot compare {} with {}",
                    left.type_name(),
                    right.type_name()
                ))
            })?;
            let result = match op {
                BinOp::Eq => ordering == Ordering::Equal,
                BinOp::NotEq => ordering != Ordering::Equal,
                BinOp::Less => ordering == Ordering::Less,
                BinOp::LessEq => ordering != Ordering::Greater,
                BinOp::Greater => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            };
            Ok(Value::Boolean(Some(result)))
        }
        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div => eval_arithmetic(op, left, right),
        BinOp::Concat => match (left, right) {
            (l, r) if l.is_null() || r.is_null() => Ok(Value::Varchar(None)),
            (Value::Varchar(Some(l)), Value::Varchar(Some(r))) => {
                Ok(Value::Varchar(Some(format!("{l}{r}"))))
            }
            (l, _) => Err(driver_error(format!(
                "|| applies to strings, found {}",
                l.type_name()
            ))),
        },
    }
}

fn eval_arithmetic(op: BinOp, left: &Value, right: &Value) -> Result<Value> {
    if left.is_null() || right.is_null() {
        return Ok(Value::Null);
    }
    let float = |v: &Value| -> Option<f64> {
        match v {
            Value::Float32(Some(f)) => Some(*f as f64),
            Value::Float64(Some(f)) => Some(*f),
            _ => None,
        }
    };
    if let (Some(l), Some(r)) = (left.as_i64(), right.as_i64()) {
        let result = match op {
            BinOp::Add => l.checked_add(r),
            BinOp::Sub => l.checked_sub(r),
            BinOp::Mul => l.checked_mul(r),
            _ => {
                if r == 0 {
                    return Err(driver_error("division by zero"));
                }
                l.checked_div(r)
            }
        }
        .ok_or_else(|| driver_error("integer overflow"))?;
        return Ok(Value::Int64(Some(result)));
    }
    if let (Value::Decimal(Some(l)), Value::Decimal(Some(r))) = (left, right) {
        let result = match op {
            BinOp::Add => *l + *r,
            BinOp::Sub => *l - *r,
            BinOp::Mul => *l * *r,
            _ => {
                if r.is_zero() {
                    return Err(driver_error("division by zero"));
                }
                *l / *r
            }
        };
        return Ok(Value::Decimal(Some(result)));
    }
    let l = float(left).or_else(|| left.as_i64().map(|v| v as f64));
    let r = float(right).or_else(|| right.as_i64().map(|v| v as f64));
    match (l, r) {
        (Some(l), Some(r)) => {
            let result = match op {
                BinOp::Add => l + r,
                BinOp::Sub => l - r,
                BinOp::Mul => l * r,
                _ => l / r,
            };
            Ok(Value::Float64(Some(result)))
        }
        _ => Err(driver_error(format!(
            "cannot apply arithmetic to {} and {}",
            left.type_name(),
            right.type_name()
        ))),
    }
}

// ---- SELECT ----

fn run_select(store: &StoreInner, query: &SelectQuery, binds: &[Value]) -> Result<Vec<RowLabeled>> {
    let (labels, rows) = select_rows(store, query, binds)?;
    let labels: RowNames = labels.into();
    Ok(rows
        .into_iter()
        .map(|row| RowLabeled::new(labels.clone(), row.into_boxed_slice()))
        .collect())
}

fn select_rows(
    store: &StoreInner,
    query: &SelectQuery,
    binds: &[Value],
) -> Result<(Vec<String>, Vec<Vec<Value>>)> {
    let (labels, mut rows) = select_body(store, &query.body, binds)?;
    if !query.order_by.is_empty() {
        let mut keys = Vec::with_capacity(query.order_by.len());
        for item in &query.order_by {
            let index = labels.iter().position(|l| *l == item.key).ok_or_else(|| {
                driver_error(format!("ORDER BY column `{}` is not in the result", item.key))
            })?;
            keys.push((index, item.asc));
        }
        rows.sort_by(|a, b| {
            for &(index, asc) in &keys {
                let ordering = cmp_for_sort(&a[index], &b[index]);
                let ordering = if asc { ordering } else { ordering.reverse() };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });
    }
    let offset = query.offset.unwrap_or(0) as usize;
    let rows: Vec<Vec<Value>> = match query.limit {
        Some(limit) => rows.into_iter().skip(offset).take(limit as usize).collect(),
        None if offset > 0 => rows.into_iter().skip(offset).collect(),
        None => rows,
    };
    Ok((labels, rows))
}

/// NULLs sort first ascending, mirroring the rest of the dialect family.
fn cmp_for_sort(a: &Value, b: &Value) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.compare(b).unwrap_or(Ordering::Equal),
    }
}

fn dedup_rows(rows: Vec<Vec<Value>>) -> Vec<Vec<Value>> {
    let mut seen: HashSet<Vec<ValueKey>> = HashSet::with_capacity(rows.len());
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        if seen.insert(row.iter().map(key_of).collect()) {
            out.push(row);
        }
    }
    out
}

fn select_body(
    store: &StoreInner,
    body: &SelectBody,
    binds: &[Value],
) -> Result<(Vec<String>, Vec<Vec<Value>>)> {
    match body {
        SelectBody::Nested(query) => select_rows(store, query, binds),
        SelectBody::Simple(select) => {
            let table = store
                .tables
                .get(&select.table)
                .ok_or_else(|| driver_error(format!("table `{}` does not exist", select.table)))?;
            let mut labels = Vec::new();
            for item in &select.items {
                match item {
                    SelectItem::Star => {
                        labels.extend(table.columns.iter().map(|c| c.name.clone()))
                    }
                    SelectItem::Expr { expr, alias } => labels.push(match alias {
                        Some(alias) => alias.clone(),
                        None => match expr {
                            Expr::Column { name, .. } => name.clone(),
                            _ => "expr".to_owned(),
                        },
                    }),
                }
            }
            let mut rows = Vec::new();
            for row in &table.rows {
                let env = Env::row(binds, &table.columns, row);
                if let Some(filter) = &select.filter {
                    if truth(&eval(filter, &env)?)? != Some(true) {
                        continue;
                    }
                }
                let mut out = Vec::with_capacity(labels.len());
                for item in &select.items {
                    match item {
                        SelectItem::Star => out.extend(row.iter().cloned()),
                        SelectItem::Expr { expr, .. } => out.push(eval(expr, &env)?),
                    }
                }
                rows.push(out);
            }
            let rows = if select.distinct {
                dedup_rows(rows)
            } else {
                rows
            };
            Ok((labels, rows))
        }
        SelectBody::Compound { op, left, right } => {
            let (labels, left_rows) = select_body(store, left, binds)?;
            let (right_labels, right_rows) = select_body(store, right, binds)?;
            if labels.len() != right_labels.len() {
                return Err(driver_error(format!(
                    "set operation arity mismatch: {} vs {} columns",
                    labels.len(),
                    right_labels.len()
                )));
            }
            let rows = match op {
                SetOpKind::UnionAll => {
                    let mut rows = left_rows;
                    rows.extend(right_rows);
                    rows
                }
                SetOpKind::Union => {
                    let mut rows = left_rows;
                    rows.extend(right_rows);
                    dedup_rows(rows)
                }
                SetOpKind::Except => {
                    let excluded: HashSet<Vec<ValueKey>> = right_rows
                        .iter()
                        .map(|row| row.iter().map(key_of).collect())
                        .collect();
                    dedup_rows(left_rows)
                        .into_iter()
                        .filter(|row| {
                            !excluded.contains(
                                &row.iter().map(key_of).collect::<Vec<_>>(),
                            )
                        })
                        .collect()
                }
                SetOpKind::Intersect => {
                    let kept: HashSet<Vec<ValueKey>> = right_rows
                        .iter()
                        .map(|row| row.iter().map(key_of).collect())
                        .collect();
                    dedup_rows(left_rows)
                        .into_iter()
                        .filter(|row| {
                            kept.contains(&row.iter().map(key_of).collect::<Vec<_>>())
                        })
                        .collect()
                }
            };
            Ok((labels, rows))
        }
    }
}

// ---- INSERT / UPDATE / DELETE ----

fn column_indices(table: &Table, names: &[String]) -> Result<Vec<usize>> {
    names
        .iter()
        .map(|name| {
            table
                .column_index(name)
                .ok_or_else(|| driver_error(format!("unknown column `{name}`")))
        })
        .collect()
}

fn check_constraints(table: &Table, candidate: &[Value], skip: Option<usize>) -> Result<()> {
    let pk: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .filter(|(_, c)| c.primary_key)
        .map(|(i, _)| i)
        .collect();
    if !pk.is_empty() && pk.iter().all(|&i| !candidate[i].is_null()) {
        let key: Vec<ValueKey> = pk.iter().map(|&i| key_of(&candidate[i])).collect();
        for (r, row) in table.rows.iter().enumerate() {
            if Some(r) == skip {
                continue;
            }
            if pk.iter().map(|&i| key_of(&row[i])).collect::<Vec<_>>() == key {
                return Err(unique_violation("primary key violation"));
            }
        }
    }
    for (i, column) in table.columns.iter().enumerate() {
        if !column.unique || candidate[i].is_null() {
            continue;
        }
        let key = key_of(&candidate[i]);
        for (r, row) in table.rows.iter().enumerate() {
            if Some(r) == skip {
                continue;
            }
            if key_of(&row[i]) == key {
                return Err(unique_violation(format!(
                    "unique constraint violation on `{}`",
                    column.name
                )));
            }
        }
    }
    Ok(())
}

fn run_insert(
    store: &mut StoreInner,
    table_name: &str,
    columns: &[String],
    rows: &[Vec<Expr>],
    on_conflict: Option<&OnConflict>,
    binds: &[Value],
) -> Result<CommandOutput> {
    let table = store
        .tables
        .get_mut(table_name)
        .ok_or_else(|| driver_error(format!("table `{table_name}` does not exist")))?;
    let provided = column_indices(table, columns)?;
    let conflict_indices = match on_conflict {
        Some(oc) => Some(column_indices(table, &oc.keys)?),
        None => None,
    };
    let mut rows_affected = 0u64;
    let mut generated_keys = Vec::new();
    for exprs in rows {
        if exprs.len() != provided.len() {
            return Err(driver_error(format!(
                "{} values for {} columns",
                exprs.len(),
                provided.len()
            )));
        }
        let env = Env::statement(binds);
        let mut full: Vec<Value> = table.columns.iter().map(|c| c.prototype.as_null()).collect();
        let mut given = vec![false; table.columns.len()];
        for (expr, &index) in exprs.iter().zip(&provided) {
            let value = eval(expr, &env)?;
            full[index] = coerce(&table.columns[index].prototype, value)?;
            given[index] = true;
        }
        let mut generated = None;
        for index in 0..table.columns.len() {
            if !table.columns[index].identity {
                continue;
            }
            if !given[index] || full[index].is_null() {
                let id = table.next_identity;
                table.next_identity += 1;
                full[index] = coerce(&table.columns[index].prototype, Value::Int64(Some(id)))?;
                generated = Some(Value::Int64(Some(id)));
            } else if let Some(id) = full[index].as_i64() {
                // Keep the counter ahead of explicitly provided ids.
                table.next_identity = table.next_identity.max(id + 1);
            }
        }
        for (index, column) in table.columns.iter().enumerate() {
            if !column.nullable && full[index].is_null() {
                return Err(driver_error(format!(
                    "NULL value in column `{}`",
                    column.name
                )));
            }
        }
        if let (Some(oc), Some(key_indices)) = (on_conflict, conflict_indices.as_ref()) {
            let candidate: Vec<ValueKey> =
                key_indices.iter().map(|&i| key_of(&full[i])).collect();
            let existing = table.rows.iter().position(|row| {
                key_indices
                    .iter()
                    .map(|&i| key_of(&row[i]))
                    .collect::<Vec<_>>()
                    == candidate
            });
            if let Some(position) = existing {
                match &oc.action {
                    ConflictAction::Nothing => continue,
                    ConflictAction::Update(assignments) => {
                        let current = table.rows[position].clone();
                        let mut updated = current.clone();
                        for (column, expr) in assignments {
                            let index = table.column_index(column).ok_or_else(|| {
                                driver_error(format!("unknown column `{column}`"))
                            })?;
                            let env = Env {
                                binds,
                                columns: Some(&table.columns),
                                row: Some(&current),
                                excluded: Some((&table.columns, &full)),
                            };
                            updated[index] =
                                coerce(&table.columns[index].prototype, eval(expr, &env)?)?;
                        }
                        check_constraints(table, &updated, Some(position))?;
                        table.rows[position] = updated;
                        rows_affected += 1;
                        continue;
                    }
                }
            }
        }
        check_constraints(table, &full, None)?;
        table.rows.push(full);
        if let Some(key) = generated {
            generated_keys.push(key);
        }
        rows_affected += 1;
    }
    Ok(CommandOutput::Affected {
        rows_affected,
        generated_keys,
    })
}

fn run_update(
    store: &mut StoreInner,
    table_name: &str,
    assignments: &[(String, Expr)],
    filter: Option<&Expr>,
    binds: &[Value],
) -> Result<CommandOutput> {
    let table = store
        .tables
        .get_mut(table_name)
        .ok_or_else(|| driver_error(format!("table `{table_name}` does not exist")))?;
    let indices = column_indices(
        table,
        &assignments.iter().map(|(c, _)| c.clone()).collect::<Vec<_>>(),
    )?;
    let mut rows_affected = 0u64;
    for position in 0..table.rows.len() {
        let current = table.rows[position].clone();
        let env = Env::row(binds, &table.columns, &current);
        let matched = match filter {
            Some(filter) => truth(&eval(filter, &env)?)? == Some(true),
            None => true,
        };
        if !matched {
            continue;
        }
        let mut updated = current.clone();
        for ((_, expr), &index) in assignments.iter().zip(&indices) {
            updated[index] = coerce(&table.columns[index].prototype, eval(expr, &env)?)?;
        }
        table.rows[position] = updated;
        rows_affected += 1;
    }
    Ok(CommandOutput::Affected {
        rows_affected,
        generated_keys: Vec::new(),
    })
}

fn run_delete(
    store: &mut StoreInner,
    table_name: &str,
    filter: Option<&Expr>,
    binds: &[Value],
) -> Result<CommandOutput> {
    let table = store
        .tables
        .get_mut(table_name)
        .ok_or_else(|| driver_error(format!("table `{table_name}` does not exist")))?;
    let mut matches = HashSet::new();
    for (position, row) in table.rows.iter().enumerate() {
        let env = Env::row(binds, &table.columns, row);
        let matched = match filter {
            Some(filter) => truth(&eval(filter, &env)?)? == Some(true),
            None => true,
        };
        if matched {
            matches.insert(position);
        }
    }
    let rows_affected = matches.len() as u64;
    let mut position = 0;
    table.rows.retain(|_| {
        let keep = !matches.contains(&position);
        position += 1;
        keep
    });
    Ok(CommandOutput::Affected {
        rows_affected,
        generated_keys: Vec::new(),
    })
}
