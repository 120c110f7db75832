use rust_decimal::Decimal;
use silo_core::{DriverError, Error, ErrorContext, Result, Value};
use time::{macros::format_description, Date, PrimitiveDateTime, Time};
use uuid::Uuid;

pub(crate) fn parse_date(text: &str) -> Result<Date> {
    Date::parse(text, format_description!("[year]-[month]-[day]"))
        .with_context(|| format!("cannot parse `{text}` as a date"))
}

pub(crate) fn parse_time(text: &str) -> Result<Time> {
    Time::parse(
        text,
        format_description!("[hour]:[minute]:[second].[subsecond]"),
    )
    .or_else(|_| Time::parse(text, format_description!("[hour]:[minute]:[second]")))
    .or_else(|_| Time::parse(text, format_description!("[hour]:[minute]")))
    .with_context(|| format!("cannot parse `{text}` as a time"))
}

pub(crate) fn parse_timestamp(text: &str) -> Result<PrimitiveDateTime> {
    PrimitiveDateTime::parse(
        text,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
    )
    .or_else(|_| {
        PrimitiveDateTime::parse(
            text,
            format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
        )
    })
    .or_else(|_| {
        PrimitiveDateTime::parse(
            text,
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        )
    })
    .with_context(|| format!("cannot parse `{text}` as a timestamp"))
}

pub(crate) fn parse_uuid(text: &str) -> Result<Uuid> {
    Uuid::parse_str(text).with_context(|| format!("cannot parse `{text}` as a uuid"))
}

fn incompatible(prototype: &Value, value: &Value) -> Error {
    Error::new(DriverError::message(format!(
        "cannot store a {} value into a {} column",
        value.type_name(),
        prototype.type_name()
    )))
}

fn float_of(value: &Value) -> Option<f64> {
    match value {
        Value::Float32(Some(v)) => Some(*v as f64),
        Value::Float64(Some(v)) => Some(*v),
        other => other.as_i64().map(|v| v as f64),
    }
}

/// Adapt a value to a column prototype: integer widths narrow with a range
/// check, string literals populate temporal and uuid columns, anything else
/// must already match.
pub(crate) fn coerce(prototype: &Value, value: Value) -> Result<Value> {
    if value.is_null() {
        return Ok(prototype.as_null());
    }
    match prototype {
        Value::Boolean(..) => match value {
            Value::Boolean(..) => Ok(value),
            _ => Err(incompatible(prototype, &value)),
        },
        Value::Int16(..) => {
            let v = value.as_i64().ok_or_else(|| incompatible(prototype, &value))?;
            i16::try_from(v)
                .map(|v| Value::Int16(Some(v)))
                .map_err(|_| Error::new(DriverError::message(format!("{v} out of SMALLINT range"))))
        }
        Value::Int32(..) => {
            let v = value.as_i64().ok_or_else(|| incompatible(prototype, &value))?;
            i32::try_from(v)
                .map(|v| Value::Int32(Some(v)))
                .map_err(|_| Error::new(DriverError::message(format!("{v} out of INTEGER range"))))
        }
        Value::Int64(..) => {
            let v = value.as_i64().ok_or_else(|| incompatible(prototype, &value))?;
            Ok(Value::Int64(Some(v)))
        }
        Value::Float32(..) => {
            let v = float_of(&value).ok_or_else(|| incompatible(prototype, &value))?;
            Ok(Value::Float32(Some(v as f32)))
        }
        Value::Float64(..) => {
            let v = float_of(&value).ok_or_else(|| incompatible(prototype, &value))?;
            Ok(Value::Float64(Some(v)))
        }
        Value::Decimal(..) => match value {
            Value::Decimal(..) => Ok(value),
            other => match other.as_i64() {
                Some(v) => Ok(Value::Decimal(Some(Decimal::from(v)))),
                None => Err(incompatible(prototype, &other)),
            },
        },
        Value::Varchar(..) => match value {
            Value::Varchar(..) => Ok(value),
            _ => Err(incompatible(prototype, &value)),
        },
        Value::Blob(..) => match value {
            Value::Blob(..) => Ok(value),
            _ => Err(incompatible(prototype, &value)),
        },
        Value::Date(..) => match value {
            Value::Date(..) => Ok(value),
            Value::Varchar(Some(text)) => Ok(Value::Date(Some(parse_date(&text)?))),
            _ => Err(incompatible(prototype, &value)),
        },
        Value::Time(..) => match value {
            Value::Time(..) => Ok(value),
            Value::Varchar(Some(text)) => Ok(Value::Time(Some(parse_time(&text)?))),
            _ => Err(incompatible(prototype, &value)),
        },
        Value::Timestamp(..) => match value {
            Value::Timestamp(..) => Ok(value),
            Value::Varchar(Some(text)) => Ok(Value::Timestamp(Some(parse_timestamp(&text)?))),
            _ => Err(incompatible(prototype, &value)),
        },
        Value::TimestampWithTimezone(..) => match value {
            Value::TimestampWithTimezone(..) => Ok(value),
            _ => Err(incompatible(prototype, &value)),
        },
        Value::Uuid(..) => match value {
            Value::Uuid(..) => Ok(value),
            Value::Varchar(Some(text)) => Ok(Value::Uuid(Some(parse_uuid(&text)?))),
            _ => Err(incompatible(prototype, &value)),
        },
        Value::Null => Ok(value),
    }
}

/// Hashable identity of a value, with integer widths and float precisions
/// normalized so set operations dedup across branches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum ValueKey {
    Null,
    Bool(bool),
    Int(i64),
    Float(u64),
    Decimal(Decimal),
    Str(String),
    Bytes(Box<[u8]>),
    Date(Date),
    Time(Time),
    Timestamp(PrimitiveDateTime),
    TimestampTz(i128),
    Uuid(Uuid),
}

pub(crate) fn key_of(value: &Value) -> ValueKey {
    match value {
        _ if value.is_null() => ValueKey::Null,
        Value::Boolean(Some(v)) => ValueKey::Bool(*v),
        Value::Int16(Some(v)) => ValueKey::Int(*v as i64),
        Value::Int32(Some(v)) => ValueKey::Int(*v as i64),
        Value::Int64(Some(v)) => ValueKey::Int(*v),
        Value::Float32(Some(v)) => ValueKey::Float((*v as f64).to_bits()),
        Value::Float64(Some(v)) => ValueKey::Float(v.to_bits()),
        Value::Decimal(Some(v)) => ValueKey::Decimal(v.normalize()),
        Value::Varchar(Some(v)) => ValueKey::Str(v.clone()),
        Value::Blob(Some(v)) => ValueKey::Bytes(v.clone()),
        Value::Date(Some(v)) => ValueKey::Date(*v),
        Value::Time(Some(v)) => ValueKey::Time(*v),
        Value::Timestamp(Some(v)) => ValueKey::Timestamp(*v),
        Value::TimestampWithTimezone(Some(v)) => ValueKey::TimestampTz(v.unix_timestamp_nanos()),
        Value::Uuid(Some(v)) => ValueKey::Uuid(*v),
        _ => ValueKey::Null,
    }
}

/// SQL LIKE with `%`/`_` wildcards and an optional escape character.
pub(crate) fn like_match(text: &str, pattern: &str, escape: Option<char>) -> bool {
    #[derive(PartialEq)]
    enum Tok {
        Lit(char),
        Any,
        Many,
    }
    let mut tokens = Vec::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if Some(c) == escape {
            if let Some(next) = chars.next() {
                tokens.push(Tok::Lit(next));
            }
        } else if c == '%' {
            tokens.push(Tok::Many);
        } else if c == '_' {
            tokens.push(Tok::Any);
        } else {
            tokens.push(Tok::Lit(c));
        }
    }
    fn matches(text: &[char], tokens: &[Tok]) -> bool {
        match tokens.first() {
            None => text.is_empty(),
            Some(Tok::Many) => (0..=text.len()).any(|skip| matches(&text[skip..], &tokens[1..])),
            Some(Tok::Any) => !text.is_empty() && matches(&text[1..], &tokens[1..]),
            Some(Tok::Lit(c)) => text.first() == Some(c) && matches(&text[1..], &tokens[1..]),
        }
    }
    let text: Vec<char> = text.chars().collect();
    matches(&text, &tokens)
}
