use rust_decimal::Decimal;
use std::cmp::Ordering;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};
use uuid::Uuid;

/// A semantically typed database value.
///
/// Every variant wraps an `Option` so a NULL still carries the semantic type
/// it was declared with: `Value::Int32(None)` is a NULL integer, which is what
/// lets the dialect pick the correct driver representation for bind values and
/// column prototypes alike.
#[derive(Default, Debug, Clone)]
pub enum Value {
    #[default]
    Null,
    Boolean(Option<bool>),
    Int16(Option<i16>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    Float32(Option<f32>),
    Float64(Option<f64>),
    Decimal(Option<Decimal>),
    Varchar(Option<String>),
    Blob(Option<Box<[u8]>>),
    Date(Option<Date>),
    Time(Option<Time>),
    Timestamp(Option<PrimitiveDateTime>),
    TimestampWithTimezone(Option<OffsetDateTime>),
    Uuid(Option<Uuid>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Boolean(l), Self::Boolean(r)) => l == r,
            (Self::Int16(l), Self::Int16(r)) => l == r,
            (Self::Int32(l), Self::Int32(r)) => l == r,
            (Self::Int64(l), Self::Int64(r)) => l == r,
            (Self::Float32(l), Self::Float32(r)) => l == r,
            (Self::Float64(l), Self::Float64(r)) => l == r,
            (Self::Decimal(l), Self::Decimal(r)) => l == r,
            (Self::Varchar(l), Self::Varchar(r)) => l == r,
            (Self::Blob(l), Self::Blob(r)) => l == r,
            (Self::Date(l), Self::Date(r)) => l == r,
            (Self::Time(l), Self::Time(r)) => l == r,
            (Self::Timestamp(l), Self::Timestamp(r)) => l == r,
            (Self::TimestampWithTimezone(l), Self::TimestampWithTimezone(r)) => l == r,
            (Self::Uuid(l), Self::Uuid(r)) => l == r,
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}

impl Value {
    pub fn same_type(&self, other: &Self) -> bool {
        core::mem::discriminant(self) == core::mem::discriminant(other)
    }

    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Boolean(v) => v.is_none(),
            Value::Int16(v) => v.is_none(),
            Value::Int32(v) => v.is_none(),
            Value::Int64(v) => v.is_none(),
            Value::Float32(v) => v.is_none(),
            Value::Float64(v) => v.is_none(),
            Value::Decimal(v) => v.is_none(),
            Value::Varchar(v) => v.is_none(),
            Value::Blob(v) => v.is_none(),
            Value::Date(v) => v.is_none(),
            Value::Time(v) => v.is_none(),
            Value::Timestamp(v) => v.is_none(),
            Value::TimestampWithTimezone(v) => v.is_none(),
            Value::Uuid(v) => v.is_none(),
        }
    }

    /// A NULL of the same semantic type.
    pub fn as_null(&self) -> Value {
        match self {
            Value::Null => Value::Null,
            Value::Boolean(..) => Value::Boolean(None),
            Value::Int16(..) => Value::Int16(None),
            Value::Int32(..) => Value::Int32(None),
            Value::Int64(..) => Value::Int64(None),
            Value::Float32(..) => Value::Float32(None),
            Value::Float64(..) => Value::Float64(None),
            Value::Decimal(..) => Value::Decimal(None),
            Value::Varchar(..) => Value::Varchar(None),
            Value::Blob(..) => Value::Blob(None),
            Value::Date(..) => Value::Date(None),
            Value::Time(..) => Value::Time(None),
            Value::Timestamp(..) => Value::Timestamp(None),
            Value::TimestampWithTimezone(..) => Value::TimestampWithTimezone(None),
            Value::Uuid(..) => Value::Uuid(None),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Boolean(..) => "BOOLEAN",
            Value::Int16(..) => "SMALLINT",
            Value::Int32(..) => "INTEGER",
            Value::Int64(..) => "BIGINT",
            Value::Float32(..) => "REAL",
            Value::Float64(..) => "DOUBLE",
            Value::Decimal(..) => "DECIMAL",
            Value::Varchar(..) => "VARCHAR",
            Value::Blob(..) => "BLOB",
            Value::Date(..) => "DATE",
            Value::Time(..) => "TIME",
            Value::Timestamp(..) => "TIMESTAMP",
            Value::TimestampWithTimezone(..) => "TIMESTAMPTZ",
            Value::Uuid(..) => "UUID",
        }
    }

    /// Extract a signed integer out of any of the integer variants.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int16(Some(v)) => Some(*v as i64),
            Value::Int32(Some(v)) => Some(*v as i64),
            Value::Int64(Some(v)) => Some(*v),
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float32(Some(v)) => Some(*v as f64),
            Value::Float64(Some(v)) => Some(*v),
            _ => None,
        }
    }

    /// Order two non-null values, widening across the numeric families.
    ///
    /// Returns `None` when either side is NULL or the types are unrelated.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        if self.is_null() || other.is_null() {
            return None;
        }
        if let (Some(l), Some(r)) = (self.as_i64(), other.as_i64()) {
            return Some(l.cmp(&r));
        }
        if let (Some(l), Some(r)) = (
            self.as_f64().or_else(|| self.as_i64().map(|v| v as f64)),
            other.as_f64().or_else(|| other.as_i64().map(|v| v as f64)),
        ) {
            return l.partial_cmp(&r);
        }
        match (self, other) {
            (Value::Boolean(Some(l)), Value::Boolean(Some(r))) => Some(l.cmp(r)),
            (Value::Decimal(Some(l)), Value::Decimal(Some(r))) => Some(l.cmp(r)),
            (Value::Varchar(Some(l)), Value::Varchar(Some(r))) => Some(l.cmp(r)),
            (Value::Blob(Some(l)), Value::Blob(Some(r))) => Some(l.cmp(r)),
            (Value::Date(Some(l)), Value::Date(Some(r))) => Some(l.cmp(r)),
            (Value::Time(Some(l)), Value::Time(Some(r))) => Some(l.cmp(r)),
            (Value::Timestamp(Some(l)), Value::Timestamp(Some(r))) => Some(l.cmp(r)),
            (Value::TimestampWithTimezone(Some(l)), Value::TimestampWithTimezone(Some(r))) => {
                Some(l.cmp(r))
            }
            (Value::Uuid(Some(l)), Value::Uuid(Some(r))) => Some(l.cmp(r)),
            _ => None,
        }
    }
}
