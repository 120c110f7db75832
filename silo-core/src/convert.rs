use crate::{Error, Result, Value};
use rust_decimal::Decimal;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};
use uuid::Uuid;

/// Conversion from a Rust value into a [`Value`] bind.
pub trait IntoValue {
    fn into_value(self) -> Value;
}

/// Conversion from a [`Value`] back into a Rust value.
///
/// Integer extraction widens (`SMALLINT` fits in an `i64` target) but never
/// narrows silently; a mismatched type is an error, not a coercion.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self>;
}

macro_rules! convert_value {
    ($rust:ty => $variant:ident) => {
        impl IntoValue for $rust {
            fn into_value(self) -> Value {
                Value::$variant(Some(self.into()))
            }
        }
        impl IntoValue for Option<$rust> {
            fn into_value(self) -> Value {
                Value::$variant(self.map(Into::into))
            }
        }
    };
}

convert_value!(bool => Boolean);
convert_value!(i16 => Int16);
convert_value!(i32 => Int32);
convert_value!(i64 => Int64);
convert_value!(f32 => Float32);
convert_value!(f64 => Float64);
convert_value!(Decimal => Decimal);
convert_value!(String => Varchar);
convert_value!(&str => Varchar);
convert_value!(Vec<u8> => Blob);
convert_value!(Date => Date);
convert_value!(Time => Time);
convert_value!(PrimitiveDateTime => Timestamp);
convert_value!(OffsetDateTime => TimestampWithTimezone);
convert_value!(Uuid => Uuid);

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

fn mismatch(expected: &str, value: &Value) -> Error {
    Error::msg(format!(
        "cannot read a {} value as {}",
        value.type_name(),
        expected
    ))
}

fn non_null<'a, T>(value: &'a Value, extracted: Option<T>, expected: &str) -> Result<T> {
    match extracted {
        Some(v) => Ok(v),
        None if value.is_null() => Err(Error::msg(format!(
            "unexpected NULL while reading a {} column",
            expected
        ))),
        None => Err(mismatch(expected, value)),
    }
}

macro_rules! from_value {
    ($rust:ty, $expected:literal, $value:ident => $extract:expr) => {
        impl FromValue for $rust {
            fn from_value($value: &Value) -> Result<Self> {
                non_null($value, $extract, $expected)
            }
        }
    };
}

from_value!(bool, "BOOLEAN", v => match v {
    Value::Boolean(b) => *b,
    _ => None,
});
from_value!(i16, "SMALLINT", v => match v {
    Value::Int16(i) => *i,
    _ => None,
});
from_value!(i32, "INTEGER", v => match v {
    Value::Int16(i) => i.map(|i| i as i32),
    Value::Int32(i) => *i,
    _ => None,
});
from_value!(i64, "BIGINT", v => v.as_i64());
from_value!(f32, "REAL", v => match v {
    Value::Float32(f) => *f,
    _ => None,
});
from_value!(f64, "DOUBLE", v => match v {
    Value::Float32(f) => f.map(|f| f as f64),
    Value::Float64(f) => *f,
    _ => None,
});
from_value!(Decimal, "DECIMAL", v => match v {
    Value::Decimal(d) => *d,
    _ => None,
});
from_value!(String, "VARCHAR", v => match v {
    Value::Varchar(s) => s.clone(),
    _ => None,
});
from_value!(Vec<u8>, "BLOB", v => match v {
    Value::Blob(b) => b.as_ref().map(|b| b.to_vec()),
    _ => None,
});
from_value!(Date, "DATE", v => match v {
    Value::Date(d) => *d,
    _ => None,
});
from_value!(Time, "TIME", v => match v {
    Value::Time(t) => *t,
    _ => None,
});
from_value!(PrimitiveDateTime, "TIMESTAMP", v => match v {
    Value::Timestamp(t) => *t,
    _ => None,
});
from_value!(OffsetDateTime, "TIMESTAMPTZ", v => match v {
    Value::TimestampWithTimezone(t) => *t,
    _ => None,
});
from_value!(Uuid, "UUID", v => match v {
    Value::Uuid(u) => *u,
    _ => None,
});

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.clone())
    }
}
