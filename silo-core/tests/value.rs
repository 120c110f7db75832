use silo_core::{
    id_value, initial_version, next_version, FromValue, IntoValue, Value,
};
use std::cmp::Ordering;

#[test]
fn typed_nulls_keep_their_type() {
    let null: Option<i32> = None;
    let value = null.into_value();
    assert!(value.is_null());
    assert_eq!(value.type_name(), "INTEGER");
    assert!(value.same_type(&Value::Int32(Some(7))));
}

#[test]
fn compare_widens_across_integer_widths() {
    assert_eq!(
        Value::Int16(Some(3)).compare(&Value::Int64(Some(3))),
        Some(Ordering::Equal)
    );
    assert_eq!(
        Value::Int32(Some(2)).compare(&Value::Int64(Some(10))),
        Some(Ordering::Less)
    );
    assert_eq!(
        Value::Float64(Some(2.5)).compare(&Value::Int32(Some(2))),
        Some(Ordering::Greater)
    );
    assert_eq!(Value::Int32(None).compare(&Value::Int32(Some(1))), None);
    assert_eq!(
        Value::Varchar(Some("a".to_owned())).compare(&Value::Int32(Some(1))),
        None
    );
}

#[test]
fn from_value_widens_but_never_narrows() {
    assert_eq!(i64::from_value(&Value::Int16(Some(5))).unwrap(), 5);
    assert_eq!(i32::from_value(&Value::Int16(Some(5))).unwrap(), 5);
    assert!(i16::from_value(&Value::Int32(Some(5))).is_err());
    assert!(i32::from_value(&Value::Varchar(Some("5".to_owned()))).is_err());
}

#[test]
fn option_reads_null_as_none() {
    let nullable: Option<i32> = FromValue::from_value(&Value::Int32(None)).unwrap();
    assert_eq!(nullable, None);
    let required: silo_core::Result<i32> = FromValue::from_value(&Value::Int32(None));
    assert!(required.is_err());
}

#[test]
fn version_helpers_track_the_column_type() {
    assert_eq!(
        initial_version(&Value::Int32(None)).unwrap(),
        Value::Int32(Some(0))
    );
    assert_eq!(
        next_version(&Value::Int32(Some(3))).unwrap(),
        Value::Int32(Some(4))
    );
    assert_eq!(
        next_version(&Value::Int64(Some(9))).unwrap(),
        Value::Int64(Some(10))
    );
    assert!(next_version(&Value::Int32(None)).is_err());
    assert!(initial_version(&Value::Varchar(None)).is_err());
}

#[test]
fn generated_ids_convert_to_the_id_column_type() {
    assert_eq!(
        id_value(&Value::Int32(None), &Value::Int64(Some(42))).unwrap(),
        Value::Int32(Some(42))
    );
    assert!(id_value(&Value::Varchar(None), &Value::Int64(Some(1))).is_err());
}
