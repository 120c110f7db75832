use silo_core::{
    ColumnDef, ColumnExpr, Connection, Database, EntityMetamodel, Error, FromValue, IdStrategy,
    Result, RowLabeled, Value,
};
use std::borrow::Cow;
use time::PrimitiveDateTime;

fn read<T: FromValue>(row: &RowLabeled, column: &str) -> Result<T> {
    let value = row
        .get_column(column)
        .ok_or_else(|| Error::msg(format!("missing column `{column}`")))?;
    T::from_value(value)
}

// ---- employee ----

#[derive(Debug, Clone, PartialEq)]
pub struct Employee {
    pub employee_id: i32,
    pub employee_name: String,
    pub manager_id: Option<i32>,
}

pub struct EmployeeMeta {
    columns: Vec<ColumnDef>,
}

impl EmployeeMeta {
    pub fn new() -> Self {
        Self {
            columns: vec![
                ColumnDef {
                    primary_key: true,
                    ..ColumnDef::new("employee_id", Value::Int32(None))
                },
                ColumnDef::new("employee_name", Value::Varchar(None)),
                ColumnDef {
                    nullable: true,
                    ..ColumnDef::new("manager_id", Value::Int32(None))
                },
            ],
        }
    }

    pub fn employee_id(&self) -> ColumnExpr {
        self.column("employee_id").expect("employee_id")
    }

    pub fn employee_name(&self) -> ColumnExpr {
        self.column("employee_name").expect("employee_name")
    }

    pub fn manager_id(&self) -> ColumnExpr {
        self.column("manager_id").expect("manager_id")
    }
}

impl Default for EmployeeMeta {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityMetamodel for EmployeeMeta {
    type Entity = Employee;

    fn table_name(&self) -> &str {
        "employee"
    }

    fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    fn to_row(&self, entity: &Employee) -> Vec<Value> {
        vec![
            Value::Int32(Some(entity.employee_id)),
            Value::Varchar(Some(entity.employee_name.clone())),
            Value::Int32(entity.manager_id),
        ]
    }

    fn from_row(&self, row: &RowLabeled) -> Result<Employee> {
        Ok(Employee {
            employee_id: read(row, "employee_id")?,
            employee_name: read(row, "employee_name")?,
            manager_id: read(row, "manager_id")?,
        })
    }

    fn with_value(&self, entity: &Employee, column: &str, value: Value) -> Result<Employee> {
        let mut entity = entity.clone();
        match column {
            "employee_id" => entity.employee_id = FromValue::from_value(&value)?,
            "employee_name" => entity.employee_name = FromValue::from_value(&value)?,
            "manager_id" => entity.manager_id = FromValue::from_value(&value)?,
            other => return Err(Error::msg(format!("no column `{other}` on employee"))),
        }
        Ok(entity)
    }
}

pub const EMPLOYEE_SCHEMA: &str = "\
    DROP TABLE IF EXISTS employee;\n\
    CREATE TABLE employee (\
    employee_id INTEGER PRIMARY KEY, \
    employee_name VARCHAR NOT NULL, \
    manager_id INTEGER)";

pub fn employees() -> Vec<Employee> {
    [
        (1, "SMITH", None),
        (2, "ALLEN", Some(1)),
        (3, "WARD", Some(1)),
        (4, "JONES", Some(2)),
        (5, "MARTIN", Some(2)),
    ]
    .into_iter()
    .map(|(id, name, manager)| Employee {
        employee_id: id,
        employee_name: name.to_owned(),
        manager_id: manager,
    })
    .collect()
}

pub fn seed_employees<C: Connection>(db: &mut Database<C>) {
    db.run_script(EMPLOYEE_SCHEMA).expect("employee schema");
    let meta = EmployeeMeta::new();
    db.insert_batch(&meta, &employees())
        .expect("seed employees");
}

// ---- address (optimistic lock) ----

#[derive(Debug, Clone, PartialEq)]
pub struct Address {
    pub address_id: i32,
    pub street: String,
    pub version: i32,
}

pub struct AddressMeta {
    columns: Vec<ColumnDef>,
}

impl AddressMeta {
    pub fn new() -> Self {
        Self {
            columns: vec![
                ColumnDef {
                    primary_key: true,
                    ..ColumnDef::new("address_id", Value::Int32(None))
                },
                ColumnDef::new("street", Value::Varchar(None)),
                ColumnDef {
                    version: true,
                    ..ColumnDef::new("version", Value::Int32(None))
                },
            ],
        }
    }

    pub fn address_id(&self) -> ColumnExpr {
        self.column("address_id").expect("address_id")
    }

    pub fn street(&self) -> ColumnExpr {
        self.column("street").expect("street")
    }
}

impl Default for AddressMeta {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityMetamodel for AddressMeta {
    type Entity = Address;

    fn table_name(&self) -> &str {
        "address"
    }

    fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    fn to_row(&self, entity: &Address) -> Vec<Value> {
        vec![
            Value::Int32(Some(entity.address_id)),
            Value::Varchar(Some(entity.street.clone())),
            Value::Int32(Some(entity.version)),
        ]
    }

    fn from_row(&self, row: &RowLabeled) -> Result<Address> {
        Ok(Address {
            address_id: read(row, "address_id")?,
            street: read(row, "street")?,
            version: read(row, "version")?,
        })
    }

    fn with_value(&self, entity: &Address, column: &str, value: Value) -> Result<Address> {
        let mut entity = entity.clone();
        match column {
            "address_id" => entity.address_id = FromValue::from_value(&value)?,
            "street" => entity.street = FromValue::from_value(&value)?,
            "version" => entity.version = FromValue::from_value(&value)?,
            other => return Err(Error::msg(format!("no column `{other}` on address"))),
        }
        Ok(entity)
    }
}

pub const ADDRESS_SCHEMA: &str = "\
    DROP TABLE IF EXISTS address;\n\
    CREATE TABLE address (\
    address_id INTEGER PRIMARY KEY, \
    street VARCHAR NOT NULL, \
    version INTEGER NOT NULL)";

// ---- person (timestamps) ----

#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub person_id: i32,
    pub name: String,
    pub created_at: Option<PrimitiveDateTime>,
    pub updated_at: Option<PrimitiveDateTime>,
    pub version: i32,
}

impl Person {
    pub fn new(person_id: i32, name: &str) -> Self {
        Self {
            person_id,
            name: name.to_owned(),
            created_at: None,
            updated_at: None,
            version: 0,
        }
    }
}

pub struct PersonMeta {
    columns: Vec<ColumnDef>,
}

impl PersonMeta {
    pub fn new() -> Self {
        Self {
            columns: vec![
                ColumnDef {
                    primary_key: true,
                    ..ColumnDef::new("person_id", Value::Int32(None))
                },
                ColumnDef::new("name", Value::Varchar(None)),
                ColumnDef {
                    nullable: true,
                    created_at: true,
                    ..ColumnDef::new("created_at", Value::Timestamp(None))
                },
                ColumnDef {
                    nullable: true,
                    updated_at: true,
                    ..ColumnDef::new("updated_at", Value::Timestamp(None))
                },
                ColumnDef {
                    version: true,
                    ..ColumnDef::new("version", Value::Int32(None))
                },
            ],
        }
    }

    pub fn person_id(&self) -> ColumnExpr {
        self.column("person_id").expect("person_id")
    }
}

impl Default for PersonMeta {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityMetamodel for PersonMeta {
    type Entity = Person;

    fn table_name(&self) -> &str {
        "person"
    }

    fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    fn to_row(&self, entity: &Person) -> Vec<Value> {
        vec![
            Value::Int32(Some(entity.person_id)),
            Value::Varchar(Some(entity.name.clone())),
            Value::Timestamp(entity.created_at),
            Value::Timestamp(entity.updated_at),
            Value::Int32(Some(entity.version)),
        ]
    }

    fn from_row(&self, row: &RowLabeled) -> Result<Person> {
        Ok(Person {
            person_id: read(row, "person_id")?,
            name: read(row, "name")?,
            created_at: read(row, "created_at")?,
            updated_at: read(row, "updated_at")?,
            version: read(row, "version")?,
        })
    }

    fn with_value(&self, entity: &Person, column: &str, value: Value) -> Result<Person> {
        let mut entity = entity.clone();
        match column {
            "person_id" => entity.person_id = FromValue::from_value(&value)?,
            "name" => entity.name = FromValue::from_value(&value)?,
            "created_at" => entity.created_at = FromValue::from_value(&value)?,
            "updated_at" => entity.updated_at = FromValue::from_value(&value)?,
            "version" => entity.version = FromValue::from_value(&value)?,
            other => return Err(Error::msg(format!("no column `{other}` on person"))),
        }
        Ok(entity)
    }
}

pub const PERSON_SCHEMA: &str = "\
    DROP TABLE IF EXISTS person;\n\
    CREATE TABLE person (\
    person_id INTEGER PRIMARY KEY, \
    name VARCHAR NOT NULL, \
    created_at TIMESTAMP, \
    updated_at TIMESTAMP, \
    version INTEGER NOT NULL)";

// ---- identity / sequence strategies ----

#[derive(Debug, Clone, PartialEq)]
pub struct IdentityLine {
    pub id: i64,
    pub text: String,
}

pub struct IdentityLineMeta {
    columns: Vec<ColumnDef>,
}

impl IdentityLineMeta {
    pub fn new() -> Self {
        Self {
            columns: vec![
                ColumnDef {
                    primary_key: true,
                    ..ColumnDef::new("id", Value::Int64(None))
                },
                ColumnDef::new("text", Value::Varchar(None)),
            ],
        }
    }
}

impl Default for IdentityLineMeta {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityMetamodel for IdentityLineMeta {
    type Entity = IdentityLine;

    fn table_name(&self) -> &str {
        "identity_line"
    }

    fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    fn id_strategy(&self) -> IdStrategy {
        IdStrategy::AutoIncrement
    }

    fn to_row(&self, entity: &IdentityLine) -> Vec<Value> {
        vec![
            Value::Int64(Some(entity.id)),
            Value::Varchar(Some(entity.text.clone())),
        ]
    }

    fn from_row(&self, row: &RowLabeled) -> Result<IdentityLine> {
        Ok(IdentityLine {
            id: read(row, "id")?,
            text: read(row, "text")?,
        })
    }

    fn with_value(&self, entity: &IdentityLine, column: &str, value: Value) -> Result<IdentityLine> {
        let mut entity = entity.clone();
        match column {
            "id" => entity.id = FromValue::from_value(&value)?,
            "text" => entity.text = FromValue::from_value(&value)?,
            other => return Err(Error::msg(format!("no column `{other}` on identity_line"))),
        }
        Ok(entity)
    }
}

pub const IDENTITY_LINE_SCHEMA: &str = "\
    DROP TABLE IF EXISTS identity_line;\n\
    CREATE TABLE identity_line (\
    id BIGINT PRIMARY KEY AUTO_INCREMENT, \
    text VARCHAR NOT NULL)";

#[derive(Debug, Clone, PartialEq)]
pub struct SequenceLine {
    pub id: i64,
    pub text: String,
}

pub struct SequenceLineMeta {
    columns: Vec<ColumnDef>,
}

impl SequenceLineMeta {
    pub fn new() -> Self {
        Self {
            columns: vec![
                ColumnDef {
                    primary_key: true,
                    ..ColumnDef::new("id", Value::Int64(None))
                },
                ColumnDef::new("text", Value::Varchar(None)),
            ],
        }
    }
}

impl Default for SequenceLineMeta {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityMetamodel for SequenceLineMeta {
    type Entity = SequenceLine;

    fn table_name(&self) -> &str {
        "sequence_line"
    }

    fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    fn id_strategy(&self) -> IdStrategy {
        IdStrategy::Sequence {
            name: Cow::Borrowed("sequence_line_seq"),
            start_with: 1,
            increment_by: 1,
        }
    }

    fn to_row(&self, entity: &SequenceLine) -> Vec<Value> {
        vec![
            Value::Int64(Some(entity.id)),
            Value::Varchar(Some(entity.text.clone())),
        ]
    }

    fn from_row(&self, row: &RowLabeled) -> Result<SequenceLine> {
        Ok(SequenceLine {
            id: read(row, "id")?,
            text: read(row, "text")?,
        })
    }

    fn with_value(&self, entity: &SequenceLine, column: &str, value: Value) -> Result<SequenceLine> {
        let mut entity = entity.clone();
        match column {
            "id" => entity.id = FromValue::from_value(&value)?,
            "text" => entity.text = FromValue::from_value(&value)?,
            other => return Err(Error::msg(format!("no column `{other}` on sequence_line"))),
        }
        Ok(entity)
    }
}

pub const SEQUENCE_LINE_SCHEMA: &str = "\
    DROP TABLE IF EXISTS sequence_line;\n\
    DROP SEQUENCE IF EXISTS sequence_line_seq;\n\
    CREATE TABLE sequence_line (\
    id BIGINT PRIMARY KEY, \
    text VARCHAR NOT NULL);\n\
    CREATE SEQUENCE sequence_line_seq START WITH 1 INCREMENT BY 1";
