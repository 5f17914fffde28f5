//! In-memory data model
//!
//! `Value` carries both raw input (decoded JSON, `Map`) and typed data
//! (scalar values, `Record`), so a mapping handed to the decoder may already
//! contain decoded parts.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, TimeZone};
use uuid::Uuid;

use crate::scalar::{Date, DateTime, Email, IanaTimeZone, Phone, Token};

use super::errors::DecodeResult;
use super::types::Schema;

/// Raw key/value input
pub type Map = BTreeMap<String, Value>;

/// A raw or typed value.
#[derive(Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Uuid(Uuid),
    Email(Email),
    Phone(Phone),
    Date(Date),
    DateTime(DateTime),
    TimeZone(IanaTimeZone),
    Token(Token),
    List(Vec<Value>),
    Map(Map),
    Record(Record),
}

impl Value {
    /// Type label used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "str",
            Value::Uuid(_) => "UUID",
            Value::Email(_) => "Email",
            Value::Phone(_) => "Phone",
            Value::Date(_) => "Date",
            Value::DateTime(_) => "DateTime",
            Value::TimeZone(_) => "IANATimeZone",
            Value::Token(_) => "token",
            Value::List(_) => "list",
            Value::Map(_) => "mapping",
            Value::Record(_) => "record",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("None"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Uuid(u) => write!(f, "UUID({:?})", u.to_string()),
            Value::Email(v) => write!(f, "Email({:?})", v.as_str()),
            Value::Phone(v) => write!(f, "Phone({:?})", v.as_str()),
            Value::Date(v) => write!(f, "Date({:?})", v.to_string()),
            Value::DateTime(v) => write!(f, "DateTime({:?})", v.to_string()),
            Value::TimeZone(v) => write!(f, "IANATimeZone({:?})", v.name()),
            Value::Token(t) => write!(
                f,
                "{}({})",
                t.type_name(),
                serde_json::Value::Object(t.claims().clone())
            ),
            Value::List(items) => f.debug_list().entries(items).finish(),
            Value::Map(map) => f.debug_map().entries(map).finish(),
            Value::Record(record) => fmt::Debug::fmt(record, f),
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    i64 => Int,
    f64 => Float,
    String => String,
    Uuid => Uuid,
    Email => Email,
    Phone => Phone,
    Date => Date,
    DateTime => DateTime,
    IanaTimeZone => TimeZone,
    Token => Token,
    Vec<Value> => List,
    Map => Map,
    Record => Record,
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v.into())
    }
}

impl<Tz: TimeZone> From<chrono::DateTime<Tz>> for Value {
    fn from(v: chrono::DateTime<Tz>) -> Self {
        Value::DateTime(v.into())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(object) => Value::Map(
                object
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

/// A value of a declared schema.
///
/// Field values are stored in declaration order. Two records are equal only
/// when they belong to the same schema and every field compares equal.
#[derive(Clone)]
pub struct Record {
    schema: Schema,
    values: Vec<Value>,
}

impl Record {
    pub(crate) fn from_parts(schema: Schema, values: Vec<Value>) -> Self {
        debug_assert_eq!(schema.fields().len(), values.len());
        Self { schema, values }
    }

    /// The schema this record belongs to
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Whether this record is an instance of `schema`
    pub fn is_instance_of(&self, schema: &Schema) -> bool {
        &self.schema == schema
    }

    /// Current value of a field
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.schema.position(field).map(|i| &self.values[i])
    }

    /// Assign a field, coercing the value to the field's shape.
    ///
    /// Null resets an optional field to its default; unknown fields and values that do not
    /// fit the shape are rejected and leave the record unchanged.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> DecodeResult<()> {
        let position = self.schema.position(field).ok_or_else(|| {
            super::errors::DecodeError::UnexpectedField {
                path: super::errors::ROOT_PATH.to_string(),
                fields: vec![field.to_string()],
            }
        })?;
        let spec = &self.schema.fields()[position];
        let coerced = super::decoder::assign_field(spec, value.into())?;
        self.values[position] = coerced;
        Ok(())
    }

    /// `(name, value)` pairs in declaration order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.schema
            .fields()
            .iter()
            .map(|spec| spec.name())
            .zip(self.values.iter())
    }

    pub(crate) fn values(&self) -> &[Value] {
        &self.values
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.schema == other.schema && self.values == other.values
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.schema.name())?;
        for (name, value) in self.fields() {
            write!(f, " {}={:?}", name, value)?;
        }
        f.write_str(" >")
    }
}
