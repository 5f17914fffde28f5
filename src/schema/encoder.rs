//! Encoding records back to plain JSON data
//!
//! Two modes:
//! - full: every declared field, in declaration order, unset optionals as null
//! - minimal: fields whose value equals the declared default are omitted,
//!   recursively through nested records and lists of records
//!
//! Scalar values encode to their canonical string form (E.164 phone,
//! ISO-8601 date, RFC 3339 datetime, zone name, compact token).

use serde::ser::{Serialize, Serializer};
use serde_json::{Map as JsonMap, Number, Value as Json};

use super::value::{Record, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Full,
    Minimal,
}

impl Record {
    /// Every declared field, in declaration order.
    pub fn encode_full(&self) -> Json {
        encode_record(self, Mode::Full)
    }

    /// Only the fields that differ from their declared default.
    pub fn encode_minimal(&self) -> Json {
        encode_record(self, Mode::Minimal)
    }

    /// Full encoding serialised as a JSON string.
    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Encode a single value in full mode.
pub fn encode_value(value: &Value) -> Json {
    encode(value, Mode::Full)
}

fn encode_record(record: &Record, mode: Mode) -> Json {
    let mut object = JsonMap::new();
    for (spec, value) in record.schema().fields().iter().zip(record.values()) {
        if mode == Mode::Minimal && value == spec.default_value() {
            continue;
        }
        object.insert(spec.name().to_string(), encode(value, mode));
    }
    Json::Object(object)
}

fn encode(value: &Value, mode: Mode) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => Json::Number((*i).into()),
        Value::Float(x) => Number::from_f64(*x).map_or(Json::Null, Json::Number),
        Value::String(s) => Json::String(s.clone()),
        Value::Uuid(u) => Json::String(u.to_string()),
        Value::Email(v) => Json::String(v.to_string()),
        Value::Phone(v) => Json::String(v.to_string()),
        Value::Date(v) => Json::String(v.to_string()),
        Value::DateTime(v) => Json::String(v.to_string()),
        Value::TimeZone(v) => Json::String(v.to_string()),
        Value::Token(v) => Json::String(v.to_string()),
        Value::List(items) => Json::Array(items.iter().map(|item| encode(item, mode)).collect()),
        Value::Map(map) => Json::Object(
            map.iter()
                .map(|(key, item)| (key.clone(), encode(item, mode)))
                .collect(),
        ),
        Value::Record(record) => encode_record(record, mode),
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        encode_value(self).serialize(serializer)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.encode_full().serialize(serializer)
    }
}
