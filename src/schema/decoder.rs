//! Recursive decode of raw values into records
//!
//! Decode semantics:
//! - Undeclared keys are rejected before any field is decoded, at every
//!   nesting level (including each element of a list of schemas)
//! - Required fields must be present
//! - Optional fields that are absent or null resolve to their default
//! - Values that are already typed (records, scalar values) are accepted as-is
//! - The first failure aborts the decode; its error carries the path

use uuid::Uuid;

use crate::scalar::{Date, DateTime, Email, FormatError, IanaTimeZone, Phone, ScalarResult, ScalarType};

use super::errors::{DecodeError, DecodeResult, ROOT_PATH};
use super::types::{FieldSpec, ScalarKind, Schema, Shape};
use super::value::{Map, Record, Value};

impl Schema {
    /// Decodes a mapping (or an existing record of this schema) into a record.
    pub fn decode(&self, raw: &Value) -> DecodeResult<Record> {
        decode_record(self, raw, "")
    }

    /// Decodes a mapping into a record.
    pub fn decode_map(&self, map: &Map) -> DecodeResult<Record> {
        decode_map(self, map, "")
    }

    /// Decodes JSON data (as produced by `serde_json`) into a record.
    pub fn decode_json(&self, json: &serde_json::Value) -> DecodeResult<Record> {
        self.decode(&Value::from(json.clone()))
    }
}

/// Creates a field path from prefix and field name.
fn make_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}

/// Path as reported in errors
fn display_path(path: &str) -> String {
    if path.is_empty() {
        ROOT_PATH.to_string()
    } else {
        path.to_string()
    }
}

pub(crate) fn decode_record(schema: &Schema, raw: &Value, path: &str) -> DecodeResult<Record> {
    match raw {
        Value::Record(record) if record.is_instance_of(schema) => Ok(record.clone()),
        Value::Map(map) => decode_map(schema, map, path),
        other => Err(DecodeError::ShapeMismatch {
            path: display_path(path),
            expected: format!("mapping for {}", schema.name()),
            actual: other.type_name(),
        }),
    }
}

pub(crate) fn decode_map(schema: &Schema, map: &Map, path: &str) -> DecodeResult<Record> {
    let unexpected: Vec<String> = map
        .keys()
        .filter(|key| schema.field(key).is_none())
        .cloned()
        .collect();
    if !unexpected.is_empty() {
        return Err(DecodeError::UnexpectedField {
            path: display_path(path),
            fields: unexpected,
        });
    }

    let values = schema
        .fields()
        .iter()
        .map(|spec| decode_field(spec, map.get(spec.name()), &make_path(path, spec.name())))
        .collect::<DecodeResult<Vec<_>>>()?;

    Ok(Record::from_parts(schema.clone(), values))
}

fn decode_field(spec: &FieldSpec, raw: Option<&Value>, path: &str) -> DecodeResult<Value> {
    match raw {
        None | Some(Value::Null) if spec.is_optional() => Ok(spec.default_value().clone()),
        None => Err(DecodeError::MissingField {
            path: path.to_string(),
        }),
        Some(raw) => decode_value(spec.shape(), raw, path),
    }
}

/// Coerces a value assigned directly to a record field.
pub(crate) fn assign_field(spec: &FieldSpec, value: Value) -> DecodeResult<Value> {
    match value {
        Value::Null if spec.is_optional() => Ok(spec.default_value().clone()),
        Value::Null => Err(DecodeError::MissingField {
            path: spec.name().to_string(),
        }),
        value => decode_value(spec.shape(), &value, spec.name()),
    }
}

pub(crate) fn decode_value(shape: &Shape, raw: &Value, path: &str) -> DecodeResult<Value> {
    match shape {
        Shape::Scalar(kind) => decode_scalar(kind, raw, path),
        Shape::Nested(schema) => decode_record(schema, raw, path).map(Value::Record),
        Shape::List { element, nullable } => {
            let items = match raw {
                Value::List(items) => items,
                other => {
                    return Err(DecodeError::ShapeMismatch {
                        path: display_path(path),
                        expected: "list".to_string(),
                        actual: other.type_name(),
                    })
                }
            };

            items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    if item.is_null() && *nullable {
                        return Ok(Value::Null);
                    }
                    decode_value(element, item, &format!("{}[{}]", path, i))
                })
                .collect::<DecodeResult<Vec<_>>>()
                .map(Value::List)
        }
    }
}

fn decode_scalar(kind: &ScalarKind, raw: &Value, path: &str) -> DecodeResult<Value> {
    let format_error = |source: FormatError| DecodeError::Format {
        path: display_path(path),
        source,
    };

    match (kind, raw) {
        (ScalarKind::Str, Value::String(_))
        | (ScalarKind::Int, Value::Int(_))
        | (ScalarKind::Float, Value::Float(_))
        | (ScalarKind::Bool, Value::Bool(_))
        | (ScalarKind::Uuid, Value::Uuid(_))
        | (ScalarKind::Email, Value::Email(_))
        | (ScalarKind::Phone, Value::Phone(_))
        | (ScalarKind::Date, Value::Date(_))
        | (ScalarKind::DateTime, Value::DateTime(_))
        | (ScalarKind::TimeZone, Value::TimeZone(_)) => Ok(raw.clone()),
        (ScalarKind::Float, Value::Int(i)) => Ok(Value::Float(*i as f64)),
        (ScalarKind::Token(token_type), Value::Token(token)) => {
            if token.verified_by(token_type) {
                Ok(raw.clone())
            } else {
                token_type
                    .parse(token.as_str())
                    .map(Value::Token)
                    .map_err(format_error)
            }
        }
        (kind, Value::String(s)) => parse_scalar(kind, s).map_err(format_error),
        (kind, other) => Err(format_error(FormatError::new(
            kind.name(),
            format!("{:?}", other),
            format!("expected {}, got {}", kind.name(), other.type_name()),
        ))),
    }
}

fn parse_scalar(kind: &ScalarKind, input: &str) -> ScalarResult<Value> {
    match kind {
        ScalarKind::Uuid => Uuid::parse_str(input)
            .map(Value::Uuid)
            .map_err(|e| FormatError::new("UUID", input, e.to_string())),
        ScalarKind::Email => Email::parse(input).map(Value::Email),
        ScalarKind::Phone => Phone::parse(input).map(Value::Phone),
        ScalarKind::Date => Date::parse(input).map(Value::Date),
        ScalarKind::DateTime => DateTime::parse(input).map(Value::DateTime),
        ScalarKind::TimeZone => IanaTimeZone::parse(input).map(Value::TimeZone),
        ScalarKind::Token(token_type) => token_type.parse(input).map(Value::Token),
        ScalarKind::Str => Ok(Value::String(input.to_string())),
        ScalarKind::Int | ScalarKind::Float | ScalarKind::Bool => Err(FormatError::new(
            kind.name(),
            input,
            format!("expected {}, got str", kind.name()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{SchemaBuilder, SchemaRegistry};
    use serde_json::json;

    fn user_registry() -> (SchemaRegistry, Schema) {
        let mut registry = SchemaRegistry::new();
        SchemaBuilder::new("Address")
            .field("city", "str")
            .field("zip", "str | None")
            .declare(&mut registry)
            .unwrap();
        let user = SchemaBuilder::new("User")
            .field("id", "UUID")
            .field("name", "str")
            .field("age", "int | None")
            .field("email", "Email")
            .field("born", "Date")
            .field("address", "Address")
            .field("previous", "List[Address]")
            .declare(&mut registry)
            .unwrap();
        (registry, user)
    }

    fn valid_user() -> serde_json::Value {
        json!({
            "id": "5f85b586-a08b-4a1f-8086-4e6228a7aa7f",
            "name": "Jenny",
            "email": "example@example.com",
            "born": "19900101",
            "address": { "city": "Tijuana" },
            "previous": [{ "city": "San Diego", "zip": "92101" }],
        })
    }

    #[test]
    fn test_decode_valid_document() {
        let (_registry, user) = user_registry();
        let record = user.decode_json(&valid_user()).unwrap();

        assert_eq!(record.get("name"), Some(&Value::from("Jenny")));
        assert_eq!(record.get("age"), Some(&Value::Null));
        assert!(matches!(record.get("id"), Some(Value::Uuid(_))));
        assert_eq!(record.get("born").unwrap(), &Value::Date(Date::parse("1990-01-01").unwrap()));

        let address = record.get("address").and_then(Value::as_record).unwrap();
        assert_eq!(address.get("zip"), Some(&Value::Null));
    }

    #[test]
    fn test_unexpected_field_at_root() {
        let (_registry, user) = user_registry();
        let mut doc = valid_user();
        doc["unexpected_key"] = json!("x");

        let err = user.decode_json(&doc).unwrap_err();
        assert_eq!(
            err,
            DecodeError::UnexpectedField {
                path: "$root".into(),
                fields: vec!["unexpected_key".into()],
            }
        );
    }

    #[test]
    fn test_unexpected_field_in_list_element() {
        let (_registry, user) = user_registry();
        let mut doc = valid_user();
        doc["previous"] = json!([{ "city": "A" }, { "city": "B", "country": "MX" }]);

        let err = user.decode_json(&doc).unwrap_err();
        assert_eq!(err.code(), "DECODE_UNEXPECTED_FIELD");
        assert_eq!(err.path(), "previous[1]");
    }

    #[test]
    fn test_missing_required_nested_field() {
        let (_registry, user) = user_registry();
        let mut doc = valid_user();
        doc["address"] = json!({ "zip": "22000" });

        let err = user.decode_json(&doc).unwrap_err();
        assert_eq!(err, DecodeError::MissingField { path: "address.city".into() });
    }

    #[test]
    fn test_scalar_format_error_carries_path() {
        let (_registry, user) = user_registry();
        let mut doc = valid_user();
        doc["email"] = json!("ex@ample@example.com");

        let err = user.decode_json(&doc).unwrap_err();
        match err {
            DecodeError::Format { path, source } => {
                assert_eq!(path, "email");
                assert_eq!(source.kind(), "Email");
            }
            other => panic!("expected format error, got {:?}", other),
        }
    }

    #[test]
    fn test_primitives_are_strict() {
        let (_registry, user) = user_registry();
        let mut doc = valid_user();
        doc["age"] = json!("34");
        assert_eq!(user.decode_json(&doc).unwrap_err().path(), "age");

        let mut doc = valid_user();
        doc["name"] = json!(12);
        assert_eq!(user.decode_json(&doc).unwrap_err().path(), "name");
    }

    #[test]
    fn test_shape_mismatch_for_list_and_nested() {
        let (_registry, user) = user_registry();
        let mut doc = valid_user();
        doc["previous"] = json!({ "city": "A" });
        assert!(matches!(
            user.decode_json(&doc).unwrap_err(),
            DecodeError::ShapeMismatch { ref path, actual: "mapping", .. } if path == "previous"
        ));

        let mut doc = valid_user();
        doc["address"] = json!("Tijuana");
        assert!(matches!(
            user.decode_json(&doc).unwrap_err(),
            DecodeError::ShapeMismatch { actual: "str", .. }
        ));
    }

    #[test]
    fn test_non_mapping_root_rejected() {
        let (_registry, user) = user_registry();
        let err = user.decode(&Value::from("not a mapping")).unwrap_err();
        assert_eq!(err.path(), "$root");
    }

    #[test]
    fn test_typed_values_accepted_as_is() {
        let (registry, user) = user_registry();
        let address = registry
            .get("Address")
            .unwrap()
            .decode_json(&json!({ "city": "Ensenada" }))
            .unwrap();

        let mut map = match Value::from(valid_user()) {
            Value::Map(map) => map,
            _ => unreachable!(),
        };
        map.insert("address".into(), Value::Record(address.clone()));
        map.insert("email".into(), Value::Email(Email::parse("a@example.com").unwrap()));

        let record = user.decode_map(&map).unwrap();
        assert_eq!(record.get("address"), Some(&Value::Record(address)));
    }

    #[test]
    fn test_float_accepts_integers() {
        let mut registry = SchemaRegistry::new();
        let score = SchemaBuilder::new("Score")
            .field("value", "float")
            .declare(&mut registry)
            .unwrap();
        let record = score.decode_json(&json!({ "value": 100 })).unwrap();
        assert_eq!(record.get("value"), Some(&Value::Float(100.0)));
    }

    #[test]
    fn test_nullable_list_elements() {
        let mut registry = SchemaRegistry::new();
        let dates = SchemaBuilder::new("Dates")
            .field("values", "List[Optional[Date]]")
            .field("strict", "List[Date]")
            .declare(&mut registry)
            .unwrap();

        let record = dates
            .decode_json(&json!({ "values": ["1990-01-01", null], "strict": [] }))
            .unwrap();
        assert_eq!(record.get("values").and_then(Value::as_list).unwrap()[1], Value::Null);

        let err = dates
            .decode_json(&json!({ "values": [], "strict": ["1990-01-01", null] }))
            .unwrap_err();
        assert_eq!(err.path(), "strict[1]");
    }

    #[test]
    fn test_set_coerces_and_validates() {
        let (_registry, user) = user_registry();
        let mut record = user.decode_json(&valid_user()).unwrap();

        record.set("email", "new@example.com").unwrap();
        assert!(matches!(record.get("email"), Some(Value::Email(_))));

        assert!(record.set("email", "broken").is_err());
        assert_eq!(
            record.get("email").map(|v| format!("{:?}", v)).unwrap(),
            "Email(\"new@example.com\")"
        );

        assert!(record.set("unknown", 1).is_err());
        assert!(record.set("name", None::<String>).is_err());
        record.set("age", 40).unwrap();
        record.set("age", None::<i64>).unwrap();
        assert_eq!(record.get("age"), Some(&Value::Null));
    }
}
