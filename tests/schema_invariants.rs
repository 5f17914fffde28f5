//! Schema Invariant Tests
//!
//! Tests for decode invariants:
//! - Undeclared keys are rejected at every nesting level
//! - Required fields must be present
//! - Optional fields resolve to their defaults
//! - Unsupported field shapes are rejected at declaration time
//! - Records of different schemas are never equal

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use schemander::scalar::TokenConfig;
use schemander::schema::{DecodeError, SchemaBuilder, SchemaRegistry, Value};
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_user_registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    SchemaBuilder::new("User")
        .field("id", "UUID")
        .field("name_first", "str")
        .field("name_middle", "str | None")
        .field("name_last", "str")
        .field("email", "Email")
        .field("phone", "Phone | None")
        .field("date_of_birth", "Date")
        .field("timezone", "IANATimeZone")
        .declare(&mut registry)
        .unwrap();
    registry
}

fn user_data() -> serde_json::Value {
    json!({
        "id": "5f85b586-a08b-4a1f-8086-4e6228a7aa7f",
        "name_first": "Jenny",
        "name_last": "Totone",
        "date_of_birth": "1990-01-01",
        "email": "example@example.com",
        "phone": "+1 (619) 867-5309",
        "timezone": "America/Los_Angeles",
    })
}

fn nested_registry(extra_optional: bool) -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    let mut one = SchemaBuilder::new("DummySchemaOne").field("field", "str");
    if extra_optional {
        one = one.field("extra", "str | None");
    }
    one.declare(&mut registry).unwrap();
    SchemaBuilder::new("DummySchemaTwo")
        .field("field", "List[DummySchemaOne]")
        .declare(&mut registry)
        .unwrap();
    registry
}

// =============================================================================
// Decode Tests
// =============================================================================

/// A realistic document decodes into typed values.
#[test]
fn test_user_document_decodes() {
    let registry = setup_user_registry();
    let user = registry.decode("User", &user_data().into()).unwrap();

    assert!(matches!(user.get("id"), Some(Value::Uuid(_))));
    assert_eq!(user.get("name_middle"), Some(&Value::Null));
    assert_eq!(
        format!("{:?}", user.get("phone").unwrap()),
        "Phone(\"+16198675309\")"
    );
    assert_eq!(
        format!("{:?}", user.get("timezone").unwrap()),
        "IANATimeZone(\"America/Los_Angeles\")"
    );
}

/// Same document decodes the same way every time.
#[test]
fn test_decode_is_deterministic() {
    let registry = setup_user_registry();
    let first = registry.decode("User", &user_data().into()).unwrap();
    for _ in 0..100 {
        assert_eq!(registry.decode("User", &user_data().into()).unwrap(), first);
    }
}

// =============================================================================
// Strictness Tests
// =============================================================================

/// Extra top-level keys are rejected.
#[test]
fn test_extra_key_rejected() {
    let registry = setup_user_registry();
    let mut data = user_data();
    data["unexpected_key"] = json!("foo");

    let err = registry.decode("User", &data.into()).unwrap_err();
    assert!(matches!(err, DecodeError::UnexpectedField { ref fields, .. } if fields == &["unexpected_key"]));
}

/// Missing required field fails.
#[test]
fn test_missing_required_field() {
    let registry = setup_user_registry();
    let mut data = user_data();
    data.as_object_mut().unwrap().remove("email");

    let err = registry.decode("User", &data.into()).unwrap_err();
    assert_eq!(err, DecodeError::MissingField { path: "email".into() });
}

/// Each list element is checked for undeclared keys on its own.
#[test]
fn test_list_of_schemas_non_homogeneous() {
    let registry = nested_registry(false);
    let data = json!({ "field": [{ "field": "value" }, { "field": "value", "extra": "foo" }] });

    let err = registry.decode("DummySchemaTwo", &data.into()).unwrap_err();
    assert_eq!(err.code(), "DECODE_UNEXPECTED_FIELD");
    assert_eq!(err.path(), "field[1]");
}

/// A declared optional key may be present in some elements and absent in others.
#[test]
fn test_list_of_schemas_with_optional_field() {
    let registry = nested_registry(true);
    let data = json!({ "field": [{ "field": "value" }, { "field": "value", "extra": "foo" }] });

    let record = registry.decode("DummySchemaTwo", &data.into()).unwrap();
    let items = record.get("field").and_then(Value::as_list).unwrap();
    assert_eq!(items[0].as_record().unwrap().get("extra"), Some(&Value::Null));
    assert_eq!(items[1].as_record().unwrap().get("extra"), Some(&Value::from("foo")));
}

/// Input may mix raw mappings and already decoded records.
#[test]
fn test_records_mixed_into_input() {
    let registry = nested_registry(false);
    let inner = registry
        .decode("DummySchemaOne", &json!({ "field": "value" }).into())
        .unwrap();

    let data = Value::Map(
        [(
            "field".to_string(),
            Value::List(vec![json!({ "field": "value" }).into(), Value::Record(inner.clone())]),
        )]
        .into_iter()
        .collect(),
    );
    let record = registry.decode("DummySchemaTwo", &data).unwrap();
    let items = record.get("field").and_then(Value::as_list).unwrap();
    assert_eq!(items[0], Value::Record(inner.clone()));
    assert_eq!(items[1], Value::Record(inner));
}

/// A token verified by another registry's type is re-verified, even when the
/// type names match.
#[test]
fn test_token_from_other_registry_reverified() {
    let mut attacker = SchemaRegistry::new();
    let forger = attacker
        .declare_token_type("Auth", TokenConfig::hmac("attacker-secret", vec![Algorithm::HS256]))
        .unwrap();

    let mut server = SchemaRegistry::new();
    server
        .declare_token_type("Auth", TokenConfig::hmac("server-secret", vec![Algorithm::HS256]))
        .unwrap();
    SchemaBuilder::new("Session")
        .field("auth", "Auth")
        .declare(&mut server)
        .unwrap();

    let compact = encode(
        &Header::new(Algorithm::HS256),
        &json!({ "sub": "admin" }),
        &EncodingKey::from_secret(b"attacker-secret"),
    )
    .unwrap();
    let forged = forger.parse(&compact).unwrap();
    assert_eq!(forged.type_name(), "Auth");

    let data = Value::Map(
        [("auth".to_string(), Value::Token(forged))]
            .into_iter()
            .collect(),
    );
    let err = server.decode("Session", &data).unwrap_err();
    assert_eq!(err.code(), "DECODE_FORMAT_INVALID");
    assert_eq!(err.path(), "auth");
}

// =============================================================================
// Declaration Tests
// =============================================================================

/// A schema with no fields decodes only the empty mapping.
#[test]
fn test_schema_without_fields() {
    let mut registry = SchemaRegistry::new();
    let empty = SchemaBuilder::new("Schema").declare(&mut registry).unwrap();

    let record = empty.decode_json(&json!({})).unwrap();
    assert_eq!(format!("{:?}", record), "<Schema >");
    assert!(empty.decode_json(&json!({ "a": 1 })).is_err());
}

/// Tuples and multi-type unions have no decode strategy.
#[test]
fn test_bad_annotations_rejected() {
    for annotation in ["Tuple[str]", "str | int"] {
        let mut registry = SchemaRegistry::new();
        let err = SchemaBuilder::new("DummySchemaOne")
            .field("field", annotation)
            .declare(&mut registry)
            .unwrap_err();
        assert_eq!(err.code(), "SCHEMA_UNSUPPORTED_SHAPE");
    }
}

// =============================================================================
// Equality and Representation Tests
// =============================================================================

#[test]
fn test_inequality_same_schema_different_values() {
    let mut registry = SchemaRegistry::new();
    let schema = SchemaBuilder::new("SchemaTest")
        .field("field", "str")
        .declare(&mut registry)
        .unwrap();

    let one = schema.decode_json(&json!({ "field": "1" })).unwrap();
    let two = schema.decode_json(&json!({ "field": "2" })).unwrap();
    assert_ne!(one, two);
    assert_eq!(one, schema.decode_json(&json!({ "field": "1" })).unwrap());
}

#[test]
fn test_inequality_different_schema_same_values() {
    let mut registry = SchemaRegistry::new();
    let one = SchemaBuilder::new("SchemaOne")
        .field("field", "str")
        .declare(&mut registry)
        .unwrap();
    let two = SchemaBuilder::new("SchemaTwo")
        .field("field", "str")
        .declare(&mut registry)
        .unwrap();

    let data = json!({ "field": "1" });
    assert_ne!(one.decode_json(&data).unwrap(), two.decode_json(&data).unwrap());
}

#[test]
fn test_repr_one_field() {
    let mut registry = SchemaRegistry::new();
    let schema = SchemaBuilder::new("SchemaTest")
        .field("field", "str")
        .declare(&mut registry)
        .unwrap();

    let record = schema.decode_json(&json!({ "field": "1" })).unwrap();
    assert_eq!(format!("{:?}", record), "<SchemaTest field=\"1\" >");
}
