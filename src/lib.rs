//! schemander - schema declaration and data coercion
//!
//! Declares record schemas with typed fields, coerces untyped key/value
//! data (usually decoded JSON) into typed records, and encodes records back.
//! Scalar field types validate and canonicalise themselves: email addresses,
//! phone numbers, dates, datetimes, IANA time zones and signed tokens.

pub mod cli;
pub mod scalar;
pub mod schema;

pub use scalar::{FormatError, ScalarType};
pub use schema::{
    DeclarationError, DecodeError, EnforceError, Record, Schema, SchemaBuilder, SchemaLoader,
    SchemaRegistry, Value,
};
