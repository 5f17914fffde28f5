//! Enforcement at trust boundaries
//!
//! Call sites that do not know whether their input is already a record,
//! still raw data, or absent hand it to `enforce`:
//!
//! | input                      | result                       |
//! |----------------------------|------------------------------|
//! | none, `allow_none`         | `Ok(None)`                   |
//! | any, type is not a schema  | `EnforceError::Type`         |
//! | none                       | `EnforceError::Missing`      |
//! | record of the schema       | the record, unchanged        |
//! | mapping                    | decoded (`EnforceError::Decode` on failure) |
//! | anything else              | `EnforceError::Type`         |

use super::errors::{EnforceError, EnforceResult, TypeError};
use super::registry::{Resolved, SchemaRegistry};
use super::types::Schema;
use super::value::{Record, Value};

impl Schema {
    /// Accepts a record of this schema, decodes a mapping, or resolves
    /// absence according to `allow_none`.
    pub fn enforce(&self, value: Option<Value>, allow_none: bool) -> EnforceResult<Option<Record>> {
        let value = match value {
            None | Some(Value::Null) if allow_none => return Ok(None),
            None | Some(Value::Null) => return Err(EnforceError::Missing(self.name().to_string())),
            Some(value) => value,
        };

        match value {
            Value::Record(record) if record.is_instance_of(self) => Ok(Some(record)),
            Value::Map(map) => Ok(Some(self.decode_map(&map)?)),
            other => Err(TypeError::IncompatibleValue {
                expected: self.name().to_string(),
                actual: other.type_name(),
            }
            .into()),
        }
    }
}

impl SchemaRegistry {
    /// `Schema::enforce` by type name.
    ///
    /// A name that is not a declared schema (a scalar, a token type, or
    /// nothing at all) is a type error, unless the value is absent and
    /// `allow_none` is set.
    pub fn enforce(
        &self,
        type_name: &str,
        value: Option<Value>,
        allow_none: bool,
    ) -> EnforceResult<Option<Record>> {
        if allow_none && value.as_ref().map_or(true, Value::is_null) {
            return Ok(None);
        }
        match self.resolve(type_name) {
            Some(Resolved::Schema(schema)) => schema.enforce(value, allow_none),
            _ => Err(TypeError::NotASchema(type_name.to_string()).into()),
        }
    }
}
