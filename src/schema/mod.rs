//! Schema declaration and coercion
//!
//! Schemas are declared once through a `SchemaRegistry` and are immutable
//! afterwards. Raw key/value data (usually decoded JSON) is coerced into
//! `Record`s against a schema and encoded back to plain JSON.
//!
//! # Design Principles
//!
//! - Field shapes are classified at declaration time, never per decode
//! - Undeclared input keys are always rejected, at every nesting level
//! - Decoding fails fast; errors carry the path of the offending value
//! - Scalars keep only their canonical form
//! - Records of different schemas are never equal

mod annotation;
mod decoder;
mod encoder;
mod enforce;
mod errors;
mod loader;
mod registry;
mod types;
mod value;

pub use annotation::Annotation;
pub use encoder::encode_value;
pub use errors::{
    AnnotationError, DeclarationError, DeclarationResult, DecodeError, DecodeResult,
    EnforceError, EnforceResult, TypeError,
};
pub use loader::SchemaLoader;
pub use registry::{Resolved, SchemaBuilder, SchemaRegistry};
pub use types::{FieldSpec, ScalarKind, Schema, Shape};
pub use value::{Map, Record, Value};
