//! Compiled schema types
//!
//! A `Schema` is an immutable, shared table of `FieldSpec`s in declaration
//! order. It is built once by the registry and never mutated; records hold
//! a handle to it. Schema identity is handle identity: two schemas declared
//! with the same fields are still different types.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::scalar::{Date, DateTime, Email, IanaTimeZone, Phone, ScalarType, TokenType};

use super::value::Value;

/// Scalar field types.
#[derive(Debug, Clone)]
pub enum ScalarKind {
    Str,
    Int,
    Float,
    Bool,
    Uuid,
    Email,
    Phone,
    Date,
    DateTime,
    TimeZone,
    /// A registered token type
    Token(Arc<TokenType>),
}

impl ScalarKind {
    /// Looks up a built-in scalar by annotation name
    pub fn builtin(name: &str) -> Option<Self> {
        let kind = match name {
            "str" | "String" => ScalarKind::Str,
            "int" => ScalarKind::Int,
            "float" => ScalarKind::Float,
            "bool" => ScalarKind::Bool,
            "UUID" | "Uuid" => ScalarKind::Uuid,
            "Email" => ScalarKind::Email,
            "Phone" => ScalarKind::Phone,
            "Date" => ScalarKind::Date,
            "DateTime" => ScalarKind::DateTime,
            "IANATimeZone" => ScalarKind::TimeZone,
            _ => return None,
        };
        Some(kind)
    }

    /// Annotation name of this scalar
    pub fn name(&self) -> &str {
        match self {
            ScalarKind::Str => "str",
            ScalarKind::Int => "int",
            ScalarKind::Float => "float",
            ScalarKind::Bool => "bool",
            ScalarKind::Uuid => "UUID",
            ScalarKind::Email => Email::NAME,
            ScalarKind::Phone => Phone::NAME,
            ScalarKind::Date => Date::NAME,
            ScalarKind::DateTime => DateTime::NAME,
            ScalarKind::TimeZone => IanaTimeZone::NAME,
            ScalarKind::Token(token) => token.name(),
        }
    }
}

impl PartialEq for ScalarKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ScalarKind::Token(a), ScalarKind::Token(b)) => Arc::ptr_eq(a, b),
            (a, b) => std::mem::discriminant(a) == std::mem::discriminant(b),
        }
    }
}

/// Coercion strategy for a field.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Scalar(ScalarKind),
    Nested(Schema),
    List {
        element: Box<Shape>,
        /// Elements may be null (`List[Optional[T]]`)
        nullable: bool,
    },
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Scalar(kind) => f.write_str(kind.name()),
            Shape::Nested(schema) => f.write_str(schema.name()),
            Shape::List {
                element,
                nullable: true,
            } => write!(f, "List[Optional[{}]]", element),
            Shape::List { element, .. } => write!(f, "List[{}]", element),
        }
    }
}

/// Compiled descriptor of one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    name: String,
    shape: Shape,
    optional: bool,
    /// `Value::Null` when no default was declared
    default: Value,
}

impl FieldSpec {
    pub(crate) fn new(name: String, shape: Shape, optional: bool, default: Value) -> Self {
        Self {
            name,
            shape,
            optional,
            default,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// The value an absent optional field resolves to
    pub fn default_value(&self) -> &Value {
        &self.default
    }

    /// Annotation-style description, e.g. `Optional[Email]`
    pub fn describe(&self) -> String {
        if self.optional {
            format!("Optional[{}]", self.shape)
        } else {
            self.shape.to_string()
        }
    }
}

struct SchemaDef {
    name: String,
    fields: Vec<FieldSpec>,
    positions: HashMap<String, usize>,
}

/// Handle to a declared schema.
#[derive(Clone)]
pub struct Schema(Arc<SchemaDef>);

impl Schema {
    pub(crate) fn new(name: String, fields: Vec<FieldSpec>) -> Self {
        let positions = fields
            .iter()
            .enumerate()
            .map(|(i, field)| (field.name.clone(), i))
            .collect();
        Self(Arc::new(SchemaDef {
            name,
            fields,
            positions,
        }))
    }

    /// Schema type name
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &[FieldSpec] {
        &self.0.fields
    }

    /// Looks up a field by name
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.position(name).map(|i| &self.0.fields[i])
    }

    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        self.0.positions.get(name).copied()
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<(&str, String)> = self
            .fields()
            .iter()
            .map(|field| (field.name(), field.describe()))
            .collect();
        f.debug_struct("Schema")
            .field("name", &self.name())
            .field("fields", &fields)
            .finish()
    }
}
