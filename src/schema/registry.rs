//! Schema registry
//!
//! Declarations are classified once, when a schema is declared:
//! - `T` (scalar, token type or declared schema) → required field
//! - `Optional[T]`, `T | None`, `Union[T, None]` → optional field
//! - `List[T]`, `List[Optional[T]]` → list (elements nullable for the latter)
//!
//! Anything else has no coercion strategy and is rejected with a
//! `DeclarationError`. Declared schemas are immutable; a name can only be
//! declared once.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::scalar::{TokenConfig, TokenType};

use super::annotation::Annotation;
use super::decoder::decode_value;
use super::errors::{
    AnnotationError, DeclarationError, DeclarationResult, DecodeError, DecodeResult, ROOT_PATH,
};
use super::types::{FieldSpec, ScalarKind, Schema, Shape};
use super::value::{Record, Value};

/// What a type name refers to
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Scalar(ScalarKind),
    Schema(Schema),
}

/// Arena of declared schemas and token types
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    /// Declaration order
    schemas: Vec<Schema>,
    by_name: HashMap<String, Schema>,
    tokens: HashMap<String, Arc<TokenType>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a token type so that fields can be annotated with its name.
    pub fn register_token_type(&mut self, token_type: TokenType) -> DeclarationResult<Arc<TokenType>> {
        let name = token_type.name().to_string();
        if self.resolve(&name).is_some() {
            warn!(name = %name, "token type name already declared");
            return Err(DeclarationError::DuplicateName(name));
        }
        let token_type = Arc::new(token_type);
        self.tokens.insert(name.clone(), Arc::clone(&token_type));
        debug!(name = %name, "declared token type");
        Ok(token_type)
    }

    /// Builds a token type from its configuration and registers it.
    pub fn declare_token_type(
        &mut self,
        name: &str,
        config: TokenConfig,
    ) -> DeclarationResult<Arc<TokenType>> {
        let token_type = TokenType::new(name, config).map_err(|source| {
            warn!(name = %name, error = %source, "rejected token configuration");
            DeclarationError::InvalidTokenConfig {
                name: name.to_string(),
                source,
            }
        })?;
        self.register_token_type(token_type)
    }

    /// Classifies the builder's fields and stores the resulting schema.
    pub fn declare(&mut self, builder: SchemaBuilder) -> DeclarationResult<Schema> {
        let name = builder.name.clone();
        match self.build(builder) {
            Ok(schema) => {
                self.schemas.push(schema.clone());
                self.by_name.insert(name.clone(), schema.clone());
                debug!(schema = %name, fields = schema.fields().len(), "declared schema");
                Ok(schema)
            }
            Err(e) => {
                warn!(schema = %name, code = e.code(), error = %e, "schema declaration rejected");
                Err(e)
            }
        }
    }

    /// Looks up a declared schema
    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.by_name.get(name)
    }

    /// Looks up a registered token type
    pub fn token_type(&self, name: &str) -> Option<&Arc<TokenType>> {
        self.tokens.get(name)
    }

    /// Resolves a type name: built-in scalars first, then token types, then schemas.
    pub fn resolve(&self, name: &str) -> Option<Resolved> {
        if let Some(kind) = ScalarKind::builtin(name) {
            return Some(Resolved::Scalar(kind));
        }
        if let Some(token_type) = self.tokens.get(name) {
            return Some(Resolved::Scalar(ScalarKind::Token(Arc::clone(token_type))));
        }
        self.by_name.get(name).cloned().map(Resolved::Schema)
    }

    /// Schemas in declaration order
    pub fn schemas(&self) -> &[Schema] {
        &self.schemas
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Decodes `raw` against the schema called `name`.
    ///
    /// An unknown name is reported as a shape mismatch at the root.
    pub fn decode(&self, name: &str, raw: &Value) -> DecodeResult<Record> {
        match self.get(name) {
            Some(schema) => schema.decode(raw),
            None => Err(DecodeError::ShapeMismatch {
                path: ROOT_PATH.to_string(),
                expected: format!("declared schema '{}'", name),
                actual: raw.type_name(),
            }),
        }
    }

    fn build(&self, builder: SchemaBuilder) -> DeclarationResult<Schema> {
        if self.resolve(&builder.name).is_some() {
            return Err(DeclarationError::DuplicateName(builder.name));
        }

        let mut fields: Vec<FieldSpec> = Vec::with_capacity(builder.fields.len());
        for decl in builder.fields {
            if fields.iter().any(|f| f.name() == decl.name) {
                return Err(DeclarationError::DuplicateField {
                    schema: builder.name,
                    field: decl.name,
                });
            }

            let annotation = decl.annotation.map_err(|source| DeclarationError::InvalidAnnotation {
                schema: builder.name.clone(),
                field: decl.name.clone(),
                source,
            })?;

            let ctx = FieldContext {
                schema: &builder.name,
                field: &decl.name,
                annotation: &annotation,
            };
            let (shape, optional) = self.classify(&ctx)?;
            let default = ctx.default_for(&shape, optional, decl.default)?;
            fields.push(FieldSpec::new(decl.name, shape, optional, default));
        }

        Ok(Schema::new(builder.name, fields))
    }

    fn classify(&self, ctx: &FieldContext<'_>) -> DeclarationResult<(Shape, bool)> {
        match optional_inner(ctx.annotation).map_err(|reason| ctx.unsupported(reason))? {
            Some(inner) => Ok((self.shape(ctx, inner)?, true)),
            None => Ok((self.shape(ctx, ctx.annotation)?, false)),
        }
    }

    fn shape(&self, ctx: &FieldContext<'_>, annotation: &Annotation) -> DeclarationResult<Shape> {
        match annotation {
            Annotation::Named(name) => match self.resolve(name) {
                Some(Resolved::Scalar(kind)) => Ok(Shape::Scalar(kind)),
                Some(Resolved::Schema(schema)) => Ok(Shape::Nested(schema)),
                None => Err(DeclarationError::UnknownType {
                    schema: ctx.schema.to_string(),
                    field: ctx.field.to_string(),
                    name: name.clone(),
                }),
            },
            Annotation::List(element) => {
                let (element, nullable) = match optional_inner(element).map_err(|r| ctx.unsupported(r))? {
                    Some(inner) => (inner, true),
                    None => (element.as_ref(), false),
                };
                Ok(Shape::List {
                    element: Box::new(self.shape(ctx, element)?),
                    nullable,
                })
            }
            Annotation::NoneType => Err(ctx.unsupported("bare None has no coercion strategy")),
            Annotation::Optional(_) => {
                Err(ctx.unsupported("optional is only allowed on a field or a list element"))
            }
            Annotation::Union(_) => Err(ctx.unsupported("nested unions are not supported")),
            Annotation::Tuple(_) => Err(ctx.unsupported("tuples have no coercion strategy")),
            Annotation::Generic { name, .. } => {
                Err(ctx.unsupported(format!("'{}' has no coercion strategy", name)))
            }
        }
    }
}

/// Splits off an optional wrapper.
///
/// Returns the wrapped annotation for `Optional[T]` and `T | None`, `None`
/// for annotations that are not optional, and the rejection reason for
/// unions that are not exactly "one type or None".
fn optional_inner(annotation: &Annotation) -> Result<Option<&Annotation>, String> {
    match annotation {
        Annotation::Optional(inner) => Ok(Some(inner.as_ref())),
        Annotation::Union(members) => {
            let concrete: Vec<&Annotation> = members
                .iter()
                .filter(|m| **m != Annotation::NoneType)
                .collect();
            let has_none = concrete.len() < members.len();
            match (concrete.as_slice(), has_none) {
                ([inner], true) => Ok(Some(*inner)),
                ([], _) => Err("a union of only None has no coercion strategy".to_string()),
                _ => Err("unions of several types are not supported".to_string()),
            }
        }
        _ => Ok(None),
    }
}

struct FieldContext<'a> {
    schema: &'a str,
    field: &'a str,
    annotation: &'a Annotation,
}

impl FieldContext<'_> {
    fn unsupported(&self, reason: impl Into<String>) -> DeclarationError {
        DeclarationError::UnsupportedShape {
            schema: self.schema.to_string(),
            field: self.field.to_string(),
            annotation: self.annotation.to_string(),
            reason: reason.into(),
        }
    }

    fn default_for(&self, shape: &Shape, optional: bool, default: Option<Value>) -> DeclarationResult<Value> {
        let default = match default {
            None | Some(Value::Null) => return Ok(Value::Null),
            Some(default) => default,
        };
        if !optional {
            return Err(DeclarationError::DefaultOnRequired {
                schema: self.schema.to_string(),
                field: self.field.to_string(),
            });
        }
        decode_value(shape, &default, self.field).map_err(|source| DeclarationError::InvalidDefault {
            schema: self.schema.to_string(),
            field: self.field.to_string(),
            source,
        })
    }
}

#[derive(Debug)]
struct FieldDecl {
    name: String,
    annotation: Result<Annotation, AnnotationError>,
    default: Option<Value>,
}

/// Declares a schema field by field.
///
/// ```ignore
/// let user = SchemaBuilder::new("User")
///     .field("email", "Email")
///     .field("phone", "Phone | None")
///     .field("addresses", "List[Address]")
///     .declare(&mut registry)?;
/// ```
#[derive(Debug)]
pub struct SchemaBuilder {
    name: String,
    fields: Vec<FieldDecl>,
}

impl SchemaBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Adds a field with a textual annotation. Syntax errors are reported
    /// by `declare`.
    pub fn field(self, name: impl Into<String>, annotation: &str) -> Self {
        self.push(name.into(), Annotation::parse(annotation), None)
    }

    /// Adds a field with an already built annotation.
    pub fn annotated_field(self, name: impl Into<String>, annotation: Annotation) -> Self {
        self.push(name.into(), Ok(annotation), None)
    }

    /// Adds an optional field with a default value.
    pub fn field_with_default(
        self,
        name: impl Into<String>,
        annotation: &str,
        default: impl Into<Value>,
    ) -> Self {
        self.push(name.into(), Annotation::parse(annotation), Some(default.into()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declare(self, registry: &mut SchemaRegistry) -> DeclarationResult<Schema> {
        registry.declare(self)
    }

    fn push(
        mut self,
        name: String,
        annotation: Result<Annotation, AnnotationError>,
        default: Option<Value>,
    ) -> Self {
        self.fields.push(FieldDecl {
            name,
            annotation,
            default,
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::TokenConfig;
    use jsonwebtoken::Algorithm;

    fn with_address() -> SchemaRegistry {
        let mut registry = SchemaRegistry::new();
        SchemaBuilder::new("Address")
            .field("city", "str")
            .declare(&mut registry)
            .unwrap();
        registry
    }

    #[test]
    fn test_classification() {
        let mut registry = with_address();
        let schema = SchemaBuilder::new("User")
            .field("email", "Email")
            .field("phone", "Phone | None")
            .field("zone", "Optional[IANATimeZone]")
            .field("address", "Address")
            .field("previous", "List[Address]")
            .field("dates", "List[Optional[Date]]")
            .field("tags", "Optional[List[str]]")
            .declare(&mut registry)
            .unwrap();

        let described: Vec<String> = schema.fields().iter().map(FieldSpec::describe).collect();
        assert_eq!(
            described,
            vec![
                "Email",
                "Optional[Phone]",
                "Optional[IANATimeZone]",
                "Address",
                "List[Address]",
                "List[Optional[Date]]",
                "Optional[List[str]]",
            ]
        );
        assert_eq!(
            schema.field("address").unwrap().shape(),
            &Shape::Nested(registry.get("Address").unwrap().clone())
        );
    }

    #[test]
    fn test_unsupported_shapes_rejected() {
        for annotation in ["Tuple[str]", "str | int", "None", "Dict[str, int]", "Union[str, int, None]", "List[str | int]"] {
            let mut registry = SchemaRegistry::new();
            let err = SchemaBuilder::new("Bad")
                .field("value", annotation)
                .declare(&mut registry)
                .unwrap_err();
            assert_eq!(err.code(), "SCHEMA_UNSUPPORTED_SHAPE", "{}", annotation);
            assert!(registry.get("Bad").is_none());
        }
    }

    #[test]
    fn test_unknown_and_malformed_annotations() {
        let mut registry = SchemaRegistry::new();
        let err = SchemaBuilder::new("Bad")
            .field("value", "Adress")
            .declare(&mut registry)
            .unwrap_err();
        assert_eq!(err.code(), "SCHEMA_UNKNOWN_TYPE");

        let err = SchemaBuilder::new("Bad")
            .field("value", "List[str")
            .declare(&mut registry)
            .unwrap_err();
        assert_eq!(err.code(), "SCHEMA_INVALID_ANNOTATION");
    }

    #[test]
    fn test_self_reference_is_unknown() {
        let mut registry = SchemaRegistry::new();
        let err = SchemaBuilder::new("Node")
            .field("next", "Node | None")
            .declare(&mut registry)
            .unwrap_err();
        assert_eq!(err.code(), "SCHEMA_UNKNOWN_TYPE");
    }

    #[test]
    fn test_duplicates() {
        let mut registry = with_address();
        let err = SchemaBuilder::new("Address")
            .field("city", "str")
            .declare(&mut registry)
            .unwrap_err();
        assert_eq!(err, DeclarationError::DuplicateName("Address".into()));

        let err = SchemaBuilder::new("Email")
            .declare(&mut registry)
            .unwrap_err();
        assert_eq!(err.code(), "SCHEMA_DUPLICATE_NAME");

        let err = SchemaBuilder::new("Pair")
            .field("a", "str")
            .field("a", "int")
            .declare(&mut registry)
            .unwrap_err();
        assert_eq!(err.code(), "SCHEMA_DUPLICATE_FIELD");
    }

    #[test]
    fn test_defaults() {
        let mut registry = SchemaRegistry::new();
        let schema = SchemaBuilder::new("Settings")
            .field_with_default("zone", "IANATimeZone | None", "America/Tijuana")
            .field_with_default("retries", "int | None", 3)
            .declare(&mut registry)
            .unwrap();
        assert!(matches!(
            schema.field("zone").unwrap().default_value(),
            Value::TimeZone(tz) if tz.name() == "America/Tijuana"
        ));

        let err = SchemaBuilder::new("Required")
            .field_with_default("name", "str", "x")
            .declare(&mut registry)
            .unwrap_err();
        assert_eq!(err.code(), "SCHEMA_DEFAULT_ON_REQUIRED");

        let err = SchemaBuilder::new("Invalid")
            .field_with_default("zone", "IANATimeZone | None", "Mars/Olympus")
            .declare(&mut registry)
            .unwrap_err();
        assert_eq!(err.code(), "SCHEMA_INVALID_DEFAULT");
    }

    #[test]
    fn test_token_types_resolve_by_name() {
        let mut registry = SchemaRegistry::new();
        registry
            .declare_token_type("AccessToken", TokenConfig::hmac("secret", vec![Algorithm::HS256]))
            .unwrap();
        let schema = SchemaBuilder::new("Session")
            .field("token", "AccessToken")
            .declare(&mut registry)
            .unwrap();
        assert_eq!(schema.fields()[0].describe(), "AccessToken");

        let err = registry
            .declare_token_type("AccessToken", TokenConfig::hmac("secret", vec![Algorithm::HS256]))
            .unwrap_err();
        assert_eq!(err.code(), "SCHEMA_DUPLICATE_NAME");

        let err = registry
            .declare_token_type("Broken", TokenConfig::hmac("secret", vec![]))
            .unwrap_err();
        assert_eq!(err.code(), "SCHEMA_INVALID_TOKEN_CONFIG");
    }

    #[test]
    fn test_declaration_order_and_lookup() {
        let mut registry = with_address();
        SchemaBuilder::new("Zebra").declare(&mut registry).unwrap();
        SchemaBuilder::new("Apple").declare(&mut registry).unwrap();

        let names: Vec<&str> = registry.schemas().iter().map(Schema::name).collect();
        assert_eq!(names, vec!["Address", "Zebra", "Apple"]);
        assert_eq!(registry.len(), 3);
        assert!(matches!(registry.resolve("str"), Some(Resolved::Scalar(ScalarKind::Str))));
        assert!(matches!(registry.resolve("Apple"), Some(Resolved::Schema(_))));
        assert!(registry.resolve("Missing").is_none());
    }
}
