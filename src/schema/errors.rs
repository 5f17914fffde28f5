//! Schema error types
//!
//! Three families, kept distinct because call sites branch on them:
//! - `DeclarationError`: a schema cannot be declared (load-time, fatal)
//! - `DecodeError`: input data does not conform to a schema
//! - `TypeError`: `enforce` was called with an unusable type or input shape
//!
//! Error codes:
//! - SCHEMA_UNSUPPORTED_SHAPE, SCHEMA_UNKNOWN_TYPE, SCHEMA_INVALID_ANNOTATION,
//!   SCHEMA_DUPLICATE_FIELD, SCHEMA_DUPLICATE_NAME, SCHEMA_DEFAULT_ON_REQUIRED,
//!   SCHEMA_INVALID_DEFAULT, SCHEMA_INVALID_TOKEN_CONFIG, SCHEMA_MALFORMED_FILE
//! - DECODE_UNEXPECTED_FIELD, DECODE_MISSING_FIELD, DECODE_FORMAT_INVALID,
//!   DECODE_SHAPE_MISMATCH
//! - ENFORCE_NOT_A_SCHEMA, ENFORCE_INCOMPATIBLE_VALUE, ENFORCE_MISSING_VALUE

use thiserror::Error;

use crate::scalar::{FormatError, TokenConfigError};

/// Result type for schema declaration
pub type DeclarationResult<T> = Result<T, DeclarationError>;

/// Result type for decoding
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Result type for enforcement
pub type EnforceResult<T> = Result<T, EnforceError>;

/// Path label used for the outermost mapping
pub(crate) const ROOT_PATH: &str = "$root";

/// A type annotation that could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid annotation '{input}': {reason}")]
pub struct AnnotationError {
    pub input: String,
    pub reason: String,
}

impl AnnotationError {
    pub fn new(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

/// A schema declaration that has no coercion strategy or conflicts with
/// what is already declared. Never recoverable by the engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeclarationError {
    #[error("schema '{schema}' field '{field}': '{annotation}' is not supported ({reason})")]
    UnsupportedShape {
        schema: String,
        field: String,
        annotation: String,
        reason: String,
    },

    #[error("schema '{schema}' field '{field}': unknown type '{name}'")]
    UnknownType {
        schema: String,
        field: String,
        name: String,
    },

    #[error("schema '{schema}' field '{field}': {source}")]
    InvalidAnnotation {
        schema: String,
        field: String,
        source: AnnotationError,
    },

    #[error("schema '{schema}' declares field '{field}' more than once")]
    DuplicateField { schema: String, field: String },

    #[error("type name '{0}' is already declared")]
    DuplicateName(String),

    #[error("schema '{schema}' field '{field}': only optional fields may declare a default")]
    DefaultOnRequired { schema: String, field: String },

    #[error("schema '{schema}' field '{field}': default does not fit the field ({source})")]
    InvalidDefault {
        schema: String,
        field: String,
        source: DecodeError,
    },

    #[error("token type '{name}': {source}")]
    InvalidTokenConfig {
        name: String,
        source: TokenConfigError,
    },

    #[error("malformed declaration file '{path}': {reason}")]
    MalformedFile { path: String, reason: String },
}

impl DeclarationError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            DeclarationError::UnsupportedShape { .. } => "SCHEMA_UNSUPPORTED_SHAPE",
            DeclarationError::UnknownType { .. } => "SCHEMA_UNKNOWN_TYPE",
            DeclarationError::InvalidAnnotation { .. } => "SCHEMA_INVALID_ANNOTATION",
            DeclarationError::DuplicateField { .. } => "SCHEMA_DUPLICATE_FIELD",
            DeclarationError::DuplicateName(_) => "SCHEMA_DUPLICATE_NAME",
            DeclarationError::DefaultOnRequired { .. } => "SCHEMA_DEFAULT_ON_REQUIRED",
            DeclarationError::InvalidDefault { .. } => "SCHEMA_INVALID_DEFAULT",
            DeclarationError::InvalidTokenConfig { .. } => "SCHEMA_INVALID_TOKEN_CONFIG",
            DeclarationError::MalformedFile { .. } => "SCHEMA_MALFORMED_FILE",
        }
    }
}

/// Input data that does not conform to a schema.
///
/// Every variant carries the path of the offending value, e.g.
/// `items[1].email`; the outermost mapping is `$root`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("'{path}': unexpected field(s) {}", .fields.join(", "))]
    UnexpectedField { path: String, fields: Vec<String> },

    #[error("'{path}': required field is missing")]
    MissingField { path: String },

    #[error("'{path}': {source}")]
    Format { path: String, source: FormatError },

    #[error("'{path}': expected {expected}, got {actual}")]
    ShapeMismatch {
        path: String,
        expected: String,
        actual: &'static str,
    },
}

impl DecodeError {
    /// Path of the value that failed
    pub fn path(&self) -> &str {
        match self {
            DecodeError::UnexpectedField { path, .. }
            | DecodeError::MissingField { path }
            | DecodeError::Format { path, .. }
            | DecodeError::ShapeMismatch { path, .. } => path,
        }
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            DecodeError::UnexpectedField { .. } => "DECODE_UNEXPECTED_FIELD",
            DecodeError::MissingField { .. } => "DECODE_MISSING_FIELD",
            DecodeError::Format { .. } => "DECODE_FORMAT_INVALID",
            DecodeError::ShapeMismatch { .. } => "DECODE_SHAPE_MISMATCH",
        }
    }
}

/// `enforce` was asked to do something that is a programming error rather
/// than bad data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("'{0}' is not a schema type")]
    NotASchema(String),

    #[error("cannot enforce schema '{expected}' on a {actual} value")]
    IncompatibleValue {
        expected: String,
        actual: &'static str,
    },
}

/// Failure of `enforce`
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnforceError {
    #[error(transparent)]
    Type(#[from] TypeError),

    #[error("required value for schema '{0}' is missing")]
    Missing(String),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl EnforceError {
    /// Whether this is a type-contract violation rather than a value problem
    pub fn is_type_error(&self) -> bool {
        matches!(self, EnforceError::Type(_))
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            EnforceError::Type(TypeError::NotASchema(_)) => "ENFORCE_NOT_A_SCHEMA",
            EnforceError::Type(TypeError::IncompatibleValue { .. }) => "ENFORCE_INCOMPATIBLE_VALUE",
            EnforceError::Missing(_) => "ENFORCE_MISSING_VALUE",
            EnforceError::Decode(e) => e.code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_field_lists_keys() {
        let err = DecodeError::UnexpectedField {
            path: ROOT_PATH.to_string(),
            fields: vec!["extra".into(), "other".into()],
        };
        let display = err.to_string();
        assert!(display.contains("extra, other"));
        assert!(display.contains("$root"));
        assert_eq!(err.code(), "DECODE_UNEXPECTED_FIELD");
    }

    #[test]
    fn test_format_error_keeps_path() {
        let err = DecodeError::Format {
            path: "items[1].email".into(),
            source: FormatError::new("Email", "nope", "missing '@'"),
        };
        assert_eq!(err.path(), "items[1].email");
        assert!(err.to_string().contains("Email"));
    }

    #[test]
    fn test_enforce_error_classification() {
        let type_err = EnforceError::from(TypeError::NotASchema("str".into()));
        assert!(type_err.is_type_error());
        assert_eq!(type_err.code(), "ENFORCE_NOT_A_SCHEMA");

        let decode_err = EnforceError::from(DecodeError::MissingField { path: "x".into() });
        assert!(!decode_err.is_type_error());
        assert_eq!(decode_err.code(), "DECODE_MISSING_FIELD");
    }
}
