//! # Scalar Errors
//!
//! Parse failures for self-validating scalar types.

use thiserror::Error;

/// Result type for scalar parsing
pub type ScalarResult<T> = Result<T, FormatError>;

/// A value did not satisfy the grammar or semantics of its scalar type.
///
/// Token rejections use the same error with a generic reason so callers
/// cannot tell which verification step failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} '{input}': {reason}")]
pub struct FormatError {
    kind: String,
    input: String,
    reason: String,
}

impl FormatError {
    /// Create a format error for the given scalar type name
    pub fn new(kind: impl Into<String>, input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Scalar type name (e.g. `Email`, `Date`)
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The offending input as received
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Human-readable reason
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        "SCALAR_FORMAT_INVALID"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_kind_and_input() {
        let err = FormatError::new("Email", "@example.com", "empty local part");
        let display = err.to_string();
        assert!(display.contains("Email"));
        assert!(display.contains("@example.com"));
        assert!(display.contains("empty local part"));
    }
}
