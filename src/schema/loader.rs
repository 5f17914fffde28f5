//! Schema loader for declaration files
//!
//! Every `*.json` file in the schema directory is read in file-name order.
//! A file declares token types and schemas:
//!
//! ```json
//! {
//!   "tokens": [{ "name": "AccessToken", "config": { ... } }],
//!   "schemas": [
//!     { "name": "Address", "fields": [{ "name": "city", "type": "str" }] }
//!   ]
//! }
//! ```
//!
//! Within a file, token types are declared before schemas, and schemas in
//! the order listed; a schema may reference anything declared before it,
//! including in earlier files. Any malformed file or rejected declaration
//! aborts the load.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::scalar::TokenConfig;

use super::errors::{DeclarationError, DeclarationResult};
use super::registry::{SchemaBuilder, SchemaRegistry};
use super::value::Value;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DeclarationFile {
    #[serde(default)]
    tokens: Vec<TokenDecl>,
    #[serde(default)]
    schemas: Vec<SchemaDecl>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TokenDecl {
    name: String,
    config: TokenConfig,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaDecl {
    name: String,
    #[serde(default)]
    fields: Vec<FieldDecl>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldDecl {
    name: String,
    #[serde(rename = "type")]
    annotation: String,
    #[serde(default)]
    default: Option<serde_json::Value>,
}

/// Loads declaration files from a directory into a registry.
pub struct SchemaLoader {
    /// Directory containing declaration files
    schema_dir: PathBuf,
}

impl SchemaLoader {
    pub fn new(schema_dir: impl Into<PathBuf>) -> Self {
        Self {
            schema_dir: schema_dir.into(),
        }
    }

    /// Returns the schema directory path.
    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Declares everything found in the schema directory.
    ///
    /// Returns the number of schemas declared.
    pub fn load_into(&self, registry: &mut SchemaRegistry) -> DeclarationResult<usize> {
        let dir = self.schema_dir.display().to_string();
        let entries = fs::read_dir(&self.schema_dir)
            .map_err(|e| malformed(&dir, format!("failed to read schema directory: {}", e)))?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|e| malformed(&dir, format!("failed to read directory entry: {}", e)))?;
            let path = entry.path();

            // Skip non-JSON files
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            paths.push(path);
        }
        paths.sort();

        let mut declared = 0;
        for path in &paths {
            declared += self.load_file(path, registry)?;
        }

        debug!(dir = %dir, files = paths.len(), schemas = declared, "loaded schema declarations");
        Ok(declared)
    }

    fn load_file(&self, path: &Path, registry: &mut SchemaRegistry) -> DeclarationResult<usize> {
        let path_str = path.display().to_string();
        let content = fs::read_to_string(path)
            .map_err(|e| malformed(&path_str, format!("failed to read file: {}", e)))?;

        let file: DeclarationFile = serde_json::from_str(&content).map_err(|e| {
            warn!(path = %path_str, error = %e, "invalid declaration file");
            malformed(&path_str, format!("invalid JSON: {}", e))
        })?;

        for token in file.tokens {
            registry.declare_token_type(&token.name, token.config)?;
        }

        let count = file.schemas.len();
        for schema in file.schemas {
            let mut builder = SchemaBuilder::new(schema.name);
            for field in schema.fields {
                builder = match field.default {
                    Some(default) => {
                        builder.field_with_default(field.name, &field.annotation, Value::from(default))
                    }
                    None => builder.field(field.name, &field.annotation),
                };
            }
            builder.declare(registry)?;
        }

        Ok(count)
    }
}

fn malformed(path: &str, reason: String) -> DeclarationError {
    DeclarationError::MalformedFile {
        path: path.to_string(),
        reason,
    }
}
