//! CLI command implementations
//!
//! Both commands load the declaration directory into a fresh registry
//! first; a declaration failure aborts before any input is read.

use std::path::Path;

use serde_json::{json, Value};
use tracing::info;

use crate::schema::{SchemaLoader, SchemaRegistry, Value as SchemaValue};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_document, write_error, write_response};

/// Main entry point for CLI
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Decode {
            schemas,
            schema,
            minimal,
            input,
        } => decode(&schemas, &schema, minimal, input.as_deref()),
        Command::Check { schemas } => check(&schemas),
    }
}

/// Decode one document and write its canonical encoding.
///
/// A rejected document is reported on stdout as an error response and
/// also returned as an error, so the process exits non-zero.
pub fn decode(schemas: &Path, schema: &str, minimal: bool, input: Option<&Path>) -> CliResult<()> {
    let registry = load_registry(schemas)?;
    let document = read_document(input)?;

    match decode_document(&registry, schema, document, minimal) {
        Ok(encoded) => write_response(encoded),
        Err(e) => {
            write_error(e.code_str(), e.message())?;
            Err(e)
        }
    }
}

/// Load declarations and list the declared schemas.
pub fn check(schemas: &Path) -> CliResult<()> {
    let registry = load_registry(schemas)?;
    write_response(describe_registry(&registry))
}

/// Loads every declaration file in `dir` into a new registry.
pub fn load_registry(dir: &Path) -> CliResult<SchemaRegistry> {
    let mut registry = SchemaRegistry::new();
    let count = SchemaLoader::new(dir).load_into(&mut registry)?;
    info!(dir = %dir.display(), schemas = count, "schema declarations loaded");
    Ok(registry)
}

/// Decodes `document` against the schema called `name` and re-encodes it.
pub fn decode_document(
    registry: &SchemaRegistry,
    name: &str,
    document: Value,
    minimal: bool,
) -> CliResult<Value> {
    let schema = registry
        .get(name)
        .ok_or_else(|| CliError::unknown_schema(name))?;
    let record = schema.decode(&SchemaValue::from(document))?;

    Ok(if minimal {
        record.encode_minimal()
    } else {
        record.encode_full()
    })
}

/// `{"schemas": [{"name", "fields": [{"name", "type", "default"?}]}]}`
pub fn describe_registry(registry: &SchemaRegistry) -> Value {
    let schemas: Vec<Value> = registry
        .schemas()
        .iter()
        .map(|schema| {
            let fields: Vec<Value> = schema
                .fields()
                .iter()
                .map(|field| {
                    let mut entry = json!({ "name": field.name(), "type": field.describe() });
                    if !field.default_value().is_null() {
                        entry["default"] = crate::schema::encode_value(field.default_value());
                    }
                    entry
                })
                .collect();
            json!({ "name": schema.name(), "fields": fields })
        })
        .collect();

    json!({ "schemas": schemas })
}
