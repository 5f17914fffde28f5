//! CLI module for schemander
//!
//! Provides command-line interface for:
//! - decode: Decode a JSON document against a declared schema
//! - check: Load declaration files and list the declared schemas

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{check, decode, decode_document, describe_registry, load_registry, run, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_document, write_error, write_response};
