//! CLI argument definitions using clap
//!
//! Commands:
//! - schemander decode --schemas <dir> --schema <Name> [--minimal] [--input <file>]
//! - schemander check --schemas <dir>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// schemander - declare schemas and coerce JSON data against them
#[derive(Parser, Debug)]
#[command(name = "schemander")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode one JSON document against a schema and print its canonical form
    Decode {
        /// Directory containing schema declaration files
        #[arg(long, default_value = "./schemas")]
        schemas: PathBuf,

        /// Name of the schema to decode against
        #[arg(long)]
        schema: String,

        /// Omit fields that equal their declared default
        #[arg(long)]
        minimal: bool,

        /// Input file (stdin when omitted)
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Load the schema declarations and list what was declared
    Check {
        /// Directory containing schema declaration files
        #[arg(long, default_value = "./schemas")]
        schemas: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
