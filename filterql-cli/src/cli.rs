use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

/// filterql - Validate and translate search filters
#[derive(Parser)]
#[command(name = "filterql", version, about)]
pub struct Cli {
    /// Path to a search schema file (.toml or .json). Defaults to the built-in
    /// dataset and organization schema.
    #[arg(long, env = "FILTERQL_SCHEMA", global = true)]
    pub schema: Option<PathBuf>,

    /// Path to a TOML configuration file with parser limits and custom operators.
    #[arg(long, env = "FILTERQL_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,

    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check filters against the schema and limits.
    Validate(FiltersArgs),
    /// Print the canonical filter tree.
    Parse(FiltersArgs),
    /// Translate filters to a backend query.
    Translate(TranslateCommand),
    /// List the fields of the schema.
    Schema,
}

#[derive(Parser)]
pub struct FiltersArgs {
    /// Filters as JSON text, or `-` to read them from stdin.
    pub filters: String,
}

#[derive(Parser)]
pub struct TranslateCommand {
    /// Filters as JSON text, or `-` to read them from stdin.
    pub filters: String,

    /// Backend to translate to (solr, elasticsearch).
    #[arg(long, default_value = "solr")]
    pub backend: String,
}
