use std::process::ExitCode;

use anyhow::Result;
use filterql::schema::SearchSchema;

use crate::output::{self, OutputFormat};

/// Execute a schema command.
pub fn run(schema: &SearchSchema, format: OutputFormat) -> Result<ExitCode> {
    output::print_schema(schema, format)?;
    Ok(ExitCode::SUCCESS)
}
