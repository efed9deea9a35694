use std::process::ExitCode;

use anyhow::Result;
use filterql::schema::SearchSchema;

use crate::cli::FiltersArgs;
use crate::commands::{Parsed, parse_filters_arg};
use crate::context::Config;
use crate::output::{self, OutputFormat};

/// Execute a validate command.
pub fn run(
    args: &FiltersArgs,
    schema: &SearchSchema,
    config: &Config,
    format: OutputFormat,
) -> Result<ExitCode> {
    match parse_filters_arg(&args.filters, schema, config)? {
        Parsed::Valid(filter) => {
            output::print_valid(filter.as_ref(), format)?;
            Ok(ExitCode::SUCCESS)
        }
        Parsed::Invalid(errors) => {
            output::print_validation_errors(&errors, format)?;
            Ok(ExitCode::FAILURE)
        }
    }
}
