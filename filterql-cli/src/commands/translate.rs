use std::process::ExitCode;

use anyhow::Result;
use filterql::backend::TranslatorRegistry;
use filterql::filter::FilterOp;
use filterql::schema::SearchSchema;

use crate::cli::TranslateCommand;
use crate::commands::{Parsed, parse_filters_arg};
use crate::context::Config;
use crate::output::{self, OutputFormat};

/// Execute a translate command.
pub fn run(
    cmd: &TranslateCommand,
    schema: &SearchSchema,
    config: &Config,
    format: OutputFormat,
) -> Result<ExitCode> {
    // Resolve the backend first so a typo fails before reading stdin.
    let registry = TranslatorRegistry::with_defaults();
    let translator = registry.get(&cmd.backend)?;

    let filter = match parse_filters_arg(&cmd.filters, schema, config)? {
        Parsed::Valid(filter) => filter,
        Parsed::Invalid(errors) => {
            output::print_validation_errors(&errors, format)?;
            return Ok(ExitCode::FAILURE);
        }
    };

    // An empty $and translates to each backend's "no filter" form.
    let filter = filter.unwrap_or_else(|| FilterOp::and(Vec::new()));
    let translated = translator.translate_filter(&filter, schema);
    output::print_translation(translator.id(), &translated, format)?;
    Ok(ExitCode::SUCCESS)
}
