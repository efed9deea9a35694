mod cli;
mod commands;
mod context;
mod output;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Command};
use crate::commands::{parse, schema, translate, validate};

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let format = cli.format;
    let search_schema = context::load_schema(cli.schema.as_deref())?;

    match cli.command {
        Command::Schema => schema::run(&search_schema, format),
        Command::Validate(args) => {
            let config = context::load_config(cli.config.as_deref())?;
            validate::run(&args, &search_schema, &config, format)
        }
        Command::Parse(args) => {
            let config = context::load_config(cli.config.as_deref())?;
            parse::run(&args, &search_schema, &config, format)
        }
        Command::Translate(cmd) => {
            let config = context::load_config(cli.config.as_deref())?;
            translate::run(&cmd, &search_schema, &config, format)
        }
    }
}

/// Logs go to stderr; RUST_LOG takes precedence over `--verbose`.
fn init_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}
