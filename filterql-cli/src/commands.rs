pub mod parse;
pub mod schema;
pub mod translate;
pub mod validate;

use anyhow::Result;
use filterql::error::{FilterqlError, ValidationErrors};
use filterql::filter::FilterOp;
use filterql::schema::SearchSchema;

use crate::context::{self, Config};

/// Outcome of parsing the filters argument.
pub enum Parsed {
    Valid(Option<FilterOp>),
    Invalid(ValidationErrors),
}

/// Reads and parses the filters argument.
///
/// Validation failures are returned as [`Parsed::Invalid`] so they can be
/// printed in the requested format; anything else is an error.
pub fn parse_filters_arg(arg: &str, schema: &SearchSchema, config: &Config) -> Result<Parsed> {
    let text = context::read_filters(arg)?;
    match config.parser().parse_str(&text, schema) {
        Ok(filter) => Ok(Parsed::Valid(filter)),
        Err(FilterqlError::Validation(errors)) => Ok(Parsed::Invalid(errors)),
        Err(e) => Err(e.into()),
    }
}
