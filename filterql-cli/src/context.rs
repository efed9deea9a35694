use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use filterql::filter::{FilterLimits, FilterParser};
use filterql::schema::SearchSchema;
use serde::Deserialize;

/// Contents of the `--config` TOML file.
///
/// ```toml
/// custom_operators = ["fuzzy"]
///
/// [limits]
/// max_nesting_depth = 5
/// max_operation_count = 50
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub limits: FilterLimits,
    pub custom_operators: Vec<String>,
}

impl Config {
    pub fn parser(&self) -> FilterParser {
        FilterParser::new()
            .with_limits(self.limits)
            .with_custom_operators(self.custom_operators.iter().cloned())
    }
}

/// Load the configuration, or the defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: Config = toml::from_str(&content).context("Failed to parse config TOML")?;
    log::debug!("Loaded config from {}: {config:?}", path.display());
    Ok(config)
}

/// Load the search schema, or the built-in one when no file is given.
///
/// Files ending in `.json` are read as JSON, anything else as TOML.
pub fn load_schema(path: Option<&Path>) -> Result<SearchSchema> {
    let Some(path) = path else {
        return SearchSchema::combined().context("Failed to build the built-in schema");
    };

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema file {}", path.display()))?;
    let schema = if path.extension().is_some_and(|ext| ext == "json") {
        SearchSchema::from_json_str(&content)?
    } else {
        toml::from_str(&content).context("Failed to parse schema TOML")?
    };
    log::debug!(
        "Loaded schema with {} field(s) from {}",
        schema.fields.len(),
        path.display()
    );
    Ok(schema)
}

/// Returns the filters argument, reading stdin when it is `-`.
pub fn read_filters(arg: &str) -> Result<String> {
    if arg != "-" {
        return Ok(arg.to_string());
    }

    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read filters from stdin")?;
    Ok(text)
}
