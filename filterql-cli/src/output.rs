use anyhow::{Context, Result};
use clap::ValueEnum;
use filterql::backend::TranslatedFilter;
use filterql::error::ValidationErrors;
use filterql::filter::FilterOp;
use filterql::schema::SearchSchema;
use serde::Serialize;
use serde_json::{Map, Value, json};
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Output format for CLI results.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table.
    Table,
    /// JSON output.
    Json,
}

/// Print the result of a successful validation.
pub fn print_valid(filter: Option<&FilterOp>, format: OutputFormat) -> Result<()> {
    let operations = filter.map_or(0, FilterOp::op_count);
    match format {
        OutputFormat::Json => print_json(&json!({
            "valid": true,
            "operations": operations,
            "depth": filter.map_or(0, FilterOp::depth),
        })),
        OutputFormat::Table => {
            if filter.is_some() {
                println!("OK ({operations} operations)");
            } else {
                println!("OK (no filters)");
            }
            Ok(())
        }
    }
}

/// Print validation messages.
pub fn print_validation_errors(errors: &ValidationErrors, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(&errors.to_error_dict()),
        OutputFormat::Table => {
            let rows: Vec<MessageRow> = errors
                .messages()
                .iter()
                .enumerate()
                .map(|(i, message)| MessageRow {
                    index: i + 1,
                    message: message.clone(),
                })
                .collect();

            let table = Table::new(&rows).with(Style::rounded()).to_string();
            println!("Invalid filters:\n{table}");
            Ok(())
        }
    }
}

/// Print the canonical filter tree.
pub fn print_filter(filter: Option<&FilterOp>, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(&filter.map_or(Value::Null, FilterOp::to_json)),
        OutputFormat::Table => {
            let Some(filter) = filter else {
                println!("No filters.");
                return Ok(());
            };

            let mut rows = Vec::new();
            collect_filter_rows(filter, 0, &mut rows);
            let table = Table::new(&rows).with(Style::rounded()).to_string();
            println!("{table}");
            Ok(())
        }
    }
}

/// Print a backend translation.
pub fn print_translation(
    backend: &str,
    translated: &TranslatedFilter,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(&json!({
            "backend": backend,
            "filter": translated.to_json(),
        })),
        OutputFormat::Table => {
            if translated.is_empty() {
                println!("Filters translate to nothing for backend '{backend}'.");
                return Ok(());
            }

            match translated {
                TranslatedFilter::QueryStrings(fragments) => {
                    let rows: Vec<TranslationRow> = fragments
                        .iter()
                        .map(|fragment| TranslationRow {
                            backend: backend.to_string(),
                            filter: fragment.clone(),
                        })
                        .collect();
                    let table = Table::new(&rows).with(Style::rounded()).to_string();
                    println!("{table}");
                }
                // Query documents read better as indented JSON than in a cell.
                TranslatedFilter::QueryDocument(_) => {
                    let document = serde_json::to_string_pretty(&translated.to_json())
                        .context("Failed to serialize query document")?;
                    println!("{document}");
                }
            }
            Ok(())
        }
    }
}

/// Print the schema fields.
pub fn print_schema(schema: &SearchSchema, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let fields: Map<String, Value> = schema
                .field_names()
                .into_iter()
                .filter_map(|name| {
                    let info = schema.field(name)?;
                    Some((name.to_string(), serde_json::to_value(info).ok()?))
                })
                .collect();
            print_json(&json!({
                "version": schema.version,
                "fields": fields,
            }))
        }
        OutputFormat::Table => {
            let rows: Vec<FieldRow> = schema
                .field_names()
                .into_iter()
                .filter_map(|name| {
                    let info = schema.field(name)?;
                    Some(FieldRow {
                        field: name.to_string(),
                        field_type: info
                            .field_type
                            .and_then(|t| serde_json::to_value(t).ok())
                            .and_then(|v| v.as_str().map(str::to_string))
                            .unwrap_or_else(|| "-".to_string()),
                        multiple: info.multiple,
                        indexed: info.indexed,
                        stored: info.stored,
                    })
                })
                .collect();

            println!("Schema version: {}", schema.version);
            let table = Table::new(&rows).with(Style::rounded()).to_string();
            println!("{table}");
            Ok(())
        }
    }
}

// --- Helper types and functions ---

#[derive(Tabled)]
struct MessageRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Message")]
    message: String,
}

#[derive(Tabled)]
struct FilterRow {
    #[tabled(rename = "Operation")]
    operation: String,
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Tabled)]
struct TranslationRow {
    #[tabled(rename = "Backend")]
    backend: String,
    #[tabled(rename = "Filter")]
    filter: String,
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Type")]
    field_type: String,
    #[tabled(rename = "Multiple")]
    multiple: bool,
    #[tabled(rename = "Indexed")]
    indexed: bool,
    #[tabled(rename = "Stored")]
    stored: bool,
}

/// One row per node, indented by nesting level.
fn collect_filter_rows(filter: &FilterOp, level: usize, rows: &mut Vec<FilterRow>) {
    let indent = "  ".repeat(level);
    let (field, value) = match filter {
        FilterOp::Compare { field, value, .. } => (field.clone(), value.to_json().to_string()),
        FilterOp::In { field, values } => (
            field.clone(),
            Value::Array(values.iter().map(|v| v.to_json()).collect()).to_string(),
        ),
        FilterOp::And(_) | FilterOp::Or(_) => (String::new(), String::new()),
    };

    rows.push(FilterRow {
        operation: format!("{indent}{}", filter.operator()),
        field,
        value,
    });

    for child in filter.children() {
        collect_filter_rows(child, level + 1, rows);
    }
}

fn print_json(value: &impl Serialize) -> Result<()> {
    let output = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{output}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use filterql::filter::Scalar;

    #[test]
    fn test_filter_rows() {
        let filter = FilterOp::or(vec![
            FilterOp::eq("tags", "animal"),
            FilterOp::and(vec![
                FilterOp::gte("size", 5),
                FilterOp::in_values("version", vec![Scalar::from("2"), Scalar::from(3)]),
            ]),
        ]);

        let mut rows = Vec::new();
        collect_filter_rows(&filter, 0, &mut rows);

        let operations: Vec<&str> = rows.iter().map(|r| r.operation.as_str()).collect();
        assert_eq!(operations, vec!["$or", "  eq", "  $and", "    gte", "    in"]);
        assert_eq!(rows[1].value, "\"animal\"");
        assert_eq!(rows[4].field, "version");
        assert_eq!(rows[4].value, "[\"2\",3]");
    }
}
