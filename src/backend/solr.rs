//! Translation to Solr filter queries.
//!
//! ```text
//! {"tags": "animal", "size": {"gte": 5}}  =>  tags:"animal" AND size:[5 TO *]
//! ```
//!
//! Values of text, string and date fields are quoted; booleans and numbers are
//! not. Range bounds are never quoted. Double quotes inside values are escaped,
//! never removed.

use crate::backend::{FilterTranslator, TranslatedFilter};
use crate::filter::{CompareOp, FilterOp, Scalar};
use crate::schema::{FieldType, SearchSchema};

pub const SOLR_BACKEND_ID: &str = "solr";

/// Translator producing Lucene query-string fragments.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolrTranslator;

/// A translated subtree.
///
/// `compound` marks fragments made of several clauses, which need parentheses
/// when they become part of a larger expression.
struct Fragment {
    text: String,
    compound: bool,
}

impl Fragment {
    fn simple(text: String) -> Self {
        Self {
            text,
            compound: false,
        }
    }

    fn nested(self) -> String {
        if self.compound {
            format!("({})", self.text)
        } else {
            self.text
        }
    }
}

impl SolrTranslator {
    pub fn new() -> Self {
        Self
    }

    /// Translates a filter into `fq` fragments.
    ///
    /// The result holds at most one fragment. It is empty when the filter
    /// resolves to nothing, e.g. an `in` with no values.
    pub fn translate(&self, filter: &FilterOp, schema: &SearchSchema) -> Vec<String> {
        self.to_query(filter, schema).into_iter().collect()
    }

    /// Translates a filter into a single query string.
    pub fn to_query(&self, filter: &FilterOp, schema: &SearchSchema) -> Option<String> {
        let fragment = self.translate_node(filter, schema)?;
        log::trace!("Translated filter {filter} to Solr query {}", fragment.text);
        Some(fragment.text)
    }

    fn translate_node(&self, node: &FilterOp, schema: &SearchSchema) -> Option<Fragment> {
        match node {
            FilterOp::Compare { field, op, value } => {
                let field_type = schema.field_type(field);
                let text = match op {
                    CompareOp::Eq => format!("{field}:{}", term(value, field_type)),
                    CompareOp::Gt => format!("{field}:{{{} TO *}}", range_bound(value)),
                    CompareOp::Gte => format!("{field}:[{} TO *]", range_bound(value)),
                    CompareOp::Lt => format!("{field}:{{* TO {}}}", range_bound(value)),
                    CompareOp::Lte => format!("{field}:[* TO {}]", range_bound(value)),
                    CompareOp::Custom(name) => {
                        log::warn!(
                            "Operator '{name}' has no Solr translation, using equality on field '{field}'"
                        );
                        format!("{field}:{}", term(value, field_type))
                    }
                };
                Some(Fragment::simple(text))
            }
            FilterOp::In { field, values } => {
                if values.is_empty() {
                    return None;
                }
                let field_type = schema.field_type(field);
                let text = values
                    .iter()
                    .map(|value| format!("{field}:{}", term(value, field_type)))
                    .collect::<Vec<_>>()
                    .join(" OR ");
                Some(Fragment {
                    text,
                    compound: values.len() > 1,
                })
            }
            FilterOp::And(children) => self.join(children, " AND ", schema),
            FilterOp::Or(children) => self.join(children, " OR ", schema),
        }
    }

    fn join(&self, children: &[FilterOp], separator: &str, schema: &SearchSchema) -> Option<Fragment> {
        let mut fragments: Vec<Fragment> = children
            .iter()
            .filter_map(|child| self.translate_node(child, schema))
            .collect();

        match fragments.len() {
            0 => None,
            1 => fragments.pop(),
            _ => Some(Fragment {
                text: fragments
                    .into_iter()
                    .map(Fragment::nested)
                    .collect::<Vec<_>>()
                    .join(separator),
                compound: true,
            }),
        }
    }
}

impl FilterTranslator for SolrTranslator {
    fn id(&self) -> &str {
        SOLR_BACKEND_ID
    }

    fn translate_filter(&self, filter: &FilterOp, schema: &SearchSchema) -> TranslatedFilter {
        TranslatedFilter::QueryStrings(self.translate(filter, schema))
    }
}

fn escape(value: &Scalar) -> String {
    value.to_string().replace('"', "\\\"")
}

/// Formats a value compared for equality against a field of the given type.
fn term(value: &Scalar, field_type: Option<FieldType>) -> String {
    let escaped = escape(value);
    match field_type {
        None | Some(FieldType::Text | FieldType::String | FieldType::Date) => {
            format!("\"{escaped}\"")
        }
        Some(_) => escaped,
    }
}

fn range_bound(value: &Scalar) -> String {
    escape(value)
}
