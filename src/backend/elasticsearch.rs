//! Translation to Elasticsearch query DSL.
//!
//! Produces the document placed in the `filter` clause of a `bool` query.
//! Values are passed through untouched, since the DSL is structured JSON.

use serde_json::{Map, Value, json};

use crate::backend::{FilterTranslator, TranslatedFilter};
use crate::filter::{CompareOp, FilterOp, Scalar};
use crate::schema::SearchSchema;

pub const ELASTICSEARCH_BACKEND_ID: &str = "elasticsearch";

#[derive(Debug, Clone, Copy, Default)]
pub struct ElasticsearchTranslator;

impl ElasticsearchTranslator {
    pub fn new() -> Self {
        Self
    }

    /// Translates a filter into a query document.
    ///
    /// Returns `None` when the filter resolves to nothing, in which case the
    /// caller must leave the filter clause out. Field types do not change the
    /// document, so the schema is not consulted.
    pub fn translate(&self, filter: &FilterOp, _schema: &SearchSchema) -> Option<Value> {
        let document = self.translate_node(filter)?;
        log::trace!("Translated filter {filter} to Elasticsearch query {document}");
        Some(document)
    }

    fn translate_node(&self, node: &FilterOp) -> Option<Value> {
        match node {
            FilterOp::Compare { field, op, value } => {
                let value = value.to_json();
                let document = match op {
                    CompareOp::Eq => single("term", single(field, value)),
                    CompareOp::Gt | CompareOp::Gte | CompareOp::Lt | CompareOp::Lte => {
                        single("range", single(field, single(op.as_str(), value)))
                    }
                    CompareOp::Custom(name) => {
                        log::warn!(
                            "Operator '{name}' has no Elasticsearch translation, using term equality on field '{field}'"
                        );
                        single("term", single(field, value))
                    }
                };
                Some(document)
            }
            FilterOp::In { field, values } => {
                if values.is_empty() {
                    return None;
                }
                let values = values.iter().map(Scalar::to_json).collect();
                Some(single("terms", single(field, Value::Array(values))))
            }
            FilterOp::And(children) => {
                let mut clauses = self.translate_children(children);
                match clauses.len() {
                    0 => None,
                    1 => clauses.pop(),
                    _ => Some(json!({"bool": {"must": clauses}})),
                }
            }
            FilterOp::Or(children) => {
                let mut clauses = self.translate_children(children);
                match clauses.len() {
                    0 => None,
                    1 => clauses.pop(),
                    _ => Some(json!({"bool": {"should": clauses, "minimum_should_match": 1}})),
                }
            }
        }
    }

    fn translate_children(&self, children: &[FilterOp]) -> Vec<Value> {
        children
            .iter()
            .filter_map(|child| self.translate_node(child))
            .collect()
    }
}

impl FilterTranslator for ElasticsearchTranslator {
    fn id(&self) -> &str {
        ELASTICSEARCH_BACKEND_ID
    }

    fn translate_filter(&self, filter: &FilterOp, schema: &SearchSchema) -> TranslatedFilter {
        TranslatedFilter::QueryDocument(self.translate(filter, schema))
    }
}

/// Builds `{key: value}`.
fn single(key: &str, value: Value) -> Value {
    let mut map = Map::with_capacity(1);
    map.insert(key.to_string(), value);
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translate(filter: FilterOp) -> Option<Value> {
        let schema = SearchSchema::builder()
            .add_untyped_field("tags")
            .add_untyped_field("size")
            .build();
        ElasticsearchTranslator::new().translate(&filter, &schema)
    }

    #[test]
    fn test_term() {
        assert_eq!(
            translate(FilterOp::eq("tags", r#"say "hi""#)),
            Some(json!({"term": {"tags": "say \"hi\""}}))
        );
    }

    #[test]
    fn test_ranges() {
        assert_eq!(
            translate(FilterOp::gte("size", 5)),
            Some(json!({"range": {"size": {"gte": 5}}}))
        );
        assert_eq!(
            translate(FilterOp::lt("size", Scalar::from_json(&json!(2.5)).unwrap())),
            Some(json!({"range": {"size": {"lt": 2.5}}}))
        );
    }

    #[test]
    fn test_terms() {
        assert_eq!(
            translate(FilterOp::in_values(
                "tags",
                vec![Scalar::from("a"), Scalar::from("b")]
            )),
            Some(json!({"terms": {"tags": ["a", "b"]}}))
        );
        assert_eq!(translate(FilterOp::in_values("tags", vec![])), None);
    }

    #[test]
    fn test_bool_queries() {
        assert_eq!(
            translate(FilterOp::and(vec![
                FilterOp::eq("tags", "animal"),
                FilterOp::gt("size", 1),
            ])),
            Some(json!({"bool": {"must": [
                {"term": {"tags": "animal"}},
                {"range": {"size": {"gt": 1}}},
            ]}}))
        );
        assert_eq!(
            translate(FilterOp::or(vec![
                FilterOp::eq("tags", "cats"),
                FilterOp::eq("tags", "dogs"),
            ])),
            Some(json!({"bool": {
                "should": [
                    {"term": {"tags": "cats"}},
                    {"term": {"tags": "dogs"}},
                ],
                "minimum_should_match": 1,
            }}))
        );
    }

    #[test]
    fn test_collapsing() {
        assert_eq!(
            translate(FilterOp::and(vec![
                FilterOp::in_values("tags", vec![]),
                FilterOp::eq("size", 3),
            ])),
            Some(json!({"term": {"size": 3}}))
        );
        assert_eq!(
            translate(FilterOp::or(vec![FilterOp::in_values("tags", vec![])])),
            None
        );
    }

    #[test]
    fn test_custom_operator_defaults_to_term() {
        let filter = FilterOp::compare("tags", CompareOp::Custom("fuzzy".to_string()), "cat");
        assert_eq!(translate(filter), Some(json!({"term": {"tags": "cat"}})));
    }
}
