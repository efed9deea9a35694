//! Backend translators turning a [`FilterOp`] into a search engine's native filter.
//!
//! # Module Structure
//!
//! - `solr`: Lucene query-string fragments for Solr `fq` parameters
//! - `elasticsearch`: Query DSL documents for the Elasticsearch `filter` clause
//! - `registry`: Lookup of translators by backend id
//!
//! Translators never fail: filters reaching them have already been validated
//! by the parser.

pub mod elasticsearch;
pub mod registry;
pub mod solr;

use serde_json::Value;

use crate::filter::FilterOp;
use crate::schema::SearchSchema;

pub use elasticsearch::{ELASTICSEARCH_BACKEND_ID, ElasticsearchTranslator};
pub use registry::TranslatorRegistry;
pub use solr::{SOLR_BACKEND_ID, SolrTranslator};

/// The native filter produced by a backend.
#[derive(Debug, Clone, PartialEq)]
pub enum TranslatedFilter {
    /// Query-string fragments, each one a self-contained filter query.
    QueryStrings(Vec<String>),
    /// A query document, `None` when the filter matches everything.
    QueryDocument(Option<Value>),
}

impl TranslatedFilter {
    /// Returns true when the filter resolved to nothing and must be omitted.
    pub fn is_empty(&self) -> bool {
        match self {
            TranslatedFilter::QueryStrings(fragments) => fragments.is_empty(),
            TranslatedFilter::QueryDocument(document) => document.is_none(),
        }
    }

    /// Fragments are rendered as a JSON array of strings, documents as-is.
    pub fn to_json(&self) -> Value {
        match self {
            TranslatedFilter::QueryStrings(fragments) => {
                Value::Array(fragments.iter().cloned().map(Value::String).collect())
            }
            TranslatedFilter::QueryDocument(document) => document.clone().unwrap_or(Value::Null),
        }
    }
}

/// A search backend able to express filters.
pub trait FilterTranslator: Send + Sync {
    /// The backend id this translator is registered under.
    fn id(&self) -> &str;

    fn translate_filter(&self, filter: &FilterOp, schema: &SearchSchema) -> TranslatedFilter;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_translated_filter_is_empty() {
        assert!(TranslatedFilter::QueryStrings(vec![]).is_empty());
        assert!(TranslatedFilter::QueryDocument(None).is_empty());
        assert!(!TranslatedFilter::QueryStrings(vec!["a:1".to_string()]).is_empty());
    }

    #[test]
    fn test_translated_filter_to_json() {
        assert_eq!(
            TranslatedFilter::QueryStrings(vec!["a:1".to_string()]).to_json(),
            json!(["a:1"])
        );
        assert_eq!(TranslatedFilter::QueryDocument(None).to_json(), Value::Null);
        assert_eq!(
            TranslatedFilter::QueryDocument(Some(json!({"term": {"a": 1}}))).to_json(),
            json!({"term": {"a": 1}})
        );
    }
}
