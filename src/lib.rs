//! # filterql
//!
//! A JSON filter query language for search APIs, compiled to Solr and
//! Elasticsearch filter queries.
//!
//! ## Features
//!
//! - Compact shorthand notations normalized to one canonical filter tree
//! - Validation against a search schema, reporting every problem at once
//! - Nesting depth and operation count limits
//! - Solr query-string and Elasticsearch query DSL translators
//!
//! ## Example
//!
//! ```
//! use filterql::backend::{ElasticsearchTranslator, SolrTranslator};
//! use filterql::filter::parse_filters;
//! use filterql::schema::SearchSchema;
//! use serde_json::json;
//!
//! let schema = SearchSchema::builder()
//!     .add_untyped_field("tags")
//!     .add_untyped_field("version")
//!     .build();
//!
//! let filter = parse_filters(&json!({"$and": [{"tags": "animal"}, {"version": "2"}]}), &schema)
//!     .unwrap()
//!     .unwrap();
//!
//! assert_eq!(
//!     SolrTranslator::new().translate(&filter, &schema),
//!     vec![r#"tags:"animal" AND version:"2""#]
//! );
//! assert_eq!(
//!     ElasticsearchTranslator::new().translate(&filter, &schema),
//!     Some(json!({"bool": {"must": [
//!         {"term": {"tags": "animal"}},
//!         {"term": {"version": "2"}},
//!     ]}}))
//! );
//! ```

pub mod backend;
pub mod error;
pub mod filter;
pub mod schema;

// Re-exports for the public API
pub use backend::{FilterTranslator, TranslatedFilter, TranslatorRegistry};
pub use error::{FilterqlError, Result, ValidationErrors};
pub use filter::{FilterLimits, FilterOp, FilterParser, Scalar, parse_filters};
pub use schema::{FieldInfo, FieldType, SearchSchema};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
