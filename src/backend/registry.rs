//! Translators indexed by backend id.
//!
//! The registry is built once at startup and handed to whatever dispatches
//! searches; there is no global lookup.

use std::collections::HashMap;
use std::sync::Arc;

use crate::backend::{
    ElasticsearchTranslator, FilterTranslator, SolrTranslator, TranslatedFilter,
};
use crate::error::{FilterqlError, Result};
use crate::filter::FilterOp;
use crate::schema::SearchSchema;

#[derive(Default, Clone)]
pub struct TranslatorRegistry {
    translators: HashMap<String, Arc<dyn FilterTranslator>>,
}

impl TranslatorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the Solr and Elasticsearch translators.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(SolrTranslator::new()));
        registry.register(Arc::new(ElasticsearchTranslator::new()));
        registry
    }

    /// Registers a translator under its id, returning the one it replaces.
    pub fn register(
        &mut self,
        translator: Arc<dyn FilterTranslator>,
    ) -> Option<Arc<dyn FilterTranslator>> {
        let id = translator.id().to_string();
        log::debug!("Registering filter translator '{id}'");
        self.translators.insert(id, translator)
    }

    pub fn get(&self, id: &str) -> Result<Arc<dyn FilterTranslator>> {
        self.translators.get(id).cloned().ok_or_else(|| {
            FilterqlError::not_found(format!(
                "No filter translator registered for backend '{id}' (available: {})",
                self.ids().join(", ")
            ))
        })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.translators.contains_key(id)
    }

    /// Registered backend ids in alphabetical order.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.translators.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.translators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.translators.is_empty()
    }

    /// Looks up the backend and translates `filter` with it.
    pub fn translate(
        &self,
        id: &str,
        filter: &FilterOp,
        schema: &SearchSchema,
    ) -> Result<TranslatedFilter> {
        Ok(self.get(id)?.translate_filter(filter, schema))
    }
}

impl std::fmt::Debug for TranslatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslatorRegistry")
            .field("ids", &self.ids())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTranslator;

    impl FilterTranslator for EchoTranslator {
        fn id(&self) -> &str {
            "solr"
        }

        fn translate_filter(&self, filter: &FilterOp, _schema: &SearchSchema) -> TranslatedFilter {
            TranslatedFilter::QueryStrings(vec![filter.to_string()])
        }
    }

    #[test]
    fn test_defaults() {
        let registry = TranslatorRegistry::with_defaults();
        assert_eq!(registry.ids(), vec!["elasticsearch", "solr"]);
        assert!(registry.contains("solr"));
        assert_eq!(registry.get("elasticsearch").unwrap().id(), "elasticsearch");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_unknown_backend() {
        let registry = TranslatorRegistry::with_defaults();
        let err = registry.get("sphinx").err().unwrap();
        assert!(matches!(err, FilterqlError::NotFound(_)));
        assert!(err.to_string().contains("available: elasticsearch, solr"));
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = TranslatorRegistry::with_defaults();
        let previous = registry.register(Arc::new(EchoTranslator));
        assert!(previous.is_some());
        assert_eq!(registry.len(), 2);

        let schema = SearchSchema::builder().add_untyped_field("a").build();
        let translated = registry
            .translate("solr", &FilterOp::eq("a", 1), &schema)
            .unwrap();
        assert_eq!(
            translated,
            TranslatedFilter::QueryStrings(vec![r#"{"field":"a","op":"eq","value":1}"#.to_string()])
        );
    }

    #[test]
    fn test_empty_registry() {
        let registry = TranslatorRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get("solr").is_err());
    }
}
