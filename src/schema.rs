//! Search schema: the fields a filter may reference.
//!
//! The schema declares what fields exist and their types. Filters referencing
//! a field that is not declared are rejected by the parser, and backends use
//! the declared type to decide how values are written (for example whether a
//! Solr term is quoted).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{FilterqlError, Result};

/// Current schema format version.
pub const SCHEMA_VERSION: u32 = 1;

/// Field types understood by the backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Analyzed full text.
    Text,
    /// Exact keyword.
    String,
    #[serde(alias = "boolean")]
    Bool,
    Date,
    #[serde(alias = "integer")]
    Int,
    Long,
    Float,
    #[serde(alias = "number")]
    Double,
    /// Any type name not listed above.
    #[serde(other)]
    Unknown,
}

impl FieldType {
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            FieldType::Int | FieldType::Long | FieldType::Float | FieldType::Double
        )
    }
}

/// Properties of a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    /// Field type. Untyped fields are treated like text by the backends.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
    /// Whether the field holds several values.
    #[serde(default, alias = "multiValued")]
    pub multiple: bool,
    #[serde(default = "default_indexed")]
    pub indexed: bool,
    #[serde(default)]
    pub stored: bool,
}

fn default_indexed() -> bool {
    true
}

fn default_version() -> u32 {
    SCHEMA_VERSION
}

impl FieldInfo {
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type: Some(field_type),
            ..Default::default()
        }
    }

    /// A field without a declared type.
    pub fn untyped() -> Self {
        Self::default()
    }

    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    pub fn with_indexed(mut self, indexed: bool) -> Self {
        self.indexed = indexed;
        self
    }

    pub fn with_stored(mut self, stored: bool) -> Self {
        self.stored = stored;
        self
    }
}

impl Default for FieldInfo {
    fn default() -> Self {
        Self {
            field_type: None,
            multiple: false,
            indexed: true,
            stored: false,
        }
    }
}

/// Mapping from field name to field properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSchema {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Options for each field.
    #[serde(default)]
    pub fields: HashMap<String, FieldInfo>,
}

impl SearchSchema {
    pub fn new() -> Self {
        Self {
            version: SCHEMA_VERSION,
            fields: HashMap::new(),
        }
    }

    pub fn builder() -> SearchSchemaBuilder {
        SearchSchemaBuilder::default()
    }

    /// Parses a schema from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| FilterqlError::schema(format!("Failed to parse schema JSON: {e}")))
    }

    pub fn contains_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.get(name)
    }

    /// Declared type of a field. `None` when the field is unknown or untyped.
    pub fn field_type(&self, name: &str) -> Option<FieldType> {
        self.fields.get(name).and_then(|info| info.field_type)
    }

    /// Field names in alphabetical order.
    pub fn field_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.fields.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Merges several schemas into one.
    ///
    /// The version of the first schema is kept. A field declared by more than
    /// one schema must be declared identically.
    pub fn merge<'a>(schemas: impl IntoIterator<Item = &'a SearchSchema>) -> Result<Self> {
        let mut schemas = schemas.into_iter().peekable();
        let mut merged = SearchSchema {
            version: schemas.peek().map_or(SCHEMA_VERSION, |s| s.version),
            fields: HashMap::new(),
        };

        for schema in schemas {
            for (name, info) in &schema.fields {
                match merged.fields.get(name) {
                    Some(existing) if existing != info => {
                        return Err(FilterqlError::schema(format!(
                            "Conflicting definitions for field '{name}': {existing:?} vs {info:?}"
                        )));
                    }
                    Some(_) => {}
                    None => {
                        merged.fields.insert(name.clone(), info.clone());
                    }
                }
            }
        }

        Ok(merged)
    }

    /// Fields indexed for datasets.
    pub fn dataset() -> Self {
        Self::builder()
            .add_field("id", FieldInfo::new(FieldType::String))
            .add_field("entity_type", FieldInfo::new(FieldType::String))
            .add_field("dataset_type", FieldInfo::new(FieldType::String))
            .add_field("name", FieldInfo::new(FieldType::Text))
            .add_field("title", FieldInfo::new(FieldType::Text))
            .add_field("notes", FieldInfo::new(FieldType::Text))
            .add_field("version", FieldInfo::new(FieldType::Text))
            .add_field("tags", FieldInfo::new(FieldType::String).multiple())
            .add_field("groups", FieldInfo::new(FieldType::String).multiple())
            .add_field("owner_org", FieldInfo::new(FieldType::String))
            .add_field("private", FieldInfo::new(FieldType::Bool))
            .add_field("metadata_created", FieldInfo::new(FieldType::Date))
            .add_field("metadata_modified", FieldInfo::new(FieldType::Date))
            .add_field(
                "permission_labels",
                FieldInfo::new(FieldType::String).multiple(),
            )
            .add_field(
                "validated_data_dict",
                FieldInfo::new(FieldType::String)
                    .with_indexed(false)
                    .with_stored(true),
            )
            .build()
    }

    /// Fields indexed for organizations.
    pub fn organization() -> Self {
        Self::builder()
            .add_field("id", FieldInfo::new(FieldType::String))
            .add_field("entity_type", FieldInfo::new(FieldType::String))
            .add_field("organization_type", FieldInfo::new(FieldType::String))
            .add_field("name", FieldInfo::new(FieldType::Text))
            .add_field("title", FieldInfo::new(FieldType::Text))
            .add_field("description", FieldInfo::new(FieldType::Text))
            .add_field(
                "validated_data_dict",
                FieldInfo::new(FieldType::String)
                    .with_indexed(false)
                    .with_stored(true),
            )
            .build()
    }

    /// Dataset and organization fields together.
    pub fn combined() -> Result<Self> {
        Self::merge([&Self::dataset(), &Self::organization()])
    }
}

impl Default for SearchSchema {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
pub struct SearchSchemaBuilder {
    version: Option<u32>,
    fields: HashMap<String, FieldInfo>,
}

impl SearchSchemaBuilder {
    pub fn version(mut self, version: u32) -> Self {
        self.version = Some(version);
        self
    }

    pub fn add_field(mut self, name: impl Into<String>, info: FieldInfo) -> Self {
        self.fields.insert(name.into(), info);
        self
    }

    pub fn add_typed_field(self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.add_field(name, FieldInfo::new(field_type))
    }

    pub fn add_untyped_field(self, name: impl Into<String>) -> Self {
        self.add_field(name, FieldInfo::untyped())
    }

    pub fn build(self) -> SearchSchema {
        SearchSchema {
            version: self.version.unwrap_or(SCHEMA_VERSION),
            fields: self.fields,
        }
    }
}
