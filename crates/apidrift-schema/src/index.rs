//! # Schema Index
//!
//! Parses the OpenAPI document and exposes its `components.schemas`
//! dictionary as a read-only name → [`SchemaNode`] index.
//!
//! The document is loaded once at startup. A malformed or unreadable
//! document is the one fatal condition in the whole tool; everything
//! downstream converts problems into per-endpoint results or issues.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Reference prefix for schemas defined in the same document.
/// Anything outside this prefix is treated as unresolved.
const REF_PREFIX: &str = "#/components/schemas/";

/// Error loading the OpenAPI document.
#[derive(Error, Debug)]
pub enum SpecError {
    /// The document file could not be read.
    #[error("cannot read spec document '{path}': {source}")]
    Read {
        /// Path to the document that failed to load.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid YAML or does not match the expected shape.
    #[error("spec document '{path}' is not valid YAML: {source}")]
    Parse {
        /// Path (or `<string>` for in-memory input) of the document.
        path: String,
        /// Underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },
}

/// One node of a schema tree, with the keys the comparator recognizes.
///
/// Unknown keys (`description`, `format`, `example`, ...) are ignored on
/// deserialization. A node with `reference` set defers entirely to the
/// referenced node; its other keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaNode {
    /// Declared type: `object`, `array`, `string`, `integer`, `number`,
    /// or `boolean`. Nodes without a recognized type are accepted as-is.
    #[serde(rename = "type")]
    pub node_type: Option<String>,

    /// `$ref` pointer to a named schema in the same document.
    #[serde(rename = "$ref")]
    pub reference: Option<String>,

    /// Declared fields of a closed object.
    #[serde(default)]
    pub properties: BTreeMap<String, SchemaNode>,

    /// Open-map marker: schema-valued for homogeneous maps, boolean per
    /// the OpenAPI shorthand.
    #[serde(rename = "additionalProperties")]
    pub additional_properties: Option<AdditionalProperties>,

    /// Field names that must be present.
    #[serde(default)]
    pub required: Vec<String>,

    /// Element schema of an array.
    pub items: Option<Box<SchemaNode>>,

    /// Allowed literal values. Membership checks compare string content.
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<Value>>,

    /// Whether null is an accepted value for this node.
    #[serde(default)]
    pub nullable: bool,
}

/// The two OpenAPI spellings of `additionalProperties`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    /// `true` accepts arbitrary entries unvalidated; `false` keeps
    /// closed-object semantics.
    Allowed(bool),
    /// Homogeneous map: every entry value validates against this node.
    Schema(Box<SchemaNode>),
}

#[derive(Debug, Deserialize)]
struct SpecDocument {
    #[serde(default)]
    components: Components,
}

#[derive(Debug, Default, Deserialize)]
struct Components {
    #[serde(default)]
    schemas: BTreeMap<String, SchemaNode>,
}

/// Read-only mapping from schema name to schema root, built once from the
/// OpenAPI document's `components.schemas` section.
#[derive(Debug, Default)]
pub struct SchemaIndex {
    schemas: BTreeMap<String, SchemaNode>,
}

impl SchemaIndex {
    /// Load the index from an OpenAPI document on disk.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::Read`] if the file cannot be read and
    /// [`SpecError::Parse`] if it is not valid YAML.
    pub fn from_path(path: &Path) -> Result<Self, SpecError> {
        let content = std::fs::read_to_string(path).map_err(|e| SpecError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let doc: SpecDocument = serde_yaml::from_str(&content).map_err(|e| SpecError::Parse {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(Self {
            schemas: doc.components.schemas,
        })
    }

    /// Load the index from an in-memory YAML document.
    pub fn from_yaml_str(content: &str) -> Result<Self, SpecError> {
        let doc: SpecDocument = serde_yaml::from_str(content).map_err(|e| SpecError::Parse {
            path: "<string>".to_string(),
            source: e,
        })?;
        Ok(Self {
            schemas: doc.components.schemas,
        })
    }

    /// Look up a schema by name.
    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.schemas.get(name)
    }

    /// Resolve a `$ref` string to the referenced schema and its name.
    ///
    /// Only references into this document's schema section resolve;
    /// external or unknown references return `None` and raise no issue.
    /// This is a deliberate simplification, not a full JSON-Reference
    /// resolver.
    pub fn resolve_ref(&self, reference: &str) -> Option<(&str, &SchemaNode)> {
        let name = reference.strip_prefix(REF_PREFIX)?;
        self.schemas
            .get_key_value(name)
            .map(|(k, v)| (k.as_str(), v))
    }

    /// Number of schemas in the index.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Returns true if the document declared no schemas.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Names of all indexed schemas, in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(|s| s.as_str())
    }
}
