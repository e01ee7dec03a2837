//! Output Document Types
//!
//! The flattened, JSON-serializable document produced for one root type.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::descriptor::TypeDescriptor;

/// Root path of every generated document
pub const ROOT_PATH: &str = "$";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectDoc {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub doc: String,
    pub properties: Vec<PropertyNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<Example>,
}

impl ObjectDoc {
    pub fn property(&self, path: &str) -> Option<&PropertyNode> {
        self.properties.iter().find(|p| p.path == path)
    }

    pub fn paths(&self) -> Vec<&str> {
        self.properties.iter().map(|p| p.path.as_str()).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub name: String,
    pub content: String,
}

/// One path-addressed entry of the flattened structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyNode {
    pub path: String,
    pub type_descriptor: TypeDescriptor,
    /// Rule facts merged in from the rule planner, kept opaque
    #[serde(flatten)]
    pub facts: Map<String, Value>,
    /// Documentation of the property's type
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub type_doc: String,
    /// Documentation attached to the member position
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub field_doc: String,
    /// Contents of the "Deprecated:" paragraph
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub deprecated_doc: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children_paths: Vec<String>,
}

impl PropertyNode {
    pub fn new(path: impl Into<String>, type_descriptor: TypeDescriptor) -> Self {
        Self {
            path: path.into(),
            type_descriptor,
            ..Default::default()
        }
    }

    /// Documentation key of the property's type
    pub fn key(&self) -> String {
        self.type_descriptor.key()
    }
}
