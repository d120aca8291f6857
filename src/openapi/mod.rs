//! OpenAPI 3.0 document generation.
//!
//! The document is rebuilt from the registered endpoints on every request for
//! a documentation path, so it always reflects the current configuration.

mod build;

pub use build::build_spec;

use serde::Serialize;
use serde_json::Value;

/// A generated OpenAPI document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct OpenApiDocument(Value);

impl OpenApiDocument {
    pub(crate) fn from_value(value: Value) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn to_json(&self) -> &Value {
        &self.0
    }

    #[must_use]
    pub fn into_json(self) -> Value {
        self.0
    }

    /// Pretty-printed JSON, two-space indented.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.0)
    }

    /// YAML rendering with the same key order as the JSON document.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self.0)
    }
}
