//! # Schema Validator Module
//!
//! Request and response bodies are checked against schemas owned by external
//! validation libraries. Each library is wrapped in a [`SchemaValidator`]
//! implementation that maps its native error shape onto a flat, ordered list of
//! human-readable messages.
//!
//! Backends are chosen explicitly when the schema is constructed:
//!
//! - [`JsonSchema`] - a JSON Schema document checked with the `jsonschema` crate
//! - [`TypedSchema`] - a Rust type deserialized with `serde` and checked with
//!   the `validator` crate's `Validate` derive
//!
//! ```rust
//! use restroute::validator::{JsonSchema, SchemaValidator};
//! use serde_json::json;
//!
//! let schema = JsonSchema::new(json!({
//!     "type": "object",
//!     "properties": { "name": { "type": "string" } },
//!     "required": ["name"]
//! }))
//! .expect("valid schema");
//!
//! assert!(schema.validate(&json!({ "name": "milk" })).is_ok());
//! let failure = schema.validate(&json!({})).unwrap_err();
//! assert_eq!(failure.messages.len(), 1);
//! ```

mod json_schema;
mod typed;

pub use json_schema::JsonSchema;
pub use typed::TypedSchema;

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Data rejected by a schema: one message per violation, in the order the
/// backend reported them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    pub messages: Vec<String>,
}

impl ValidationFailure {
    pub fn new(messages: Vec<String>) -> Self {
        Self { messages }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.messages.join("; "))
    }
}

impl std::error::Error for ValidationFailure {}

/// A schema backed by one validation library.
pub trait SchemaValidator: Send + Sync {
    /// Check `value`; on success return the parsed (possibly coerced) value.
    fn validate(&self, value: &Value) -> Result<Value, ValidationFailure>;

    /// OpenAPI schema object describing this schema in generated documentation.
    fn openapi_schema(&self) -> Value;

    /// Name of the backing library, for diagnostics.
    fn library(&self) -> &'static str;
}

/// Shared schema handle stored in endpoint definitions.
pub type Schema = Arc<dyn SchemaValidator>;

impl fmt::Debug for dyn SchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("library", &self.library())
            .finish()
    }
}
