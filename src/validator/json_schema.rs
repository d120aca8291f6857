use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::{SchemaValidator, ValidationFailure};
use crate::error::SchemaError;

/// JSON Schema backend (`jsonschema` crate).
///
/// The schema is compiled once, when the `JsonSchema` is created, so a broken
/// schema surfaces at registration time rather than on the first request.
#[derive(Clone)]
pub struct JsonSchema {
    schema: Value,
    compiled: Arc<jsonschema::Validator>,
}

impl JsonSchema {
    pub fn new(schema: Value) -> Result<Self, SchemaError> {
        let compiled =
            jsonschema::validator_for(&schema).map_err(|e| SchemaError::InvalidJsonSchema {
                reason: e.to_string(),
            })?;
        debug!(schema = %schema, "Compiled JSON Schema validator");
        Ok(Self {
            schema,
            compiled: Arc::new(compiled),
        })
    }

    /// Compile and wrap into a shared [`super::Schema`] handle.
    pub fn shared(schema: Value) -> Result<super::Schema, SchemaError> {
        Ok(Arc::new(Self::new(schema)?))
    }

    #[must_use]
    pub fn schema(&self) -> &Value {
        &self.schema
    }
}

impl SchemaValidator for JsonSchema {
    fn validate(&self, value: &Value) -> Result<Value, ValidationFailure> {
        let messages: Vec<String> = self
            .compiled
            .iter_errors(value)
            .map(|e| e.to_string())
            .collect();
        if messages.is_empty() {
            Ok(value.clone())
        } else {
            Err(ValidationFailure::new(messages))
        }
    }

    fn openapi_schema(&self) -> Value {
        self.schema.clone()
    }

    fn library(&self) -> &'static str {
        "jsonschema"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn todo_schema() -> JsonSchema {
        JsonSchema::new(json!({
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "completed": { "type": "boolean" }
            },
            "required": ["name", "completed"]
        }))
        .unwrap()
    }

    #[test]
    fn test_accepts_valid_value() {
        let value = json!({"name": "milk", "completed": false});
        assert_eq!(todo_schema().validate(&value), Ok(value));
    }

    #[test]
    fn test_reports_each_violation() {
        let failure = todo_schema()
            .validate(&json!({"name": 42}))
            .unwrap_err();
        assert_eq!(failure.messages.len(), 2);
        assert!(failure.messages.iter().any(|m| m.contains("completed")));
        assert!(failure.messages.iter().any(|m| m.contains("42")));
    }

    #[test]
    fn test_invalid_schema_is_a_configuration_error() {
        let err = JsonSchema::new(json!({"type": "not-a-type"})).err().unwrap();
        assert!(matches!(err, SchemaError::InvalidJsonSchema { .. }));
    }

    #[test]
    fn test_openapi_schema_is_the_document() {
        assert_eq!(todo_schema().openapi_schema()["required"], json!(["name", "completed"]));
        assert_eq!(todo_schema().library(), "jsonschema");
    }
}
