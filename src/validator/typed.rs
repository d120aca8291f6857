use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::marker::PhantomData;
use std::sync::Arc;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use super::{SchemaValidator, ValidationFailure};

/// Typed backend: `serde` deserialization followed by the `validator` crate.
///
/// A value that does not deserialize into `T` yields a single message from
/// `serde_json`. A value that deserializes but breaks `#[validate(...)]` rules
/// yields one `"<field>: <message>"` entry per field-level error, ordered by
/// field path. On success the value is re-serialized from `T`, so defaults and
/// renames applied by serde show up in what the handler receives.
///
/// ```rust
/// use restroute::validator::{SchemaValidator, TypedSchema};
/// use serde::{Deserialize, Serialize};
/// use validator::Validate;
///
/// #[derive(Deserialize, Serialize, Validate)]
/// struct NewTodo {
///     #[validate(length(min = 1, message = "name must not be empty"))]
///     name: String,
/// }
///
/// let schema = TypedSchema::<NewTodo>::new();
/// let failure = schema.validate(&serde_json::json!({ "name": "" })).unwrap_err();
/// assert_eq!(failure.messages, vec!["name: name must not be empty".to_string()]);
/// ```
pub struct TypedSchema<T> {
    openapi_schema: Value,
    _marker: PhantomData<fn() -> T>,
}

impl<T> TypedSchema<T>
where
    T: DeserializeOwned + Serialize + Validate + 'static,
{
    #[must_use]
    pub fn new() -> Self {
        Self {
            openapi_schema: json!({ "type": "object" }),
            _marker: PhantomData,
        }
    }

    /// OpenAPI schema object used when documenting this type.
    #[must_use]
    pub fn with_openapi_schema(mut self, schema: Value) -> Self {
        self.openapi_schema = schema;
        self
    }

    /// Wrap into a shared [`super::Schema`] handle.
    #[must_use]
    pub fn shared(self) -> super::Schema {
        Arc::new(self)
    }
}

impl<T> Default for TypedSchema<T>
where
    T: DeserializeOwned + Serialize + Validate + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SchemaValidator for TypedSchema<T>
where
    T: DeserializeOwned + Serialize + Validate + 'static,
{
    fn validate(&self, value: &Value) -> Result<Value, ValidationFailure> {
        let parsed: T = serde_json::from_value(value.clone())
            .map_err(|e| ValidationFailure::new(vec![e.to_string()]))?;
        parsed
            .validate()
            .map_err(|errors| ValidationFailure::new(flatten_errors(&errors)))?;
        serde_json::to_value(&parsed).map_err(|e| ValidationFailure::new(vec![e.to_string()]))
    }

    fn openapi_schema(&self) -> Value {
        self.openapi_schema.clone()
    }

    fn library(&self) -> &'static str {
        "validator"
    }
}

/// Flatten nested `ValidationErrors` into `"<path>: <message>"` strings.
///
/// `validator` keeps errors in hash maps, so fields are sorted to make the
/// output stable.
pub(crate) fn flatten_errors(errors: &ValidationErrors) -> Vec<String> {
    let mut messages = Vec::new();
    collect(errors, "", &mut messages);
    messages
}

fn collect(errors: &ValidationErrors, prefix: &str, out: &mut Vec<String>) {
    let mut fields: Vec<_> = errors.errors().iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    for (field, kind) in fields {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for err in field_errors {
                    let text = match &err.message {
                        Some(message) => message.to_string(),
                        None => err.code.to_string(),
                    };
                    out.push(format!("{path}: {text}"));
                }
            }
            ValidationErrorsKind::Struct(nested) => collect(nested, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect(nested, &format!("{path}[{index}]"), out);
                }
            }
        }
    }
}
