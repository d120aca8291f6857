use serde_json::{json, Map, Value};

use super::OpenApiDocument;
use crate::config::{deep_merge, ApiConfig};
use crate::messages::OPENAPI_VERSION;
use crate::route::{Endpoint, MethodHandler, RoutePattern};

fn single(key: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    Value::Object(map)
}

/// Build the OpenAPI document for `routes` under `config`.
///
/// Routes are emitted in the order given; methods within a route in
/// alphabetical order. Methods without `input` or `output` are left out.
pub fn build_spec<'a, I>(config: &ApiConfig, routes: I) -> OpenApiDocument
where
    I: IntoIterator<Item = (&'a RoutePattern, &'a Endpoint)>,
{
    let mut root = Map::new();
    root.insert("openapi".to_string(), json!(OPENAPI_VERSION));
    root.insert("info".to_string(), config.info().clone());
    root.insert("components".to_string(), json!({}));
    root.insert("paths".to_string(), json!({}));
    let mut doc = Value::Object(root);

    if let Some(fragment) = config.open_api_spec.as_object() {
        let mut extra = fragment.clone();
        extra.remove("openapi");
        extra.remove("info");
        deep_merge(&mut doc, &Value::Object(extra));
    }

    let mut paths = Map::new();
    for (pattern, endpoint) in routes {
        let mut path_item = Map::new();
        for (method, handler) in endpoint.handlers() {
            if !handler.is_documented() {
                continue;
            }
            path_item.insert(
                method.openapi_key().to_string(),
                build_operation(pattern, handler),
            );
        }
        if path_item.is_empty() {
            continue;
        }
        let key = pattern.openapi_path();
        match paths.get_mut(&key) {
            Some(existing) => deep_merge(existing, &Value::Object(path_item)),
            None => {
                paths.insert(key, Value::Object(path_item));
            }
        }
    }
    deep_merge(&mut doc, &single("paths", Value::Object(paths)));

    OpenApiDocument::from_value(doc)
}

fn build_operation(pattern: &RoutePattern, handler: &MethodHandler) -> Value {
    let mut operation = Map::new();

    let parameters: Vec<Value> = pattern
        .param_names()
        .map(|name| {
            json!({
                "name": name,
                "in": "path",
                "required": true,
                "schema": { "type": "string" }
            })
        })
        .collect();
    if !parameters.is_empty() {
        operation.insert("parameters".to_string(), Value::Array(parameters));
    }

    if let Some(input) = &handler.input {
        let media = single("schema", input.schema.openapi_schema());
        operation.insert(
            "requestBody".to_string(),
            single("content", single(&input.content_type, media)),
        );
    }

    let mut responses = Map::new();
    for output in &handler.output {
        let entry = responses.entry(output.status.to_string()).or_insert_with(|| {
            json!({
                "description": format!("Response for status {}", output.status),
                "content": {}
            })
        });
        if let Some(content) = entry.get_mut("content").and_then(Value::as_object_mut) {
            content.insert(
                output.content_type.clone(),
                single("schema", output.schema.openapi_schema()),
            );
        }
    }
    operation.insert("responses".to_string(), Value::Object(responses));

    let mut operation = Value::Object(operation);
    if let Some(overrides) = &handler.openapi_operation {
        deep_merge(&mut operation, overrides);
    }
    operation
}
