use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt;
use std::path::Path;
use tracing::warn;

use crate::error::ConfigError;
use crate::messages::{
    DEFAULT_DESCRIPTION, DEFAULT_OPENAPI_JSON_PATH, DEFAULT_OPENAPI_YAML_PATH,
    DEFAULT_SWAGGER_UI_PATH, DEFAULT_TITLE, DEFAULT_VERSION,
};
use crate::route::{ErrorHandler, Middleware, Params};
use crate::server::{ApiRequest, ApiResponse};

/// One of the three documentation-serving paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReservedPath {
    OpenApiJson,
    OpenApiYaml,
    SwaggerUi,
}

impl ReservedPath {
    pub const ALL: [ReservedPath; 3] = [
        ReservedPath::OpenApiJson,
        ReservedPath::OpenApiYaml,
        ReservedPath::SwaggerUi,
    ];

    /// Configuration key naming this path
    #[must_use]
    pub fn config_key(&self) -> &'static str {
        match self {
            ReservedPath::OpenApiJson => "openApiJsonPath",
            ReservedPath::OpenApiYaml => "openApiYamlPath",
            ReservedPath::SwaggerUi => "swaggerUiPath",
        }
    }
}

impl fmt::Display for ReservedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.config_key())
    }
}

/// Effective configuration: defaults with a candidate merged over them.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiConfig {
    /// Base OpenAPI fragment; always an object with an `info` object
    pub open_api_spec: Value,
    pub open_api_json_path: String,
    pub open_api_yaml_path: String,
    pub swagger_ui_path: String,
    pub expose_open_api_spec: bool,
    pub error_handler: Option<ErrorHandler>,
    pub middleware: Option<Middleware>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            open_api_spec: json!({
                "info": {
                    "title": DEFAULT_TITLE,
                    "description": DEFAULT_DESCRIPTION,
                    "version": DEFAULT_VERSION,
                }
            }),
            open_api_json_path: DEFAULT_OPENAPI_JSON_PATH.to_string(),
            open_api_yaml_path: DEFAULT_OPENAPI_YAML_PATH.to_string(),
            swagger_ui_path: DEFAULT_SWAGGER_UI_PATH.to_string(),
            expose_open_api_spec: true,
            error_handler: None,
            middleware: None,
        }
    }
}

impl ApiConfig {
    /// Merge `overrides` over the defaults.
    ///
    /// Present scalar fields replace the default; `open_api_spec` is merged
    /// key by key, recursively.
    #[must_use]
    pub fn from_overrides(overrides: ApiConfigOverrides) -> Self {
        let mut config = Self::default();
        if let Some(fragment) = &overrides.open_api_spec {
            match checked_fragment(fragment) {
                Ok(()) => deep_merge(&mut config.open_api_spec, fragment),
                Err(err) => warn!(error = %err, "Ignoring openApiSpec override"),
            }
        }
        if let Some(path) = overrides.open_api_json_path {
            config.open_api_json_path = path;
        }
        if let Some(path) = overrides.open_api_yaml_path {
            config.open_api_yaml_path = path;
        }
        if let Some(path) = overrides.swagger_ui_path {
            config.swagger_ui_path = path;
        }
        if let Some(expose) = overrides.expose_open_api_spec {
            config.expose_open_api_spec = expose;
        }
        if overrides.error_handler.is_some() {
            config.error_handler = overrides.error_handler;
        }
        if overrides.middleware.is_some() {
            config.middleware = overrides.middleware;
        }
        config
    }

    /// `info` object of the base fragment.
    #[must_use]
    pub fn info(&self) -> &Value {
        &self.open_api_spec["info"]
    }

    #[must_use]
    pub fn path_for(&self, reserved: ReservedPath) -> &str {
        match reserved {
            ReservedPath::OpenApiJson => &self.open_api_json_path,
            ReservedPath::OpenApiYaml => &self.open_api_yaml_path,
            ReservedPath::SwaggerUi => &self.swagger_ui_path,
        }
    }

    /// Which reserved path, if any, `path` refers to (trailing slashes ignored).
    #[must_use]
    pub fn reserved_path(&self, path: &str) -> Option<ReservedPath> {
        let normalized = normalize(path);
        ReservedPath::ALL
            .into_iter()
            .find(|r| normalize(self.path_for(*r)) == normalized)
    }
}

fn normalize(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

/// Candidate configuration; absent fields keep their defaults.
///
/// Data fields deserialize from YAML or JSON using camelCase keys:
///
/// ```yaml
/// openApiSpec:
///   info:
///     title: Todo API
/// openApiJsonPath: /api/v1/openapi.json
/// exposeOpenApiSpec: true
/// ```
///
/// Hooks are code-only.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfigOverrides {
    pub open_api_spec: Option<Value>,
    pub open_api_json_path: Option<String>,
    pub open_api_yaml_path: Option<String>,
    pub swagger_ui_path: Option<String>,
    pub expose_open_api_spec: Option<bool>,
    #[serde(skip)]
    pub error_handler: Option<ErrorHandler>,
    #[serde(skip)]
    pub middleware: Option<Middleware>,
}

impl ApiConfigOverrides {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_open_api_spec(mut self, fragment: Value) -> Self {
        self.open_api_spec = Some(fragment);
        self
    }

    #[must_use]
    pub fn with_open_api_json_path(mut self, path: impl Into<String>) -> Self {
        self.open_api_json_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_open_api_yaml_path(mut self, path: impl Into<String>) -> Self {
        self.open_api_yaml_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_swagger_ui_path(mut self, path: impl Into<String>) -> Self {
        self.swagger_ui_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_expose_open_api_spec(mut self, expose: bool) -> Self {
        self.expose_open_api_spec = Some(expose);
        self
    }

    #[must_use]
    pub fn with_error_handler<F>(mut self, f: F) -> Self
    where
        F: Fn(&ApiRequest, &mut ApiResponse, &anyhow::Error) + Send + Sync + 'static,
    {
        self.error_handler = Some(ErrorHandler::new(f));
        self
    }

    #[must_use]
    pub fn with_middleware<F>(mut self, f: F) -> Self
    where
        F: Fn(&ApiRequest, &Params) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.middleware = Some(Middleware::new(f));
        self
    }

    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        let overrides: Self = serde_yaml::from_str(source)?;
        overrides.checked()
    }

    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        let overrides: Self = serde_json::from_str(source)?;
        overrides.checked()
    }

    /// Load from a `.json`, `.yaml` or `.yml` file (anything else is read as YAML).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&source),
            _ => Self::from_yaml_str(&source),
        }
    }

    fn checked(self) -> Result<Self, ConfigError> {
        if let Some(fragment) = &self.open_api_spec {
            checked_fragment(fragment)?;
        }
        Ok(self)
    }
}

/// The base fragment must be a mapping whose `info`, when present, is a mapping too.
fn checked_fragment(fragment: &Value) -> Result<(), ConfigError> {
    let Some(map) = fragment.as_object() else {
        return Err(ConfigError::SpecFragmentNotObject);
    };
    match map.get("info") {
        Some(info) if !info.is_object() => Err(ConfigError::InfoNotObject),
        _ => Ok(()),
    }
}

/// Merge `overlay` into `base`: objects merge key by key, anything else replaces.
pub fn deep_merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.open_api_json_path, "/api/openapi.json");
        assert_eq!(config.open_api_yaml_path, "/api/openapi.yaml");
        assert_eq!(config.swagger_ui_path, "/api");
        assert!(config.expose_open_api_spec);
        assert_eq!(config.info()["title"], DEFAULT_TITLE);
    }

    #[test]
    fn test_merge_is_recursive() {
        let config = ApiConfig::from_overrides(
            ApiConfigOverrides::new()
                .with_open_api_spec(json!({
                    "info": { "title": "Todo API" },
                    "servers": [{ "url": "https://example.com" }]
                }))
                .with_swagger_ui_path("/docs"),
        );
        assert_eq!(config.info()["title"], "Todo API");
        assert_eq!(config.info()["description"], DEFAULT_DESCRIPTION);
        assert_eq!(config.info()["version"], DEFAULT_VERSION);
        assert_eq!(config.open_api_spec["servers"][0]["url"], "https://example.com");
        assert_eq!(config.swagger_ui_path, "/docs");
        assert_eq!(config.open_api_json_path, "/api/openapi.json");
    }

    #[test]
    fn test_deep_merge_replaces_non_objects() {
        let mut base = json!({"a": {"b": 1, "c": [1, 2]}, "d": "x"});
        deep_merge(&mut base, &json!({"a": {"c": [3]}, "d": {"e": true}}));
        assert_eq!(base, json!({"a": {"b": 1, "c": [3]}, "d": {"e": true}}));
    }

    #[test]
    fn test_reserved_path_lookup() {
        let config = ApiConfig::default();
        assert_eq!(config.reserved_path("/api"), Some(ReservedPath::SwaggerUi));
        assert_eq!(config.reserved_path("/api/"), Some(ReservedPath::SwaggerUi));
        assert_eq!(
            config.reserved_path("/api/openapi.yaml"),
            Some(ReservedPath::OpenApiYaml)
        );
        assert_eq!(config.reserved_path("/api/todos"), None);
    }

    #[test]
    fn test_overrides_from_yaml() {
        let overrides = ApiConfigOverrides::from_yaml_str(
            "openApiSpec:\n  info:\n    title: From YAML\nexposeOpenApiSpec: false\n",
        )
        .unwrap();
        assert_eq!(overrides.expose_open_api_spec, Some(false));
        let config = ApiConfig::from_overrides(overrides);
        assert_eq!(config.info()["title"], "From YAML");
        assert!(!config.expose_open_api_spec);
    }

    #[test]
    fn test_overrides_reject_non_object_fragment() {
        let err = ApiConfigOverrides::from_json_str(r#"{"openApiSpec": [1, 2]}"#).unwrap_err();
        assert!(matches!(err, ConfigError::SpecFragmentNotObject));
    }

    #[test]
    fn test_overrides_reject_non_object_info() {
        let err =
            ApiConfigOverrides::from_yaml_str("openApiSpec:\n  info: oops\n").unwrap_err();
        assert!(matches!(err, ConfigError::InfoNotObject));
    }

    #[test]
    fn test_malformed_fragment_keeps_defaults() {
        let config =
            ApiConfig::from_overrides(ApiConfigOverrides::new().with_open_api_spec(json!([1, 2])));
        assert_eq!(config.open_api_spec, ApiConfig::default().open_api_spec);

        let config = ApiConfig::from_overrides(
            ApiConfigOverrides::new()
                .with_open_api_spec(json!({ "info": "oops", "servers": [] }))
                .with_swagger_ui_path("/docs"),
        );
        assert_eq!(config.info()["title"], DEFAULT_TITLE);
        assert!(config.open_api_spec.get("servers").is_none());
        assert_eq!(config.swagger_ui_path, "/docs");
    }
}
