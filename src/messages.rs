//! Fixed message catalog and documentation defaults.
//!
//! The error strings are returned verbatim in JSON error bodies
//! (`{"message": ...}`) and must not change between releases.

/// Body message for a method missing from the endpoint table (405).
pub const METHOD_NOT_ALLOWED: &str = "Method not allowed.";

/// Body message for an unknown path or a disabled reserved path (404).
pub const NOT_FOUND: &str = "Not found.";

/// Body message for a request content type that differs from the declared input (415).
pub const INVALID_MEDIA_TYPE: &str = "Invalid media type.";

/// Body message returned by the default error handler (500).
pub const UNEXPECTED_ERROR: &str = "An unknown error occurred, trying again might help.";

/// OpenAPI version written into every generated document.
pub const OPENAPI_VERSION: &str = "3.0.1";

/// Default `info.title` of the generated document.
pub const DEFAULT_TITLE: &str = "restroute";

/// Default `info.description` of the generated document.
pub const DEFAULT_DESCRIPTION: &str = "This is an autogenerated OpenAPI spec by restroute.";

/// Default `info.version` of the generated document.
pub const DEFAULT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default path serving the OpenAPI document as JSON.
pub const DEFAULT_OPENAPI_JSON_PATH: &str = "/api/openapi.json";

/// Default path serving the OpenAPI document as YAML.
pub const DEFAULT_OPENAPI_YAML_PATH: &str = "/api/openapi.yaml";

/// Default path serving the Swagger UI page.
pub const DEFAULT_SWAGGER_UI_PATH: &str = "/api";
