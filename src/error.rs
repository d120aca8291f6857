//! Typed errors for configuration-time failures.
//!
//! Everything here is raised while the application is being wired up (schema
//! compilation, route registration, configuration loading, documentation
//! rendering) or at the host boundary. Request-time failures that callers see
//! are written as fixed JSON bodies by [`crate::server::response`] instead.

use thiserror::Error;

use crate::route::HttpMethod;

/// A schema that no supported validator backend accepts.
///
/// Distinct from [`crate::validator::ValidationFailure`], which describes data
/// rejected by a valid schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid JSON Schema: {reason}")]
    InvalidJsonSchema { reason: String },
}

/// Invalid endpoint registration.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("route path `{path}` must start with `/`")]
    MissingLeadingSlash { path: String },
    #[error("route path `{path}` has an invalid dynamic segment `{segment}`")]
    InvalidSegment { path: String, segment: String },
    #[error("route path `{path}` is already registered")]
    DuplicateRoute { path: String },
    #[error("route `{path}` registers more than one handler for {method}")]
    DuplicateMethod { path: String, method: HttpMethod },
}

/// Configuration file loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("failed to parse JSON configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("`openApiSpec` must be a mapping")]
    SpecFragmentNotObject,
    #[error("`openApiSpec.info` must be a mapping")]
    InfoNotObject,
}

/// Conversion failures at the host boundary.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("request body is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("request body is not valid UTF-8")]
    NonUtf8Body,
}

/// Documentation rendering failures.
#[derive(Debug, Error)]
pub enum DocsError {
    #[error("failed to render documentation page: {0}")]
    Template(#[from] minijinja::Error),
    #[error("failed to serialize OpenAPI document as YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Any restroute error.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Route(#[from] RouteError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error(transparent)]
    Docs(#[from] DocsError),
    #[error("failed to build HTTP response: {0}")]
    Http(#[from] http::Error),
}
