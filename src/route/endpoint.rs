//! Endpoint tables: per-method handlers with their schemas and hooks.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::HttpMethod;
use crate::error::RouteError;
use crate::server::{ApiRequest, ApiResponse};
use crate::validator::Schema;

/// Parameters accumulated by the middleware chain.
pub type Params = Map<String, Value>;

/// Everything a handler receives for one request.
pub struct HandlerContext<'a> {
    pub req: &'a ApiRequest,
    pub res: &'a mut ApiResponse,
    /// Merged output of the global, endpoint and method middleware
    pub params: &'a Params,
    /// Request body after input validation (coerced by the validator), if the
    /// method declares an input
    pub body: Option<&'a Value>,
}

impl HandlerContext<'_> {
    /// Deserialize the validated body, falling back to the raw request body.
    pub fn json<T: DeserializeOwned>(&self) -> anyhow::Result<T> {
        let value = self
            .body
            .or(self.req.body.as_ref())
            .cloned()
            .unwrap_or(Value::Null);
        Ok(serde_json::from_value(value)?)
    }
}

type HandlerFnInner = dyn Fn(HandlerContext<'_>) -> anyhow::Result<()> + Send + Sync;
type MiddlewareFnInner = dyn Fn(&ApiRequest, &Params) -> anyhow::Result<Value> + Send + Sync;
type ErrorHandlerFnInner = dyn Fn(&ApiRequest, &mut ApiResponse, &anyhow::Error) + Send + Sync;

/// A request handler. Writes its own response through [`HandlerContext::res`].
#[derive(Clone)]
pub struct HandlerFn(Arc<HandlerFnInner>);

impl HandlerFn {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(HandlerContext<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, ctx: HandlerContext<'_>) -> anyhow::Result<()> {
        (self.0)(ctx)
    }
}

/// A parameter-enrichment step.
///
/// Receives the request and the parameters accumulated so far and returns a
/// JSON object whose fields are merged into them. Returning `null` contributes
/// nothing.
#[derive(Clone)]
pub struct Middleware(Arc<MiddlewareFnInner>);

impl Middleware {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&ApiRequest, &Params) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, req: &ApiRequest, params: &Params) -> anyhow::Result<Value> {
        (self.0)(req, params)
    }
}

/// Handles errors returned (or panics raised) by middleware and handlers.
///
/// The handler owns the response: whatever it writes is sent as-is.
#[derive(Clone)]
pub struct ErrorHandler(Arc<ErrorHandlerFnInner>);

impl ErrorHandler {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&ApiRequest, &mut ApiResponse, &anyhow::Error) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, req: &ApiRequest, res: &mut ApiResponse, err: &anyhow::Error) {
        (self.0)(req, res, err)
    }
}

// Hooks compare by identity: two handles are equal when they share the same
// allocation, i.e. one was cloned from the other.
macro_rules! hook_identity {
    ($($ty:ident),*) => {$(
        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                Arc::ptr_eq(&self.0, &other.0)
            }
        }

        impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($ty), "({:p})"), Arc::as_ptr(&self.0))
            }
        }
    )*};
}

hook_identity!(HandlerFn, Middleware, ErrorHandler);

/// Declared request body: content type plus schema.
#[derive(Clone, Debug)]
pub struct InputSpec {
    pub content_type: String,
    pub schema: Schema,
}

/// Declared response: status, content type and schema.
#[derive(Clone, Debug)]
pub struct OutputSpec {
    pub status: u16,
    pub content_type: String,
    pub schema: Schema,
}

/// Handler for one HTTP method of an endpoint.
#[derive(Clone, Debug)]
pub struct MethodHandler {
    pub input: Option<InputSpec>,
    pub output: Vec<OutputSpec>,
    pub middleware: Option<Middleware>,
    pub error_handler: Option<ErrorHandler>,
    /// OpenAPI operation fields merged over the generated operation
    /// (`summary`, `tags`, `operationId`, ...)
    pub openapi_operation: Option<Value>,
    handler: HandlerFn,
}

impl MethodHandler {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(HandlerContext<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self {
            input: None,
            output: Vec::new(),
            middleware: None,
            error_handler: None,
            openapi_operation: None,
            handler: HandlerFn::new(handler),
        }
    }

    #[must_use]
    pub fn with_input(mut self, content_type: impl Into<String>, schema: Schema) -> Self {
        self.input = Some(InputSpec {
            content_type: content_type.into(),
            schema,
        });
        self
    }

    #[must_use]
    pub fn with_output(mut self, status: u16, content_type: impl Into<String>, schema: Schema) -> Self {
        self.output.push(OutputSpec {
            status,
            content_type: content_type.into(),
            schema,
        });
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

    #[must_use]
    pub fn with_error_handler<F>(mut self, f: F) -> Self
    where
        F: Fn(&ApiRequest, &mut ApiResponse, &anyhow::Error) + Send + Sync + 'static,
    {
        self.error_handler = Some(ErrorHandler::new(f));
        self
    }

    #[must_use]
    pub fn with_openapi_operation(mut self, operation: Value) -> Self {
        self.openapi_operation = Some(operation);
        self
    }

    #[must_use]
    pub fn handler(&self) -> &HandlerFn {
        &self.handler
    }

    /// Whether this method contributes an operation to the OpenAPI document.
    #[must_use]
    pub fn is_documented(&self) -> bool {
        self.input.is_some() || !self.output.is_empty()
    }

    /// Declared output matching a written status and media type.
    #[must_use]
    pub fn output_for(&self, status: u16, media_type: &str) -> Option<&OutputSpec> {
        self.output
            .iter()
            .find(|o| o.status == status && o.content_type == media_type)
    }
}

/// Method-keyed handler table for one route.
#[derive(Clone, Debug, Default)]
pub struct Endpoint {
    handlers: BTreeMap<HttpMethod, Arc<MethodHandler>>,
    pub middleware: Option<Middleware>,
    pub error_handler: Option<ErrorHandler>,
    duplicates: Vec<HttpMethod>,
}

impl Endpoint {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler for `method`.
    ///
    /// Registering the same method twice is reported as
    /// [`RouteError::DuplicateMethod`] when the endpoint is checked or added to
    /// a dispatcher; the first handler is kept.
    #[must_use]
    pub fn method(mut self, method: HttpMethod, handler: MethodHandler) -> Self {
        if self.handlers.contains_key(&method) {
            self.duplicates.push(method);
        } else {
            self.handlers.insert(method, Arc::new(handler));
        }
        self
    }

    #[must_use]
    pub fn get(self, handler: MethodHandler) -> Self {
        self.method(HttpMethod::Get, handler)
    }

    #[must_use]
    pub fn put(self, handler: MethodHandler) -> Self {
        self.method(HttpMethod::Put, handler)
    }

    #[must_use]
    pub fn post(self, handler: MethodHandler) -> Self {
        self.method(HttpMethod::Post, handler)
    }

    #[must_use]
    pub fn delete(self, handler: MethodHandler) -> Self {
        self.method(HttpMethod::Delete, handler)
    }

    #[must_use]
    pub fn options(self, handler: MethodHandler) -> Self {
        self.method(HttpMethod::Options, handler)
    }

    #[must_use]
    pub fn head(self, handler: MethodHandler) -> Self {
        self.method(HttpMethod::Head, handler)
    }

    #[must_use]
    pub fn patch(self, handler: MethodHandler) -> Self {
        self.method(HttpMethod::Patch, handler)
    }

    #[must_use]
    pub fn trace(self, handler: MethodHandler) -> Self {
        self.method(HttpMethod::Trace, handler)
    }

    #[must_use]
    pub fn with_middleware<F>(mut self, f: F) -> Self
    where
        F: Fn(&ApiRequest, &Params) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.middleware = Some(Middleware::new(f));
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
    pub fn handler_for(&self, method: HttpMethod) -> Option<&MethodHandler> {
        self.handlers.get(&method).map(|h| h.as_ref())
    }

    /// Registered methods in alphabetical order.
    pub fn methods(&self) -> impl Iterator<Item = HttpMethod> + '_ {
        self.handlers.keys().copied()
    }

    pub fn handlers(&self) -> impl Iterator<Item = (HttpMethod, &MethodHandler)> + '_ {
        self.handlers.iter().map(|(m, h)| (*m, h.as_ref()))
    }

    /// Value of the `Allow` header: registered methods, sorted, comma-joined.
    #[must_use]
    pub fn allow_header(&self) -> String {
        self.methods()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Reject tables that registered a method more than once.
    pub fn check(&self, path: &str) -> Result<(), RouteError> {
        match self.duplicates.first() {
            Some(method) => Err(RouteError::DuplicateMethod {
                path: path.to_string(),
                method: *method,
            }),
            None => Ok(()),
        }
    }
}
