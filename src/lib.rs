//! # restroute
//!
//! **restroute** turns per-route endpoint tables into a complete API layer:
//! method dispatch, a middleware chain, request body validation, layered error
//! handling, and a generated OpenAPI 3.0 document with a Swagger UI page.
//!
//! ## Overview
//!
//! An application describes each route as an [`Endpoint`]: one
//! [`MethodHandler`] per HTTP method, each with an optional input schema,
//! declared outputs, middleware and an error handler. The [`Dispatcher`] owns
//! the route table and reads its configuration from a shared [`ConfigStore`].
//! The host HTTP server converts its request into an [`ApiRequest`], calls
//! [`Dispatcher::dispatch`], and writes the resulting [`ApiResponse`] back out.
//!
//! ## Architecture
//!
//! - **[`config`]** - Configuration merged over defaults, and the store holding it
//! - **[`route`]** - Endpoint tables, method handlers, hooks and route patterns
//! - **[`validator`]** - Schema validator backends (`jsonschema`, `validator`)
//! - **[`dispatcher`]** - The request pipeline and the path table
//! - **[`openapi`]** - OpenAPI document generation from the endpoint tables
//! - **[`docs`]** - Swagger UI page rendering
//! - **[`server`]** - Request/response objects exchanged with the host server
//! - **[`cli`]** - `generate` / `validate` commands for a checked-in document
//! - **[`logging`]** - `tracing` subscriber setup
//!
//! ### Request Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Host as Host server
//!     participant Dispatcher
//!     participant Store as ConfigStore
//!     participant MW as Middleware chain
//!     participant Val as SchemaValidator
//!     participant Handler
//!
//!     Host->>Dispatcher: dispatch(&request, &mut response)
//!     Dispatcher->>Store: current()
//!     alt documentation path
//!         Dispatcher-->>Host: OpenAPI JSON / YAML / Swagger UI
//!     end
//!     alt no route or method
//!         Dispatcher-->>Host: 404 / 405 + Allow
//!     end
//!     Dispatcher->>MW: global → endpoint → method
//!     MW-->>Dispatcher: merged params
//!     Dispatcher->>Val: validate(body)
//!     alt content type mismatch / invalid body
//!         Dispatcher-->>Host: 415 / 400
//!     end
//!     Dispatcher->>Handler: HandlerContext { req, res, params, body }
//!     alt error or panic
//!         Dispatcher->>Dispatcher: method > endpoint > global > default error handler
//!     end
//!     Dispatcher-->>Host: response as written
//! ```
//!
//! ## Example
//!
//! ```rust
//! use restroute::{ApiConfigOverrides, ApiRequest, ConfigStore, Dispatcher, Endpoint, JsonSchema, MethodHandler};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), restroute::Error> {
//! let store = Arc::new(ConfigStore::new());
//! store.apply(ApiConfigOverrides::new().with_open_api_spec(json!({
//!     "info": { "title": "Todo API" }
//! })));
//!
//! let todo = JsonSchema::shared(json!({
//!     "type": "object",
//!     "properties": { "name": { "type": "string" } },
//!     "required": ["name"]
//! }))?;
//!
//! let mut dispatcher = Dispatcher::new(store);
//! dispatcher.route(
//!     "/api/todos",
//!     Endpoint::new().post(
//!         MethodHandler::new(|ctx| {
//!             ctx.res.json(201, ctx.body.cloned().unwrap_or_default());
//!             Ok(())
//!         })
//!         .with_input("application/json", Arc::clone(&todo))
//!         .with_output(201, "application/json", todo),
//!     ),
//! )?;
//!
//! let res = dispatcher.handle(&ApiRequest::new("POST", "/api/todos").with_json(json!({ "name": "milk" })));
//! assert_eq!(res.status, 201);
//!
//! let res = dispatcher.handle(&ApiRequest::new("POST", "/api/todos").with_json(json!({})));
//! assert_eq!(res.status, 400);
//!
//! let spec = dispatcher.openapi();
//! assert_eq!(spec.to_json()["info"]["title"], "Todo API");
//! # Ok(())
//! # }
//! ```
//!
//! ## Runtime Mode
//!
//! `RESTROUTE_ENV=production` suppresses error details in logs and disables
//! the diagnostic output-schema check. See [`runtime_config`].

pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod docs;
pub mod error;
pub mod ids;
pub mod logging;
pub mod messages;
pub mod openapi;
pub mod route;
pub mod runtime_config;
pub mod server;
pub mod validator;

pub use config::{ApiConfig, ApiConfigOverrides, ConfigChange, ConfigStore};
pub use dispatcher::Dispatcher;
pub use error::Error;
pub use openapi::{build_spec, OpenApiDocument};
pub use route::{Endpoint, HandlerContext, HttpMethod, MethodHandler, Params};
pub use server::{ApiRequest, ApiResponse};
pub use validator::{JsonSchema, Schema, SchemaValidator, TypedSchema, ValidationFailure};
