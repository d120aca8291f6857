//! # Dispatcher Module
//!
//! Runs one request through an endpoint table and writes the response.
//!
//! ## Request Flow
//!
//! 1. The request id is taken from `x-request-id` (or generated) and attached
//!    to a `tracing` span for the whole request
//! 2. Documentation paths are served when exposed
//! 3. The path is matched against the registered routes (static routes first);
//!    dynamic segments become path parameters
//! 4. The method is looked up in the endpoint table; unknown methods get 405
//!    with an `Allow` header
//! 5. Global, endpoint and method middleware run in that order, each merging
//!    its returned object into the handler params
//! 6. A declared input checks the content type (415) and validates the body (400)
//! 7. The handler writes its own response
//! 8. Outside production, a declared output for the written status and media
//!    type is checked and mismatches are logged
//!
//! ## Error Handling
//!
//! Errors returned by middleware or handlers and panics raised in them are
//! caught. The most specific error handler runs (method, endpoint, global);
//! without one, the error is logged and a 500 with a generic message is sent.
//! Framework rejections (404, 405, 415, 400) never reach error handlers.
//!
//! ```rust
//! use restroute::config::ConfigStore;
//! use restroute::dispatcher::Dispatcher;
//! use restroute::route::{Endpoint, MethodHandler};
//! use restroute::server::ApiRequest;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let mut dispatcher = Dispatcher::new(Arc::new(ConfigStore::new()));
//! dispatcher
//!     .route(
//!         "/api/todos/[id]",
//!         Endpoint::new().get(MethodHandler::new(|ctx| {
//!             let id = ctx.req.get_path_param("id").unwrap_or_default().to_string();
//!             ctx.res.json(200, json!({ "id": id }));
//!             Ok(())
//!         })),
//!     )
//!     .unwrap();
//!
//! let res = dispatcher.handle(&ApiRequest::new("GET", "/api/todos/42"));
//! assert_eq!(res.status, 200);
//!
//! let res = dispatcher.handle(&ApiRequest::new("DELETE", "/api/todos/42"));
//! assert_eq!(res.status, 405);
//! assert_eq!(res.get_header("allow"), Some("GET"));
//! ```

mod core;
mod pipeline;

pub use self::core::Dispatcher;
pub use self::pipeline::{dispatch, Globals};
