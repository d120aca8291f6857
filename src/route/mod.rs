//! Endpoint definitions and route paths.
//!
//! An [`Endpoint`] is the method-keyed table for one route; the dispatcher
//! pairs each endpoint with a [`RoutePattern`].
//!
//! ```rust
//! use restroute::route::{Endpoint, MethodHandler};
//! use serde_json::json;
//!
//! let todos = Endpoint::new()
//!     .get(MethodHandler::new(|ctx| {
//!         ctx.res.json(200, json!([{ "id": 1, "name": "milk" }]));
//!         Ok(())
//!     }))
//!     .with_middleware(|req, _params| Ok(json!({ "user": req.get_header("x-user") })));
//!
//! assert_eq!(todos.allow_header(), "GET");
//! ```

mod endpoint;
mod method;
mod pattern;

pub use endpoint::{
    Endpoint, ErrorHandler, HandlerContext, HandlerFn, InputSpec, MethodHandler, Middleware,
    OutputSpec, Params,
};
pub use method::{HttpMethod, UnknownMethod};
pub use pattern::RoutePattern;
