//! Request and response objects exchanged with the host HTTP server.
//!
//! restroute does not own a socket. The host parses the request, builds an
//! [`ApiRequest`], hands it to the dispatcher together with an [`ApiResponse`],
//! and writes the response back out.

pub mod request;
pub mod response;

pub use request::{media_type, parse_query_params, ApiRequest, HeaderVec, ParamVec};
pub use response::{write_json_error, ApiResponse, ResponseBody};
