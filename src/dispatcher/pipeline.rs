use anyhow::anyhow;
use serde_json::Value;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;
use tracing::{debug, error, warn};

use crate::config::ApiConfig;
use crate::messages::{INVALID_MEDIA_TYPE, METHOD_NOT_ALLOWED, UNEXPECTED_ERROR};
use crate::route::{
    Endpoint, ErrorHandler, HandlerContext, HttpMethod, InputSpec, MethodHandler, Middleware,
    Params,
};
use crate::runtime_config::RuntimeConfig;
use crate::server::{write_json_error, ApiRequest, ApiResponse};
use crate::validator::ValidationFailure;

/// Global hooks taken from the configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct Globals<'a> {
    pub middleware: Option<&'a Middleware>,
    pub error_handler: Option<&'a ErrorHandler>,
}

impl<'a> From<&'a ApiConfig> for Globals<'a> {
    fn from(config: &'a ApiConfig) -> Self {
        Self {
            middleware: config.middleware.as_ref(),
            error_handler: config.error_handler.as_ref(),
        }
    }
}

enum Outcome {
    Handled,
    Rejected,
}

enum Rejection {
    MediaType,
    Invalid(ValidationFailure),
}

/// Dispatch `req` against a single endpoint table, writing into `res`.
///
/// Routing, media-type and validation failures are answered with fixed JSON
/// bodies. Errors and panics from middleware or the handler go to exactly one
/// error handler: method, then endpoint, then global, then the default.
pub fn dispatch(
    req: &ApiRequest,
    res: &mut ApiResponse,
    endpoint: &Endpoint,
    globals: Globals<'_>,
    runtime: RuntimeConfig,
) {
    let Some((method, handler)) = HttpMethod::parse(&req.method)
        .and_then(|m| endpoint.handler_for(m).map(|h| (m, h)))
    else {
        debug!(method = %req.method, allow = %endpoint.allow_header(), "Method not allowed");
        res.set_header("allow", endpoint.allow_header());
        write_json_error(res, 405, METHOD_NOT_ALLOWED);
        return;
    };

    let started = Instant::now();
    match guarded(|| run_method(req, res, endpoint, handler, globals)) {
        Ok(Outcome::Handled) => {
            if !res.is_sent() {
                debug!(method = %method, "Handler returned without writing a response");
            }
            if !runtime.is_production() {
                check_output(handler, res);
            }
        }
        Ok(Outcome::Rejected) => {}
        Err(err) => handle_error(req, res, &err, handler, endpoint, globals, runtime),
    }

    debug!(
        method = %method,
        status = res.status,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Request handled"
    );
}

fn run_method(
    req: &ApiRequest,
    res: &mut ApiResponse,
    endpoint: &Endpoint,
    handler: &MethodHandler,
    globals: Globals<'_>,
) -> anyhow::Result<Outcome> {
    let params = run_middleware(
        req,
        [
            globals.middleware,
            endpoint.middleware.as_ref(),
            handler.middleware.as_ref(),
        ],
    )?;

    let body = match &handler.input {
        None => None,
        Some(input) => match check_input(req, input) {
            Ok(value) => Some(value),
            Err(Rejection::MediaType) => {
                debug!(
                    expected = %input.content_type,
                    received = req.content_type().unwrap_or(""),
                    "Invalid media type"
                );
                write_json_error(res, 415, INVALID_MEDIA_TYPE);
                return Ok(Outcome::Rejected);
            }
            Err(Rejection::Invalid(failure)) => {
                debug!(
                    library = input.schema.library(),
                    errors = ?failure.messages,
                    "Request body failed validation"
                );
                write_json_error(res, 400, failure.messages);
                return Ok(Outcome::Rejected);
            }
        },
    };

    handler.handler().call(HandlerContext {
        req,
        res,
        params: &params,
        body: body.as_ref(),
    })?;
    Ok(Outcome::Handled)
}

/// Run the middleware chain left to right, merging each returned object into
/// the accumulated params.
fn run_middleware<'a>(
    req: &ApiRequest,
    chain: impl IntoIterator<Item = Option<&'a Middleware>>,
) -> anyhow::Result<Params> {
    let mut params = Params::new();
    for middleware in chain.into_iter().flatten() {
        match middleware.call(req, &params)? {
            Value::Object(fields) => params.extend(fields),
            Value::Null => {}
            other => {
                return Err(anyhow!(
                    "middleware must return a JSON object or null, got {other}"
                ))
            }
        }
    }
    Ok(params)
}

fn check_input(req: &ApiRequest, input: &InputSpec) -> Result<Value, Rejection> {
    if req.content_type() != Some(input.content_type.as_str()) {
        return Err(Rejection::MediaType);
    }
    let body = req.body.clone().unwrap_or(Value::Null);
    input.schema.validate(&body).map_err(Rejection::Invalid)
}

fn check_output(handler: &MethodHandler, res: &ApiResponse) {
    let Some(media) = res.media_type() else {
        return;
    };
    let Some(output) = handler.output_for(res.status, media) else {
        return;
    };
    let Some(body) = res.body_value() else {
        return;
    };
    if let Err(failure) = output.schema.validate(&body) {
        warn!(
            status = res.status,
            content_type = %output.content_type,
            library = output.schema.library(),
            errors = ?failure.messages,
            "Response body does not match the declared output schema"
        );
    }
}

#[allow(clippy::too_many_arguments)]
fn handle_error(
    req: &ApiRequest,
    res: &mut ApiResponse,
    err: &anyhow::Error,
    handler: &MethodHandler,
    endpoint: &Endpoint,
    globals: Globals<'_>,
    runtime: RuntimeConfig,
) {
    let chosen = handler
        .error_handler
        .as_ref()
        .or(endpoint.error_handler.as_ref())
        .or(globals.error_handler);

    if let Some(error_handler) = chosen {
        match guarded(|| {
            error_handler.call(req, res, err);
            Ok(())
        }) {
            Ok(()) => return,
            Err(panicked) => error!(error = %panicked, "Error handler panicked"),
        }
    }
    default_error_handler(res, err, runtime);
}

fn default_error_handler(res: &mut ApiResponse, err: &anyhow::Error, runtime: RuntimeConfig) {
    if runtime.is_production() {
        error!("An unexpected error occurred while handling the request");
    } else {
        error!(error = ?err, "Unexpected error while handling the request");
    }
    *res = ApiResponse::new();
    write_json_error(res, 500, UNEXPECTED_ERROR);
}

/// Run `f`, turning a panic into an error.
fn guarded<T>(f: impl FnOnce() -> anyhow::Result<T>) -> anyhow::Result<T> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(anyhow!("panicked: {}", panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
