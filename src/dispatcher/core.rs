use serde_json::Value;
use std::borrow::Cow;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Span};

use super::pipeline::{self, Globals};
use crate::config::{ConfigState, ConfigStore, ReservedPath};
use crate::docs::{base_url, render_swagger_ui};
use crate::error::{DocsError, Error, RouteError};
use crate::ids::{RequestId, REQUEST_ID_HEADER};
use crate::messages::{DEFAULT_TITLE, METHOD_NOT_ALLOWED, NOT_FOUND, UNEXPECTED_ERROR};
use crate::openapi::{build_spec, OpenApiDocument};
use crate::route::{Endpoint, HttpMethod, RoutePattern};
use crate::runtime_config::RuntimeConfig;
use crate::server::{write_json_error, ApiRequest, ApiResponse, ParamVec, ResponseBody};

#[derive(Debug)]
struct Route {
    pattern: RoutePattern,
    endpoint: Endpoint,
}

/// Path table plus the documentation routes.
///
/// Routes are matched static-first, then in registration order. The
/// configuration is read from the shared [`ConfigStore`] on every request.
#[derive(Debug)]
pub struct Dispatcher {
    store: Arc<ConfigStore>,
    routes: Vec<Route>,
    runtime: RuntimeConfig,
}

impl Dispatcher {
    /// Create a dispatcher reading `RESTROUTE_ENV` for the runtime mode.
    #[must_use]
    pub fn new(store: Arc<ConfigStore>) -> Self {
        Self {
            store,
            routes: Vec::new(),
            runtime: RuntimeConfig::from_env(),
        }
    }

    #[must_use]
    pub fn with_runtime(mut self, runtime: RuntimeConfig) -> Self {
        self.runtime = runtime;
        self
    }

    #[must_use]
    pub fn runtime(&self) -> RuntimeConfig {
        self.runtime
    }

    #[must_use]
    pub fn store(&self) -> &Arc<ConfigStore> {
        &self.store
    }

    /// Register `endpoint` under `path` (`/api/todos`, `/api/todos/[id]`, ...).
    pub fn route(&mut self, path: &str, endpoint: Endpoint) -> Result<&mut Self, RouteError> {
        let pattern = RoutePattern::parse(path)?;
        endpoint.check(path)?;
        if self.routes.iter().any(|r| r.pattern.is_equivalent(&pattern)) {
            return Err(RouteError::DuplicateRoute {
                path: path.to_string(),
            });
        }

        debug!(path = %pattern.as_str(), methods = %endpoint.allow_header(), "Route registered");
        self.routes.push(Route { pattern, endpoint });
        Ok(self)
    }

    /// Registered routes in registration order.
    pub fn routes(&self) -> impl Iterator<Item = (&RoutePattern, &Endpoint)> + '_ {
        self.routes.iter().map(|r| (&r.pattern, &r.endpoint))
    }

    /// OpenAPI document for the current configuration and routes.
    pub fn openapi(&self) -> OpenApiDocument {
        build_spec(self.store.current().config(), self.routes())
    }

    /// Dispatch a request and return the written response.
    pub fn handle(&self, req: &ApiRequest) -> ApiResponse {
        let mut res = ApiResponse::new();
        self.dispatch(req, &mut res);
        res
    }

    /// Dispatch an `http::Request`, answering undecodable bodies with 400.
    pub fn handle_http<B: AsRef<[u8]>>(
        &self,
        req: http::Request<B>,
    ) -> Result<http::Response<Vec<u8>>, Error> {
        let res = match ApiRequest::from_http(req) {
            Ok(req) => self.handle(&req),
            Err(err) => {
                debug!(error = %err, "Rejected undecodable request body");
                let mut res = ApiResponse::new();
                write_json_error(&mut res, 400, vec![err.to_string()]);
                res
            }
        };
        Ok(res.into_http()?)
    }

    /// Catch-all dispatch: documentation paths first, then the path table.
    pub fn dispatch(&self, req: &ApiRequest, res: &mut ApiResponse) {
        let span = request_span(req);
        let _entered = span.enter();

        let state = self.store.current();
        let config = state.config();
        let matched = self.match_route(&req.path);

        if let Some(reserved) = config.reserved_path(&req.path) {
            if config.expose_open_api_spec {
                if matched.is_some() && state.first_reserved_path_warning(reserved) {
                    warn!(
                        path = %req.path,
                        reserved_path = %reserved,
                        "Route is shadowed by a documentation path; rename the route or move the documentation path"
                    );
                }
                self.serve_docs(reserved, &state, req, res);
                return;
            }
            if matched.is_none() {
                if state.first_reserved_path_warning(reserved) {
                    warn!(
                        path = %req.path,
                        reserved_path = %reserved,
                        "OpenAPI documentation is not exposed; set exposeOpenApiSpec to serve it"
                    );
                }
                write_json_error(res, 404, NOT_FOUND);
                return;
            }
        }

        let Some((route, params)) = matched else {
            debug!("No route matched");
            write_json_error(res, 404, NOT_FOUND);
            return;
        };

        let req = if params.is_empty() {
            Cow::Borrowed(req)
        } else {
            let mut owned = req.clone();
            owned.path_params = params;
            Cow::Owned(owned)
        };
        pipeline::dispatch(
            &req,
            res,
            &route.endpoint,
            Globals::from(config),
            self.runtime,
        );
    }

    /// Per-route dispatch of a single endpoint table with the configured
    /// global hooks. No path matching and no documentation routes.
    pub fn dispatch_endpoint(&self, endpoint: &Endpoint, req: &ApiRequest, res: &mut ApiResponse) {
        let span = request_span(req);
        let _entered = span.enter();
        let state = self.store.current();
        pipeline::dispatch(req, res, endpoint, Globals::from(state.config()), self.runtime);
    }

    fn match_route(&self, path: &str) -> Option<(&Route, ParamVec)> {
        let statics = self.routes.iter().filter(|r| r.pattern.is_static());
        let dynamics = self.routes.iter().filter(|r| !r.pattern.is_static());
        statics
            .chain(dynamics)
            .find_map(|r| r.pattern.matches(path).map(|params| (r, params)))
    }

    fn serve_docs(
        &self,
        reserved: ReservedPath,
        state: &ConfigState,
        req: &ApiRequest,
        res: &mut ApiResponse,
    ) {
        let head = match HttpMethod::parse(&req.method) {
            Some(HttpMethod::Get) => false,
            Some(HttpMethod::Head) => true,
            _ => {
                res.set_header("allow", "GET, HEAD");
                write_json_error(res, 405, METHOD_NOT_ALLOWED);
                return;
            }
        };

        let config = state.config();
        let base = base_url(req);
        if state.first_docs_banner() {
            info!(
                swagger_ui = %format!("{base}{}", config.swagger_ui_path),
                openapi_json = %format!("{base}{}", config.open_api_json_path),
                openapi_yaml = %format!("{base}{}", config.open_api_yaml_path),
                "API documentation available"
            );
        }

        let doc = build_spec(config, self.routes());
        let served: Result<(), DocsError> = match reserved {
            ReservedPath::OpenApiJson => {
                res.json(200, doc.into_json());
                Ok(())
            }
            ReservedPath::OpenApiYaml => doc
                .to_yaml()
                .map(|yaml| res.text(200, "text/yaml", yaml))
                .map_err(DocsError::from),
            ReservedPath::SwaggerUi => {
                let title = config
                    .info()
                    .get("title")
                    .and_then(Value::as_str)
                    .unwrap_or(DEFAULT_TITLE);
                render_swagger_ui(&base, &config.open_api_json_path, title)
                    .map(|html| res.text(200, "text/html; charset=utf-8", html))
            }
        };

        match served {
            Ok(()) if head => res.body = ResponseBody::Empty,
            Ok(()) => {}
            Err(err) => {
                error!(error = %err, reserved_path = %reserved, "Failed to serve documentation");
                write_json_error(res, 500, UNEXPECTED_ERROR);
            }
        }
    }
}

fn request_span(req: &ApiRequest) -> Span {
    let request_id = RequestId::from_header_or_new(req.get_header(REQUEST_ID_HEADER));
    info_span!(
        "request",
        request_id = %request_id,
        method = %req.method,
        path = %req.path
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::MethodHandler;

    fn ok() -> MethodHandler {
        MethodHandler::new(|ctx| {
            let id = ctx.req.get_path_param("id").unwrap_or("list").to_string();
            ctx.res.json(200, serde_json::json!({ "id": id }));
            Ok(())
        })
    }

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(Arc::new(ConfigStore::new())).with_runtime(RuntimeConfig::development())
    }

    #[test]
    fn test_duplicate_route_is_rejected() {
        let mut d = dispatcher();
        d.route("/api/todos", Endpoint::new().get(ok())).unwrap();
        let err = d.route("/api/todos", Endpoint::new().post(ok())).unwrap_err();
        assert!(matches!(err, RouteError::DuplicateRoute { .. }));
    }

    #[test]
    fn test_equivalent_route_is_rejected() {
        let mut d = dispatcher();
        d.route("/api/todos/[id]", Endpoint::new().get(ok())).unwrap();
        for path in ["/api/todos/{id}", "/api/todos/[slug]"] {
            let err = d.route(path, Endpoint::new().post(ok())).unwrap_err();
            assert!(matches!(err, RouteError::DuplicateRoute { .. }), "{path}");
        }
        assert_eq!(d.routes().count(), 1);

        let res = d.handle(&ApiRequest::new("GET", "/api/todos/1"));
        assert_eq!(res.body_value().unwrap()["id"], "1");
    }

    #[test]
    fn test_static_routes_win_over_dynamic() {
        let mut d = dispatcher();
        d.route("/api/todos/[id]", Endpoint::new().get(ok()))
            .unwrap()
            .route(
                "/api/todos/count",
                Endpoint::new().get(MethodHandler::new(|ctx| {
                    ctx.res.json(200, serde_json::json!({ "count": 2 }));
                    Ok(())
                })),
            )
            .unwrap();

        let res = d.handle(&ApiRequest::new("GET", "/api/todos/count"));
        assert_eq!(res.body_value().unwrap()["count"], 2);
        let res = d.handle(&ApiRequest::new("GET", "/api/todos/7"));
        assert_eq!(res.body_value().unwrap()["id"], "7");
    }

    #[test]
    fn test_docs_reject_non_get() {
        let d = dispatcher();
        let res = d.handle(&ApiRequest::new("POST", "/api/openapi.json"));
        assert_eq!(res.status, 405);
        assert_eq!(res.get_header("allow"), Some("GET, HEAD"));
    }

    #[test]
    fn test_handle_http_round_trip() {
        let mut d = dispatcher();
        d.route("/api/todos", Endpoint::new().get(ok())).unwrap();
        let req = http::Request::builder()
            .method("GET")
            .uri("/api/todos")
            .body(Vec::new())
            .unwrap();
        let res = d.handle_http(req).unwrap();
        assert_eq!(res.status(), 200);
        assert_eq!(res.headers()["content-type"], "application/json");
    }
}
