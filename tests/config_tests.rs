use restroute::config::{ApiConfigOverrides, ConfigChange, ConfigStore};
use restroute::{ApiRequest, Endpoint, MethodHandler};
use serde_json::json;
use std::io::Write;
use std::sync::Arc;

mod common;
mod tracing_util;
use common::{body_json, dev_dispatcher};
use tracing_util::TestTracing;

const INIT: &str = "restroute initialized";
const REINIT: &str = "re-initializing";
const NOT_EXPOSED: &str = "OpenAPI documentation is not exposed";

#[test]
fn test_initialization_is_logged_once() {
    let tracing = TestTracing::init();
    let store = ConfigStore::new();
    let overrides = ApiConfigOverrides::new().with_open_api_json_path("/openapi.json");

    assert_eq!(store.apply(overrides.clone()), ConfigChange::Initialized);
    assert_eq!(store.apply(overrides.clone()), ConfigChange::Unchanged);
    assert_eq!(store.apply(overrides), ConfigChange::Unchanged);

    assert_eq!(tracing.count(INIT), 1);
    assert_eq!(tracing.count(REINIT), 0);
    let event = tracing.find(INIT).unwrap();
    assert_eq!(event.field("open_api_json_path"), Some("/openapi.json"));
}

#[test]
fn test_changed_configuration_is_logged_once() {
    let tracing = TestTracing::init();
    let store = ConfigStore::new();
    store.apply(ApiConfigOverrides::new());

    let changed = ApiConfigOverrides::new().with_open_api_spec(json!({ "info": { "title": "v2" } }));
    assert_eq!(store.apply(changed.clone()), ConfigChange::Reinitialized);
    assert_eq!(store.apply(changed), ConfigChange::Unchanged);

    assert_eq!(tracing.count(INIT), 1);
    assert_eq!(tracing.count(REINIT), 1);
    assert_eq!(store.current().config().info()["title"], "v2");
}

#[test]
fn test_reserved_path_warning_resets_on_change() {
    let tracing = TestTracing::init();
    let store = Arc::new(ConfigStore::new());
    store.apply(ApiConfigOverrides::new().with_expose_open_api_spec(false));
    let dispatcher = dev_dispatcher(&store);

    for _ in 0..3 {
        let res = dispatcher.handle(&ApiRequest::new("GET", "/api"));
        assert_eq!(res.status, 404);
    }
    assert_eq!(tracing.count(NOT_EXPOSED), 1);

    dispatcher.handle(&ApiRequest::new("GET", "/api/openapi.json"));
    assert_eq!(tracing.count(NOT_EXPOSED), 2);

    store.apply(
        ApiConfigOverrides::new()
            .with_expose_open_api_spec(false)
            .with_open_api_spec(json!({ "info": { "title": "changed" } })),
    );
    dispatcher.handle(&ApiRequest::new("GET", "/api"));
    dispatcher.handle(&ApiRequest::new("GET", "/api"));
    assert_eq!(tracing.count(NOT_EXPOSED), 3);
}

#[test]
fn test_dispatcher_sees_latest_configuration() {
    let store = Arc::new(ConfigStore::new());
    let dispatcher = dev_dispatcher(&store);

    assert_eq!(dispatcher.handle(&ApiRequest::new("GET", "/docs")).status, 404);
    assert_eq!(dispatcher.handle(&ApiRequest::new("GET", "/api")).status, 200);

    store.apply(ApiConfigOverrides::new().with_swagger_ui_path("/docs"));
    assert_eq!(dispatcher.handle(&ApiRequest::new("GET", "/docs")).status, 200);
    assert_eq!(dispatcher.handle(&ApiRequest::new("GET", "/api")).status, 404);
}

#[test]
fn test_hidden_docs_leave_user_routes_reachable() {
    let store = Arc::new(ConfigStore::new());
    store.apply(ApiConfigOverrides::new().with_expose_open_api_spec(false));
    let mut dispatcher = dev_dispatcher(&store);
    dispatcher
        .route(
            "/api",
            Endpoint::new().get(MethodHandler::new(|ctx| {
                ctx.res.json(200, json!({ "root": true }));
                Ok(())
            })),
        )
        .unwrap();

    let res = dispatcher.handle(&ApiRequest::new("GET", "/api"));
    assert_eq!(res.status, 200);
    assert_eq!(body_json(&res), json!({ "root": true }));
}

#[test]
fn test_overrides_load_from_file() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(
        file,
        "openApiSpec:\n  info:\n    title: From file\n  servers:\n    - url: https://api.example.com\nswaggerUiPath: /docs\nexposeOpenApiSpec: true"
    )
    .unwrap();

    let overrides = ApiConfigOverrides::from_path(file.path()).unwrap();
    let store = Arc::new(ConfigStore::new());
    store.apply(overrides);
    let config = store.current();
    assert_eq!(config.config().swagger_ui_path, "/docs");
    assert_eq!(config.config().info()["title"], "From file");

    let dispatcher = dev_dispatcher(&store);
    let doc = dispatcher.openapi();
    assert_eq!(doc.to_json()["servers"][0]["url"], "https://api.example.com");
}

#[test]
fn test_missing_file_is_an_error() {
    let err = ApiConfigOverrides::from_path("/definitely/not/here.yaml").unwrap_err();
    assert!(err.to_string().contains("/definitely/not/here.yaml"));
}
