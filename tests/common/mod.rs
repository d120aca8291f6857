#![allow(dead_code)]

use restroute::config::ConfigStore;
use restroute::runtime_config::RuntimeConfig;
use restroute::server::{ApiResponse, ResponseBody};
use restroute::Dispatcher;
use serde_json::Value;
use std::sync::Arc;

/// Dispatcher in development mode over `store`.
pub fn dev_dispatcher(store: &Arc<ConfigStore>) -> Dispatcher {
    Dispatcher::new(Arc::clone(store)).with_runtime(RuntimeConfig::development())
}

/// Dispatcher in production mode over `store`.
pub fn prod_dispatcher(store: &Arc<ConfigStore>) -> Dispatcher {
    Dispatcher::new(Arc::clone(store)).with_runtime(RuntimeConfig::production())
}

pub fn body_json(res: &ApiResponse) -> Value {
    match &res.body {
        ResponseBody::Json(v) => v.clone(),
        other => panic!("expected a JSON body, got {other:?}"),
    }
}

pub fn body_text(res: &ApiResponse) -> String {
    match &res.body {
        ResponseBody::Text(s) => s.clone(),
        other => panic!("expected a text body, got {other:?}"),
    }
}
