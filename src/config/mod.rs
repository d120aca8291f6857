//! # Configuration Module
//!
//! Configuration describes where the OpenAPI document and the Swagger UI are
//! served, whether they are served at all, the base OpenAPI metadata, and the
//! global middleware and error handler.
//!
//! ## Lifecycle
//!
//! 1. The application builds an [`ApiConfigOverrides`] (in code, or loaded
//!    from a YAML/JSON file) and applies it to a [`ConfigStore`] at startup.
//! 2. The store merges it over the defaults and logs an initialization banner.
//! 3. Every dispatched request reads the latest committed [`ConfigState`].
//! 4. Applying a structurally identical candidate again is a no-op; a different
//!    candidate replaces the state, resets the one-time warning flags and logs a
//!    re-initialization banner. [`ConfigStore::reconfigure`] replaces
//!    unconditionally.
//!
//! ```rust
//! use restroute::config::{ApiConfigOverrides, ConfigChange, ConfigStore};
//! use serde_json::json;
//!
//! let store = ConfigStore::new();
//! let overrides = ApiConfigOverrides::new()
//!     .with_open_api_spec(json!({ "info": { "title": "Todo API" } }))
//!     .with_swagger_ui_path("/docs");
//!
//! assert_eq!(store.apply(overrides.clone()), ConfigChange::Initialized);
//! assert_eq!(store.apply(overrides), ConfigChange::Unchanged);
//! assert_eq!(store.current().config().swagger_ui_path, "/docs");
//! ```

mod core;
mod store;

pub use self::core::{deep_merge, ApiConfig, ApiConfigOverrides, ReservedPath};
pub use self::store::{ConfigChange, ConfigState, ConfigStore};
