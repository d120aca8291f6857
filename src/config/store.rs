use arc_swap::ArcSwapOption;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::info;

use super::core::{ApiConfig, ApiConfigOverrides, ReservedPath};

/// Outcome of applying a candidate configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigChange {
    /// First configuration of this store
    Initialized,
    /// A different configuration replaced the stored one
    Reinitialized,
    /// Structurally identical to the stored configuration; nothing changed
    Unchanged,
}

/// Set-once flags guarding log lines that should appear once per configuration.
#[derive(Debug, Default)]
struct OneTimeFlags {
    open_api_json: AtomicBool,
    open_api_yaml: AtomicBool,
    swagger_ui: AtomicBool,
    docs_banner: AtomicBool,
}

impl OneTimeFlags {
    fn for_path(&self, reserved: ReservedPath) -> &AtomicBool {
        match reserved {
            ReservedPath::OpenApiJson => &self.open_api_json,
            ReservedPath::OpenApiYaml => &self.open_api_yaml,
            ReservedPath::SwaggerUi => &self.swagger_ui,
        }
    }
}

/// A committed configuration together with its one-time flags.
///
/// Replacing the configuration creates a new state, which is how the flags
/// reset.
#[derive(Debug)]
pub struct ConfigState {
    config: ApiConfig,
    generation: u64,
    flags: OneTimeFlags,
}

impl ConfigState {
    fn new(config: ApiConfig, generation: u64) -> Self {
        Self {
            config,
            generation,
            flags: OneTimeFlags::default(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Number of times the configuration has been committed (1 after the first apply).
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns `true` exactly once per configuration and reserved path.
    pub fn first_reserved_path_warning(&self, reserved: ReservedPath) -> bool {
        !self.flags.for_path(reserved).swap(true, Ordering::AcqRel)
    }

    /// Returns `true` exactly once per configuration.
    pub fn first_docs_banner(&self) -> bool {
        !self.flags.docs_banner.swap(true, Ordering::AcqRel)
    }
}

/// Holder of the process-wide configuration.
///
/// Owned by the application's startup code and shared (`Arc<ConfigStore>`)
/// with every dispatcher. Reads are lock-free and always observe the latest
/// committed configuration; writes are serialized.
#[derive(Debug, Default)]
pub struct ConfigStore {
    state: ArcSwapOption<ConfigState>,
    write_lock: Mutex<()>,
}

impl ConfigStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `candidate` over the defaults and commit it if it differs from
    /// the stored configuration.
    ///
    /// Hooks compare by identity, so re-applying a configuration built from
    /// the same hook handles is [`ConfigChange::Unchanged`].
    pub fn apply(&self, candidate: ApiConfigOverrides) -> ConfigChange {
        self.commit(ApiConfig::from_overrides(candidate), false).1
    }

    /// Commit `candidate` unconditionally, resetting one-time flags.
    pub fn reconfigure(&self, candidate: ApiConfigOverrides) -> ConfigChange {
        self.commit(ApiConfig::from_overrides(candidate), true).1
    }

    /// Latest committed state; applies the defaults if nothing was committed yet.
    pub fn current(&self) -> Arc<ConfigState> {
        if let Some(state) = self.state.load_full() {
            return state;
        }
        self.commit(ApiConfig::default(), false).0
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state.load().is_some()
    }

    fn commit(&self, config: ApiConfig, force: bool) -> (Arc<ConfigState>, ConfigChange) {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let previous = self.state.load_full();
        let change = match &previous {
            None => ConfigChange::Initialized,
            Some(state) if !force && state.config == config => {
                return (Arc::clone(state), ConfigChange::Unchanged);
            }
            Some(_) => ConfigChange::Reinitialized,
        };

        let generation = previous.as_ref().map_or(0, |s| s.generation) + 1;
        let state = Arc::new(ConfigState::new(config, generation));
        self.state.store(Some(Arc::clone(&state)));

        let config = state.config();
        match change {
            ConfigChange::Initialized => info!(
                open_api_json_path = %config.open_api_json_path,
                open_api_yaml_path = %config.open_api_yaml_path,
                swagger_ui_path = %config.swagger_ui_path,
                expose_open_api_spec = config.expose_open_api_spec,
                "restroute initialized"
            ),
            _ => info!(
                generation,
                open_api_json_path = %config.open_api_json_path,
                open_api_yaml_path = %config.open_api_yaml_path,
                swagger_ui_path = %config.swagger_ui_path,
                expose_open_api_spec = config.expose_open_api_spec,
                "restroute configuration changed, re-initializing"
            ),
        }

        (state, change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_apply_initializes() {
        let store = ConfigStore::new();
        assert!(!store.is_initialized());
        assert_eq!(store.apply(ApiConfigOverrides::new()), ConfigChange::Initialized);
        assert!(store.is_initialized());
        assert_eq!(store.current().generation(), 1);
    }

    #[test]
    fn test_identical_apply_is_unchanged() {
        let store = ConfigStore::new();
        let overrides = ApiConfigOverrides::new()
            .with_swagger_ui_path("/docs")
            .with_error_handler(|_, res, _| res.send(500));
        assert_eq!(store.apply(overrides.clone()), ConfigChange::Initialized);
        assert_eq!(store.apply(overrides), ConfigChange::Unchanged);
        assert_eq!(store.current().generation(), 1);
    }

    #[test]
    fn test_different_apply_reinitializes_and_resets_flags() {
        let store = ConfigStore::new();
        store.apply(ApiConfigOverrides::new());
        let before = store.current();
        assert!(before.first_reserved_path_warning(ReservedPath::SwaggerUi));
        assert!(!before.first_reserved_path_warning(ReservedPath::SwaggerUi));
        assert!(before.first_docs_banner());

        let change = store.apply(ApiConfigOverrides::new().with_expose_open_api_spec(false));
        assert_eq!(change, ConfigChange::Reinitialized);

        let after = store.current();
        assert_eq!(after.generation(), 2);
        assert!(after.first_reserved_path_warning(ReservedPath::SwaggerUi));
        assert!(after.first_docs_banner());
    }

    #[test]
    fn test_fresh_hook_counts_as_change() {
        let store = ConfigStore::new();
        store.apply(ApiConfigOverrides::new().with_middleware(|_, _| Ok(serde_json::Value::Null)));
        let change =
            store.apply(ApiConfigOverrides::new().with_middleware(|_, _| Ok(serde_json::Value::Null)));
        assert_eq!(change, ConfigChange::Reinitialized);
    }

    #[test]
    fn test_reconfigure_always_replaces() {
        let store = ConfigStore::new();
        assert_eq!(store.reconfigure(ApiConfigOverrides::new()), ConfigChange::Initialized);
        assert_eq!(store.reconfigure(ApiConfigOverrides::new()), ConfigChange::Reinitialized);
        assert_eq!(store.current().generation(), 2);
    }

    #[test]
    fn test_current_applies_defaults_lazily() {
        let store = ConfigStore::new();
        let state = store.current();
        assert_eq!(state.config(), &ApiConfig::default());
        assert_eq!(store.apply(ApiConfigOverrides::new()), ConfigChange::Unchanged);
    }

    #[test]
    fn test_flags_are_independent_per_path() {
        let store = ConfigStore::new();
        let state = store.current();
        assert!(state.first_reserved_path_warning(ReservedPath::OpenApiJson));
        assert!(state.first_reserved_path_warning(ReservedPath::OpenApiYaml));
        assert!(!state.first_reserved_path_warning(ReservedPath::OpenApiJson));
    }
}
