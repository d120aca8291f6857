//! # Runtime Configuration Module
//!
//! Environment variable-based configuration for restroute's runtime behavior.
//!
//! ## Environment Variables
//!
//! ### `RESTROUTE_ENV`
//!
//! Selects the build environment. `production` (or `prod`) switches the
//! dispatcher into production mode; any other value, or no value, means
//! development.
//!
//! Production mode only affects server-side behavior:
//! - unexpected handler errors are logged as a short notice instead of the full error chain
//! - response bodies are no longer checked against declared output schemas
//!
//! Response bodies sent to callers are identical in both modes.
//!
//! ## Usage
//!
//! ```rust
//! use restroute::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! println!("production: {}", config.is_production());
//! ```

use std::env;
use std::fmt;

/// Name of the environment variable selecting the build environment.
pub const ENV_VAR: &str = "RESTROUTE_ENV";

/// Build environment the dispatcher runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Runtime configuration loaded from environment variables.
///
/// Load this at startup using [`RuntimeConfig::from_env()`] and hand it to the
/// dispatcher, or build one directly in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RuntimeConfig {
    /// Development or production
    pub environment: Environment,
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let environment = match env::var(ENV_VAR) {
            Ok(val) => Environment::parse(&val),
            Err(_) => Environment::Development,
        };
        RuntimeConfig { environment }
    }

    pub fn production() -> Self {
        RuntimeConfig {
            environment: Environment::Production,
        }
    }

    pub fn development() -> Self {
        RuntimeConfig {
            environment: Environment::Development,
        }
    }

    #[must_use]
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parse() {
        assert_eq!(Environment::parse("production"), Environment::Production);
        assert_eq!(Environment::parse(" PROD "), Environment::Production);
        assert_eq!(Environment::parse("development"), Environment::Development);
        assert_eq!(Environment::parse("staging"), Environment::Development);
        assert_eq!(Environment::parse(""), Environment::Development);
    }

    #[test]
    fn test_constructors() {
        assert!(RuntimeConfig::production().is_production());
        assert!(!RuntimeConfig::development().is_production());
        assert!(!RuntimeConfig::default().is_production());
    }
}
