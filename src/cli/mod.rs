//! # CLI Module
//!
//! Commands for keeping a checked-in OpenAPI document in sync with the
//! registered routes.
//!
//! ## Commands
//!
//! ### `generate`
//!
//! ```bash
//! my-api generate --output public/openapi.yaml
//! ```
//!
//! Writes JSON unless the output ends in `.yaml`/`.yml`. Defaults to
//! `public/openapi.json`.
//!
//! ### `validate`
//!
//! ```bash
//! my-api validate --path public/openapi.json
//! ```
//!
//! Fails when the file differs from the document the routes would generate.
//!
//! ## Usage from Code
//!
//! ```rust,no_run
//! use clap::Parser;
//! use restroute::cli::{run_cli, Cli};
//! use restroute::config::ConfigStore;
//! use restroute::dispatcher::Dispatcher;
//! use std::sync::Arc;
//!
//! # fn main() -> anyhow::Result<()> {
//! let dispatcher = Dispatcher::new(Arc::new(ConfigStore::new()));
//! run_cli(Cli::parse(), &dispatcher)?;
//! # Ok(())
//! # }
//! ```

mod commands;


pub use commands::{run_cli, Cli, Commands, DEFAULT_OUTPUT};
