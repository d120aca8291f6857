use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::dispatcher::Dispatcher;
use crate::openapi::OpenApiDocument;

/// Default location of the generated document.
pub const DEFAULT_OUTPUT: &str = "public/openapi.json";

/// Command-line interface for restroute
///
/// Runs against a populated [`Dispatcher`]; applications embed it in their
/// own binary after registering their routes.
#[derive(Debug, Parser)]
#[command(name = "restroute")]
#[command(about = "Generate and validate the OpenAPI document of a restroute API", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Write the OpenAPI document (JSON or YAML, chosen by file extension)
    Generate {
        /// Output file
        #[arg(short, long, default_value = DEFAULT_OUTPUT)]
        output: PathBuf,
    },
    /// Check that a document on disk matches the routes
    Validate {
        /// Document to check
        #[arg(short, long, default_value = DEFAULT_OUTPUT)]
        path: PathBuf,
    },
}

/// Execute `cli` against `dispatcher`.
pub fn run_cli(cli: Cli, dispatcher: &Dispatcher) -> anyhow::Result<()> {
    let doc = dispatcher.openapi();
    match cli.command {
        Commands::Generate { output } => {
            let rendered = render(&doc, &output)?;
            if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            fs::write(&output, rendered)
                .with_context(|| format!("failed to write {}", output.display()))?;
            info!(path = %output.display(), "OpenAPI document generated");
            Ok(())
        }
        Commands::Validate { path } => {
            let source = fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let on_disk: Value = if is_yaml(&path) {
                serde_yaml::from_str(&source)
                    .with_context(|| format!("{} is not valid YAML", path.display()))?
            } else {
                serde_json::from_str(&source)
                    .with_context(|| format!("{} is not valid JSON", path.display()))?
            };
            if &on_disk != doc.to_json() {
                bail!(
                    "{} is out of date with the registered routes; run `generate` to update it",
                    path.display()
                );
            }
            info!(path = %path.display(), "OpenAPI document is up to date");
            Ok(())
        }
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    )
}

fn render(doc: &OpenApiDocument, path: &Path) -> anyhow::Result<String> {
    if is_yaml(path) {
        Ok(doc.to_yaml()?)
    } else {
        let mut json = doc.to_json_string()?;
        json.push('\n');
        Ok(json)
    }
}
