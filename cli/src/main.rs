//! reweave command-line harness.
//!
//! Logs go to stderr; stdout carries only the JSON or text result.

mod commands;
mod loader;

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use reweave_config::ReweaveConfig;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file to use instead of ~/.reweave/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the workspace edit that turns BEFORE into AFTER
    Diff(commands::DiffArgs),
    /// Assemble a JSON manifest of rewrites into one workspace edit
    Batch(commands::BatchArgs),
    /// Apply a workspace edit to a document and print the result
    Apply(commands::ApplyArgs),
}

fn init_tracing(config_filter: Option<&str>) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config_filter.unwrap_or("info")))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<ReweaveConfig> {
    match path {
        Some(path) => ReweaveConfig::load_from(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(ReweaveConfig::load()
            .context("loading default config")?
            .unwrap_or_default()),
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref());
    init_tracing(
        config
            .as_ref()
            .ok()
            .and_then(ReweaveConfig::log_filter),
    );
    let config = config?;
    let options = config.assemble_options();
    tracing::debug!(
        algorithm = options.algorithm.as_str(),
        encoding = options.encoding.as_str(),
        mode = ?options.mode,
        "edit options"
    );

    match cli.command {
        Command::Diff(args) => commands::diff(args, options),
        Command::Batch(args) => commands::batch(args, options).await,
        Command::Apply(args) => commands::apply(args, options),
    }
}
