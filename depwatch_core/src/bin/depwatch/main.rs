//! `depwatch` command-line entry point.

mod cli;
mod logging;

use std::path::Path;

use anyhow::{Context, Result};
use camino::Utf8Path;
use clap::Parser;
use depwatch_api::ChangeEvent;
use depwatch_core::{AnalysisService, AnalyzerConfig, EventReport};
use depwatch_manifests::default_registry;
use tracing::info;

use crate::cli::{AnalyzeArgs, Cli, Commands, DiffArgs};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AnalyzerConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AnalyzerConfig::default(),
    };
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    logging::init_tracing(&config.logging)?;

    match cli.command {
        Commands::Analyze(args) => analyze(&config, &args).await,
        Commands::Diff(args) => diff(&args),
    }
}

async fn analyze(config: &AnalyzerConfig, args: &AnalyzeArgs) -> Result<()> {
    let body = read(&args.payload)?;
    let event_name = args.event.header_name();
    let report = match ChangeEvent::from_webhook(event_name, body.as_bytes())? {
        Some(event) => {
            info!(kind = event.kind(), repo_url = %event.repo_url(), "analyzing event");
            AnalysisService::from_config(config).analyze(event).await?
        }
        None => EventReport::empty(),
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn diff(args: &DiffArgs) -> Result<()> {
    let registry = default_registry();
    let registration = registry
        .resolve(Utf8Path::new(&args.manifest))
        .with_context(|| format!("{} is not a recognized manifest", args.manifest))?;
    let parser = registration.parser().with_context(|| {
        format!(
            "{} manifests ({}) are recognized but not parsed",
            registration.ecosystem(),
            registration.pattern()
        )
    })?;

    let old = read(&args.old)?;
    let new = read(&args.new)?;
    let changes = parser.diff(&old, &new);

    println!("{}", serde_json::to_string_pretty(&changes)?);
    Ok(())
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
