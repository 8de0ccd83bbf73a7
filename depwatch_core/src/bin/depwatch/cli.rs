//! Command-line interface declarations.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// depwatch: report dependency changes introduced by pushes and pull requests.
#[derive(Parser, Debug)]
#[command(name = "depwatch", version, about, long_about = None)]
pub struct Cli {
    /// Path to a depwatch.toml configuration file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a webhook payload and print the report as JSON.
    Analyze(AnalyzeArgs),

    /// Compare two revisions of a manifest file.
    Diff(DiffArgs),
}

/// Webhook events understood by `analyze`.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum EventKind {
    /// A branch push.
    Push,
    /// A pull request activity.
    #[value(name = "pull_request")]
    PullRequest,
}

impl EventKind {
    /// Name used in the `X-GitHub-Event` header.
    pub const fn header_name(self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::PullRequest => "pull_request",
        }
    }
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Event type of the payload.
    #[arg(short, long, value_enum)]
    pub event: EventKind,

    /// File containing the webhook JSON body.
    pub payload: PathBuf,
}

#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Manifest path used to pick the parser, e.g. `web/package.json`.
    pub manifest: String,

    /// File holding the previous content.
    pub old: PathBuf,

    /// File holding the new content.
    pub new: PathBuf,
}
