//! Core library for depwatch's dependency change analysis.
//!
//! The crate is layered around four responsibilities:
//! - repository materialization in disposable workspaces
//! - commit and range diffing restricted to dependency manifests
//! - event interpretation for pushes and pull requests
//! - bounded, deadline-aware execution of analyses

#![warn(
    clippy::all,
    clippy::cargo,
    clippy::nursery,
    clippy::pedantic,
    missing_docs
)]
#![cfg_attr(
    not(test),
    deny(
        clippy::dbg_macro,
        clippy::expect_used,
        clippy::panic,
        clippy::print_stderr,
        clippy::print_stdout,
        clippy::todo,
        clippy::unwrap_used
    )
)]

use std::time::Duration;

/// Event interpretation for pushes and pull requests.
pub mod analyzer;
/// Analyzer configuration loaded from TOML.
pub mod config;
/// Commit and range diffing over dependency manifests.
pub mod differ;
/// Disposable repository checkouts.
pub mod repository;
/// Bounded async façade over the analyzer.
pub mod service;

pub use analyzer::EventAnalyzer;
pub use config::{AnalyzerConfig, LoggingConfig};
pub use depwatch_api::{
    ChangeEvent, CommitAnalysis, CommitRef, DependencyChange, EventReport, ManifestChange,
    PullRequestAction,
};
pub use differ::{ChangeType, CommitDiffer, FileChange};
pub use repository::{Checkout, GitCloneSource, RepositorySource};
pub use service::AnalysisService;

/// Common result type for the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the core library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Underlying git operation failed.
    #[error("git error: {source}")]
    Git {
        /// Original libgit2 error.
        #[from]
        source: git2::Error,
    },
    /// Repository could not be cloned.
    #[error("failed to clone {url}: {source}")]
    Clone {
        /// Remote URL that was requested.
        url: String,
        /// Original libgit2 error.
        #[source]
        source: git2::Error,
    },
    /// Commit or branch is not present in the repository.
    #[error("revision not found: {revision}")]
    RevisionNotFound {
        /// Revision as requested by the caller.
        revision: String,
    },
    /// Manifest blob exceeds the configured size limit.
    #[error("{path} is {size} bytes, above the {max} byte manifest limit")]
    ManifestTooLarge {
        /// Manifest path relative to the repository root.
        path: String,
        /// Blob size in bytes.
        size: usize,
        /// Configured limit in bytes.
        max: usize,
    },
    /// Filesystem interaction failed.
    #[error("failed to access {path}: {source}")]
    Io {
        /// Filesystem path involved in the failed operation.
        path: String,
        /// Source I/O error returned by the standard library.
        #[source]
        source: std::io::Error,
    },
    /// Analysis was cancelled before it completed.
    #[error("analysis cancelled")]
    Cancelled,
    /// Analysis exceeded its deadline.
    #[error("analysis timed out after {timeout:?}")]
    TimedOut {
        /// Deadline that was exceeded.
        timeout: Duration,
    },
    /// Background worker failed or the pool was shut down.
    #[error("analysis worker failed: {message}")]
    Worker {
        /// Description of the worker failure.
        message: String,
    },
    /// Configuration value is invalid.
    #[error("config error: {field}: {reason}")]
    Config {
        /// Offending configuration field.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },
}
