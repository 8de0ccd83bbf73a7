//! Analyzer configuration.
//!
//! Every field has a default, so an empty TOML document is a valid
//! configuration:
//!
//! ```toml
//! max_concurrent_analyses = 4
//! analysis_timeout_secs = 300
//! max_manifest_bytes = 5242880
//! workspace_root = "/var/tmp/depwatch"
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::differ::DEFAULT_MAX_MANIFEST_BYTES;
use crate::{Error, Result};

const MAX_CONCURRENT_ANALYSES: usize = 64;
const MAX_TIMEOUT_SECS: u64 = 3600;
const MAX_MANIFEST_BYTES_LIMIT: usize = 100 * 1024 * 1024;

/// Settings for the analysis service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Upper bound on analyses running at the same time.
    pub max_concurrent_analyses: usize,
    /// Deadline for cloning and analyzing one event.
    pub analysis_timeout_secs: u64,
    /// Largest manifest blob that will be read.
    pub max_manifest_bytes: usize,
    /// Directory under which disposable checkouts are created.
    ///
    /// Defaults to the system temporary directory.
    pub workspace_root: Option<PathBuf>,
    /// Log output settings.
    pub logging: LoggingConfig,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_analyses: 4,
            analysis_timeout_secs: 300,
            max_manifest_bytes: DEFAULT_MAX_MANIFEST_BYTES,
            workspace_root: None,
            logging: LoggingConfig::default(),
        }
    }
}

/// Settings for log output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`.
    pub level: String,
    /// Either `json` or `pretty`.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "pretty".to_owned(),
        }
    }
}

impl AnalyzerConfig {
    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the document is malformed or a value is
    /// out of range.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|err| Error::Config {
            field: "<document>".to_owned(),
            reason: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file cannot be read, otherwise the
    /// errors of [`AnalyzerConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_string_lossy().into_owned(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Check that every value is within its supported range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_analyses == 0 || self.max_concurrent_analyses > MAX_CONCURRENT_ANALYSES
        {
            return Err(invalid(
                "max_concurrent_analyses",
                format!("must be 1-{MAX_CONCURRENT_ANALYSES}"),
            ));
        }

        if self.analysis_timeout_secs == 0 || self.analysis_timeout_secs > MAX_TIMEOUT_SECS {
            return Err(invalid(
                "analysis_timeout_secs",
                format!("must be 1-{MAX_TIMEOUT_SECS}"),
            ));
        }

        if self.max_manifest_bytes == 0 || self.max_manifest_bytes > MAX_MANIFEST_BYTES_LIMIT {
            return Err(invalid(
                "max_manifest_bytes",
                format!("must be 1-{MAX_MANIFEST_BYTES_LIMIT}"),
            ));
        }

        if let Some(root) = &self.workspace_root {
            if root.components().any(|c| c == Component::ParentDir) {
                return Err(invalid(
                    "workspace_root",
                    format!("'{}' contains '..'", root.display()),
                ));
            }
        }

        if self.logging.level.trim().is_empty() {
            return Err(invalid("logging.level", "must not be empty".to_owned()));
        }

        if !matches!(self.logging.format.as_str(), "json" | "pretty") {
            return Err(invalid(
                "logging.format",
                format!("'{}' is not 'json' or 'pretty'", self.logging.format),
            ));
        }

        Ok(())
    }

    /// Deadline for one event as a [`Duration`].
    #[must_use]
    pub const fn analysis_timeout(&self) -> Duration {
        Duration::from_secs(self.analysis_timeout_secs)
    }
}

fn invalid(field: &str, reason: String) -> Error {
    Error::Config {
        field: field.to_owned(),
        reason,
    }
}
