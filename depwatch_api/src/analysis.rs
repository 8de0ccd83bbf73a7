use serde::{Deserialize, Serialize};

use crate::change::ManifestChange;

/// Result of examining one commit, or one base/head range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitAnalysis {
    /// Commit that was examined (the head commit for a range).
    pub commit_sha: String,
    /// Branch the commit belongs to.
    pub branch: String,
    /// Commit message or summary.
    #[serde(default)]
    pub message: String,
    /// Manifest entries touched by the commit.
    #[serde(default)]
    pub dependency_changes: Vec<ManifestChange>,
    /// Set when the commit could not be analyzed at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CommitAnalysis {
    /// Create an analysis with no manifest entries yet.
    #[must_use]
    pub fn new(
        commit_sha: impl Into<String>,
        branch: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            commit_sha: commit_sha.into(),
            branch: branch.into(),
            message: message.into(),
            dependency_changes: Vec::new(),
            error: None,
        }
    }

    /// Create an analysis that records a failure for the commit.
    #[must_use]
    pub fn failed(
        commit_sha: impl Into<String>,
        branch: impl Into<String>,
        message: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::new(commit_sha, branch, message)
        }
    }

    /// Whether any dependency manifest was touched.
    #[must_use]
    pub fn touches_dependencies(&self) -> bool {
        !self.dependency_changes.is_empty()
    }

    /// Whether the analysis failed.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Aggregated outcome of analyzing one change event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EventReport {
    /// Analyses that touched dependencies or failed, in event order.
    #[serde(default)]
    pub results: Vec<CommitAnalysis>,
    /// Number of commits (or ranges) the analyzer attempted.
    #[serde(default)]
    pub commits_attempted: usize,
    /// Number of attempted units that failed.
    #[serde(default)]
    pub commits_failed: usize,
    /// Commits analyzed successfully without dependency changes.
    #[serde(default)]
    pub skipped: Vec<String>,
}

impl EventReport {
    /// An empty report for events that do not trigger analysis.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Record one analysis, keeping it only when it carries information.
    pub fn record(&mut self, analysis: CommitAnalysis) {
        self.commits_attempted += 1;
        if analysis.is_failed() {
            self.commits_failed += 1;
            self.results.push(analysis);
        } else if analysis.touches_dependencies() {
            self.results.push(analysis);
        } else {
            self.skipped.push(analysis.commit_sha);
        }
    }

    /// Total number of dependency changes across all results.
    #[must_use]
    pub fn dependency_change_count(&self) -> usize {
        self.results
            .iter()
            .flat_map(|analysis| &analysis.dependency_changes)
            .map(|entry| entry.changes().len().max(1))
            .sum()
    }
}
