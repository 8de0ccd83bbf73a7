//! Interpretation of change events into commit analyses.

use std::sync::Arc;

use depwatch_api::{ChangeEvent, CommitAnalysis, CommitRef, EventReport, PullRequestAction};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::differ::CommitDiffer;
use crate::repository::RepositorySource;
use crate::Error;

/// Drives the [`CommitDiffer`] over the commits an event refers to.
pub struct EventAnalyzer {
    source: Arc<dyn RepositorySource>,
    differ: CommitDiffer,
}

impl EventAnalyzer {
    /// Create an analyzer that materializes repositories through `source`.
    #[must_use]
    pub fn new(source: Arc<dyn RepositorySource>, differ: CommitDiffer) -> Self {
        Self { source, differ }
    }

    /// Differ used for individual commits and ranges.
    #[must_use]
    pub const fn differ(&self) -> &CommitDiffer {
        &self.differ
    }

    /// Analyze one event.
    ///
    /// Every failure is converted into a failed [`CommitAnalysis`] inside the
    /// report, so this never returns an error.
    #[must_use]
    pub fn analyze(&self, event: &ChangeEvent, cancel: &CancellationToken) -> EventReport {
        match event {
            ChangeEvent::Push {
                repo_url,
                branch,
                commits,
            } => self.analyze_push(repo_url, branch, commits, cancel),
            ChangeEvent::PullRequest {
                repo_url,
                base_branch,
                head_branch,
                action,
            } => self.analyze_pull_request(repo_url, base_branch, head_branch, *action, cancel),
        }
    }

    /// Analyze pushed commits in order, keeping those that touch manifests.
    #[must_use]
    pub fn analyze_push(
        &self,
        repo_url: &str,
        branch: &str,
        commits: &[CommitRef],
        cancel: &CancellationToken,
    ) -> EventReport {
        let mut report = EventReport::empty();
        if commits.is_empty() {
            debug!(repo_url = %repo_url, "push without commits");
            return report;
        }

        let checkout = match self.source.checkout(repo_url, cancel) {
            Ok(checkout) => checkout,
            Err(err) => {
                warn!(repo_url = %repo_url, error = %err, "repository unavailable for push");
                let message = err.to_string();
                for commit in commits {
                    report.record(CommitAnalysis::failed(
                        &commit.sha,
                        branch,
                        &commit.message,
                        message.as_str(),
                    ));
                }
                return report;
            }
        };

        for commit in commits {
            let analysis = if cancel.is_cancelled() {
                CommitAnalysis::failed(
                    &commit.sha,
                    branch,
                    &commit.message,
                    Error::Cancelled.to_string(),
                )
            } else {
                self.differ
                    .analyze_commit(&checkout, commit, branch, cancel)
            };
            report.record(analysis);
        }

        info!(
            repo_url = %repo_url,
            branch = %branch,
            attempted = report.commits_attempted,
            with_changes = report.results.len() - report.commits_failed,
            failed = report.commits_failed,
            "analyzed push"
        );
        report
    }

    /// Analyze a pull request as one base → head range.
    ///
    /// Only `opened` and `synchronize` actions are analyzed; other actions
    /// produce an empty report.
    #[must_use]
    pub fn analyze_pull_request(
        &self,
        repo_url: &str,
        base_branch: &str,
        head_branch: &str,
        action: PullRequestAction,
        cancel: &CancellationToken,
    ) -> EventReport {
        if !action.triggers_analysis() {
            debug!(repo_url = %repo_url, ?action, "ignoring pull request action");
            return EventReport::empty();
        }

        let analysis = match self.source.checkout(repo_url, cancel) {
            Ok(checkout) => self
                .differ
                .analyze_range(&checkout, base_branch, head_branch, cancel),
            Err(err) => {
                warn!(repo_url = %repo_url, error = %err, "repository unavailable for pull request");
                CommitAnalysis::failed("", head_branch, "", err.to_string())
            }
        };

        EventReport {
            commits_attempted: 1,
            commits_failed: usize::from(analysis.is_failed()),
            results: vec![analysis],
            skipped: Vec::new(),
        }
    }
}

impl std::fmt::Debug for EventAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventAnalyzer")
            .field("differ", &self.differ)
            .finish_non_exhaustive()
    }
}
