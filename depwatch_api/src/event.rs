use serde::{Deserialize, Serialize};

/// Minimal identity of a commit that should be examined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRef {
    /// Full object identifier of the commit.
    pub sha: String,
    /// Commit message as reported by the event source.
    #[serde(default)]
    pub message: String,
}

impl CommitRef {
    /// Construct a commit reference.
    #[must_use]
    pub fn new(sha: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            sha: sha.into(),
            message: message.into(),
        }
    }
}

/// Pull-request actions reported by the webhook source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PullRequestAction {
    /// A pull request was opened.
    Opened,
    /// New commits were pushed to the head branch.
    Synchronize,
    /// The pull request was closed or merged.
    Closed,
    /// A closed pull request was reopened.
    Reopened,
    /// Title or body was edited.
    Edited,
    /// A label was added.
    Labeled,
    /// Any action depwatch does not distinguish.
    #[serde(other)]
    Other,
}

impl PullRequestAction {
    /// Whether this action should trigger a dependency analysis.
    #[must_use]
    pub const fn triggers_analysis(self) -> bool {
        matches!(self, Self::Opened | Self::Synchronize)
    }
}

/// A change event delivered by the boundary layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeEvent {
    /// Commits pushed to a branch.
    Push {
        /// Clone URL of the repository.
        repo_url: String,
        /// Branch the commits were pushed to.
        branch: String,
        /// Pushed commits in the order the source reported them.
        #[serde(default)]
        commits: Vec<CommitRef>,
    },
    /// Activity on a pull request.
    PullRequest {
        /// Clone URL of the repository.
        repo_url: String,
        /// Branch the pull request targets.
        base_branch: String,
        /// Branch carrying the proposed changes.
        head_branch: String,
        /// Action that produced the event.
        action: PullRequestAction,
    },
}

impl ChangeEvent {
    /// Clone URL of the repository the event refers to.
    #[must_use]
    pub fn repo_url(&self) -> &str {
        match self {
            Self::Push { repo_url, .. } | Self::PullRequest { repo_url, .. } => repo_url,
        }
    }

    /// Short label for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Push { .. } => "push",
            Self::PullRequest { .. } => "pull_request",
        }
    }
}

/// Derive a branch name from a fully qualified git reference.
///
/// `refs/heads/feature/login` becomes `feature/login`; references outside
/// `refs/heads/` are returned without their `refs/` prefix.
#[must_use]
pub fn branch_from_ref(reference: &str) -> String {
    reference
        .strip_prefix("refs/heads/")
        .or_else(|| reference.strip_prefix("refs/"))
        .unwrap_or(reference)
        .to_owned()
}
