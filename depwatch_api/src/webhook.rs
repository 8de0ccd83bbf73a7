//! Decoding of GitHub webhook payloads into [`ChangeEvent`]s.
//!
//! Signature verification and HTTP handling belong to the receiving server;
//! this module only maps already-trusted JSON bodies onto the event model.

use serde::Deserialize;

use crate::event::{branch_from_ref, ChangeEvent, CommitRef, PullRequestAction};

/// Errors raised while decoding a webhook body.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// Body is not valid JSON for the declared event type.
    #[error("invalid {event} payload: {source}")]
    InvalidPayload {
        /// Event name from the delivery header.
        event: String,
        /// Underlying decode failure.
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Deserialize)]
struct RepositoryPayload {
    clone_url: String,
}

#[derive(Deserialize)]
struct CommitPayload {
    id: String,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct PushPayload {
    #[serde(rename = "ref")]
    reference: String,
    repository: RepositoryPayload,
    #[serde(default)]
    commits: Vec<CommitPayload>,
}

#[derive(Deserialize)]
struct BranchPayload {
    #[serde(rename = "ref")]
    reference: String,
}

#[derive(Deserialize)]
struct PullRequestBody {
    base: BranchPayload,
    head: BranchPayload,
}

#[derive(Deserialize)]
struct PullRequestPayload {
    action: PullRequestAction,
    repository: RepositoryPayload,
    pull_request: PullRequestBody,
}

impl ChangeEvent {
    /// Decode a webhook body for the given event name.
    ///
    /// Returns `Ok(None)` for event types depwatch does not analyze.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::InvalidPayload`] when a supported event carries
    /// a body that does not match the expected shape.
    pub fn from_webhook(event: &str, body: &[u8]) -> Result<Option<Self>, WebhookError> {
        let invalid = |source| WebhookError::InvalidPayload {
            event: event.to_owned(),
            source,
        };

        match event {
            "push" => {
                let payload: PushPayload = serde_json::from_slice(body).map_err(invalid)?;
                Ok(Some(Self::Push {
                    repo_url: payload.repository.clone_url,
                    branch: branch_from_ref(&payload.reference),
                    commits: payload
                        .commits
                        .into_iter()
                        .map(|commit| CommitRef::new(commit.id, commit.message))
                        .collect(),
                }))
            }
            "pull_request" => {
                let payload: PullRequestPayload =
                    serde_json::from_slice(body).map_err(invalid)?;
                Ok(Some(Self::PullRequest {
                    repo_url: payload.repository.clone_url,
                    base_branch: payload.pull_request.base.reference,
                    head_branch: payload.pull_request.head.reference,
                    action: payload.action,
                }))
            }
            _ => Ok(None),
        }
    }
}
