//! Commit and range diffing restricted to dependency manifests.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use depwatch_api::{CommitAnalysis, CommitRef, ManifestChange};
use depwatch_manifest_api::{ManifestRegistration, ManifestRegistry};
use git2::{Delta, DiffDelta, ErrorCode, Tree};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::repository::Checkout;
use crate::{Error, Result};

/// Default upper bound on the size of a manifest blob.
pub const DEFAULT_MAX_MANIFEST_BYTES: usize = 5 * 1024 * 1024;

/// Kind of file-level change from the diff's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeType {
    /// File only exists on the new side.
    Added,
    /// File exists on both sides with different content.
    Modified,
    /// File only exists on the old side.
    Deleted,
}

/// A manifest file touched by a commit.
///
/// Content is only loaded for modifications: `old_content` is `None` for
/// additions and `new_content` is `None` for deletions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    /// Path relative to the repository root.
    pub path: Utf8PathBuf,
    /// How the file changed.
    pub change_type: ChangeType,
    /// Decoded content before the change.
    pub old_content: Option<String>,
    /// Decoded content after the change.
    pub new_content: Option<String>,
}

impl FileChange {
    /// A change whose content was not loaded.
    #[must_use]
    pub const fn unloaded(path: Utf8PathBuf, change_type: ChangeType) -> Self {
        Self {
            path,
            change_type,
            old_content: None,
            new_content: None,
        }
    }

    /// Reduce the file change to the entry reported in a commit analysis.
    #[must_use]
    pub fn into_manifest_change(self, registration: &ManifestRegistration) -> ManifestChange {
        let file = self.path.into_string();
        match self.change_type {
            ChangeType::Added => ManifestChange::Added { file },
            ChangeType::Deleted => ManifestChange::Deleted { file },
            ChangeType::Modified => {
                let old = self.old_content.unwrap_or_default();
                let new = self.new_content.unwrap_or_default();
                let changes = registration
                    .parser()
                    .map(|parser| parser.diff(&old, &new))
                    .unwrap_or_default();
                ManifestChange::Modified { file, changes }
            }
        }
    }
}

/// Produces [`CommitAnalysis`] values from repository history.
#[derive(Debug, Clone)]
pub struct CommitDiffer {
    registry: Arc<ManifestRegistry>,
    max_manifest_bytes: usize,
}

impl CommitDiffer {
    /// Create a differ that recognises the manifests in `registry`.
    #[must_use]
    pub const fn new(registry: Arc<ManifestRegistry>) -> Self {
        Self {
            registry,
            max_manifest_bytes: DEFAULT_MAX_MANIFEST_BYTES,
        }
    }

    /// Override the largest manifest blob that will be read.
    #[must_use]
    pub fn with_max_manifest_bytes(mut self, max_manifest_bytes: usize) -> Self {
        self.max_manifest_bytes = max_manifest_bytes;
        self
    }

    /// Registry used to recognise manifests.
    #[must_use]
    pub fn registry(&self) -> &ManifestRegistry {
        &self.registry
    }

    /// Analyze one commit against its first parent.
    ///
    /// A root commit is compared with the empty tree. Failures to read the
    /// commit are recorded on the returned analysis rather than raised.
    #[must_use]
    pub fn analyze_commit(
        &self,
        checkout: &Checkout,
        commit: &CommitRef,
        branch: &str,
        cancel: &CancellationToken,
    ) -> CommitAnalysis {
        match self.try_analyze_commit(checkout, commit, branch, cancel) {
            Ok(analysis) => analysis,
            Err(err) => {
                warn!(commit = %commit.sha, error = %err, "commit analysis failed");
                CommitAnalysis::failed(&commit.sha, branch, &commit.message, err.to_string())
            }
        }
    }

    /// Analyze the cumulative change from `base_branch` to `head_branch`.
    ///
    /// The head is compared with the merge base of both branches, or with the
    /// base tip when their histories are unrelated. When the head cannot be
    /// resolved the failed analysis has an empty `commit_sha`.
    #[must_use]
    pub fn analyze_range(
        &self,
        checkout: &Checkout,
        base_branch: &str,
        head_branch: &str,
        cancel: &CancellationToken,
    ) -> CommitAnalysis {
        match self.try_analyze_range(checkout, base_branch, head_branch, cancel) {
            Ok(analysis) => analysis,
            Err(err) => {
                warn!(base = %base_branch, head = %head_branch, error = %err, "range analysis failed");
                CommitAnalysis::failed("", head_branch, "", err.to_string())
            }
        }
    }

    fn try_analyze_commit(
        &self,
        checkout: &Checkout,
        commit_ref: &CommitRef,
        branch: &str,
        cancel: &CancellationToken,
    ) -> Result<CommitAnalysis> {
        let commit = checkout.find_commit(&commit_ref.sha)?;
        let new_tree = commit.tree()?;
        let old_tree = if commit.parent_count() == 0 {
            None
        } else {
            Some(commit.parent(0)?.tree()?)
        };

        let mut analysis = CommitAnalysis::new(&commit_ref.sha, branch, &commit_ref.message);
        analysis.dependency_changes =
            self.diff_trees(checkout, old_tree.as_ref(), &new_tree, cancel)?;
        debug!(
            commit = %commit_ref.sha,
            manifests = analysis.dependency_changes.len(),
            "analyzed commit"
        );
        Ok(analysis)
    }

    fn try_analyze_range(
        &self,
        checkout: &Checkout,
        base_branch: &str,
        head_branch: &str,
        cancel: &CancellationToken,
    ) -> Result<CommitAnalysis> {
        let repo = checkout.git();
        let head = checkout.branch_tip(head_branch)?;
        let base = checkout.branch_tip(base_branch)?;

        let baseline = match repo.merge_base(base.id(), head.id()) {
            Ok(oid) => repo.find_commit(oid)?,
            Err(err) if err.code() == ErrorCode::NotFound => base,
            Err(err) => return Err(Error::from(err)),
        };

        let old_tree = baseline.tree()?;
        let new_tree = head.tree()?;
        let mut analysis = CommitAnalysis::new(
            head.id().to_string(),
            head_branch,
            head.summary().unwrap_or_default(),
        );
        analysis.dependency_changes = self.diff_trees(checkout, Some(&old_tree), &new_tree, cancel)?;
        info!(
            base = %base_branch,
            head = %head_branch,
            baseline = %baseline.id(),
            manifests = analysis.dependency_changes.len(),
            "analyzed range"
        );
        Ok(analysis)
    }

    fn diff_trees(
        &self,
        checkout: &Checkout,
        old_tree: Option<&Tree<'_>>,
        new_tree: &Tree<'_>,
        cancel: &CancellationToken,
    ) -> Result<Vec<ManifestChange>> {
        let diff = checkout
            .git()
            .diff_tree_to_tree(old_tree, Some(new_tree), None)?;
        let mut entries = Vec::new();

        for delta in diff.deltas() {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let Some(path) = delta_path(&delta) else {
                continue;
            };
            let Some(registration) = self.registry.resolve(&path) else {
                continue;
            };
            let change_type = match delta.status() {
                Delta::Added => ChangeType::Added,
                Delta::Deleted => ChangeType::Deleted,
                Delta::Modified => ChangeType::Modified,
                other => {
                    debug!(file = %path, status = ?other, "skipping manifest delta");
                    continue;
                }
            };

            // Recognize-only formats never need their content.
            if registration.parser().is_none() {
                let change = FileChange::unloaded(path, change_type);
                entries.push(change.into_manifest_change(registration));
                continue;
            }

            let entry = match self.file_change(checkout, &delta, path.clone(), change_type) {
                Ok(change) => change.into_manifest_change(registration),
                Err(err) => {
                    warn!(file = %path, error = %err, "failed to read manifest content");
                    ManifestChange::Error {
                        file: path.into_string(),
                        error: err.to_string(),
                    }
                }
            };
            entries.push(entry);
        }

        Ok(entries)
    }

    fn file_change(
        &self,
        checkout: &Checkout,
        delta: &DiffDelta<'_>,
        path: Utf8PathBuf,
        change_type: ChangeType,
    ) -> Result<FileChange> {
        if change_type != ChangeType::Modified {
            return Ok(FileChange::unloaded(path, change_type));
        }

        let old = checkout.read_blob(
            delta.old_file().id(),
            path.as_str(),
            self.max_manifest_bytes,
        )?;
        let new = checkout.read_blob(
            delta.new_file().id(),
            path.as_str(),
            self.max_manifest_bytes,
        )?;
        Ok(FileChange {
            old_content: Some(decode(old, &path)),
            new_content: Some(decode(new, &path)),
            path,
            change_type,
        })
    }
}

fn delta_path(delta: &DiffDelta<'_>) -> Option<Utf8PathBuf> {
    let path = delta.new_file().path().or_else(|| delta.old_file().path())?;
    match Utf8Path::from_path(path) {
        Some(path) => Some(path.to_path_buf()),
        None => {
            debug!(path = %path.display(), "skipping non UTF-8 path");
            None
        }
    }
}

// Undecodable bytes become empty text so one bad file cannot fail the commit.
fn decode(bytes: Vec<u8>, path: &Utf8Path) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => match text.strip_prefix('\u{feff}') {
            Some(stripped) => stripped.to_owned(),
            None => text,
        },
        Err(err) => {
            warn!(file = %path, error = %err, "manifest is not valid UTF-8, treating as empty");
            String::new()
        }
    }
}
