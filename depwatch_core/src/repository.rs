//! Repository materialization built on top of libgit2.
//!
//! Every analysis works on its own [`Checkout`]: a bare clone inside a
//! temporary directory that is deleted when the checkout is dropped, whatever
//! path the analysis took to get there.

use std::fmt;
use std::path::{Path, PathBuf};

use git2::{build::RepoBuilder, ErrorCode, FetchOptions, Oid, RemoteCallbacks};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{Error, Result};

const WORKSPACE_PREFIX: &str = "depwatch-";

/// Capability to materialize a repository from a remote URL.
///
/// Implementations must not mutate the source repository.
pub trait RepositorySource: Send + Sync {
    /// Produce a fresh checkout of `url`.
    ///
    /// # Errors
    ///
    /// Returns an error when the repository cannot be fetched, or
    /// [`Error::Cancelled`] when `cancel` fires during the transfer.
    fn checkout(&self, url: &str, cancel: &CancellationToken) -> Result<Checkout>;
}

/// A repository materialized in a disposable directory.
pub struct Checkout {
    // Declared before `workdir` so the handle closes before the directory is removed.
    inner: git2::Repository,
    workdir: TempDir,
}

impl Checkout {
    /// Wrap an opened repository together with the directory that owns it.
    #[must_use]
    pub const fn new(inner: git2::Repository, workdir: TempDir) -> Self {
        Self { inner, workdir }
    }

    /// Directory holding the repository; removed on drop.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.workdir.path()
    }

    /// Underlying libgit2 repository.
    #[must_use]
    pub const fn git(&self) -> &git2::Repository {
        &self.inner
    }

    /// Look up a commit by its object id (full or abbreviated).
    ///
    /// # Errors
    ///
    /// Returns [`Error::RevisionNotFound`] when no such commit exists.
    pub fn find_commit(&self, sha: &str) -> Result<git2::Commit<'_>> {
        let object = match Oid::from_str(sha) {
            Ok(oid) if sha.len() == 40 => self.inner.find_object(oid, None),
            _ => self.inner.revparse_single(sha),
        };

        object
            .and_then(|object| object.peel_to_commit())
            .map_err(|err| not_found_or(err, sha))
    }

    /// Resolve a branch name to its tip commit.
    ///
    /// Remote-tracking branches created by the clone take precedence over
    /// local branches of the same name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RevisionNotFound`] when the branch does not exist.
    pub fn branch_tip(&self, branch: &str) -> Result<git2::Commit<'_>> {
        let candidates = [
            format!("refs/remotes/origin/{branch}"),
            format!("refs/heads/{branch}"),
        ];

        for name in &candidates {
            match self.inner.find_reference(name) {
                Ok(reference) => return Ok(reference.peel_to_commit()?),
                Err(err) if err.code() == ErrorCode::NotFound => {}
                Err(err) => return Err(Error::from(err)),
            }
        }

        Err(Error::RevisionNotFound {
            revision: branch.to_owned(),
        })
    }

    /// Read a blob, refusing blobs larger than `max_bytes`.
    ///
    /// The size is checked from the object header before the content is
    /// inflated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ManifestTooLarge`] above the limit, or the git error
    /// raised while reading the object.
    pub fn read_blob(&self, id: Oid, path: &str, max_bytes: usize) -> Result<Vec<u8>> {
        let (size, _) = self.inner.odb()?.read_header(id)?;
        if size > max_bytes {
            return Err(Error::ManifestTooLarge {
                path: path.to_owned(),
                size,
                max: max_bytes,
            });
        }

        let blob = self.inner.find_blob(id)?;
        Ok(blob.content().to_vec())
    }
}

impl fmt::Debug for Checkout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Checkout")
            .field("path", &self.workdir.path())
            .finish_non_exhaustive()
    }
}

/// Clones repositories with libgit2 into temporary directories.
///
/// Clones are bare: manifests are read straight from the object database, so
/// no untrusted file is ever written to a working tree.
#[derive(Debug, Default, Clone)]
pub struct GitCloneSource {
    workspace_root: Option<PathBuf>,
}

impl GitCloneSource {
    /// Clone into the system temporary directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clone into directories created under `root`.
    #[must_use]
    pub fn with_workspace_root(root: impl Into<PathBuf>) -> Self {
        Self {
            workspace_root: Some(root.into()),
        }
    }

    fn workspace(&self) -> Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(WORKSPACE_PREFIX);
        let created = match &self.workspace_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        };

        created.map_err(|source| Error::Io {
            path: self
                .workspace_root
                .as_deref()
                .map_or_else(|| display_path(&std::env::temp_dir()), display_path),
            source,
        })
    }
}

impl RepositorySource for GitCloneSource {
    fn checkout(&self, url: &str, cancel: &CancellationToken) -> Result<Checkout> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let workdir = self.workspace()?;
        debug!(repo_url = %url, path = %workdir.path().display(), "cloning repository");

        let token = cancel.clone();
        let mut callbacks = RemoteCallbacks::new();
        callbacks.transfer_progress(move |_| !token.is_cancelled());
        let mut fetch = FetchOptions::new();
        fetch.remote_callbacks(callbacks);

        let repo = RepoBuilder::new()
            .bare(true)
            .fetch_options(fetch)
            .clone(url, workdir.path())
            .map_err(|source| {
                if cancel.is_cancelled() {
                    Error::Cancelled
                } else {
                    Error::Clone {
                        url: url.to_owned(),
                        source,
                    }
                }
            })?;

        Ok(Checkout::new(repo, workdir))
    }
}

fn not_found_or(err: git2::Error, revision: &str) -> Error {
    if matches!(err.code(), ErrorCode::NotFound | ErrorCode::Ambiguous)
        || err.class() == git2::ErrorClass::Invalid
    {
        Error::RevisionNotFound {
            revision: revision.to_owned(),
        }
    } else {
        Error::from(err)
    }
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}
