use serde::{Deserialize, Serialize};

/// A single package-level change between two revisions of a manifest.
///
/// The variant fixes which version fields exist: an added package only has a
/// new version, a removed package only an old one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DependencyChange {
    /// Package declared only in the new revision.
    Added {
        /// Package name.
        package: String,
        /// Declared version in the new revision.
        new_version: String,
    },
    /// Package declared in both revisions with different versions.
    Updated {
        /// Package name.
        package: String,
        /// Declared version in the old revision.
        old_version: String,
        /// Declared version in the new revision.
        new_version: String,
    },
    /// Package declared only in the old revision.
    Removed {
        /// Package name.
        package: String,
        /// Declared version in the old revision.
        old_version: String,
    },
    /// The manifest could not be interpreted.
    Error {
        /// Human-readable description of the failure.
        error: String,
    },
}

impl DependencyChange {
    /// Helper to construct an error entry from any displayable message.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }

    /// Package affected by the change, if any.
    #[must_use]
    pub fn package(&self) -> Option<&str> {
        match self {
            Self::Added { package, .. }
            | Self::Updated { package, .. }
            | Self::Removed { package, .. } => Some(package),
            Self::Error { .. } => None,
        }
    }

    /// Version before the change.
    #[must_use]
    pub fn old_version(&self) -> Option<&str> {
        match self {
            Self::Updated { old_version, .. } | Self::Removed { old_version, .. } => {
                Some(old_version)
            }
            Self::Added { .. } | Self::Error { .. } => None,
        }
    }

    /// Version after the change.
    #[must_use]
    pub fn new_version(&self) -> Option<&str> {
        match self {
            Self::Added { new_version, .. } | Self::Updated { new_version, .. } => {
                Some(new_version)
            }
            Self::Removed { .. } | Self::Error { .. } => None,
        }
    }

    /// Returns true for the error variant.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

/// File-level entry in a commit analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ManifestChange {
    /// Manifest file created by the change.
    Added {
        /// Path relative to the repository root.
        file: String,
    },
    /// Manifest file removed by the change.
    Deleted {
        /// Path relative to the repository root.
        file: String,
    },
    /// Manifest content modified by the change.
    Modified {
        /// Path relative to the repository root.
        file: String,
        /// Package-level changes found in the file.
        #[serde(default)]
        changes: Vec<DependencyChange>,
    },
    /// File content could not be retrieved.
    Error {
        /// Path relative to the repository root.
        file: String,
        /// Human-readable description of the failure.
        error: String,
    },
}

impl ManifestChange {
    /// Path of the manifest the entry refers to.
    #[must_use]
    pub fn file(&self) -> &str {
        match self {
            Self::Added { file }
            | Self::Deleted { file }
            | Self::Modified { file, .. }
            | Self::Error { file, .. } => file,
        }
    }

    /// Package-level changes, empty for whole-file entries.
    #[must_use]
    pub fn changes(&self) -> &[DependencyChange] {
        match self {
            Self::Modified { changes, .. } => changes,
            _ => &[],
        }
    }
}
