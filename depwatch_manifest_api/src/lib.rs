//! Manifest parser interfaces for depwatch.
//!
//! A parser only has to project manifest text onto a [`DependencyMap`]; the
//! shared [`diff_dependencies`] algorithm turns two projections into
//! [`DependencyChange`]s. Parsers are attached to file patterns through the
//! [`ManifestRegistry`].

mod diff;
mod map;
mod registry;

pub use depwatch_api::DependencyChange;
pub use diff::diff_dependencies;
pub use map::DependencyMap;
pub use registry::{ManifestPattern, ManifestRegistration, ManifestRegistry};

/// Trait implemented by manifest formats (e.g. `package.json`).
pub trait ManifestParser: Send + Sync {
    /// Stable identifier used for logging.
    fn id(&self) -> &'static str;

    /// Project manifest content onto a name → version mapping.
    ///
    /// # Errors
    ///
    /// Implementors return [`ParseError`] when the content cannot be
    /// interpreted as their format.
    fn dependencies(&self, content: &str) -> ParseResult<DependencyMap>;

    /// Compute the dependency changes between two revisions of a manifest.
    ///
    /// Never fails: a parse failure on either side yields a single
    /// [`DependencyChange::Error`] entry.
    fn diff(&self, old: &str, new: &str) -> Vec<DependencyChange> {
        let projected = self
            .dependencies(old)
            .and_then(|old| self.dependencies(new).map(|new| (old, new)));

        match projected {
            Ok((old, new)) => diff_dependencies(&old, &new),
            Err(err) => vec![DependencyChange::error(format!(
                "failed to parse {} manifest: {err}",
                self.id()
            ))],
        }
    }
}

/// Errors surfaced by manifest parsers.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Content is not syntactically valid.
    #[error("invalid syntax: {message}")]
    InvalidSyntax {
        /// Parser-provided description, including position when known.
        message: String,
    },
    /// Content is well formed but does not have the expected structure.
    #[error("unexpected shape: {message}")]
    UnexpectedShape {
        /// Description of the offending element.
        message: String,
    },
}

impl ParseError {
    /// Helper to construct a syntax error from any displayable message.
    #[must_use]
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::InvalidSyntax {
            message: message.into(),
        }
    }

    /// Helper to construct a shape error from any displayable message.
    #[must_use]
    pub fn shape(message: impl Into<String>) -> Self {
        Self::UnexpectedShape {
            message: message.into(),
        }
    }
}

/// Convenience result alias for parser operations.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
