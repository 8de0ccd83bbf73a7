//! Manifest registry maps repository paths to the parser for their format.

use std::fmt;
use std::sync::Arc;

use camino::Utf8Path;

use crate::ManifestParser;

/// File-name pattern identifying a manifest format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestPattern {
    /// Base name must equal the value (e.g. `package.json`).
    FileName(&'static str),
    /// Base name must end with the value (e.g. `requirements.txt`, which also
    /// covers `dev-requirements.txt`).
    Suffix(&'static str),
}

impl ManifestPattern {
    /// Returns true when `path` names a file of this format.
    #[must_use]
    pub fn matches(&self, path: &Utf8Path) -> bool {
        let Some(file_name) = path.file_name() else {
            return false;
        };

        match self {
            Self::FileName(name) => file_name == *name,
            Self::Suffix(suffix) => file_name.ends_with(suffix),
        }
    }
}

impl fmt::Display for ManifestPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileName(name) => f.write_str(name),
            Self::Suffix(suffix) => write!(f, "*{suffix}"),
        }
    }
}

/// A registered manifest format.
#[derive(Clone)]
pub struct ManifestRegistration {
    pattern: ManifestPattern,
    ecosystem: &'static str,
    parser: Option<Arc<dyn ManifestParser>>,
}

impl ManifestRegistration {
    /// Pattern used to recognise the format.
    #[must_use]
    pub const fn pattern(&self) -> &ManifestPattern {
        &self.pattern
    }

    /// Package ecosystem the format belongs to (e.g. `npm`).
    #[must_use]
    pub const fn ecosystem(&self) -> &'static str {
        self.ecosystem
    }

    /// Parser for content-level diffs, `None` for recognised-only formats.
    #[must_use]
    pub fn parser(&self) -> Option<&dyn ManifestParser> {
        self.parser.as_deref()
    }
}

impl fmt::Debug for ManifestRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManifestRegistration")
            .field("pattern", &self.pattern)
            .field("ecosystem", &self.ecosystem)
            .field("parser", &self.parser.as_ref().map(|parser| parser.id()))
            .finish()
    }
}

/// Ordered, append-only registry of manifest formats.
///
/// Lookups scan registrations in insertion order and the first matching
/// pattern wins. Once built, the registry is shared behind an `Arc` and only
/// read.
#[derive(Debug, Default, Clone)]
pub struct ManifestRegistry {
    registrations: Vec<ManifestRegistration>,
}

impl ManifestRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a format together with the parser that diffs its content.
    pub fn register<P>(&mut self, pattern: ManifestPattern, ecosystem: &'static str, parser: P)
    where
        P: ManifestParser + 'static,
    {
        self.register_arc(pattern, ecosystem, Arc::new(parser));
    }

    /// Register a format with a shared parser instance.
    pub fn register_arc(
        &mut self,
        pattern: ManifestPattern,
        ecosystem: &'static str,
        parser: Arc<dyn ManifestParser>,
    ) {
        self.registrations.push(ManifestRegistration {
            pattern,
            ecosystem,
            parser: Some(parser),
        });
    }

    /// Recognise a format without parsing its content.
    ///
    /// Such manifests are reported at whole-file granularity until a parser
    /// is registered ahead of them.
    pub fn recognize(&mut self, pattern: ManifestPattern, ecosystem: &'static str) {
        self.registrations.push(ManifestRegistration {
            pattern,
            ecosystem,
            parser: None,
        });
    }

    /// Find the registration responsible for `path`.
    #[must_use]
    pub fn resolve(&self, path: &Utf8Path) -> Option<&ManifestRegistration> {
        self.registrations
            .iter()
            .find(|registration| registration.pattern.matches(path))
    }

    /// Whether `path` is a known dependency manifest.
    #[must_use]
    pub fn is_manifest(&self, path: &Utf8Path) -> bool {
        self.resolve(path).is_some()
    }

    /// Registrations in lookup order.
    #[must_use]
    pub fn registrations(&self) -> &[ManifestRegistration] {
        &self.registrations
    }

    /// Number of registered formats.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Whether no format is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}
