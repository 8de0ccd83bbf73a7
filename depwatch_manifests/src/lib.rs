mod package_json;
mod requirements;

pub use package_json::PackageJsonParser;
pub use requirements::{RequirementsParser, UNSPECIFIED_VERSION};

use depwatch_manifest_api::{ManifestPattern, ManifestRegistry};

/// Build a registry populated with depwatch's built-in manifest formats.
///
/// `package.json` and requirement lists are diffed at package level; the
/// remaining formats are recognised so that adding, deleting or touching them
/// is still reported.
#[must_use]
pub fn default_registry() -> ManifestRegistry {
    let mut registry = ManifestRegistry::new();
    registry.register(
        ManifestPattern::FileName("package.json"),
        "npm",
        PackageJsonParser,
    );
    registry.recognize(ManifestPattern::FileName("package-lock.json"), "npm");
    registry.recognize(ManifestPattern::FileName("yarn.lock"), "npm");
    registry.register(
        ManifestPattern::Suffix("requirements.txt"),
        "pypi",
        RequirementsParser,
    );
    registry.recognize(ManifestPattern::FileName("Pipfile"), "pypi");
    registry.recognize(ManifestPattern::FileName("Pipfile.lock"), "pypi");
    registry.recognize(ManifestPattern::FileName("pyproject.toml"), "pypi");
    registry.recognize(ManifestPattern::FileName("poetry.lock"), "pypi");
    registry.recognize(ManifestPattern::FileName("Gemfile"), "rubygems");
    registry.recognize(ManifestPattern::FileName("Gemfile.lock"), "rubygems");
    registry.recognize(ManifestPattern::FileName("go.mod"), "go");
    registry.recognize(ManifestPattern::FileName("go.sum"), "go");
    registry.recognize(ManifestPattern::FileName("composer.json"), "packagist");
    registry.recognize(ManifestPattern::FileName("composer.lock"), "packagist");
    registry
}
