//! `requirements.txt` support.
//!
//! Each meaningful line declares one package. Exact pins (`name==1.0`) keep
//! the bare version, minimum pins (`name>=2.0`) keep the operator, and a bare
//! name maps to [`UNSPECIFIED_VERSION`].

use depwatch_manifest_api::{DependencyMap, ManifestParser, ParseResult};

/// Version recorded for requirements that name a package without a version.
///
/// Not a valid PEP 440 version, so it never collides with a real pin.
pub const UNSPECIFIED_VERSION: &str = "latest";

/// Parser for pip requirement lists.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequirementsParser;

impl ManifestParser for RequirementsParser {
    fn id(&self) -> &'static str {
        "requirements.txt"
    }

    fn dependencies(&self, content: &str) -> ParseResult<DependencyMap> {
        Ok(content.lines().filter_map(parse_line).collect())
    }
}

fn parse_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    // Options such as `-r base.txt` or `--index-url` are not packages.
    if line.is_empty() || line.starts_with('#') || line.starts_with('-') {
        return None;
    }

    if let Some((name, version)) = line.split_once("==") {
        return Some((name.trim().to_owned(), version.trim().to_owned()));
    }

    if let Some((name, version)) = line.split_once(">=") {
        return Some((name.trim().to_owned(), format!(">={}", version.trim())));
    }

    Some((line.to_owned(), UNSPECIFIED_VERSION.to_owned()))
}
