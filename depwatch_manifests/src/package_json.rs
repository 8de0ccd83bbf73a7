//! `package.json` support.
//!
//! Direct and development dependencies are merged into one mapping, with
//! `devDependencies` overriding `dependencies` on a name collision.

use depwatch_manifest_api::{DependencyMap, ManifestParser, ParseError, ParseResult};
use serde_json::Value;

const SECTIONS: [&str; 2] = ["dependencies", "devDependencies"];

/// Parser for npm `package.json` manifests.
#[derive(Debug, Default, Clone, Copy)]
pub struct PackageJsonParser;

impl ManifestParser for PackageJsonParser {
    fn id(&self) -> &'static str {
        "package.json"
    }

    fn dependencies(&self, content: &str) -> ParseResult<DependencyMap> {
        let mut deps = DependencyMap::new();
        if content.trim().is_empty() {
            return Ok(deps);
        }

        let document: Value =
            serde_json::from_str(content).map_err(|err| ParseError::syntax(err.to_string()))?;
        let Value::Object(root) = document else {
            return Err(ParseError::shape("top-level value is not an object"));
        };

        for section in SECTIONS {
            match root.get(section) {
                None => {}
                Some(Value::Object(entries)) => {
                    for (name, version) in entries {
                        deps.insert(name.as_str(), render_version(version));
                    }
                }
                Some(_) => {
                    return Err(ParseError::shape(format!("'{section}' is not an object")));
                }
            }
        }

        Ok(deps)
    }
}

// Non-string specs (numbers, objects) are kept as their JSON text so they
// still compare deterministically.
fn render_version(version: &Value) -> String {
    match version {
        Value::String(spec) => spec.clone(),
        other => other.to_string(),
    }
}
