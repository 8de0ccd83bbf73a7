use depwatch_api::DependencyChange;

use crate::map::DependencyMap;

/// Compute the dependency changes between two projected manifests.
///
/// Additions and updates are emitted first, in the iteration order of `new`;
/// removals follow in the iteration order of `old`. Packages declared with the
/// same version on both sides never appear.
#[must_use]
pub fn diff_dependencies(old: &DependencyMap, new: &DependencyMap) -> Vec<DependencyChange> {
    let mut changes = Vec::new();

    for (package, new_version) in new.iter() {
        match old.get(package) {
            None => changes.push(DependencyChange::Added {
                package: package.to_owned(),
                new_version: new_version.to_owned(),
            }),
            Some(old_version) if old_version != new_version => {
                changes.push(DependencyChange::Updated {
                    package: package.to_owned(),
                    old_version: old_version.to_owned(),
                    new_version: new_version.to_owned(),
                });
            }
            Some(_) => {}
        }
    }

    for (package, old_version) in old.iter() {
        if !new.contains(package) {
            changes.push(DependencyChange::Removed {
                package: package.to_owned(),
                old_version: old_version.to_owned(),
            });
        }
    }

    changes
}
