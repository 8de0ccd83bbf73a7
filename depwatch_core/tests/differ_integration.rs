mod support;

use std::sync::Arc;

use depwatch_core::{
    CommitDiffer, CommitRef, DependencyChange, GitCloneSource, ManifestChange, RepositorySource,
    Result,
};
use depwatch_manifests::default_registry;
use support::{Origin, DEFAULT_BRANCH};
use tokio_util::sync::CancellationToken;

fn differ() -> CommitDiffer {
    CommitDiffer::new(Arc::new(default_registry()))
}

#[test]
fn modified_package_json_reports_package_changes() -> Result<()> {
    let origin = Origin::init()?;
    origin.write("package.json", r#"{"dependencies": {"left-pad": "1.0.0"}}"#);
    origin.commit("Initial commit")?;
    origin.write(
        "package.json",
        r#"{"dependencies": {"left-pad": "1.1.0", "right-pad": "2.0.0"}}"#,
    );
    let sha = origin.commit("Bump left-pad")?;

    let cancel = CancellationToken::new();
    let checkout = GitCloneSource::new().checkout(&origin.url(), &cancel)?;
    let analysis = differ().analyze_commit(
        &checkout,
        &CommitRef::new(&sha, "Bump left-pad"),
        DEFAULT_BRANCH,
        &cancel,
    );

    assert!(analysis.error.is_none());
    assert_eq!(analysis.commit_sha, sha);
    assert_eq!(analysis.branch, DEFAULT_BRANCH);
    assert_eq!(
        analysis.dependency_changes,
        vec![ManifestChange::Modified {
            file: "package.json".into(),
            changes: vec![
                DependencyChange::Updated {
                    package: "left-pad".into(),
                    old_version: "1.0.0".into(),
                    new_version: "1.1.0".into(),
                },
                DependencyChange::Added {
                    package: "right-pad".into(),
                    new_version: "2.0.0".into(),
                },
            ],
        }]
    );

    Ok(())
}

#[test]
fn root_commit_is_compared_with_empty_tree() -> Result<()> {
    let origin = Origin::init()?;
    origin.write("README.md", "# demo\n");
    origin.write("package.json", r#"{"dependencies": {}}"#);
    let sha = origin.commit("Initial commit")?;

    let cancel = CancellationToken::new();
    let checkout = GitCloneSource::new().checkout(&origin.url(), &cancel)?;
    let analysis =
        differ().analyze_commit(&checkout, &CommitRef::new(&sha, ""), DEFAULT_BRANCH, &cancel);

    assert_eq!(
        analysis.dependency_changes,
        vec![ManifestChange::Added {
            file: "package.json".into()
        }]
    );

    Ok(())
}

#[test]
fn non_manifest_files_are_ignored() -> Result<()> {
    let origin = Origin::init()?;
    origin.write("README.md", "# demo\n");
    origin.write("requirements.txt", "flask==2.0.0\n");
    origin.commit("Initial commit")?;
    origin.write("README.md", "# demo\n\nMore docs.\n");
    let sha = origin.commit("Docs only")?;

    let cancel = CancellationToken::new();
    let checkout = GitCloneSource::new().checkout(&origin.url(), &cancel)?;
    let analysis =
        differ().analyze_commit(&checkout, &CommitRef::new(&sha, ""), DEFAULT_BRANCH, &cancel);

    assert!(analysis.error.is_none());
    assert!(!analysis.touches_dependencies());

    Ok(())
}

#[test]
fn deleted_and_nested_manifests_are_reported() -> Result<()> {
    let origin = Origin::init()?;
    origin.write("requirements.txt", "flask==2.0.0\n");
    origin.write("services/api/dev-requirements.txt", "pytest>=7.0\n");
    origin.commit("Initial commit")?;
    origin.remove("requirements.txt");
    origin.write("services/api/dev-requirements.txt", "pytest>=7.0\nblack\n");
    let sha = origin.commit("Reorganize requirements")?;

    let cancel = CancellationToken::new();
    let checkout = GitCloneSource::new().checkout(&origin.url(), &cancel)?;
    let analysis =
        differ().analyze_commit(&checkout, &CommitRef::new(&sha, ""), DEFAULT_BRANCH, &cancel);

    assert_eq!(analysis.dependency_changes.len(), 2);
    assert!(analysis.dependency_changes.contains(&ManifestChange::Deleted {
        file: "requirements.txt".into()
    }));
    assert!(analysis.dependency_changes.contains(&ManifestChange::Modified {
        file: "services/api/dev-requirements.txt".into(),
        changes: vec![DependencyChange::Added {
            package: "black".into(),
            new_version: "latest".into(),
        }],
    }));

    Ok(())
}

#[test]
fn malformed_json_yields_single_error_entry() -> Result<()> {
    let origin = Origin::init()?;
    origin.write("package.json", r#"{"dependencies": {"a": "1"}}"#);
    origin.commit("Initial commit")?;
    origin.write("package.json", r#"{"dependencies": {"a": "#);
    let sha = origin.commit("Break package.json")?;

    let cancel = CancellationToken::new();
    let checkout = GitCloneSource::new().checkout(&origin.url(), &cancel)?;
    let analysis =
        differ().analyze_commit(&checkout, &CommitRef::new(&sha, ""), DEFAULT_BRANCH, &cancel);

    assert!(analysis.error.is_none());
    let [ManifestChange::Modified { file, changes }] = analysis.dependency_changes.as_slice()
    else {
        panic!("expected one modified entry: {:?}", analysis.dependency_changes);
    };
    assert_eq!(file, "package.json");
    assert_eq!(changes.len(), 1);
    assert!(changes[0].is_error());

    Ok(())
}

#[test]
fn placeholder_manifest_modification_has_no_package_changes() -> Result<()> {
    let origin = Origin::init()?;
    origin.write("go.mod", "module example.com/demo\n\ngo 1.21\n");
    origin.commit("Initial commit")?;
    origin.write("go.mod", "module example.com/demo\n\ngo 1.22\n");
    let sha = origin.commit("Bump go")?;

    let cancel = CancellationToken::new();
    let checkout = GitCloneSource::new().checkout(&origin.url(), &cancel)?;
    let analysis =
        differ().analyze_commit(&checkout, &CommitRef::new(&sha, ""), DEFAULT_BRANCH, &cancel);

    assert_eq!(
        analysis.dependency_changes,
        vec![ManifestChange::Modified {
            file: "go.mod".into(),
            changes: Vec::new(),
        }]
    );
    assert!(analysis.touches_dependencies());

    Ok(())
}

#[test]
fn oversized_manifest_becomes_file_error() -> Result<()> {
    let origin = Origin::init()?;
    origin.write("package.json", r#"{"dependencies": {"a": "1"}}"#);
    origin.commit("Initial commit")?;
    origin.write(
        "package.json",
        r#"{"dependencies": {"a": "1", "b": "2", "c": "3", "d": "4"}}"#,
    );
    let sha = origin.commit("Grow package.json")?;

    let cancel = CancellationToken::new();
    let checkout = GitCloneSource::new().checkout(&origin.url(), &cancel)?;
    let analysis = differ().with_max_manifest_bytes(32).analyze_commit(
        &checkout,
        &CommitRef::new(&sha, ""),
        DEFAULT_BRANCH,
        &cancel,
    );

    assert!(analysis.error.is_none());
    let [ManifestChange::Error { file, error }] = analysis.dependency_changes.as_slice() else {
        panic!("expected one error entry: {:?}", analysis.dependency_changes);
    };
    assert_eq!(file, "package.json");
    assert!(error.contains("manifest limit"), "unexpected error: {error}");

    Ok(())
}

#[test]
fn invalid_utf8_manifest_is_treated_as_empty() -> Result<()> {
    let origin = Origin::init()?;
    origin.write("requirements.txt", "flask==2.0.0\n");
    origin.commit("Initial commit")?;
    origin.write_bytes("requirements.txt", &[0xff, 0xfe, b'x', b'\n']);
    let sha = origin.commit("Corrupt requirements")?;

    let cancel = CancellationToken::new();
    let checkout = GitCloneSource::new().checkout(&origin.url(), &cancel)?;
    let analysis =
        differ().analyze_commit(&checkout, &CommitRef::new(&sha, ""), DEFAULT_BRANCH, &cancel);

    assert_eq!(
        analysis.dependency_changes,
        vec![ManifestChange::Modified {
            file: "requirements.txt".into(),
            changes: vec![DependencyChange::Removed {
                package: "flask".into(),
                old_version: "2.0.0".into(),
            }],
        }]
    );

    Ok(())
}

#[test]
fn unknown_commit_is_recorded_as_failure() -> Result<()> {
    let origin = Origin::init()?;
    origin.write("README.md", "# demo\n");
    origin.commit("Initial commit")?;

    let cancel = CancellationToken::new();
    let checkout = GitCloneSource::new().checkout(&origin.url(), &cancel)?;
    let missing = "0123456789abcdef0123456789abcdef01234567";
    let analysis = differ().analyze_commit(
        &checkout,
        &CommitRef::new(missing, "ghost"),
        DEFAULT_BRANCH,
        &cancel,
    );

    assert!(analysis.is_failed());
    assert_eq!(analysis.commit_sha, missing);
    assert_eq!(analysis.message, "ghost");
    assert!(analysis.dependency_changes.is_empty());

    Ok(())
}

#[test]
fn range_compares_head_with_merge_base() -> Result<()> {
    let origin = Origin::init()?;
    origin.write("package.json", r#"{"dependencies": {"left-pad": "1.0.0"}}"#);
    origin.commit("Initial commit")?;

    origin.branch("feature")?;
    origin.write(
        "package.json",
        r#"{"dependencies": {"left-pad": "1.0.0", "right-pad": "2.0.0"}}"#,
    );
    let head_sha = origin.commit("Add right-pad")?;

    // A base-only change must not show up in the pull request diff.
    origin.switch(DEFAULT_BRANCH)?;
    origin.write("requirements.txt", "flask==2.0.0\n");
    origin.commit("Add python deps on main")?;

    let cancel = CancellationToken::new();
    let checkout = GitCloneSource::new().checkout(&origin.url(), &cancel)?;
    let analysis = differ().analyze_range(&checkout, DEFAULT_BRANCH, "feature", &cancel);

    assert!(analysis.error.is_none());
    assert_eq!(analysis.commit_sha, head_sha);
    assert_eq!(analysis.branch, "feature");
    assert_eq!(analysis.message, "Add right-pad");
    assert_eq!(
        analysis.dependency_changes,
        vec![ManifestChange::Modified {
            file: "package.json".into(),
            changes: vec![DependencyChange::Added {
                package: "right-pad".into(),
                new_version: "2.0.0".into(),
            }],
        }]
    );

    Ok(())
}

#[test]
fn cancelled_analysis_is_a_failure() -> Result<()> {
    let origin = Origin::init()?;
    origin.write("package.json", "{}");
    let sha = origin.commit("Initial commit")?;

    let checkout = GitCloneSource::new().checkout(&origin.url(), &CancellationToken::new())?;
    let cancel = CancellationToken::new();
    cancel.cancel();
    let analysis =
        differ().analyze_commit(&checkout, &CommitRef::new(&sha, ""), DEFAULT_BRANCH, &cancel);

    assert_eq!(analysis.error.as_deref(), Some("analysis cancelled"));

    Ok(())
}

#[test]
fn unreadable_manifest_does_not_hide_siblings() -> Result<()> {
    let origin = Origin::init()?;
    origin.write("package.json", r#"{"dependencies": {"a": "1"}}"#);
    origin.write("requirements.txt", "flask==2.0.0\n");
    origin.commit("Initial commit")?;
    origin.write(
        "package.json",
        r#"{"dependencies": {"a": "1", "b": "2", "c": "3", "d": "4"}}"#,
    );
    origin.write("requirements.txt", "flask==2.0.1\n");
    let sha = origin.commit("Grow package.json, bump flask")?;

    let cancel = CancellationToken::new();
    let checkout = GitCloneSource::new().checkout(&origin.url(), &cancel)?;
    let analysis = differ().with_max_manifest_bytes(32).analyze_commit(
        &checkout,
        &CommitRef::new(&sha, ""),
        DEFAULT_BRANCH,
        &cancel,
    );

    assert!(analysis.error.is_none());
    assert_eq!(analysis.dependency_changes.len(), 2);
    assert!(analysis
        .dependency_changes
        .iter()
        .any(|entry| matches!(entry, ManifestChange::Error { file, .. } if file == "package.json")));
    assert!(analysis.dependency_changes.contains(&ManifestChange::Modified {
        file: "requirements.txt".into(),
        changes: vec![DependencyChange::Updated {
            package: "flask".into(),
            old_version: "2.0.0".into(),
            new_version: "2.0.1".into(),
        }],
    }));

    Ok(())
}

#[test]
fn large_lock_file_is_reported_without_reading_content() -> Result<()> {
    let origin = Origin::init()?;
    let lock = |version: &str| {
        format!(
            r#"{{"name": "app", "lockfileVersion": 3, "packages": {{"node_modules/a": {{"version": "{version}"}}}}}}"#
        )
    };
    origin.write("package-lock.json", &lock("1.0.0"));
    origin.commit("Initial commit")?;
    origin.write("package-lock.json", &lock("1.0.1"));
    let sha = origin.commit("Refresh lock file")?;

    let cancel = CancellationToken::new();
    let checkout = GitCloneSource::new().checkout(&origin.url(), &cancel)?;
    let analysis = differ().with_max_manifest_bytes(32).analyze_commit(
        &checkout,
        &CommitRef::new(&sha, ""),
        DEFAULT_BRANCH,
        &cancel,
    );

    assert_eq!(
        analysis.dependency_changes,
        vec![ManifestChange::Modified {
            file: "package-lock.json".into(),
            changes: Vec::new(),
        }]
    );

    Ok(())
}
