//! End-to-end tests for the v1 -> v2 configuration migration.

use extman::config::{
    ConfigLoader, LegacyConfig, MigrateOptions, MigrateOutcome, Overrides, SkipInstalled,
    auto_migrate, migrate,
};
use std::collections::HashMap;
use std::path::Path;
use tempfile::TempDir;

fn loader(temp: &TempDir) -> ConfigLoader {
    ConfigLoader::new(vec![temp.path().to_path_buf()], HashMap::new())
}

fn options(temp: &TempDir, legacy: &Path, dry_run: bool) -> MigrateOptions {
    MigrateOptions {
        dry_run,
        target: Some(temp.path().join("out").join("extman.yaml")),
        legacy_paths: vec![legacy.to_path_buf()],
    }
}

#[test]
fn full_flow_writes_document_backup_and_preserves_source() {
    let temp = TempDir::new().unwrap();
    let legacy_path = temp.path().join(".extmanrc");
    let legacy_content =
        r#"{"editor":"cursor","parallel":6,"timeoutMs":120000,"skipExisting":true,"proxy":"http://p:3128"}"#;
    std::fs::write(&legacy_path, legacy_content).unwrap();

    let outcome = auto_migrate(&loader(&temp), &options(&temp, &legacy_path, false)).unwrap();
    let MigrateOutcome::Performed {
        source,
        target,
        backup,
        ..
    } = outcome
    else {
        panic!("expected migration to be performed");
    };

    assert_eq!(source, legacy_path);
    assert!(legacy_path.exists());
    assert_eq!(std::fs::read_to_string(&backup).unwrap(), legacy_content);

    // The written document resolves through the normal pipeline.
    let resolver = ConfigLoader::new(vec![target.parent().unwrap().to_path_buf()], HashMap::new());
    let resolved = resolver.resolve(&Overrides::default()).unwrap();
    assert_eq!(resolved.performance.parallel_downloads, 6);
    assert_eq!(resolved.performance.download_timeout, 120);
    assert_eq!(resolved.behavior.skip_installed, SkipInstalled::Always);
    assert_eq!(resolved.network.proxy, "http://p:3128");
    // Introduced v2 features carry their fixed defaults.
    assert!(resolved.safety.auto_backup);
}

#[test]
fn migration_is_skipped_when_a_new_document_exists() {
    let temp = TempDir::new().unwrap();
    let legacy_path = temp.path().join(".extmanrc");
    std::fs::write(&legacy_path, "{}").unwrap();
    std::fs::write(temp.path().join("extman.yml"), "version: \"2\"\n").unwrap();

    let outcome = auto_migrate(&loader(&temp), &options(&temp, &legacy_path, false)).unwrap();
    assert!(matches!(outcome, MigrateOutcome::AlreadyMigrated { .. }));
    assert!(!temp.path().join("out").exists());
}

#[test]
fn dry_run_reports_not_performed_and_touches_nothing() {
    let temp = TempDir::new().unwrap();
    let legacy_path = temp.path().join(".extmanrc");
    std::fs::write(&legacy_path, r#"{"skipExisting": false}"#).unwrap();

    let outcome = auto_migrate(&loader(&temp), &options(&temp, &legacy_path, true)).unwrap();
    let MigrateOutcome::DryRun { summary, .. } = outcome else {
        panic!("expected a dry run outcome");
    };
    assert!(summary.contains("skipExisting: false -> behavior.skip-installed: ask"));
    assert!(!temp.path().join("out").exists());
    assert!(!temp.path().join(".extmanrc.v1.backup").exists());
}

#[test]
fn no_legacy_source_reports_cleanly() {
    let temp = TempDir::new().unwrap();
    let outcome = auto_migrate(
        &loader(&temp),
        &options(&temp, &temp.path().join("missing.json"), false),
    )
    .unwrap();
    assert!(matches!(outcome, MigrateOutcome::NoLegacySource));
}

#[test]
fn migration_refuses_to_overwrite_an_existing_target() {
    let temp = TempDir::new().unwrap();
    let legacy_path = temp.path().join(".extmanrc");
    std::fs::write(&legacy_path, "{}").unwrap();

    // Target exists but is outside the loader's search path.
    let target = temp.path().join("out").join("extman.yaml");
    std::fs::create_dir_all(target.parent().unwrap()).unwrap();
    std::fs::write(&target, "existing\n").unwrap();

    let err = auto_migrate(&loader(&temp), &options(&temp, &legacy_path, false)).unwrap_err();
    assert!(matches!(
        err,
        extman::error::ConfigError::UnsafeWrite { .. }
    ));
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "existing\n");
}

#[test]
fn migration_never_persists_a_document_that_cannot_resolve() {
    let temp = TempDir::new().unwrap();
    let legacy_path = temp.path().join(".extmanrc");
    std::fs::write(&legacy_path, r#"{"parallel": 100, "editor": "sublime"}"#).unwrap();

    let err = auto_migrate(&loader(&temp), &options(&temp, &legacy_path, false)).unwrap_err();
    let fields = err.field_errors();
    assert!(
        fields
            .iter()
            .any(|f| f.path == "performance.parallel-downloads")
    );
    assert!(fields.iter().any(|f| f.path == "editor.prefer"));

    // A refused migration leaves no new document behind: a later resolve
    // still falls back to defaults instead of hard-failing.
    assert!(!temp.path().join("out").exists());
    let resolved = loader(&temp).resolve(&Overrides::default()).unwrap();
    assert_eq!(resolved.performance.parallel_downloads, 3);
}

#[test]
fn migrating_the_same_document_twice_is_byte_identical() {
    let content = r#"{"editor":"vscode","parallel":2,"timeoutMs":5000,"skipExisting":true,"checkCompatibility":false,"retries":1,"outputJson":true}"#;
    let legacy: LegacyConfig = LegacyConfig::from_json(content, Path::new("v1.json")).unwrap();
    let first = serde_yaml::to_string(&migrate::migrate(&legacy)).unwrap();
    let second = serde_yaml::to_string(&migrate::migrate(&legacy)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn malformed_legacy_document_is_an_error() {
    let temp = TempDir::new().unwrap();
    let legacy_path = temp.path().join(".extmanrc");
    std::fs::write(&legacy_path, "not json at all").unwrap();

    let err = auto_migrate(&loader(&temp), &options(&temp, &legacy_path, false)).unwrap_err();
    assert!(matches!(
        err,
        extman::error::ConfigError::Malformed { .. }
    ));
}
