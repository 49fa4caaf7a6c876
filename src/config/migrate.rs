//! One-time migration of legacy flat v1 documents into the nested schema.
//!
//! The v1 format was a single flat JSON object with camelCase fields,
//! millisecond timeouts, and boolean toggles that v2 turned into enumerated
//! policies. The mapping table is total: every v1 field lands in exactly one
//! v2 location, and brand-new v2 features receive fixed introduced defaults.

use super::loader::{self, ConfigLoader};
use super::schema;
use super::types::{ConfigDocument, DOCUMENT_VERSION};
use crate::error::{ConfigError, ConfigResult};
use serde::Deserialize;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// V1 default for `timeoutMs`, applied when the legacy field is absent.
const LEGACY_TIMEOUT_MS_DEFAULT: u64 = 30_000;

/// Schema minimum for `performance.download-timeout`, in seconds. A valid
/// v1 timeout must never migrate into an out-of-range v2 value.
const MIN_TIMEOUT_SECS: u64 = 5;

/// The deprecated flat document. Every field is optional and loosely typed
/// so the mapping below stays exhaustive instead of probing ad hoc.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyConfig {
    pub editor: Option<String>,
    /// Single parallelism knob; v2 splits downloads from installs.
    pub parallel: Option<u64>,
    /// Per-download timeout in milliseconds; v2 uses seconds.
    pub timeout_ms: Option<u64>,
    /// Became the `skip-installed` enum in v2.
    pub skip_existing: Option<bool>,
    pub check_compatibility: Option<bool>,
    pub proxy: Option<String>,
    pub retries: Option<u64>,
    /// Became the `output.format` enum in v2.
    pub output_json: Option<bool>,
}

impl LegacyConfig {
    /// Parse a v1 JSON document. Unknown fields are ignored.
    pub fn from_json(content: &str, path: &Path) -> ConfigResult<Self> {
        serde_json::from_str(content).map_err(|err| ConfigError::Malformed {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })
    }
}

/// Map a legacy document to a new-format partial. Pure and deterministic:
/// the same input always produces the same document, field for field.
pub fn migrate(legacy: &LegacyConfig) -> ConfigDocument {
    let mut document = ConfigDocument {
        version: Some(DOCUMENT_VERSION.to_string()),
        ..ConfigDocument::default()
    };
    let sections = &mut document.sections;

    // Direct renames.
    if let Some(editor) = &legacy.editor {
        sections.set("editor", "prefer", Value::String(editor.clone()));
    }
    if let Some(parallel) = legacy.parallel {
        sections.set("performance", "parallel-downloads", json!(parallel));
    }
    if let Some(proxy) = &legacy.proxy {
        sections.set("network", "proxy", Value::String(proxy.clone()));
    }
    if let Some(retries) = legacy.retries {
        sections.set("network", "retries", json!(retries));
    }

    // Moves with declared fallbacks.
    sections.set(
        "safety",
        "check-compatibility",
        Value::Bool(legacy.check_compatibility.unwrap_or(true)),
    );

    // Unit change: milliseconds to seconds, rounded up, clamped to the
    // schema minimum.
    let timeout_ms = legacy.timeout_ms.unwrap_or(LEGACY_TIMEOUT_MS_DEFAULT);
    let timeout_secs = timeout_ms.div_ceil(1000).max(MIN_TIMEOUT_SECS);
    sections.set("performance", "download-timeout", json!(timeout_secs));

    // Boolean toggles reinterpreted as enumerated policies. A v1 user who
    // skipped existing extensions keeps doing so; one who did not is asked,
    // never forced into reinstalling.
    let skip = match legacy.skip_existing {
        Some(true) => "always",
        Some(false) | None => "ask",
    };
    sections.set("behavior", "skip-installed", json!(skip));

    let format = match legacy.output_json {
        Some(true) => "json",
        Some(false) | None => "text",
    };
    sections.set("output", "format", json!(format));

    // Features introduced in v2, with their fixed defaults.
    sections.set("safety", "auto-backup", Value::Bool(true));
    sections.set("behavior", "update-check", json!("weekly"));

    document
}

/// Human-readable mapping summary shown before confirmation.
pub fn migration_summary(legacy: &LegacyConfig, document: &ConfigDocument) -> String {
    let mut lines = vec!["Migration plan (v1 -> v2):".to_string()];

    let mut line = |old: Option<String>, section: &str, field: &str| {
        if let Some(new_value) = document.sections.get(section, field) {
            let rendered = render(new_value);
            match old {
                Some(old) => lines.push(format!("  {old} -> {section}.{field}: {rendered}")),
                None => lines.push(format!("  (new) {section}.{field}: {rendered}")),
            }
        }
    };

    line(
        legacy.editor.as_ref().map(|v| format!("editor: {v}")),
        "editor",
        "prefer",
    );
    line(
        legacy.parallel.map(|v| format!("parallel: {v}")),
        "performance",
        "parallel-downloads",
    );
    line(
        Some(match legacy.timeout_ms {
            Some(ms) => format!("timeoutMs: {ms}"),
            None => format!("timeoutMs: (absent, default {LEGACY_TIMEOUT_MS_DEFAULT})"),
        }),
        "performance",
        "download-timeout",
    );
    line(
        Some(match legacy.skip_existing {
            Some(v) => format!("skipExisting: {v}"),
            None => "skipExisting: (absent)".to_string(),
        }),
        "behavior",
        "skip-installed",
    );
    line(
        Some(match legacy.check_compatibility {
            Some(v) => format!("checkCompatibility: {v}"),
            None => "checkCompatibility: (absent, default true)".to_string(),
        }),
        "safety",
        "check-compatibility",
    );
    line(
        legacy.proxy.as_ref().map(|v| format!("proxy: {v}")),
        "network",
        "proxy",
    );
    line(
        legacy.retries.map(|v| format!("retries: {v}")),
        "network",
        "retries",
    );
    line(
        Some(match legacy.output_json {
            Some(v) => format!("outputJson: {v}"),
            None => "outputJson: (absent)".to_string(),
        }),
        "output",
        "format",
    );
    line(None, "safety", "auto-backup");
    line(None, "behavior", "update-check");

    lines.join("\n")
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Options for the auto-migration flow.
#[derive(Debug, Clone, Default)]
pub struct MigrateOptions {
    /// Map and print, but write nothing.
    pub dry_run: bool,
    /// Where to write the new document; defaults to the standard location.
    pub target: Option<PathBuf>,
    /// Explicit legacy candidates; when non-empty the standard locations
    /// are not searched.
    pub legacy_paths: Vec<PathBuf>,
}

/// Outcome of [`auto_migrate`], for caller-side reporting.
#[derive(Debug)]
pub enum MigrateOutcome {
    /// New document written; the legacy source was copied to the backup.
    Performed {
        source: PathBuf,
        target: PathBuf,
        backup: PathBuf,
        summary: String,
    },
    /// Dry run: mapping computed, nothing written.
    DryRun { source: PathBuf, summary: String },
    /// No legacy document found.
    NoLegacySource,
    /// A new-format document already exists; never overwritten.
    AlreadyMigrated { existing: PathBuf },
}

impl MigrateOutcome {
    /// True only when a new document was actually written.
    pub fn performed(&self) -> bool {
        matches!(self, MigrateOutcome::Performed { .. })
    }
}

/// Legacy-path candidates, in search order.
pub fn legacy_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".extmanrc"));
        candidates.push(home.join(".extman.json"));
    }
    candidates.push(PathBuf::from(".extmanrc"));
    candidates
}

/// Discover a legacy document and migrate it if no new-format document
/// exists yet.
///
/// The legacy file itself is left in place untouched; a copy is written to
/// `<original>.v1.backup` after the new document lands.
pub fn auto_migrate(loader: &ConfigLoader, options: &MigrateOptions) -> ConfigResult<MigrateOutcome> {
    // Never overwrite an existing new-format document.
    if let Some(existing) = loader.discover() {
        debug!(path = %existing.display(), "new-format document already present");
        return Ok(MigrateOutcome::AlreadyMigrated { existing });
    }

    let candidates = if options.legacy_paths.is_empty() {
        legacy_candidates()
    } else {
        options.legacy_paths.clone()
    };
    let Some(source) = candidates.into_iter().find(|p| p.is_file()) else {
        return Ok(MigrateOutcome::NoLegacySource);
    };

    let content = std::fs::read_to_string(&source)?;
    let legacy = LegacyConfig::from_json(&content, &source)?;
    let document = migrate(&legacy);

    // The timeout is clamped into range above, but renamed fields carry the
    // legacy values verbatim. Refuse to persist a document that would fail
    // every subsequent resolution.
    let violations = schema::validate(&document.sections);
    if !violations.is_empty() {
        return Err(ConfigError::Validation(violations));
    }

    let summary = migration_summary(&legacy, &document);

    if options.dry_run {
        return Ok(MigrateOutcome::DryRun { source, summary });
    }

    let target = options
        .target
        .clone()
        .unwrap_or_else(loader::default_document_path);
    if target.exists() {
        return Err(ConfigError::UnsafeWrite { path: target });
    }
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let yaml = serde_yaml::to_string(&document).map_err(|err| ConfigError::Malformed {
        path: target.clone(),
        reason: err.to_string(),
    })?;
    std::fs::write(&target, yaml)?;

    // Copy, never move: the legacy file stays in place.
    let backup = backup_path(&source);
    std::fs::copy(&source, &backup)?;

    info!(
        source = %source.display(),
        target = %target.display(),
        "migrated legacy configuration"
    );
    Ok(MigrateOutcome::Performed {
        source,
        target,
        backup,
        summary,
    })
}

/// Backup path for a migrated legacy file.
pub fn backup_path(source: &Path) -> PathBuf {
    let mut name = source.as_os_str().to_os_string();
    name.push(".v1.backup");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn legacy(content: &str) -> LegacyConfig {
        LegacyConfig::from_json(content, Path::new("test.json")).unwrap()
    }

    #[test]
    fn skip_existing_true_becomes_always() {
        let doc = migrate(&legacy(r#"{"skipExisting": true}"#));
        assert_eq!(
            doc.sections.get("behavior", "skip-installed"),
            Some(&json!("always"))
        );
    }

    #[test]
    fn skip_existing_false_becomes_ask_never_never() {
        let doc = migrate(&legacy(r#"{"skipExisting": false}"#));
        assert_eq!(
            doc.sections.get("behavior", "skip-installed"),
            Some(&json!("ask"))
        );
        let doc = migrate(&legacy("{}"));
        assert_eq!(
            doc.sections.get("behavior", "skip-installed"),
            Some(&json!("ask"))
        );
    }

    #[test]
    fn parallel_renames_to_parallel_downloads_only() {
        let doc = migrate(&legacy(r#"{"parallel": 6}"#));
        assert_eq!(
            doc.sections.get("performance", "parallel-downloads"),
            Some(&json!(6))
        );
        // parallel-installs did not exist in v1; the resolver fills its
        // introduced default.
        assert_eq!(doc.sections.get("performance", "parallel-installs"), None);
    }

    #[test]
    fn timeout_converts_ms_to_seconds_rounding_up() {
        let doc = migrate(&legacy(r#"{"timeoutMs": 45500}"#));
        assert_eq!(
            doc.sections.get("performance", "download-timeout"),
            Some(&json!(46))
        );
    }

    #[test]
    fn tiny_timeout_clamps_to_schema_minimum() {
        let doc = migrate(&legacy(r#"{"timeoutMs": 200}"#));
        assert_eq!(
            doc.sections.get("performance", "download-timeout"),
            Some(&json!(5))
        );
    }

    #[test]
    fn absent_timeout_uses_the_v1_default() {
        let doc = migrate(&legacy("{}"));
        assert_eq!(
            doc.sections.get("performance", "download-timeout"),
            Some(&json!(30))
        );
    }

    #[test]
    fn introduced_features_get_fixed_defaults() {
        let doc = migrate(&legacy("{}"));
        assert_eq!(doc.sections.get("safety", "auto-backup"), Some(&json!(true)));
        assert_eq!(
            doc.sections.get("behavior", "update-check"),
            Some(&json!("weekly"))
        );
    }

    #[test]
    fn migration_is_deterministic() {
        let content = r#"{"editor":"cursor","parallel":4,"skipExisting":true,"outputJson":true}"#;
        let first = serde_yaml::to_string(&migrate(&legacy(content))).unwrap();
        let second = serde_yaml::to_string(&migrate(&legacy(content))).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn migrated_document_resolves_cleanly() {
        let doc = migrate(&legacy(
            r#"{"editor":"vscode","parallel":4,"timeoutMs":90000,"retries":3,"proxy":"http://proxy:8080"}"#,
        ));
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("extman.yaml");
        std::fs::write(&path, serde_yaml::to_string(&doc).unwrap()).unwrap();

        let loader = ConfigLoader::new(vec![temp.path().to_path_buf()], HashMap::new());
        let resolved = loader.resolve(&Default::default()).unwrap();
        assert_eq!(resolved.performance.parallel_downloads, 4);
        assert_eq!(resolved.performance.download_timeout, 90);
        assert_eq!(resolved.network.proxy, "http://proxy:8080");
        assert_eq!(resolved.network.retries, 3);
    }

    #[test]
    fn out_of_range_legacy_values_refuse_to_migrate() {
        let temp = TempDir::new().unwrap();
        let legacy_path = temp.path().join(".extmanrc");
        std::fs::write(&legacy_path, r#"{"parallel": 100, "editor": "sublime"}"#).unwrap();

        let loader = ConfigLoader::new(vec![temp.path().to_path_buf()], HashMap::new());
        let options = MigrateOptions {
            target: Some(temp.path().join("out").join("extman.yaml")),
            legacy_paths: vec![legacy_path.clone()],
            ..Default::default()
        };
        let err = auto_migrate(&loader, &options).unwrap_err();
        let fields = err.field_errors();
        assert!(fields.iter().any(|f| f.path == "performance.parallel-downloads"));
        assert!(fields.iter().any(|f| f.path == "editor.prefer"));
        // Nothing was written, the legacy file is untouched.
        assert!(!temp.path().join("out").exists());
        assert!(!backup_path(&legacy_path).exists());
        assert!(legacy_path.exists());
    }

    #[test]
    fn summary_names_old_and_new_locations() {
        let l = legacy(r#"{"skipExisting": true, "parallel": 2}"#);
        let doc = migrate(&l);
        let summary = migration_summary(&l, &doc);
        assert!(summary.contains("skipExisting: true -> behavior.skip-installed: always"));
        assert!(summary.contains("parallel: 2 -> performance.parallel-downloads: 2"));
        assert!(summary.contains("(new) safety.auto-backup: true"));
    }

    #[test]
    fn backup_path_appends_v1_suffix() {
        assert_eq!(
            backup_path(Path::new("/home/u/.extmanrc")),
            PathBuf::from("/home/u/.extmanrc.v1.backup")
        );
    }
}
