//! Configuration document shapes.
//!
//! Partial documents (file sections, profile overlays, environment and CLI
//! overrides) are carried as [`SectionMap`]: six optional sections whose
//! fields stay loosely typed until validation. [`ResolvedConfig`] is the
//! fully-typed output and the only shape consumers may act on.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Schema generation tag for new-format documents.
pub const DOCUMENT_VERSION: &str = "2";

/// The six configuration sections of a partial document.
///
/// Each section is a flat mapping of kebab-case field names to values. The
/// schema is one level deep, so merging is per-field within a section and
/// never descends further.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionMap {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behavior: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Map<String, Value>>,
}

/// Section names in merge order. Order is fixed for determinism only.
pub const SECTION_NAMES: &[&str] = &[
    "editor",
    "safety",
    "performance",
    "behavior",
    "network",
    "output",
];

impl SectionMap {
    /// Get a section by name.
    pub fn section(&self, name: &str) -> Option<&Map<String, Value>> {
        match name {
            "editor" => self.editor.as_ref(),
            "safety" => self.safety.as_ref(),
            "performance" => self.performance.as_ref(),
            "behavior" => self.behavior.as_ref(),
            "network" => self.network.as_ref(),
            "output" => self.output.as_ref(),
            _ => None,
        }
    }

    fn section_slot(&mut self, name: &str) -> Option<&mut Option<Map<String, Value>>> {
        match name {
            "editor" => Some(&mut self.editor),
            "safety" => Some(&mut self.safety),
            "performance" => Some(&mut self.performance),
            "behavior" => Some(&mut self.behavior),
            "network" => Some(&mut self.network),
            "output" => Some(&mut self.output),
            _ => None,
        }
    }

    /// Set one field in a named section, creating the section if absent.
    ///
    /// Unknown section names are ignored; callers work from fixed tables
    /// that only name the six sections.
    pub fn set(&mut self, section: &str, field: &str, value: Value) {
        if let Some(slot) = self.section_slot(section) {
            slot.get_or_insert_with(Map::new)
                .insert(field.to_string(), value);
        }
    }

    /// Look up one field in a named section.
    pub fn get(&self, section: &str, field: &str) -> Option<&Value> {
        self.section(section).and_then(|map| map.get(field))
    }

    /// Merge `overlay` over `self`, per field within each section.
    ///
    /// Fields present in the overlay win; fields absent in the overlay keep
    /// the base value. Sections entirely absent from the overlay pass
    /// through unchanged. This never recurses below the section level: a
    /// field's value (even a structured one) is replaced wholesale.
    pub fn merge_over(&mut self, overlay: &SectionMap) {
        for name in SECTION_NAMES {
            let Some(overlay_fields) = overlay.section(name) else {
                continue;
            };
            let slot = self
                .section_slot(name)
                .expect("SECTION_NAMES only holds known sections");
            let base = slot.get_or_insert_with(Map::new);
            for (field, value) in overlay_fields {
                base.insert(field.clone(), value.clone());
            }
        }
    }

    /// True when no section carries any field.
    pub fn is_empty(&self) -> bool {
        SECTION_NAMES
            .iter()
            .all(|name| self.section(name).is_none_or(|map| map.is_empty()))
    }
}

/// A named profile overlay: the same six sections, each optional.
///
/// A profile never carries its own `active-profile` or nested `profiles`;
/// deserializing it through `SectionMap` drops any such keys.
pub type ProfileOverlay = SectionMap;

/// The full new-format document as parsed from disk.
///
/// Unknown top-level keys are ignored for forward compatibility.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConfigDocument {
    /// Schema generation tag; `"2"` for the current format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(flatten)]
    pub sections: SectionMap,

    /// Profile to overlay by default, unless overridden by env or CLI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_profile: Option<String>,

    /// Named partial overlays. BTreeMap keeps serialization deterministic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profiles: Option<BTreeMap<String, ProfileOverlay>>,
}

impl ConfigDocument {
    /// Look up a profile overlay by name.
    pub fn profile(&self, name: &str) -> Option<&ProfileOverlay> {
        self.profiles.as_ref().and_then(|map| map.get(name))
    }
}

/// Preferred editor to install extensions into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorKind {
    /// Detect an installed editor automatically.
    #[default]
    Auto,
    Vscode,
    Vscodium,
    Cursor,
    Windsurf,
}

/// Policy for extensions that are already installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkipInstalled {
    /// Skip without asking.
    Always,
    /// Prompt per extension (default).
    #[default]
    Ask,
    /// Reinstall unconditionally.
    Never,
}

/// How often to look for newer extension versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateCheck {
    Never,
    Daily,
    #[default]
    Weekly,
    Monthly,
}

/// Output rendering for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Terminal color policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

/// Editor selection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EditorConfig {
    pub prefer: EditorKind,
}

/// Safety checks applied before installing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SafetyConfig {
    /// Verify the extension's declared engine range against the editor.
    pub check_compatibility: bool,
    /// Install anyway when the engine range does not match.
    pub allow_mismatch: bool,
    /// Back up an extension before replacing it.
    pub auto_backup: bool,
    /// Verify package checksums after download.
    pub verify_checksums: bool,
}

/// Download and install throughput settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PerformanceConfig {
    pub parallel_downloads: u32,
    pub parallel_installs: u32,
    /// Per-download timeout in seconds.
    pub download_timeout: u32,
}

/// Interactive behavior settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BehaviorConfig {
    pub skip_installed: SkipInstalled,
    pub update_check: UpdateCheck,
    /// Ask once before bulk operations touch more than one extension.
    pub confirm_bulk: bool,
}

/// Network settings. An empty proxy string means a direct connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NetworkConfig {
    pub proxy: String,
    pub retries: u32,
}

/// Output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color: ColorMode,
}

/// The fully-typed, fully-defaulted, validated configuration.
///
/// Produced only by [`crate::config::ConfigLoader::resolve`]; every field is
/// present and within its declared bounds. Treated as immutable for the
/// lifetime of one process run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResolvedConfig {
    pub editor: EditorConfig,
    pub safety: SafetyConfig,
    pub performance: PerformanceConfig,
    pub behavior: BehaviorConfig,
    pub network: NetworkConfig,
    pub output: OutputConfig,
}
