//! Configuration loader with five-stage precedence merging.
//!
//! Stages, lowest to highest: compiled-in defaults, the on-disk document
//! (with its active profile overlaid), environment variables, and explicit
//! caller overrides. Each stage is a per-field merge of a partial over the
//! accumulator; the merged result is validated once at the end.

use super::env::{self, ENV_PROFILE};
use super::profile::apply_profile;
use super::schema;
use super::types::{ConfigDocument, ResolvedConfig, SectionMap};
use crate::error::{ConfigError, ConfigResult, FieldError};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Candidate filenames within each search directory, tried in order.
/// Newer YAML names first, the legacy JSON name last.
pub const CONFIG_FILENAMES: &[&str] = &["extman.yaml", "extman.yml", "extman.json"];

/// Explicit caller-supplied overrides, highest precedence.
///
/// Built from parsed CLI flags; the shape of `sections` is identical to a
/// profile overlay.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub sections: SectionMap,
    /// Profile selection, overriding both `EXTMAN_PROFILE` and the
    /// document's `active-profile`.
    pub profile: Option<String>,
    /// Explicit document path, bypassing search-path discovery.
    pub config_path: Option<PathBuf>,
}

/// Configuration resolver.
///
/// Constructed explicitly once per process and passed to consumers; there is
/// no module-level instance, so tests build independent loaders with their
/// own directories and environment snapshots.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    search_dirs: Vec<PathBuf>,
    env: HashMap<String, String>,
}

impl ConfigLoader {
    /// Loader over explicit search directories and an environment snapshot.
    pub fn new(search_dirs: Vec<PathBuf>, env: HashMap<String, String>) -> Self {
        Self { search_dirs, env }
    }

    /// Loader for a real process run: standard search directories plus a
    /// snapshot of the process environment.
    pub fn from_process() -> Self {
        Self::new(default_search_dirs(), env::snapshot_from_process())
    }

    /// Directories searched for a document, in order.
    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    /// Resolve the effective configuration.
    ///
    /// Missing sources degrade silently; a present-but-unparseable document
    /// and any field violation in the final merge are errors. The returned
    /// value is fully defaulted and validated.
    pub fn resolve(&self, overrides: &Overrides) -> ConfigResult<ResolvedConfig> {
        // Stage 1: defaults. Every schema field is present from here on.
        let mut sections = schema::default_sections();

        // Stage 2: the on-disk document, with its profile overlay applied.
        if let Some((path, document)) = self.load_document(overrides)? {
            debug!(path = %path.display(), "loaded configuration document");
            let profile_name = overrides
                .profile
                .as_deref()
                .or_else(|| self.env.get(ENV_PROFILE).map(String::as_str))
                .or(document.active_profile.as_deref());
            // Stage 3 folds into stage 2: the overlay applies against the
            // document before the document merges over the defaults.
            let file_sections = apply_profile(&document, profile_name);
            sections.merge_over(&file_sections);
        }

        // Stage 4: environment overlay. Coercion failures are collected,
        // not skipped, so a typo'd variable cannot silently vanish.
        let mut errors = env::apply_env(&mut sections, &self.env);

        // Stage 5: explicit caller overrides always win.
        sections.merge_over(&overrides.sections);

        errors.extend(schema::validate(&sections));
        if !errors.is_empty() {
            return Err(ConfigError::Validation(errors));
        }

        materialize(&sections)
    }

    /// Validation API: check the document at `path` as it would resolve,
    /// with its own `active-profile` applied over the defaults. Returns
    /// every violation found, in schema order.
    pub fn validate_file(&self, path: &Path) -> ConfigResult<Vec<FieldError>> {
        let document = read_document(path)?;
        let mut sections = schema::default_sections();
        let file_sections = apply_profile(&document, document.active_profile.as_deref());
        sections.merge_over(&file_sections);
        Ok(schema::validate(&sections))
    }

    /// Find and parse the document, or `None` when no source exists.
    fn load_document(&self, overrides: &Overrides) -> ConfigResult<Option<(PathBuf, ConfigDocument)>> {
        if let Some(path) = &overrides.config_path {
            // An explicit path the user asked for must exist. Malformed is
            // reserved for files that parse badly, so a missing one is I/O.
            if !path.exists() {
                return Err(ConfigError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("configuration file not found: {}", path.display()),
                )));
            }
            return Ok(Some((path.clone(), read_document(path)?)));
        }

        match self.discover() {
            Some(path) => {
                let document = read_document(&path)?;
                Ok(Some((path, document)))
            }
            None => {
                debug!("no configuration document found, using defaults");
                Ok(None)
            }
        }
    }

    /// First existing candidate path, in search order.
    pub fn discover(&self) -> Option<PathBuf> {
        for dir in &self.search_dirs {
            for filename in CONFIG_FILENAMES {
                let candidate = dir.join(filename);
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
        }
        None
    }
}

/// Standard search directories: the working directory, the dedicated config
/// directory, the legacy dotted directory, then the home directory itself.
pub fn default_search_dirs() -> Vec<PathBuf> {
    let mut dirs_list = vec![PathBuf::from(".")];
    if let Some(config_dir) = dirs::config_dir() {
        dirs_list.push(config_dir.join("extman"));
    }
    if let Some(home) = dirs::home_dir() {
        dirs_list.push(home.join(".extman"));
        dirs_list.push(home);
    }
    dirs_list
}

/// Default location for a newly written document.
pub fn default_document_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("extman"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("extman.yaml")
}

/// Read and parse one document. The file is read fully into memory in one
/// scoped acquisition before any merging begins, so a concurrent writer
/// cannot produce a torn read within this resolution.
fn read_document(path: &Path) -> ConfigResult<ConfigDocument> {
    let content = std::fs::read_to_string(path)?;
    let document = if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&content).map_err(|err| ConfigError::Malformed {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?
    } else {
        serde_yaml::from_str(&content).map_err(|err| ConfigError::Malformed {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?
    };
    Ok(document)
}

/// Deserialize validated sections into the typed configuration.
///
/// Only called after `schema::validate` returned no errors. A failure here
/// means the schema table and the typed structs disagree, which is a bug,
/// not a user input problem; it is still surfaced as a field error rather
/// than a panic.
fn materialize(sections: &SectionMap) -> ConfigResult<ResolvedConfig> {
    let value = serde_json::to_value(sections).unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|err| {
        warn!(error = %err, "schema table and typed config disagree");
        ConfigError::Validation(vec![FieldError::new("<config>", err.to_string())])
    })
}
