//! Environment variable overlay.
//!
//! A fixed table maps `EXTMAN_*` variables to configuration fields. Values
//! are coerced to the field's declared schema type; a value that does not
//! parse is a field error, never a silent skip.

use super::schema::{self, FieldKind};
use super::types::SectionMap;
use crate::error::FieldError;
use serde_json::Value;
use std::collections::HashMap;

/// Selects the active profile; handled by the resolver, not the overlay.
pub const ENV_PROFILE: &str = "EXTMAN_PROFILE";

/// Fixed variable table: (variable, section, field). One variable per field.
pub const ENV_VARS: &[(&str, &str, &str)] = &[
    ("EXTMAN_EDITOR", "editor", "prefer"),
    ("EXTMAN_CHECK_COMPATIBILITY", "safety", "check-compatibility"),
    ("EXTMAN_ALLOW_MISMATCH", "safety", "allow-mismatch"),
    ("EXTMAN_AUTO_BACKUP", "safety", "auto-backup"),
    ("EXTMAN_VERIFY_CHECKSUMS", "safety", "verify-checksums"),
    ("EXTMAN_PARALLEL_DOWNLOADS", "performance", "parallel-downloads"),
    ("EXTMAN_PARALLEL_INSTALLS", "performance", "parallel-installs"),
    ("EXTMAN_DOWNLOAD_TIMEOUT", "performance", "download-timeout"),
    ("EXTMAN_SKIP_INSTALLED", "behavior", "skip-installed"),
    ("EXTMAN_UPDATE_CHECK", "behavior", "update-check"),
    ("EXTMAN_CONFIRM_BULK", "behavior", "confirm-bulk"),
    ("EXTMAN_PROXY", "network", "proxy"),
    ("EXTMAN_RETRIES", "network", "retries"),
    ("EXTMAN_OUTPUT_FORMAT", "output", "format"),
    ("EXTMAN_COLOR", "output", "color"),
];

const TRUTHY: &[&str] = &["1", "true", "yes", "on"];
const FALSY: &[&str] = &["0", "false", "no", "off"];

/// Snapshot the process environment, restricted to the variables in the
/// table (plus [`ENV_PROFILE`]).
pub fn snapshot_from_process() -> HashMap<String, String> {
    let mut snapshot = HashMap::new();
    for (var, _, _) in ENV_VARS {
        if let Ok(value) = std::env::var(var) {
            snapshot.insert((*var).to_string(), value);
        }
    }
    if let Ok(value) = std::env::var(ENV_PROFILE) {
        snapshot.insert(ENV_PROFILE.to_string(), value);
    }
    snapshot
}

/// Apply every table entry present in `env` onto `sections`.
///
/// Absent variables leave prior values untouched. Returns the coercion
/// failures; the overlay still applies every value that did parse, so the
/// caller reports all problems in one pass.
pub fn apply_env(sections: &mut SectionMap, env: &HashMap<String, String>) -> Vec<FieldError> {
    let mut errors = Vec::new();
    for (var, section, field) in ENV_VARS {
        let Some(raw) = env.get(*var) else {
            continue;
        };
        let spec = schema::find_spec(section, field)
            .expect("every ENV_VARS entry names a schema field");
        match coerce(spec.kind, raw) {
            Ok(value) => sections.set(section, field, value),
            Err(message) => {
                errors.push(FieldError::new(spec.path(), format!("{var}: {message}")));
            }
        }
    }
    errors
}

/// Parse a raw environment string according to the declared field type.
fn coerce(kind: FieldKind, raw: &str) -> Result<Value, String> {
    match kind {
        FieldKind::Str => Ok(Value::String(raw.to_string())),
        FieldKind::Bool => {
            if TRUTHY.contains(&raw) {
                Ok(Value::Bool(true))
            } else if FALSY.contains(&raw) {
                Ok(Value::Bool(false))
            } else {
                Err(format!("{raw:?} is not a boolean (use one of 1/true/yes/on or 0/false/no/off)"))
            }
        }
        FieldKind::Int { .. } => raw
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| format!("{raw:?} is not an integer")),
        // Enum membership is case-sensitive; range checking happens in the
        // validator so the error message is the same for every source.
        FieldKind::Enum(_) => Ok(Value::String(raw.to_string())),
    }
}
