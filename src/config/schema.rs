//! Declarative field schema: types, bounds, and compiled-in defaults.
//!
//! Every configuration field is declared once in [`SCHEMA`]. The table
//! drives default filling, validation, and environment-variable coercion, so
//! the three can never disagree about a field's type.

use super::types::SectionMap;
use crate::error::FieldError;
use serde_json::Value;

/// Declared type of a configuration field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Str,
    Bool,
    /// Integer with inclusive bounds.
    Int { min: i64, max: i64 },
    /// Closed set of allowed string values (case-sensitive).
    Enum(&'static [&'static str]),
}

/// Const-friendly default value for a field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    Str(&'static str),
    Bool(bool),
    Int(i64),
}

impl DefaultValue {
    pub fn to_value(self) -> Value {
        match self {
            DefaultValue::Str(s) => Value::String(s.to_string()),
            DefaultValue::Bool(b) => Value::Bool(b),
            DefaultValue::Int(i) => Value::from(i),
        }
    }
}

/// One field declaration: location, type, and default.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub section: &'static str,
    pub field: &'static str,
    pub kind: FieldKind,
    pub default: DefaultValue,
}

impl FieldSpec {
    /// Dot-separated path for error reporting.
    pub fn path(&self) -> String {
        format!("{}.{}", self.section, self.field)
    }
}

pub const EDITOR_KINDS: &[&str] = &["auto", "vscode", "vscodium", "cursor", "windsurf"];
pub const SKIP_INSTALLED_POLICIES: &[&str] = &["always", "ask", "never"];
pub const UPDATE_CADENCES: &[&str] = &["never", "daily", "weekly", "monthly"];
pub const OUTPUT_FORMATS: &[&str] = &["text", "json"];
pub const COLOR_MODES: &[&str] = &["auto", "always", "never"];

/// The complete field schema. One entry per field, grouped by section.
pub const SCHEMA: &[FieldSpec] = &[
    FieldSpec {
        section: "editor",
        field: "prefer",
        kind: FieldKind::Enum(EDITOR_KINDS),
        default: DefaultValue::Str("auto"),
    },
    FieldSpec {
        section: "safety",
        field: "check-compatibility",
        kind: FieldKind::Bool,
        default: DefaultValue::Bool(true),
    },
    FieldSpec {
        section: "safety",
        field: "allow-mismatch",
        kind: FieldKind::Bool,
        default: DefaultValue::Bool(false),
    },
    FieldSpec {
        section: "safety",
        field: "auto-backup",
        kind: FieldKind::Bool,
        default: DefaultValue::Bool(true),
    },
    FieldSpec {
        section: "safety",
        field: "verify-checksums",
        kind: FieldKind::Bool,
        default: DefaultValue::Bool(true),
    },
    FieldSpec {
        section: "performance",
        field: "parallel-downloads",
        kind: FieldKind::Int { min: 1, max: 16 },
        default: DefaultValue::Int(3),
    },
    FieldSpec {
        section: "performance",
        field: "parallel-installs",
        kind: FieldKind::Int { min: 1, max: 8 },
        default: DefaultValue::Int(1),
    },
    FieldSpec {
        section: "performance",
        field: "download-timeout",
        kind: FieldKind::Int { min: 5, max: 600 },
        default: DefaultValue::Int(60),
    },
    FieldSpec {
        section: "behavior",
        field: "skip-installed",
        kind: FieldKind::Enum(SKIP_INSTALLED_POLICIES),
        default: DefaultValue::Str("ask"),
    },
    FieldSpec {
        section: "behavior",
        field: "update-check",
        kind: FieldKind::Enum(UPDATE_CADENCES),
        default: DefaultValue::Str("weekly"),
    },
    FieldSpec {
        section: "behavior",
        field: "confirm-bulk",
        kind: FieldKind::Bool,
        default: DefaultValue::Bool(true),
    },
    FieldSpec {
        section: "network",
        field: "proxy",
        kind: FieldKind::Str,
        default: DefaultValue::Str(""),
    },
    FieldSpec {
        section: "network",
        field: "retries",
        kind: FieldKind::Int { min: 0, max: 10 },
        default: DefaultValue::Int(2),
    },
    FieldSpec {
        section: "output",
        field: "format",
        kind: FieldKind::Enum(OUTPUT_FORMATS),
        default: DefaultValue::Str("text"),
    },
    FieldSpec {
        section: "output",
        field: "color",
        kind: FieldKind::Enum(COLOR_MODES),
        default: DefaultValue::Str("auto"),
    },
];

/// Find the spec for a section/field pair.
pub fn find_spec(section: &str, field: &str) -> Option<&'static FieldSpec> {
    SCHEMA
        .iter()
        .find(|spec| spec.section == section && spec.field == field)
}

/// All sections populated with their compiled-in defaults.
pub fn default_sections() -> SectionMap {
    let mut sections = SectionMap::default();
    for spec in SCHEMA {
        sections.set(spec.section, spec.field, spec.default.to_value());
    }
    sections
}

/// Validate every known field present in `sections`.
///
/// Validation is total: every violation is collected, none stops the pass.
/// Unknown fields and unknown sections are ignored for forward
/// compatibility. Returns an empty list when the document is valid.
pub fn validate(sections: &SectionMap) -> Vec<FieldError> {
    let mut errors = Vec::new();
    for spec in SCHEMA {
        let Some(value) = sections.get(spec.section, spec.field) else {
            continue;
        };
        if let Some(message) = check_value(spec, value) {
            errors.push(FieldError::new(spec.path(), message));
        }
    }
    errors
}

/// Check one value against its spec, returning a reason when it violates.
fn check_value(spec: &FieldSpec, value: &Value) -> Option<String> {
    match spec.kind {
        FieldKind::Str => match value {
            Value::String(_) => None,
            other => Some(format!("expected a string, got {}", type_name(other))),
        },
        FieldKind::Bool => match value {
            Value::Bool(_) => None,
            other => Some(format!("expected a boolean, got {}", type_name(other))),
        },
        FieldKind::Int { min, max } => match value.as_i64() {
            Some(n) if n < min => Some(format!("must be at least {min}, got {n}")),
            Some(n) if n > max => Some(format!("must be at most {max}, got {n}")),
            Some(_) => None,
            None => Some(format!("expected an integer, got {}", type_name(value))),
        },
        FieldKind::Enum(allowed) => match value {
            Value::String(s) if allowed.contains(&s.as_str()) => None,
            Value::String(s) => Some(format!(
                "must be one of [{}], got {s:?}",
                allowed.join(", ")
            )),
            other => Some(format!("expected a string, got {}", type_name(other))),
        },
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a mapping",
    }
}
