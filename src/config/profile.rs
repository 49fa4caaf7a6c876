//! Profile overlays: named partial documents a user can switch between.

use super::types::{ConfigDocument, SectionMap};
use tracing::debug;

/// Apply the named profile's overlay to the document's base sections.
///
/// A missing name or a name absent from the document's profile mapping is a
/// silent no-op returning the base sections unchanged; profiles are optional
/// conveniences, so a dangling reference is not an error. Merging is
/// per-field within each of the six sections.
pub fn apply_profile(document: &ConfigDocument, name: Option<&str>) -> SectionMap {
    let mut sections = document.sections.clone();
    let Some(name) = name else {
        return sections;
    };
    match document.profile(name) {
        Some(overlay) => {
            debug!(profile = name, "applying profile overlay");
            sections.merge_over(overlay);
        }
        None => {
            debug!(profile = name, "profile not defined, using base sections");
        }
    }
    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document_with_ci_profile() -> ConfigDocument {
        serde_yaml::from_str(
            r#"
version: "2"
performance:
  parallel-downloads: 3
  download-timeout: 120
profiles:
  ci:
    performance:
      parallel-downloads: 1
    output:
      format: json
"#,
        )
        .unwrap()
    }

    #[test]
    fn named_profile_overrides_per_field() {
        let doc = document_with_ci_profile();
        let sections = apply_profile(&doc, Some("ci"));
        assert_eq!(
            sections.get("performance", "parallel-downloads").unwrap(),
            1
        );
        // Field absent from the overlay keeps the base value.
        assert_eq!(sections.get("performance", "download-timeout").unwrap(), 120);
        assert_eq!(sections.get("output", "format").unwrap(), "json");
    }

    #[test]
    fn nonexistent_profile_is_a_silent_no_op() {
        let doc = document_with_ci_profile();
        let sections = apply_profile(&doc, Some("laptop"));
        assert_eq!(sections, doc.sections);
    }

    #[test]
    fn no_profile_name_returns_base_sections() {
        let doc = document_with_ci_profile();
        assert_eq!(apply_profile(&doc, None), doc.sections);
    }

    #[test]
    fn applying_a_profile_twice_matches_applying_it_once() {
        let doc = document_with_ci_profile();
        let once = apply_profile(&doc, Some("ci"));

        let mut doc_after = doc.clone();
        doc_after.sections = once.clone();
        let twice = apply_profile(&doc_after, Some("ci"));
        assert_eq!(once, twice);
    }
}
