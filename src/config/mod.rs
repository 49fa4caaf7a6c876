//! Layered configuration resolution.
//!
//! One authoritative [`ResolvedConfig`] is produced per process run from
//! five sources, lowest to highest precedence:
//! 1. **Defaults** - the compiled-in schema defaults
//! 2. **Document** - the first `extman.yaml`/`extman.yml`/`extman.json`
//!    found on the search path (with the active profile overlaid)
//! 3. **Profile** - a named partial overlay from the document's `profiles`
//! 4. **Environment** - `EXTMAN_*` variables
//! 5. **Overrides** - explicit caller-supplied values (CLI flags)
//!
//! ## Merge strategy
//! Partial documents merge field-by-field within each of the six sections
//! (`editor`, `safety`, `performance`, `behavior`, `network`, `output`);
//! a stage never replaces a section wholesale. The merged result is
//! validated in one pass that reports every violation.
//!
//! Legacy flat v1 documents are upgraded once by [`migrate`], ahead of
//! normal resolution.

pub mod env;
pub mod loader;
pub mod migrate;
pub mod profile;
pub mod schema;
pub mod types;

pub use loader::{ConfigLoader, Overrides, default_document_path, default_search_dirs};
pub use migrate::{LegacyConfig, MigrateOptions, MigrateOutcome, auto_migrate};
pub use profile::apply_profile;
pub use types::*;
