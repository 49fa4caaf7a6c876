//! CLI definitions for extman.
//!
//! The global flags feed the highest-precedence override stage of the
//! resolver; subcommands cover inspection, validation, sample-config
//! creation, and the one-time v1 migration.

pub mod migrate;

use crate::config::Overrides;
use clap::{Parser, Subcommand, ValueEnum};
use migrate::MigrateArgs;
use serde_json::json;
use std::path::PathBuf;

/// Editor choices exposed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EditorArg {
    Auto,
    Vscode,
    Vscodium,
    Cursor,
    Windsurf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SkipInstalledArg {
    Always,
    Ask,
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatArg {
    Text,
    Json,
}

/// Editor extension manager
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (bypasses the search path)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Configuration profile to activate
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    /// Preferred editor (overrides config)
    #[arg(long, value_enum, global = true)]
    pub editor: Option<EditorArg>,

    /// Parallel download count (overrides config)
    #[arg(long, global = true)]
    pub parallel_downloads: Option<u32>,

    /// Policy for already-installed extensions (overrides config)
    #[arg(long, value_enum, global = true)]
    pub skip_installed: Option<SkipInstalledArg>,

    /// Output format (overrides config)
    #[arg(long, value_enum, global = true)]
    pub output_format: Option<OutputFormatArg>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the resolved effective configuration (default)
    Show,

    /// Validate a configuration file and report every problem
    Validate {
        /// Path to the document to check
        path: PathBuf,
    },

    /// Write a commented sample configuration file
    Init {
        /// Target path (default: the standard config location)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Migrate a legacy v1 configuration to the current format
    Migrate(MigrateArgs),
}

impl Cli {
    /// Build the caller-override partial from the parsed flags.
    pub fn overrides(&self) -> Overrides {
        let mut overrides = Overrides {
            profile: self.profile.clone(),
            config_path: self.config.clone(),
            ..Overrides::default()
        };
        if let Some(editor) = self.editor {
            overrides
                .sections
                .set("editor", "prefer", json!(value_enum_name(editor)));
        }
        if let Some(n) = self.parallel_downloads {
            overrides
                .sections
                .set("performance", "parallel-downloads", json!(n));
        }
        if let Some(policy) = self.skip_installed {
            overrides
                .sections
                .set("behavior", "skip-installed", json!(value_enum_name(policy)));
        }
        if let Some(format) = self.output_format {
            overrides
                .sections
                .set("output", "format", json!(value_enum_name(format)));
        }
        overrides
    }
}

/// Lowercase name of a ValueEnum variant, matching the schema's value sets.
fn value_enum_name<T: ValueEnum>(value: T) -> String {
    value
        .to_possible_value()
        .map(|v| v.get_name().to_string())
        .unwrap_or_default()
}
