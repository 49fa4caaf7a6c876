//! extman
//!
//! Editor extension manager. This binary wires the CLI to the layered
//! configuration resolver; resolution happens once per run and the result
//! is frozen for the process lifetime.

use anyhow::Result;
use clap::Parser;
use extman::cli::{Cli, Command, migrate};
use extman::config::{ConfigLoader, OutputFormat, ResolvedConfig, default_document_path};
use extman::error::ConfigError;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on --log option
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    match cli.log.as_str() {
        "0" | "off" => {
            // No logging
        }
        "1" | "stdout" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        "2" | "stderr" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        filename => {
            // Log to file (append mode)
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(filename)?;
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    // One loader per process; commands that need the resolved config call
    // resolve exactly once.
    let loader = ConfigLoader::from_process();
    let overrides = cli.overrides();

    match cli.command {
        Some(Command::Validate { path }) => run_validate(&loader, &path),
        Some(Command::Init { path, force }) => run_init(path, force),
        Some(Command::Migrate(args)) => {
            migrate::run_migrate(&loader, &args)?;
            Ok(())
        }
        Some(Command::Show) | None => {
            let config = match loader.resolve(&overrides) {
                Ok(config) => config,
                Err(err) => return Err(report(err)),
            };
            run_show(&config)
        }
    }
}

/// Turn a resolution failure into one aggregated user-facing message.
fn report(err: ConfigError) -> anyhow::Error {
    if let ConfigError::Validation(fields) = &err {
        let mut message = String::from("configuration is invalid:\n");
        for field in fields {
            message.push_str(&format!("  {field}\n"));
        }
        return anyhow::anyhow!(message.trim_end().to_string());
    }
    err.into()
}

/// Print the resolved effective configuration.
fn run_show(config: &ResolvedConfig) -> Result<()> {
    match config.output.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
        OutputFormat::Text => print!("{}", serde_yaml::to_string(config)?),
    }
    Ok(())
}

/// Validate a document and report every violation, one per line.
fn run_validate(loader: &ConfigLoader, path: &Path) -> Result<()> {
    let errors = match loader.validate_file(path) {
        Ok(errors) => errors,
        Err(err) => return Err(report(err)),
    };
    if errors.is_empty() {
        println!("{}: valid", path.display());
        return Ok(());
    }
    for error in &errors {
        println!("{error}");
    }
    anyhow::bail!("{}: {} problem(s) found", path.display(), errors.len());
}

/// Sample document written by `extman init`.
const SAMPLE_CONFIG: &str = r#"# extman configuration
version: "2"

editor:
  # auto, vscode, vscodium, cursor, windsurf
  prefer: auto

safety:
  check-compatibility: true
  allow-mismatch: false
  auto-backup: true
  verify-checksums: true

performance:
  parallel-downloads: 3
  parallel-installs: 1
  download-timeout: 60

behavior:
  # always, ask, never
  skip-installed: ask
  # never, daily, weekly, monthly
  update-check: weekly
  confirm-bulk: true

network:
  proxy: ""
  retries: 2

output:
  # text, json
  format: text
  # auto, always, never
  color: auto

# Optional named overlays, activated with active-profile, EXTMAN_PROFILE,
# or --profile.
# profiles:
#   ci:
#     performance:
#       parallel-downloads: 1
#     output:
#       format: json
"#;

/// Write a commented sample configuration file.
fn run_init(path: Option<PathBuf>, force: bool) -> Result<()> {
    let target = path.unwrap_or_else(default_document_path);
    if target.exists() && !force {
        return Err(ConfigError::UnsafeWrite { path: target }.into());
    }
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&target, SAMPLE_CONFIG)?;
    info!(path = %target.display(), "wrote sample configuration");
    println!("Wrote {}", target.display());
    Ok(())
}
