//! Migration command for upgrading a legacy v1 configuration file.

use crate::config::{ConfigLoader, MigrateOptions, MigrateOutcome, auto_migrate};
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the migrate command.
#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Perform migration without prompting for confirmation.
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Show what would be migrated without making changes.
    #[arg(long)]
    pub dry_run: bool,

    /// Legacy source file (default: standard legacy locations)
    #[arg(long)]
    pub from: Option<PathBuf>,

    /// Target file for the new document (default: standard config location)
    #[arg(long)]
    pub to: Option<PathBuf>,
}

/// Run the migration command. Returns true when a new document was written.
pub fn run_migrate(loader: &ConfigLoader, args: &MigrateArgs) -> Result<bool> {
    let options = MigrateOptions {
        dry_run: args.dry_run,
        target: args.to.clone(),
        legacy_paths: args.from.iter().cloned().collect(),
    };

    // Dry-run pass first so the plan is shown before any confirmation.
    let preview = auto_migrate(
        loader,
        &MigrateOptions {
            dry_run: true,
            ..options.clone()
        },
    )?;

    match preview {
        MigrateOutcome::NoLegacySource => {
            println!("No migration needed: no legacy configuration found.");
            return Ok(false);
        }
        MigrateOutcome::AlreadyMigrated { existing } => {
            println!(
                "No migration needed: '{}' already exists.",
                existing.display()
            );
            return Ok(false);
        }
        MigrateOutcome::DryRun { source, summary } => {
            println!("Legacy configuration: {}", source.display());
            println!("{summary}");
            println!();
        }
        MigrateOutcome::Performed { .. } => unreachable!("preview pass is always a dry run"),
    }

    if args.dry_run {
        println!("Dry run: no changes made. Migration not performed.");
        return Ok(false);
    }

    // Confirm unless --yes
    if !args.yes && !confirm()? {
        println!("Migration cancelled.");
        return Ok(false);
    }

    match auto_migrate(loader, &options)? {
        MigrateOutcome::Performed {
            source,
            target,
            backup,
            ..
        } => {
            println!("Migration complete!");
            println!("  New config:  {}", target.display());
            println!("  Backup:      {}", backup.display());
            println!("  Legacy file: {} (left in place)", source.display());
            Ok(true)
        }
        // The source or target changed between the preview and the write.
        other => {
            println!("Migration not performed ({other:?}).");
            Ok(false)
        }
    }
}

fn confirm() -> Result<bool> {
    use std::io::Write;
    print!("Write the new configuration? [y/N] ");
    std::io::stdout().flush()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}
