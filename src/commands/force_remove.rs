//! # Force-Remove-Class Command Implementation
//!
//! Deletes a class together with every content object of the class,
//! without asking. `--dry-run` only reports what would be deleted.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use classpkg::installer::force_remove_class;
use classpkg::output::emoji;
use classpkg::store::ClassStore;
use classpkg::suggestions;

use super::Environment;

/// Delete a class and all of its content objects
#[derive(Args, Debug)]
pub struct ForceRemoveArgs {
    /// Identifier of the class to remove
    #[arg(value_name = "IDENTIFIER")]
    pub identifier: String,

    /// Report what would be removed without removing anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Execute the `force-remove-class` command.
pub fn execute(args: ForceRemoveArgs, env: &Environment) -> Result<ExitCode> {
    let mut file = env.open_store()?;

    if !args.dry_run && file.store().class_by_identifier(&args.identifier)?.is_none() {
        let installed = Environment::installed_identifiers(file.store())?;
        let installed: Vec<&str> = installed.iter().map(String::as_str).collect();
        return Err(suggestions::class_not_found(&args.identifier, &installed));
    }

    let report = force_remove_class(file.store_mut(), &args.identifier, args.dry_run)?;
    println!(
        "Class {}: {}",
        report.identifier,
        if report.exists { "exists" } else { "not installed" }
    );
    println!("Content objects: {}", report.objects);

    if report.removed {
        file.save()?;
        println!(
            "{} Removed class {} and {} object(s)",
            emoji(&env.out, "🗑️", "[OK]"),
            report.identifier,
            report.objects
        );
    } else {
        println!("Dry run, nothing removed.");
    }
    Ok(ExitCode::SUCCESS)
}
