//! # Update-Status Command Implementation
//!
//! Lists the packages that contain at least one class definition newer than
//! the installed class. Folders without a `package.xml` are ignored.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use classpkg::manifest::Package;

use super::{package_folders, Environment};

/// List packages whose classes are newer than the installed ones
#[derive(Args, Debug)]
pub struct UpdateStatusArgs {
    /// Glob pattern of the package folders to check
    #[arg(value_name = "PATTERN")]
    pub pattern: String,
}

/// Execute the `update-status` command.
pub fn execute(args: UpdateStatusArgs, env: &Environment) -> Result<ExitCode> {
    let folders = package_folders(&args.pattern)?;
    let file = env.open_store()?;

    let mut stale = Vec::new();
    for folder in folders.iter().filter(|f| Package::is_package(f)) {
        let package = Package::load(folder)?;
        if package.needs_update(file.store())? {
            stale.push(package.name().to_string());
        }
    }

    if stale.is_empty() {
        println!("Packages are up to date.");
    } else {
        println!("Packages needing update:");
        for name in &stale {
            println!("  {}", name);
        }
    }
    Ok(ExitCode::SUCCESS)
}
