//! # Diff Command Implementation
//!
//! Compares a package repository with the installed classes and prints one
//! `<status>\t<identifier>` line per difference, sorted by identifier:
//!
//! - `new`: defined in the repository, not installed
//! - `removed`: installed, no longer defined in the repository
//! - `modified`: defined in a package with a newer version than installed
//!
//! The exit code is 1 when there are differences, so scripts can react to
//! them, unless `--exit-zero` is given. The command never changes the store.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use classpkg::output::status_label;
use classpkg::repository::Repository;
use classpkg::status::diff_status;

use super::Environment;

/// Compare a package repository with the installed classes
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Repository folder holding one package per subfolder
    #[arg(value_name = "REPOSITORY")]
    pub repository: PathBuf,

    /// Exit with 0 even when differences are found
    #[arg(long)]
    pub exit_zero: bool,
}

/// Execute the `diff` command.
pub fn execute(args: DiffArgs, env: &Environment) -> Result<ExitCode> {
    let repository = Repository::open(&args.repository)?;
    let file = env.open_store()?;

    let report = diff_status(&repository, file.store())?;
    if report.is_empty() {
        println!("Installed classes match the repository.");
        return Ok(ExitCode::SUCCESS);
    }

    for (identifier, status) in &report {
        println!("{}\t{}", status_label(&env.out, *status), identifier);
    }

    if args.exit_zero {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(1))
    }
}
