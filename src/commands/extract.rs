//! # Extract Command Implementation
//!
//! Unpacks binary packages (`.ezpkg`) next to the archive and normalizes
//! the class definitions they contain: serialized fields become JSON,
//! `created`/`modified` are stamped with the current time, placements are
//! renumbered and every attribute gets an identifier comment.
//!
//! ```bash
//! classpkg extract 'packages/*.ezpkg'
//! ```

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use classpkg::archive::{self, TarGzExtractor};
use classpkg::clock::SystemClock;
use classpkg::error::Error;
use classpkg::output::emoji;
use classpkg::suggestions;

use super::Environment;

/// Unpack binary packages and normalize their class definitions
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Glob pattern of the `.ezpkg` files to unpack
    #[arg(value_name = "PATTERN")]
    pub pattern: String,
}

/// Execute the `extract` command.
pub fn execute(args: ExtractArgs, env: &Environment) -> Result<ExitCode> {
    let report = match archive::extract_and_transform(&args.pattern, &TarGzExtractor, &SystemClock) {
        Ok(report) => report,
        Err(Error::Glob(err)) => return Err(suggestions::invalid_glob(&args.pattern, &err)),
        Err(Error::NotFound { what, .. }) if what == "Files matching" => {
            return Err(suggestions::no_archives(&args.pattern))
        }
        Err(err) => return Err(err.into()),
    };

    if report.extracted.is_empty() && report.failed.is_empty() {
        println!("No .{} files match {}", archive::PACKAGE_EXTENSION, args.pattern);
    }
    for package in &report.extracted {
        println!(
            "{} Extracted {} into {} ({} class definition(s))",
            emoji(&env.out, "📦", "[OK]"),
            package.archive.display(),
            package.folder.display(),
            package.classes
        );
    }
    for failure in &report.failed {
        println!(
            "{} Failed extracting {}: {}",
            emoji(&env.out, "❌", "[FAIL]"),
            failure.archive.display(),
            failure.error
        );
    }

    if report.failed.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
