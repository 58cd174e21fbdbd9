//! # Update-Modified Command Implementation
//!
//! Marks a hand-edited class definition as changed so the next `install`
//! picks it up: stamps `modified`, renumbers attribute placements and
//! refreshes the attribute identifier comments. `--backfill-locales` also
//! fills every serialized field with the configured locales.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use classpkg::clock::{Clock, SystemClock};
use classpkg::definition::ClassDocument;
use classpkg::output::emoji;
use classpkg::suggestions;

use super::Environment;

/// Stamp a class definition as modified now and tidy it up
#[derive(Args, Debug)]
pub struct UpdateModifiedArgs {
    /// Class definition file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Unix timestamp to write instead of the current time
    #[arg(long, value_name = "SECONDS")]
    pub timestamp: Option<i64>,

    /// Fill serialized fields for every configured locale
    #[arg(long)]
    pub backfill_locales: bool,
}

/// Execute the `update-modified` command.
pub fn execute(args: UpdateModifiedArgs, env: &Environment) -> Result<ExitCode> {
    if !args.file.is_file() {
        return Err(suggestions::definition_not_found(&args.file));
    }

    let mut document = ClassDocument::open(&args.file)?;
    let timestamp = args.timestamp.unwrap_or_else(|| SystemClock.now());
    let stamped = document.stamp_modified(timestamp)?;
    if !stamped {
        log::warn!(
            "{} has no remote/modified element, timestamp not written",
            args.file.display()
        );
    }
    document.normalize_placement()?;
    document.annotate_attributes()?;
    if args.backfill_locales {
        let filled = document.backfill_locales(&env.settings.locale_provider())?;
        log::info!("Back-filled {} serialized field(s)", filled);
    }
    document.save()?;

    if stamped {
        println!(
            "{} Updated {} (modified {})",
            emoji(&env.out, "✏️", "[OK]"),
            args.file.display(),
            timestamp
        );
    } else {
        println!(
            "{} Updated {} (no modified stamp)",
            emoji(&env.out, "✏️", "[OK]"),
            args.file.display()
        );
    }
    Ok(ExitCode::SUCCESS)
}
