//! # Export Command Implementation
//!
//! Writes an installed class as `class-<identifier>.xml` so a store can
//! seed a package repository.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use classpkg::definition::export_class;
use classpkg::output::emoji;
use classpkg::store::ClassStore;
use classpkg::suggestions;

use super::Environment;

/// Write an installed class as a class definition file
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Identifier of the installed class
    #[arg(value_name = "IDENTIFIER")]
    pub identifier: String,

    /// Folder to write the definition to
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output: PathBuf,
}

/// Execute the `export` command.
pub fn execute(args: ExportArgs, env: &Environment) -> Result<ExitCode> {
    let file = env.open_store()?;
    let store = file.store();

    let class = match store.class_by_identifier(&args.identifier)? {
        Some(class) => class,
        None => {
            let installed = Environment::installed_identifiers(store)?;
            let installed: Vec<&str> = installed.iter().map(String::as_str).collect();
            return Err(suggestions::class_not_found(&args.identifier, &installed));
        }
    };

    fs::create_dir_all(&args.output)?;
    let document = export_class(store, &class, &args.output)?;
    document.save()?;

    println!(
        "{} Wrote {}",
        emoji(&env.out, "📝", "[OK]"),
        document.path().display()
    );
    Ok(ExitCode::SUCCESS)
}
