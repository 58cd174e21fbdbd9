//! # Change-Object Command Implementation
//!
//! Moves a content object to another class. Object attributes are matched
//! by identifier: matching data is kept, missing attributes get empty
//! storage and attributes the new class lacks are dropped.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use classpkg::error::Error;
use classpkg::merge::change_object_class;
use classpkg::store::ObjectId;
use classpkg::suggestions;

use super::Environment;

/// Move a content object to another class
#[derive(Args, Debug)]
pub struct ChangeObjectArgs {
    /// Id of the content object
    #[arg(value_name = "OBJECT_ID")]
    pub object_id: ObjectId,

    /// Identifier of the class to move the object to
    #[arg(long, value_name = "CLASS")]
    pub identifier: String,
}

/// Execute the `change-object` command.
pub fn execute(args: ChangeObjectArgs, env: &Environment) -> Result<ExitCode> {
    let mut file = env.open_store()?;

    let report = match change_object_class(file.store_mut(), args.object_id, &args.identifier) {
        Ok(report) => report,
        Err(Error::NotFound { what, .. }) if what == "Object" => {
            return Err(suggestions::object_not_found(args.object_id))
        }
        Err(Error::NotFound { what, .. }) if what == "Class" => {
            let installed = Environment::installed_identifiers(file.store())?;
            let installed: Vec<&str> = installed.iter().map(String::as_str).collect();
            return Err(suggestions::class_not_found(&args.identifier, &installed));
        }
        Err(err) => return Err(err.into()),
    };

    file.save_if_dirty()?;
    println!(
        "Object {} is now a {} ({} attribute(s) kept, {} created, {} removed)",
        args.object_id, args.identifier, report.kept, report.created, report.removed
    );
    Ok(ExitCode::SUCCESS)
}
