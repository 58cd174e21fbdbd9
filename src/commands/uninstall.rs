//! # Uninstall Command Implementation
//!
//! Removes the classes listed by package manifests from the class store.
//! Classes that are not installed count as already removed. A class that
//! still has content objects is skipped unless `--delete-objects` is given
//! or the operator chooses to delete them when running `--interactive`.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use log::warn;

use classpkg::clock::SystemClock;
use classpkg::decision::{Action, DecisionResolver, FixedDecision};
use classpkg::installer::{HandlerRegistry, PackageInstaller, PackageStatus};
use classpkg::manifest::Package;
use classpkg::merge::MergeContext;

use super::{folder_name, package_folders, Environment};

/// Remove the classes of a package from the class store
#[derive(Args, Debug)]
pub struct UninstallArgs {
    /// Package folder, or a glob pattern of package folders
    #[arg(value_name = "PATH")]
    pub path: String,

    /// Delete the content objects of a class instead of skipping it
    #[arg(long)]
    pub delete_objects: bool,
}

/// Execute the `uninstall` command.
pub fn execute(args: UninstallArgs, env: &Environment) -> Result<ExitCode> {
    let folders = package_folders(&args.path)?;
    let mut file = env.open_store()?;

    let resolver: Box<dyn DecisionResolver> = if args.delete_objects {
        Box::new(FixedDecision::undecided().on_has_objects(Action::Delete))
    } else {
        env.resolver()
    };
    let ctx = MergeContext {
        clock: &SystemClock,
        resolver: resolver.as_ref(),
        user_id: env.settings.user_id(),
    };
    let installer = PackageInstaller::new(HandlerRegistry::with_defaults(env.settings.locale()), ctx);

    let mut failed = 0;
    for folder in &folders {
        let name = folder_name(folder);
        let report = Package::load(folder).and_then(|package| installer.uninstall(file.store_mut(), &package));
        match report {
            Ok(report) => match report.status() {
                PackageStatus::Done => println!("Uninstalled package {}", name),
                PackageStatus::Skipped => println!("Skipped package {}", name),
                PackageStatus::Failed => {
                    println!("Failed uninstalling package {}", name);
                    for (item, err) in report.failures() {
                        warn!("{}: {}", item, err);
                    }
                    failed += 1;
                }
            },
            Err(err) => {
                warn!("{}: {}", name, err);
                println!("Failed uninstalling package {}", name);
                failed += 1;
            }
        }
    }

    file.save_if_dirty()?;

    if failed > 0 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
