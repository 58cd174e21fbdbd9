//! # Install Command Implementation
//!
//! Installs every package folder matching a glob pattern into the class
//! store. Each package ends with one line:
//!
//! - `Installed package NAME`
//! - `Skipped package NAME` when every item was up to date
//! - `Failed installing package NAME`, followed by a warning per failed item
//!
//! Without `--ignore-version`, classes whose installed `modified` is at
//! least the definition's are left alone. The store is created on first
//! install and written once at the end. Any failed package makes the exit
//! code non-zero.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use log::warn;

use classpkg::clock::SystemClock;
use classpkg::installer::{HandlerRegistry, PackageInstaller, PackageStatus};
use classpkg::manifest::Package;
use classpkg::merge::MergeContext;

use super::{folder_name, package_folders, Environment};

/// Install package folders into the class store
#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Glob pattern of the package folders to install
    #[arg(value_name = "PATTERN")]
    pub pattern: String,

    /// Install classes even when the installed version is current
    #[arg(long)]
    pub ignore_version: bool,
}

/// Execute the `install` command.
pub fn execute(args: InstallArgs, env: &Environment) -> Result<ExitCode> {
    let folders = package_folders(&args.pattern)?;
    let mut file = env.open_or_create_store()?;

    let resolver = env.resolver();
    let ctx = MergeContext {
        clock: &SystemClock,
        resolver: resolver.as_ref(),
        user_id: env.settings.user_id(),
    };
    let installer = PackageInstaller::new(HandlerRegistry::with_defaults(env.settings.locale()), ctx);

    let mut failed = 0;
    for folder in &folders {
        let name = folder_name(folder);
        let package = match Package::load(folder) {
            Ok(package) => package,
            Err(err) => {
                warn!("{}: {}", name, err);
                println!("Failed installing package {}", name);
                failed += 1;
                continue;
            }
        };

        match installer.install(file.store_mut(), &package, !args.ignore_version) {
            Ok(report) => match report.status() {
                PackageStatus::Done => println!("Installed package {}", name),
                PackageStatus::Skipped => println!("Skipped package {}", name),
                PackageStatus::Failed => {
                    println!("Failed installing package {}", name);
                    for (item, err) in report.failures() {
                        warn!("{}: {}", item, err);
                    }
                    failed += 1;
                }
            },
            Err(err) => {
                warn!("{}: {}", name, err);
                println!("Failed installing package {}", name);
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
