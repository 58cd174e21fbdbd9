//! CLI argument parsing and command dispatch

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::{self, Environment};

/// classpkg - Keep content class definitions in editable packages
#[derive(Parser, Debug)]
#[command(name = "classpkg")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,

    /// Log what happens to every class and attribute (same as --log-level info)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the configuration file
    #[arg(
        long,
        global = true,
        value_name = "FILE",
        env = "CLASSPKG_CONFIG",
        default_value = classpkg::defaults::CONFIG_FILENAME
    )]
    config: PathBuf,

    /// Path to the class store (JSON snapshot)
    #[arg(long, global = true, value_name = "FILE", env = "CLASSPKG_STORE")]
    store: Option<PathBuf>,

    /// Current locale, e.g. eng-GB
    #[arg(long, global = true, value_name = "LOCALE")]
    locale: Option<String>,

    /// Ask before replacing or removing installed classes
    #[arg(long, global = true)]
    interactive: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Unpack binary packages and normalize their class definitions
    Extract(commands::extract::ExtractArgs),

    /// Install package folders into the class store
    Install(commands::install::InstallArgs),

    /// Remove the classes of a package from the class store
    Uninstall(commands::uninstall::UninstallArgs),

    /// Stamp a class definition as modified now and tidy it up
    UpdateModified(commands::update_modified::UpdateModifiedArgs),

    /// List packages whose classes are newer than the installed ones
    UpdateStatus(commands::update_status::UpdateStatusArgs),

    /// Compare a package repository with the installed classes
    #[command(visible_alias = "clean-up")]
    Diff(commands::diff::DiffArgs),

    /// Delete a class and all of its content objects
    ForceRemoveClass(commands::force_remove::ForceRemoveArgs),

    /// Move a content object to another class
    ChangeObject(commands::change_object::ChangeObjectArgs),

    /// Write an installed class as a class definition file
    Export(commands::export::ExportArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<ExitCode> {
        self.init_logging();

        if let Commands::Completions(args) = self.command {
            return commands::completions::execute(args);
        }

        let env = Environment::load(
            &self.config,
            classpkg::config::Overrides {
                store: self.store,
                locale: self.locale,
                interactive: self.interactive,
            },
            &self.color,
        )?;

        match self.command {
            Commands::Extract(args) => commands::extract::execute(args, &env),
            Commands::Install(args) => commands::install::execute(args, &env),
            Commands::Uninstall(args) => commands::uninstall::execute(args, &env),
            Commands::UpdateModified(args) => commands::update_modified::execute(args, &env),
            Commands::UpdateStatus(args) => commands::update_status::execute(args, &env),
            Commands::Diff(args) => commands::diff::execute(args, &env),
            Commands::ForceRemoveClass(args) => commands::force_remove::execute(args, &env),
            Commands::ChangeObject(args) => commands::change_object::execute(args, &env),
            Commands::Export(args) => commands::export::execute(args, &env),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }

    /// `RUST_LOG` wins over `--log-level`; `--verbose` raises the default
    /// `warn` to `info`.
    fn init_logging(&self) {
        let level = if self.verbose && self.log_level.eq_ignore_ascii_case("warn") {
            "info"
        } else {
            self.log_level.as_str()
        };
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
            .format_timestamp(None)
            .try_init();
    }
}
