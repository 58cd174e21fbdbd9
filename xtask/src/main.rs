//! Development tasks for classpkg, run as `cargo xtask <task>`.
//!
//! ```bash
//! cargo xtask coverage --format lcov
//! cargo xtask check-prose src tests
//! ```

mod check_prose;

use std::env;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "xtask", about = "Development tasks for classpkg")]
struct Cli {
    #[command(subcommand)]
    command: Task,
}

#[derive(Subcommand)]
enum Task {
    /// Measure test coverage with cargo-tarpaulin
    Coverage {
        #[arg(long, short, value_enum, default_value_t = ReportFormat::Html)]
        format: ReportFormat,
        /// Fail when coverage is below this percentage
        #[arg(long)]
        fail_under: Option<u8>,
    },
    /// Lint doc comments and markdown for filler phrasing
    CheckProse {
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,
        /// text or json
        #[arg(long, short, default_value = "text")]
        format: check_prose::OutputFormat,
        #[arg(long, short)]
        verbose: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportFormat {
    Html,
    Json,
    Xml,
    Lcov,
}

impl ReportFormat {
    fn tarpaulin_name(self) -> &'static str {
        match self {
            ReportFormat::Html => "Html",
            ReportFormat::Json => "Json",
            ReportFormat::Xml => "Xml",
            ReportFormat::Lcov => "Lcov",
        }
    }

    fn report_path(self) -> &'static str {
        match self {
            ReportFormat::Html => "target/tarpaulin/tarpaulin-report.html",
            ReportFormat::Json => "target/tarpaulin/tarpaulin-report.json",
            ReportFormat::Xml => "target/tarpaulin/cobertura.xml",
            ReportFormat::Lcov => "target/tarpaulin/lcov.info",
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let root = workspace_root()?;
    env::set_current_dir(&root)
        .with_context(|| format!("Failed to change to workspace root: {}", root.display()))?;

    match cli.command {
        Task::Coverage { format, fail_under } => coverage(format, fail_under),
        Task::CheckProse {
            paths,
            format,
            verbose,
        } => check_prose::run(check_prose::CheckProseConfig {
            paths,
            format,
            verbose,
        }),
    }
}

fn workspace_root() -> Result<PathBuf> {
    let output = Command::new("cargo")
        .args(["locate-project", "--workspace", "--message-format=plain"])
        .output()
        .context("Failed to run 'cargo locate-project'")?;
    if !output.status.success() {
        bail!("Failed to locate workspace root");
    }
    let manifest = PathBuf::from(String::from_utf8(output.stdout)?.trim());
    manifest
        .parent()
        .map(|dir| dir.to_path_buf())
        .context("Cargo.toml has no parent directory")
}

fn coverage(format: ReportFormat, fail_under: Option<u8>) -> Result<()> {
    let installed = Command::new("cargo-tarpaulin")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|status| status.success());
    if !installed {
        bail!("cargo-tarpaulin not found; install it with `cargo install cargo-tarpaulin`");
    }

    let mut cmd = Command::new("cargo");
    cmd.args(["tarpaulin", "--out", format.tarpaulin_name()]);
    if let Some(threshold) = fail_under {
        cmd.arg("--fail-under").arg(threshold.to_string());
    }

    println!("Running coverage...");
    let status = cmd.status().context("Failed to run cargo tarpaulin")?;
    if !status.success() {
        bail!("Coverage run failed");
    }
    println!("Coverage report: {}", format.report_path());
    Ok(())
}
