//! # CLI Command Implementations
//!
//! One file per `classpkg` subcommand. Each file contains:
//! - An `Args` struct with the command-specific arguments, derived using
//!   `clap`.
//! - An `execute` function that takes the parsed `Args` plus the shared
//!   [`Environment`] and returns the process exit code.
//!
//! The commands only orchestrate: parsing, merging, installing and diffing
//! live in the `classpkg` library.

pub mod change_object;
pub mod completions;
pub mod diff;
pub mod export;
pub mod extract;
pub mod force_remove;
pub mod install;
pub mod uninstall;
pub mod update_modified;
pub mod update_status;

use std::path::{Path, PathBuf};

use anyhow::Result;

use classpkg::config::{self, Overrides, Settings};
use classpkg::decision::{DecisionResolver, NonInteractive, PromptResolver};
use classpkg::output::OutputConfig;
use classpkg::store::{ClassStore, FileStore};
use classpkg::suggestions;

/// Settings and output preferences shared by every command.
#[derive(Debug)]
pub struct Environment {
    pub settings: Settings,
    pub out: OutputConfig,
}

impl Environment {
    /// Read the configuration file at `config_path` and apply the command
    /// line overrides. A missing default file means defaults; a missing file
    /// the operator asked for is an error.
    pub fn load(config_path: &Path, overrides: Overrides, color: &str) -> Result<Self> {
        let explicit = config_path != Path::new(classpkg::defaults::CONFIG_FILENAME);
        if explicit && !config_path.exists() {
            return Err(suggestions::config_not_found(config_path));
        }
        let settings = config::load_or_default(config_path)?.with_overrides(overrides);
        log::debug!("Using store {}", settings.store_path().display());
        Ok(Self {
            settings,
            out: OutputConfig::from_env_and_flag(color),
        })
    }

    pub fn store_path(&self) -> PathBuf {
        self.settings.store_path()
    }

    /// Open the existing store. A missing store is fatal.
    pub fn open_store(&self) -> Result<FileStore> {
        let path = self.store_path();
        if !path.is_file() {
            return Err(suggestions::store_not_found(&path));
        }
        Ok(FileStore::open(&path)?)
    }

    /// Open the store, starting from an empty one when the file is missing.
    pub fn open_or_create_store(&self) -> Result<FileStore> {
        Ok(FileStore::open_or_create(self.store_path())?)
    }

    /// The prompt when running interactively, the batch defaults otherwise.
    pub fn resolver(&self) -> Box<dyn DecisionResolver> {
        if self.settings.interactive {
            Box::new(PromptResolver::new())
        } else {
            Box::new(NonInteractive)
        }
    }

    /// Identifiers of the installed classes, for "did you mean" hints.
    pub fn installed_identifiers(store: &dyn ClassStore) -> Result<Vec<String>> {
        Ok(store.classes()?.into_iter().map(|c| c.identifier).collect())
    }
}

/// Folders matching `pattern`. Files among the matches are ignored.
pub fn package_folders(pattern: &str) -> Result<Vec<PathBuf>> {
    let entries = glob::glob(pattern).map_err(|err| suggestions::invalid_glob(pattern, &err))?;
    let folders: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_dir())
        .collect();
    if folders.is_empty() {
        return Err(suggestions::no_packages(pattern));
    }
    Ok(folders)
}

/// The last component of `path`, for messages.
pub fn folder_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_defaults_without_config_file() {
        let temp = tempfile::tempdir().unwrap();
        let overrides = Overrides {
            store: Some(temp.path().join("store.json")),
            ..Default::default()
        };
        let env = Environment::load(
            Path::new(classpkg::defaults::CONFIG_FILENAME),
            overrides,
            "never",
        )
        .unwrap();
        assert_eq!(env.store_path(), temp.path().join("store.json"));
        assert!(!env.out.use_color);
    }

    #[test]
    fn test_load_explicit_missing_config_fails() {
        let temp = tempfile::tempdir().unwrap();
        let result = Environment::load(
            &temp.path().join("custom.yaml"),
            Overrides::default(),
            "never",
        );
        let message = result.unwrap_err().to_string();
        assert!(message.contains("Configuration file not found"));
    }

    #[test]
    fn test_package_folders_skips_files() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::create_dir(temp.path().join("blog")).unwrap();
        std::fs::write(temp.path().join("notes.txt"), "").unwrap();
        let pattern = format!("{}/*", temp.path().display());
        let folders = package_folders(&pattern).unwrap();
        assert_eq!(folders, vec![temp.path().join("blog")]);
    }

    #[test]
    fn test_package_folders_without_match() {
        let temp = tempfile::tempdir().unwrap();
        let pattern = format!("{}/missing-*", temp.path().display());
        let message = package_folders(&pattern).unwrap_err().to_string();
        assert!(message.contains("No package folders match"));
    }

    #[test]
    fn test_folder_name() {
        assert_eq!(folder_name(Path::new("repo/blog")), "blog");
    }

    #[test]
    fn test_open_store_missing_is_fatal() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, "store: does-not-exist.json\n").unwrap();
        let env = Environment::load(&path, Overrides::default(), "never").unwrap();
        let message = env.open_store().unwrap_err().to_string();
        assert!(message.contains("Class store not found"));
    }
}
