//! Default values for classpkg configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::path::PathBuf;

/// Name of the optional configuration file looked up in the working directory.
pub const CONFIG_FILENAME: &str = ".classpkg.yaml";

/// Locale used when neither the configuration nor a flag names one.
pub const DEFAULT_LOCALE: &str = "eng-GB";

/// User id stamped as creator/modifier of installed classes (the CMS admin).
pub const DEFAULT_USER_ID: u64 = 14;

/// Returns the default store path.
///
/// Uses the platform-appropriate data directory:
/// - Linux: `~/.local/share/classpkg/store.json`
/// - macOS: `~/Library/Application Support/classpkg/store.json`
/// - Windows: `{FOLDERID_RoamingAppData}\classpkg\store.json`
///
/// Falls back to `.classpkg/store.json` in the current directory if the
/// platform data directory cannot be determined.
///
/// This can be overridden by the `store` configuration key, the `--store`
/// CLI flag or the `CLASSPKG_STORE` environment variable.
pub fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("classpkg"))
        .unwrap_or_else(|| PathBuf::from(".classpkg"))
        .join("store.json")
}
