//! # Configuration File
//!
//! This module defines the optional `.classpkg.yaml` settings file and the
//! logic for parsing it. Every key is optional:
//!
//! ```yaml
//! store: .classpkg/store.json
//! locale: eng-GB
//! locales: [eng-GB, ger-DE]
//! user_id: 14
//! interactive: false
//! ```
//!
//! Command-line flags override file values; see `Settings::with_overrides`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::clock::StaticLocales;
use crate::defaults;
use crate::error::Result;

/// Settings read from `.classpkg.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Path of the JSON store snapshot.
    pub store: Option<PathBuf>,
    /// Current/default locale.
    pub locale: Option<String>,
    /// Installed locales, used as locale back-fill targets.
    pub locales: Vec<String>,
    /// Creator/modifier id stamped on installed classes.
    pub user_id: Option<u64>,
    /// Prompt for decisions instead of applying the non-interactive defaults.
    pub interactive: bool,
}

/// Values given on the command line that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub store: Option<PathBuf>,
    pub locale: Option<String>,
    pub interactive: bool,
}

impl Settings {
    /// Path of the store, falling back to the platform default.
    pub fn store_path(&self) -> PathBuf {
        self.store
            .clone()
            .unwrap_or_else(defaults::default_store_path)
    }

    pub fn locale(&self) -> &str {
        self.locale.as_deref().unwrap_or(defaults::DEFAULT_LOCALE)
    }

    pub fn user_id(&self) -> u64 {
        self.user_id.unwrap_or(defaults::DEFAULT_USER_ID)
    }

    /// A locale provider built from `locale` and `locales`.
    pub fn locale_provider(&self) -> StaticLocales {
        StaticLocales::new(self.locale(), self.locales.clone())
    }

    /// Apply command-line overrides on top of the file values.
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if overrides.store.is_some() {
            self.store = overrides.store;
        }
        if overrides.locale.is_some() {
            self.locale = overrides.locale;
        }
        self.interactive |= overrides.interactive;
        self
    }
}

/// Parses a YAML string into `Settings`. An empty document yields defaults.
pub fn parse(yaml_content: &str) -> Result<Settings> {
    if yaml_content.trim().is_empty() {
        return Ok(Settings::default());
    }
    Ok(serde_yaml::from_str(yaml_content)?)
}

/// Parse settings from a YAML file path.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

/// Parse settings from `path` when it exists, otherwise return defaults.
pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    if path.exists() {
        from_file(path)
    } else {
        log::debug!("No configuration at {}, using defaults", path.display());
        Ok(Settings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::LocaleProvider;

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
store: /var/lib/classpkg/store.json
locale: ger-DE
locales: [eng-GB, ger-DE]
user_id: 42
interactive: true
"#;
        let settings = parse(yaml).unwrap();
        assert_eq!(
            settings.store_path(),
            PathBuf::from("/var/lib/classpkg/store.json")
        );
        assert_eq!(settings.locale(), "ger-DE");
        assert_eq!(settings.locales, vec!["eng-GB", "ger-DE"]);
        assert_eq!(settings.user_id(), 42);
        assert!(settings.interactive);
    }

    #[test]
    fn test_parse_empty_config_uses_defaults() {
        let settings = parse("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.locale(), "eng-GB");
        assert_eq!(settings.user_id(), 14);
        assert!(!settings.interactive);
    }

    #[test]
    fn test_parse_rejects_unknown_keys() {
        let result = parse("stroe: typo.json\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides_take_precedence() {
        let settings = parse("store: a.json\nlocale: eng-GB\n")
            .unwrap()
            .with_overrides(Overrides {
                store: Some(PathBuf::from("b.json")),
                locale: None,
                interactive: true,
            });
        assert_eq!(settings.store_path(), PathBuf::from("b.json"));
        assert_eq!(settings.locale(), "eng-GB");
        assert!(settings.interactive);
    }

    #[test]
    fn test_locale_provider_from_settings() {
        let settings = parse("locale: nor-NO\nlocales: [eng-GB]\n").unwrap();
        let provider = settings.locale_provider();
        assert_eq!(provider.current_locale(), "nor-NO");
        assert_eq!(provider.locales(), ["nor-NO", "eng-GB"]);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let temp = tempfile::tempdir().unwrap();
        let settings = load_or_default(temp.path().join(".classpkg.yaml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_from_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join(".classpkg.yaml");
        std::fs::write(&path, "user_id: 7\n").unwrap();
        assert_eq!(from_file(&path).unwrap().user_id(), 7);
    }
}
