//! # Output Configuration
//!
//! Color and emoji decisions for operator-facing output.
//!
//! The `--color=never|always|auto` flag wins. In `auto` mode the
//! environment decides: `NO_COLOR` (https://no-color.org/) and `CLICOLOR=0`
//! turn color off, `CLICOLOR_FORCE=1` turns it on even without a TTY,
//! `TERM=dumb` turns it off, and otherwise the `console` crate's terminal
//! detection is used.
//!
//! ```rust,ignore
//! use classpkg::output::{emoji, OutputConfig};
//!
//! let out = OutputConfig::from_env_and_flag("auto");
//! println!("{} Installed package {}", emoji(&out, "📦", "[OK]"), name);
//! ```

use std::env;

use console::style;

use crate::status::ClassStatus;

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Build from the value of `--color` ("always", "never" or "auto").
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        // Presence alone disables colors, even when empty
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }
        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }
        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }
        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    /// Create a configuration with colors always enabled.
    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    /// Create a configuration with colors always disabled.
    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// `emoji_str` when colors are enabled, `plain` otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// A diff status word, colored when colors are enabled.
pub fn status_label(config: &OutputConfig, status: ClassStatus) -> String {
    if !config.use_color {
        return status.as_str().to_string();
    }
    let styled = match status {
        ClassStatus::New => style(status.as_str()).green(),
        ClassStatus::Removed => style(status.as_str()).red(),
        ClassStatus::Modified => style(status.as_str()).yellow(),
    };
    styled.force_styling(true).to_string()
}
