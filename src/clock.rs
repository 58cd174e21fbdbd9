//! Time and locale capabilities.
//!
//! The merge engine and the class definition normalizer never read the wall
//! clock or a global locale directly. They take a [`Clock`] and a
//! [`LocaleProvider`] so that runs are reproducible in tests.

use chrono::Utc;

/// Source of the current time as a Unix timestamp.
pub trait Clock {
    fn now(&self) -> i64;
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// A clock frozen at a fixed timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now(&self) -> i64 {
        self.0
    }
}

/// Source of the current locale and the list of installed locales.
pub trait LocaleProvider {
    /// The default locale, e.g. `eng-GB`.
    fn current_locale(&self) -> &str;

    /// Every locale installed in the target system.
    fn locales(&self) -> &[String];
}

/// A locale provider backed by configuration values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticLocales {
    current: String,
    locales: Vec<String>,
}

impl StaticLocales {
    /// Create a provider. The current locale is always part of the list.
    pub fn new(current: impl Into<String>, locales: Vec<String>) -> Self {
        let current = current.into();
        let mut locales = locales;
        if !locales.iter().any(|l| l == &current) {
            locales.insert(0, current.clone());
        }
        Self { current, locales }
    }
}

impl LocaleProvider for StaticLocales {
    fn current_locale(&self) -> &str {
        &self.current
    }

    fn locales(&self) -> &[String] {
        &self.locales
    }
}
