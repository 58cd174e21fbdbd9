//! # Version Comparison
//!
//! This module decides whether an installed class is at least as new as a
//! definition on disk. The `modified` timestamp of a class is its only
//! version marker; changes that leave it untouched are invisible here.
//!
//! ## Comparison
//!
//! Timestamps are compared as strings with a case-insensitive ordinal
//! comparison, not numerically. For ten-digit Unix timestamps both orders
//! agree. Keeping the string order means historical data is classified the
//! same way it always was.
//!
//! A class that is not installed is never current. Two empty values compare
//! equal, so an installed class with an empty marker is current against an
//! empty candidate.

use std::cmp::Ordering;

use crate::definition::ClassDefinition;
use crate::error::Result;
use crate::store::ClassStore;

/// Case-insensitive ordinal comparison of two `modified` values.
pub fn compare_modified(installed: &str, candidate: &str) -> Ordering {
    let lower = |s: &str| s.bytes().map(|b| b.to_ascii_lowercase()).collect::<Vec<u8>>();
    lower(installed).cmp(&lower(candidate))
}

/// Whether the installed value is newer than or equal to the candidate.
pub fn is_current(installed: &str, candidate: &str) -> bool {
    compare_modified(installed, candidate) != Ordering::Less
}

/// Whether the class `identifier` is installed with a `modified` value at
/// least as new as `candidate`. Has no side effects.
pub fn is_installed_version_current(
    store: &dyn ClassStore,
    identifier: &str,
    candidate: &str,
) -> Result<bool> {
    let current = match store.class_by_identifier(identifier)? {
        Some(class) => is_current(&class.modified, candidate),
        None => false,
    };
    log::debug!(
        "Class {} is {}",
        identifier,
        if current { "current" } else { "outdated" }
    );
    Ok(current)
}

/// [`is_installed_version_current`] for a parsed definition.
pub fn is_definition_current(store: &dyn ClassStore, definition: &ClassDefinition) -> Result<bool> {
    is_installed_version_current(store, &definition.identifier, &definition.modified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, PersistedClass};

    fn store_with(identifier: &str, modified: &str) -> MemoryStore {
        let mut store = MemoryStore::new();
        store
            .create_class(PersistedClass {
                identifier: identifier.to_string(),
                remote_id: format!("r-{identifier}"),
                modified: modified.to_string(),
                ..Default::default()
            })
            .unwrap();
        store
    }

    #[test]
    fn test_compare_modified_is_ordinal() {
        assert_eq!(compare_modified("1100000000", "1000000000"), Ordering::Greater);
        assert_eq!(compare_modified("1000000000", "1000000000"), Ordering::Equal);
        // string order, not numeric: "9" sorts after "10"
        assert_eq!(compare_modified("9", "10"), Ordering::Greater);
    }

    #[test]
    fn test_compare_modified_ignores_case() {
        assert_eq!(compare_modified("ABC", "abc"), Ordering::Equal);
        assert_eq!(compare_modified("abd", "ABC"), Ordering::Greater);
    }

    #[test]
    fn test_prefix_sorts_first() {
        assert_eq!(compare_modified("100", "1000"), Ordering::Less);
    }

    #[test]
    fn test_missing_class_is_not_current() {
        let store = MemoryStore::new();
        assert!(!is_installed_version_current(&store, "article", "").unwrap());
    }

    #[test]
    fn test_installed_newer_or_equal_is_current() {
        let store = store_with("article", "1200000000");
        assert!(is_installed_version_current(&store, "article", "1200000000").unwrap());
        assert!(is_installed_version_current(&store, "article", "1100000000").unwrap());
        assert!(!is_installed_version_current(&store, "article", "1300000000").unwrap());
    }

    #[test]
    fn test_both_empty_is_current() {
        let store = store_with("article", "");
        assert!(is_installed_version_current(&store, "article", "").unwrap());
    }
}
