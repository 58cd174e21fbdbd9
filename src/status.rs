//! # Repository Diff
//!
//! Classifies class identifiers by comparing a repository with the store:
//!
//! - `modified`: defined in a package whose installed version is stale
//! - `removed`: installed, but no longer defined in the repository
//! - `new`: defined in the repository, not installed yet
//!
//! `removed` and `new` win over `modified` for the same identifier.
//! Identifiers that are installed and current do not appear at all.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::error::Result;
use crate::repository::Repository;
use crate::store::ClassStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ClassStatus {
    New,
    Removed,
    Modified,
}

impl ClassStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ClassStatus::New => "new",
            ClassStatus::Removed => "removed",
            ClassStatus::Modified => "modified",
        }
    }
}

impl fmt::Display for ClassStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The diff between `repository` and `store`, keyed and sorted by class
/// identifier.
pub fn diff_status(
    repository: &Repository,
    store: &dyn ClassStore,
) -> Result<BTreeMap<String, ClassStatus>> {
    let mut result = BTreeMap::new();

    for package in repository.packages()? {
        if package.needs_update(store)? {
            for identifier in package.stale_classes(store)? {
                result.insert(identifier, ClassStatus::Modified);
            }
        }
    }

    let repo_ids: HashSet<String> = repository.available_class_identifiers()?.into_iter().collect();
    let installed_ids: HashSet<String> = store
        .classes()?
        .into_iter()
        .map(|class| class.identifier)
        .collect();

    for identifier in installed_ids.difference(&repo_ids) {
        result.insert(identifier.clone(), ClassStatus::Removed);
    }
    for identifier in repo_ids.difference(&installed_ids) {
        result.insert(identifier.clone(), ClassStatus::New);
    }

    log::debug!("Repository diff has {} entries", result.len());
    Ok(result)
}
