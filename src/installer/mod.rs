//! # Package Installer
//!
//! Walks the items of a package manifest and hands each one to the
//! [`ItemHandler`] registered for its [`ItemKind`]. Every item ends in an
//! [`ItemOutcome`]; a skipped item is a normal outcome, never an error.
//!
//! Item level failures (missing or malformed files, undecided conflicts)
//! are recorded in the [`PackageReport`] and the walk continues. A store
//! failure aborts the package and is returned to the caller.

mod handler;
mod removal;

pub use handler::ContentClassHandler;
pub use removal::{force_remove_class, remove_class, ForceRemoveReport};

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use log::{info, warn};

use crate::error::{Error, Result};
use crate::manifest::{InstallItem, Package};
pub use crate::manifest::ItemKind;
use crate::merge::MergeContext;
use crate::store::ClassStore;

/// Result of installing or uninstalling one item.
#[derive(Debug)]
pub enum ItemOutcome {
    Installed,
    Removed,
    Skipped,
    Failed(Error),
}

impl ItemOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, ItemOutcome::Failed(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, ItemOutcome::Skipped)
    }
}

impl fmt::Display for ItemOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemOutcome::Installed => f.write_str("installed"),
            ItemOutcome::Removed => f.write_str("removed"),
            ItemOutcome::Skipped => f.write_str("skipped"),
            ItemOutcome::Failed(err) => write!(f, "failed: {err}"),
        }
    }
}

/// Installs and removes items of one kind.
pub trait ItemHandler {
    fn install_item(
        &self,
        store: &mut dyn ClassStore,
        package_dir: &Path,
        item: &InstallItem,
        ctx: &MergeContext<'_>,
    ) -> Result<ItemOutcome>;

    fn uninstall_item(
        &self,
        store: &mut dyn ClassStore,
        package_dir: &Path,
        item: &InstallItem,
        ctx: &MergeContext<'_>,
    ) -> Result<ItemOutcome>;

    /// Whether the store already holds this item at a version at least as
    /// new as the package's.
    fn is_version_current(
        &self,
        store: &dyn ClassStore,
        package_dir: &Path,
        item: &InstallItem,
    ) -> Result<bool>;
}

/// Handlers by item kind.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<ItemKind, Box<dyn ItemHandler>>,
}

impl HandlerRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the content class handler.
    pub fn with_defaults(locale: &str) -> Self {
        let mut registry = Self::new();
        registry.register(ItemKind::ContentClass, Box::new(ContentClassHandler::new(locale)));
        registry
    }

    pub fn register(&mut self, kind: ItemKind, handler: Box<dyn ItemHandler>) {
        self.handlers.insert(kind, handler);
    }

    pub fn get(&self, kind: &ItemKind) -> Option<&dyn ItemHandler> {
        self.handlers.get(kind).map(|h| h.as_ref())
    }
}

/// Overall result for a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageStatus {
    /// At least one item changed the store and none failed.
    Done,
    /// Every item was skipped.
    Skipped,
    /// At least one item failed.
    Failed,
}

/// Per-item outcomes of a package run.
#[derive(Debug)]
pub struct PackageReport {
    pub package: String,
    pub items: Vec<(String, ItemOutcome)>,
}

impl PackageReport {
    fn new(package: &str) -> Self {
        Self {
            package: package.to_string(),
            items: Vec::new(),
        }
    }

    pub fn status(&self) -> PackageStatus {
        if self.items.iter().any(|(_, o)| o.is_failed()) {
            PackageStatus::Failed
        } else if self.items.iter().all(|(_, o)| o.is_skipped()) {
            PackageStatus::Skipped
        } else {
            PackageStatus::Done
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &Error)> {
        self.items.iter().filter_map(|(label, outcome)| match outcome {
            ItemOutcome::Failed(err) => Some((label.as_str(), err)),
            _ => None,
        })
    }
}

/// Runs packages through the handler registry.
pub struct PackageInstaller<'a> {
    registry: HandlerRegistry,
    ctx: MergeContext<'a>,
}

impl<'a> PackageInstaller<'a> {
    pub fn new(registry: HandlerRegistry, ctx: MergeContext<'a>) -> Self {
        Self { registry, ctx }
    }

    /// Install every item of `package`. With `check_version`, items whose
    /// installed version is current are skipped.
    pub fn install(
        &self,
        store: &mut dyn ClassStore,
        package: &Package,
        check_version: bool,
    ) -> Result<PackageReport> {
        let mut report = PackageReport::new(package.name());
        for item in &package.manifest().install {
            let outcome = match self.registry.get(&item.kind) {
                Some(handler) => {
                    self.install_one(handler, store, package.path(), item, check_version)
                }
                None => {
                    warn!("No handler for item type {}, skipping {}", item.kind, item.label());
                    Ok(ItemOutcome::Skipped)
                }
            };
            report.items.push((item.label().to_string(), settle(outcome, item)?));
        }
        info!("Install of {}: {:?}", package.name(), report.status());
        Ok(report)
    }

    /// Remove every item of `package`, using its uninstall list when it
    /// has one.
    pub fn uninstall(&self, store: &mut dyn ClassStore, package: &Package) -> Result<PackageReport> {
        let mut report = PackageReport::new(package.name());
        for item in package.manifest().uninstall_items() {
            let outcome = match self.registry.get(&item.kind) {
                Some(handler) => handler.uninstall_item(store, package.path(), item, &self.ctx),
                None => {
                    warn!("No handler for item type {}, skipping {}", item.kind, item.label());
                    Ok(ItemOutcome::Skipped)
                }
            };
            report.items.push((item.label().to_string(), settle(outcome, item)?));
        }
        info!("Uninstall of {}: {:?}", package.name(), report.status());
        Ok(report)
    }

    fn install_one(
        &self,
        handler: &dyn ItemHandler,
        store: &mut dyn ClassStore,
        package_dir: &Path,
        item: &InstallItem,
        check_version: bool,
    ) -> Result<ItemOutcome> {
        if check_version && handler.is_version_current(store, package_dir, item)? {
            info!("{} is up to date", item.label());
            return Ok(ItemOutcome::Skipped);
        }
        handler.install_item(store, package_dir, item, &self.ctx)
    }
}

/// Turn an item error into a recorded failure. Store errors abort.
fn settle(outcome: Result<ItemOutcome>, item: &InstallItem) -> Result<ItemOutcome> {
    match outcome {
        Ok(outcome) => Ok(outcome),
        Err(err @ Error::Store { .. }) => Err(err),
        Err(err) => {
            warn!("Item {} failed: {}", item.label(), err);
            Ok(ItemOutcome::Failed(err))
        }
    }
}
