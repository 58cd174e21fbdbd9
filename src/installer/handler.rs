//! The content class item handler.

use std::path::{Path, PathBuf};

use log::debug;

use super::{remove_class, ItemHandler, ItemOutcome};
use crate::definition::ClassDocument;
use crate::error::{Error, Result};
use crate::manifest::InstallItem;
use crate::merge::{merge_class, MergeContext, MergeOutcome};
use crate::store::ClassStore;
use crate::version;

/// Installs `ezcontentclass` items through the merge engine.
#[derive(Debug, Clone)]
pub struct ContentClassHandler {
    /// Locale for names read from pre-3.8 plain `name` elements.
    locale: String,
}

impl ContentClassHandler {
    pub fn new(locale: &str) -> Self {
        Self {
            locale: locale.to_string(),
        }
    }

    fn document(&self, package_dir: &Path, item: &InstallItem) -> Result<ClassDocument> {
        ClassDocument::open(definition_path(package_dir, item)?)
    }
}

fn definition_path(package_dir: &Path, item: &InstallItem) -> Result<PathBuf> {
    item.file_path(package_dir)
        .ok_or_else(|| Error::not_found("Class definition for item", item.label()))
}

impl ItemHandler for ContentClassHandler {
    fn install_item(
        &self,
        store: &mut dyn ClassStore,
        package_dir: &Path,
        item: &InstallItem,
        ctx: &MergeContext<'_>,
    ) -> Result<ItemOutcome> {
        let definition = self.document(package_dir, item)?.definition(&self.locale)?;
        let outcome = merge_class(store, &definition, ctx)?;
        debug!("Merged {}: {:?}", definition.identifier, outcome);
        Ok(match outcome {
            MergeOutcome::Skipped => ItemOutcome::Skipped,
            _ => ItemOutcome::Installed,
        })
    }

    fn uninstall_item(
        &self,
        store: &mut dyn ClassStore,
        package_dir: &Path,
        item: &InstallItem,
        ctx: &MergeContext<'_>,
    ) -> Result<ItemOutcome> {
        let definition = self.document(package_dir, item)?.definition(&self.locale)?;
        remove_class(store, &definition.remote_id, ctx.resolver)
    }

    fn is_version_current(
        &self,
        store: &dyn ClassStore,
        package_dir: &Path,
        item: &InstallItem,
    ) -> Result<bool> {
        let document = self.document(package_dir, item)?;
        version::is_installed_version_current(store, &document.identifier()?, &document.modified())
    }
}
