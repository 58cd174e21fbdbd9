//! Class removal.

use log::{info, warn};

use super::ItemOutcome;
use crate::decision::{Action, Conflict, DecisionResolver};
use crate::error::{Error, Result};
use crate::store::{self, ClassId, ClassStore};

/// Remove the class with remote id `remote_id`.
///
/// A class that is not installed is already gone and counts as skipped. A
/// class with content objects needs a decision: `Delete` removes the
/// objects first, `Skip` leaves everything in place, no answer is an
/// [`Error::Dependency`].
pub fn remove_class(
    store: &mut dyn ClassStore,
    remote_id: &str,
    resolver: &dyn DecisionResolver,
) -> Result<ItemOutcome> {
    let class = match store.class_by_remote_id(remote_id)? {
        Some(class) => class,
        None => {
            info!("Class with remote id {} is not installed", remote_id);
            return Ok(ItemOutcome::Skipped);
        }
    };

    let objects = store.objects_of_class(class.id)?.len();
    if objects > 0 {
        let conflict = Conflict::has_objects(&class.identifier, class.display_name(), objects);
        match resolver.resolve(&conflict) {
            Some(Action::Delete) => {}
            Some(Action::Skip) => {
                warn!("{}; skipped", conflict.description);
                return Ok(ItemOutcome::Skipped);
            }
            _ => return Err(conflict.into_error()),
        }
    }

    info!("Removing class {} ({})", class.display_name(), class.id);
    store::transaction(store, |s| delete_with_objects(s, class.id))?;
    Ok(ItemOutcome::Removed)
}

/// What [`force_remove_class`] found and did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForceRemoveReport {
    pub identifier: String,
    pub exists: bool,
    pub objects: usize,
    pub removed: bool,
}

/// Delete every content object of class `identifier`, then the class,
/// without asking. With `dry_run` nothing is deleted and only the counts
/// are reported.
pub fn force_remove_class(
    store: &mut dyn ClassStore,
    identifier: &str,
    dry_run: bool,
) -> Result<ForceRemoveReport> {
    let class = store.class_by_identifier(identifier)?;
    let objects = match &class {
        Some(class) => store.objects_of_class(class.id)?.len(),
        None => 0,
    };
    let mut report = ForceRemoveReport {
        identifier: identifier.to_string(),
        exists: class.is_some(),
        objects,
        removed: false,
    };
    if dry_run {
        return Ok(report);
    }

    let class = class.ok_or_else(|| Error::not_found("Class", identifier))?;
    store::transaction(store, |s| delete_with_objects(s, class.id))?;
    info!("Force removed class {} and {} object(s)", identifier, objects);
    report.removed = true;
    Ok(report)
}

fn delete_with_objects(store: &mut dyn ClassStore, class_id: ClassId) -> Result<()> {
    for object in store.objects_of_class(class_id)? {
        store.delete_object(object.id)?;
    }
    store.delete_class(class_id)
}
