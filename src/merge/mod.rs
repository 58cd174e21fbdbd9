//! # Schema Merge Engine
//!
//! Brings a parsed [`ClassDefinition`] into the store. A class is matched by
//! its remote id; an existing match needs a decision from the
//! [`DecisionResolver`] in the [`MergeContext`]:
//!
//! | Decision  | Effect                                                       |
//! |-----------|--------------------------------------------------------------|
//! | (no match)| create the class, then sync attributes and groups            |
//! | `Replace` | overwrite class fields in place, then sync attributes/groups |
//! | `New`     | leave the match alone, create a copy with a fresh remote id  |
//! | `Skip`    | nothing changes                                              |
//! | undecided | [`Error::Conflict`] carrying the candidate actions           |
//!
//! Every create or replace runs in a single store transaction, so a failure
//! halfway through attribute sync leaves the class as it was.
//!
//! ## Submodules
//!
//! - [`attributes`]: attribute create/update/recreate/remove
//! - [`groups`]: class group membership
//! - [`objects`]: moving a content object to another class

pub mod attributes;
pub mod groups;
pub mod objects;

pub use attributes::{merge_attributes, remove_attribute, sync_attributes, AttributeSyncReport};
pub use groups::sync_groups;
pub use objects::change_object_class;

use log::{debug, info};
use regex::Regex;
use uuid::Uuid;

use crate::clock::Clock;
use crate::decision::{Action, Conflict, DecisionResolver};
use crate::definition::ClassDefinition;
use crate::error::{Error, Result};
use crate::store::{self, ClassId, ClassStore, PersistedClass};

/// Appended to every name of a class installed next to an existing one.
pub const IMPORTED_SUFFIX: &str = " (imported)";

/// Capabilities a merge needs besides the store.
pub struct MergeContext<'a> {
    pub clock: &'a dyn Clock,
    pub resolver: &'a dyn DecisionResolver,
    /// Recorded as creator and modifier.
    pub user_id: u64,
}

/// What [`merge_class`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    Created(ClassId),
    Replaced(ClassId),
    /// Installed as a new class beside an existing one.
    CreatedCopy(ClassId),
    Skipped,
}

impl MergeOutcome {
    pub fn class_id(&self) -> Option<ClassId> {
        match self {
            MergeOutcome::Created(id) | MergeOutcome::Replaced(id) | MergeOutcome::CreatedCopy(id) => {
                Some(*id)
            }
            MergeOutcome::Skipped => None,
        }
    }
}

/// Install `definition` into `store`.
pub fn merge_class(
    store: &mut dyn ClassStore,
    definition: &ClassDefinition,
    ctx: &MergeContext<'_>,
) -> Result<MergeOutcome> {
    let existing = if definition.remote_id.is_empty() {
        None
    } else {
        store.class_by_remote_id(&definition.remote_id)?
    };

    let existing = match existing {
        None => {
            let id = store::transaction(store, |s| create_class(s, definition, ctx, None))?;
            info!("Created class {}", definition.identifier);
            return Ok(MergeOutcome::Created(id));
        }
        Some(existing) => existing,
    };

    let conflict = Conflict::class_exists(&existing.identifier, existing.display_name());
    match ctx.resolver.resolve(&conflict) {
        Some(Action::Replace) => {
            let id = existing.id;
            store::transaction(store, |s| replace_class(s, existing, definition, ctx))?;
            info!("Replaced class {}", definition.identifier);
            Ok(MergeOutcome::Replaced(id))
        }
        Some(Action::New) => {
            let remote_id = new_remote_id();
            let id = store::transaction(store, |s| create_class(s, definition, ctx, Some(remote_id)))?;
            info!("Installed class {} beside {}", definition.identifier, conflict.subject);
            Ok(MergeOutcome::CreatedCopy(id))
        }
        Some(Action::Skip) => {
            info!("Skipped class {}", definition.identifier);
            Ok(MergeOutcome::Skipped)
        }
        Some(Action::Delete) | None => Err(conflict.into_error()),
    }
}

/// `wanted`, or the first free variant of it with a numeric `_N` suffix.
///
/// A class with id `own_id` does not count as taking the identifier.
pub fn unique_identifier(
    store: &dyn ClassStore,
    wanted: &str,
    own_id: Option<ClassId>,
) -> Result<String> {
    let suffix = Regex::new(r"^(.*)_(\d+)$")?;
    let mut candidate = wanted.to_string();
    loop {
        let taken = match store.class_by_identifier(&candidate)? {
            Some(class) => Some(class.id) != own_id,
            None => false,
        };
        if !taken {
            return Ok(candidate);
        }
        let next = match suffix.captures(&candidate) {
            Some(caps) => match caps[2].parse::<u64>() {
                Ok(n) => format!("{}_{}", &caps[1], n + 1),
                Err(_) => format!("{candidate}_1"),
            },
            None => format!("{candidate}_1"),
        };
        debug!("Identifier {} is taken, trying {}", candidate, next);
        candidate = next;
    }
}

/// The version marker stored for a definition. Empty becomes `"0"`.
pub fn stored_modified(definition: &ClassDefinition) -> String {
    if definition.modified.trim().is_empty() {
        "0".to_string()
    } else {
        definition.modified.trim().to_string()
    }
}

fn new_remote_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn create_class(
    store: &mut dyn ClassStore,
    definition: &ClassDefinition,
    ctx: &MergeContext<'_>,
    copy_remote_id: Option<String>,
) -> Result<ClassId> {
    let is_copy = copy_remote_id.is_some();
    let remote_id = match copy_remote_id {
        Some(id) => id,
        None if definition.remote_id.is_empty() => new_remote_id(),
        None => definition.remote_id.clone(),
    };

    let mut name_list = definition.name_list.clone();
    if is_copy {
        name_list.append_suffix(IMPORTED_SUFFIX);
    }

    let class = PersistedClass {
        identifier: unique_identifier(store, &definition.identifier, None)?,
        remote_id,
        name_list,
        description_list: definition.description_list.clone(),
        object_name_pattern: definition.object_name_pattern.clone(),
        url_alias_pattern: definition.url_alias_pattern.clone().unwrap_or_default(),
        is_container: definition.is_container,
        always_available: definition.always_available.unwrap_or(false),
        sort_field: definition.sort_field.clone(),
        sort_order: definition.sort_order.clone(),
        created: ctx.clock.now().to_string(),
        modified: stored_modified(definition),
        creator_id: Some(ctx.user_id),
        modifier_id: Some(ctx.user_id),
        ..Default::default()
    };
    if class.identifier != definition.identifier {
        info!(
            "Identifier {} is in use, installing as {}",
            definition.identifier, class.identifier
        );
    }

    let id = store.create_class(class)?;
    sync_attributes(store, id, definition)?;
    sync_groups(store, id, &definition.groups)?;
    Ok(id)
}

fn replace_class(
    store: &mut dyn ClassStore,
    mut class: PersistedClass,
    definition: &ClassDefinition,
    ctx: &MergeContext<'_>,
) -> Result<()> {
    class.identifier = unique_identifier(store, &definition.identifier, Some(class.id))?;
    if !definition.name_list.is_empty() {
        class.name_list = definition.name_list.clone();
    }
    class.description_list = definition.description_list.clone();
    class.object_name_pattern = definition.object_name_pattern.clone();
    if let Some(pattern) = &definition.url_alias_pattern {
        class.url_alias_pattern = pattern.clone();
    }
    class.is_container = definition.is_container;
    if let Some(always_available) = definition.always_available {
        class.always_available = always_available;
    }
    if definition.sort_field.is_some() {
        class.sort_field = definition.sort_field.clone();
    }
    if definition.sort_order.is_some() {
        class.sort_order = definition.sort_order.clone();
    }
    class.created = ctx.clock.now().to_string();
    class.modified = stored_modified(definition);
    class.modifier_id = Some(ctx.user_id);

    let id = class.id;
    store.update_class(&class)?;
    let report = sync_attributes(store, id, definition)?;
    debug!("Attribute sync for {}: {:?}", class.identifier, report);
    sync_groups(store, id, &definition.groups)?;
    Ok(())
}

/// Error for a class that is expected to be installed.
pub(crate) fn class_not_found(identifier: &str) -> Error {
    Error::not_found("Class", identifier)
}
