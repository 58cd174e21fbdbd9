//! Attribute synchronization.
//!
//! Incoming attributes are matched to installed ones by identifier only:
//!
//! 1. A match with the same datatype is updated in place.
//! 2. A match with a different datatype is removed together with its object
//!    attributes and created again.
//! 3. An unmatched attribute is created, and every existing content object
//!    of the class gets empty storage for it.
//! 4. Installed attributes that no incoming attribute matched are removed
//!    together with their object attributes.
//!
//! None of this opens a transaction. Callers wrap it in one.

use std::collections::HashSet;

use log::{debug, info};

use crate::definition::{AttributeDefinition, ClassDefinition};
use crate::error::Result;
use crate::store::{AttributeId, ClassId, ClassStore, ObjectAttribute, PersistedAttribute};

/// Identifiers touched by an attribute sync, per kind of change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeSyncReport {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    /// Removed and created again because the datatype changed.
    pub recreated: Vec<String>,
    pub removed: Vec<String>,
}

impl AttributeSyncReport {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
            && self.updated.is_empty()
            && self.recreated.is_empty()
            && self.removed.is_empty()
    }
}

/// Sync the supported attributes of `definition` onto class `class_id`.
pub fn sync_attributes(
    store: &mut dyn ClassStore,
    class_id: ClassId,
    definition: &ClassDefinition,
) -> Result<AttributeSyncReport> {
    let incoming: Vec<&AttributeDefinition> = definition.supported_attributes().collect();
    merge_attributes(store, class_id, &incoming)
}

/// Sync `incoming` onto class `class_id`. Unsupported attributes are
/// ignored.
pub fn merge_attributes(
    store: &mut dyn ClassStore,
    class_id: ClassId,
    incoming: &[&AttributeDefinition],
) -> Result<AttributeSyncReport> {
    let mut report = AttributeSyncReport::default();
    let mut synced = HashSet::new();

    for definition in incoming.iter().filter(|d| !d.unsupported) {
        let mut existing = store.attribute_by_identifier(class_id, &definition.identifier)?;
        let mut recreated = false;

        if let Some(attribute) = &existing {
            if attribute.datatype != definition.datatype {
                info!(
                    "Datatype of attribute {} changed from {} to {}",
                    definition.identifier, attribute.datatype, definition.datatype
                );
                remove_attribute(store, attribute)?;
                existing = None;
                recreated = true;
            }
        }

        match existing {
            Some(mut attribute) => {
                apply_definition(&mut attribute, definition);
                store.update_attribute(&attribute)?;
                debug!("Updated attribute {}", definition.identifier);
                report.updated.push(definition.identifier.clone());
            }
            None => {
                let mut attribute = PersistedAttribute {
                    class_id,
                    identifier: definition.identifier.clone(),
                    datatype: definition.datatype.clone(),
                    ..Default::default()
                };
                apply_definition(&mut attribute, definition);
                let attribute_id = store.create_attribute(attribute)?;
                let initialized = initialize_object_storage(store, class_id, attribute_id)?;
                debug!(
                    "Created attribute {} and storage for {} object(s)",
                    definition.identifier, initialized
                );
                if recreated {
                    report.recreated.push(definition.identifier.clone());
                } else {
                    report.created.push(definition.identifier.clone());
                }
            }
        }
        synced.insert(definition.identifier.clone());
    }

    for attribute in store.attributes(class_id)? {
        if !synced.contains(&attribute.identifier) {
            info!("Removing attribute {}", attribute.identifier);
            remove_attribute(store, &attribute)?;
            report.removed.push(attribute.identifier);
        }
    }

    Ok(report)
}

/// Delete every object attribute of `attribute`, then the attribute.
/// Returns the number of object attributes deleted.
pub fn remove_attribute(store: &mut dyn ClassStore, attribute: &PersistedAttribute) -> Result<usize> {
    let instances = store.object_attributes(attribute.id)?;
    for instance in &instances {
        store.delete_object_attribute(instance.id)?;
    }
    store.delete_attribute(attribute.id)?;
    Ok(instances.len())
}

/// Create empty storage for `attribute_id` on every object of the class.
fn initialize_object_storage(
    store: &mut dyn ClassStore,
    class_id: ClassId,
    attribute_id: AttributeId,
) -> Result<usize> {
    let objects = store.objects_of_class(class_id)?;
    for object in &objects {
        store.create_object_attribute(ObjectAttribute {
            object_id: object.id,
            class_attribute_id: attribute_id,
            language: object.language.clone(),
            ..Default::default()
        })?;
    }
    Ok(objects.len())
}

fn apply_definition(attribute: &mut PersistedAttribute, definition: &AttributeDefinition) {
    if !definition.name_list.is_empty() {
        attribute.name_list = definition.name_list.clone();
    }
    attribute.description_list = definition.description_list.clone();
    attribute.data_text = definition.data_text.clone();
    attribute.category = definition.category.clone();
    attribute.is_required = definition.is_required;
    attribute.is_searchable = definition.is_searchable;
    attribute.is_information_collector = definition.is_information_collector;
    attribute.can_translate = definition.can_translate;
    attribute.placement = definition.placement;
    attribute.datatype_parameters = definition.datatype_parameters.clone();
}
