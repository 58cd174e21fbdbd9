//! Moving a content object to another class.

use std::collections::HashMap;

use log::{debug, info};

use crate::error::{Error, Result};
use crate::store::{self, ClassStore, ObjectAttribute, ObjectId};

/// Counts from [`change_object_class`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectChangeReport {
    /// Object attributes moved onto the same-named attribute of the new class.
    pub kept: usize,
    pub created: usize,
    pub removed: usize,
}

/// Reassign object `object_id` to the class `class_identifier`.
///
/// Object attributes are matched by class attribute identifier. Data of a
/// matching attribute is kept, attributes the object lacks get empty
/// storage, and attributes the new class does not have are dropped. All of
/// it happens in one transaction.
pub fn change_object_class(
    store: &mut dyn ClassStore,
    object_id: ObjectId,
    class_identifier: &str,
) -> Result<ObjectChangeReport> {
    let mut object = store
        .object(object_id)?
        .ok_or_else(|| Error::not_found("Object", object_id.to_string()))?;
    let class = store
        .class_by_identifier(class_identifier)?
        .ok_or_else(|| super::class_not_found(class_identifier))?;

    if object.class_id == class.id {
        debug!("Object {} already belongs to {}", object_id, class_identifier);
        return Ok(ObjectChangeReport::default());
    }

    store::transaction(store, |s| {
        let mut report = ObjectChangeReport::default();

        // current storage keyed by the identifier of its class attribute
        let mut current: HashMap<String, ObjectAttribute> = HashMap::new();
        for instance in s.object_attributes_of_object(object.id)? {
            match s.attribute(instance.class_attribute_id)? {
                Some(attribute) => {
                    current.insert(attribute.identifier, instance);
                }
                None => {
                    s.delete_object_attribute(instance.id)?;
                    report.removed += 1;
                }
            }
        }

        for attribute in s.attributes(class.id)? {
            match current.remove(&attribute.identifier) {
                Some(mut instance) => {
                    instance.class_attribute_id = attribute.id;
                    s.update_object_attribute(&instance)?;
                    report.kept += 1;
                }
                None => {
                    s.create_object_attribute(ObjectAttribute {
                        object_id: object.id,
                        class_attribute_id: attribute.id,
                        language: object.language.clone(),
                        ..Default::default()
                    })?;
                    report.created += 1;
                }
            }
        }

        for (_, instance) in current {
            s.delete_object_attribute(instance.id)?;
            report.removed += 1;
        }

        object.class_id = class.id;
        s.update_object(&object)?;
        Ok(report)
    })
    .map(|report| {
        info!(
            "Moved object {} to class {} ({} kept, {} created, {} removed)",
            object_id, class_identifier, report.kept, report.created, report.removed
        );
        report
    })
}
