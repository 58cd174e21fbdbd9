//! In-memory class store.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::{
    AttributeId, ClassGroup, ClassId, ClassStore, ContentObject, GroupId, ObjectAttribute,
    ObjectAttributeId, ObjectId, PersistedAttribute, PersistedClass,
};
use crate::error::{Error, Result};

/// Everything the store holds. This is also the JSON document layout of
/// [`super::FileStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct StoreData {
    next_id: u64,
    classes: BTreeMap<ClassId, PersistedClass>,
    attributes: BTreeMap<AttributeId, PersistedAttribute>,
    objects: BTreeMap<ObjectId, ContentObject>,
    object_attributes: BTreeMap<ObjectAttributeId, ObjectAttribute>,
    groups: BTreeMap<GroupId, ClassGroup>,
    memberships: BTreeSet<(ClassId, GroupId)>,
}

impl StoreData {
    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// A [`ClassStore`] held entirely in memory.
///
/// `begin` snapshots the data, `rollback` restores the snapshot and
/// `commit` drops it.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: StoreData,
    snapshot: Option<StoreData>,
    dirty: bool,
}

impl MemoryStore {
    /// Create an empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_data(data: StoreData) -> Self {
        Self {
            data,
            snapshot: None,
            dirty: false,
        }
    }

    pub(crate) fn data(&self) -> &StoreData {
        &self.data
    }

    /// Whether anything changed since the store was created or loaded.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Total number of content objects.
    pub fn object_count(&self) -> usize {
        self.data.objects.len()
    }

    /// Total number of object attributes.
    pub fn object_attribute_count(&self) -> usize {
        self.data.object_attributes.len()
    }

    fn touch(&mut self) {
        self.dirty = true;
    }

    fn require_class(&self, id: ClassId) -> Result<()> {
        if self.data.classes.contains_key(&id) {
            Ok(())
        } else {
            Err(Error::store(format!("class {id} does not exist")))
        }
    }
}

impl ClassStore for MemoryStore {
    fn begin(&mut self) -> Result<()> {
        if self.snapshot.is_some() {
            return Err(Error::store("transaction already open"));
        }
        self.snapshot = Some(self.data.clone());
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.snapshot
            .take()
            .map(|_| ())
            .ok_or_else(|| Error::store("commit without transaction"))
    }

    fn rollback(&mut self) -> Result<()> {
        let snapshot = self
            .snapshot
            .take()
            .ok_or_else(|| Error::store("rollback without transaction"))?;
        self.data = snapshot;
        Ok(())
    }

    fn in_transaction(&self) -> bool {
        self.snapshot.is_some()
    }

    fn class(&self, id: ClassId) -> Result<Option<PersistedClass>> {
        Ok(self.data.classes.get(&id).cloned())
    }

    fn class_by_identifier(&self, identifier: &str) -> Result<Option<PersistedClass>> {
        Ok(self
            .data
            .classes
            .values()
            .find(|c| c.identifier == identifier)
            .cloned())
    }

    fn class_by_remote_id(&self, remote_id: &str) -> Result<Option<PersistedClass>> {
        if remote_id.is_empty() {
            return Ok(None);
        }
        Ok(self
            .data
            .classes
            .values()
            .find(|c| c.remote_id == remote_id)
            .cloned())
    }

    fn classes(&self) -> Result<Vec<PersistedClass>> {
        Ok(self.data.classes.values().cloned().collect())
    }

    fn create_class(&mut self, mut class: PersistedClass) -> Result<ClassId> {
        if self.class_by_identifier(&class.identifier)?.is_some() {
            return Err(Error::store(format!(
                "class identifier '{}' is already in use",
                class.identifier
            )));
        }
        if self.class_by_remote_id(&class.remote_id)?.is_some() {
            return Err(Error::store(format!(
                "class remote id '{}' is already in use",
                class.remote_id
            )));
        }
        class.id = self.data.allocate();
        let id = class.id;
        self.data.classes.insert(id, class);
        self.touch();
        Ok(id)
    }

    fn update_class(&mut self, class: &PersistedClass) -> Result<()> {
        self.require_class(class.id)?;
        let clash = self.data.classes.values().any(|c| {
            c.id != class.id
                && (c.identifier == class.identifier
                    || (!class.remote_id.is_empty() && c.remote_id == class.remote_id))
        });
        if clash {
            return Err(Error::store(format!(
                "class '{}' clashes with another class",
                class.identifier
            )));
        }
        self.data.classes.insert(class.id, class.clone());
        self.touch();
        Ok(())
    }

    fn delete_class(&mut self, id: ClassId) -> Result<()> {
        self.require_class(id)?;
        if self.data.objects.values().any(|o| o.class_id == id) {
            return Err(Error::store(format!(
                "class {id} still has content objects"
            )));
        }
        let attribute_ids: BTreeSet<AttributeId> = self
            .data
            .attributes
            .values()
            .filter(|a| a.class_id == id)
            .map(|a| a.id)
            .collect();
        self.data
            .object_attributes
            .retain(|_, oa| !attribute_ids.contains(&oa.class_attribute_id));
        self.data.attributes.retain(|_, a| a.class_id != id);
        self.data.memberships.retain(|(class_id, _)| *class_id != id);
        self.data.classes.remove(&id);
        self.touch();
        Ok(())
    }

    fn attribute(&self, id: AttributeId) -> Result<Option<PersistedAttribute>> {
        Ok(self.data.attributes.get(&id).cloned())
    }

    fn attributes(&self, class_id: ClassId) -> Result<Vec<PersistedAttribute>> {
        let mut attributes: Vec<PersistedAttribute> = self
            .data
            .attributes
            .values()
            .filter(|a| a.class_id == class_id)
            .cloned()
            .collect();
        attributes.sort_by_key(|a| (a.placement, a.id));
        Ok(attributes)
    }

    fn attribute_by_identifier(
        &self,
        class_id: ClassId,
        identifier: &str,
    ) -> Result<Option<PersistedAttribute>> {
        Ok(self
            .data
            .attributes
            .values()
            .find(|a| a.class_id == class_id && a.identifier == identifier)
            .cloned())
    }

    fn create_attribute(&mut self, mut attribute: PersistedAttribute) -> Result<AttributeId> {
        self.require_class(attribute.class_id)?;
        if self
            .attribute_by_identifier(attribute.class_id, &attribute.identifier)?
            .is_some()
        {
            return Err(Error::store(format!(
                "attribute '{}' already exists on class {}",
                attribute.identifier, attribute.class_id
            )));
        }
        attribute.id = self.data.allocate();
        let id = attribute.id;
        self.data.attributes.insert(id, attribute);
        self.touch();
        Ok(id)
    }

    fn update_attribute(&mut self, attribute: &PersistedAttribute) -> Result<()> {
        if !self.data.attributes.contains_key(&attribute.id) {
            return Err(Error::store(format!(
                "attribute {} does not exist",
                attribute.id
            )));
        }
        self.data.attributes.insert(attribute.id, attribute.clone());
        self.touch();
        Ok(())
    }

    fn delete_attribute(&mut self, id: AttributeId) -> Result<()> {
        if self
            .data
            .object_attributes
            .values()
            .any(|oa| oa.class_attribute_id == id)
        {
            return Err(Error::store(format!(
                "attribute {id} still has object attributes"
            )));
        }
        self.data
            .attributes
            .remove(&id)
            .ok_or_else(|| Error::store(format!("attribute {id} does not exist")))?;
        self.touch();
        Ok(())
    }

    fn object_attributes(&self, attribute_id: AttributeId) -> Result<Vec<ObjectAttribute>> {
        Ok(self
            .data
            .object_attributes
            .values()
            .filter(|oa| oa.class_attribute_id == attribute_id)
            .cloned()
            .collect())
    }

    fn object_attributes_of_object(&self, object_id: ObjectId) -> Result<Vec<ObjectAttribute>> {
        Ok(self
            .data
            .object_attributes
            .values()
            .filter(|oa| oa.object_id == object_id)
            .cloned()
            .collect())
    }

    fn create_object_attribute(
        &mut self,
        mut attribute: ObjectAttribute,
    ) -> Result<ObjectAttributeId> {
        if !self.data.objects.contains_key(&attribute.object_id) {
            return Err(Error::store(format!(
                "object {} does not exist",
                attribute.object_id
            )));
        }
        if !self
            .data
            .attributes
            .contains_key(&attribute.class_attribute_id)
        {
            return Err(Error::store(format!(
                "attribute {} does not exist",
                attribute.class_attribute_id
            )));
        }
        attribute.id = self.data.allocate();
        let id = attribute.id;
        self.data.object_attributes.insert(id, attribute);
        self.touch();
        Ok(id)
    }

    fn update_object_attribute(&mut self, attribute: &ObjectAttribute) -> Result<()> {
        if !self.data.object_attributes.contains_key(&attribute.id) {
            return Err(Error::store(format!(
                "object attribute {} does not exist",
                attribute.id
            )));
        }
        self.data
            .object_attributes
            .insert(attribute.id, attribute.clone());
        self.touch();
        Ok(())
    }

    fn delete_object_attribute(&mut self, id: ObjectAttributeId) -> Result<()> {
        self.data
            .object_attributes
            .remove(&id)
            .ok_or_else(|| Error::store(format!("object attribute {id} does not exist")))?;
        self.touch();
        Ok(())
    }

    fn object(&self, id: ObjectId) -> Result<Option<ContentObject>> {
        Ok(self.data.objects.get(&id).cloned())
    }

    fn objects_of_class(&self, class_id: ClassId) -> Result<Vec<ContentObject>> {
        Ok(self
            .data
            .objects
            .values()
            .filter(|o| o.class_id == class_id)
            .cloned()
            .collect())
    }

    fn create_object(&mut self, mut object: ContentObject) -> Result<ObjectId> {
        self.require_class(object.class_id)?;
        object.id = self.data.allocate();
        let id = object.id;
        self.data.objects.insert(id, object);
        self.touch();
        Ok(id)
    }

    fn update_object(&mut self, object: &ContentObject) -> Result<()> {
        self.require_class(object.class_id)?;
        if !self.data.objects.contains_key(&object.id) {
            return Err(Error::store(format!("object {} does not exist", object.id)));
        }
        self.data.objects.insert(object.id, object.clone());
        self.touch();
        Ok(())
    }

    fn delete_object(&mut self, id: ObjectId) -> Result<()> {
        self.data
            .objects
            .remove(&id)
            .ok_or_else(|| Error::store(format!("object {id} does not exist")))?;
        self.data
            .object_attributes
            .retain(|_, oa| oa.object_id != id);
        self.touch();
        Ok(())
    }

    fn group(&self, id: GroupId) -> Result<Option<ClassGroup>> {
        Ok(self.data.groups.get(&id).cloned())
    }

    fn group_by_name(&self, name: &str) -> Result<Option<ClassGroup>> {
        Ok(self
            .data
            .groups
            .values()
            .find(|g| g.name == name)
            .cloned())
    }

    fn create_group(&mut self, id: Option<GroupId>, name: &str) -> Result<ClassGroup> {
        let id = match id {
            Some(id) if id > 0 && !self.data.groups.contains_key(&id) => {
                self.data.next_id = self.data.next_id.max(id);
                id
            }
            _ => self.data.allocate(),
        };
        let group = ClassGroup {
            id,
            name: name.to_string(),
        };
        self.data.groups.insert(id, group.clone());
        self.touch();
        Ok(group)
    }

    fn update_group(&mut self, group: &ClassGroup) -> Result<()> {
        if !self.data.groups.contains_key(&group.id) {
            return Err(Error::store(format!("group {} does not exist", group.id)));
        }
        self.data.groups.insert(group.id, group.clone());
        self.touch();
        Ok(())
    }

    fn class_group_ids(&self, class_id: ClassId) -> Result<Vec<GroupId>> {
        Ok(self
            .data
            .memberships
            .iter()
            .filter(|(c, _)| *c == class_id)
            .map(|(_, g)| *g)
            .collect())
    }

    fn add_class_to_group(&mut self, class_id: ClassId, group_id: GroupId) -> Result<()> {
        self.require_class(class_id)?;
        if !self.data.groups.contains_key(&group_id) {
            return Err(Error::store(format!("group {group_id} does not exist")));
        }
        if self.data.memberships.insert((class_id, group_id)) {
            self.touch();
        }
        Ok(())
    }

    fn remove_class_from_group(&mut self, class_id: ClassId, group_id: GroupId) -> Result<()> {
        if self.data.memberships.remove(&(class_id, group_id)) {
            self.touch();
        }
        Ok(())
    }
}
