//! # Persisted Store
//!
//! The installed side of every operation: classes, their attributes, the
//! content objects that use them and the class groups they belong to.
//!
//! ## Key Components
//!
//! - **`ClassStore`**: The trait every engine in this crate talks to. It
//!   mirrors the narrow API of the host CMS persistence layer: fetch classes
//!   by identifier or remote id, create/update/delete classes and
//!   attributes, fetch dependent object attributes, manage content objects
//!   and class groups, and begin/commit/rollback a transaction.
//!
//! - **`MemoryStore`**: An in-memory implementation with snapshot
//!   transactions, used directly by tests.
//!
//! - **`FileStore`**: A `MemoryStore` persisted as a JSON document, used by
//!   the command-line tool.
//!
//! Lookups never match on numeric ids across environments. Merges are keyed
//! on class remote ids and attribute identifiers; numeric ids are local to
//! one store.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::serialized::NameList;

pub type ClassId = u64;
pub type AttributeId = u64;
pub type ObjectId = u64;
pub type ObjectAttributeId = u64;
pub type GroupId = u64;

/// An installed content class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedClass {
    pub id: ClassId,
    pub identifier: String,
    pub remote_id: String,
    pub name_list: NameList,
    pub description_list: NameList,
    pub object_name_pattern: String,
    pub url_alias_pattern: String,
    pub is_container: bool,
    pub always_available: bool,
    pub sort_field: Option<String>,
    pub sort_order: Option<String>,
    pub created: String,
    pub modified: String,
    pub creator_id: Option<u64>,
    pub modifier_id: Option<u64>,
}

impl PersistedClass {
    pub fn display_name(&self) -> &str {
        self.name_list.name().unwrap_or(&self.identifier)
    }
}

/// An installed class attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedAttribute {
    pub id: AttributeId,
    pub class_id: ClassId,
    pub identifier: String,
    pub datatype: String,
    pub placement: u32,
    pub is_required: bool,
    pub is_searchable: bool,
    pub is_information_collector: bool,
    pub can_translate: bool,
    pub name_list: NameList,
    pub description_list: NameList,
    pub data_text: NameList,
    pub category: String,
    pub datatype_parameters: Option<String>,
}

/// A content object (instance) of a class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentObject {
    pub id: ObjectId,
    pub class_id: ClassId,
    pub name: String,
    pub language: String,
}

/// Field storage of one content object for one class attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectAttribute {
    pub id: ObjectAttributeId,
    pub object_id: ObjectId,
    pub class_attribute_id: AttributeId,
    pub language: String,
    pub data: String,
}

/// A named class group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassGroup {
    pub id: GroupId,
    pub name: String,
}

/// Persistence API consumed by the merge engine, the installer and the diff
/// reporter.
///
/// `create_*` methods ignore the `id` of the value passed in and return the
/// id assigned by the store.
pub trait ClassStore {
    /// Start a transaction. Nested transactions are not supported.
    fn begin(&mut self) -> Result<()>;
    fn commit(&mut self) -> Result<()>;
    /// Discard every change since `begin`.
    fn rollback(&mut self) -> Result<()>;
    fn in_transaction(&self) -> bool;

    fn class(&self, id: ClassId) -> Result<Option<PersistedClass>>;
    fn class_by_identifier(&self, identifier: &str) -> Result<Option<PersistedClass>>;
    fn class_by_remote_id(&self, remote_id: &str) -> Result<Option<PersistedClass>>;
    fn classes(&self) -> Result<Vec<PersistedClass>>;
    fn create_class(&mut self, class: PersistedClass) -> Result<ClassId>;
    fn update_class(&mut self, class: &PersistedClass) -> Result<()>;
    /// Delete a class with its attributes and group memberships. Fails
    /// while content objects of the class exist.
    fn delete_class(&mut self, id: ClassId) -> Result<()>;

    fn attribute(&self, id: AttributeId) -> Result<Option<PersistedAttribute>>;
    /// Attributes of a class ordered by placement.
    fn attributes(&self, class_id: ClassId) -> Result<Vec<PersistedAttribute>>;
    fn attribute_by_identifier(
        &self,
        class_id: ClassId,
        identifier: &str,
    ) -> Result<Option<PersistedAttribute>>;
    fn create_attribute(&mut self, attribute: PersistedAttribute) -> Result<AttributeId>;
    fn update_attribute(&mut self, attribute: &PersistedAttribute) -> Result<()>;
    /// Delete an attribute. Fails while object attributes still point at it.
    fn delete_attribute(&mut self, id: AttributeId) -> Result<()>;

    /// Object attributes stored for a class attribute.
    fn object_attributes(&self, attribute_id: AttributeId) -> Result<Vec<ObjectAttribute>>;
    fn object_attributes_of_object(&self, object_id: ObjectId) -> Result<Vec<ObjectAttribute>>;
    fn create_object_attribute(&mut self, attribute: ObjectAttribute)
        -> Result<ObjectAttributeId>;
    fn update_object_attribute(&mut self, attribute: &ObjectAttribute) -> Result<()>;
    fn delete_object_attribute(&mut self, id: ObjectAttributeId) -> Result<()>;

    fn object(&self, id: ObjectId) -> Result<Option<ContentObject>>;
    fn objects_of_class(&self, class_id: ClassId) -> Result<Vec<ContentObject>>;
    fn create_object(&mut self, object: ContentObject) -> Result<ObjectId>;
    fn update_object(&mut self, object: &ContentObject) -> Result<()>;
    /// Delete an object together with its object attributes.
    fn delete_object(&mut self, id: ObjectId) -> Result<()>;

    fn group(&self, id: GroupId) -> Result<Option<ClassGroup>>;
    fn group_by_name(&self, name: &str) -> Result<Option<ClassGroup>>;
    /// Create a group, keeping `id` when given and free.
    fn create_group(&mut self, id: Option<GroupId>, name: &str) -> Result<ClassGroup>;
    fn update_group(&mut self, group: &ClassGroup) -> Result<()>;
    fn class_group_ids(&self, class_id: ClassId) -> Result<Vec<GroupId>>;
    fn add_class_to_group(&mut self, class_id: ClassId, group_id: GroupId) -> Result<()>;
    fn remove_class_from_group(&mut self, class_id: ClassId, group_id: GroupId) -> Result<()>;
}

/// Run `f` inside a transaction, committing on success and rolling back on
/// any error.
pub fn transaction<S, T, F>(store: &mut S, f: F) -> Result<T>
where
    S: ClassStore + ?Sized,
    F: FnOnce(&mut S) -> Result<T>,
{
    store.begin()?;
    match f(store) {
        Ok(value) => {
            store.commit()?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = store.rollback() {
                log::error!("Rollback failed: {}", rollback_err);
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn class(identifier: &str) -> PersistedClass {
        PersistedClass {
            identifier: identifier.to_string(),
            remote_id: format!("remote-{identifier}"),
            ..Default::default()
        }
    }

    #[test]
    fn test_transaction_commits_on_success() {
        let mut store = MemoryStore::new();
        let id = transaction(&mut store, |s| s.create_class(class("article"))).unwrap();
        assert!(!store.in_transaction());
        assert!(store.class(id).unwrap().is_some());
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let mut store = MemoryStore::new();
        let result: Result<()> = transaction(&mut store, |s| {
            s.create_class(class("article"))?;
            Err(Error::store("boom"))
        });
        assert!(result.is_err());
        assert!(!store.in_transaction());
        assert!(store.class_by_identifier("article").unwrap().is_none());
    }

    #[test]
    fn test_transaction_works_through_trait_object() {
        let mut store = MemoryStore::new();
        let dyn_store: &mut dyn ClassStore = &mut store;
        transaction(dyn_store, |s| s.create_class(class("folder"))).unwrap();
        assert_eq!(store.classes().unwrap().len(), 1);
    }
}
