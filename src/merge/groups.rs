//! Class group membership sync.

use log::debug;

use crate::definition::GroupRef;
use crate::error::Result;
use crate::store::{ClassGroup, ClassId, ClassStore};

/// Make the groups of class `class_id` exactly `groups`.
///
/// Each group is resolved by name, then by id (renaming a group whose name
/// went stale), and created when neither matches. Running this twice with
/// the same input changes nothing the second time.
pub fn sync_groups(store: &mut dyn ClassStore, class_id: ClassId, groups: &[GroupRef]) -> Result<()> {
    let mut keep = Vec::with_capacity(groups.len());

    for group_ref in groups {
        let group = resolve_group(store, group_ref)?;
        if !store.class_group_ids(class_id)?.contains(&group.id) {
            debug!("Adding class {} to group {}", class_id, group.name);
            store.add_class_to_group(class_id, group.id)?;
        }
        keep.push(group.id);
    }

    for group_id in store.class_group_ids(class_id)? {
        if !keep.contains(&group_id) {
            debug!("Removing class {} from group {}", class_id, group_id);
            store.remove_class_from_group(class_id, group_id)?;
        }
    }
    Ok(())
}

fn resolve_group(store: &mut dyn ClassStore, group_ref: &GroupRef) -> Result<ClassGroup> {
    if let Some(group) = store.group_by_name(&group_ref.name)? {
        return Ok(group);
    }
    if let Some(id) = group_ref.id {
        if let Some(mut group) = store.group(id)? {
            debug!("Renaming group {} from {} to {}", id, group.name, group_ref.name);
            group.name = group_ref.name.clone();
            store.update_group(&group)?;
            return Ok(group);
        }
    }
    store.create_group(group_ref.id, &group_ref.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, PersistedClass};

    fn setup() -> (MemoryStore, ClassId) {
        let mut store = MemoryStore::new();
        let class_id = store
            .create_class(PersistedClass {
                identifier: "article".to_string(),
                remote_id: "r".to_string(),
                ..Default::default()
            })
            .unwrap();
        (store, class_id)
    }

    fn group(id: Option<u64>, name: &str) -> GroupRef {
        GroupRef {
            id,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_creates_missing_groups_and_attaches() {
        let (mut store, class_id) = setup();
        sync_groups(&mut store, class_id, &[group(Some(1), "Content")]).unwrap();
        let content = store.group_by_name("Content").unwrap().unwrap();
        assert_eq!(content.id, 1);
        assert_eq!(store.class_group_ids(class_id).unwrap(), vec![1]);
    }

    #[test]
    fn test_falls_back_to_id_and_renames() {
        let (mut store, class_id) = setup();
        store.create_group(Some(2), "Old name").unwrap();
        sync_groups(&mut store, class_id, &[group(Some(2), "Media")]).unwrap();
        assert_eq!(store.group(2).unwrap().unwrap().name, "Media");
        assert_eq!(store.class_group_ids(class_id).unwrap(), vec![2]);
    }

    #[test]
    fn test_detaches_unlisted_groups() {
        let (mut store, class_id) = setup();
        let users = store.create_group(None, "Users").unwrap();
        store.add_class_to_group(class_id, users.id).unwrap();
        sync_groups(&mut store, class_id, &[group(None, "Content")]).unwrap();
        let ids = store.class_group_ids(class_id).unwrap();
        assert_eq!(ids.len(), 1);
        assert!(!ids.contains(&users.id));
    }

    #[test]
    fn test_is_idempotent() {
        let (mut store, class_id) = setup();
        let groups = [group(Some(1), "Content"), group(None, "Media")];
        sync_groups(&mut store, class_id, &groups).unwrap();
        let before = store.clone();
        store.mark_clean();
        sync_groups(&mut store, class_id, &groups).unwrap();
        assert!(!store.is_dirty());
        assert_eq!(
            store.class_group_ids(class_id).unwrap(),
            before.class_group_ids(class_id).unwrap()
        );
    }
}
