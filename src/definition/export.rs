//! Writing installed classes back to definition XML.

use std::path::{Path, PathBuf};

use xot::{NameId, Node, Xot};

use super::{ClassDocument, ROOT_ELEMENT};
use crate::error::Result;
use crate::store::{ClassStore, PersistedAttribute, PersistedClass};

/// Namespace of the attributes container.
pub const ATTRIBUTE_NAMESPACE: &str = "http://ezpublish/contentclassattribute";

/// Prefix bound to [`ATTRIBUTE_NAMESPACE`].
pub const ATTRIBUTE_PREFIX: &str = "ezcontentclass-attri";

/// Build the definition document of an installed class. The document's
/// path is `<dir>/class-<identifier>.xml`.
pub fn export_class(store: &dyn ClassStore, class: &PersistedClass, dir: &Path) -> Result<ClassDocument> {
    let mut builder = Builder::new();
    let root = builder.element(ROOT_ELEMENT);
    let document = builder.xot.new_document_with_element(root)?;

    builder.flag(root, "is-container", class.is_container);
    builder.flag(root, "always-available", class.always_available);
    if let Some(field) = &class.sort_field {
        builder.attribute(root, "sort-field", field);
    }
    if let Some(order) = &class.sort_order {
        builder.attribute(root, "sort-order", order);
    }

    builder.text_child(root, "identifier", &class.identifier)?;
    builder.text_child(root, "remote-id", &class.remote_id)?;
    builder.text_child(root, "serialized-name-list", &class.name_list.to_json())?;
    builder.text_child(root, "serialized-description-list", &class.description_list.to_json())?;
    builder.text_child(root, "object-name-pattern", &class.object_name_pattern)?;
    builder.text_child(root, "url-alias-pattern", &class.url_alias_pattern)?;

    let remote = builder.child(root, "remote")?;
    builder.text_child(remote, "id", &class.id.to_string())?;
    builder.text_child(remote, "created", &class.created)?;
    builder.text_child(remote, "modified", &class.modified)?;
    builder.text_child(remote, "creator", &optional_id(class.creator_id))?;
    builder.text_child(remote, "modifier", &optional_id(class.modifier_id))?;
    let groups = builder.child(remote, "groups")?;
    for group_id in store.class_group_ids(class.id)? {
        if let Some(group) = store.group(group_id)? {
            let node = builder.child(groups, "group")?;
            builder.attribute(node, "id", &group.id.to_string());
            builder.attribute(node, "name", &group.name);
        }
    }

    let container = builder.attributes_container(root)?;
    for attribute in store.attributes(class.id)? {
        builder.class_attribute(container, &attribute)?;
    }

    let path = dir.join(definition_file_name(&class.identifier));
    let mut doc = ClassDocument::from_tree(path, builder.xot, document, root);
    doc.annotate_attributes()?;
    Ok(doc)
}

/// `class-<identifier>.xml`
pub fn definition_file_name(identifier: &str) -> PathBuf {
    PathBuf::from(format!("class-{identifier}.xml"))
}

fn optional_id(id: Option<u64>) -> String {
    id.map(|id| id.to_string()).unwrap_or_default()
}

struct Builder {
    xot: Xot,
}

impl Builder {
    fn new() -> Self {
        Self { xot: Xot::new() }
    }

    fn name(&mut self, name: &str) -> NameId {
        self.xot.add_name(name)
    }

    fn element(&mut self, name: &str) -> Node {
        let name = self.name(name);
        self.xot.new_element(name)
    }

    fn child(&mut self, parent: Node, name: &str) -> Result<Node> {
        let node = self.element(name);
        self.xot.append(parent, node)?;
        Ok(node)
    }

    fn text_child(&mut self, parent: Node, name: &str, value: &str) -> Result<Node> {
        let node = self.child(parent, name)?;
        if !value.is_empty() {
            self.xot.append_text(node, value)?;
        }
        Ok(node)
    }

    fn attribute(&mut self, node: Node, name: &str, value: &str) {
        let name = self.name(name);
        self.xot.attributes_mut(node).insert(name, value.to_string());
    }

    fn flag(&mut self, node: Node, name: &str, value: bool) {
        self.attribute(node, name, if value { "true" } else { "false" });
    }

    fn attributes_container(&mut self, root: Node) -> Result<Node> {
        let namespace = self.xot.add_namespace(ATTRIBUTE_NAMESPACE);
        let prefix = self.xot.add_prefix(ATTRIBUTE_PREFIX);
        let name = self.xot.add_name_ns("attributes", namespace);
        let container = self.xot.new_element(name);
        self.xot.namespaces_mut(container).insert(prefix, namespace);
        self.xot.append(root, container)?;
        Ok(container)
    }

    fn class_attribute(&mut self, container: Node, attribute: &PersistedAttribute) -> Result<()> {
        let node = self.child(container, "attribute")?;
        self.attribute(node, "datatype", &attribute.datatype);
        self.flag(node, "required", attribute.is_required);
        self.flag(node, "searchable", attribute.is_searchable);
        self.flag(node, "information-collector", attribute.is_information_collector);
        self.flag(node, "translatable", attribute.can_translate);

        self.text_child(node, "serialized-name-list", &attribute.name_list.to_json())?;
        self.text_child(
            node,
            "serialized-description-list",
            &attribute.description_list.to_json(),
        )?;
        self.text_child(node, "serialized-data-texts", &attribute.data_text.to_json())?;
        self.text_child(node, "identifier", &attribute.identifier)?;
        self.text_child(node, "category", &attribute.category)?;
        self.text_child(node, "placement", &attribute.placement.to_string())?;

        if let Some(params) = &attribute.datatype_parameters {
            let fragment = self.xot.parse(params).map_err(xot::Error::from)?;
            let element = self.xot.document_element(fragment)?;
            let copy = self.xot.clone_node(element);
            self.xot.append(node, copy)?;
        }
        Ok(())
    }
}
