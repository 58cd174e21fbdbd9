//! XML class definition documents and their normalizing rewrites.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use xot::output::xml::{Declaration, Parameters};
use xot::{Node, Xot};

use super::{AttributeDefinition, ClassDefinition, GroupRef};
use crate::clock::{Clock, LocaleProvider};
use crate::error::{Error, Result};
use crate::serialized::{self, NameList};

/// Local name of the class definition root element.
pub const ROOT_ELEMENT: &str = "content-class";

/// Prefix used for serialized per-language fields.
pub const SERIALIZED_PREFIX: &str = "serialized-";

/// A parsed class definition file, kept as an XML tree so that it can be
/// normalized and written back.
#[derive(Debug, Clone)]
pub struct ClassDocument {
    path: PathBuf,
    xot: Xot,
    document: Node,
    root: Node,
}

impl ClassDocument {
    /// Read and parse a class definition file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::not_found(
                "Class definition",
                path.display().to_string(),
            ));
        }
        let content = fs::read_to_string(path)?;
        Self::parse_str(&content, path)
    }

    /// Parse class definition XML. `path` is only used for diagnostics and
    /// as the default target of [`ClassDocument::save`].
    pub fn parse_str(content: &str, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut xot = Xot::new();
        let document = xot.parse(content).map_err(|e| Error::Parse {
            path: path.clone(),
            message: xot::Error::from(e).to_string(),
        })?;
        xot.remove_insignificant_whitespace(document);
        let root = xot.document_element(document)?;

        let doc = Self {
            path,
            xot,
            document,
            root,
        };
        let root_name = doc.local_name(root).unwrap_or_default();
        if root_name != ROOT_ELEMENT {
            return Err(doc.parse_error(format!(
                "root element is <{root_name}>, expected <{ROOT_ELEMENT}>"
            )));
        }
        Ok(doc)
    }

    /// Wrap a tree built elsewhere in this module tree.
    pub(super) fn from_tree(path: PathBuf, xot: Xot, document: Node, root: Node) -> Self {
        Self {
            path,
            xot,
            document,
            root,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The class identifier. Fails when the `identifier` node is missing or
    /// empty.
    pub fn identifier(&self) -> Result<String> {
        self.child(self.root, "identifier")
            .map(|node| self.text(node))
            .filter(|id| !id.is_empty())
            .ok_or_else(|| self.parse_error("missing identifier"))
    }

    /// The `remote/modified` timestamp, empty when absent.
    pub fn modified(&self) -> String {
        self.remote_child("modified")
            .map(|node| self.text(node))
            .unwrap_or_default()
    }

    /// Extract the class definition. `locale` labels names read from the
    /// plain `name` element of pre-3.8 exports.
    pub fn definition(&self, locale: &str) -> Result<ClassDefinition> {
        let root = self.root;
        let identifier = self.identifier()?;
        let remote_id = self.child_text(root, "remote-id").unwrap_or_default();

        let groups = self
            .remote_child("groups")
            .map(|groups| {
                self.children_named(groups, "group")
                    .into_iter()
                    .filter_map(|group| {
                        let name = self.attribute(group, "name")?.to_string();
                        let id = self
                            .attribute(group, "id")
                            .and_then(|id| id.trim().parse().ok());
                        Some(GroupRef { id, name })
                    })
                    .collect()
            })
            .unwrap_or_default();

        let attributes = match self.attributes_container() {
            Some(container) => self
                .children_named(container, "attribute")
                .into_iter()
                .map(|node| self.attribute_definition(node, locale))
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };

        Ok(ClassDefinition {
            name_list: self.name_list(root, "serialized-name-list", locale),
            description_list: self.name_list(root, "serialized-description-list", ""),
            object_name_pattern: self
                .child_text(root, "object-name-pattern")
                .unwrap_or_default(),
            url_alias_pattern: self.child_text(root, "url-alias-pattern"),
            is_container: self.flag(root, "is-container"),
            always_available: self
                .attribute(root, "always-available")
                .map(|v| v.eq_ignore_ascii_case("true")),
            sort_field: self.attribute(root, "sort-field").map(str::to_string),
            sort_order: self.attribute(root, "sort-order").map(str::to_string),
            remote_class_id: self
                .remote_child("id")
                .and_then(|node| self.text(node).parse().ok()),
            created: self
                .remote_child("created")
                .map(|node| self.text(node))
                .unwrap_or_default(),
            modified: self.modified(),
            identifier,
            remote_id,
            groups,
            attributes,
        })
    }

    fn attribute_definition(&self, node: Node, locale: &str) -> Result<AttributeDefinition> {
        let identifier = self
            .child_text(node, "identifier")
            .filter(|id| !id.is_empty())
            .ok_or_else(|| self.parse_error("attribute without identifier"))?;
        let datatype_parameters = match self.child(node, "datatype-parameters") {
            Some(params) => Some(self.xot.to_string(params)?),
            None => None,
        };
        let data_text = ["serialized-data-texts", "serialized-description-text"]
            .iter()
            .find_map(|name| self.child_text(node, name))
            .map(|text| NameList::from_serialized(&text))
            .unwrap_or_default();

        Ok(AttributeDefinition {
            datatype: self.attribute(node, "datatype").unwrap_or_default().to_string(),
            placement: self
                .child_text(node, "placement")
                .and_then(|p| p.parse().ok())
                .unwrap_or(0),
            is_required: self.flag(node, "required"),
            is_searchable: self.flag(node, "searchable"),
            is_information_collector: self.flag(node, "information-collector"),
            can_translate: self.flag(node, "translatable"),
            unsupported: self.flag(node, "unsupported"),
            name_list: self.name_list(node, "serialized-name-list", locale),
            description_list: self.name_list(node, "serialized-description-list", ""),
            category: self.child_text(node, "category").unwrap_or_default(),
            identifier,
            data_text,
            datatype_parameters,
        })
    }

    /// Read a serialized name list, falling back to the plain `name` element
    /// when the list is empty and a locale is given.
    fn name_list(&self, parent: Node, element: &str, locale: &str) -> NameList {
        let list = self
            .child_text(parent, element)
            .map(|text| NameList::from_serialized(&text))
            .unwrap_or_default();
        if !list.is_empty() || locale.is_empty() {
            return list;
        }
        match self.child_text(parent, "name") {
            Some(name) if !name.is_empty() => NameList::from_name(name, locale),
            _ => list,
        }
    }

    /// Re-encode every `serialized-*` field from the legacy format to JSON.
    /// Returns the number of fields that changed.
    pub fn reencode_serialized_fields(&mut self) -> Result<usize> {
        let mut changed = 0;
        for node in self.serialized_fields() {
            let text = self.xot.string_value(node);
            let encoded = serialized::reencode(&text);
            if encoded != text {
                self.set_text(node, &encoded)?;
                changed += 1;
            }
        }
        debug!(
            "Re-encoded {} serialized field(s) in {}",
            changed,
            self.path.display()
        );
        Ok(changed)
    }

    /// Overwrite `remote/modified` with `timestamp`. Returns `false` and
    /// leaves the document alone when there is no such node.
    pub fn stamp_modified(&mut self, timestamp: i64) -> Result<bool> {
        self.stamp("modified", timestamp)
    }

    /// Overwrite `remote/created` with `timestamp`, if present.
    pub fn stamp_created(&mut self, timestamp: i64) -> Result<bool> {
        self.stamp("created", timestamp)
    }

    fn stamp(&mut self, element: &str, timestamp: i64) -> Result<bool> {
        let Some(node) = self.remote_child(element) else {
            debug!("No remote/{} in {}, not stamped", element, self.path.display());
            return Ok(false);
        };
        debug!("Set {} to {} in {}", element, timestamp, self.path.display());
        self.set_text(node, &timestamp.to_string())?;
        Ok(true)
    }

    /// Renumber every attribute `placement` to 1..N in document order.
    /// Returns N.
    pub fn normalize_placement(&mut self) -> Result<usize> {
        let placements: Vec<Node> = match self.attributes_container() {
            Some(container) => self
                .children_named(container, "attribute")
                .into_iter()
                .filter_map(|attr| self.child(attr, "placement"))
                .collect(),
            None => Vec::new(),
        };
        for (index, node) in placements.iter().enumerate() {
            self.set_text(*node, &(index + 1).to_string())?;
        }
        debug!(
            "Updated placement for {} attribute(s) in {}",
            placements.len(),
            self.path.display()
        );
        Ok(placements.len())
    }

    /// Put a comment holding the attribute identifier in front of each
    /// `attribute` element, replacing a comment already there.
    pub fn annotate_attributes(&mut self) -> Result<()> {
        let Some(container) = self.attributes_container() else {
            return Ok(());
        };
        for attr in self.children_named(container, "attribute") {
            if let Some(previous) = self.xot.previous_sibling(attr) {
                if self.xot.is_comment(previous) {
                    self.xot.remove(previous)?;
                }
            }
            let Some(identifier) = self.child_text(attr, "identifier") else {
                continue;
            };
            let comment = self.xot.new_comment(&format!(" {identifier} "));
            self.xot.insert_before(attr, comment)?;
        }
        Ok(())
    }

    /// Fill missing locales in every `serialized-*` map from the current
    /// locale. Returns the number of fields rewritten.
    pub fn backfill_locales(&mut self, locales: &dyn LocaleProvider) -> Result<usize> {
        let mut changed = 0;
        for node in self.serialized_fields() {
            let text = self.xot.string_value(node);
            if let Some(filled) = serialized::backfill_locales(&text, locales) {
                self.set_text(node, &filled)?;
                changed += 1;
            }
        }
        debug!(
            "Back-filled locales in {} field(s) of {}",
            changed,
            self.path.display()
        );
        Ok(changed)
    }

    /// Full normalization applied to freshly extracted definitions.
    pub fn transform(&mut self, clock: &dyn Clock) -> Result<()> {
        let now = clock.now();
        self.reencode_serialized_fields()?;
        self.stamp_created(now)?;
        self.stamp_modified(now)?;
        self.normalize_placement()?;
        self.annotate_attributes()
    }

    /// Serialize with indentation and an XML declaration.
    pub fn to_xml_string(&self) -> Result<String> {
        let parameters = Parameters {
            indentation: Some(Default::default()),
            declaration: Some(Declaration {
                encoding: Some("UTF-8".to_string()),
                standalone: None,
            }),
            ..Default::default()
        };
        Ok(self.xot.serialize_xml_string(parameters, self.document)?)
    }

    /// Write the document back to the file it was read from.
    pub fn save(&self) -> Result<()> {
        self.save_as(&self.path)
    }

    pub fn save_as(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_xml_string()?)?;
        Ok(())
    }

    fn serialized_fields(&self) -> Vec<Node> {
        self.xot
            .descendants(self.root)
            .filter(|&node| {
                self.local_name(node)
                    .is_some_and(|name| name.starts_with(SERIALIZED_PREFIX))
            })
            .collect()
    }

    /// The namespaced `attributes` container directly under the root.
    fn attributes_container(&self) -> Option<Node> {
        self.child(self.root, "attributes")
    }

    fn remote_child(&self, name: &str) -> Option<Node> {
        let remote = self.child(self.root, "remote")?;
        self.child(remote, name)
    }

    fn local_name(&self, node: Node) -> Option<&str> {
        self.xot
            .element(node)
            .map(|element| self.xot.local_name_str(element.name()))
    }

    fn child(&self, parent: Node, name: &str) -> Option<Node> {
        self.xot
            .children(parent)
            .find(|&node| self.local_name(node) == Some(name))
    }

    fn children_named(&self, parent: Node, name: &str) -> Vec<Node> {
        self.xot
            .children(parent)
            .filter(|&node| self.local_name(node) == Some(name))
            .collect()
    }

    fn text(&self, node: Node) -> String {
        self.xot.string_value(node).trim().to_string()
    }

    fn child_text(&self, parent: Node, name: &str) -> Option<String> {
        self.child(parent, name).map(|node| self.text(node))
    }

    fn attribute(&self, node: Node, name: &str) -> Option<&str> {
        let name = self.xot.name(name)?;
        self.xot.get_attribute(node, name)
    }

    fn flag(&self, node: Node, name: &str) -> bool {
        self.attribute(node, name)
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
    }

    fn set_text(&mut self, node: Node, value: &str) -> Result<()> {
        let children: Vec<Node> = self.xot.children(node).collect();
        for child in children {
            self.xot.remove(child)?;
        }
        if !value.is_empty() {
            self.xot.append_text(node, value)?;
        }
        Ok(())
    }

    fn parse_error(&self, message: impl Into<String>) -> Error {
        Error::Parse {
            path: self.path.clone(),
            message: message.into(),
        }
    }
}
