//! # Class Definitions
//!
//! A class definition file describes one content class: its identifier,
//! cross-environment remote id, per-language names, patterns, group
//! memberships and the ordered list of attributes.
//!
//! [`ClassDocument`] keeps the file as an XML tree so that the normalizing
//! rewrites (re-encoding serialized fields, timestamp stamping, placement
//! renumbering, attribute comments, locale back-fill) can be applied and
//! saved. [`ClassDefinition`] is the plain, immutable value extracted from
//! it and consumed by the merge engine.
//!
//! ```
//! use classpkg::definition::ClassDocument;
//!
//! let xml = r#"<content-class>
//!   <identifier>folder</identifier>
//!   <remote-id>a3d405b81be900468eb153d774f4f0d2</remote-id>
//!   <remote><modified>1100000000</modified></remote>
//! </content-class>"#;
//!
//! let doc = ClassDocument::parse_str(xml, "class-folder.xml").unwrap();
//! let def = doc.definition("eng-GB").unwrap();
//! assert_eq!(def.identifier, "folder");
//! assert_eq!(def.modified, "1100000000");
//! ```

mod document;
mod export;

pub use document::{ClassDocument, ROOT_ELEMENT, SERIALIZED_PREFIX};
pub use export::{definition_file_name, export_class, ATTRIBUTE_NAMESPACE, ATTRIBUTE_PREFIX};

use std::path::Path;

use crate::defaults;
use crate::error::Result;
use crate::serialized::NameList;

/// One content class as described by a definition file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDefinition {
    pub identifier: String,
    pub remote_id: String,
    pub name_list: NameList,
    pub description_list: NameList,
    pub object_name_pattern: String,
    pub url_alias_pattern: Option<String>,
    pub is_container: bool,
    /// Only applied when the definition carries the attribute.
    pub always_available: Option<bool>,
    pub sort_field: Option<String>,
    pub sort_order: Option<String>,
    /// Numeric id in the exporting system. Informational only.
    pub remote_class_id: Option<u64>,
    pub created: String,
    /// Version marker compared against the installed class.
    pub modified: String,
    pub groups: Vec<GroupRef>,
    pub attributes: Vec<AttributeDefinition>,
}

/// Reference to a class group by name, with the id from the exporting
/// system as a fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRef {
    pub id: Option<u64>,
    pub name: String,
}

/// One attribute (field) of a class definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDefinition {
    pub identifier: String,
    pub datatype: String,
    pub placement: u32,
    pub is_required: bool,
    pub is_searchable: bool,
    pub is_information_collector: bool,
    pub can_translate: bool,
    /// Marked as not importable by the exporting system.
    pub unsupported: bool,
    pub name_list: NameList,
    pub description_list: NameList,
    pub data_text: NameList,
    pub category: String,
    /// Raw `datatype-parameters` element, opaque to this crate.
    pub datatype_parameters: Option<String>,
}

impl ClassDefinition {
    /// Attributes that take part in create and merge.
    pub fn supported_attributes(&self) -> impl Iterator<Item = &AttributeDefinition> {
        self.attributes.iter().filter(|a| !a.unsupported)
    }

    /// Display name, falling back to the identifier.
    pub fn display_name(&self) -> &str {
        self.name_list.name().unwrap_or(&self.identifier)
    }
}

/// Parse a class definition file using the default locale for pre-3.8
/// plain names.
pub fn parse(path: impl AsRef<Path>) -> Result<ClassDefinition> {
    ClassDocument::open(path)?.definition(defaults::DEFAULT_LOCALE)
}
