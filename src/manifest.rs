//! # Package Manifests
//!
//! A package is a folder holding a `package.xml` manifest and the files its
//! items reference. The manifest lists install items:
//!
//! ```xml
//! <package>
//!   <name>blog</name>
//!   <install>
//!     <item type="ezcontentclass" sub-directory="ezcontentclass" filename="class-blog" />
//!   </install>
//! </package>
//! ```
//!
//! An item's file lives at `<package>/<sub-directory>/<filename>.xml`. An
//! optional `<uninstall>` list overrides the install list when removing the
//! package.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use xot::{Node, Xot};

use crate::definition::ClassDocument;
use crate::error::{Error, Result};
use crate::store::ClassStore;
use crate::version;

/// File name of the manifest inside a package folder.
pub const MANIFEST_FILENAME: &str = "package.xml";

/// Install item type handled by this crate.
pub const CONTENT_CLASS_TYPE: &str = "ezcontentclass";

/// The kind of an install item, from its `type` attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemKind {
    ContentClass,
    Other(String),
}

impl ItemKind {
    pub fn from_type(value: &str) -> Self {
        if value == CONTENT_CLASS_TYPE {
            ItemKind::ContentClass
        } else {
            ItemKind::Other(value.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ItemKind::ContentClass => CONTENT_CLASS_TYPE,
            ItemKind::Other(value) => value,
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `<item>` of an install or uninstall list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallItem {
    pub kind: ItemKind,
    pub sub_directory: Option<String>,
    /// File name without the `.xml` extension.
    pub filename: Option<String>,
    pub name: Option<String>,
}

impl InstallItem {
    /// The definition file this item references inside `package_dir`, if
    /// the item names one.
    pub fn file_path(&self, package_dir: &Path) -> Option<PathBuf> {
        let sub_directory = self.sub_directory.as_deref()?;
        let filename = self.filename.as_deref()?;
        Some(package_dir.join(sub_directory).join(format!("{filename}.xml")))
    }

    /// A label for log output.
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .or(self.filename.as_deref())
            .unwrap_or("(unnamed)")
    }
}

/// The parsed `package.xml`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    /// Value of the `<name>` element, if any.
    pub name: Option<String>,
    pub install: Vec<InstallItem>,
    pub uninstall: Vec<InstallItem>,
}

impl Manifest {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::not_found("Manifest", path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Self::parse_str(&content, path)
    }

    pub fn parse_str(content: &str, path: &Path) -> Result<Self> {
        let mut xot = Xot::new();
        let document = xot.parse(content).map_err(|e| Error::Parse {
            path: path.to_path_buf(),
            message: xot::Error::from(e).to_string(),
        })?;
        let root = xot.document_element(document)?;

        let name = child(&xot, root, "name").map(|node| xot.string_value(node).trim().to_string());
        let install = first_descendant(&xot, root, "install")
            .map(|list| items(&xot, list))
            .unwrap_or_default();
        let uninstall = first_descendant(&xot, root, "uninstall")
            .map(|list| items(&xot, list))
            .unwrap_or_default();

        Ok(Self {
            name: name.filter(|n| !n.is_empty()),
            install,
            uninstall,
        })
    }

    /// Items used for removal: the uninstall list, or the install list when
    /// there is none.
    pub fn uninstall_items(&self) -> &[InstallItem] {
        if self.uninstall.is_empty() {
            &self.install
        } else {
            &self.uninstall
        }
    }
}

fn local_name<'a>(xot: &'a Xot, node: Node) -> Option<&'a str> {
    xot.element(node).map(|e| xot.local_name_str(e.name()))
}

fn child(xot: &Xot, parent: Node, name: &str) -> Option<Node> {
    xot.children(parent).find(|&n| local_name(xot, n) == Some(name))
}

fn first_descendant(xot: &Xot, parent: Node, name: &str) -> Option<Node> {
    xot.descendants(parent).find(|&n| local_name(xot, n) == Some(name))
}

fn items(xot: &Xot, list: Node) -> Vec<InstallItem> {
    let attribute = |node: Node, name: &str| {
        xot.name(name)
            .and_then(|name| xot.get_attribute(node, name))
            .map(str::to_string)
    };
    xot.children(list)
        .filter(|&n| xot.is_element(n))
        .map(|node| InstallItem {
            kind: ItemKind::from_type(&attribute(node, "type").unwrap_or_default()),
            sub_directory: attribute(node, "sub-directory"),
            filename: attribute(node, "filename"),
            name: attribute(node, "name"),
        })
        .collect()
}

/// A package folder with its manifest loaded.
#[derive(Debug, Clone)]
pub struct Package {
    name: String,
    path: PathBuf,
    manifest: Manifest,
}

impl Package {
    /// Load the package in folder `path`. The folder name is the package
    /// name.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Err(Error::not_found("Package folder", path.display().to_string()));
        }
        let manifest = Manifest::open(path.join(MANIFEST_FILENAME))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .or_else(|| manifest.name.clone())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self {
            name,
            path: path.to_path_buf(),
            manifest,
        })
    }

    /// Whether `path` is a folder with a manifest.
    pub fn is_package(path: &Path) -> bool {
        path.is_dir() && path.join(MANIFEST_FILENAME).is_file()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Existing class definition files referenced by content class install
    /// items, in manifest order.
    pub fn class_definition_files(&self) -> Vec<PathBuf> {
        self.manifest
            .install
            .iter()
            .filter(|item| item.kind == ItemKind::ContentClass)
            .filter_map(|item| item.file_path(&self.path))
            .filter(|file| {
                let exists = file.is_file();
                if !exists {
                    debug!("Skipping missing definition {}", file.display());
                }
                exists
            })
            .collect()
    }

    /// Whether any referenced class is not installed at a current version.
    /// Stops at the first stale class.
    pub fn needs_update(&self, store: &dyn ClassStore) -> Result<bool> {
        for file in self.class_definition_files() {
            let document = ClassDocument::open(&file)?;
            let identifier = document.identifier()?;
            if !version::is_installed_version_current(store, &identifier, &document.modified())? {
                debug!("Package {} is stale at class {}", self.name, identifier);
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Identifiers of every referenced class that is not installed at a
    /// current version.
    pub fn stale_classes(&self, store: &dyn ClassStore) -> Result<Vec<String>> {
        let mut stale = Vec::new();
        for file in self.class_definition_files() {
            let document = ClassDocument::open(&file)?;
            let identifier = document.identifier()?;
            if !version::is_installed_version_current(store, &identifier, &document.modified())? {
                stale.push(identifier);
            }
        }
        Ok(stale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, PersistedClass};

    const MANIFEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<package version="3.5.2">
  <name>blog</name>
  <install>
    <item type="ezcontentclass" sub-directory="ezcontentclass" filename="class-blog" name="Blog" />
    <item type="ezcontentclass" sub-directory="ezcontentclass" filename="class-post" />
    <item type="ezfile" sub-directory="files" filename="logo" />
    <item type="ezcontentclass" filename="broken" />
  </install>
</package>"#;

    fn class_xml(identifier: &str, modified: &str) -> String {
        format!(
            "<content-class><identifier>{identifier}</identifier>\
             <remote><modified>{modified}</modified></remote></content-class>"
        )
    }

    fn write_package(dir: &Path, classes: &[(&str, &str, &str)]) {
        fs::create_dir_all(dir.join("ezcontentclass")).unwrap();
        fs::write(dir.join(MANIFEST_FILENAME), MANIFEST).unwrap();
        for (file, identifier, modified) in classes {
            fs::write(
                dir.join("ezcontentclass").join(format!("{file}.xml")),
                class_xml(identifier, modified),
            )
            .unwrap();
        }
    }

    fn installed(identifier: &str, modified: &str) -> PersistedClass {
        PersistedClass {
            identifier: identifier.to_string(),
            remote_id: format!("r-{identifier}"),
            modified: modified.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_manifest_items() {
        let manifest = Manifest::parse_str(MANIFEST, Path::new("package.xml")).unwrap();
        assert_eq!(manifest.name.as_deref(), Some("blog"));
        assert_eq!(manifest.install.len(), 4);
        assert_eq!(manifest.install[0].kind, ItemKind::ContentClass);
        assert_eq!(manifest.install[0].label(), "Blog");
        assert_eq!(manifest.install[2].kind, ItemKind::Other("ezfile".to_string()));
        assert!(manifest.install[3].sub_directory.is_none());
        assert_eq!(manifest.uninstall_items().len(), 4);
    }

    #[test]
    fn test_uninstall_list_overrides_install_list() {
        let xml = r#"<package>
  <install><item type="ezcontentclass" sub-directory="c" filename="a" /></install>
  <uninstall><item type="ezcontentclass" sub-directory="c" filename="b" /></uninstall>
</package>"#;
        let manifest = Manifest::parse_str(xml, Path::new("package.xml")).unwrap();
        let items = manifest.uninstall_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].filename.as_deref(), Some("b"));
    }

    #[test]
    fn test_malformed_manifest_is_parse_error() {
        let result = Manifest::parse_str("<package><install>", Path::new("package.xml"));
        assert!(matches!(result, Err(Error::Parse { .. })));
    }

    #[test]
    fn test_load_requires_manifest() {
        let temp = tempfile::tempdir().unwrap();
        assert!(!Package::is_package(temp.path()));
        assert!(matches!(
            Package::load(temp.path()),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn test_class_definition_files_skip_missing() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("blog");
        write_package(&dir, &[("class-blog", "blog", "100")]);

        let package = Package::load(&dir).unwrap();
        assert_eq!(package.name(), "blog");
        let files = package.class_definition_files();
        assert_eq!(files, vec![dir.join("ezcontentclass").join("class-blog.xml")]);
    }

    #[test]
    fn test_needs_update() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("blog");
        write_package(&dir, &[("class-blog", "blog", "1200"), ("class-post", "post", "1200")]);
        let package = Package::load(&dir).unwrap();

        let mut store = MemoryStore::new();
        assert!(package.needs_update(&store).unwrap());

        store.create_class(installed("blog", "1200")).unwrap();
        store.create_class(installed("post", "1100")).unwrap();
        assert!(package.needs_update(&store).unwrap());

        let mut post = store.class_by_identifier("post").unwrap().unwrap();
        post.modified = "1300".to_string();
        store.update_class(&post).unwrap();
        assert!(!package.needs_update(&store).unwrap());
    }
}
