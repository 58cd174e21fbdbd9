//! Shared test utilities for integration and E2E tests.
//!
//! Add `mod common;` to a test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new()
//!         .with_package("blog", &[ClassXml::new("blog_post").modified("1100000000")]);
//!     fixture.command().arg("install").arg("repo/*").assert().success();
//! }
//! ```

#![allow(dead_code)]

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::{AttributeXml, ClassXml, TestFixture};
}

/// Builder for one `<attribute>` of a class definition.
#[derive(Debug, Clone)]
pub struct AttributeXml {
    identifier: String,
    datatype: String,
    name: String,
    placement: u32,
    required: bool,
}

impl AttributeXml {
    pub fn new(identifier: &str, datatype: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            datatype: datatype.to_string(),
            name: identifier.to_string(),
            placement: 1,
            required: false,
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn placement(mut self, placement: u32) -> Self {
        self.placement = placement;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn to_xml(&self) -> String {
        format!(
            r#"<attribute datatype="{datatype}" required="{required}" searchable="true" information-collector="false" translatable="true">
      <serialized-name-list>{{"eng-GB":"{name}","always-available":"eng-GB"}}</serialized-name-list>
      <identifier>{identifier}</identifier>
      <placement>{placement}</placement>
    </attribute>"#,
            datatype = self.datatype,
            required = self.required,
            name = self.name,
            identifier = self.identifier,
            placement = self.placement,
        )
    }
}

/// Builder for a `content-class` definition document.
#[derive(Debug, Clone)]
pub struct ClassXml {
    identifier: String,
    remote_id: String,
    name: String,
    modified: String,
    groups: Vec<(u64, String)>,
    attributes: Vec<AttributeXml>,
}

impl ClassXml {
    pub fn new(identifier: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            remote_id: format!("remote-{identifier}"),
            name: identifier.to_string(),
            modified: "1100000000".to_string(),
            groups: vec![(1, "Content".to_string())],
            attributes: Vec::new(),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn remote_id(mut self, remote_id: &str) -> Self {
        self.remote_id = remote_id.to_string();
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn modified(mut self, modified: &str) -> Self {
        self.modified = modified.to_string();
        self
    }

    pub fn group(mut self, id: u64, name: &str) -> Self {
        self.groups.push((id, name.to_string()));
        self
    }

    pub fn attribute(mut self, attribute: AttributeXml) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn to_xml(&self) -> String {
        let groups: String = self
            .groups
            .iter()
            .map(|(id, name)| format!(r#"<group id="{id}" name="{name}" />"#))
            .collect();
        let attributes: String = self.attributes.iter().map(AttributeXml::to_xml).collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<content-class is-container="false" always-available="false">
  <identifier>{identifier}</identifier>
  <remote-id>{remote_id}</remote-id>
  <serialized-name-list>{{"eng-GB":"{name}","always-available":"eng-GB"}}</serialized-name-list>
  <object-name-pattern>&lt;title&gt;</object-name-pattern>
  <remote>
    <id>1</id>
    <created>1024392098</created>
    <modified>{modified}</modified>
    <groups>{groups}</groups>
  </remote>
  <ezcontentclass-attri:attributes xmlns:ezcontentclass-attri="http://ezpublish/contentclassattribute">
    {attributes}
  </ezcontentclass-attri:attributes>
</content-class>
"#,
            identifier = self.identifier,
            remote_id = self.remote_id,
            name = self.name,
            modified = self.modified,
        )
    }
}

/// A `package.xml` listing one content class item per identifier.
pub fn manifest_xml(name: &str, identifiers: &[&str]) -> String {
    let items: String = identifiers
        .iter()
        .map(|id| {
            format!(
                r#"    <item type="ezcontentclass" sub-directory="ezcontentclass" filename="class-{id}" />
"#
            )
        })
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<package>\n  <name>{name}</name>\n  <install>\n{items}  </install>\n</package>\n"
    )
}

/// A temporary directory holding a package repository under `repo/` and a
/// store file at `store.json`.
///
/// ```rust,ignore
/// let fixture = TestFixture::new().with_package("blog", &[ClassXml::new("blog_post")]);
/// fixture.command().arg("install").arg(fixture.package_pattern()).assert().success();
/// ```
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a `.classpkg.yaml` configuration file with the given content.
    pub fn with_config(self, content: &str) -> Self {
        self.with_file(".classpkg.yaml", content)
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Add a binary file with the given path and content.
    pub fn with_binary_file(self, path: &str, content: &[u8]) -> Self {
        self.temp_dir
            .child(path)
            .write_binary(content)
            .expect("Failed to write binary file");
        self
    }

    /// Add `repo/<name>` with a manifest and one definition per class.
    pub fn with_package(self, name: &str, classes: &[ClassXml]) -> Self {
        let identifiers: Vec<&str> = classes.iter().map(ClassXml::identifier).collect();
        let fixture = self.with_file(&format!("repo/{name}/package.xml"), &manifest_xml(name, &identifiers));
        classes.iter().fold(fixture, |fixture, class| {
            fixture.with_class_file(name, class)
        })
    }

    /// Write (or overwrite) one definition inside `repo/<package>`.
    pub fn with_class_file(self, package: &str, class: &ClassXml) -> Self {
        let path = format!("repo/{package}/ezcontentclass/class-{}.xml", class.identifier());
        self.with_file(&path, &class.to_xml())
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn repo_path(&self) -> PathBuf {
        self.path().join("repo")
    }

    pub fn store_path(&self) -> PathBuf {
        self.path().join("store.json")
    }

    /// Glob matching every package of the repository.
    pub fn package_pattern(&self) -> String {
        format!("{}/*", self.repo_path().display())
    }

    pub fn class_path(&self, package: &str, identifier: &str) -> PathBuf {
        self.repo_path()
            .join(package)
            .join("ezcontentclass")
            .join(format!("class-{identifier}.xml"))
    }

    /// Create a child path in the temp directory.
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Create a command running in this fixture's directory, pointed at the
    /// fixture's store and with colors off.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("classpkg");
        cmd.current_dir(self.path())
            .env_remove("CLASSPKG_CONFIG")
            .env_remove("RUST_LOG")
            .env("CLASSPKG_STORE", self.store_path())
            .arg("--color")
            .arg("never");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_with_package() {
        let fixture = TestFixture::new().with_package("blog", &[ClassXml::new("blog_post")]);
        assert!(fixture.repo_path().join("blog/package.xml").exists());
        assert!(fixture.class_path("blog", "blog_post").exists());
    }

    #[test]
    fn test_class_xml_parses() {
        let xml = ClassXml::new("article")
            .attribute(AttributeXml::new("title", "ezstring").required())
            .to_xml();
        let doc = classpkg::definition::ClassDocument::parse_str(&xml, "class-article.xml").unwrap();
        let def = doc.definition("eng-GB").unwrap();
        assert_eq!(def.identifier, "article");
        assert_eq!(def.attributes.len(), 1);
        assert!(def.attributes[0].is_required);
    }

    #[test]
    fn test_manifest_lists_items() {
        let xml = manifest_xml("blog", &["blog_post", "comment"]);
        assert!(xml.contains(r#"filename="class-blog_post""#));
        assert!(xml.contains(r#"filename="class-comment""#));
    }
}
