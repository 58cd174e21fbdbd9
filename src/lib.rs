//! # Content Class Package Library
//!
//! This library provides the core functionality of the `classpkg` command
//! line tool: it keeps content class definitions of a legacy CMS in editable
//! XML packages, installs them into a class store, and reports how a
//! repository of packages differs from what is installed.
//!
//! ## Quick Example
//!
//! ```
//! use classpkg::clock::FixedClock;
//! use classpkg::decision::NonInteractive;
//! use classpkg::definition::ClassDocument;
//! use classpkg::merge::{merge_class, MergeContext, MergeOutcome};
//! use classpkg::store::{ClassStore, MemoryStore};
//! use classpkg::version;
//!
//! let xml = r#"<content-class>
//!   <identifier>folder</identifier>
//!   <remote-id>a3d405b81be900468eb153d774f4f0d2</remote-id>
//!   <serialized-name-list>{"eng-GB":"Folder","always-available":"eng-GB"}</serialized-name-list>
//!   <remote><modified>1100000000</modified></remote>
//! </content-class>"#;
//! let definition = ClassDocument::parse_str(xml, "class-folder.xml")
//!     .unwrap()
//!     .definition("eng-GB")
//!     .unwrap();
//!
//! let mut store = MemoryStore::new();
//! let ctx = MergeContext {
//!     clock: &FixedClock(1_700_000_000),
//!     resolver: &NonInteractive,
//!     user_id: 14,
//! };
//! let outcome = merge_class(&mut store, &definition, &ctx).unwrap();
//! assert!(matches!(outcome, MergeOutcome::Created(_)));
//! assert!(version::is_definition_current(&store, &definition).unwrap());
//! assert_eq!(store.classes().unwrap().len(), 1);
//! ```
//!
//! ## Core Concepts
//!
//! - **Definitions (`definition`)**: One class per XML file, parsed into a
//!   [`definition::ClassDefinition`] and normalized in place (serialized
//!   fields as JSON, dense placement, attribute comments, timestamps).
//! - **Packages (`manifest`, `repository`)**: A package folder lists its
//!   items in `package.xml`; a repository is a folder of packages.
//! - **Store (`store`)**: The persisted classes, attributes, content objects
//!   and groups, behind the [`store::ClassStore`] trait.
//! - **Merge (`merge`)**: Brings a definition into the store, syncing
//!   attributes by identifier and groups by name.
//! - **Installer (`installer`)**: Runs every item of a package through its
//!   handler and reports an outcome per item.
//! - **Diff (`status`)**: Classifies identifiers as new, removed or modified.
//!
//! Time, locales and operator decisions are passed in as capabilities
//! (`clock`, `decision`) so that every engine runs deterministically in
//! tests.

pub mod archive;
pub mod clock;
pub mod config;
pub mod decision;
pub mod defaults;
pub mod definition;
pub mod error;
pub mod installer;
pub mod manifest;
pub mod merge;
pub mod output;
pub mod repository;
pub mod serialized;
pub mod status;
pub mod store;
pub mod suggestions;
pub mod version;

#[cfg(test)]
mod proptests;
