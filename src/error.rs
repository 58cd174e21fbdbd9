//! # Error Handling
//!
//! This module defines the single error type used by the `classpkg` library.
//! It uses `thiserror` to derive descriptive messages for every failure mode
//! the package tooling can run into.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. Variants follow the failure taxonomy of the
//!   installer: missing inputs (`NotFound`), unreadable definitions
//!   (`Parse`), operator decisions that were requested but not supplied
//!   (`Conflict`), removals blocked by content objects (`Dependency`) and
//!   store failures (`Store`). Foreign errors are wrapped with `#[from]`.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! A skipped item is never an error. Per-item outcomes are reported through
//! [`crate::installer::ItemOutcome`].

use std::path::PathBuf;

use thiserror::Error;

use crate::decision::{Action, ConflictKind};

/// Main error type for classpkg operations
#[derive(Error, Debug)]
pub enum Error {
    /// A referenced file, folder, class, object or package does not exist.
    #[error("{what} not found: {name}")]
    NotFound { what: String, name: String },

    /// A class definition or package manifest is malformed or lacks a
    /// required node.
    #[error("Parse error in {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// An existing class requires an operator decision that nobody supplied.
    ///
    /// Carries the actions the operator may choose from.
    #[error("Decision required ({kind}) for {subject}: choose one of {}", format_actions(actions))]
    Conflict {
        kind: ConflictKind,
        subject: String,
        actions: Vec<Action>,
    },

    /// Removing a class is blocked by content objects that still use it.
    #[error("Class {class} still has {objects} content object(s): choose one of {}", format_actions(actions))]
    Dependency {
        class: String,
        objects: usize,
        actions: Vec<Action>,
    },

    /// The persisted store rejected an operation or a transaction failed.
    #[error("Store error: {message}")]
    Store { message: String },

    /// A package archive could not be read or extracted.
    #[error("Archive error for {}: {message}", path.display())]
    Archive { path: PathBuf, message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// An XML tree error, wrapped from `xot::Error`.
    #[error("XML error: {0}")]
    Xml(#[from] xot::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),
}

impl Error {
    /// Shorthand for a [`Error::NotFound`] value.
    pub fn not_found(what: impl Into<String>, name: impl Into<String>) -> Self {
        Error::NotFound {
            what: what.into(),
            name: name.into(),
        }
    }

    /// Shorthand for a [`Error::Store`] value.
    pub fn store(message: impl Into<String>) -> Self {
        Error::Store {
            message: message.into(),
        }
    }
}

fn format_actions(actions: &[Action]) -> String {
    actions
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
