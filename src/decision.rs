//! # Operator Decisions
//!
//! Installing a class that already exists, or removing a class that still
//! has content objects, needs a choice from whoever runs the tool. The
//! engines describe the situation as a [`Conflict`] and ask a
//! [`DecisionResolver`]:
//!
//! - [`NonInteractive`] answers with the batch defaults: replace an existing
//!   class, skip removal of a class that has objects.
//! - [`PromptResolver`] asks on the terminal with a `dialoguer` selection.
//! - [`FixedDecision`] answers with preset actions.
//!
//! A resolver may decline to answer. The engine then reports the conflict
//! as an error carrying the candidate actions.

use std::fmt;

use dialoguer::theme::ColorfulTheme;
use dialoguer::Select;

use crate::error::Error;

/// The situation that needs a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// A class with the same remote id is already installed.
    ClassExists,
    /// A class scheduled for removal still has content objects.
    HasObjects,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictKind::ClassExists => write!(f, "class exists"),
            ConflictKind::HasObjects => write!(f, "has objects"),
        }
    }
}

/// An answer to a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Overwrite the installed class with the definition.
    Replace,
    /// Leave the installed class alone.
    Skip,
    /// Keep the installed class and install the definition as a new class.
    New,
    /// Delete the content objects, then the class.
    Delete,
}

impl Action {
    fn describe(self) -> &'static str {
        match self {
            Action::Replace => "Replace the installed class",
            Action::Skip => "Skip",
            Action::New => "Keep the installed class and create a new one",
            Action::Delete => "Delete the objects and remove the class",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Replace => "replace",
            Action::Skip => "skip",
            Action::New => "new",
            Action::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// A decision request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub kind: ConflictKind,
    /// Identifier of the class concerned.
    pub subject: String,
    /// Human readable description used as prompt.
    pub description: String,
    /// Number of content objects involved.
    pub objects: usize,
    pub actions: Vec<Action>,
}

impl Conflict {
    pub fn class_exists(identifier: &str, name: &str) -> Self {
        Self {
            kind: ConflictKind::ClassExists,
            subject: identifier.to_string(),
            description: format!("The class '{name}' ({identifier}) is already installed"),
            objects: 0,
            actions: vec![Action::Replace, Action::Skip, Action::New],
        }
    }

    pub fn has_objects(identifier: &str, name: &str, objects: usize) -> Self {
        Self {
            kind: ConflictKind::HasObjects,
            subject: identifier.to_string(),
            description: format!(
                "Removing class '{name}' ({identifier}) will result in the removal of {objects} object(s)"
            ),
            objects,
            actions: vec![Action::Delete, Action::Skip],
        }
    }

    /// The error reported when nobody answers this conflict.
    pub fn into_error(self) -> Error {
        match self.kind {
            ConflictKind::ClassExists => Error::Conflict {
                kind: self.kind,
                subject: self.subject,
                actions: self.actions,
            },
            ConflictKind::HasObjects => Error::Dependency {
                class: self.subject,
                objects: self.objects,
                actions: self.actions,
            },
        }
    }
}

/// Answers conflicts on behalf of the operator.
pub trait DecisionResolver {
    /// Pick one of `conflict.actions`, or `None` to leave it undecided.
    fn resolve(&self, conflict: &Conflict) -> Option<Action>;
}

/// Batch defaults: replace existing classes, skip removal of classes with
/// objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonInteractive;

impl DecisionResolver for NonInteractive {
    fn resolve(&self, conflict: &Conflict) -> Option<Action> {
        match conflict.kind {
            ConflictKind::ClassExists => Some(Action::Replace),
            ConflictKind::HasObjects => Some(Action::Skip),
        }
    }
}

/// Preset answers per conflict kind. Unset kinds stay undecided.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedDecision {
    class_exists: Option<Action>,
    has_objects: Option<Action>,
}

impl FixedDecision {
    /// A resolver that never decides.
    pub fn undecided() -> Self {
        Self::default()
    }

    pub fn on_class_exists(mut self, action: Action) -> Self {
        self.class_exists = Some(action);
        self
    }

    pub fn on_has_objects(mut self, action: Action) -> Self {
        self.has_objects = Some(action);
        self
    }
}

impl DecisionResolver for FixedDecision {
    fn resolve(&self, conflict: &Conflict) -> Option<Action> {
        let action = match conflict.kind {
            ConflictKind::ClassExists => self.class_exists,
            ConflictKind::HasObjects => self.has_objects,
        }?;
        conflict.actions.contains(&action).then_some(action)
    }
}

/// Asks on the terminal.
pub struct PromptResolver {
    theme: ColorfulTheme,
}

impl PromptResolver {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for PromptResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionResolver for PromptResolver {
    fn resolve(&self, conflict: &Conflict) -> Option<Action> {
        let labels: Vec<&str> = conflict.actions.iter().map(|a| a.describe()).collect();
        let selection = Select::with_theme(&self.theme)
            .with_prompt(&conflict.description)
            .items(&labels)
            .default(0)
            .interact_opt();
        match selection {
            Ok(Some(index)) => conflict.actions.get(index).copied(),
            Ok(None) => None,
            Err(err) => {
                log::warn!("Could not prompt for a decision: {}", err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_interactive_defaults() {
        let exists = Conflict::class_exists("article", "Article");
        let objects = Conflict::has_objects("article", "Article", 2);
        assert_eq!(NonInteractive.resolve(&exists), Some(Action::Replace));
        assert_eq!(NonInteractive.resolve(&objects), Some(Action::Skip));
    }

    #[test]
    fn test_fixed_decision_only_returns_offered_actions() {
        let resolver = FixedDecision::undecided()
            .on_class_exists(Action::Delete)
            .on_has_objects(Action::Delete);
        assert_eq!(
            resolver.resolve(&Conflict::class_exists("a", "A")),
            None
        );
        assert_eq!(
            resolver.resolve(&Conflict::has_objects("a", "A", 1)),
            Some(Action::Delete)
        );
    }

    #[test]
    fn test_undecided_resolver() {
        let resolver = FixedDecision::undecided();
        assert_eq!(resolver.resolve(&Conflict::class_exists("a", "A")), None);
    }

    #[test]
    fn test_conflict_into_error() {
        let error = Conflict::class_exists("article", "Article").into_error();
        match error {
            Error::Conflict { actions, .. } => {
                assert_eq!(actions, vec![Action::Replace, Action::Skip, Action::New])
            }
            other => panic!("unexpected error: {other}"),
        }

        let error = Conflict::has_objects("folder", "Folder", 4).into_error();
        assert!(matches!(error, Error::Dependency { objects: 4, .. }));
    }

    #[test]
    fn test_has_objects_description_mentions_count() {
        let conflict = Conflict::has_objects("folder", "Folder", 12);
        assert!(conflict.description.contains("12 object(s)"));
        assert!(conflict.description.contains("Folder"));
    }
}
