//! Error types for state capture, load, and apply.
//!
//! Every variant that can be raised inside a composite traversal carries
//! a [`StatePath`]. Composite operations prepend the failing child's name
//! as the error propagates outwards (see [`StateError::within`]), so the
//! final error names the entity deep in the tree that caused it.

use std::error::Error;
use std::fmt;

use crate::path::StatePath;
use crate::traits::EntityKind;

/// Errors from capturing, loading, applying, or building state.
#[derive(Clone, Debug, PartialEq)]
pub enum StateError {
    /// A required descriptor element or attribute is absent.
    MalformedDescriptor {
        /// Location of the state being loaded.
        path: StatePath,
        /// What was missing.
        detail: String,
    },
    /// A descriptor value is present but cannot be parsed as its type.
    TypeMismatch {
        /// Location of the state being loaded.
        path: StatePath,
        /// Name of the offending element or attribute.
        field: String,
        /// The raw text that failed to parse.
        value: String,
        /// The expected value type (e.g. `"pose"`).
        expected: &'static str,
    },
    /// A composite already holds a child with this name.
    DuplicateChildName {
        /// Location of the composite.
        path: StatePath,
        /// The conflicting child name.
        name: String,
    },
    /// A state does not line up with the entity tree it is applied to.
    StructuralMismatch {
        /// Location of the mismatch.
        path: StatePath,
        /// Description of the mismatch.
        detail: String,
    },
    /// The live entity handle is stale or null.
    EngineUnavailable {
        /// Location of the unavailable entity.
        path: StatePath,
    },
    /// A kind-specific payload was requested from a state of another kind.
    WrongKind {
        /// Location of the state.
        path: StatePath,
        /// The kind the caller asked for.
        expected: EntityKind,
        /// The kind the state was captured from.
        found: EntityKind,
    },
}

impl StateError {
    /// Prefix the error's path with a parent name.
    pub fn within(mut self, parent: &str) -> Self {
        self.path_mut().prepend(parent);
        self
    }

    /// Location the error refers to.
    pub fn path(&self) -> &StatePath {
        match self {
            Self::MalformedDescriptor { path, .. }
            | Self::TypeMismatch { path, .. }
            | Self::DuplicateChildName { path, .. }
            | Self::StructuralMismatch { path, .. }
            | Self::EngineUnavailable { path }
            | Self::WrongKind { path, .. } => path,
        }
    }

    fn path_mut(&mut self) -> &mut StatePath {
        match self {
            Self::MalformedDescriptor { path, .. }
            | Self::TypeMismatch { path, .. }
            | Self::DuplicateChildName { path, .. }
            | Self::StructuralMismatch { path, .. }
            | Self::EngineUnavailable { path }
            | Self::WrongKind { path, .. } => path,
        }
    }
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedDescriptor { path, detail } => {
                write!(f, "malformed descriptor at '{path}': {detail}")
            }
            Self::TypeMismatch {
                path,
                field,
                value,
                expected,
            } => write!(
                f,
                "type mismatch at '{path}': field '{field}' value {value:?} is not a valid {expected}"
            ),
            Self::DuplicateChildName { path, name } => {
                write!(f, "duplicate child name '{name}' in '{path}'")
            }
            Self::StructuralMismatch { path, detail } => {
                write!(f, "structural mismatch at '{path}': {detail}")
            }
            Self::EngineUnavailable { path } => {
                write!(f, "entity '{path}' is no longer available in the engine")
            }
            Self::WrongKind {
                path,
                expected,
                found,
            } => write!(f, "state '{path}' is a {found} state, not a {expected} state"),
        }
    }
}

impl Error for StateError {}

/// A live entity handle is stale (the entity was destroyed) or null.
///
/// Returned by backend getters and setters; the state subsystem converts
/// it into [`StateError::EngineUnavailable`] with the entity's path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Unavailable;

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity handle is stale")
    }
}

impl Error for Unavailable {}

/// A descriptor string could not be parsed as the expected value type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseValueError {
    /// Value type that was expected (e.g. `"vector3"`).
    pub expected: &'static str,
    /// The offending input.
    pub input: String,
}

impl ParseValueError {
    /// Record a failed parse of `input` as `expected`.
    pub fn new(expected: &'static str, input: &str) -> Self {
        Self {
            expected,
            input: input.to_string(),
        }
    }
}

impl fmt::Display for ParseValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot parse {:?} as {}", self.input, self.expected)
    }
}

impl Error for ParseValueError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn within_builds_nested_path() {
        let err = StateError::EngineUnavailable {
            path: StatePath::from_name("joint2"),
        }
        .within("model1")
        .within("world");
        assert_eq!(err.path().to_string(), "world/model1/joint2");
        assert_eq!(
            err.to_string(),
            "entity 'world/model1/joint2' is no longer available in the engine"
        );
    }

    #[test]
    fn type_mismatch_message_names_field() {
        let err = StateError::TypeMismatch {
            path: StatePath::from_name("link1"),
            field: "pose".into(),
            value: "1 2".into(),
            expected: "pose",
        };
        assert!(err.to_string().contains("field 'pose'"));
    }
}
