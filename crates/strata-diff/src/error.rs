//! Differ error types.

use std::error::Error;
use std::fmt;

use strata_core::{StateError, StatePath};

/// Errors from diffing and delta application.
#[derive(Clone, Debug, PartialEq)]
pub enum DiffError {
    /// The two trees (or a delta and its base) differ in shape at `path`.
    StructuralMismatch {
        /// Entity where the shapes diverge.
        path: StatePath,
        /// What differs.
        detail: String,
    },
    /// The configured tolerance is negative or not finite.
    InvalidTolerance {
        /// The rejected value.
        value: f64,
    },
}

impl DiffError {
    pub(crate) fn mismatch(path: &StatePath, detail: impl Into<String>) -> Self {
        Self::StructuralMismatch {
            path: path.clone(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for DiffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StructuralMismatch { path, detail } => {
                write!(f, "structural mismatch at {path}: {detail}")
            }
            Self::InvalidTolerance { value } => {
                write!(f, "tolerance must be finite and non-negative, got {value}")
            }
        }
    }
}

impl Error for DiffError {}

/// Payload shape errors surface as structural mismatches at the node.
impl From<StateError> for DiffError {
    fn from(e: StateError) -> Self {
        let path = e.path().clone();
        Self::StructuralMismatch {
            path,
            detail: e.to_string(),
        }
    }
}
