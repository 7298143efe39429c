//! Structural deltas between snapshots of the same entity tree.
//!
//! [`diff`] compares two composite states of matching shape and keeps
//! only the fields that moved by more than the tolerance, recursively.
//! [`apply_delta`] overlays a delta on a base state. For states `a` and
//! `b` of the same shape, `apply_delta(&a, &diff(&a, &b)?)` reproduces
//! `b` within tolerance, clocks included.
//!
//! Diffing across a topology change (an entity added or removed between
//! the two snapshots) is a [`DiffError::StructuralMismatch`]; the differ
//! only produces value-level deltas.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod delta;
pub mod diff;
pub mod error;

pub use delta::{Delta, FieldChange, NodeDelta};
pub use diff::{apply_delta, diff, diff_with, DiffConfig};
pub use error::DiffError;
