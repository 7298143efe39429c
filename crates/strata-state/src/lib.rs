//! Entity and composite snapshots for Strata.
//!
//! A snapshot captures one entity's configuration at one instant: a
//! name, a [`ClockTriple`](strata_core::ClockTriple), and a payload whose
//! shape depends on the entity kind. Worlds and models are captured as
//! [`CompositeState`]s owning their children's states in insertion order.
//!
//! # Data flow
//!
//! - [`capture`]: live engine entity → state, right after a physics step
//! - [`apply`]: state → live engine entity, during playback
//! - [`loader`]: descriptor tree → state, for saved scenarios
//! - [`saver`]: state → descriptor tree, the inverse of the loader
//!
//! Composite operations fail atomically and report the failing child's
//! path, e.g. `model1/joint2`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod apply;
pub mod capture;
pub mod composite;
pub mod config;
pub mod loader;
pub mod payload;
pub mod saver;
pub mod state;

pub use apply::{apply_joint, apply_link, apply_model, apply_world};
pub use capture::{capture_joint, capture_link, capture_model, capture_world};
pub use composite::{Children, CompositeState};
pub use config::{HingeConfig, LoadConfig, MissingPolicy};
pub use loader::{load_joint, load_link, load_model, load_state, load_world};
pub use payload::{Field, JointPayload, LinkPayload, ModelPayload, Payload, Value};
pub use saver::{save_composite, save_entity, save_state};
pub use state::{EntityState, State};
