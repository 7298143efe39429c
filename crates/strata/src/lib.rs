//! Strata: state capture and timelines for physics simulations.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Strata sub-crates. For most users, adding `strata` as a single dependency
//! is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use strata::prelude::*;
//!
//! let snapshot = |sec: i64, angle: f64| {
//!     let t = Time::new(sec, 0);
//!     let clock = ClockTriple::new(t, t, t);
//!     let mut arm = CompositeState::new("arm", clock, Payload::empty(EntityKind::Model)).unwrap();
//!     let elbow = EntityState::new("elbow", clock, Payload::empty(EntityKind::Joint))
//!         .unwrap()
//!         .with_field(Field::Angle, Some(Value::Scalar(angle)))
//!         .unwrap();
//!     arm.add_child(elbow).unwrap();
//!     let mut world = CompositeState::new("default", clock, Payload::World).unwrap();
//!     world.add_child(arm).unwrap();
//!     world
//! };
//!
//! // Record a short history and scrub it.
//! let mut timeline = Timeline::new();
//! for sec in 0..5 {
//!     timeline.append(snapshot(sec, sec as f64 * 0.1)).unwrap();
//! }
//! let reader = timeline.reader();
//! assert_eq!(reader.nearest(Time::new(2, 400_000_000)).unwrap().sim_time(), Time::new(2, 0));
//!
//! // Only the joint moved between two steps.
//! let delta = diff(&snapshot(0, 0.0), &snapshot(1, 0.1)).unwrap();
//! assert_eq!(delta.change_count(), 1);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `strata-core` | Times, clocks, poses, errors, descriptor and engine traits |
//! | [`state`] | `strata-state` | Entity and composite snapshots, capture, apply, load, save |
//! | [`timeline`] | `strata-timeline` | Time-indexed history, windows, step recorder |
//! | [`diff`] | `strata-diff` | Deltas between snapshots |
//! | [`replay`] | `strata-replay` | Binary recordings and replay verification |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core value types, errors, and traits (`strata-core`).
///
/// Contains [`types::Time`], [`types::ClockTriple`], the math types, the
/// descriptor interface ([`types::Descriptor`]), and the live-entity
/// traits a physics backend implements ([`types::World`] and friends).
pub use strata_core as types;

/// Entity and composite snapshots (`strata-state`).
///
/// Capture live entities with [`state::capture_world`], push snapshots
/// back with [`state::apply_world`], and load or save descriptor trees
/// with [`state::load_state`] and [`state::save_state`].
pub use strata_state as state;

/// Time-indexed snapshot history (`strata-timeline`).
///
/// [`timeline::Timeline`] is the single writer; any number of
/// [`timeline::TimelineReader`]s scrub it concurrently.
pub use strata_timeline as timeline;

/// Deltas between snapshots (`strata-diff`).
pub use strata_diff as diff;

/// Binary recordings (`strata-replay`).
///
/// Write with [`replay::ReplayWriter`], read back with
/// [`replay::ReplayReader`], and check a replay with
/// [`replay::compare_state`].
pub use strata_replay as replay;

/// Common imports for typical Strata usage.
///
/// ```rust
/// use strata::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use strata_core::{
        ClockTriple, Descriptor, Element, EntityKind, Pose, StatePath, StopLimits, Time, Tolerance, Vector3,
    };
    pub use strata_core::{Joint, Link, Model, World};

    // Errors
    pub use strata_core::StateError;
    pub use strata_diff::DiffError;
    pub use strata_replay::ReplayError;
    pub use strata_timeline::TimelineError;

    // Snapshots
    pub use strata_state::{
        apply_world, capture_world, load_state, save_state, CompositeState, EntityState, Field,
        LoadConfig, Payload, State, Value,
    };

    // Timeline
    pub use strata_timeline::{Recorder, Timeline, TimelineConfig, TimelineReader, Window};

    // Deltas
    pub use strata_diff::{apply_delta, diff, Delta};

    // Recordings
    pub use strata_replay::{compare_state, ReplayReader, ReplayWriter, WriterConfig};
}
