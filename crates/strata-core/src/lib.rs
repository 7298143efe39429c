//! Core types and traits for Strata state capture.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the value types every snapshot is built from (times, poses, limits),
//! the error taxonomy, the narrow descriptor-tree interface consumed by
//! the loader, and the capability traits a physics backend implements
//! so its live entities can be captured and driven during playback.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod descriptor;
pub mod error;
pub mod math;
pub mod path;
pub mod time;
pub mod traits;

pub use descriptor::{Descriptor, Element};
pub use error::{ParseValueError, StateError, Unavailable};
pub use math::{ApproxEq, Pose, Quaternion, StopLimits, Tolerance, Vector3};
pub use path::StatePath;
pub use time::{ClockTriple, Time};
pub use traits::{EntityKind, Joint, Link, Model, World};
