//! Time-indexed history of simulation snapshots.
//!
//! A [`Timeline`] is the single writer for one recorded run: it appends
//! world snapshots in non-decreasing sim-time order and can be sealed for
//! playback. Any number of [`TimelineReader`]s may scrub it concurrently
//! via [`nearest`](TimelineReader::nearest) and
//! [`window`](TimelineReader::window) while recording continues.
//!
//! Entries are immutable once appended and are never removed or
//! reordered, so an index a reader holds stays valid for the life of the
//! timeline.
//!
//! [`Recorder`] ties capture to the timeline with step decimation.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod recorder;
pub mod timeline;
pub mod window;

pub use config::{ConfigError, TimelineConfig};
pub use error::TimelineError;
pub use recorder::Recorder;
pub use timeline::{Timeline, TimelineReader};
pub use window::{Window, WindowIter};
