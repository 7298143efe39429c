//! Binary recordings of Strata timelines.
//!
//! A recording is a header followed by a stream of frames. Every
//! `keyframe_interval`-th frame holds a full world snapshot; the frames in
//! between hold only the [`Delta`](strata_diff::Delta) against the
//! previous snapshot. Reading a recording reconstructs every snapshot in
//! order and can load the whole run into a sealed
//! [`Timeline`](strata_timeline::Timeline) for scrubbing.
//!
//! # Architecture
//!
//! - [`ReplayWriter`] records snapshots to any `Write` sink
//! - [`ReplayReader`] plays back frames and states from any `Read` source
//! - [`state_hash`] and [`compare_state`] check a replay against its recording
//! - All I/O uses a custom binary codec (no serde dependency)
//!
//! # Format
//!
//! ```text
//! [MAGIC "STRT"] [VERSION u8] [RecordingMetadata]
//! [Frame 1] [Frame 2] ... [Frame N]
//! ```
//!
//! Each frame starts with a one-byte tag: `0` for a keyframe, `1` for a
//! delta. Integers and floats are little-endian; strings are prefixed with
//! a `u32` byte length.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod compare;
pub mod config;
pub mod error;
pub mod hash;
pub mod reader;
pub mod types;
pub mod writer;

pub use compare::{compare_state, replay_and_compare, DivergenceReport, FieldDivergence};
pub use config::{ConfigError, WriterConfig};
pub use error::ReplayError;
pub use hash::state_hash;
pub use reader::{FrameIter, ReplayReader, StateIter};
pub use types::{Frame, FrameKind, RecordingMetadata};
pub use writer::ReplayWriter;

/// Magic bytes at the start of every recording.
pub const MAGIC: [u8; 4] = *b"STRT";

/// Current binary format version.
pub const FORMAT_VERSION: u8 = 1;

const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<RecordingMetadata>();
    assert::<Frame>();
    assert::<DivergenceReport>();
};
