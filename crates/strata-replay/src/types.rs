//! Data types for recording and playback.

use strata_core::Time;
use strata_diff::Delta;
use strata_state::CompositeState;

/// Recording-wide metadata stored in the header.
///
/// # Examples
///
/// ```
/// use strata_replay::RecordingMetadata;
///
/// let meta = RecordingMetadata {
///     world_name: "default".into(),
///     producer: "bench-rig".into(),
///     keyframe_interval: 16,
/// };
///
/// assert_eq!(meta.keyframe_interval, 16);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordingMetadata {
    /// Name of the recorded world.
    pub world_name: String,
    /// Free-form identifier of the program that wrote the recording.
    pub producer: String,
    /// Keyframe spacing the writer used.
    pub keyframe_interval: u32,
}

/// One recorded snapshot, whole or relative to its predecessor.
#[derive(Clone, Debug, PartialEq)]
pub enum Frame {
    /// A full snapshot.
    Keyframe(CompositeState),
    /// Changes since the previous frame's snapshot.
    Delta(Delta),
}

impl Frame {
    /// Which kind of frame this is.
    pub fn kind(&self) -> FrameKind {
        match self {
            Self::Keyframe(_) => FrameKind::Keyframe,
            Self::Delta(_) => FrameKind::Delta,
        }
    }

    /// Sim time of the snapshot the frame describes.
    pub fn sim_time(&self) -> Time {
        match self {
            Self::Keyframe(state) => state.sim_time(),
            Self::Delta(delta) => delta.sim_time(),
        }
    }
}

/// Frame kind, also the frame's leading tag byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// A full snapshot.
    Keyframe = 0,
    /// A delta.
    Delta = 1,
}

impl FrameKind {
    /// Wire tag.
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Parse a wire tag.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Keyframe),
            1 => Some(Self::Delta),
            _ => None,
        }
    }
}
