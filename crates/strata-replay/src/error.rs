//! Error types for recording and playback.

use std::error::Error;
use std::fmt;
use std::io;

use strata_core::StateError;
use strata_diff::DiffError;
use strata_timeline::TimelineError;

use crate::config::ConfigError;

/// Errors that can occur while writing, reading, or comparing recordings.
#[derive(Debug)]
pub enum ReplayError {
    /// An I/O error occurred during read or write.
    Io(io::Error),
    /// The stream does not start with the expected `b"STRT"` magic bytes.
    InvalidMagic,
    /// The format version is not supported by this build.
    UnsupportedVersion {
        /// The version found in the stream.
        found: u8,
    },
    /// A frame could not be decoded (truncated or corrupt data).
    MalformedFrame {
        /// Human-readable description of what went wrong.
        detail: String,
    },
    /// An entity kind tag is not recognized.
    UnknownKindTag {
        /// The unrecognized tag.
        tag: u8,
    },
    /// A delta frame arrived before any keyframe.
    MissingKeyframe,
    /// A decoded state violated a state invariant.
    State(StateError),
    /// Computing or applying a delta failed.
    Diff(DiffError),
    /// Loading states into a timeline failed.
    Timeline(TimelineError),
    /// The writer configuration is invalid.
    Config(ConfigError),
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::InvalidMagic => write!(f, "invalid magic bytes (expected b\"STRT\")"),
            Self::UnsupportedVersion { found } => {
                write!(f, "unsupported format version {found}")
            }
            Self::MalformedFrame { detail } => write!(f, "malformed frame: {detail}"),
            Self::UnknownKindTag { tag } => write!(f, "unknown entity kind tag {tag}"),
            Self::MissingKeyframe => write!(f, "delta frame before the first keyframe"),
            Self::State(e) => write!(f, "invalid state: {e}"),
            Self::Diff(e) => write!(f, "delta failed: {e}"),
            Self::Timeline(e) => write!(f, "timeline load failed: {e}"),
            Self::Config(e) => write!(f, "invalid writer config: {e}"),
        }
    }
}

impl Error for ReplayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::State(e) => Some(e),
            Self::Diff(e) => Some(e),
            Self::Timeline(e) => Some(e),
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ReplayError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<StateError> for ReplayError {
    fn from(e: StateError) -> Self {
        Self::State(e)
    }
}

impl From<DiffError> for ReplayError {
    fn from(e: DiffError) -> Self {
        Self::Diff(e)
    }
}

impl From<TimelineError> for ReplayError {
    fn from(e: TimelineError) -> Self {
        Self::Timeline(e)
    }
}

impl From<ConfigError> for ReplayError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
