//! Timeline error types.

use std::error::Error;
use std::fmt;

use strata_core::{StateError, Time};

/// Errors from timeline mutation and recording.
#[derive(Clone, Debug, PartialEq)]
pub enum TimelineError {
    /// The appended state's sim time is earlier than the last entry's.
    NonMonotonicTime {
        /// Sim time of the last entry.
        last: Time,
        /// Sim time of the rejected state.
        attempted: Time,
    },
    /// The timeline was sealed for playback.
    TimelineSealed,
    /// Capturing the world for a recorded step failed.
    Capture(StateError),
}

impl fmt::Display for TimelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonMonotonicTime { last, attempted } => write!(
                f,
                "sim time {attempted} precedes the last entry at {last}"
            ),
            Self::TimelineSealed => write!(f, "timeline is sealed"),
            Self::Capture(e) => write!(f, "capture failed: {e}"),
        }
    }
}

impl Error for TimelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Capture(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StateError> for TimelineError {
    fn from(e: StateError) -> Self {
        Self::Capture(e)
    }
}
