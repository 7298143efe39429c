//! Recording configuration.

use std::error::Error;
use std::fmt;

/// Configuration for a [`ReplayWriter`](crate::ReplayWriter).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriterConfig {
    /// Write a full keyframe every `keyframe_interval` frames and deltas
    /// in between. `1` writes only keyframes. Default: 32.
    pub keyframe_interval: u32,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            keyframe_interval: 32,
        }
    }
}

impl WriterConfig {
    /// Check the configuration's invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.keyframe_interval == 0 {
            return Err(ConfigError::ZeroKeyframeInterval);
        }
        Ok(())
    }
}

/// Errors detected by [`WriterConfig::validate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// An interval of zero would never write a keyframe.
    ZeroKeyframeInterval,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroKeyframeInterval => write!(f, "keyframe_interval must be at least 1"),
        }
    }
}

impl Error for ConfigError {}
