//! Timeline and recorder configuration.

use std::error::Error;
use std::fmt;

/// Configuration for a [`Timeline`](crate::Timeline) and the
/// [`Recorder`](crate::Recorder) that feeds it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimelineConfig {
    /// Record every `decimation`-th step. Default: 1 (every step).
    pub decimation: u32,
    /// Entries to reserve up front. Default: 1024.
    pub initial_capacity: usize,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            decimation: 1,
            initial_capacity: 1024,
        }
    }
}

impl TimelineConfig {
    /// Largest accepted up-front reservation.
    pub const MAX_INITIAL_CAPACITY: usize = 1 << 24;

    /// Check the configuration's invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.decimation == 0 {
            return Err(ConfigError::ZeroDecimation);
        }
        if self.initial_capacity > Self::MAX_INITIAL_CAPACITY {
            return Err(ConfigError::CapacityTooLarge {
                configured: self.initial_capacity,
            });
        }
        Ok(())
    }
}

/// Errors detected by [`TimelineConfig::validate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Decimation of zero would never record.
    ZeroDecimation,
    /// `initial_capacity` exceeds [`TimelineConfig::MAX_INITIAL_CAPACITY`].
    CapacityTooLarge {
        /// The configured value.
        configured: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroDecimation => write!(f, "decimation must be at least 1"),
            Self::CapacityTooLarge { configured } => write!(
                f,
                "initial_capacity {configured} exceeds maximum of {}",
                TimelineConfig::MAX_INITIAL_CAPACITY
            ),
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(TimelineConfig::default().validate(), Ok(()));
    }

    #[test]
    fn zero_decimation_rejected() {
        let config = TimelineConfig {
            decimation: 0,
            ..TimelineConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroDecimation));
    }

    #[test]
    fn huge_capacity_rejected() {
        let config = TimelineConfig {
            initial_capacity: usize::MAX,
            ..TimelineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::CapacityTooLarge { .. })
        ));
    }
}
