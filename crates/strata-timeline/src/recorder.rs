//! Per-step capture into a timeline.

use log::debug;
use strata_core::World;
use strata_state::capture_world;

use crate::config::{ConfigError, TimelineConfig};
use crate::error::TimelineError;
use crate::timeline::{Timeline, TimelineReader};

/// Captures a world after each physics step and appends every
/// `decimation`-th capture to its timeline.
///
/// Call [`record_step`](Self::record_step) on the step thread after the
/// engine step completes and before the next one starts.
pub struct Recorder {
    timeline: Timeline,
    decimation: u64,
    steps: u64,
}

impl Recorder {
    /// A recorder with an empty timeline.
    pub fn new(config: &TimelineConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            timeline: Timeline::with_config(config)?,
            decimation: u64::from(config.decimation),
            steps: 0,
        })
    }

    /// Record one completed step.
    ///
    /// Returns the new entry's index, or `None` for a step skipped by
    /// decimation. A capture failure is returned as
    /// [`TimelineError::Capture`] and leaves the timeline untouched; the
    /// step still counts toward decimation.
    pub fn record_step(&mut self, world: &dyn World) -> Result<Option<usize>, TimelineError> {
        let step = self.steps;
        self.steps += 1;
        if step % self.decimation != 0 {
            debug!("step {step} skipped by decimation {}", self.decimation);
            return Ok(None);
        }
        let state = capture_world(world)?;
        self.timeline.append(state).map(Some)
    }

    /// Steps seen so far, recorded or not.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// The timeline being recorded.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// A read handle for concurrent scrubbing.
    pub fn reader(&self) -> TimelineReader {
        self.timeline.reader()
    }

    /// Seal the timeline and hand it over.
    pub fn finish(self) -> Timeline {
        let mut timeline = self.timeline;
        timeline.seal();
        timeline
    }
}
