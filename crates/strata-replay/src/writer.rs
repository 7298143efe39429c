//! Recording writer.
//!
//! [`ReplayWriter`] streams snapshots to any `Write` sink, choosing per
//! snapshot between a keyframe and a delta against the previous one. The
//! header is written immediately on construction.

use std::io::Write;

use log::debug;
use strata_diff::{apply_delta, diff, DiffError};
use strata_state::CompositeState;
use strata_timeline::TimelineReader;

use crate::codec::{encode_frame, encode_header};
use crate::config::WriterConfig;
use crate::error::ReplayError;
use crate::types::{Frame, FrameKind, RecordingMetadata};

/// Producer string written when none is given.
pub const DEFAULT_PRODUCER: &str = concat!("strata-replay ", env!("CARGO_PKG_VERSION"));

/// Writes a recording to a byte stream.
///
/// Generic over `W: Write` so tests can use `Vec<u8>` and production
/// code can use `BufWriter<File>`.
///
/// # Examples
///
/// ```
/// use strata_core::{ClockTriple, Time};
/// use strata_replay::{FrameKind, ReplayReader, ReplayWriter, WriterConfig};
/// use strata_state::{CompositeState, Payload};
///
/// let snapshot = |sec: i64| {
///     let t = Time::new(sec, 0);
///     CompositeState::new("default", ClockTriple::new(t, t, t), Payload::World).unwrap()
/// };
///
/// let mut buf = Vec::new();
/// let config = WriterConfig { keyframe_interval: 2 };
/// let mut writer = ReplayWriter::new(&mut buf, "default", &config).unwrap();
/// assert_eq!(writer.write_state(&snapshot(0)).unwrap(), FrameKind::Keyframe);
/// assert_eq!(writer.write_state(&snapshot(1)).unwrap(), FrameKind::Delta);
/// assert_eq!(writer.write_state(&snapshot(2)).unwrap(), FrameKind::Keyframe);
/// drop(writer);
///
/// let reader = ReplayReader::open(buf.as_slice()).unwrap();
/// assert_eq!(reader.metadata().keyframe_interval, 2);
/// let times: Vec<_> = reader
///     .states()
///     .map(|s| s.unwrap().sim_time())
///     .collect();
/// assert_eq!(times, vec![Time::new(0, 0), Time::new(1, 0), Time::new(2, 0)]);
/// ```
pub struct ReplayWriter<W: Write> {
    writer: W,
    metadata: RecordingMetadata,
    previous: Option<CompositeState>,
    frames_written: u64,
}

impl<W: Write> ReplayWriter<W> {
    /// Create a writer for `world_name`, immediately writing the header.
    pub fn new(writer: W, world_name: &str, config: &WriterConfig) -> Result<Self, ReplayError> {
        Self::with_producer(writer, world_name, DEFAULT_PRODUCER, config)
    }

    /// Like [`new`](Self::new), recording a custom producer string.
    pub fn with_producer(
        mut writer: W,
        world_name: &str,
        producer: &str,
        config: &WriterConfig,
    ) -> Result<Self, ReplayError> {
        config.validate()?;
        let metadata = RecordingMetadata {
            world_name: world_name.to_string(),
            producer: producer.to_string(),
            keyframe_interval: config.keyframe_interval,
        };
        encode_header(&mut writer, &metadata)?;
        Ok(Self {
            writer,
            metadata,
            previous: None,
            frames_written: 0,
        })
    }

    /// The header written to the stream.
    pub fn metadata(&self) -> &RecordingMetadata {
        &self.metadata
    }

    /// Record one snapshot and report which kind of frame was written.
    ///
    /// Every `keyframe_interval`-th frame (starting with the first) is a
    /// keyframe. A snapshot whose entity tree no longer matches the
    /// previous one also gets a keyframe, since a delta cannot express an
    /// added or removed entity.
    ///
    /// Deltas are taken against the snapshot a reader will have rebuilt,
    /// not the exact previous input, so a value creeping by less than the
    /// tolerance per step is still recorded once it has moved far enough.
    pub fn write_state(&mut self, state: &CompositeState) -> Result<FrameKind, ReplayError> {
        let due = self.frames_written % u64::from(self.metadata.keyframe_interval) == 0;
        let (frame, rebuilt) = match &self.previous {
            Some(previous) if !due => match diff(previous, state) {
                Ok(delta) => {
                    let rebuilt = apply_delta(previous, &delta)?;
                    (Frame::Delta(delta), rebuilt)
                }
                Err(DiffError::StructuralMismatch { path, detail }) => {
                    debug!("keyframe at {path}: {detail}");
                    (Frame::Keyframe(state.clone()), state.clone())
                }
                Err(e) => return Err(e.into()),
            },
            _ => (Frame::Keyframe(state.clone()), state.clone()),
        };
        self.emit(&frame)?;
        self.previous = Some(rebuilt);
        Ok(frame.kind())
    }

    /// Record every entry of a timeline in order.
    pub fn write_timeline(&mut self, timeline: &TimelineReader) -> Result<(), ReplayError> {
        let window = match timeline.time_span() {
            Some((first, last)) => timeline.window(first, last),
            None => return Ok(()),
        };
        for state in &window {
            self.write_state(&state)?;
        }
        Ok(())
    }

    /// Write a pre-built frame directly, bypassing keyframe scheduling.
    ///
    /// A delta must apply to the previous frame's snapshot; otherwise it
    /// is rejected with [`ReplayError::Diff`] (or
    /// [`ReplayError::MissingKeyframe`] before any keyframe) and nothing
    /// is written.
    pub fn write_frame(&mut self, frame: &Frame) -> Result<(), ReplayError> {
        let next = match frame {
            Frame::Keyframe(state) => state.clone(),
            Frame::Delta(delta) => {
                let previous = self.previous.as_ref().ok_or(ReplayError::MissingKeyframe)?;
                apply_delta(previous, delta)?
            }
        };
        self.emit(frame)?;
        self.previous = Some(next);
        Ok(())
    }

    fn emit(&mut self, frame: &Frame) -> Result<(), ReplayError> {
        encode_frame(&mut self.writer, frame)?;
        self.frames_written += 1;
        Ok(())
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> Result<(), ReplayError> {
        self.writer.flush()?;
        Ok(())
    }

    /// Number of frames written so far.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Consume the writer and return the underlying `Write` sink.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
