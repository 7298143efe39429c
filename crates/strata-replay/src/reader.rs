//! Recording playback reader.
//!
//! [`ReplayReader`] reads frames from any `Read` source and rebuilds the
//! recorded snapshots, applying each delta to the snapshot before it. The
//! header is validated on construction.

use std::io::Read;

use log::debug;
use strata_diff::apply_delta;
use strata_state::CompositeState;
use strata_timeline::Timeline;

use crate::codec::{decode_frame, decode_header};
use crate::error::ReplayError;
use crate::types::{Frame, RecordingMetadata};

/// Reads a recording from a byte stream.
///
/// Generic over `R: Read` so tests can use `&[u8]` and production
/// code can use `BufReader<File>`.
pub struct ReplayReader<R: Read> {
    reader: R,
    metadata: RecordingMetadata,
    current: Option<CompositeState>,
    frames_read: u64,
}

impl<R: Read> ReplayReader<R> {
    /// Open a recording, reading and validating the header.
    pub fn open(mut reader: R) -> Result<Self, ReplayError> {
        let metadata = decode_header(&mut reader)?;
        Ok(Self {
            reader,
            metadata,
            current: None,
            frames_read: 0,
        })
    }

    /// Metadata from the header.
    pub fn metadata(&self) -> &RecordingMetadata {
        &self.metadata
    }

    /// Read the next raw frame, or `None` if the stream is exhausted.
    ///
    /// Raw frames are not tracked for reconstruction; mixing this with
    /// [`next_state`](Self::next_state) skips snapshots.
    pub fn next_frame(&mut self) -> Result<Option<Frame>, ReplayError> {
        let frame = decode_frame(&mut self.reader)?;
        if frame.is_some() {
            self.frames_read += 1;
        }
        Ok(frame)
    }

    /// Read and rebuild the next full snapshot, or `None` at the end of
    /// the recording.
    ///
    /// A delta before the first keyframe is [`ReplayError::MissingKeyframe`].
    pub fn next_state(&mut self) -> Result<Option<CompositeState>, ReplayError> {
        let state = match self.next_frame()? {
            None => return Ok(None),
            Some(Frame::Keyframe(state)) => state,
            Some(Frame::Delta(delta)) => {
                let base = self.current.as_ref().ok_or(ReplayError::MissingKeyframe)?;
                apply_delta(base, &delta)?
            }
        };
        self.current = Some(state.clone());
        Ok(Some(state))
    }

    /// Number of frames read so far.
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    /// Convert into a raw frame iterator.
    pub fn frames(self) -> FrameIter<R> {
        FrameIter {
            reader: self,
            done: false,
        }
    }

    /// Convert into an iterator over rebuilt snapshots.
    pub fn states(self) -> StateIter<R> {
        StateIter {
            reader: self,
            done: false,
        }
    }

    /// Load every remaining snapshot into a sealed timeline.
    ///
    /// Fails with [`ReplayError::Timeline`] if the recorded sim times go
    /// backwards.
    pub fn into_timeline(mut self) -> Result<Timeline, ReplayError> {
        let mut timeline = Timeline::new();
        while let Some(state) = self.next_state()? {
            timeline.append(state)?;
        }
        debug!(
            "loaded {} snapshots of '{}' from {} frames",
            timeline.len(),
            self.metadata.world_name,
            self.frames_read
        );
        timeline.seal();
        Ok(timeline)
    }
}

/// Iterator adapter over raw frames.
///
/// The first error ends the iteration.
pub struct FrameIter<R: Read> {
    reader: ReplayReader<R>,
    done: bool,
}

impl<R: Read> Iterator for FrameIter<R> {
    type Item = Result<Frame, ReplayError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.reader.next_frame().transpose();
        self.done = !matches!(item, Some(Ok(_)));
        item
    }
}

/// Iterator adapter over rebuilt snapshots.
///
/// The first error ends the iteration.
pub struct StateIter<R: Read> {
    reader: ReplayReader<R>,
    done: bool,
}

impl<R: Read> Iterator for StateIter<R> {
    type Item = Result<CompositeState, ReplayError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.reader.next_state().transpose();
        self.done = !matches!(item, Some(Ok(_)));
        item
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WriterConfig;
    use crate::types::FrameKind;
    use crate::writer::ReplayWriter;
    use strata_core::{ClockTriple, EntityKind, Time, Tolerance};
    use strata_diff::diff;
    use strata_state::{EntityState, Field, Payload, Value};

    fn snapshot(step: i64, angle: f64) -> CompositeState {
        let t = Time::new(0, step * 10_000_000);
        let clock = ClockTriple::new(Time::new(1_700_000_000, 0) + t, t, t);
        let mut model =
            CompositeState::new("arm", clock, Payload::empty(EntityKind::Model)).unwrap();
        let joint = EntityState::new("elbow", clock, Payload::empty(EntityKind::Joint))
            .unwrap()
            .with_field(Field::Angle, Some(Value::Scalar(angle)))
            .unwrap();
        model.add_child(joint).unwrap();
        let mut world = CompositeState::new("default", clock, Payload::World).unwrap();
        world.add_child(model).unwrap();
        world
    }

    fn record(states: &[CompositeState], interval: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        let config = WriterConfig {
            keyframe_interval: interval,
        };
        let mut writer = ReplayWriter::new(&mut buf, "default", &config).unwrap();
        for state in states {
            writer.write_state(state).unwrap();
        }
        drop(writer);
        buf
    }

    #[test]
    fn keyframe_schedule() {
        let states: Vec<_> = (0..7).map(|i| snapshot(i, i as f64 * 0.1)).collect();
        let buf = record(&states, 3);
        let kinds: Vec<_> = ReplayReader::open(buf.as_slice())
            .unwrap()
            .frames()
            .map(|f| f.unwrap().kind())
            .collect();
        use FrameKind::{Delta, Keyframe};
        assert_eq!(
            kinds,
            vec![Keyframe, Delta, Delta, Keyframe, Delta, Delta, Keyframe]
        );
    }

    #[test]
    fn states_rebuilt_exactly() {
        let states: Vec<_> = (0..5).map(|i| snapshot(i, (i as f64).sin())).collect();
        let buf = record(&states, 4);
        let mut reader = ReplayReader::open(buf.as_slice()).unwrap();
        assert_eq!(reader.metadata().world_name, "default");
        for expected in &states {
            assert_eq!(reader.next_state().unwrap().as_ref(), Some(expected));
        }
        assert!(reader.next_state().unwrap().is_none());
        assert_eq!(reader.frames_read(), 5);
    }

    #[test]
    fn slow_creep_is_not_lost() {
        let states: Vec<_> = (0..20).map(|i| snapshot(i, i as f64 * 4e-7)).collect();
        let buf = record(&states, 100);
        let last = ReplayReader::open(buf.as_slice())
            .unwrap()
            .states()
            .last()
            .unwrap()
            .unwrap();
        assert!(last.approx_eq(&states[19], Tolerance::DEFAULT));
    }

    #[test]
    fn topology_change_forces_keyframe() {
        let a = snapshot(0, 0.0);
        let mut b = snapshot(1, 0.1);
        let clock = b.clock();
        b.add_child(CompositeState::new("crate", clock, Payload::empty(EntityKind::Model)).unwrap())
            .unwrap();

        let mut buf = Vec::new();
        let mut writer = ReplayWriter::new(&mut buf, "default", &WriterConfig::default()).unwrap();
        assert_eq!(writer.write_state(&a).unwrap(), FrameKind::Keyframe);
        assert_eq!(writer.write_state(&b).unwrap(), FrameKind::Keyframe);
        assert_eq!(writer.write_state(&snapshot(2, 0.2)).unwrap(), FrameKind::Keyframe);
        drop(writer);

        let states: Vec<_> = ReplayReader::open(buf.as_slice())
            .unwrap()
            .states()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(states[1], b);
    }

    #[test]
    fn delta_before_keyframe() {
        let mut buf = Vec::new();
        crate::codec::encode_header(
            &mut buf,
            &RecordingMetadata {
                world_name: "default".into(),
                producer: "test".into(),
                keyframe_interval: 1,
            },
        )
        .unwrap();
        let delta = diff(&snapshot(0, 0.0), &snapshot(1, 0.5)).unwrap();
        crate::codec::encode_frame(&mut buf, &Frame::Delta(delta)).unwrap();

        let mut reader = ReplayReader::open(buf.as_slice()).unwrap();
        assert!(matches!(
            reader.next_state(),
            Err(ReplayError::MissingKeyframe)
        ));
    }

    #[test]
    fn raw_delta_needs_keyframe() {
        let mut buf = Vec::new();
        let mut writer = ReplayWriter::new(&mut buf, "default", &WriterConfig::default()).unwrap();
        let delta = diff(&snapshot(0, 0.0), &snapshot(1, 0.5)).unwrap();
        assert!(matches!(
            writer.write_frame(&Frame::Delta(delta.clone())),
            Err(ReplayError::MissingKeyframe)
        ));
        writer.write_frame(&Frame::Keyframe(snapshot(0, 0.0))).unwrap();
        writer.write_frame(&Frame::Delta(delta)).unwrap();
        assert_eq!(writer.frames_written(), 2);
    }

    #[test]
    fn timeline_is_sealed_and_complete() {
        let states: Vec<_> = (0..6).map(|i| snapshot(i, 0.0)).collect();
        let buf = record(&states, 2);
        let timeline = ReplayReader::open(buf.as_slice())
            .unwrap()
            .into_timeline()
            .unwrap();
        assert!(timeline.is_sealed());
        assert_eq!(timeline.len(), 6);
        let nearest = timeline.nearest(Time::new(0, 21_000_000)).unwrap();
        assert_eq!(nearest.sim_time(), Time::new(0, 20_000_000));
    }

    #[test]
    fn backwards_time_rejected_on_load() {
        let buf = record(&[snapshot(3, 0.0), snapshot(1, 0.0)], 1);
        let err = ReplayReader::open(buf.as_slice())
            .unwrap()
            .into_timeline()
            .unwrap_err();
        assert!(matches!(err, ReplayError::Timeline(_)));
    }

    #[test]
    fn truncated_stream_errors() {
        let mut buf = record(&[snapshot(0, 0.0), snapshot(1, 0.1)], 8);
        buf.truncate(buf.len() - 4);
        let results: Vec<_> = ReplayReader::open(buf.as_slice()).unwrap().states().collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }

    #[test]
    fn bad_magic_on_open() {
        let data = b"XTRT\x01rest of data";
        let result = ReplayReader::open(data.as_slice());
        assert!(matches!(result, Err(ReplayError::InvalidMagic)));
    }
}
