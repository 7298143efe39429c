//! Binary encode/decode for the recording format.
//!
//! All integers and floats are little-endian. Strings are length-prefixed
//! with a `u32` byte length. There is no compression, no alignment
//! padding and no self-describing schema: a state's field layout follows
//! from its kind tag.
//!
//! # State layout
//!
//! ```text
//! name: str
//! clock: wall (i64 sec, u32 nsec), real (..), sim (..)
//! kind: u8                      0 world, 1 model, 2 link, 3 joint
//! per field of the kind:        u8 presence flag, then the value if set
//! composite: u8                 0 leaf, 1 composite
//! [child count: u32, children]  composites only
//! ```
//!
//! Values are `f64`s: one for scalars, three for vectors, two for stop
//! limits, seven for poses (position, then rotation `w x y z`).

use std::io::{ErrorKind, Read, Write};

use log::trace;
use strata_core::{ClockTriple, EntityKind, Pose, Quaternion, StopLimits, Time, Vector3};
use strata_diff::{Delta, FieldChange, NodeDelta};
use strata_state::{CompositeState, EntityState, Field, Payload, State, Value};

use crate::error::ReplayError;
use crate::types::{Frame, FrameKind, RecordingMetadata};
use crate::{FORMAT_VERSION, MAGIC};

/// Deepest entity nesting accepted when decoding.
pub const MAX_DEPTH: usize = 64;

const NANOS_PER_SEC: u32 = 1_000_000_000;

fn malformed(detail: impl Into<String>) -> ReplayError {
    ReplayError::MalformedFrame {
        detail: detail.into(),
    }
}

fn len_u32(len: usize, what: &str) -> Result<u32, ReplayError> {
    u32::try_from(len).map_err(|_| malformed(format!("{what} count {len} exceeds u32")))
}

// ── Primitive writers ───────────────────────────────────────────

/// Write a single byte.
pub fn write_u8(w: &mut dyn Write, v: u8) -> Result<(), ReplayError> {
    w.write_all(&[v])?;
    Ok(())
}

/// Write a little-endian u32.
pub fn write_u32_le(w: &mut dyn Write, v: u32) -> Result<(), ReplayError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian i64.
pub fn write_i64_le(w: &mut dyn Write, v: i64) -> Result<(), ReplayError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian f64.
pub fn write_f64_le(w: &mut dyn Write, v: f64) -> Result<(), ReplayError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a length-prefixed UTF-8 string (u32 length + bytes).
pub fn write_length_prefixed_str(w: &mut dyn Write, s: &str) -> Result<(), ReplayError> {
    write_u32_le(w, len_u32(s.len(), "string byte")?)?;
    w.write_all(s.as_bytes())?;
    Ok(())
}

// ── Primitive readers ───────────────────────────────────────────

/// Read a single byte.
pub fn read_u8(r: &mut dyn Read) -> Result<u8, ReplayError> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

/// Read a little-endian u32.
pub fn read_u32_le(r: &mut dyn Read) -> Result<u32, ReplayError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Read a little-endian i64.
pub fn read_i64_le(r: &mut dyn Read) -> Result<i64, ReplayError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(i64::from_le_bytes(buf))
}

/// Read a little-endian f64.
pub fn read_f64_le(r: &mut dyn Read) -> Result<f64, ReplayError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(f64::from_le_bytes(buf))
}

/// Read a length-prefixed UTF-8 string.
pub fn read_length_prefixed_str(r: &mut dyn Read) -> Result<String, ReplayError> {
    let len = read_u32_le(r)? as u64;
    let mut buf = Vec::new();
    Read::take(&mut *r, len).read_to_end(&mut buf)?;
    if buf.len() as u64 != len {
        return Err(malformed(format!(
            "truncated string: got {} of {len} bytes",
            buf.len()
        )));
    }
    String::from_utf8(buf).map_err(|e| malformed(format!("invalid UTF-8 string: {e}")))
}

fn read_flag(r: &mut dyn Read, what: &str) -> Result<bool, ReplayError> {
    match read_u8(r)? {
        0 => Ok(false),
        1 => Ok(true),
        flag => Err(malformed(format!("invalid {what} flag: {flag}"))),
    }
}

// ── Tags ────────────────────────────────────────────────────────

/// Wire tag of an entity kind.
pub fn kind_tag(kind: EntityKind) -> u8 {
    match kind {
        EntityKind::World => 0,
        EntityKind::Model => 1,
        EntityKind::Link => 2,
        EntityKind::Joint => 3,
    }
}

/// Entity kind for a wire tag.
pub fn kind_from_tag(tag: u8) -> Result<EntityKind, ReplayError> {
    match tag {
        0 => Ok(EntityKind::World),
        1 => Ok(EntityKind::Model),
        2 => Ok(EntityKind::Link),
        3 => Ok(EntityKind::Joint),
        tag => Err(ReplayError::UnknownKindTag { tag }),
    }
}

/// Wire tag of a field: its position in [`Field::ALL`].
pub fn field_tag(field: Field) -> u8 {
    Field::ALL
        .iter()
        .position(|&f| f == field)
        .map_or(u8::MAX, |i| i as u8)
}

fn field_from_tag(tag: u8) -> Result<Field, ReplayError> {
    Field::ALL
        .get(usize::from(tag))
        .copied()
        .ok_or_else(|| malformed(format!("unknown field tag {tag}")))
}

// ── Times and values ────────────────────────────────────────────

fn write_time(w: &mut dyn Write, t: Time) -> Result<(), ReplayError> {
    write_i64_le(w, t.sec())?;
    write_u32_le(w, t.nsec())
}

fn read_time(r: &mut dyn Read) -> Result<Time, ReplayError> {
    let sec = read_i64_le(r)?;
    let nsec = read_u32_le(r)?;
    if nsec >= NANOS_PER_SEC {
        return Err(malformed(format!("nanosecond part {nsec} out of range")));
    }
    Ok(Time::new(sec, i64::from(nsec)))
}

/// Write a clock as wall, real, then sim time.
pub fn write_clock(w: &mut dyn Write, clock: ClockTriple) -> Result<(), ReplayError> {
    write_time(w, clock.wall_time())?;
    write_time(w, clock.real_time())?;
    write_time(w, clock.sim_time())
}

/// Read a clock written by [`write_clock`].
pub fn read_clock(r: &mut dyn Read) -> Result<ClockTriple, ReplayError> {
    let wall = read_time(r)?;
    let real = read_time(r)?;
    let sim = read_time(r)?;
    Ok(ClockTriple::new(wall, real, sim))
}

fn write_vector(w: &mut dyn Write, v: Vector3) -> Result<(), ReplayError> {
    write_f64_le(w, v.x)?;
    write_f64_le(w, v.y)?;
    write_f64_le(w, v.z)
}

fn read_vector(r: &mut dyn Read) -> Result<Vector3, ReplayError> {
    Ok(Vector3::new(read_f64_le(r)?, read_f64_le(r)?, read_f64_le(r)?))
}

fn write_value(w: &mut dyn Write, value: Value) -> Result<(), ReplayError> {
    match value {
        Value::Scalar(v) => write_f64_le(w, v),
        Value::Vector(v) => write_vector(w, v),
        Value::Pose(p) => {
            write_vector(w, p.position)?;
            write_f64_le(w, p.rotation.w)?;
            write_f64_le(w, p.rotation.x)?;
            write_f64_le(w, p.rotation.y)?;
            write_f64_le(w, p.rotation.z)
        }
        Value::Limits(l) => {
            write_f64_le(w, l.low)?;
            write_f64_le(w, l.high)
        }
    }
}

/// The value layout is implied by the field.
fn read_value(r: &mut dyn Read, field: Field) -> Result<Value, ReplayError> {
    Ok(match field {
        Field::Angle | Field::Velocity => Value::Scalar(read_f64_le(r)?),
        Field::LinearVelocity | Field::AngularVelocity | Field::Axis => {
            Value::Vector(read_vector(r)?)
        }
        Field::Pose => {
            let position = read_vector(r)?;
            let rotation = Quaternion::new(
                read_f64_le(r)?,
                read_f64_le(r)?,
                read_f64_le(r)?,
                read_f64_le(r)?,
            );
            Value::Pose(Pose::new(position, rotation))
        }
        Field::StopLimits => Value::Limits(StopLimits::new(read_f64_le(r)?, read_f64_le(r)?)),
    })
}

fn write_optional_value(w: &mut dyn Write, value: Option<Value>) -> Result<(), ReplayError> {
    match value {
        Some(v) => {
            write_u8(w, 1)?;
            write_value(w, v)
        }
        None => write_u8(w, 0),
    }
}

fn read_optional_value(r: &mut dyn Read, field: Field) -> Result<Option<Value>, ReplayError> {
    if read_flag(r, "presence")? {
        read_value(r, field).map(Some)
    } else {
        Ok(None)
    }
}

// ── Header encode/decode ────────────────────────────────────────

/// Encode the recording header (magic, version, metadata).
pub fn encode_header(w: &mut dyn Write, meta: &RecordingMetadata) -> Result<(), ReplayError> {
    w.write_all(&MAGIC)?;
    write_u8(w, FORMAT_VERSION)?;
    write_length_prefixed_str(w, &meta.world_name)?;
    write_length_prefixed_str(w, &meta.producer)?;
    write_u32_le(w, meta.keyframe_interval)?;
    Ok(())
}

/// Decode and validate the recording header.
pub fn decode_header(r: &mut dyn Read) -> Result<RecordingMetadata, ReplayError> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(ReplayError::InvalidMagic);
    }

    let version = read_u8(r)?;
    if version != FORMAT_VERSION {
        return Err(ReplayError::UnsupportedVersion { found: version });
    }

    Ok(RecordingMetadata {
        world_name: read_length_prefixed_str(r)?,
        producer: read_length_prefixed_str(r)?,
        keyframe_interval: read_u32_le(r)?,
    })
}

// ── State encode/decode ─────────────────────────────────────────

fn encode_entity(w: &mut dyn Write, entity: &EntityState) -> Result<(), ReplayError> {
    write_length_prefixed_str(w, entity.name())?;
    write_clock(w, entity.clock())?;
    write_u8(w, kind_tag(entity.kind()))?;
    for (_, value) in entity.payload().fields() {
        write_optional_value(w, value)?;
    }
    Ok(())
}

/// Encode a composite and its whole subtree.
pub fn encode_composite(w: &mut dyn Write, state: &CompositeState) -> Result<(), ReplayError> {
    encode_entity(w, state.entity())?;
    write_u8(w, 1)?;
    write_u32_le(w, len_u32(state.len(), "child")?)?;
    for (_, child) in state.children() {
        encode_state(w, child)?;
    }
    Ok(())
}

/// Encode a leaf or composite state.
pub fn encode_state(w: &mut dyn Write, state: &State) -> Result<(), ReplayError> {
    match state {
        State::Entity(entity) => {
            encode_entity(w, entity)?;
            write_u8(w, 0)
        }
        State::Composite(composite) => encode_composite(w, composite),
    }
}

/// Decode a leaf or composite state.
pub fn decode_state(r: &mut dyn Read) -> Result<State, ReplayError> {
    decode_state_at(r, 0)
}

/// Decode a state that must be a composite.
pub fn decode_composite(r: &mut dyn Read) -> Result<CompositeState, ReplayError> {
    match decode_state(r)? {
        State::Composite(c) => Ok(c),
        State::Entity(e) => Err(malformed(format!(
            "expected a composite, found leaf {} '{}'",
            e.kind(),
            e.name()
        ))),
    }
}

fn decode_state_at(r: &mut dyn Read, depth: usize) -> Result<State, ReplayError> {
    if depth > MAX_DEPTH {
        return Err(malformed(format!("entity nesting deeper than {MAX_DEPTH}")));
    }
    let name = read_length_prefixed_str(r)?;
    let clock = read_clock(r)?;
    let kind = kind_from_tag(read_u8(r)?)?;
    let mut payload = Payload::empty(kind);
    for &field in Field::of_kind(kind) {
        let value = read_optional_value(r, field)?;
        payload.set(field, value)?;
    }
    let entity = EntityState::new(name, clock, payload)?;

    if !read_flag(r, "composite")? {
        return Ok(State::Entity(entity));
    }
    let mut composite = CompositeState::from_entity(entity)?;
    let count = read_u32_le(r)?;
    for _ in 0..count {
        let child = decode_state_at(r, depth + 1)?;
        composite.add_child(child)?;
    }
    Ok(State::Composite(composite))
}

// ── Delta encode/decode ─────────────────────────────────────────

fn encode_node(w: &mut dyn Write, node: &NodeDelta) -> Result<(), ReplayError> {
    write_length_prefixed_str(w, &node.name)?;
    write_u8(w, kind_tag(node.kind))?;
    match node.clock {
        Some(clock) => {
            write_u8(w, 1)?;
            write_clock(w, clock)?;
        }
        None => write_u8(w, 0)?,
    }
    write_u32_le(w, len_u32(node.changes.len(), "change")?)?;
    for change in &node.changes {
        write_u8(w, field_tag(change.field))?;
        write_optional_value(w, change.value)?;
    }
    write_u32_le(w, len_u32(node.children.len(), "child")?)?;
    for child in &node.children {
        encode_node(w, child)?;
    }
    Ok(())
}

fn decode_node(r: &mut dyn Read, depth: usize) -> Result<NodeDelta, ReplayError> {
    if depth > MAX_DEPTH {
        return Err(malformed(format!("delta nesting deeper than {MAX_DEPTH}")));
    }
    let name = read_length_prefixed_str(r)?;
    let kind = kind_from_tag(read_u8(r)?)?;
    let mut node = NodeDelta::new(name, kind);
    if read_flag(r, "clock")? {
        node.clock = Some(read_clock(r)?);
    }
    let changes = read_u32_le(r)?;
    for _ in 0..changes {
        let field = field_from_tag(read_u8(r)?)?;
        let value = read_optional_value(r, field)?;
        node.changes.push(FieldChange { field, value });
    }
    let children = read_u32_le(r)?;
    for _ in 0..children {
        node.children.push(decode_node(r, depth + 1)?);
    }
    Ok(node)
}

/// Encode a delta: its clock, then the node tree.
pub fn encode_delta(w: &mut dyn Write, delta: &Delta) -> Result<(), ReplayError> {
    write_clock(w, delta.clock)?;
    encode_node(w, &delta.root)
}

/// Decode a delta written by [`encode_delta`].
pub fn decode_delta(r: &mut dyn Read) -> Result<Delta, ReplayError> {
    let clock = read_clock(r)?;
    let root = decode_node(r, 0)?;
    Ok(Delta { clock, root })
}

// ── Frame encode/decode ─────────────────────────────────────────

/// Encode a single frame.
pub fn encode_frame(w: &mut dyn Write, frame: &Frame) -> Result<(), ReplayError> {
    write_u8(w, frame.kind().tag())?;
    match frame {
        Frame::Keyframe(state) => encode_composite(w, state)?,
        Frame::Delta(delta) => encode_delta(w, delta)?,
    }
    trace!("encoded {:?} frame at sim time {}", frame.kind(), frame.sim_time());
    Ok(())
}

/// Decode a single frame.
///
/// Returns `Ok(None)` on clean EOF (no bytes before the frame tag),
/// `Ok(Some(frame))` on success, or an error on truncated/corrupt data.
pub fn decode_frame(r: &mut dyn Read) -> Result<Option<Frame>, ReplayError> {
    let mut tag = [0u8; 1];
    loop {
        match r.read(&mut tag) {
            Ok(0) => return Ok(None),
            Ok(_) => break,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(ReplayError::Io(e)),
        }
    }
    let kind = FrameKind::from_tag(tag[0])
        .ok_or_else(|| malformed(format!("unknown frame tag {}", tag[0])))?;
    let frame = match kind {
        FrameKind::Keyframe => Frame::Keyframe(decode_composite(r)?),
        FrameKind::Delta => Frame::Delta(decode_delta(r)?),
    };
    trace!("decoded {kind:?} frame at sim time {}", frame.sim_time());
    Ok(Some(frame))
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::Tolerance;
    use strata_diff::diff;
    use strata_state::{JointPayload, LinkPayload, ModelPayload};

    fn clock(sim: f64) -> ClockTriple {
        let t = Time::from_secs_f64(sim);
        ClockTriple::new(Time::new(1_700_000_000, 250), t, t)
    }

    fn world(sim: f64, angle: f64) -> CompositeState {
        let mut model = CompositeState::new(
            "arm",
            clock(sim),
            Payload::Model(ModelPayload {
                pose: Some(Pose::from_xyz_rpy(0.0, 0.0, 0.1, 0.0, 0.0, 0.3)),
            }),
        )
        .unwrap();
        let link = LinkPayload {
            pose: Some(Pose::from_xyz_rpy(0.0, 0.0, 0.5, 0.1, 0.2, 0.3)),
            linear_velocity: Some(Vector3::new(0.0, 0.0, -9.8 * sim)),
            angular_velocity: None,
        };
        model
            .add_child(EntityState::new("link1", clock(sim), Payload::Link(link)).unwrap())
            .unwrap();
        let joint = JointPayload {
            angle: Some(angle),
            velocity: None,
            axis: Some(Vector3::UNIT_Y),
            stop_limits: Some(StopLimits::new(-1.0, 1.0)),
        };
        model
            .add_child(EntityState::new("joint1", clock(sim), Payload::Joint(joint)).unwrap())
            .unwrap();
        let mut world = CompositeState::new("default", clock(sim), Payload::World).unwrap();
        world.add_child(model).unwrap();
        world
    }

    fn encoded(frame: &Frame) -> Vec<u8> {
        let mut buf = Vec::new();
        encode_frame(&mut buf, frame).unwrap();
        buf
    }

    #[test]
    fn keyframe_decodes_bit_exact() {
        let state = world(0.25, 0.7);
        let buf = encoded(&Frame::Keyframe(state.clone()));
        let frame = decode_frame(&mut buf.as_slice()).unwrap().unwrap();
        assert_eq!(frame, Frame::Keyframe(state));
    }

    #[test]
    fn delta_frame_decodes() {
        let delta = diff(&world(0.0, 0.1), &world(0.01, 0.2)).unwrap();
        let buf = encoded(&Frame::Delta(delta.clone()));
        let frame = decode_frame(&mut buf.as_slice()).unwrap().unwrap();
        assert_eq!(frame, Frame::Delta(delta));
    }

    #[test]
    fn leaf_model_child_survives() {
        let mut state = world(0.0, 0.0);
        let prop = EntityState::new("prop", clock(0.0), Payload::empty(EntityKind::Model)).unwrap();
        state.add_child(prop).unwrap();
        let mut buf = Vec::new();
        encode_composite(&mut buf, &state).unwrap();
        let decoded = decode_composite(&mut buf.as_slice()).unwrap();
        assert!(matches!(decoded.get_child("prop"), Some(State::Entity(_))));
        assert!(decoded.approx_eq(&state, Tolerance::DEFAULT));
    }

    #[test]
    fn empty_input_is_clean_eof() {
        let empty: &[u8] = &[];
        assert!(decode_frame(&mut &*empty).unwrap().is_none());
    }

    #[test]
    fn unknown_frame_tag() {
        let data = [7u8, 0, 0];
        let err = decode_frame(&mut data.as_slice()).unwrap_err();
        assert!(matches!(err, ReplayError::MalformedFrame { .. }));
    }

    #[test]
    fn unknown_kind_tag() {
        let mut buf = Vec::new();
        write_length_prefixed_str(&mut buf, "x").unwrap();
        write_clock(&mut buf, clock(0.0)).unwrap();
        write_u8(&mut buf, 9).unwrap();
        let err = decode_state(&mut buf.as_slice()).unwrap_err();
        assert!(matches!(err, ReplayError::UnknownKindTag { tag: 9 }));
    }

    #[test]
    fn invalid_presence_flag() {
        let mut buf = Vec::new();
        write_length_prefixed_str(&mut buf, "j").unwrap();
        write_clock(&mut buf, clock(0.0)).unwrap();
        write_u8(&mut buf, kind_tag(EntityKind::Joint)).unwrap();
        write_u8(&mut buf, 2).unwrap();
        let err = decode_state(&mut buf.as_slice()).unwrap_err();
        assert!(matches!(err, ReplayError::MalformedFrame { .. }));
    }

    #[test]
    fn out_of_range_nanos_rejected() {
        let mut buf = Vec::new();
        write_i64_le(&mut buf, 1).unwrap();
        write_u32_le(&mut buf, NANOS_PER_SEC).unwrap();
        assert!(matches!(
            read_time(&mut buf.as_slice()),
            Err(ReplayError::MalformedFrame { .. })
        ));
    }

    #[test]
    fn truncated_keyframe_errors() {
        let mut buf = encoded(&Frame::Keyframe(world(0.0, 0.0)));
        buf.truncate(buf.len() - 3);
        assert!(decode_frame(&mut buf.as_slice()).is_err());
    }

    #[test]
    fn truncated_string_errors() {
        let mut buf = Vec::new();
        write_u32_le(&mut buf, 10).unwrap();
        buf.extend_from_slice(b"abc");
        let err = read_length_prefixed_str(&mut buf.as_slice()).unwrap_err();
        assert!(matches!(err, ReplayError::MalformedFrame { .. }));
    }

    #[test]
    fn duplicate_children_rejected() {
        let mut buf = Vec::new();
        let parent = EntityState::new("m", clock(0.0), Payload::empty(EntityKind::Model)).unwrap();
        let child = EntityState::new("l", clock(0.0), Payload::empty(EntityKind::Link)).unwrap();
        encode_entity(&mut buf, &parent).unwrap();
        write_u8(&mut buf, 1).unwrap();
        write_u32_le(&mut buf, 2).unwrap();
        for _ in 0..2 {
            encode_state(&mut buf, &State::Entity(child.clone())).unwrap();
        }
        let err = decode_state(&mut buf.as_slice()).unwrap_err();
        assert!(matches!(err, ReplayError::State(_)));
    }

    #[test]
    fn header_round_trip_and_bad_version() {
        let meta = RecordingMetadata {
            world_name: "default".into(),
            producer: "test".into(),
            keyframe_interval: 4,
        };
        let mut buf = Vec::new();
        encode_header(&mut buf, &meta).unwrap();
        assert_eq!(decode_header(&mut buf.as_slice()).unwrap(), meta);

        buf[4] = FORMAT_VERSION + 1;
        assert!(matches!(
            decode_header(&mut buf.as_slice()),
            Err(ReplayError::UnsupportedVersion { found }) if found == FORMAT_VERSION + 1
        ));
    }

    #[test]
    fn field_tags_cover_every_field() {
        for field in Field::ALL {
            assert_eq!(field_from_tag(field_tag(field)).unwrap(), field);
        }
        assert!(field_from_tag(Field::ALL.len() as u8).is_err());
    }
}
