//! Hashing of snapshots for fast replay comparison.
//!
//! Uses FNV-1a over quantized field values. Two states whose values agree
//! to within [`QUANTUM`] almost always hash equal; values straddling a
//! quantization boundary can still hash apart, so a hash mismatch is only
//! a hint and [`compare_state`](crate::compare_state) falls back to a full
//! tolerant diff.

use strata_core::{Pose, Quaternion, Time, Vector3};
use strata_state::{CompositeState, EntityState, State, Value};

use crate::codec::{field_tag, kind_tag};

/// FNV-1a offset basis for 64-bit.
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1a prime for 64-bit.
const FNV_PRIME: u64 = 0x00000100000001B3;

/// Resolution of hashed values.
pub const QUANTUM: f64 = 1e-9;

#[inline]
fn fnv1a_byte(hash: u64, byte: u8) -> u64 {
    (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
}

#[inline]
fn fnv1a_bytes(mut hash: u64, bytes: &[u8]) -> u64 {
    for &b in bytes {
        hash = fnv1a_byte(hash, b);
    }
    hash
}

#[inline]
fn fnv1a_u64(hash: u64, v: u64) -> u64 {
    fnv1a_bytes(hash, &v.to_le_bytes())
}

/// Round to the nearest multiple of [`QUANTUM`]. `-0.0` and `0.0` agree;
/// NaN maps to zero.
fn quantize(v: f64) -> i64 {
    (v / QUANTUM).round() as i64
}

fn fnv1a_f64(hash: u64, v: f64) -> u64 {
    fnv1a_u64(hash, quantize(v) as u64)
}

fn fnv1a_vector(hash: u64, v: Vector3) -> u64 {
    [v.x, v.y, v.z].into_iter().fold(hash, fnv1a_f64)
}

/// `q` and `-q` are the same rotation; hash the one with `w >= 0`.
fn fnv1a_rotation(hash: u64, q: Quaternion) -> u64 {
    let sign = if q.w < 0.0 { -1.0 } else { 1.0 };
    [q.w, q.x, q.y, q.z]
        .into_iter()
        .fold(hash, |h, c| fnv1a_f64(h, sign * c))
}

fn fnv1a_pose(hash: u64, p: Pose) -> u64 {
    fnv1a_rotation(fnv1a_vector(hash, p.position), p.rotation)
}

fn fnv1a_time(hash: u64, t: Time) -> u64 {
    fnv1a_bytes(fnv1a_u64(hash, t.sec() as u64), &t.nsec().to_le_bytes())
}

fn fnv1a_value(hash: u64, value: Value) -> u64 {
    match value {
        Value::Scalar(v) => fnv1a_f64(hash, v),
        Value::Vector(v) => fnv1a_vector(hash, v),
        Value::Pose(p) => fnv1a_pose(hash, p),
        Value::Limits(l) => fnv1a_f64(fnv1a_f64(hash, l.low), l.high),
    }
}

fn fnv1a_entity(mut hash: u64, entity: &EntityState) -> u64 {
    hash = fnv1a_bytes(hash, entity.name().as_bytes());
    hash = fnv1a_byte(hash, 0);
    hash = fnv1a_byte(hash, kind_tag(entity.kind()));
    hash = fnv1a_time(hash, entity.sim_time());
    for (field, value) in entity.payload().fields() {
        hash = fnv1a_byte(hash, field_tag(field));
        hash = match value {
            Some(v) => fnv1a_value(fnv1a_byte(hash, 1), v),
            None => fnv1a_byte(hash, 0),
        };
    }
    hash
}

fn fnv1a_state(hash: u64, state: &State) -> u64 {
    match state {
        State::Entity(e) => fnv1a_byte(fnv1a_entity(hash, e), 0),
        State::Composite(c) => fnv1a_composite(hash, c),
    }
}

fn fnv1a_composite(mut hash: u64, state: &CompositeState) -> u64 {
    hash = fnv1a_byte(fnv1a_entity(hash, state.entity()), 1);
    hash = fnv1a_u64(hash, state.len() as u64);
    for (_, child) in state.children() {
        hash = fnv1a_state(hash, child);
    }
    hash
}

/// Hash of a whole snapshot tree.
///
/// Covers names, kinds, sim times, field presence and quantized field
/// values, and child order. Wall and real time are left out, since a
/// faithful replay reproduces sim time but not the host clock.
pub fn state_hash(state: &CompositeState) -> u64 {
    fnv1a_composite(FNV_OFFSET, state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::{ClockTriple, EntityKind};
    use strata_state::{Field, Payload};

    fn model(wall: i64, angle: f64) -> CompositeState {
        let sim = Time::new(2, 0);
        let clock = ClockTriple::new(Time::new(wall, 0), Time::new(wall - 100, 0), sim);
        let mut m = CompositeState::new("m", clock, Payload::empty(EntityKind::Model)).unwrap();
        let joint = EntityState::new("j", clock, Payload::empty(EntityKind::Joint))
            .unwrap()
            .with_field(Field::Angle, Some(Value::Scalar(angle)))
            .unwrap();
        m.add_child(joint).unwrap();
        m
    }

    #[test]
    fn host_clock_ignored() {
        assert_eq!(state_hash(&model(1_000, 0.5)), state_hash(&model(9_000, 0.5)));
    }

    #[test]
    fn values_matter() {
        assert_ne!(state_hash(&model(1_000, 0.5)), state_hash(&model(1_000, 0.6)));
    }

    #[test]
    fn noise_below_quantum_ignored() {
        assert_eq!(
            state_hash(&model(1_000, 0.25)),
            state_hash(&model(1_000, 0.25 + 1e-13))
        );
    }

    #[test]
    fn negated_quaternion_hashes_equal() {
        let q = Quaternion::from_euler(0.1, 0.2, 0.3);
        let neg = Quaternion::new(-q.w, -q.x, -q.y, -q.z);
        let a = fnv1a_rotation(FNV_OFFSET, q);
        let b = fnv1a_rotation(FNV_OFFSET, neg);
        assert_eq!(a, b);
    }

    #[test]
    fn unset_differs_from_zero() {
        let clock = ClockTriple::new(Time::ZERO, Time::ZERO, Time::ZERO);
        let unset = CompositeState::new("m", clock, Payload::empty(EntityKind::Model)).unwrap();
        let zero = CompositeState::from_entity(
            EntityState::new("m", clock, Payload::empty(EntityKind::Model))
                .unwrap()
                .with_field(Field::Pose, Some(Value::Pose(Pose::default())))
                .unwrap(),
        )
        .unwrap();
        assert_ne!(state_hash(&unset), state_hash(&zero));
    }
}
