//! Kind-specific snapshot payloads and their field vocabulary.
//!
//! Every payload field is optional. An unset field was never captured or
//! loaded; applying the state leaves the corresponding engine quantity
//! untouched, which lets partial states be replayed incrementally.
//!
//! [`Field`] and [`Value`] give the differ and the codec a uniform view of
//! payloads regardless of kind.

use std::fmt;

use strata_core::{ApproxEq, EntityKind, Pose, StateError, StatePath, StopLimits, Tolerance, Vector3};

/// A named payload field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    /// Model or link pose.
    Pose,
    /// Link linear velocity.
    LinearVelocity,
    /// Link angular velocity.
    AngularVelocity,
    /// Joint angle.
    Angle,
    /// Joint rate.
    Velocity,
    /// Joint rotation axis.
    Axis,
    /// Joint travel stops.
    StopLimits,
}

impl Field {
    /// Every field, in wire order.
    pub const ALL: [Field; 7] = [
        Field::Pose,
        Field::LinearVelocity,
        Field::AngularVelocity,
        Field::Angle,
        Field::Velocity,
        Field::Axis,
        Field::StopLimits,
    ];

    /// Fields carried by states of `kind`, in wire order.
    pub fn of_kind(kind: EntityKind) -> &'static [Field] {
        match kind {
            EntityKind::World => &[],
            EntityKind::Model => &[Field::Pose],
            EntityKind::Link => &[Field::Pose, Field::LinearVelocity, Field::AngularVelocity],
            EntityKind::Joint => &[Field::Angle, Field::Velocity, Field::Axis, Field::StopLimits],
        }
    }

    /// Stable field name used in messages and descriptors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pose => "pose",
            Self::LinearVelocity => "linear_velocity",
            Self::AngularVelocity => "angular_velocity",
            Self::Angle => "angle",
            Self::Velocity => "velocity",
            Self::Axis => "axis",
            Self::StopLimits => "stop_limits",
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::Pose, Value::Pose(_))
                | (Self::LinearVelocity | Self::AngularVelocity | Self::Axis, Value::Vector(_))
                | (Self::Angle | Self::Velocity, Value::Scalar(_))
                | (Self::StopLimits, Value::Limits(_))
        )
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The value of one payload field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
    /// A scalar (angle, rate).
    Scalar(f64),
    /// A vector (velocity, axis).
    Vector(Vector3),
    /// A pose.
    Pose(Pose),
    /// A stop pair.
    Limits(StopLimits),
}

impl ApproxEq for Value {
    fn approx_eq(&self, other: &Self, tol: Tolerance) -> bool {
        match (self, other) {
            (Self::Scalar(a), Self::Scalar(b)) => a.approx_eq(b, tol),
            (Self::Vector(a), Self::Vector(b)) => a.approx_eq(b, tol),
            (Self::Pose(a), Self::Pose(b)) => a.approx_eq(b, tol),
            (Self::Limits(a), Self::Limits(b)) => a.approx_eq(b, tol),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(v) => write!(f, "{v}"),
            Self::Vector(v) => write!(f, "[{v}]"),
            Self::Pose(p) => write!(f, "[{p}]"),
            Self::Limits(l) => write!(f, "[{}, {}]", l.low, l.high),
        }
    }
}

/// Model payload.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ModelPayload {
    /// Pose of the model frame.
    pub pose: Option<Pose>,
}

/// Rigid-body payload.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LinkPayload {
    /// World pose.
    pub pose: Option<Pose>,
    /// Linear velocity.
    pub linear_velocity: Option<Vector3>,
    /// Angular velocity.
    pub angular_velocity: Option<Vector3>,
}

/// Hinge-joint payload.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct JointPayload {
    /// Joint angle in radians.
    pub angle: Option<f64>,
    /// Joint rate in radians per second.
    pub velocity: Option<f64>,
    /// Rotation axis.
    pub axis: Option<Vector3>,
    /// Travel stops.
    pub stop_limits: Option<StopLimits>,
}

/// Kind-tagged payload of an entity state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Payload {
    /// Worlds carry nothing beyond their children and clock.
    World,
    /// Model payload.
    Model(ModelPayload),
    /// Link payload.
    Link(LinkPayload),
    /// Joint payload.
    Joint(JointPayload),
}

impl Payload {
    /// A payload of `kind` with every field unset.
    pub fn empty(kind: EntityKind) -> Self {
        match kind {
            EntityKind::World => Self::World,
            EntityKind::Model => Self::Model(ModelPayload::default()),
            EntityKind::Link => Self::Link(LinkPayload::default()),
            EntityKind::Joint => Self::Joint(JointPayload::default()),
        }
    }

    /// Entity kind this payload belongs to.
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::World => EntityKind::World,
            Self::Model(_) => EntityKind::Model,
            Self::Link(_) => EntityKind::Link,
            Self::Joint(_) => EntityKind::Joint,
        }
    }

    /// Value of `field`, or `None` if unset or not carried by this kind.
    pub fn get(&self, field: Field) -> Option<Value> {
        match (self, field) {
            (Self::Model(m), Field::Pose) => m.pose.map(Value::Pose),
            (Self::Link(l), Field::Pose) => l.pose.map(Value::Pose),
            (Self::Link(l), Field::LinearVelocity) => l.linear_velocity.map(Value::Vector),
            (Self::Link(l), Field::AngularVelocity) => l.angular_velocity.map(Value::Vector),
            (Self::Joint(j), Field::Angle) => j.angle.map(Value::Scalar),
            (Self::Joint(j), Field::Velocity) => j.velocity.map(Value::Scalar),
            (Self::Joint(j), Field::Axis) => j.axis.map(Value::Vector),
            (Self::Joint(j), Field::StopLimits) => j.stop_limits.map(Value::Limits),
            _ => None,
        }
    }

    /// Set or clear `field`.
    ///
    /// Fails with [`StateError::StructuralMismatch`] (at the root path) if
    /// the field is not carried by this kind or the value has the wrong shape.
    pub fn set(&mut self, field: Field, value: Option<Value>) -> Result<(), StateError> {
        let kind = self.kind();
        if !Field::of_kind(kind).contains(&field) {
            return Err(StateError::StructuralMismatch {
                path: StatePath::root(),
                detail: format!("field '{field}' does not apply to a {kind} state"),
            });
        }
        if let Some(v) = &value {
            if !field.accepts(v) {
                return Err(StateError::StructuralMismatch {
                    path: StatePath::root(),
                    detail: format!("value {v} has the wrong shape for field '{field}'"),
                });
            }
        }
        match (self, field, value) {
            (Self::Model(m), Field::Pose, v) => m.pose = v.and_then(as_pose),
            (Self::Link(l), Field::Pose, v) => l.pose = v.and_then(as_pose),
            (Self::Link(l), Field::LinearVelocity, v) => l.linear_velocity = v.and_then(as_vector),
            (Self::Link(l), Field::AngularVelocity, v) => l.angular_velocity = v.and_then(as_vector),
            (Self::Joint(j), Field::Angle, v) => j.angle = v.and_then(as_scalar),
            (Self::Joint(j), Field::Velocity, v) => j.velocity = v.and_then(as_scalar),
            (Self::Joint(j), Field::Axis, v) => j.axis = v.and_then(as_vector),
            (Self::Joint(j), Field::StopLimits, v) => j.stop_limits = v.and_then(as_limits),
            _ => {}
        }
        Ok(())
    }

    /// Every field carried by this kind, with its value if set.
    pub fn fields(&self) -> impl Iterator<Item = (Field, Option<Value>)> + '_ {
        Field::of_kind(self.kind()).iter().map(move |&f| (f, self.get(f)))
    }

    /// True if no field is set.
    pub fn is_empty(&self) -> bool {
        self.fields().all(|(_, v)| v.is_none())
    }
}

/// Same kind, and every field matches within tolerance (unset matches unset).
impl ApproxEq for Payload {
    fn approx_eq(&self, other: &Self, tol: Tolerance) -> bool {
        self.kind() == other.kind()
            && self
                .fields()
                .all(|(field, value)| value.approx_eq(&other.get(field), tol))
    }
}

fn as_pose(v: Value) -> Option<Pose> {
    match v {
        Value::Pose(p) => Some(p),
        _ => None,
    }
}

fn as_vector(v: Value) -> Option<Vector3> {
    match v {
        Value::Vector(v) => Some(v),
        _ => None,
    }
}

fn as_scalar(v: Value) -> Option<f64> {
    match v {
        Value::Scalar(s) => Some(s),
        _ => None,
    }
}

fn as_limits(v: Value) -> Option<StopLimits> {
    match v {
        Value::Limits(l) => Some(l),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get_joint_angle() {
        let mut p = Payload::empty(EntityKind::Joint);
        assert!(p.is_empty());
        p.set(Field::Angle, Some(Value::Scalar(0.2))).unwrap();
        assert_eq!(p.get(Field::Angle), Some(Value::Scalar(0.2)));
        assert!(!p.is_empty());
        p.set(Field::Angle, None).unwrap();
        assert!(p.is_empty());
    }

    #[test]
    fn field_from_other_kind_rejected() {
        let mut p = Payload::empty(EntityKind::Link);
        let err = p.set(Field::Angle, Some(Value::Scalar(1.0))).unwrap_err();
        assert!(matches!(err, StateError::StructuralMismatch { .. }));
        assert_eq!(p.get(Field::Angle), None);
    }

    #[test]
    fn wrong_value_shape_rejected() {
        let mut p = Payload::empty(EntityKind::Joint);
        let err = p.set(Field::Angle, Some(Value::Vector(Vector3::ZERO))).unwrap_err();
        assert!(matches!(err, StateError::StructuralMismatch { .. }));
    }

    #[test]
    fn approx_eq_respects_tolerance_and_presence() {
        let mut a = Payload::empty(EntityKind::Joint);
        let mut b = Payload::empty(EntityKind::Joint);
        a.set(Field::Angle, Some(Value::Scalar(0.2))).unwrap();
        b.set(Field::Angle, Some(Value::Scalar(0.2 + 1e-9))).unwrap();
        assert!(a.approx_eq(&b, Tolerance::DEFAULT));

        b.set(Field::Angle, None).unwrap();
        assert!(!a.approx_eq(&b, Tolerance::DEFAULT));
        assert!(!a.approx_eq(&Payload::empty(EntityKind::Link), Tolerance::DEFAULT));
    }

    #[test]
    fn fields_follow_kind() {
        let kinds: Vec<_> = Payload::empty(EntityKind::Link).fields().map(|(f, _)| f).collect();
        assert_eq!(kinds, vec![Field::Pose, Field::LinearVelocity, Field::AngularVelocity]);
        assert_eq!(Payload::World.fields().count(), 0);
    }
}
