//! Leaf entity states and the [`State`] sum type.

use strata_core::{
    ApproxEq, ClockTriple, EntityKind, StateError, StatePath, Time, Tolerance,
};

use crate::composite::CompositeState;
use crate::payload::{Field, JointPayload, LinkPayload, ModelPayload, Payload, Value};

/// One entity's configuration at one instant.
///
/// Immutable once built: the `with_*` methods return modified copies, so
/// a snapshot held by a timeline is never altered.
///
/// # Examples
///
/// ```
/// use strata_core::{ClockTriple, EntityKind, Time};
/// use strata_state::{EntityState, Field, Payload, Value};
///
/// let clock = ClockTriple::new(Time::ZERO, Time::ZERO, Time::from_secs_f64(0.1));
/// let joint = EntityState::new("elbow", clock, Payload::empty(EntityKind::Joint))
///     .unwrap()
///     .with_field(Field::Angle, Some(Value::Scalar(0.2)))
///     .unwrap();
///
/// assert_eq!(joint.joint().unwrap().angle, Some(0.2));
/// assert!(joint.link().is_err());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct EntityState {
    name: String,
    clock: ClockTriple,
    payload: Payload,
}

impl EntityState {
    /// Build a state. Fails if `name` is empty.
    pub fn new(
        name: impl Into<String>,
        clock: ClockTriple,
        payload: Payload,
    ) -> Result<Self, StateError> {
        let name = name.into();
        if name.is_empty() {
            return Err(StateError::MalformedDescriptor {
                path: StatePath::root(),
                detail: format!("{} state name must not be empty", payload.kind()),
            });
        }
        Ok(Self {
            name,
            clock,
            payload,
        })
    }

    /// Name of the source entity.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All three time references.
    pub fn clock(&self) -> ClockTriple {
        self.clock
    }

    /// Absolute time the snapshot was recorded.
    pub fn wall_time(&self) -> Time {
        self.clock.wall_time()
    }

    /// Elapsed real time since simulation start.
    pub fn real_time(&self) -> Time {
        self.clock.real_time()
    }

    /// Elapsed simulated time.
    pub fn sim_time(&self) -> Time {
        self.clock.sim_time()
    }

    /// Kind of the source entity.
    pub fn kind(&self) -> EntityKind {
        self.payload.kind()
    }

    /// The kind-tagged payload.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// The model payload, or [`StateError::WrongKind`].
    pub fn model(&self) -> Result<&ModelPayload, StateError> {
        match &self.payload {
            Payload::Model(m) => Ok(m),
            _ => Err(self.wrong_kind(EntityKind::Model)),
        }
    }

    /// The link payload, or [`StateError::WrongKind`].
    pub fn link(&self) -> Result<&LinkPayload, StateError> {
        match &self.payload {
            Payload::Link(l) => Ok(l),
            _ => Err(self.wrong_kind(EntityKind::Link)),
        }
    }

    /// The joint payload, or [`StateError::WrongKind`].
    pub fn joint(&self) -> Result<&JointPayload, StateError> {
        match &self.payload {
            Payload::Joint(j) => Ok(j),
            _ => Err(self.wrong_kind(EntityKind::Joint)),
        }
    }

    /// Copy with a different clock.
    pub fn with_clock(mut self, clock: ClockTriple) -> Self {
        self.clock = clock;
        self
    }

    /// Copy with one field set or cleared.
    pub fn with_field(mut self, field: Field, value: Option<Value>) -> Result<Self, StateError> {
        let name = self.name.clone();
        self.payload
            .set(field, value)
            .map_err(|e| e.within(&name))?;
        Ok(self)
    }

    /// Same name and every payload field within `tol`. Clocks are ignored.
    pub fn approx_eq(&self, other: &EntityState, tol: Tolerance) -> bool {
        self.name == other.name && self.payload.approx_eq(&other.payload, tol)
    }

    fn wrong_kind(&self, expected: EntityKind) -> StateError {
        StateError::WrongKind {
            path: StatePath::from_name(self.name.as_str()),
            expected,
            found: self.kind(),
        }
    }
}

/// Either a leaf entity state or a composite with children.
#[derive(Clone, Debug, PartialEq)]
pub enum State {
    /// A link or joint state.
    Entity(EntityState),
    /// A world or model state.
    Composite(CompositeState),
}

impl State {
    /// The entity-level part (name, clock, payload).
    pub fn entity(&self) -> &EntityState {
        match self {
            Self::Entity(e) => e,
            Self::Composite(c) => c.entity(),
        }
    }

    /// Name of the source entity.
    pub fn name(&self) -> &str {
        self.entity().name()
    }

    /// All three time references.
    pub fn clock(&self) -> ClockTriple {
        self.entity().clock()
    }

    /// Absolute time the snapshot was recorded.
    pub fn wall_time(&self) -> Time {
        self.entity().wall_time()
    }

    /// Elapsed real time since simulation start.
    pub fn real_time(&self) -> Time {
        self.entity().real_time()
    }

    /// Elapsed simulated time.
    pub fn sim_time(&self) -> Time {
        self.entity().sim_time()
    }

    /// Kind of the source entity.
    pub fn kind(&self) -> EntityKind {
        self.entity().kind()
    }

    /// The composite, if this is one.
    pub fn as_composite(&self) -> Option<&CompositeState> {
        match self {
            Self::Composite(c) => Some(c),
            Self::Entity(_) => None,
        }
    }

    /// Copy with this node and every descendant stamped with `clock`.
    pub fn restamped(self, clock: ClockTriple) -> Self {
        match self {
            Self::Entity(e) => Self::Entity(e.with_clock(clock)),
            Self::Composite(c) => Self::Composite(c.restamped(clock)),
        }
    }

    /// Recursive tolerant equality: same shape, names, and payloads.
    pub fn approx_eq(&self, other: &State, tol: Tolerance) -> bool {
        match (self, other) {
            (Self::Entity(a), Self::Entity(b)) => a.approx_eq(b, tol),
            (Self::Composite(a), Self::Composite(b)) => a.approx_eq(b, tol),
            _ => false,
        }
    }
}

impl From<EntityState> for State {
    fn from(e: EntityState) -> Self {
        Self::Entity(e)
    }
}

impl From<CompositeState> for State {
    fn from(c: CompositeState) -> Self {
        Self::Composite(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::{Pose, Vector3};

    fn clock(sim: f64) -> ClockTriple {
        ClockTriple::new(Time::new(100, 0), Time::from_secs_f64(sim), Time::from_secs_f64(sim))
    }

    #[test]
    fn empty_name_rejected() {
        let err = EntityState::new("", clock(0.0), Payload::empty(EntityKind::Link)).unwrap_err();
        assert!(matches!(err, StateError::MalformedDescriptor { .. }));
    }

    #[test]
    fn wrong_kind_names_the_state() {
        let link = EntityState::new("link1", clock(0.0), Payload::empty(EntityKind::Link)).unwrap();
        match link.joint() {
            Err(StateError::WrongKind {
                path,
                expected,
                found,
            }) => {
                assert_eq!(path.to_string(), "link1");
                assert_eq!(expected, EntityKind::Joint);
                assert_eq!(found, EntityKind::Link);
            }
            other => panic!("expected WrongKind, got {other:?}"),
        }
    }

    #[test]
    fn with_field_leaves_original_untouched() {
        let base = EntityState::new("link1", clock(0.0), Payload::empty(EntityKind::Link)).unwrap();
        let moved = base
            .clone()
            .with_field(Field::Pose, Some(Value::Pose(Pose::default())))
            .unwrap();
        assert_eq!(base.link().unwrap().pose, None);
        assert_eq!(moved.link().unwrap().pose, Some(Pose::default()));
    }

    #[test]
    fn with_field_error_carries_name() {
        let base = EntityState::new("link1", clock(0.0), Payload::empty(EntityKind::Link)).unwrap();
        let err = base
            .with_field(Field::Axis, Some(Value::Vector(Vector3::UNIT_Y)))
            .unwrap_err();
        assert_eq!(err.path().to_string(), "link1");
    }

    #[test]
    fn accessors_expose_clock() {
        let s = EntityState::new("j", clock(1.5), Payload::empty(EntityKind::Joint)).unwrap();
        assert_eq!(s.sim_time(), Time::from_secs_f64(1.5));
        assert_eq!(s.real_time(), Time::from_secs_f64(1.5));
        assert_eq!(s.wall_time(), Time::new(100, 0));
    }

    #[test]
    fn approx_eq_ignores_clock() {
        let a = EntityState::new("j", clock(0.0), Payload::empty(EntityKind::Joint)).unwrap();
        let b = a.clone().with_clock(clock(5.0));
        assert!(a.approx_eq(&b, Tolerance::DEFAULT));
    }
}
