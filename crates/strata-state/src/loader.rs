//! Build states from a parsed descriptor tree.
//!
//! Loading never touches a live entity, so saved scenarios can be turned
//! back into states offline. Children are loaded in document order.
//! Unknown elements and attributes are ignored.
//!
//! Error paths name the entity being loaded (`model1/joint2`). A missing
//! required element is [`StateError::MalformedDescriptor`] unless the
//! caller opted into [`MissingPolicy::Skip`]; a value that does not parse
//! is always [`StateError::TypeMismatch`].

use std::str::FromStr;

use log::warn;
use strata_core::{
    ClockTriple, Descriptor, EntityKind, Pose, StateError, StatePath, StopLimits, Time, Vector3,
};

use crate::composite::CompositeState;
use crate::config::{LoadConfig, MissingPolicy};
use crate::payload::{JointPayload, LinkPayload, ModelPayload, Payload};
use crate::state::{EntityState, State};

/// Load whichever state the element describes, dispatching on its tag.
///
/// A `<state>` root carries its own clock; a bare `<model>`, `<link>`, or
/// `<joint>` root is loaded with a zero clock.
pub fn load_state(elem: &dyn Descriptor, config: &LoadConfig) -> Result<State, StateError> {
    let clock = ClockTriple::default();
    match elem.tag() {
        "state" => load_world(elem, config).map(State::from),
        "model" => load_model(elem, clock, config).map(State::from),
        "link" => load_link(elem, clock, config).map(State::from),
        "joint" => load_joint(elem, clock, config).map(State::from),
        other => Err(StateError::MalformedDescriptor {
            path: StatePath::root(),
            detail: format!("<{other}> does not describe a state"),
        }),
    }
}

/// Load a world state from a `<state world_name="…">` element.
pub fn load_world(elem: &dyn Descriptor, config: &LoadConfig) -> Result<CompositeState, StateError> {
    let name = required_name(elem, "world_name")?;
    let fields = Fields::new(elem, config, EntityKind::World, name);
    let clock = ClockTriple::new(
        fields.required::<Time>("wall_time", "time")?.unwrap_or_default(),
        fields.required::<Time>("real_time", "time")?.unwrap_or_default(),
        fields.required::<Time>("sim_time", "time")?.unwrap_or_default(),
    );

    let mut world = CompositeState::new(name, clock, Payload::World)?;
    for child in elem.children() {
        if child.tag() == "model" {
            let model = load_model(child, clock, config).map_err(|e| e.within(name))?;
            world.add_child(model)?;
        }
    }
    Ok(world)
}

/// Load a model state (and its links, joints, and nested models).
pub fn load_model(
    elem: &dyn Descriptor,
    clock: ClockTriple,
    config: &LoadConfig,
) -> Result<CompositeState, StateError> {
    let name = required_name(elem, "name")?;
    let fields = Fields::new(elem, config, EntityKind::Model, name);
    let payload = ModelPayload {
        pose: fields.required::<Pose>("pose", "pose")?,
    };

    let mut model = CompositeState::new(name, clock, Payload::Model(payload))?;
    for child in elem.children() {
        let state: State = match child.tag() {
            "link" => load_link(child, clock, config).map(State::from),
            "joint" => load_joint(child, clock, config).map(State::from),
            "model" => load_model(child, clock, config).map(State::from),
            _ => continue,
        }
        .map_err(|e| e.within(name))?;
        model.add_child(state)?;
    }
    Ok(model)
}

/// Load a link state.
pub fn load_link(
    elem: &dyn Descriptor,
    clock: ClockTriple,
    config: &LoadConfig,
) -> Result<EntityState, StateError> {
    let name = required_name(elem, "name")?;
    let fields = Fields::new(elem, config, EntityKind::Link, name);
    let mut payload = LinkPayload {
        pose: fields.required::<Pose>("pose", "pose")?,
        linear_velocity: fields.optional::<Vector3>("linear_velocity", "vector3")?,
        angular_velocity: fields.optional::<Vector3>("angular_velocity", "vector3")?,
    };
    if let Some(Twist(linear, angular)) = fields.optional::<Twist>("velocity", "twist")? {
        payload.linear_velocity = Some(linear);
        payload.angular_velocity = Some(angular);
    }
    EntityState::new(name, clock, Payload::Link(payload))
}

/// Load a joint state.
pub fn load_joint(
    elem: &dyn Descriptor,
    clock: ClockTriple,
    config: &LoadConfig,
) -> Result<EntityState, StateError> {
    let name = required_name(elem, "name")?;
    let fields = Fields::new(elem, config, EntityKind::Joint, name);
    let payload = JointPayload {
        angle: fields.required::<f64>("angle", "number")?,
        velocity: fields.optional::<f64>("velocity", "number")?,
        axis: fields.optional_at::<Vector3>(&["axis", "xyz"], "vector3")?,
        stop_limits: fields.stop_limits()?,
    };
    EntityState::new(name, clock, Payload::Joint(payload))
}

fn required_name<'a>(elem: &'a dyn Descriptor, attribute: &str) -> Result<&'a str, StateError> {
    match elem.attribute(attribute) {
        Some(name) if !name.is_empty() => Ok(name),
        _ => Err(StateError::MalformedDescriptor {
            path: StatePath::root(),
            detail: format!("<{}> element has no '{attribute}' attribute", elem.tag()),
        }),
    }
}

/// Six whitespace-separated numbers: linear then angular velocity.
struct Twist(Vector3, Vector3);

impl FromStr for Twist {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        let nums: Vec<f64> = s
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<_, _>>()
            .map_err(|_| ())?;
        match nums[..] {
            [vx, vy, vz, wx, wy, wz] => Ok(Twist(Vector3::new(vx, vy, vz), Vector3::new(wx, wy, wz))),
            _ => Err(()),
        }
    }
}

/// Typed field access on one descriptor element, with errors located at
/// the entity being loaded.
pub(crate) struct Fields<'a> {
    elem: &'a dyn Descriptor,
    config: &'a LoadConfig,
    kind: EntityKind,
    path: StatePath,
}

impl<'a> Fields<'a> {
    pub(crate) fn new(
        elem: &'a dyn Descriptor,
        config: &'a LoadConfig,
        kind: EntityKind,
        name: &str,
    ) -> Self {
        Self {
            elem,
            config,
            kind,
            path: StatePath::from_name(name),
        }
    }

    /// Parse the text of the element at `tags` (a chain of nested children).
    pub(crate) fn optional_at<T: FromStr>(
        &self,
        tags: &[&str],
        expected: &'static str,
    ) -> Result<Option<T>, StateError> {
        let mut node = self.elem;
        for tag in tags {
            match node.child(tag) {
                Some(child) => node = child,
                None => return Ok(None),
            }
        }
        let text = node.text().unwrap_or("").trim();
        text.parse::<T>().map(Some).map_err(|_| StateError::TypeMismatch {
            path: self.path.clone(),
            field: tags.join("/"),
            value: text.to_string(),
            expected,
        })
    }

    pub(crate) fn optional<T: FromStr>(
        &self,
        tag: &str,
        expected: &'static str,
    ) -> Result<Option<T>, StateError> {
        self.optional_at(&[tag], expected)
    }

    /// Like [`optional_at`](Self::optional_at), but absence is an error
    /// unless the load config skips missing fields.
    pub(crate) fn required_at<T: FromStr>(
        &self,
        tags: &[&str],
        expected: &'static str,
    ) -> Result<Option<T>, StateError> {
        match self.optional_at(tags, expected)? {
            Some(v) => Ok(Some(v)),
            None => self.missing(&tags.join("/")).map(|()| None),
        }
    }

    pub(crate) fn required<T: FromStr>(
        &self,
        tag: &str,
        expected: &'static str,
    ) -> Result<Option<T>, StateError> {
        self.required_at(&[tag], expected)
    }

    /// `<axis><limit><lower/><upper/></limit></axis>`; a missing bound
    /// stays open.
    pub(crate) fn stop_limits(&self) -> Result<Option<StopLimits>, StateError> {
        let low = self.optional_at::<f64>(&["axis", "limit", "lower"], "number")?;
        let high = self.optional_at::<f64>(&["axis", "limit", "upper"], "number")?;
        if low.is_none() && high.is_none() {
            return Ok(None);
        }
        let open = StopLimits::default();
        Ok(Some(StopLimits::new(
            low.unwrap_or(open.low),
            high.unwrap_or(open.high),
        )))
    }

    fn missing(&self, field: &str) -> Result<(), StateError> {
        match self.config.missing {
            MissingPolicy::Reject => Err(StateError::MalformedDescriptor {
                path: self.path.clone(),
                detail: format!("{} is missing required <{field}>", self.kind),
            }),
            MissingPolicy::Skip => {
                warn!("{} '{}': required <{field}> missing, left unset", self.kind, self.path);
                Ok(())
            }
        }
    }
}
