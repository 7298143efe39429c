//! Capture states from live entities.
//!
//! Captures are read-only: no engine setter is called. Every payload
//! field is filled in, and children are recorded in engine order (links,
//! then joints, then nested models). A stale handle anywhere in the tree
//! fails the whole capture with [`StateError::EngineUnavailable`] naming
//! the entity.

use strata_core::{
    ClockTriple, Joint, Link, Model, StateError, StatePath, Unavailable, World,
};

use crate::composite::CompositeState;
use crate::payload::{JointPayload, LinkPayload, ModelPayload, Payload};
use crate::state::EntityState;

/// Snapshot a whole world at the engine's current clock.
pub fn capture_world(world: &dyn World) -> Result<CompositeState, StateError> {
    let name = world.name();
    ensure_alive(world.is_alive(), name)?;
    let clock = read(world.clock(), name)?;

    let mut state = CompositeState::new(name, clock, Payload::World)?;
    for model in world.models() {
        let child = capture_model(model, clock).map_err(|e| e.within(name))?;
        state.add_child(child)?;
    }
    Ok(state)
}

/// Snapshot a model and everything beneath it, stamped with `clock`.
pub fn capture_model(model: &dyn Model, clock: ClockTriple) -> Result<CompositeState, StateError> {
    let name = model.name();
    ensure_alive(model.is_alive(), name)?;
    let payload = ModelPayload {
        pose: Some(read(model.pose(), name)?),
    };

    let mut state = CompositeState::new(name, clock, Payload::Model(payload))?;
    for link in model.links() {
        let child = capture_link(link, clock).map_err(|e| e.within(name))?;
        state.add_child(child)?;
    }
    for joint in model.joints() {
        let child = capture_joint(joint, clock).map_err(|e| e.within(name))?;
        state.add_child(child)?;
    }
    for nested in model.models() {
        let child = capture_model(nested, clock).map_err(|e| e.within(name))?;
        state.add_child(child)?;
    }
    Ok(state)
}

/// Snapshot a rigid body.
pub fn capture_link(link: &dyn Link, clock: ClockTriple) -> Result<EntityState, StateError> {
    let name = link.name();
    ensure_alive(link.is_alive(), name)?;
    let payload = LinkPayload {
        pose: Some(read(link.pose(), name)?),
        linear_velocity: Some(read(link.linear_velocity(), name)?),
        angular_velocity: Some(read(link.angular_velocity(), name)?),
    };
    EntityState::new(name, clock, Payload::Link(payload))
}

/// Snapshot a joint.
pub fn capture_joint(joint: &dyn Joint, clock: ClockTriple) -> Result<EntityState, StateError> {
    let name = joint.name();
    ensure_alive(joint.is_alive(), name)?;
    let payload = JointPayload {
        angle: Some(read(joint.angle(), name)?),
        velocity: Some(read(joint.velocity(), name)?),
        axis: Some(read(joint.axis(), name)?),
        stop_limits: Some(read(joint.stop_limits(), name)?),
    };
    EntityState::new(name, clock, Payload::Joint(payload))
}

pub(crate) fn unavailable(name: &str) -> StateError {
    StateError::EngineUnavailable {
        path: StatePath::from_name(name),
    }
}

fn ensure_alive(alive: bool, name: &str) -> Result<(), StateError> {
    if alive {
        Ok(())
    } else {
        Err(unavailable(name))
    }
}

fn read<T>(value: Result<T, Unavailable>, name: &str) -> Result<T, StateError> {
    value.map_err(|Unavailable| unavailable(name))
}
