//! Push states back into live entities.
//!
//! Only fields that are set in the state are written; unset fields leave
//! the engine's value alone. Clocks are never written: time belongs to
//! the engine.
//!
//! Model and world applies run in two phases. The first walks the live
//! tree read-only and checks every state against it (kind, name, handle
//! liveness, child presence). Only when the whole tree checks out does
//! the second phase write anything, so a mismatch anywhere leaves the
//! engine untouched.

use strata_core::{
    EntityKind, Joint, Link, Model, StateError, StatePath, Unavailable, World,
};

use crate::capture::unavailable;
use crate::composite::CompositeState;
use crate::payload::{JointPayload, LinkPayload, ModelPayload};
use crate::state::{EntityState, State};

/// Write a link state into a live link.
pub fn apply_link(link: &mut dyn Link, state: &EntityState) -> Result<(), StateError> {
    check_entity(EntityKind::Link, state, link.name(), link.is_alive())?;
    write_link(link, state.link()?).map_err(|Unavailable| unavailable(state.name()))
}

/// Write a joint state into a live joint.
///
/// Fields are written axis, stops, angle, velocity, so the angle lands
/// inside the new stops.
pub fn apply_joint(joint: &mut dyn Joint, state: &EntityState) -> Result<(), StateError> {
    check_entity(EntityKind::Joint, state, joint.name(), joint.is_alive())?;
    write_joint(joint, state.joint()?).map_err(|Unavailable| unavailable(state.name()))
}

/// Write a model state and all its children into a live model.
///
/// Every child in the state must exist in the model; children of the
/// model that the state does not mention are left alone.
pub fn apply_model(model: &mut dyn Model, state: &CompositeState) -> Result<(), StateError> {
    validate_model(model, state)?;
    commit_model(model, state)
}

/// Write a world state into a live world. Each child must be a model
/// state naming one of the world's top-level models.
pub fn apply_world(world: &mut dyn World, state: &CompositeState) -> Result<(), StateError> {
    let name = state.name();
    check_entity(EntityKind::World, state.entity(), world.name(), world.is_alive())?;
    for (_, child) in state.children() {
        let model = match child.kind() {
            EntityKind::Model => world.models().find(|m| m.name() == child.name()),
            _ => return Err(misplaced(child).within(name)),
        };
        let model = model.ok_or_else(|| missing(child).within(name))?;
        validate_nested(model, child).map_err(|e| e.within(name))?;
    }

    for (_, child) in state.children() {
        let model = world
            .model_mut(child.name())
            .ok_or_else(|| missing(child).within(name))?;
        commit_nested(model, child).map_err(|e| e.within(name))?;
    }
    Ok(())
}

fn validate_model(model: &dyn Model, state: &CompositeState) -> Result<(), StateError> {
    check_entity(EntityKind::Model, state.entity(), model.name(), model.is_alive())?;
    let name = state.name();
    for (_, child) in state.children() {
        validate_child(model, child).map_err(|e| e.within(name))?;
    }
    Ok(())
}

fn validate_child(model: &dyn Model, child: &State) -> Result<(), StateError> {
    let name = child.name();
    match child.kind() {
        EntityKind::Link => {
            let link = model
                .links()
                .find(|l| l.name() == name)
                .ok_or_else(|| missing(child))?;
            check_entity(EntityKind::Link, child.entity(), link.name(), link.is_alive())
        }
        EntityKind::Joint => {
            let joint = model
                .joints()
                .find(|j| j.name() == name)
                .ok_or_else(|| missing(child))?;
            check_entity(EntityKind::Joint, child.entity(), joint.name(), joint.is_alive())
        }
        EntityKind::Model => {
            let nested = model
                .models()
                .find(|m| m.name() == name)
                .ok_or_else(|| missing(child))?;
            validate_nested(nested, child)
        }
        EntityKind::World => Err(misplaced(child)),
    }
}

/// A model-kind child may be a full composite or a bare entity carrying
/// only the model pose.
fn validate_nested(model: &dyn Model, child: &State) -> Result<(), StateError> {
    match child {
        State::Composite(c) => validate_model(model, c),
        State::Entity(e) => check_entity(EntityKind::Model, e, model.name(), model.is_alive()),
    }
}

fn commit_model(model: &mut dyn Model, state: &CompositeState) -> Result<(), StateError> {
    let name = state.name();
    write_model(model, state.entity().model()?).map_err(|Unavailable| unavailable(name))?;
    for (_, child) in state.children() {
        commit_child(model, child).map_err(|e| e.within(name))?;
    }
    Ok(())
}

fn commit_child(model: &mut dyn Model, child: &State) -> Result<(), StateError> {
    let name = child.name();
    let lost = |Unavailable| unavailable(name);
    match child.kind() {
        EntityKind::Link => {
            let link = model.link_mut(name).ok_or_else(|| missing(child))?;
            write_link(link, child.entity().link()?).map_err(lost)
        }
        EntityKind::Joint => {
            let joint = model.joint_mut(name).ok_or_else(|| missing(child))?;
            write_joint(joint, child.entity().joint()?).map_err(lost)
        }
        EntityKind::Model => {
            let nested = model.model_mut(name).ok_or_else(|| missing(child))?;
            commit_nested(nested, child)
        }
        EntityKind::World => Err(misplaced(child)),
    }
}

fn commit_nested(model: &mut dyn Model, child: &State) -> Result<(), StateError> {
    match child {
        State::Composite(c) => commit_model(model, c),
        State::Entity(e) => {
            write_model(model, e.model()?).map_err(|Unavailable| unavailable(e.name()))
        }
    }
}

/// Kind, name, and liveness checks shared by every apply.
fn check_entity(
    kind: EntityKind,
    state: &EntityState,
    live_name: &str,
    alive: bool,
) -> Result<(), StateError> {
    let path = StatePath::from_name(state.name());
    if state.kind() != kind {
        return Err(StateError::WrongKind {
            path,
            expected: kind,
            found: state.kind(),
        });
    }
    if state.name() != live_name {
        return Err(StateError::StructuralMismatch {
            path,
            detail: format!("{kind} state cannot be applied to {kind} '{live_name}'"),
        });
    }
    if !alive {
        return Err(StateError::EngineUnavailable { path });
    }
    Ok(())
}

fn missing(child: &State) -> StateError {
    StateError::StructuralMismatch {
        path: StatePath::from_name(child.name()),
        detail: format!("no live {} with this name", child.kind()),
    }
}

fn misplaced(child: &State) -> StateError {
    StateError::StructuralMismatch {
        path: StatePath::from_name(child.name()),
        detail: format!("a {} state cannot appear here", child.kind()),
    }
}

fn write_model(model: &mut dyn Model, payload: &ModelPayload) -> Result<(), Unavailable> {
    if let Some(pose) = payload.pose {
        model.set_pose(pose)?;
    }
    Ok(())
}

fn write_link(link: &mut dyn Link, payload: &LinkPayload) -> Result<(), Unavailable> {
    if let Some(pose) = payload.pose {
        link.set_pose(pose)?;
    }
    if let Some(v) = payload.linear_velocity {
        link.set_linear_velocity(v)?;
    }
    if let Some(w) = payload.angular_velocity {
        link.set_angular_velocity(w)?;
    }
    Ok(())
}

fn write_joint(joint: &mut dyn Joint, payload: &JointPayload) -> Result<(), Unavailable> {
    if let Some(axis) = payload.axis {
        joint.set_axis(axis)?;
    }
    if let Some(stops) = payload.stop_limits {
        joint.set_stop_limits(stops)?;
    }
    if let Some(angle) = payload.angle {
        joint.set_angle(angle)?;
    }
    if let Some(velocity) = payload.velocity {
        joint.set_velocity(velocity)?;
    }
    Ok(())
}
