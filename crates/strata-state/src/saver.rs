//! Turn states back into descriptor elements.
//!
//! The output uses the loader's schema, so `load_state(&save_state(s))`
//! reproduces `s` up to float formatting. Unset fields are omitted.

use strata_core::{Element, EntityKind};

use crate::composite::CompositeState;
use crate::payload::Payload;
use crate::state::{EntityState, State};

/// Save any state.
pub fn save_state(state: &State) -> Element {
    match state {
        State::Entity(e) => save_entity(e),
        State::Composite(c) => save_composite(c),
    }
}

/// Save a composite and its children, in child order.
pub fn save_composite(state: &CompositeState) -> Element {
    let mut elem = save_entity(state.entity());
    for (_, child) in state.children() {
        elem.push_child(save_state(child));
    }
    elem
}

/// Save the entity-level part of a state. World states also carry the
/// clock; other kinds inherit it from their root when loaded.
pub fn save_entity(state: &EntityState) -> Element {
    let kind = state.kind();
    let mut elem = Element::new(kind.tag());
    if kind == EntityKind::World {
        elem.set_attribute("world_name", state.name());
        elem.push_child(text("sim_time", state.sim_time().to_descriptor_string()));
        elem.push_child(text("real_time", state.real_time().to_descriptor_string()));
        elem.push_child(text("wall_time", state.wall_time().to_descriptor_string()));
    } else {
        elem.set_attribute("name", state.name());
    }

    match state.payload() {
        Payload::World => {}
        Payload::Model(m) => {
            if let Some(pose) = m.pose {
                elem.push_child(text("pose", pose));
            }
        }
        Payload::Link(l) => {
            if let Some(pose) = l.pose {
                elem.push_child(text("pose", pose));
            }
            match (l.linear_velocity, l.angular_velocity) {
                (Some(v), Some(w)) => elem.push_child(text("velocity", format!("{v} {w}"))),
                (v, w) => {
                    if let Some(v) = v {
                        elem.push_child(text("linear_velocity", v));
                    }
                    if let Some(w) = w {
                        elem.push_child(text("angular_velocity", w));
                    }
                }
            }
        }
        Payload::Joint(j) => {
            if let Some(angle) = j.angle {
                elem.push_child(text("angle", angle).with_attribute("axis", "0"));
            }
            if let Some(velocity) = j.velocity {
                elem.push_child(text("velocity", velocity));
            }
            if j.axis.is_some() || j.stop_limits.is_some() {
                let mut axis = Element::new("axis");
                if let Some(xyz) = j.axis {
                    axis.push_child(text("xyz", xyz));
                }
                if let Some(stops) = j.stop_limits {
                    axis.push_child(
                        Element::new("limit")
                            .with_child(text("lower", stops.low))
                            .with_child(text("upper", stops.high)),
                    );
                }
                elem.push_child(axis);
            }
        }
    }
    elem
}

fn text(tag: &str, value: impl ToString) -> Element {
    Element::new(tag).with_text(value.to_string())
}
