//! Reusable scenes and descriptors.
//!
//! - [`two_link_arm`]: a model with two links joined by one hinge.
//! - [`arm_world`]: a world holding that arm (plus an empty prop model).
//! - [`arm_descriptor`]: the descriptor of [`arm_world`] with a chosen
//!   joint angle and sim time.

use strata_core::{Element, Pose, StopLimits, Time, Vector3};

use crate::{MockJoint, MockLink, MockModel, MockWorld};

pub const ARM: &str = "arm";
pub const LINK1: &str = "link1";
pub const LINK2: &str = "link2";
pub const JOINT1: &str = "joint1";
pub const PROP: &str = "prop";

pub fn two_link_arm() -> MockModel {
    MockModel::new(ARM)
        .with_link(MockLink::new(LINK1).with_pose(Pose::from_xyz_rpy(0.0, 0.0, 0.5, 0.0, 0.0, 0.0)))
        .with_link(MockLink::new(LINK2).with_pose(Pose::from_xyz_rpy(0.0, 0.0, 1.5, 0.0, 0.0, 0.0)))
        .with_joint(MockJoint::new(JOINT1).with_stops(StopLimits::new(-1.57, 1.57)))
}

pub fn arm_world() -> MockWorld {
    let mut prop = MockModel::new(PROP);
    prop.pose = Pose::from_xyz_rpy(2.0, 0.0, 0.0, 0.0, 0.0, 0.0);
    MockWorld::new("default")
        .with_model(two_link_arm())
        .with_model(prop)
}

/// World descriptor in the saved-state schema.
pub fn arm_descriptor(sim: Time, angle: f64) -> Element {
    let link = |name: &str, z: f64| {
        Element::new("link")
            .with_attribute("name", name)
            .with_child(Element::new("pose").with_text(format!("0 0 {z} 0 0 0")))
            .with_child(Element::new("velocity").with_text("0 0 0 0 0 0"))
    };
    let joint = Element::new("joint")
        .with_attribute("name", JOINT1)
        .with_child(
            Element::new("angle")
                .with_attribute("axis", "0")
                .with_text(angle.to_string()),
        )
        .with_child(Element::new("velocity").with_text("0"))
        .with_child(
            Element::new("axis")
                .with_child(Element::new("xyz").with_text(Vector3::UNIT_Y.to_string()))
                .with_child(
                    Element::new("limit")
                        .with_child(Element::new("lower").with_text("-1.57"))
                        .with_child(Element::new("upper").with_text("1.57")),
                ),
        );

    Element::new("state")
        .with_attribute("world_name", "default")
        .with_child(Element::new("sim_time").with_text(sim.to_descriptor_string()))
        .with_child(Element::new("real_time").with_text(sim.to_descriptor_string()))
        .with_child(Element::new("wall_time").with_text("1700000000 0"))
        .with_child(
            Element::new("model")
                .with_attribute("name", ARM)
                .with_child(Element::new("pose").with_text("0 0 0 0 0 0"))
                .with_child(link(LINK1, 0.5))
                .with_child(link(LINK2, 1.5))
                .with_child(joint),
        )
        .with_child(
            Element::new("model")
                .with_attribute("name", PROP)
                .with_child(Element::new("pose").with_text("2 0 0 0 0 0")),
        )
}
