//! Capability traits a physics backend implements for its live entities.
//!
//! The state subsystem never performs physics; it only reads and writes
//! the quantities these traits expose. Backends are selected at
//! construction time by handing out trait objects, so one capture/apply
//! implementation serves every engine.
//!
//! All getters and setters return [`Unavailable`] when the handle has gone
//! stale (the entity was destroyed since it was last referenced). They must
//! never panic on a stale handle.

use std::fmt;

use crate::error::Unavailable;
use crate::math::{Pose, StopLimits, Vector3};
use crate::time::ClockTriple;

/// The kind of entity a state was captured from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A whole simulated world.
    World,
    /// A model: a tree of links, joints, and nested models.
    Model,
    /// A rigid body.
    Link,
    /// A single-axis (hinge-like) joint.
    Joint,
}

impl EntityKind {
    /// Descriptor element tag for this kind.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::World => "state",
            Self::Model => "model",
            Self::Link => "link",
            Self::Joint => "joint",
        }
    }

    /// True for kinds whose states own children.
    pub fn is_composite(&self) -> bool {
        matches!(self, Self::World | Self::Model)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::World => write!(f, "world"),
            Self::Model => write!(f, "model"),
            Self::Link => write!(f, "link"),
            Self::Joint => write!(f, "joint"),
        }
    }
}

/// A rigid body.
pub trait Link {
    /// Entity name, unique within the owning model.
    fn name(&self) -> &str;

    /// False once the engine has destroyed the entity.
    fn is_alive(&self) -> bool;

    /// World pose of the body.
    fn pose(&self) -> Result<Pose, Unavailable>;

    /// Teleport the body.
    fn set_pose(&mut self, pose: Pose) -> Result<(), Unavailable>;

    /// Linear velocity in the world frame.
    fn linear_velocity(&self) -> Result<Vector3, Unavailable>;

    /// Set the linear velocity.
    fn set_linear_velocity(&mut self, velocity: Vector3) -> Result<(), Unavailable>;

    /// Angular velocity in the world frame.
    fn angular_velocity(&self) -> Result<Vector3, Unavailable>;

    /// Set the angular velocity.
    fn set_angular_velocity(&mut self, velocity: Vector3) -> Result<(), Unavailable>;
}

/// A single-axis joint.
///
/// This capability set replaces a joint class parameterised over its
/// engine base: each backend implements it once for its own joint type.
pub trait Joint {
    /// Entity name, unique within the owning model.
    fn name(&self) -> &str;

    /// False once the engine has destroyed the entity.
    fn is_alive(&self) -> bool;

    /// Rotation axis.
    fn axis(&self) -> Result<Vector3, Unavailable>;

    /// Set the rotation axis.
    fn set_axis(&mut self, axis: Vector3) -> Result<(), Unavailable>;

    /// Current joint angle in radians.
    fn angle(&self) -> Result<f64, Unavailable>;

    /// Drive the joint to an angle.
    fn set_angle(&mut self, angle: f64) -> Result<(), Unavailable>;

    /// Current joint rate in radians per second.
    fn velocity(&self) -> Result<f64, Unavailable>;

    /// Set the joint rate.
    fn set_velocity(&mut self, velocity: f64) -> Result<(), Unavailable>;

    /// Current travel stops.
    fn stop_limits(&self) -> Result<StopLimits, Unavailable>;

    /// Set the lower stop only.
    fn set_low_stop(&mut self, low: f64) -> Result<(), Unavailable>;

    /// Set the upper stop only.
    fn set_high_stop(&mut self, high: f64) -> Result<(), Unavailable>;

    /// Set both stops.
    ///
    /// Writes high, low, then high again: some engines clamp a new stop
    /// against the current opposite stop, and this order lands on the
    /// requested pair from any starting pair.
    fn set_stop_limits(&mut self, limits: StopLimits) -> Result<(), Unavailable> {
        self.set_high_stop(limits.high)?;
        self.set_low_stop(limits.low)?;
        self.set_high_stop(limits.high)
    }
}

/// A model: links, joints, and nested models under one pose.
pub trait Model {
    /// Entity name, unique within the owning world or model.
    fn name(&self) -> &str;

    /// False once the engine has destroyed the entity.
    fn is_alive(&self) -> bool;

    /// World pose of the model frame.
    fn pose(&self) -> Result<Pose, Unavailable>;

    /// Move the model frame.
    fn set_pose(&mut self, pose: Pose) -> Result<(), Unavailable>;

    /// Links in engine order.
    fn links(&self) -> Box<dyn Iterator<Item = &dyn Link> + '_>;

    /// Joints in engine order.
    fn joints(&self) -> Box<dyn Iterator<Item = &dyn Joint> + '_>;

    /// Nested models in engine order.
    fn models(&self) -> Box<dyn Iterator<Item = &dyn Model> + '_>;

    /// Mutable access to a link by name.
    fn link_mut(&mut self, name: &str) -> Option<&mut dyn Link>;

    /// Mutable access to a joint by name.
    fn joint_mut(&mut self, name: &str) -> Option<&mut dyn Joint>;

    /// Mutable access to a nested model by name.
    fn model_mut(&mut self, name: &str) -> Option<&mut dyn Model>;
}

/// A simulated world.
pub trait World {
    /// World name.
    fn name(&self) -> &str;

    /// False once the world has been torn down.
    fn is_alive(&self) -> bool;

    /// The three time references as of the last completed step.
    fn clock(&self) -> Result<ClockTriple, Unavailable>;

    /// Top-level models in engine order.
    fn models(&self) -> Box<dyn Iterator<Item = &dyn Model> + '_>;

    /// Mutable access to a top-level model by name.
    fn model_mut(&mut self, name: &str) -> Option<&mut dyn Model>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ClampingJoint {
        stops: StopLimits,
    }

    impl Joint for ClampingJoint {
        fn name(&self) -> &str {
            "clamping"
        }
        fn is_alive(&self) -> bool {
            true
        }
        fn axis(&self) -> Result<Vector3, Unavailable> {
            Ok(Vector3::UNIT_Y)
        }
        fn set_axis(&mut self, _axis: Vector3) -> Result<(), Unavailable> {
            Ok(())
        }
        fn angle(&self) -> Result<f64, Unavailable> {
            Ok(0.0)
        }
        fn set_angle(&mut self, _angle: f64) -> Result<(), Unavailable> {
            Ok(())
        }
        fn velocity(&self) -> Result<f64, Unavailable> {
            Ok(0.0)
        }
        fn set_velocity(&mut self, _velocity: f64) -> Result<(), Unavailable> {
            Ok(())
        }
        fn stop_limits(&self) -> Result<StopLimits, Unavailable> {
            Ok(self.stops)
        }
        // Each stop is clamped so it can never cross the other one.
        fn set_low_stop(&mut self, low: f64) -> Result<(), Unavailable> {
            self.stops.low = low.min(self.stops.high);
            Ok(())
        }
        fn set_high_stop(&mut self, high: f64) -> Result<(), Unavailable> {
            self.stops.high = high.max(self.stops.low);
            Ok(())
        }
    }

    #[test]
    fn stop_ordering_reaches_target_moving_up() {
        let mut joint = ClampingJoint {
            stops: StopLimits::new(-1.0, 1.0),
        };
        joint.set_stop_limits(StopLimits::new(2.0, 3.0)).unwrap();
        assert_eq!(joint.stops, StopLimits::new(2.0, 3.0));
    }

    #[test]
    fn stop_ordering_reaches_target_moving_down() {
        let mut joint = ClampingJoint {
            stops: StopLimits::new(2.0, 3.0),
        };
        joint.set_stop_limits(StopLimits::new(-3.0, -2.0)).unwrap();
        assert_eq!(joint.stops, StopLimits::new(-3.0, -2.0));
    }

    #[test]
    fn kind_tags() {
        assert_eq!(EntityKind::World.tag(), "state");
        assert!(EntityKind::Model.is_composite());
        assert!(!EntityKind::Joint.is_composite());
        assert_eq!(EntityKind::Link.to_string(), "link");
    }
}
