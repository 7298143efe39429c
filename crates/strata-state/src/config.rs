//! Load options and per-joint hinge configuration.
//!
//! Each entity's configuration is an explicit value passed at
//! construction; nothing is looked up from a process-wide registry.

use strata_core::{
    Descriptor, Element, EntityKind, Joint, StateError, StatePath, StopLimits, Vector3,
};

use crate::loader::Fields;
use crate::payload::JointPayload;

/// What the loader does when a required element is absent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MissingPolicy {
    /// Fail with [`StateError::MalformedDescriptor`].
    #[default]
    Reject,
    /// Leave the field unset and log a warning.
    Skip,
}

/// Options for the snapshot loader.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadConfig {
    /// Handling of missing required elements. Entity names are always
    /// required regardless of this setting.
    pub missing: MissingPolicy,
}

impl LoadConfig {
    /// A config that skips missing fields.
    pub fn lenient() -> Self {
        Self {
            missing: MissingPolicy::Skip,
        }
    }
}

/// Static configuration of a hinge joint: the `<axis>` block of a joint
/// descriptor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HingeConfig {
    /// Rotation axis. Defaults to `(0, 1, 0)`.
    pub axis: Vector3,
    /// Travel stops. Defaults to effectively unlimited.
    pub stop_limits: StopLimits,
    /// Viscous damping coefficient. Defaults to zero.
    pub damping: f64,
}

impl Default for HingeConfig {
    fn default() -> Self {
        Self {
            axis: Vector3::UNIT_Y,
            stop_limits: StopLimits::default(),
            damping: 0.0,
        }
    }
}

impl HingeConfig {
    /// Read the configuration from a `<joint>` element.
    ///
    /// `<axis><xyz>` is required; stops and damping fall back to their
    /// defaults. Errors are located at the joint's name.
    pub fn load(elem: &dyn Descriptor, config: &LoadConfig) -> Result<Self, StateError> {
        let name = elem.attribute("name").unwrap_or_default();
        let fields = Fields::new(elem, config, EntityKind::Joint, name);
        let defaults = Self::default();
        Ok(Self {
            axis: fields
                .required_at::<Vector3>(&["axis", "xyz"], "vector3")?
                .unwrap_or(defaults.axis),
            stop_limits: fields.stop_limits()?.unwrap_or(defaults.stop_limits),
            damping: fields
                .optional_at::<f64>(&["axis", "dynamics", "damping"], "number")?
                .unwrap_or(defaults.damping),
        })
    }

    /// Push stops and axis into a live joint. Damping is the backend's
    /// concern and is not written here.
    pub fn apply_to(&self, joint: &mut dyn Joint) -> Result<(), StateError> {
        joint
            .set_stop_limits(self.stop_limits)
            .and_then(|()| joint.set_axis(self.axis))
            .map_err(|_| StateError::EngineUnavailable {
                path: StatePath::from_name(joint.name()),
            })
    }

    /// The `<axis>` element describing this configuration.
    pub fn save(&self) -> Element {
        Element::new("axis")
            .with_child(Element::new("xyz").with_text(self.axis.to_string()))
            .with_child(
                Element::new("limit")
                    .with_child(Element::new("lower").with_text(self.stop_limits.low.to_string()))
                    .with_child(Element::new("upper").with_text(self.stop_limits.high.to_string())),
            )
            .with_child(
                Element::new("dynamics")
                    .with_child(Element::new("damping").with_text(self.damping.to_string())),
            )
    }

    /// A joint payload carrying just the configured axis and stops.
    pub fn to_payload(&self) -> JointPayload {
        JointPayload {
            axis: Some(self.axis),
            stop_limits: Some(self.stop_limits),
            ..JointPayload::default()
        }
    }
}
