//! Test utilities and mock engine entities for Strata development.
//!
//! Provides in-memory implementations of the engine capability traits
//! ([`World`], [`Model`], [`Link`], [`Joint`]). Every mock can be
//! [`kill`](MockLink::kill)ed to simulate a stale handle, and counts its
//! setter calls so tests can assert that a failed apply wrote nothing.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use strata_core::{
    ClockTriple, Joint, Link, Model, Pose, StopLimits, Time, Unavailable, Vector3, World,
};

fn live(alive: bool) -> Result<(), Unavailable> {
    if alive {
        Ok(())
    } else {
        Err(Unavailable)
    }
}

/// Mock rigid body.
#[derive(Clone, Debug)]
pub struct MockLink {
    pub name: String,
    pub alive: bool,
    pub pose: Pose,
    pub linear_velocity: Vector3,
    pub angular_velocity: Vector3,
    writes: usize,
}

impl MockLink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alive: true,
            pose: Pose::default(),
            linear_velocity: Vector3::ZERO,
            angular_velocity: Vector3::ZERO,
            writes: 0,
        }
    }

    pub fn with_pose(mut self, pose: Pose) -> Self {
        self.pose = pose;
        self
    }

    /// Simulate the engine destroying the body.
    pub fn kill(&mut self) {
        self.alive = false;
    }

    /// Number of setter calls that reached this link.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl Link for MockLink {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_alive(&self) -> bool {
        self.alive
    }

    fn pose(&self) -> Result<Pose, Unavailable> {
        live(self.alive).map(|()| self.pose)
    }

    fn set_pose(&mut self, pose: Pose) -> Result<(), Unavailable> {
        live(self.alive)?;
        self.writes += 1;
        self.pose = pose;
        Ok(())
    }

    fn linear_velocity(&self) -> Result<Vector3, Unavailable> {
        live(self.alive).map(|()| self.linear_velocity)
    }

    fn set_linear_velocity(&mut self, velocity: Vector3) -> Result<(), Unavailable> {
        live(self.alive)?;
        self.writes += 1;
        self.linear_velocity = velocity;
        Ok(())
    }

    fn angular_velocity(&self) -> Result<Vector3, Unavailable> {
        live(self.alive).map(|()| self.angular_velocity)
    }

    fn set_angular_velocity(&mut self, velocity: Vector3) -> Result<(), Unavailable> {
        live(self.alive)?;
        self.writes += 1;
        self.angular_velocity = velocity;
        Ok(())
    }
}

/// Mock hinge joint. Each stop is clamped so it can never cross the
/// other, the way physics engines commonly behave.
#[derive(Clone, Debug)]
pub struct MockJoint {
    pub name: String,
    pub alive: bool,
    pub axis: Vector3,
    pub angle: f64,
    pub velocity: f64,
    pub stops: StopLimits,
    writes: usize,
}

impl MockJoint {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alive: true,
            axis: Vector3::UNIT_Y,
            angle: 0.0,
            velocity: 0.0,
            stops: StopLimits::default(),
            writes: 0,
        }
    }

    pub fn with_angle(mut self, angle: f64) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_stops(mut self, stops: StopLimits) -> Self {
        self.stops = stops;
        self
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }

    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl Joint for MockJoint {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_alive(&self) -> bool {
        self.alive
    }

    fn axis(&self) -> Result<Vector3, Unavailable> {
        live(self.alive).map(|()| self.axis)
    }

    fn set_axis(&mut self, axis: Vector3) -> Result<(), Unavailable> {
        live(self.alive)?;
        self.writes += 1;
        self.axis = axis;
        Ok(())
    }

    fn angle(&self) -> Result<f64, Unavailable> {
        live(self.alive).map(|()| self.angle)
    }

    fn set_angle(&mut self, angle: f64) -> Result<(), Unavailable> {
        live(self.alive)?;
        self.writes += 1;
        self.angle = angle;
        Ok(())
    }

    fn velocity(&self) -> Result<f64, Unavailable> {
        live(self.alive).map(|()| self.velocity)
    }

    fn set_velocity(&mut self, velocity: f64) -> Result<(), Unavailable> {
        live(self.alive)?;
        self.writes += 1;
        self.velocity = velocity;
        Ok(())
    }

    fn stop_limits(&self) -> Result<StopLimits, Unavailable> {
        live(self.alive).map(|()| self.stops)
    }

    fn set_low_stop(&mut self, low: f64) -> Result<(), Unavailable> {
        live(self.alive)?;
        self.writes += 1;
        self.stops.low = low.min(self.stops.high);
        Ok(())
    }

    fn set_high_stop(&mut self, high: f64) -> Result<(), Unavailable> {
        live(self.alive)?;
        self.writes += 1;
        self.stops.high = high.max(self.stops.low);
        Ok(())
    }
}

/// Mock model holding its links, joints, and nested models by value.
#[derive(Clone, Debug)]
pub struct MockModel {
    pub name: String,
    pub alive: bool,
    pub pose: Pose,
    pub links: Vec<MockLink>,
    pub joints: Vec<MockJoint>,
    pub models: Vec<MockModel>,
    writes: usize,
}

impl MockModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alive: true,
            pose: Pose::default(),
            links: Vec::new(),
            joints: Vec::new(),
            models: Vec::new(),
            writes: 0,
        }
    }

    pub fn with_link(mut self, link: MockLink) -> Self {
        self.links.push(link);
        self
    }

    pub fn with_joint(mut self, joint: MockJoint) -> Self {
        self.joints.push(joint);
        self
    }

    pub fn with_model(mut self, model: MockModel) -> Self {
        self.models.push(model);
        self
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }

    pub fn find_link(&self, name: &str) -> Option<&MockLink> {
        self.links.iter().find(|l| l.name == name)
    }

    pub fn find_link_mut(&mut self, name: &str) -> Option<&mut MockLink> {
        self.links.iter_mut().find(|l| l.name == name)
    }

    pub fn find_joint(&self, name: &str) -> Option<&MockJoint> {
        self.joints.iter().find(|j| j.name == name)
    }

    pub fn find_joint_mut(&mut self, name: &str) -> Option<&mut MockJoint> {
        self.joints.iter_mut().find(|j| j.name == name)
    }

    pub fn find_model_mut(&mut self, name: &str) -> Option<&mut MockModel> {
        self.models.iter_mut().find(|m| m.name == name)
    }

    /// Setter calls on this model and everything beneath it.
    pub fn total_writes(&self) -> usize {
        self.writes
            + self.links.iter().map(MockLink::writes).sum::<usize>()
            + self.joints.iter().map(MockJoint::writes).sum::<usize>()
            + self.models.iter().map(MockModel::total_writes).sum::<usize>()
    }
}

impl Model for MockModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_alive(&self) -> bool {
        self.alive
    }

    fn pose(&self) -> Result<Pose, Unavailable> {
        live(self.alive).map(|()| self.pose)
    }

    fn set_pose(&mut self, pose: Pose) -> Result<(), Unavailable> {
        live(self.alive)?;
        self.writes += 1;
        self.pose = pose;
        Ok(())
    }

    fn links(&self) -> Box<dyn Iterator<Item = &dyn Link> + '_> {
        Box::new(self.links.iter().map(|l| l as &dyn Link))
    }

    fn joints(&self) -> Box<dyn Iterator<Item = &dyn Joint> + '_> {
        Box::new(self.joints.iter().map(|j| j as &dyn Joint))
    }

    fn models(&self) -> Box<dyn Iterator<Item = &dyn Model> + '_> {
        Box::new(self.models.iter().map(|m| m as &dyn Model))
    }

    fn link_mut(&mut self, name: &str) -> Option<&mut dyn Link> {
        self.find_link_mut(name).map(|l| l as &mut dyn Link)
    }

    fn joint_mut(&mut self, name: &str) -> Option<&mut dyn Joint> {
        self.find_joint_mut(name).map(|j| j as &mut dyn Joint)
    }

    fn model_mut(&mut self, name: &str) -> Option<&mut dyn Model> {
        self.find_model_mut(name).map(|m| m as &mut dyn Model)
    }
}

/// Mock world with a manually advanced clock.
#[derive(Clone, Debug)]
pub struct MockWorld {
    pub name: String,
    pub alive: bool,
    pub clock: ClockTriple,
    pub models: Vec<MockModel>,
}

impl MockWorld {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alive: true,
            clock: ClockTriple::default(),
            models: Vec::new(),
        }
    }

    pub fn with_model(mut self, model: MockModel) -> Self {
        self.models.push(model);
        self
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }

    /// Advance sim and real time by `dt` and restamp the wall clock.
    pub fn step(&mut self, dt: Time) {
        let sim = self.clock.sim_time() + dt;
        let real = self.clock.real_time() + dt;
        self.clock = ClockTriple::new(self.clock.wall_time() + dt, real, sim);
    }

    pub fn find_model(&self, name: &str) -> Option<&MockModel> {
        self.models.iter().find(|m| m.name == name)
    }

    pub fn find_model_mut(&mut self, name: &str) -> Option<&mut MockModel> {
        self.models.iter_mut().find(|m| m.name == name)
    }

    pub fn total_writes(&self) -> usize {
        self.models.iter().map(MockModel::total_writes).sum()
    }
}

impl World for MockWorld {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_alive(&self) -> bool {
        self.alive
    }

    fn clock(&self) -> Result<ClockTriple, Unavailable> {
        live(self.alive).map(|()| self.clock)
    }

    fn models(&self) -> Box<dyn Iterator<Item = &dyn Model> + '_> {
        Box::new(self.models.iter().map(|m| m as &dyn Model))
    }

    fn model_mut(&mut self, name: &str) -> Option<&mut dyn Model> {
        self.find_model_mut(name).map(|m| m as &mut dyn Model)
    }
}
