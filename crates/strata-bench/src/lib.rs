//! Benchmark profiles for Strata.
//!
//! Deterministic synthetic snapshots, so runs are comparable:
//!
//! - [`synthetic_world`]: a world of `models` models with `bodies`
//!   link/joint pairs each, posed as a function of the step
//! - [`synthetic_timeline`]: a sealed timeline of consecutive worlds

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use strata_core::{ClockTriple, Pose, StopLimits, Time, Vector3};
use strata_state::{CompositeState, EntityState, JointPayload, LinkPayload, ModelPayload, Payload};
use strata_timeline::Timeline;

/// Sim-time step between consecutive synthetic snapshots (1 ms).
pub const STEP_NANOS: i64 = 1_000_000;

/// Clock of step `step`, with wall time offset from a fixed epoch.
pub fn step_clock(step: u64) -> ClockTriple {
    let sim = Time::new(0, step as i64 * STEP_NANOS);
    ClockTriple::new(Time::new(1_700_000_000, 0) + sim, sim, sim)
}

/// World snapshot at `step`. Every joint angle and link pose moves each
/// step, so consecutive snapshots diff on every leaf.
pub fn synthetic_world(models: usize, bodies: usize, step: u64) -> CompositeState {
    let clock = step_clock(step);
    let t = step as f64 * 1e-3;
    let mut world = CompositeState::new("default", clock, Payload::World).unwrap();
    for m in 0..models {
        let base = Pose::from_xyz_rpy(m as f64, 0.0, 0.0, 0.0, 0.0, 0.0);
        let mut model = CompositeState::new(
            format!("model{m}"),
            clock,
            Payload::Model(ModelPayload { pose: Some(base) }),
        )
        .unwrap();
        for b in 0..bodies {
            let phase = t + (m * bodies + b) as f64 * 0.1;
            let link = LinkPayload {
                pose: Some(Pose::from_xyz_rpy(
                    m as f64,
                    0.0,
                    b as f64 + phase.sin(),
                    0.0,
                    0.0,
                    phase,
                )),
                linear_velocity: Some(Vector3::new(0.0, 0.0, phase.cos())),
                angular_velocity: Some(Vector3::new(0.0, 0.0, 1.0)),
            };
            let joint = JointPayload {
                angle: Some(phase.sin()),
                velocity: Some(phase.cos()),
                axis: Some(Vector3::UNIT_Y),
                stop_limits: Some(StopLimits::new(-1.57, 1.57)),
            };
            let link = EntityState::new(format!("link{b}"), clock, Payload::Link(link)).unwrap();
            let joint = EntityState::new(format!("joint{b}"), clock, Payload::Joint(joint)).unwrap();
            model.add_child(link).unwrap();
            model.add_child(joint).unwrap();
        }
        world.add_child(model).unwrap();
    }
    world
}

/// Sealed timeline of `len` consecutive [`synthetic_world`]s.
pub fn synthetic_timeline(len: u64, models: usize, bodies: usize) -> Timeline {
    let mut timeline = Timeline::new();
    for step in 0..len {
        timeline
            .append(synthetic_world(models, bodies, step))
            .unwrap();
    }
    timeline.seal();
    timeline
}
