//! Integration test: saving a world to a descriptor and loading it back
//! reproduces the world within tolerance.

use std::f64::consts::FRAC_PI_2;

use proptest::prelude::*;
use strata_core::{ClockTriple, Pose, StopLimits, Time, Tolerance, Vector3};
use strata_state::{
    load_state, save_composite, CompositeState, EntityState, JointPayload, LinkPayload, LoadConfig,
    ModelPayload, Payload,
};

fn pitch() -> impl Strategy<Value = f64> {
    prop_oneof![
        -1.5f64..1.5,
        Just(FRAC_PI_2),
        Just(-FRAC_PI_2),
        (0.0f64..1e-6).prop_map(|d| FRAC_PI_2 - d),
        (0.0f64..1e-6).prop_map(|d| d - FRAC_PI_2),
    ]
}

fn pose() -> impl Strategy<Value = Pose> {
    let xyz = (-10.0f64..10.0, -10.0f64..10.0, -10.0f64..10.0);
    (xyz, -3.1f64..3.1, pitch(), -3.1f64..3.1)
        .prop_map(|((x, y, z), roll, pitch, yaw)| Pose::from_xyz_rpy(x, y, z, roll, pitch, yaw))
}

fn vector() -> impl Strategy<Value = Vector3> {
    (-20.0f64..20.0, -20.0f64..20.0, -20.0f64..20.0).prop_map(|(x, y, z)| Vector3::new(x, y, z))
}

fn link() -> impl Strategy<Value = LinkPayload> {
    (pose(), prop::option::of(vector()), prop::option::of(vector())).prop_map(
        |(pose, linear_velocity, angular_velocity)| LinkPayload {
            pose: Some(pose),
            linear_velocity,
            angular_velocity,
        },
    )
}

fn joint() -> impl Strategy<Value = JointPayload> {
    (
        -3.0f64..3.0,
        prop::option::of(-10.0f64..10.0),
        prop::option::of(vector()),
        prop::option::of((-3.0f64..0.0, 0.0f64..3.0)),
    )
        .prop_map(|(angle, velocity, axis, stops)| JointPayload {
            angle: Some(angle),
            velocity,
            axis,
            stop_limits: stops.map(|(low, high)| StopLimits::new(low, high)),
        })
}

#[derive(Clone, Debug)]
struct ModelValues {
    pose: Pose,
    links: Vec<LinkPayload>,
    joints: Vec<JointPayload>,
}

fn model() -> impl Strategy<Value = ModelValues> {
    (
        pose(),
        prop::collection::vec(link(), 0..4),
        prop::collection::vec(joint(), 0..4),
    )
        .prop_map(|(pose, links, joints)| ModelValues { pose, links, joints })
}

fn build(clock: ClockTriple, models: &[ModelValues]) -> CompositeState {
    let mut world = CompositeState::new("default", clock, Payload::World).unwrap();
    for (i, m) in models.iter().enumerate() {
        let payload = Payload::Model(ModelPayload { pose: Some(m.pose) });
        let mut model = CompositeState::new(format!("model{i}"), clock, payload).unwrap();
        for (j, l) in m.links.iter().enumerate() {
            let link = EntityState::new(format!("link{j}"), clock, Payload::Link(*l)).unwrap();
            model.add_child(link).unwrap();
        }
        for (j, h) in m.joints.iter().enumerate() {
            let joint = EntityState::new(format!("joint{j}"), clock, Payload::Joint(*h)).unwrap();
            model.add_child(joint).unwrap();
        }
        world.add_child(model).unwrap();
    }
    world
}

proptest! {
    #[test]
    fn load_of_save_matches(
        models in prop::collection::vec(model(), 0..3),
        sim in 0i64..1_000_000,
        nsec in 0i64..1_000_000_000,
    ) {
        let clock = ClockTriple::new(
            Time::new(1_700_000_000 + sim, nsec),
            Time::new(sim, nsec),
            Time::new(sim, nsec),
        );
        let world = build(clock, &models);

        let loaded = load_state(&save_composite(&world), &LoadConfig::default()).unwrap();
        let loaded = loaded.as_composite().unwrap();
        prop_assert!(world.approx_eq(loaded, Tolerance::DEFAULT));
        prop_assert_eq!(loaded.clock(), clock);
        prop_assert_eq!(loaded.count(), world.count());
    }
}

#[test]
fn pose_at_gimbal_lock_survives_save() {
    let clock = ClockTriple::new(Time::new(5, 0), Time::new(1, 0), Time::new(1, 0));
    for pitch in [FRAC_PI_2, -FRAC_PI_2] {
        let models = [ModelValues {
            pose: Pose::from_xyz_rpy(0.0, 0.0, 0.0, 0.3, pitch, 0.2),
            links: Vec::new(),
            joints: Vec::new(),
        }];
        let world = build(clock, &models);
        let loaded = load_state(&save_composite(&world), &LoadConfig::default()).unwrap();
        assert!(world.approx_eq(loaded.as_composite().unwrap(), Tolerance::DEFAULT));
    }
}
