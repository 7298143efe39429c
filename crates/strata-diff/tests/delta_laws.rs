//! Integration test: the diff/patch round-trip law.
//!
//! For any two snapshots of the same tree, applying `diff(a, b)` to `a`
//! reproduces `b` within tolerance, and `diff(a, a)` is empty.

use proptest::prelude::*;
use strata_core::{ClockTriple, EntityKind, Pose, StopLimits, Time, Tolerance, Vector3};
use strata_diff::{apply_delta, diff};
use strata_state::{capture_world, CompositeState, EntityState, JointPayload, LinkPayload, Payload};
use strata_test_utils::fixtures::{arm_world, ARM, JOINT1, LINK2};

#[derive(Clone, Debug)]
struct JointValues {
    angle: Option<f64>,
    velocity: Option<f64>,
    stops: Option<(f64, f64)>,
}

#[derive(Clone, Debug)]
struct LinkValues {
    position: Option<(f64, f64, f64)>,
    yaw: f64,
    linear: Option<(f64, f64, f64)>,
}

fn joint_values() -> impl Strategy<Value = JointValues> {
    (
        prop::option::of(-3.0f64..3.0),
        prop::option::of(-10.0f64..10.0),
        prop::option::of((-3.0f64..0.0, 0.0f64..3.0)),
    )
        .prop_map(|(angle, velocity, stops)| JointValues {
            angle,
            velocity,
            stops,
        })
}

fn link_values() -> impl Strategy<Value = LinkValues> {
    let xyz = (-5.0f64..5.0, -5.0f64..5.0, -5.0f64..5.0);
    (prop::option::of(xyz.clone()), -3.0f64..3.0, prop::option::of(xyz))
        .prop_map(|(position, yaw, linear)| LinkValues {
            position,
            yaw,
            linear,
        })
}

fn snapshot(sim: i64, links: &[LinkValues], joints: &[JointValues]) -> CompositeState {
    stamped(sim, 0, links, joints)
}

/// Like [`snapshot`], but the model and its children lag the world clock
/// by `lag` milliseconds.
fn stamped(sim: i64, lag: i64, links: &[LinkValues], joints: &[JointValues]) -> CompositeState {
    let at = |ms: i64| {
        let t = Time::new(0, ms * 1_000_000);
        ClockTriple::new(t, t, t)
    };
    let root_clock = at(sim);
    let clock = at(sim - lag);
    let mut model = CompositeState::new("robot", clock, Payload::empty(EntityKind::Model)).unwrap();
    for (i, l) in links.iter().enumerate() {
        let payload = LinkPayload {
            pose: l
                .position
                .map(|(x, y, z)| Pose::from_xyz_rpy(x, y, z, 0.0, 0.0, l.yaw)),
            linear_velocity: l.linear.map(|(x, y, z)| Vector3::new(x, y, z)),
            angular_velocity: None,
        };
        let link = EntityState::new(format!("link{i}"), clock, Payload::Link(payload)).unwrap();
        model.add_child(link).unwrap();
    }
    for (i, j) in joints.iter().enumerate() {
        let payload = JointPayload {
            angle: j.angle,
            velocity: j.velocity,
            axis: Some(Vector3::UNIT_Y),
            stop_limits: j.stops.map(|(lo, hi)| StopLimits::new(lo, hi)),
        };
        let joint = EntityState::new(format!("joint{i}"), clock, Payload::Joint(payload)).unwrap();
        model.add_child(joint).unwrap();
    }
    let mut world = CompositeState::new("default", root_clock, Payload::World).unwrap();
    world.add_child(model).unwrap();
    world
}

proptest! {
    #[test]
    fn patch_reproduces_target(
        links in prop::collection::vec((link_values(), link_values()), 0..4),
        joints in prop::collection::vec((joint_values(), joint_values()), 0..4),
        t0 in 0i64..100,
        dt in 0i64..100,
    ) {
        let (links_a, links_b): (Vec<_>, Vec<_>) = links.into_iter().unzip();
        let (joints_a, joints_b): (Vec<_>, Vec<_>) = joints.into_iter().unzip();
        let a = snapshot(t0, &links_a, &joints_a);
        let b = snapshot(t0 + dt, &links_b, &joints_b);

        let delta = diff(&a, &b).unwrap();
        let rebuilt = apply_delta(&a, &delta).unwrap();
        prop_assert!(rebuilt.approx_eq(&b, Tolerance::DEFAULT));
        prop_assert_eq!(rebuilt.clock(), b.clock());
    }

    #[test]
    fn self_diff_is_empty(
        links in prop::collection::vec(link_values(), 0..4),
        joints in prop::collection::vec(joint_values(), 0..4),
    ) {
        let a = snapshot(0, &links, &joints);
        prop_assert!(diff(&a, &a).unwrap().is_empty());
    }

    #[test]
    fn self_diff_ignores_child_clocks(
        links in prop::collection::vec(link_values(), 0..4),
        joints in prop::collection::vec(joint_values(), 0..4),
        sim in 50i64..100,
        lag in 1i64..50,
    ) {
        let a = stamped(sim, lag, &links, &joints);
        let delta = diff(&a, &a).unwrap();
        prop_assert!(delta.is_empty());
        prop_assert_eq!(delta.change_count(), 0);
        prop_assert_eq!(apply_delta(&a, &delta).unwrap(), a);
    }

    #[test]
    fn patch_keeps_child_clocks(
        links in prop::collection::vec((link_values(), link_values()), 0..4),
        joints in prop::collection::vec((joint_values(), joint_values()), 0..4),
        lag_a in 0i64..50,
        lag_b in 0i64..50,
    ) {
        let (links_a, links_b): (Vec<_>, Vec<_>) = links.into_iter().unzip();
        let (joints_a, joints_b): (Vec<_>, Vec<_>) = joints.into_iter().unzip();
        let a = stamped(50, lag_a, &links_a, &joints_a);
        let b = stamped(90, lag_b, &links_b, &joints_b);

        let rebuilt = apply_delta(&a, &diff(&a, &b).unwrap()).unwrap();
        prop_assert!(rebuilt.approx_eq(&b, Tolerance::DEFAULT));
        for (name, child) in b.children() {
            prop_assert_eq!(rebuilt.get_child(name).map(|c| c.clock()), Some(child.clock()));
        }
    }
}

#[test]
fn one_step_of_a_live_world() {
    let mut world = arm_world();
    let before = capture_world(&world).unwrap();

    world.step(Time::from_secs_f64(0.01));
    world
        .find_model_mut(ARM)
        .and_then(|m| m.find_joint_mut(JOINT1))
        .unwrap()
        .angle = 0.2;
    let after = capture_world(&world).unwrap();

    let delta = diff(&before, &after).unwrap();
    let changes = delta.changes();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].0.to_string(), "default/arm/joint1");
    assert!(delta.root.child(ARM).and_then(|m| m.child(LINK2)).is_none());
    assert_eq!(apply_delta(&before, &delta).unwrap(), after);
}
