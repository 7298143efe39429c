//! Integration test: the serialized form round-trips.
//!
//! A keyframe decodes to exactly the state that was encoded, and a
//! recording of any snapshot sequence of one entity tree reads back every
//! snapshot within tolerance, whatever the keyframe spacing.

use proptest::prelude::*;
use strata_core::{ClockTriple, Pose, StopLimits, Time, Tolerance, Vector3};
use strata_replay::codec::{decode_frame, encode_frame};
use strata_replay::{state_hash, Frame, ReplayReader, ReplayWriter, WriterConfig};
use strata_state::{CompositeState, EntityState, JointPayload, LinkPayload, ModelPayload, Payload};

#[derive(Clone, Debug)]
struct Values {
    pose: Option<(f64, f64, f64, f64)>,
    velocity: Option<(f64, f64, f64)>,
    angle: Option<f64>,
    stops: Option<(f64, f64)>,
}

fn values() -> impl Strategy<Value = Values> {
    (
        prop::option::of((-5.0f64..5.0, -5.0f64..5.0, -5.0f64..5.0, -3.0f64..3.0)),
        prop::option::of((-10.0f64..10.0, -10.0f64..10.0, -10.0f64..10.0)),
        prop::option::of(-3.0f64..3.0),
        prop::option::of((-3.0f64..0.0, 0.0f64..3.0)),
    )
        .prop_map(|(pose, velocity, angle, stops)| Values {
            pose,
            velocity,
            angle,
            stops,
        })
}

fn snapshot(step: i64, models: &[Vec<Values>]) -> CompositeState {
    let sim = Time::new(0, step * 1_000_000);
    let clock = ClockTriple::new(Time::new(1_700_000_000, 0) + sim, sim, sim);
    let mut world = CompositeState::new("default", clock, Payload::World).unwrap();
    for (m, bodies) in models.iter().enumerate() {
        let mut model = CompositeState::new(
            format!("model{m}"),
            clock,
            Payload::Model(ModelPayload {
                pose: Some(Pose::from_xyz_rpy(m as f64, 0.0, 0.0, 0.0, 0.0, 0.0)),
            }),
        )
        .unwrap();
        for (i, v) in bodies.iter().enumerate() {
            let link = LinkPayload {
                pose: v
                    .pose
                    .map(|(x, y, z, yaw)| Pose::from_xyz_rpy(x, y, z, 0.0, 0.0, yaw)),
                linear_velocity: v.velocity.map(|(x, y, z)| Vector3::new(x, y, z)),
                angular_velocity: None,
            };
            let joint = JointPayload {
                angle: v.angle,
                velocity: None,
                axis: Some(Vector3::UNIT_Y),
                stop_limits: v.stops.map(|(lo, hi)| StopLimits::new(lo, hi)),
            };
            model
                .add_child(EntityState::new(format!("link{i}"), clock, Payload::Link(link)).unwrap())
                .unwrap();
            model
                .add_child(
                    EntityState::new(format!("joint{i}"), clock, Payload::Joint(joint)).unwrap(),
                )
                .unwrap();
        }
        world.add_child(model).unwrap();
    }
    world
}

/// Regroup per-body value series (`[model][body][frame]`) into one tree
/// per frame (`[frame][model][body]`).
fn by_frame(frames: usize, series: &[Vec<Vec<Values>>]) -> Vec<Vec<Vec<Values>>> {
    (0..frames)
        .map(|f| {
            series
                .iter()
                .map(|bodies| bodies.iter().map(|b| b[f].clone()).collect())
                .collect()
        })
        .collect()
}

/// A run of 1 to 5 snapshots of one tree shape.
fn run() -> impl Strategy<Value = Vec<Vec<Vec<Values>>>> {
    (1usize..6, prop::collection::vec(0usize..4, 0..3)).prop_flat_map(|(frames, shape)| {
        let series: Vec<_> = shape
            .into_iter()
            .map(|bodies| prop::collection::vec(prop::collection::vec(values(), frames), bodies))
            .collect();
        series.prop_map(move |series| by_frame(frames, &series))
    })
}

proptest! {
    #[test]
    fn keyframe_is_bit_exact(models in prop::collection::vec(prop::collection::vec(values(), 0..4), 0..3)) {
        let state = snapshot(7, &models);
        let mut buf = Vec::new();
        encode_frame(&mut buf, &Frame::Keyframe(state.clone())).unwrap();
        match decode_frame(&mut buf.as_slice()).unwrap() {
            Some(Frame::Keyframe(back)) => {
                prop_assert_eq!(state_hash(&back), state_hash(&state));
                prop_assert_eq!(back, state);
            }
            other => prop_assert!(false, "expected a keyframe, got {:?}", other),
        }
    }

    #[test]
    fn recording_reads_back(frames in run(), interval in 1u32..5) {
        let states: Vec<_> = frames
            .iter()
            .enumerate()
            .map(|(i, models)| snapshot(i as i64, models))
            .collect();

        let mut buf = Vec::new();
        let config = WriterConfig { keyframe_interval: interval };
        let mut writer = ReplayWriter::new(&mut buf, "default", &config).unwrap();
        for state in &states {
            writer.write_state(state).unwrap();
        }
        drop(writer);

        let read: Vec<_> = ReplayReader::open(buf.as_slice())
            .unwrap()
            .states()
            .collect::<Result<_, _>>()
            .unwrap();
        prop_assert_eq!(read.len(), states.len());
        for (got, want) in read.iter().zip(&states) {
            prop_assert!(got.approx_eq(want, Tolerance::DEFAULT));
            prop_assert_eq!(got.clock(), want.clock());
        }
    }
}
