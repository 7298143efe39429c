//! Integration test: recording mock worlds into a timeline.

use strata_core::{StateError, Time};
use strata_test_utils::fixtures::{arm_world, ARM, JOINT1};
use strata_timeline::{Recorder, TimelineConfig, TimelineError};

fn dt() -> Time {
    Time::from_secs_f64(0.01)
}

#[test]
fn decimation_records_every_nth_step() {
    let config = TimelineConfig {
        decimation: 3,
        ..TimelineConfig::default()
    };
    let mut recorder = Recorder::new(&config).unwrap();
    let mut world = arm_world();

    let mut recorded = Vec::new();
    for _ in 0..10 {
        world.step(dt());
        recorded.push(recorder.record_step(&world).unwrap());
    }
    assert_eq!(recorder.steps(), 10);
    assert_eq!(recorder.timeline().len(), 4);
    assert_eq!(recorded[0], Some(0));
    assert_eq!(recorded[1], None);
    assert_eq!(recorded[3], Some(1));
}

#[test]
fn failed_capture_leaves_timeline_unchanged() {
    let mut recorder = Recorder::new(&TimelineConfig::default()).unwrap();
    let mut world = arm_world();
    world.step(dt());
    recorder.record_step(&world).unwrap();

    world
        .find_model_mut(ARM)
        .and_then(|m| m.find_joint_mut(JOINT1))
        .unwrap()
        .kill();
    world.step(dt());
    let err = recorder.record_step(&world).unwrap_err();
    match err {
        TimelineError::Capture(StateError::EngineUnavailable { path }) => {
            assert_eq!(path.to_string(), "default/arm/joint1");
        }
        other => panic!("expected capture failure, got {other:?}"),
    }
    assert_eq!(recorder.timeline().len(), 1);
}

#[test]
fn rewound_clock_is_rejected() {
    let mut recorder = Recorder::new(&TimelineConfig::default()).unwrap();
    let mut world = arm_world();
    world.step(dt());
    world.step(dt());
    recorder.record_step(&world).unwrap();

    let mut rewound = arm_world();
    rewound.step(dt());
    assert!(matches!(
        recorder.record_step(&rewound),
        Err(TimelineError::NonMonotonicTime { .. })
    ));
}

#[test]
fn finish_seals() {
    let mut recorder = Recorder::new(&TimelineConfig::default()).unwrap();
    let world = arm_world();
    recorder.record_step(&world).unwrap();
    let reader = recorder.reader();
    let mut timeline = recorder.finish();
    assert!(reader.is_sealed());
    assert_eq!(reader.len(), 1);
    assert!(timeline.is_sealed());
    let state = strata_state::capture_world(&world).unwrap();
    assert_eq!(timeline.append(state), Err(TimelineError::TimelineSealed));
}
