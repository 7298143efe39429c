//! Comparing a replayed run against its recording.
//!
//! Hash-first comparison (fast path) with a tolerant field-by-field diff
//! on mismatch, plus a streaming replay-and-compare driver.

use std::io::Read;

use strata_core::{StatePath, Time, Tolerance};
use strata_diff::{diff_with, DiffConfig};
use strata_state::{CompositeState, EntityState, Field, Value};

use crate::error::ReplayError;
use crate::hash::state_hash;
use crate::reader::ReplayReader;

/// One field that differs between the recorded and replayed snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldDivergence {
    /// Entity holding the field, starting at the root's name.
    pub path: StatePath,
    /// The field that diverged.
    pub field: Field,
    /// Value in the recording.
    pub recorded: Option<Value>,
    /// Value in the replay.
    pub replayed: Option<Value>,
}

/// Everything that differs between one recorded and replayed snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct DivergenceReport {
    /// Sim time of the recorded snapshot.
    pub recorded_time: Time,
    /// Sim time of the replayed snapshot.
    pub replayed_time: Time,
    /// Fields that differ by more than the tolerance, depth first.
    pub divergences: Vec<FieldDivergence>,
}

impl DivergenceReport {
    /// True if the replay reached a different sim time.
    pub fn time_diverged(&self) -> bool {
        self.recorded_time != self.replayed_time
    }
}

/// The entity at `path`, where the first segment names `root` itself.
fn entity_at<'a>(root: &'a CompositeState, path: &StatePath) -> Option<&'a EntityState> {
    match path.segments().split_first() {
        Some((_, [])) => Some(root.entity()),
        Some((_, rest)) => {
            let relative = rest
                .iter()
                .fold(StatePath::root(), |p, segment| p.child(segment));
            root.get_path(&relative).map(|s| s.entity())
        }
        None => None,
    }
}

/// Compare a replayed snapshot against the recorded one.
///
/// Returns `Ok(None)` when every field matches within `tol` and the sim
/// times agree. Equal [`state_hash`]es short-circuit the field diff. A
/// replay whose entity tree differs from the recording's fails with
/// [`ReplayError::Diff`].
pub fn compare_state(
    recorded: &CompositeState,
    replayed: &CompositeState,
    tol: Tolerance,
) -> Result<Option<DivergenceReport>, ReplayError> {
    if state_hash(recorded) == state_hash(replayed) {
        return Ok(None);
    }

    let delta = diff_with(recorded, replayed, &DiffConfig { tolerance: tol })?;
    let divergences: Vec<_> = delta
        .changes()
        .into_iter()
        .map(|(path, change)| FieldDivergence {
            recorded: entity_at(recorded, &path).and_then(|e| e.payload().get(change.field)),
            replayed: change.value,
            field: change.field,
            path,
        })
        .collect();

    let report = DivergenceReport {
        recorded_time: recorded.sim_time(),
        replayed_time: replayed.sim_time(),
        divergences,
    };
    if report.divergences.is_empty() && !report.time_diverged() {
        return Ok(None);
    }
    Ok(Some(report))
}

/// Replay a recording through a caller-provided step function and compare
/// every snapshot.
///
/// `step_fn` receives the sim time of the next recorded snapshot, advances
/// the simulation to it, and returns the captured replayed snapshot.
/// Returns `Ok(None)` if the whole recording matches, or the report of the
/// first divergence.
pub fn replay_and_compare<R: Read>(
    reader: ReplayReader<R>,
    tol: Tolerance,
    step_fn: &mut dyn FnMut(Time) -> Result<CompositeState, ReplayError>,
) -> Result<Option<DivergenceReport>, ReplayError> {
    for recorded in reader.states() {
        let recorded = recorded?;
        let replayed = step_fn(recorded.sim_time())?;
        if let Some(report) = compare_state(&recorded, &replayed, tol)? {
            return Ok(Some(report));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::{ClockTriple, EntityKind};
    use strata_state::Payload;

    fn snapshot(sim: i64, angle: f64, wall: i64) -> CompositeState {
        let clock = ClockTriple::new(Time::new(wall, 0), Time::new(sim, 0), Time::new(sim, 0));
        let mut model = CompositeState::new("arm", clock, Payload::empty(EntityKind::Model)).unwrap();
        let joint = EntityState::new("elbow", clock, Payload::empty(EntityKind::Joint))
            .unwrap()
            .with_field(Field::Angle, Some(Value::Scalar(angle)))
            .unwrap();
        model.add_child(joint).unwrap();
        let mut world = CompositeState::new("default", clock, Payload::World).unwrap();
        world.add_child(model).unwrap();
        world
    }

    #[test]
    fn identical_runs_match() {
        let a = snapshot(1, 0.5, 100);
        let b = snapshot(1, 0.5, 200);
        assert!(compare_state(&a, &b, Tolerance::DEFAULT).unwrap().is_none());
    }

    #[test]
    fn noise_within_tolerance_matches() {
        let a = snapshot(1, 0.5, 100);
        let b = snapshot(1, 0.5 + 1e-8, 100);
        assert!(compare_state(&a, &b, Tolerance::DEFAULT).unwrap().is_none());
    }

    #[test]
    fn reports_path_and_values() {
        let a = snapshot(1, 0.5, 100);
        let b = snapshot(1, 0.7, 100);
        let report = compare_state(&a, &b, Tolerance::DEFAULT).unwrap().unwrap();
        assert!(!report.time_diverged());
        assert_eq!(report.divergences.len(), 1);
        let d = &report.divergences[0];
        assert_eq!(d.path.to_string(), "default/arm/elbow");
        assert_eq!(d.field, Field::Angle);
        assert_eq!(d.recorded, Some(Value::Scalar(0.5)));
        assert_eq!(d.replayed, Some(Value::Scalar(0.7)));
    }

    #[test]
    fn time_divergence_alone_is_reported() {
        let a = snapshot(1, 0.5, 100);
        let b = snapshot(2, 0.5, 100);
        let report = compare_state(&a, &b, Tolerance::DEFAULT).unwrap().unwrap();
        assert!(report.time_diverged());
        assert!(report.divergences.is_empty());
    }

    #[test]
    fn root_path_resolves_to_root() {
        let a = snapshot(1, 0.5, 100);
        let root = StatePath::from_name("default");
        assert_eq!(entity_at(&a, &root).map(|e| e.name()), Some("default"));
        let elbow = root.child("arm").child("elbow");
        assert_eq!(entity_at(&a, &elbow).map(|e| e.name()), Some("elbow"));
        assert!(entity_at(&a, &StatePath::root()).is_none());
    }
}
