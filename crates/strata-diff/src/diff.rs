//! Computing and applying deltas.

use strata_core::{ApproxEq, ClockTriple, StatePath, Tolerance};
use strata_state::{CompositeState, EntityState, State};

use crate::delta::{Delta, FieldChange, NodeDelta};
use crate::error::DiffError;

/// Differ settings.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DiffConfig {
    /// Field values closer than this are treated as unchanged.
    pub tolerance: Tolerance,
}

impl DiffConfig {
    /// Check that the tolerance is usable.
    pub fn validate(&self) -> Result<(), DiffError> {
        let value = self.tolerance.0;
        if value.is_finite() && value >= 0.0 {
            Ok(())
        } else {
            Err(DiffError::InvalidTolerance { value })
        }
    }
}

/// Diff two snapshots with the default tolerance.
///
/// # Examples
///
/// ```
/// use strata_core::{ClockTriple, EntityKind, Time};
/// use strata_diff::{apply_delta, diff};
/// use strata_state::{CompositeState, EntityState, Field, Payload, Value};
///
/// let clock = |sim: f64| {
///     let t = Time::from_secs_f64(sim);
///     ClockTriple::new(t, t, t)
/// };
/// let snapshot = |sim: f64, angle: f64| {
///     let mut model = CompositeState::new("arm", clock(sim), Payload::empty(EntityKind::Model)).unwrap();
///     let joint = EntityState::new("elbow", clock(sim), Payload::empty(EntityKind::Joint))
///         .unwrap()
///         .with_field(Field::Angle, Some(Value::Scalar(angle)))
///         .unwrap();
///     model.add_child(joint).unwrap();
///     model
/// };
///
/// let (a, b) = (snapshot(0.0, 0.0), snapshot(0.01, 0.2));
/// let delta = diff(&a, &b).unwrap();
/// assert_eq!(delta.change_count(), 1);
/// assert_eq!(apply_delta(&a, &delta).unwrap(), b);
/// ```
pub fn diff(old: &CompositeState, new: &CompositeState) -> Result<Delta, DiffError> {
    diff_with(old, new, &DiffConfig::default())
}

/// Diff two snapshots of the same entity tree.
///
/// Both trees must have the same names, kinds, and child sets at every
/// depth; child order is not significant.
pub fn diff_with(
    old: &CompositeState,
    new: &CompositeState,
    config: &DiffConfig,
) -> Result<Delta, DiffError> {
    config.validate()?;
    let differ = Differ {
        clock: new.clock(),
        tolerance: config.tolerance,
    };
    let root = differ.composite(old, new, &StatePath::from_name(new.name()))?;
    Ok(Delta {
        clock: differ.clock,
        root,
    })
}

/// Rebuild the newer snapshot from `base` and a delta computed against it.
///
/// Every node takes the delta's root clock unless the delta overrides it.
pub fn apply_delta(base: &CompositeState, delta: &Delta) -> Result<CompositeState, DiffError> {
    let patcher = Patcher { clock: delta.clock };
    patcher.composite(base, &delta.root, &StatePath::from_name(base.name()))
}

struct Differ {
    clock: ClockTriple,
    tolerance: Tolerance,
}

impl Differ {
    fn entity(
        &self,
        old: &EntityState,
        new: &EntityState,
        path: &StatePath,
    ) -> Result<NodeDelta, DiffError> {
        if old.name() != new.name() {
            return Err(DiffError::mismatch(
                path,
                format!("names differ: '{}' vs '{}'", old.name(), new.name()),
            ));
        }
        if old.kind() != new.kind() {
            return Err(DiffError::mismatch(
                path,
                format!("kinds differ: {} vs {}", old.kind(), new.kind()),
            ));
        }
        let mut node = NodeDelta::new(new.name(), new.kind());
        if new.clock() != self.clock {
            node.clock = Some(new.clock());
        }
        node.changes = new
            .payload()
            .fields()
            .filter(|(field, value)| !old.payload().get(*field).approx_eq(value, self.tolerance))
            .map(|(field, value)| FieldChange { field, value })
            .collect();
        Ok(node)
    }

    fn composite(
        &self,
        old: &CompositeState,
        new: &CompositeState,
        path: &StatePath,
    ) -> Result<NodeDelta, DiffError> {
        let mut node = self.entity(old.entity(), new.entity(), path)?;
        if old.len() != new.len() {
            return Err(DiffError::mismatch(
                path,
                format!("child counts differ: {} vs {}", old.len(), new.len()),
            ));
        }
        for (name, new_child) in new.children() {
            let child_path = path.child(name);
            let old_child = old
                .get_child(name)
                .ok_or_else(|| DiffError::mismatch(&child_path, "absent from the older state"))?;
            let child = self.state(old_child, new_child, &child_path)?;
            if !child.is_noop() {
                node.children.push(child);
            }
        }
        Ok(node)
    }

    fn state(&self, old: &State, new: &State, path: &StatePath) -> Result<NodeDelta, DiffError> {
        match (old, new) {
            (State::Entity(a), State::Entity(b)) => self.entity(a, b, path),
            (State::Composite(a), State::Composite(b)) => self.composite(a, b, path),
            _ => Err(DiffError::mismatch(path, "leaf and composite states")),
        }
    }
}

struct Patcher {
    clock: ClockTriple,
}

impl Patcher {
    fn entity(
        &self,
        base: &EntityState,
        node: &NodeDelta,
        path: &StatePath,
    ) -> Result<EntityState, DiffError> {
        if base.name() != node.name || base.kind() != node.kind {
            return Err(DiffError::mismatch(
                path,
                format!(
                    "delta for {} '{}' applied to {} '{}'",
                    node.kind,
                    node.name,
                    base.kind(),
                    base.name()
                ),
            ));
        }
        let mut state = base.clone().with_clock(node.clock.unwrap_or(self.clock));
        for change in &node.changes {
            state = state
                .with_field(change.field, change.value)
                .map_err(|e| DiffError::mismatch(path, e.to_string()))?;
        }
        Ok(state)
    }

    fn composite(
        &self,
        base: &CompositeState,
        node: &NodeDelta,
        path: &StatePath,
    ) -> Result<CompositeState, DiffError> {
        let entity = self.entity(base.entity(), node, path)?;
        if let Some(stray) = node.children.iter().find(|c| base.get_child(&c.name).is_none()) {
            return Err(DiffError::mismatch(
                &path.child(&stray.name),
                "delta names a child the base does not have",
            ));
        }

        let mut out = CompositeState::from_entity(entity)?;
        for (name, child) in base.children() {
            let patched = match node.child(name) {
                Some(child_delta) => self.state(child, child_delta, &path.child(name))?,
                None => child.clone().restamped(self.clock),
            };
            out.add_child(patched)?;
        }
        Ok(out)
    }

    fn state(&self, base: &State, node: &NodeDelta, path: &StatePath) -> Result<State, DiffError> {
        match base {
            State::Entity(e) => self.entity(e, node, path).map(State::from),
            State::Composite(c) => self.composite(c, node, path).map(State::from),
        }
    }
}
