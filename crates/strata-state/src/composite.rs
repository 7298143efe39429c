//! Composite states: an entity state plus its children's states.

use indexmap::map::Iter;
use indexmap::IndexMap;
use strata_core::{ClockTriple, EntityKind, StateError, StatePath, Time, Tolerance};

use crate::payload::Payload;
use crate::state::{EntityState, State};

/// A world or model state owning its children's states.
///
/// Children are keyed by name and kept in insertion order, which is the
/// engine's order for captures and document order for loads. Children
/// may themselves be composites, to any depth.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositeState {
    state: EntityState,
    children: IndexMap<String, State>,
}

impl CompositeState {
    /// Build an empty composite.
    ///
    /// Only world and model payloads may own children; other kinds fail
    /// with [`StateError::WrongKind`].
    pub fn new(
        name: impl Into<String>,
        clock: ClockTriple,
        payload: Payload,
    ) -> Result<Self, StateError> {
        Self::from_entity(EntityState::new(name, clock, payload)?)
    }

    /// Wrap an existing entity state as a childless composite.
    pub fn from_entity(state: EntityState) -> Result<Self, StateError> {
        if !state.kind().is_composite() {
            return Err(StateError::WrongKind {
                path: StatePath::from_name(state.name()),
                expected: EntityKind::Model,
                found: state.kind(),
            });
        }
        Ok(Self {
            state,
            children: IndexMap::new(),
        })
    }

    /// Add a child under its own name.
    ///
    /// Fails with [`StateError::DuplicateChildName`] if the name is taken;
    /// the existing child is kept.
    pub fn add_child(&mut self, child: impl Into<State>) -> Result<(), StateError> {
        let child = child.into();
        if self.children.contains_key(child.name()) {
            return Err(StateError::DuplicateChildName {
                path: StatePath::from_name(self.name()),
                name: child.name().to_string(),
            });
        }
        self.children.insert(child.name().to_string(), child);
        Ok(())
    }

    /// Child by name. Absence is normal: the entity may not have existed
    /// when this snapshot was taken.
    pub fn get_child(&self, name: &str) -> Option<&State> {
        self.children.get(name)
    }

    /// Descendant by path relative to this composite.
    pub fn get_path(&self, path: &StatePath) -> Option<&State> {
        let (first, rest) = path.segments().split_first()?;
        let mut node = self.children.get(first)?;
        for segment in rest {
            node = node.as_composite()?.children.get(segment)?;
        }
        Some(node)
    }

    /// Children in insertion order. Each call starts a fresh pass.
    pub fn children(&self) -> Children<'_> {
        Children {
            inner: self.children.iter(),
        }
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// True if there are no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// The entity-level part (name, clock, payload).
    pub fn entity(&self) -> &EntityState {
        &self.state
    }

    /// Name of the source entity.
    pub fn name(&self) -> &str {
        self.state.name()
    }

    /// All three time references.
    pub fn clock(&self) -> ClockTriple {
        self.state.clock()
    }

    /// Absolute time the snapshot was recorded.
    pub fn wall_time(&self) -> Time {
        self.state.wall_time()
    }

    /// Elapsed real time since simulation start.
    pub fn real_time(&self) -> Time {
        self.state.real_time()
    }

    /// Elapsed simulated time.
    pub fn sim_time(&self) -> Time {
        self.state.sim_time()
    }

    /// Kind of the source entity.
    pub fn kind(&self) -> EntityKind {
        self.state.kind()
    }

    /// Copy with this node and every descendant stamped with `clock`.
    pub fn restamped(self, clock: ClockTriple) -> Self {
        Self {
            state: self.state.with_clock(clock),
            children: self
                .children
                .into_iter()
                .map(|(name, child)| (name, child.restamped(clock)))
                .collect(),
        }
    }

    /// Total number of states in this subtree, including this one.
    pub fn count(&self) -> usize {
        1 + self
            .children
            .values()
            .map(|c| match c {
                State::Entity(_) => 1,
                State::Composite(c) => c.count(),
            })
            .sum::<usize>()
    }

    /// Recursive tolerant equality. Child order is not significant; names,
    /// shape, and payloads are.
    pub fn approx_eq(&self, other: &CompositeState, tol: Tolerance) -> bool {
        self.state.approx_eq(&other.state, tol)
            && self.children.len() == other.children.len()
            && self.children.iter().all(|(name, child)| {
                other
                    .children
                    .get(name)
                    .is_some_and(|o| child.approx_eq(o, tol))
            })
    }
}

/// Lazy, finite iterator over a composite's children in insertion order.
///
/// Iterating never mutates the composite; call
/// [`CompositeState::children`] again for a fresh pass.
#[derive(Clone)]
pub struct Children<'a> {
    inner: Iter<'a, String, State>,
}

impl<'a> Iterator for Children<'a> {
    type Item = (&'a str, &'a State);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k.as_str(), v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Children<'_> {}
