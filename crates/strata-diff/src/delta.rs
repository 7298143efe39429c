//! Delta trees.

use strata_core::{ClockTriple, EntityKind, StatePath, Time};
use strata_state::{Field, Value};

/// One changed field. `value: None` means the field became unset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldChange {
    /// The field that changed.
    pub field: Field,
    /// Its new value.
    pub value: Option<Value>,
}

/// Changes to one entity and its descendants.
///
/// Children with no changes and no clock override are left out. A node
/// carries a clock only when its new clock differs from the delta's root
/// clock.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeDelta {
    /// Name of the entity.
    pub name: String,
    /// Kind of the entity.
    pub kind: EntityKind,
    /// Clock override for this node.
    pub clock: Option<ClockTriple>,
    /// Changed fields, in field order.
    pub changes: Vec<FieldChange>,
    /// Deltas of changed children, in the new state's child order.
    pub children: Vec<NodeDelta>,
}

impl NodeDelta {
    /// A node with no changes.
    pub fn new(name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            name: name.into(),
            kind,
            clock: None,
            changes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// True if no field changes anywhere in this subtree. Clock overrides
    /// do not count.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.children.iter().all(NodeDelta::is_empty)
    }

    /// True if applying the node would leave its subtree untouched apart
    /// from taking the root clock.
    pub(crate) fn is_noop(&self) -> bool {
        self.clock.is_none() && self.changes.is_empty() && self.children.is_empty()
    }

    /// Child delta by name.
    pub fn child(&self, name: &str) -> Option<&NodeDelta> {
        self.children.iter().find(|c| c.name == name)
    }

    fn collect(&self, path: &StatePath, out: &mut Vec<(StatePath, FieldChange)>) {
        out.extend(self.changes.iter().map(|c| (path.clone(), *c)));
        for child in &self.children {
            child.collect(&path.child(&child.name), out);
        }
    }
}

/// The difference between two snapshots of one entity tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Delta {
    /// Clock of the newer snapshot.
    pub clock: ClockTriple,
    /// Changes starting at the root entity.
    pub root: NodeDelta,
}

impl Delta {
    /// Sim time of the newer snapshot.
    pub fn sim_time(&self) -> Time {
        self.clock.sim_time()
    }

    /// True if no value changed. Clocks, at the root or overridden on a
    /// child, do not count as changes.
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Every field change with the path of its entity (starting at the
    /// root's name), depth first.
    pub fn changes(&self) -> Vec<(StatePath, FieldChange)> {
        let mut out = Vec::new();
        self.root
            .collect(&StatePath::from_name(self.root.name.as_str()), &mut out);
        out
    }

    /// Number of changed fields in the whole tree.
    pub fn change_count(&self) -> usize {
        fn count(node: &NodeDelta) -> usize {
            node.changes.len() + node.children.iter().map(count).sum::<usize>()
        }
        count(&self.root)
    }
}
