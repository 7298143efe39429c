//! Slash-separated location of a state within a composite tree.

use smallvec::SmallVec;
use std::fmt;

/// Path from the root of a composite state to one of its descendants.
///
/// Displays as `model1/joint2`. Most entity trees are shallow
/// (world → model → link/joint), so up to four segments are stored inline.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct StatePath(SmallVec<[String; 4]>);

impl StatePath {
    /// The empty path (the root itself).
    pub fn root() -> Self {
        Self(SmallVec::new())
    }

    /// A one-segment path.
    pub fn from_name(name: impl Into<String>) -> Self {
        let mut segments = SmallVec::new();
        segments.push(name.into());
        Self(segments)
    }

    /// Append a child segment.
    pub fn child(&self, name: &str) -> Self {
        let mut next = self.clone();
        next.0.push(name.to_string());
        next
    }

    /// Prepend a parent segment in place.
    pub fn prepend(&mut self, parent: &str) {
        self.0.insert(0, parent.to_string());
    }

    /// Path segments from the root down.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// True for the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for StatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "<root>");
        }
        write!(f, "{}", self.0.join("/"))
    }
}

impl From<&str> for StatePath {
    fn from(name: &str) -> Self {
        Self::from_name(name)
    }
}
