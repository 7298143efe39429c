//! Bounded, lazy views over a timeline for playback and scrubbing.

use std::iter::FusedIterator;
use std::sync::Arc;

use strata_state::CompositeState;

use crate::timeline::Shared;

/// The entries of a timeline within a sim-time range, resolved to a fixed
/// index range when the window was created.
///
/// A window is restartable: every [`iter`](Self::iter) starts a fresh
/// pass over the same entries. Long scans can be abandoned by dropping
/// the iterator and picked up later with [`resume`](Self::resume).
#[derive(Clone)]
pub struct Window {
    shared: Arc<Shared>,
    start: usize,
    end: usize,
}

impl Window {
    pub(crate) fn new(shared: Arc<Shared>, start: usize, end: usize) -> Self {
        Self { shared, start, end }
    }

    /// Number of entries in the window.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// True if no entry falls within the range.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// A fresh pass from the first entry.
    pub fn iter(&self) -> WindowIter {
        self.resume(0)
    }

    /// A pass starting `position` entries in, as reported by
    /// [`WindowIter::position`]. Positions past the end give an exhausted
    /// iterator.
    pub fn resume(&self, position: usize) -> WindowIter {
        WindowIter {
            shared: Arc::clone(&self.shared),
            start: self.start,
            next: self.start.saturating_add(position).min(self.end),
            end: self.end,
        }
    }
}

impl IntoIterator for &Window {
    type Item = Arc<CompositeState>;
    type IntoIter = WindowIter;

    fn into_iter(self) -> WindowIter {
        self.iter()
    }
}

impl IntoIterator for Window {
    type Item = Arc<CompositeState>;
    type IntoIter = WindowIter;

    fn into_iter(self) -> WindowIter {
        self.iter()
    }
}

/// Iterator over a [`Window`]. Each entry is handed out whole.
pub struct WindowIter {
    shared: Arc<Shared>,
    start: usize,
    next: usize,
    end: usize,
}

impl WindowIter {
    /// Entries already yielded; pass to [`Window::resume`] to continue.
    pub fn position(&self) -> usize {
        self.next - self.start
    }
}

impl Iterator for WindowIter {
    type Item = Arc<CompositeState>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let entry = self.shared.read().get(self.next).cloned();
        self.next += 1;
        entry
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.end - self.next;
        (n, Some(n))
    }
}

impl ExactSizeIterator for WindowIter {}

impl FusedIterator for WindowIter {}
