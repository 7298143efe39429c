//! Single-writer, multi-reader snapshot history.
//!
//! Storage is an append-only `Vec<Arc<CompositeState>>` behind an
//! `RwLock`. The writer holds the lock only long enough to push one
//! `Arc`; readers hold it only long enough to binary-search or clone one
//! `Arc`. Entries are never mutated, removed, or reordered.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use log::{debug, warn};
use strata_core::Time;
use strata_state::CompositeState;

use crate::config::{ConfigError, TimelineConfig};
use crate::error::TimelineError;
use crate::window::Window;

type Entries = Vec<Arc<CompositeState>>;

#[derive(Debug)]
pub(crate) struct Shared {
    entries: RwLock<Entries>,
    sealed: AtomicBool,
}

impl Shared {
    // Entries are immutable once pushed, so a writer that panicked
    // mid-append cannot have left a half-written entry behind.
    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Entries> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }
}

// Compile-time assertion: readers must be shareable across threads.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<TimelineReader>();
    assert::<Timeline>();
};

/// Recording side of a timeline. Exactly one exists per run; it owns
/// [`append`](Self::append) and [`seal`](Self::seal).
///
/// # Examples
///
/// ```
/// use strata_core::{ClockTriple, Time};
/// use strata_state::{CompositeState, Payload};
/// use strata_timeline::Timeline;
///
/// let at = |sim: f64| {
///     let t = Time::from_secs_f64(sim);
///     CompositeState::new("default", ClockTriple::new(t, t, t), Payload::World).unwrap()
/// };
///
/// let mut timeline = Timeline::new();
/// for sim in [0.0, 1.0, 2.0] {
///     timeline.append(at(sim)).unwrap();
/// }
/// assert!(timeline.append(at(1.5)).is_err());
///
/// let nearest = timeline.nearest(Time::from_secs_f64(1.4)).unwrap();
/// assert_eq!(nearest.sim_time(), Time::from_secs_f64(1.0));
/// assert_eq!(timeline.window(Time::from_secs_f64(0.5), Time::from_secs_f64(2.0)).len(), 2);
/// ```
#[derive(Debug)]
pub struct Timeline {
    reader: TimelineReader,
}

impl Timeline {
    /// An empty timeline with the default configuration.
    pub fn new() -> Self {
        Self::with_capacity(TimelineConfig::default().initial_capacity)
    }

    /// An empty timeline sized per `config`.
    pub fn with_config(config: &TimelineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_capacity(config.initial_capacity))
    }

    fn with_capacity(capacity: usize) -> Self {
        Self {
            reader: TimelineReader {
                shared: Arc::new(Shared {
                    entries: RwLock::new(Vec::with_capacity(capacity)),
                    sealed: AtomicBool::new(false),
                }),
            },
        }
    }

    /// Append a snapshot and return its index.
    ///
    /// Fails with [`TimelineError::NonMonotonicTime`] if the state's sim
    /// time is earlier than the last entry's (equal is accepted and lands
    /// after it), or [`TimelineError::TimelineSealed`]. A failed append
    /// leaves the timeline unchanged.
    pub fn append(&mut self, state: CompositeState) -> Result<usize, TimelineError> {
        let shared = &self.reader.shared;
        let mut entries = shared
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if shared.sealed.load(Ordering::Acquire) {
            warn!("append to sealed timeline at sim time {}", state.sim_time());
            return Err(TimelineError::TimelineSealed);
        }
        if let Some(last) = entries.last() {
            if state.sim_time() < last.sim_time() {
                warn!(
                    "rejected snapshot at sim time {}: last entry is at {}",
                    state.sim_time(),
                    last.sim_time()
                );
                return Err(TimelineError::NonMonotonicTime {
                    last: last.sim_time(),
                    attempted: state.sim_time(),
                });
            }
        }
        entries.push(Arc::new(state));
        Ok(entries.len() - 1)
    }

    /// Make the timeline read-only. Idempotent.
    pub fn seal(&mut self) {
        let shared = &self.reader.shared;
        let entries = shared
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if !shared.sealed.swap(true, Ordering::AcqRel) {
            debug!("timeline sealed with {} entries", entries.len());
        }
    }

    /// A read handle sharing this timeline's storage.
    pub fn reader(&self) -> TimelineReader {
        self.reader.clone()
    }

    /// Seal and give up write access.
    pub fn into_reader(mut self) -> TimelineReader {
        self.seal();
        self.reader
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.reader.len()
    }

    /// True if nothing has been appended.
    pub fn is_empty(&self) -> bool {
        self.reader.is_empty()
    }

    /// True once [`seal`](Self::seal) has been called.
    pub fn is_sealed(&self) -> bool {
        self.reader.is_sealed()
    }

    /// Entry by append index.
    pub fn get(&self, index: usize) -> Option<Arc<CompositeState>> {
        self.reader.get(index)
    }

    /// Earliest entry.
    pub fn first(&self) -> Option<Arc<CompositeState>> {
        self.reader.first()
    }

    /// Latest entry.
    pub fn last(&self) -> Option<Arc<CompositeState>> {
        self.reader.last()
    }

    /// See [`TimelineReader::nearest`].
    pub fn nearest(&self, sim_time: Time) -> Option<Arc<CompositeState>> {
        self.reader.nearest(sim_time)
    }

    /// See [`TimelineReader::window`].
    pub fn window(&self, start: Time, end: Time) -> Window {
        self.reader.window(start, end)
    }

    /// See [`TimelineReader::time_span`].
    pub fn time_span(&self) -> Option<(Time, Time)> {
        self.reader.time_span()
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only handle on a timeline. Cheap to clone and safe to use from
/// other threads while the writer keeps appending.
#[derive(Clone, Debug)]
pub struct TimelineReader {
    shared: Arc<Shared>,
}

impl TimelineReader {
    /// Number of entries appended so far.
    pub fn len(&self) -> usize {
        self.shared.read().len()
    }

    /// True if nothing has been appended.
    pub fn is_empty(&self) -> bool {
        self.shared.read().is_empty()
    }

    /// True once the writer has sealed the timeline.
    pub fn is_sealed(&self) -> bool {
        self.shared.sealed.load(Ordering::Acquire)
    }

    /// Entry by append index.
    pub fn get(&self, index: usize) -> Option<Arc<CompositeState>> {
        self.shared.read().get(index).cloned()
    }

    /// Earliest entry.
    pub fn first(&self) -> Option<Arc<CompositeState>> {
        self.shared.read().first().cloned()
    }

    /// Latest entry.
    pub fn last(&self) -> Option<Arc<CompositeState>> {
        self.shared.read().last().cloned()
    }

    /// Sim times of the first and last entries.
    pub fn time_span(&self) -> Option<(Time, Time)> {
        let entries = self.shared.read();
        Some((entries.first()?.sim_time(), entries.last()?.sim_time()))
    }

    /// The entry whose sim time is closest to `sim_time`.
    ///
    /// Requests before the first or after the last entry clamp to that
    /// entry. An exact tie between two neighbours picks the earlier one;
    /// among entries sharing a sim time, the last appended wins. `None`
    /// only when the timeline is empty.
    pub fn nearest(&self, sim_time: Time) -> Option<Arc<CompositeState>> {
        let entries = self.shared.read();
        nearest_index(&entries, sim_time).map(|i| Arc::clone(&entries[i]))
    }

    /// Lazy sequence of the entries with sim time in `[start, end]`.
    ///
    /// Bounds are resolved now; entries appended later are not visited.
    /// `start > end` gives an empty window.
    pub fn window(&self, start: Time, end: Time) -> Window {
        let entries = self.shared.read();
        let (lo, hi) = if start > end {
            (0, 0)
        } else {
            (
                entries.partition_point(|e| e.sim_time() < start),
                entries.partition_point(|e| e.sim_time() <= end),
            )
        };
        Window::new(Arc::clone(&self.shared), lo, hi)
    }
}

fn nearest_index(entries: &[Arc<CompositeState>], t: Time) -> Option<usize> {
    if entries.is_empty() {
        return None;
    }
    // Number of entries at or before `t`; the one before it is the last
    // appended among equal times.
    let after = entries.partition_point(|e| e.sim_time() <= t);
    if after == 0 {
        return Some(0);
    }
    let below = after - 1;
    if after == entries.len() {
        return Some(below);
    }
    let above_time = entries[after].sim_time();
    let above = entries.partition_point(|e| e.sim_time() <= above_time) - 1;
    if t - entries[below].sim_time() <= above_time - t {
        Some(below)
    } else {
        Some(above)
    }
}
