//! Fixed-point simulation time and the [`ClockTriple`].

use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::ParseValueError;

const NANOS_PER_SEC: i128 = 1_000_000_000;

/// A point or span of time with nanosecond resolution.
///
/// Stored as whole seconds plus a nanosecond remainder normalised into
/// `[0, 1e9)`, so the derived ordering is the numeric ordering. Negative
/// times are representable (`-0.5 s` is `sec = -1, nsec = 500_000_000`).
///
/// # Examples
///
/// ```
/// use strata_core::Time;
///
/// let t: Time = "1 500000000".parse().unwrap();
/// assert_eq!(t, Time::from_secs_f64(1.5));
/// assert_eq!(t.as_secs_f64(), 1.5);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Time {
    sec: i64,
    nsec: u32,
}

impl Time {
    /// The zero time.
    pub const ZERO: Time = Time { sec: 0, nsec: 0 };

    /// Build a time from seconds and a (possibly out-of-range) nanosecond part.
    pub fn new(sec: i64, nsec: i64) -> Self {
        Self::from_nanos(sec as i128 * NANOS_PER_SEC + nsec as i128)
    }

    /// Build a time from a total nanosecond count, saturating at the
    /// representable range.
    pub fn from_nanos(total: i128) -> Self {
        let sec = total.div_euclid(NANOS_PER_SEC);
        let nsec = total.rem_euclid(NANOS_PER_SEC) as u32;
        match i64::try_from(sec) {
            Ok(sec) => Self { sec, nsec },
            Err(_) if sec < 0 => Self { sec: i64::MIN, nsec: 0 },
            Err(_) => Self {
                sec: i64::MAX,
                nsec: (NANOS_PER_SEC - 1) as u32,
            },
        }
    }

    /// Build a time from floating-point seconds, rounded to the nearest
    /// nanosecond. Non-finite input saturates (NaN maps to zero).
    pub fn from_secs_f64(secs: f64) -> Self {
        Self::from_nanos((secs * 1e9).round() as i128)
    }

    /// Whole seconds component.
    pub fn sec(&self) -> i64 {
        self.sec
    }

    /// Nanosecond component, always in `[0, 1e9)`.
    pub fn nsec(&self) -> u32 {
        self.nsec
    }

    /// Total nanoseconds.
    pub fn as_nanos(&self) -> i128 {
        self.sec as i128 * NANOS_PER_SEC + self.nsec as i128
    }

    /// Floating-point seconds (lossy for very large values).
    pub fn as_secs_f64(&self) -> f64 {
        self.sec as f64 + self.nsec as f64 / 1e9
    }

    /// Current wall-clock time as an offset from the Unix epoch.
    ///
    /// A system clock set before the epoch reads as [`Time::ZERO`].
    pub fn wall_clock_now() -> Self {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(Time::from)
            .unwrap_or_default()
    }

    /// The `"sec nsec"` form used in state descriptors.
    pub fn to_descriptor_string(&self) -> String {
        format!("{} {}", self.sec, self.nsec)
    }
}

impl From<Duration> for Time {
    fn from(d: Duration) -> Self {
        Self::from_nanos(d.as_nanos() as i128)
    }
}

impl Add for Time {
    type Output = Time;

    fn add(self, rhs: Time) -> Time {
        Time::from_nanos(self.as_nanos() + rhs.as_nanos())
    }
}

impl Sub for Time {
    type Output = Time;

    fn sub(self, rhs: Time) -> Time {
        Time::from_nanos(self.as_nanos() - rhs.as_nanos())
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.9}s", self.as_secs_f64())
    }
}

/// Parses either `"sec nsec"` (two integers) or `"12.25"` (float seconds).
impl FromStr for Time {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseValueError::new("time", s);
        let mut parts = s.split_whitespace();
        let first = parts.next().ok_or_else(err)?;
        match (parts.next(), parts.next()) {
            (None, _) => {
                let secs: f64 = first.parse().map_err(|_| err())?;
                if !secs.is_finite() {
                    return Err(err());
                }
                Ok(Time::from_secs_f64(secs))
            }
            (Some(nsec), None) => {
                let sec: i64 = first.parse().map_err(|_| err())?;
                let nsec: i64 = nsec.parse().map_err(|_| err())?;
                Ok(Time::new(sec, nsec))
            }
            (Some(_), Some(_)) => Err(err()),
        }
    }
}

/// The three time references attached to every snapshot.
///
/// - `wall`: absolute calendar time the snapshot was recorded.
/// - `real`: elapsed wall-clock duration since simulation start; stops
///   growing while the simulation is paused.
/// - `sim`: elapsed simulated duration; may run faster or slower than
///   real time, or advance by manual single-stepping.
///
/// The three are independently non-decreasing within one timeline and
/// are not required to be proportional to one another.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ClockTriple {
    wall: Time,
    real: Time,
    sim: Time,
}

impl ClockTriple {
    /// Bundle three explicit times.
    pub fn new(wall: Time, real: Time, sim: Time) -> Self {
        Self { wall, real, sim }
    }

    /// Stamp `real` and `sim` with the current system wall time.
    pub fn now(real: Time, sim: Time) -> Self {
        Self::new(Time::wall_clock_now(), real, sim)
    }

    /// Absolute time the snapshot was recorded.
    pub fn wall_time(&self) -> Time {
        self.wall
    }

    /// Elapsed real time since simulation start.
    pub fn real_time(&self) -> Time {
        self.real
    }

    /// Elapsed simulated time.
    pub fn sim_time(&self) -> Time {
        self.sim
    }

    /// True if none of the three references moves backwards from `prev`.
    pub fn follows(&self, prev: &ClockTriple) -> bool {
        self.wall >= prev.wall && self.real >= prev.real && self.sim >= prev.sim
    }
}

impl fmt::Display for ClockTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sim={} real={} wall={}", self.sim, self.real, self.wall)
    }
}
