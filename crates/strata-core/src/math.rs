//! Value types for engine-exposed quantities and tolerant comparison.
//!
//! These are plain `Copy` values. The descriptor text forms match the
//! scenario file conventions: a vector is `"x y z"`, a pose is
//! `"x y z roll pitch yaw"`.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseValueError;

/// Absolute tolerance used for all approximate comparisons.
///
/// Recorded and replayed values can pass through text or Euler-angle
/// conversions, so snapshot equality is never exact floating-point
/// equality.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Tolerance(pub f64);

impl Tolerance {
    /// The tolerance used when none is configured.
    pub const DEFAULT: Tolerance = Tolerance(1e-6);

    /// Compare two scalars. NaN equals NaN and equal infinities match,
    /// so a state always compares equal to itself.
    pub fn matches(self, a: f64, b: f64) -> bool {
        if a.is_nan() || b.is_nan() {
            return a.is_nan() && b.is_nan();
        }
        a == b || (a - b).abs() <= self.0
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Equality within a [`Tolerance`].
pub trait ApproxEq {
    /// True if `self` and `other` match within `tol`.
    fn approx_eq(&self, other: &Self, tol: Tolerance) -> bool;
}

impl ApproxEq for f64 {
    fn approx_eq(&self, other: &Self, tol: Tolerance) -> bool {
        tol.matches(*self, *other)
    }
}

impl<T: ApproxEq> ApproxEq for Option<T> {
    fn approx_eq(&self, other: &Self, tol: Tolerance) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.approx_eq(b, tol),
            (None, None) => true,
            _ => false,
        }
    }
}

fn parse_floats<const N: usize>(s: &str, expected: &'static str) -> Result<[f64; N], ParseValueError> {
    let mut out = [0.0; N];
    let mut parts = s.split_whitespace();
    for slot in out.iter_mut() {
        *slot = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(|| ParseValueError::new(expected, s))?;
    }
    if parts.next().is_some() {
        return Err(ParseValueError::new(expected, s));
    }
    Ok(out)
}

/// A 3-component vector (positions, velocities, joint axes).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vector3 {
    /// The zero vector.
    pub const ZERO: Vector3 = Vector3::new(0.0, 0.0, 0.0);
    /// Unit Y, the default hinge axis.
    pub const UNIT_Y: Vector3 = Vector3::new(0.0, 1.0, 0.0);

    /// Build a vector from components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl ApproxEq for Vector3 {
    fn approx_eq(&self, other: &Self, tol: Tolerance) -> bool {
        tol.matches(self.x, other.x) && tol.matches(self.y, other.y) && tol.matches(self.z, other.z)
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.x, self.y, self.z)
    }
}

impl FromStr for Vector3 {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [x, y, z] = parse_floats::<3>(s, "vector3")?;
        Ok(Self::new(x, y, z))
    }
}

/// Below this `|cos(pitch)|`, roll and yaw are taken as one rotation.
const GIMBAL_EPSILON: f64 = 1e-8;

fn wrap_angle(a: f64) -> f64 {
    if a > std::f64::consts::PI {
        a - std::f64::consts::TAU
    } else if a < -std::f64::consts::PI {
        a + std::f64::consts::TAU
    } else {
        a
    }
}

/// A rotation quaternion `(w, x, y, z)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quaternion {
    /// Scalar part.
    pub w: f64,
    /// X of the vector part.
    pub x: f64,
    /// Y of the vector part.
    pub y: f64,
    /// Z of the vector part.
    pub z: f64,
}

impl Quaternion {
    /// The identity rotation.
    pub const IDENTITY: Quaternion = Quaternion {
        w: 1.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Build from raw components (not normalised).
    pub const fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    /// Build from roll/pitch/yaw in radians (fixed-axis X, Y, Z).
    pub fn from_euler(roll: f64, pitch: f64, yaw: f64) -> Self {
        let (sr, cr) = (roll * 0.5).sin_cos();
        let (sp, cp) = (pitch * 0.5).sin_cos();
        let (sy, cy) = (yaw * 0.5).sin_cos();
        Self {
            w: cr * cp * cy + sr * sp * sy,
            x: sr * cp * cy - cr * sp * sy,
            y: cr * sp * cy + sr * cp * sy,
            z: cr * cp * sy - sr * sp * cy,
        }
    }

    /// Roll/pitch/yaw in radians, each in `[-pi, pi]`.
    ///
    /// At the gimbal-lock poles (pitch of `±pi/2`) only `yaw - roll` (north)
    /// or `yaw + roll` (south) is defined; roll is reported as zero and the
    /// whole rotation about the vertical goes into yaw.
    pub fn to_euler(&self) -> (f64, f64, f64) {
        let q = self.normalized();
        let sin_pitch = 2.0 * (q.w * q.y - q.z * q.x);
        let r00 = 1.0 - 2.0 * (q.y * q.y + q.z * q.z);
        let r10 = 2.0 * (q.x * q.y + q.w * q.z);
        let cos_pitch = r00.hypot(r10);
        let pitch = sin_pitch.atan2(cos_pitch);

        if cos_pitch < GIMBAL_EPSILON {
            let yaw = if sin_pitch > 0.0 {
                2.0 * (q.z - q.x).atan2(q.w + q.y)
            } else {
                2.0 * (q.z + q.x).atan2(q.w - q.y)
            };
            return (0.0, pitch, wrap_angle(yaw));
        }

        let roll = (2.0 * (q.w * q.x + q.y * q.z)).atan2(1.0 - 2.0 * (q.x * q.x + q.y * q.y));
        let yaw = r10.atan2(r00);
        (roll, pitch, yaw)
    }

    /// Unit-length copy. A zero quaternion normalises to the identity.
    pub fn normalized(&self) -> Self {
        let n = (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt();
        if n == 0.0 || !n.is_finite() {
            return Self::IDENTITY;
        }
        Self::new(self.w / n, self.x / n, self.y / n, self.z / n)
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Compares rotations: both sides are normalised first, and `q` and `-q`
/// compare equal.
impl ApproxEq for Quaternion {
    fn approx_eq(&self, other: &Self, tol: Tolerance) -> bool {
        let (a, b) = (self.normalized(), other.normalized());
        let same = tol.matches(a.w, b.w)
            && tol.matches(a.x, b.x)
            && tol.matches(a.y, b.y)
            && tol.matches(a.z, b.z);
        same || (tol.matches(a.w, -b.w)
            && tol.matches(a.x, -b.x)
            && tol.matches(a.y, -b.y)
            && tol.matches(a.z, -b.z))
    }
}

/// A rigid-body placement: position plus orientation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pose {
    /// Translation.
    pub position: Vector3,
    /// Orientation.
    pub rotation: Quaternion,
}

impl Pose {
    /// Build from a position and a rotation.
    pub fn new(position: Vector3, rotation: Quaternion) -> Self {
        Self { position, rotation }
    }

    /// Build from `x y z roll pitch yaw`.
    pub fn from_xyz_rpy(x: f64, y: f64, z: f64, roll: f64, pitch: f64, yaw: f64) -> Self {
        Self::new(Vector3::new(x, y, z), Quaternion::from_euler(roll, pitch, yaw))
    }
}

impl ApproxEq for Pose {
    fn approx_eq(&self, other: &Self, tol: Tolerance) -> bool {
        self.position.approx_eq(&other.position, tol) && self.rotation.approx_eq(&other.rotation, tol)
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (roll, pitch, yaw) = self.rotation.to_euler();
        write!(f, "{} {roll} {pitch} {yaw}", self.position)
    }
}

impl FromStr for Pose {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [x, y, z, roll, pitch, yaw] = parse_floats::<6>(s, "pose")?;
        Ok(Self::from_xyz_rpy(x, y, z, roll, pitch, yaw))
    }
}

/// Lower and upper travel stops of a single-axis joint, in radians.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StopLimits {
    /// Lower stop.
    pub low: f64,
    /// Upper stop.
    pub high: f64,
}

impl StopLimits {
    /// Build a stop pair.
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// True if `angle` lies within the stops (inclusive).
    pub fn contains(&self, angle: f64) -> bool {
        angle >= self.low && angle <= self.high
    }
}

/// Effectively unlimited travel: `∓f32::MAX`.
impl Default for StopLimits {
    fn default() -> Self {
        Self::new(-(f32::MAX as f64), f32::MAX as f64)
    }
}

impl ApproxEq for StopLimits {
    fn approx_eq(&self, other: &Self, tol: Tolerance) -> bool {
        tol.matches(self.low, other.low) && tol.matches(self.high, other.high)
    }
}
