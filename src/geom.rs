// Copyright 2025 Lars Brubaker
// License: MIT
//
// Fixed-point geometry for the navigation mesh.
//
// Every coordinate is a `Real`: a signed Q47.16 number stored in an i64.
// Sums and differences are exact. Products and quotients pass through i128
// and are shifted back, so results are bit-identical on every target.
//
// The orientation and in-circle predicates never round: they work on raw
// values widened to i128 and only their sign is meaningful.

use core::fmt;
use core::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// Number of fractional bits in a `Real`.
pub const FRAC_BITS: u32 = 16;

const ONE_RAW: i64 = 1 << FRAC_BITS;

/// Widened intermediate used by the exact predicates (raw² units).
pub type Wide = i128;

/// Largest absolute coordinate the exact predicates accept.
///
/// `in_circle` multiplies fourth powers of raw coordinate differences; at
/// 2^13 units the sum of its three terms stays below 2^124.
pub const MAX_COORD: Real = Real::from_int(8192);

/// Deterministic fixed-point scalar.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Real(i64);

impl Real {
    pub const ZERO: Real = Real(0);
    pub const ONE: Real = Real(ONE_RAW);
    pub const HALF: Real = Real(ONE_RAW / 2);
    pub const MAX: Real = Real(i64::MAX);
    pub const MIN: Real = Real(i64::MIN);
    /// Smallest positive value.
    pub const EPSILON: Real = Real(1);

    #[inline]
    pub const fn from_raw(raw: i64) -> Self {
        Real(raw)
    }

    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn from_int(v: i32) -> Self {
        Real((v as i64) << FRAC_BITS)
    }

    /// Rounds to the nearest representable value, saturating at the range ends.
    /// Only meant for I/O boundaries; simulation code never goes through floats.
    pub fn from_f64(v: f64) -> Self {
        if v.is_nan() {
            return Real::ZERO;
        }
        let scaled = (v * ONE_RAW as f64).round();
        if scaled >= i64::MAX as f64 {
            Real::MAX
        } else if scaled <= i64::MIN as f64 {
            Real::MIN
        } else {
            Real(scaled as i64)
        }
    }

    #[inline]
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / ONE_RAW as f64
    }

    #[inline]
    pub fn abs(self) -> Self {
        Real(self.0.saturating_abs())
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Square root; negative inputs yield zero.
    pub fn sqrt(self) -> Self {
        if self.0 <= 0 {
            return Real::ZERO;
        }
        // sqrt(raw / 2^F) * 2^F == sqrt(raw * 2^F)
        let root = isqrt((self.0 as u128) << FRAC_BITS);
        Real(root as i64)
    }

    #[inline]
    fn saturate(v: i128) -> Self {
        if v > i64::MAX as i128 {
            Real::MAX
        } else if v < i64::MIN as i128 {
            Real::MIN
        } else {
            Real(v as i64)
        }
    }
}

/// Floor of the square root of `n`, computed bit by bit.
pub fn isqrt(n: u128) -> u128 {
    if n < 2 {
        return n;
    }
    let mut rem = n;
    let mut root: u128 = 0;
    let mut bit: u128 = 1 << ((127 - n.leading_zeros()) & !1);
    while bit != 0 {
        if rem >= root + bit {
            rem -= root + bit;
            root = (root >> 1) + bit;
        } else {
            root >>= 1;
        }
        bit >>= 2;
    }
    root
}

impl fmt::Debug for Real {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_f64())
    }
}

impl fmt::Display for Real {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_f64())
    }
}

impl From<f64> for Real {
    fn from(v: f64) -> Self {
        Real::from_f64(v)
    }
}

impl From<Real> for f64 {
    fn from(v: Real) -> Self {
        v.to_f64()
    }
}

impl From<i32> for Real {
    fn from(v: i32) -> Self {
        Real::from_int(v)
    }
}

impl Add for Real {
    type Output = Real;
    #[inline]
    fn add(self, rhs: Real) -> Real {
        Real(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Real {
    #[inline]
    fn add_assign(&mut self, rhs: Real) {
        *self = *self + rhs;
    }
}

impl Sub for Real {
    type Output = Real;
    #[inline]
    fn sub(self, rhs: Real) -> Real {
        Real(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Real {
    #[inline]
    fn sub_assign(&mut self, rhs: Real) {
        *self = *self - rhs;
    }
}

impl Neg for Real {
    type Output = Real;
    #[inline]
    fn neg(self) -> Real {
        Real(self.0.saturating_neg())
    }
}

impl Mul for Real {
    type Output = Real;
    #[inline]
    fn mul(self, rhs: Real) -> Real {
        Real::saturate((self.0 as i128 * rhs.0 as i128) >> FRAC_BITS)
    }
}

impl Div for Real {
    type Output = Real;
    /// Division by zero saturates toward the dividend's sign; 0 / 0 is 0.
    fn div(self, rhs: Real) -> Real {
        if rhs.0 == 0 {
            return match self.0.signum() {
                1 => Real::MAX,
                -1 => Real::MIN,
                _ => Real::ZERO,
            };
        }
        Real::saturate(((self.0 as i128) << FRAC_BITS) / rhs.0 as i128)
    }
}

// ───────────────────────────────── Vec2 ──────────────────────────────────────

/// A 2-D point or direction in fixed-point coordinates.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: Real,
    pub y: Real,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 {
        x: Real::ZERO,
        y: Real::ZERO,
    };

    #[inline]
    pub const fn new(x: Real, y: Real) -> Self {
        Vec2 { x, y }
    }

    #[inline]
    pub const fn from_ints(x: i32, y: i32) -> Self {
        Vec2 {
            x: Real::from_int(x),
            y: Real::from_int(y),
        }
    }

    pub fn from_f64(x: f64, y: f64) -> Self {
        Vec2 {
            x: Real::from_f64(x),
            y: Real::from_f64(y),
        }
    }

    #[inline]
    pub fn dot(self, o: Vec2) -> Real {
        self.x * o.x + self.y * o.y
    }

    /// z-component of the 3-D cross product.
    #[inline]
    pub fn cross(self, o: Vec2) -> Real {
        self.x * o.y - self.y * o.x
    }

    /// Counter-clockwise perpendicular.
    #[inline]
    pub fn perp(self) -> Vec2 {
        Vec2::new(-self.y, self.x)
    }

    #[inline]
    pub fn length_squared(self) -> Real {
        self.dot(self)
    }

    pub fn length(self) -> Real {
        Real::from_raw(isqrt(length_squared_wide(self) as u128) as i64)
    }

    /// Unit vector in the same direction; the zero vector stays zero.
    pub fn normalized(self) -> Vec2 {
        let len = self.length();
        if len == Real::ZERO {
            return Vec2::ZERO;
        }
        Vec2::new(self.x / len, self.y / len)
    }

    #[inline]
    pub fn distance(self, o: Vec2) -> Real {
        (o - self).length()
    }

    /// True when `o` is no further than `threshold` away. Evaluated exactly.
    pub fn within(self, o: Vec2, threshold: Real) -> bool {
        let t = threshold.raw() as Wide;
        dist_sq_wide(self, o) <= t * t
    }

    #[inline]
    pub fn lerp(self, o: Vec2, t: Real) -> Vec2 {
        self + (o - self) * t
    }

    #[inline]
    pub fn midpoint(self, o: Vec2) -> Vec2 {
        Vec2::new(
            Real::from_raw(self.x.raw() + (o.x.raw() - self.x.raw()) / 2),
            Real::from_raw(self.y.raw() + (o.y.raw() - self.y.raw()) / 2),
        )
    }

    /// True when both coordinates are inside the exact-predicate range.
    pub fn in_range(self) -> bool {
        self.x.abs() <= MAX_COORD && self.y.abs() <= MAX_COORD
    }
}

impl fmt::Debug for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    #[inline]
    fn add(self, o: Vec2) -> Vec2 {
        Vec2::new(self.x + o.x, self.y + o.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    #[inline]
    fn sub(self, o: Vec2) -> Vec2 {
        Vec2::new(self.x - o.x, self.y - o.y)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    #[inline]
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

impl Mul<Real> for Vec2 {
    type Output = Vec2;
    #[inline]
    fn mul(self, s: Real) -> Vec2 {
        Vec2::new(self.x * s, self.y * s)
    }
}

impl Div<Real> for Vec2 {
    type Output = Vec2;
    #[inline]
    fn div(self, s: Real) -> Vec2 {
        Vec2::new(self.x / s, self.y / s)
    }
}

/// A directed segment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Line {
    pub a: Vec2,
    pub b: Vec2,
}

impl Line {
    #[inline]
    pub const fn new(a: Vec2, b: Vec2) -> Self {
        Line { a, b }
    }
}

// ──────────────────────────── Exact predicates ───────────────────────────────

#[inline]
fn wide(v: Real) -> Wide {
    v.raw() as Wide
}

/// Squared length in raw² units, exact.
#[inline]
pub fn length_squared_wide(v: Vec2) -> Wide {
    wide(v.x) * wide(v.x) + wide(v.y) * wide(v.y)
}

/// Squared distance in raw² units, exact.
#[inline]
pub fn dist_sq_wide(a: Vec2, b: Vec2) -> Wide {
    let dx = wide(b.x) - wide(a.x);
    let dy = wide(b.y) - wide(a.y);
    dx * dx + dy * dy
}

/// Dot product of (b - a) and (c - a) in raw² units.
#[inline]
pub fn dot_wide(a: Vec2, b: Vec2, c: Vec2) -> Wide {
    (wide(b.x) - wide(a.x)) * (wide(c.x) - wide(a.x))
        + (wide(b.y) - wide(a.y)) * (wide(c.y) - wide(a.y))
}

/// Twice the signed area of (a, b, c); positive when counter-clockwise.
#[inline]
pub fn orient2d(a: Vec2, b: Vec2, c: Vec2) -> Wide {
    (wide(b.x) - wide(a.x)) * (wide(c.y) - wide(a.y))
        - (wide(b.y) - wide(a.y)) * (wide(c.x) - wide(a.x))
}

/// Returns true if (a, b, c) are in CCW order or collinear.
#[inline]
pub fn vert_ccw(a: Vec2, b: Vec2, c: Vec2) -> bool {
    orient2d(a, b, c) >= 0
}

/// In-circle determinant. For a CCW triangle (a, b, c) the result is positive
/// when `d` lies strictly inside its circumcircle, zero when co-circular.
pub fn in_circle(a: Vec2, b: Vec2, c: Vec2, d: Vec2) -> Wide {
    let adx = wide(a.x) - wide(d.x);
    let ady = wide(a.y) - wide(d.y);
    let bdx = wide(b.x) - wide(d.x);
    let bdy = wide(b.y) - wide(d.y);
    let cdx = wide(c.x) - wide(d.x);
    let cdy = wide(c.y) - wide(d.y);

    let ab_det = adx * bdy - bdx * ady;
    let bc_det = bdx * cdy - cdx * bdy;
    let ca_det = cdx * ady - adx * cdy;

    let a_lift = adx * adx + ady * ady;
    let b_lift = bdx * bdx + bdy * bdy;
    let c_lift = cdx * cdx + cdy * cdy;

    a_lift * bc_det + b_lift * ca_det + c_lift * ab_det
}

/// True when segments (a, b) and (c, d) cross at a single interior point.
pub fn segments_cross(a: Vec2, b: Vec2, c: Vec2, d: Vec2) -> bool {
    let o1 = orient2d(a, b, c).signum();
    let o2 = orient2d(a, b, d).signum();
    let o3 = orient2d(c, d, a).signum();
    let o4 = orient2d(c, d, b).signum();
    o1 * o2 < 0 && o3 * o4 < 0
}

/// Intersection of the line through (a, b) with the segment (c, d).
/// The caller guarantees the two are not parallel.
pub fn line_intersection(a: Vec2, b: Vec2, c: Vec2, d: Vec2) -> Vec2 {
    let oc = orient2d(a, b, c);
    let od = orient2d(a, b, d);
    let denom = oc - od;
    if denom == 0 {
        return c.midpoint(d);
    }
    let interp = |p: Real, q: Real| -> Real {
        let num = (wide(q) - wide(p)) * oc;
        Real::from_raw((wide(p) + num / denom) as i64)
    };
    Vec2::new(interp(c.x, d.x), interp(c.y, d.y))
}

/// Projects `p` onto the segment (a, b), clamped to its ends.
pub fn project_onto_segment(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let len_sq = dist_sq_wide(a, b);
    if len_sq == 0 {
        return a;
    }
    let t = dot_wide(a, b, p);
    if t <= 0 {
        return a;
    }
    if t >= len_sq {
        return b;
    }
    let interp = |s: Real, e: Real| -> Real {
        Real::from_raw((wide(s) + (wide(e) - wide(s)) * t / len_sq) as i64)
    };
    Vec2::new(interp(a.x, b.x), interp(a.y, b.y))
}

/// Exact distance from `p` to the segment (a, b), rounded down.
pub fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> Real {
    let len_sq = dist_sq_wide(a, b);
    if len_sq == 0 {
        return p.distance(a);
    }
    let t = dot_wide(a, b, p);
    if t <= 0 {
        return p.distance(a);
    }
    if t >= len_sq {
        return p.distance(b);
    }
    // |orient| / |ab| is the perpendicular distance
    let o = orient2d(a, b, p).abs();
    let d_sq = o * o / len_sq;
    Real::from_raw(isqrt(d_sq as u128) as i64)
}
