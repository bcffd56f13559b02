//! Exact geometric predicates.
//!
//! Orientation is decided with Shewchuk's adaptive precision arithmetic (via the
//! `robust` crate), so boundary coincidence is detected exactly rather than
//! through an epsilon. Every containment and crossing decision in the
//! generator bottoms out here, which is what makes the "touching counts as a
//! violation" policy reproducible.
//!
//! ## References
//!
//! - Shewchuk, J.R. (1997). "Adaptive Precision Floating-Point Arithmetic and
//!   Fast Robust Predicates for Computational Geometry"
//!
//! ## Example
//!
//! ```rust
//! use u_contour_core::predicates::{orient2d, Orientation};
//! use u_contour_core::Point;
//!
//! let a = Point::new(0.0, 0.0);
//! let b = Point::new(1.0, 0.0);
//! let c = Point::new(0.5, 1.0);
//!
//! assert_eq!(orient2d(a, b, c), Orientation::CounterClockwise);
//! ```

use crate::geometry::Point;
use robust::{orient2d as robust_orient2d, Coord};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Result of an orientation test, also used as the winding of a closed curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Orientation {
    /// Left turn / positive signed area.
    CounterClockwise,
    /// Right turn / negative signed area.
    Clockwise,
    /// Collinear points / zero area.
    Collinear,
}

impl Orientation {
    /// Returns true if the orientation is counter-clockwise.
    #[inline]
    pub fn is_ccw(self) -> bool {
        matches!(self, Orientation::CounterClockwise)
    }

    /// Returns true if the orientation is clockwise.
    #[inline]
    pub fn is_cw(self) -> bool {
        matches!(self, Orientation::Clockwise)
    }

    /// Returns true if the points are collinear.
    #[inline]
    pub fn is_collinear(self) -> bool {
        matches!(self, Orientation::Collinear)
    }

    fn from_sign(value: f64) -> Self {
        if value > 0.0 {
            Orientation::CounterClockwise
        } else if value < 0.0 {
            Orientation::Clockwise
        } else {
            Orientation::Collinear
        }
    }
}

#[inline]
fn coord(p: Point) -> Coord<f64> {
    Coord { x: p.x, y: p.y }
}

/// Determines the orientation of `pc` relative to the directed line `pa -> pb`.
///
/// - `CounterClockwise` if `pc` lies to the left
/// - `Clockwise` if `pc` lies to the right
/// - `Collinear` if the three points are exactly collinear
#[inline]
pub fn orient2d(pa: Point, pb: Point, pc: Point) -> Orientation {
    Orientation::from_sign(orient2d_raw(pa, pb, pc))
}

/// Returns the raw orientation determinant (twice the signed triangle area).
#[inline]
pub fn orient2d_raw(pa: Point, pb: Point, pc: Point) -> f64 {
    robust_orient2d(coord(pa), coord(pb), coord(pc))
}

/// Returns true if `p` lies on the closed segment `a..b`.
///
/// Collinearity is exact; the bounding-box test uses plain comparisons, which
/// are exact for points already known to be collinear.
pub fn on_segment(p: Point, a: Point, b: Point) -> bool {
    orient2d(a, b, p).is_collinear()
        && p.x >= a.x.min(b.x)
        && p.x <= a.x.max(b.x)
        && p.y >= a.y.min(b.y)
        && p.y <= a.y.max(b.y)
}

/// Tests whether the closed segments `a1..a2` and `b1..b2` share any point.
///
/// Proper crossings, collinear overlap and touching endpoints all count. Callers
/// that need to exempt adjacent edges of one curve (which always share a
/// vertex) must skip those pairs themselves.
pub fn segments_intersect(a1: Point, a2: Point, b1: Point, b2: Point) -> bool {
    let o1 = orient2d(a1, a2, b1);
    let o2 = orient2d(a1, a2, b2);
    let o3 = orient2d(b1, b2, a1);
    let o4 = orient2d(b1, b2, a2);

    let straddles = |p: Orientation, q: Orientation| {
        (p.is_ccw() && q.is_cw()) || (p.is_cw() && q.is_ccw())
    };
    if straddles(o1, o2) && straddles(o3, o4) {
        return true;
    }

    (o1.is_collinear() && on_segment(b1, a1, a2))
        || (o2.is_collinear() && on_segment(b2, a1, a2))
        || (o3.is_collinear() && on_segment(a1, b1, b2))
        || (o4.is_collinear() && on_segment(a2, b1, b2))
}

/// Computes the signed area of a closed ring with the shoelace formula.
///
/// Positive for counter-clockwise rings, negative for clockwise ones.
pub fn signed_area(ring: &[Point]) -> f64 {
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }

    // Kahan summation keeps long, nearly-cancelling rings stable
    let mut sum = 0.0;
    let mut c = 0.0;

    for i in 0..n {
        let j = (i + 1) % n;
        let term = ring[i].x * ring[j].y - ring[j].x * ring[i].y;

        let y = term - c;
        let t = sum + y;
        c = (t - sum) - y;
        sum = t;
    }

    sum / 2.0
}

/// Winding of a closed ring, derived from its signed area.
pub fn ring_orientation(ring: &[Point]) -> Orientation {
    Orientation::from_sign(signed_area(ring))
}
