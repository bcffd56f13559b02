//! Geometry kernel: stateless primitives over points and closed curves.
//!
//! Every function here is pure and safe to call from several threads at once.
//! Boundary coincidence is resolved with the exact predicates from
//! [`u_contour_core::predicates`]: a point on an edge is *not* inside, and
//! touching segments *do* intersect.

use nalgebra::Vector2;
use u_contour_core::predicates::{on_segment, Orientation};
use u_contour_core::{Curve, Point};

pub use u_contour_core::predicates::segments_intersect;

/// Parameter tolerance for treating a closest point as a vertex.
const VERTEX_EPS: f64 = 1e-9;

/// Vectors shorter than this have no usable direction.
const MIN_NORM: f64 = 1e-12;

/// The point of a curve closest to a query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestPoint {
    /// Euclidean distance from the query point.
    pub distance: f64,
    /// Index of the edge holding the closest point.
    pub edge: usize,
    /// Position along the edge, 0 at its start vertex and 1 at its end vertex.
    pub t: f64,
    /// The closest point itself.
    pub point: Point,
}

#[inline]
pub(crate) fn to_vector(p: Point) -> Vector2<f64> {
    Vector2::new(p.x, p.y)
}

#[inline]
pub(crate) fn unit_or_x(v: Vector2<f64>) -> Vector2<f64> {
    v.try_normalize(MIN_NORM).unwrap_or_else(Vector2::x)
}

/// Unit direction from `a` to `b`, or +x if the points coincide.
#[inline]
pub fn direction(a: Point, b: Point) -> Vector2<f64> {
    unit_or_x(to_vector(b) - to_vector(a))
}

/// Ray-casting parity test.
///
/// Returns false for points lying exactly on an edge.
pub fn inside(point: Point, curve: &Curve) -> bool {
    if curve.edges().any(|(a, b)| on_segment(point, a, b)) {
        return false;
    }

    let mut odd = false;
    for (a, b) in curve.edges() {
        if (a.y > point.y) != (b.y > point.y) {
            let x = a.x + (point.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if point.x < x {
                odd = !odd;
            }
        }
    }
    odd
}

/// Distance from `p` to the segment `a..b` and the clamped parameter of the foot.
pub fn segment_distance(p: Point, a: Point, b: Point) -> (f64, f64) {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;

    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0)
    };

    let foot = Point::new(a.x + t * dx, a.y + t * dy);
    (p.distance(&foot), t)
}

/// Closest point of `curve` to `point`. Ties go to the lowest edge index.
pub fn closest_point(point: Point, curve: &Curve) -> ClosestPoint {
    let mut best = ClosestPoint {
        distance: f64::INFINITY,
        edge: 0,
        t: 0.0,
        point: curve.point(0),
    };

    for (i, (a, b)) in curve.edges().enumerate() {
        let (d, t) = segment_distance(point, a, b);
        if d < best.distance {
            best = ClosestPoint {
                distance: d,
                edge: i,
                t,
                point: a.lerp(&b, t),
            };
        }
    }
    best
}

/// Minimum distance from `point` to any edge of `curve`.
pub fn distance_to_curve(point: Point, curve: &Curve) -> f64 {
    closest_point(point, curve).distance
}

/// Unit tangent at vertex `index`: the average of the incoming and outgoing
/// edge directions.
///
/// For a closed sequence the neighbours wrap around. For an open one the end
/// vertices use their single available neighbour.
pub fn estimate_tangent(points: &[Point], index: usize, closed: bool) -> Vector2<f64> {
    let n = points.len();
    if n < 2 || index >= n {
        return Vector2::x();
    }

    let current = points[index];
    let prev = if closed {
        Some(points[(index + n - 1) % n])
    } else {
        index.checked_sub(1).map(|i| points[i])
    };
    let next = if closed {
        Some(points[(index + 1) % n])
    } else {
        points.get(index + 1).copied()
    };

    match (prev, next) {
        (Some(p), Some(q)) => unit_or_x(direction(p, current) + direction(current, q)),
        (Some(p), None) => direction(p, current),
        (None, Some(q)) => direction(current, q),
        (None, None) => Vector2::x(),
    }
}

/// Unit tangent of a closed curve at vertex `index`.
pub fn curve_tangent(curve: &Curve, index: usize) -> Vector2<f64> {
    estimate_tangent(curve.points(), index % curve.len(), true)
}

/// The tangent rotated by 90 degrees towards the interior of a curve with the
/// given orientation.
pub fn inward_normal(tangent: Vector2<f64>, orientation: Orientation) -> Vector2<f64> {
    match orientation {
        Orientation::Clockwise => Vector2::new(tangent.y, -tangent.x),
        Orientation::CounterClockwise | Orientation::Collinear => {
            Vector2::new(-tangent.y, tangent.x)
        }
    }
}

/// Tangent of `curve` at the point closest to `point`.
///
/// Edge interiors use the edge direction; vertices use the averaged vertex
/// tangent so that corners turn smoothly.
pub fn local_tangent(point: Point, curve: &Curve) -> Vector2<f64> {
    let closest = closest_point(point, curve);
    if closest.t <= VERTEX_EPS {
        curve_tangent(curve, closest.edge)
    } else if closest.t >= 1.0 - VERTEX_EPS {
        curve_tangent(curve, closest.edge + 1)
    } else {
        let (a, b) = curve.edge(closest.edge);
        direction(a, b)
    }
}
