//! Point and closed-curve types.

use crate::predicates::{ring_orientation, segments_intersect, signed_area, Orientation};
use crate::{Error, Result};
use geo::{Area, Centroid, Coord, LineString, Polygon as GeoPolygon};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A 2D point with finite coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl Point {
    /// Creates a new point.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Returns true if both coordinates are finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Linear interpolation towards `other`; `t = 0` is `self`, `t = 1` is `other`.
    #[inline]
    pub fn lerp(&self, other: &Point, t: f64) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}

impl From<Point> for (f64, f64) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

impl From<Point> for Coord<f64> {
    fn from(p: Point) -> Self {
        Coord { x: p.x, y: p.y }
    }
}

/// An implicitly closed polygonal curve.
///
/// Construction guarantees at least 3 points, finite coordinates, and no two
/// consecutive points (including last to first) being equal. A `Curve` is never
/// mutated after construction; orientation changes produce a new value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "Vec<Point>", into = "Vec<Point>")
)]
pub struct Curve {
    points: Vec<Point>,
}

impl Curve {
    /// Creates a curve from its vertices.
    pub fn new(points: Vec<Point>) -> Result<Self> {
        if points.len() < 3 {
            return Err(Error::InvalidCurve(format!(
                "curve needs at least 3 points, got {}",
                points.len()
            )));
        }

        if let Some(i) = points.iter().position(|p| !p.is_finite()) {
            return Err(Error::InvalidCurve(format!(
                "point {} has non-finite coordinates",
                i
            )));
        }

        let n = points.len();
        for i in 0..n {
            if points[i] == points[(i + 1) % n] {
                return Err(Error::InvalidCurve(format!(
                    "points {} and {} coincide",
                    i,
                    (i + 1) % n
                )));
            }
        }

        Ok(Self { points })
    }

    /// Creates a curve from `(x, y)` tuples.
    pub fn from_tuples(vertices: &[(f64, f64)]) -> Result<Self> {
        Self::new(vertices.iter().copied().map(Point::from).collect())
    }

    /// Creates an axis-aligned rectangle with its lower-left corner at the origin.
    pub fn rectangle(width: f64, height: f64) -> Result<Self> {
        if width <= 0.0 || height <= 0.0 || !width.is_finite() || !height.is_finite() {
            return Err(Error::InvalidCurve(format!(
                "rectangle needs positive dimensions, got {}x{}",
                width, height
            )));
        }
        Self::from_tuples(&[(0.0, 0.0), (width, 0.0), (width, height), (0.0, height)])
    }

    /// Creates a counter-clockwise regular polygon inscribed in a circle.
    ///
    /// Vertex 0 lies on the positive x axis relative to `center`.
    pub fn regular_polygon(center: Point, radius: f64, sides: usize) -> Result<Self> {
        if sides < 3 {
            return Err(Error::InvalidCurve(format!(
                "regular polygon needs at least 3 sides, got {}",
                sides
            )));
        }
        if radius <= 0.0 || !radius.is_finite() {
            return Err(Error::InvalidCurve(format!(
                "radius must be positive, got {}",
                radius
            )));
        }

        let step = std::f64::consts::TAU / sides as f64;
        let points = (0..sides)
            .map(|i| {
                let angle = i as f64 * step;
                Point::new(
                    center.x + radius * angle.cos(),
                    center.y + radius * angle.sin(),
                )
            })
            .collect();
        Self::new(points)
    }

    /// Creates a circle approximation with `n` vertices (at least 8).
    pub fn circle(center: Point, radius: f64, n: usize) -> Result<Self> {
        Self::regular_polygon(center, radius, n.max(8))
    }

    /// Returns the vertices.
    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of vertices (equal to the number of edges).
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; a curve holds at least 3 points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the vertex at `index`, wrapping around.
    #[inline]
    pub fn point(&self, index: usize) -> Point {
        self.points[index % self.points.len()]
    }

    /// Returns edge `index`: from vertex `index` to its successor.
    #[inline]
    pub fn edge(&self, index: usize) -> (Point, Point) {
        (self.point(index), self.point(index + 1))
    }

    /// Iterates over all edges, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        (0..self.points.len()).map(move |i| self.edge(i))
    }

    /// Lengths of all edges, closing edge last.
    pub fn edge_lengths(&self) -> Vec<f64> {
        self.edges().map(|(a, b)| a.distance(&b)).collect()
    }

    /// Signed area: positive for counter-clockwise curves.
    pub fn signed_area(&self) -> f64 {
        signed_area(&self.points)
    }

    /// Unsigned enclosed area.
    pub fn area(&self) -> f64 {
        self.to_geo_polygon().unsigned_area()
    }

    /// Total edge length.
    pub fn perimeter(&self) -> f64 {
        use geo::{Euclidean, Length};
        self.to_geo_polygon().exterior().length::<Euclidean>()
    }

    /// Area centroid.
    pub fn centroid(&self) -> Option<Point> {
        self.to_geo_polygon()
            .centroid()
            .map(|c| Point::new(c.x(), c.y()))
    }

    /// Axis-aligned bounding box as `(min, max)` corners.
    pub fn aabb(&self) -> (Point, Point) {
        let mut min = Point::new(f64::MAX, f64::MAX);
        let mut max = Point::new(f64::MIN, f64::MIN);
        for p in &self.points {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        (min, max)
    }

    /// Traversal direction of the curve.
    pub fn orientation(&self) -> Orientation {
        ring_orientation(&self.points)
    }

    /// Returns the same curve traversed in the opposite direction.
    ///
    /// Vertex 0 stays first so that seeding from vertex 0 is unaffected.
    pub fn reversed(&self) -> Curve {
        let mut points = Vec::with_capacity(self.points.len());
        points.push(self.points[0]);
        points.extend(self.points[1..].iter().rev().copied());
        Curve { points }
    }

    /// Returns the curve with counter-clockwise orientation.
    pub fn into_ccw(self) -> Curve {
        if self.orientation().is_cw() {
            self.reversed()
        } else {
            self
        }
    }

    /// Returns true if no two non-adjacent edges share a point.
    pub fn is_simple(&self) -> bool {
        self.first_self_intersection().is_none()
    }

    /// Returns the first pair of non-adjacent edge indices that intersect.
    pub fn first_self_intersection(&self) -> Option<(usize, usize)> {
        let n = self.points.len();
        for i in 0..n {
            let (a1, a2) = self.edge(i);
            for j in (i + 2)..n {
                if i == 0 && j == n - 1 {
                    continue;
                }
                let (b1, b2) = self.edge(j);
                if segments_intersect(a1, a2, b1, b2) {
                    return Some((i, j));
                }
            }
        }
        None
    }

    /// Checks that the curve is simple and encloses a non-zero area.
    pub fn validate_simple(&self) -> Result<()> {
        if let Some((i, j)) = self.first_self_intersection() {
            return Err(Error::InvalidCurve(format!(
                "edges {} and {} intersect",
                i, j
            )));
        }
        if self.orientation().is_collinear() {
            return Err(Error::InvalidCurve("curve encloses zero area".into()));
        }
        Ok(())
    }

    /// Converts to a geo crate Polygon.
    pub fn to_geo_polygon(&self) -> GeoPolygon<f64> {
        let exterior = LineString::from(
            self.points
                .iter()
                .map(|&p| Coord::from(p))
                .collect::<Vec<_>>(),
        );
        GeoPolygon::new(exterior, vec![])
    }
}

impl TryFrom<Vec<Point>> for Curve {
    type Error = Error;

    fn try_from(points: Vec<Point>) -> Result<Self> {
        Curve::new(points)
    }
}

impl From<Curve> for Vec<Point> {
    fn from(curve: Curve) -> Self {
        curve.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square() -> Curve {
        Curve::rectangle(10.0, 10.0).unwrap()
    }

    #[test]
    fn test_curve_rejects_too_few_points() {
        let result = Curve::from_tuples(&[(0.0, 0.0), (1.0, 0.0)]);
        assert!(matches!(result, Err(Error::InvalidCurve(_))));
    }

    #[test]
    fn test_curve_rejects_non_finite() {
        let result = Curve::from_tuples(&[(0.0, 0.0), (f64::NAN, 0.0), (1.0, 1.0)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_curve_rejects_consecutive_duplicates() {
        assert!(Curve::from_tuples(&[(0.0, 0.0), (0.0, 0.0), (1.0, 1.0)]).is_err());
        // Closing edge counts as consecutive
        assert!(Curve::from_tuples(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]).is_err());
    }

    #[test]
    fn test_rectangle_measures() {
        let sq = square();
        assert_eq!(sq.len(), 4);
        assert_relative_eq!(sq.area(), 100.0, epsilon = 1e-10);
        assert_relative_eq!(sq.signed_area(), 100.0, epsilon = 1e-10);
        assert_relative_eq!(sq.perimeter(), 40.0, epsilon = 1e-10);

        let c = sq.centroid().unwrap();
        assert_relative_eq!(c.x, 5.0, epsilon = 1e-10);
        assert_relative_eq!(c.y, 5.0, epsilon = 1e-10);

        let (min, max) = sq.aabb();
        assert_eq!(min, Point::new(0.0, 0.0));
        assert_eq!(max, Point::new(10.0, 10.0));
    }

    #[test]
    fn test_edges_wrap_around() {
        let sq = square();
        let edges: Vec<_> = sq.edges().collect();
        assert_eq!(edges.len(), 4);
        assert_eq!(edges[3], (Point::new(0.0, 10.0), Point::new(0.0, 0.0)));
        assert!(sq.edge_lengths().iter().all(|&l| (l - 10.0).abs() < 1e-12));
    }

    #[test]
    fn test_circle_approximation() {
        let c = Curve::circle(Point::new(50.0, 50.0), 40.0, 96).unwrap();
        assert_eq!(c.len(), 96);
        assert!(c.orientation().is_ccw());
        assert_relative_eq!(c.point(0).x, 90.0, epsilon = 1e-10);
        // Inscribed polygon area approaches pi r^2 from below
        assert!(c.area() < std::f64::consts::PI * 1600.0);
        assert!(c.area() > 0.99 * std::f64::consts::PI * 1600.0);

        // Minimum vertex count is enforced
        assert_eq!(Curve::circle(Point::default(), 1.0, 3).unwrap().len(), 8);
        assert!(Curve::regular_polygon(Point::default(), 1.0, 2).is_err());
        assert!(Curve::regular_polygon(Point::default(), 0.0, 5).is_err());
    }

    #[test]
    fn test_orientation_normalisation() {
        let cw = Curve::from_tuples(&[(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0)]).unwrap();
        assert!(cw.orientation().is_cw());

        let ccw = cw.clone().into_ccw();
        assert!(ccw.orientation().is_ccw());
        assert_eq!(ccw.point(0), cw.point(0));
        assert_relative_eq!(ccw.signed_area(), 100.0, epsilon = 1e-10);

        let unchanged = square().into_ccw();
        assert_eq!(unchanged, square());
    }

    #[test]
    fn test_simplicity() {
        assert!(square().is_simple());
        assert!(square().validate_simple().is_ok());

        let bowtie =
            Curve::from_tuples(&[(0.0, 0.0), (10.0, 10.0), (10.0, 0.0), (0.0, 10.0)]).unwrap();
        assert!(!bowtie.is_simple());
        assert_eq!(bowtie.first_self_intersection(), Some((0, 2)));
        assert!(bowtie.validate_simple().is_err());

        let flat = Curve::from_tuples(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]).unwrap();
        assert!(flat.validate_simple().is_err());
    }

    #[test]
    fn test_lerp_and_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_relative_eq!(a.distance(&b), 5.0);
        assert_eq!(a.lerp(&b, 0.5), Point::new(1.5, 2.0));
    }
}
