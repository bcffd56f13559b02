//! Edge index over the curve history using an R*-tree.
//!
//! Every new edge must be checked against every edge of every curve closed so
//! far. The R*-tree narrows that to the edges whose bounding boxes meet the
//! candidate's; the exact segment test then runs only on those.

use crate::kernel::segments_intersect;
use rstar::{RTree, RTreeObject, AABB};
use u_contour_core::{Curve, CurveSet, Point};

/// An edge of a closed curve stored in the index.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeEntry {
    /// Index of the owning curve in the [`CurveSet`].
    pub curve: usize,
    /// Index of the edge within its curve.
    pub edge: usize,
    /// Edge start point.
    pub start: Point,
    /// Edge end point.
    pub end: Point,
}

impl EdgeEntry {
    /// Creates a new entry.
    pub fn new(curve: usize, edge: usize, start: Point, end: Point) -> Self {
        Self {
            curve,
            edge,
            start,
            end,
        }
    }
}

impl RTreeObject for EdgeEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners([self.start.x, self.start.y], [self.end.x, self.end.y])
    }
}

/// Broad-phase index over all edges of the closed curves.
#[derive(Debug)]
pub struct EdgeIndex {
    tree: RTree<EdgeEntry>,
    /// Edge count of each indexed curve, by curve index.
    edge_counts: Vec<usize>,
}

impl EdgeIndex {
    /// Creates a new empty index.
    pub fn new() -> Self {
        Self {
            tree: RTree::new(),
            edge_counts: Vec::new(),
        }
    }

    /// Builds an index over the given curves, numbered in iteration order.
    pub fn from_curves<'c>(curves: impl IntoIterator<Item = &'c Curve>) -> Self {
        let mut entries = Vec::new();
        let mut edge_counts = Vec::new();
        for (ci, curve) in curves.into_iter().enumerate() {
            entries.extend(
                curve
                    .edges()
                    .enumerate()
                    .map(|(ei, (a, b))| EdgeEntry::new(ci, ei, a, b)),
            );
            edge_counts.push(curve.len());
        }
        Self {
            tree: RTree::bulk_load(entries),
            edge_counts,
        }
    }

    /// Builds an index over every curve of a set.
    pub fn from_curve_set(set: &CurveSet) -> Self {
        Self::from_curves(set)
    }

    /// Adds all edges of a newly closed curve.
    pub fn insert_curve(&mut self, curve: &Curve) {
        let index = self.edge_counts.len();
        for (ei, (a, b)) in curve.edges().enumerate() {
            self.tree.insert(EdgeEntry::new(index, ei, a, b));
        }
        self.edge_counts.push(curve.len());
    }

    /// Number of indexed curves.
    pub fn curve_count(&self) -> usize {
        self.edge_counts.len()
    }

    /// Number of indexed edges.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Returns true if no edge is indexed.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Finds all edges whose bounding boxes meet the bounding box of `a..b`.
    pub fn query_segment(&self, a: Point, b: Point) -> Vec<&EdgeEntry> {
        let envelope = AABB::from_corners([a.x, a.y], [b.x, b.y]);
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .collect()
    }

    /// Returns the first indexed edge that shares any point with `a..b`.
    ///
    /// When several edges qualify, the one with the lowest `(curve, edge)` pair
    /// is returned so the answer does not depend on tree layout.
    pub fn first_intersecting(&self, a: Point, b: Point) -> Option<&EdgeEntry> {
        self.query_segment(a, b)
            .into_iter()
            .filter(|e| segments_intersect(a, b, e.start, e.end))
            .min_by_key(|e| (e.curve, e.edge))
    }

    /// Returns true if `a..b` shares any point with an indexed edge.
    pub fn intersects_segment(&self, a: Point, b: Point) -> bool {
        let envelope = AABB::from_corners([a.x, a.y], [b.x, b.y]);
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .any(|e| segments_intersect(a, b, e.start, e.end))
    }

    /// Returns the lowest pair `(i, j)`, `i < j`, of non-adjacent edges of
    /// indexed curve `curve` that share a point.
    pub fn first_self_intersection(&self, curve: usize) -> Option<(usize, usize)> {
        let n = *self.edge_counts.get(curve)?;
        let adjacent = |i: usize, j: usize| j == i + 1 || (i == 0 && j == n - 1);

        self.tree
            .iter()
            .filter(|e| e.curve == curve)
            .flat_map(|e| {
                self.query_segment(e.start, e.end)
                    .into_iter()
                    .filter(move |o| o.curve == curve && o.edge > e.edge)
                    .filter(move |o| !adjacent(e.edge, o.edge))
                    .filter(move |o| segments_intersect(e.start, e.end, o.start, o.end))
                    .map(move |o| (e.edge, o.edge))
            })
            .min()
    }
}

impl Default for EdgeIndex {
    fn default() -> Self {
        Self::new()
    }
}
