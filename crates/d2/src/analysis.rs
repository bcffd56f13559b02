//! Post-hoc analysis of generated curves.
//!
//! [`SegmentStats`] summarises how closely a curve's edges track the nominal
//! segment length. [`audit_curve_set`] re-checks every nesting invariant on a
//! finished [`CurveSet`], independently of the generator.

use crate::kernel::{distance_to_curve, inside, segments_intersect};
use crate::spatial_index::EdgeIndex;
use u_contour_core::{Curve, CurveSet, NestingConfig};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Slack for floating-point noise when re-measuring edge lengths.
const LENGTH_SLACK: f64 = 1e-9;

/// Edge length statistics of a closed curve.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SegmentStats {
    /// Number of edges, closing edge included.
    pub num_segments: usize,
    /// Mean edge length.
    pub avg_length: f64,
    /// Shortest edge.
    pub min_length: f64,
    /// Longest edge.
    pub max_length: f64,
    /// Population standard deviation of the edge lengths.
    pub std_dev: f64,
    /// `(1 - |avg - target| / target) * 100`.
    pub accuracy_percent: f64,
}

impl SegmentStats {
    /// Computes statistics for `curve` against `target_length`.
    pub fn from_curve(curve: &Curve, target_length: f64) -> Self {
        let lengths = curve.edge_lengths();
        let n = lengths.len() as f64;

        let avg = lengths.iter().sum::<f64>() / n;
        let variance = lengths.iter().map(|l| (l - avg).powi(2)).sum::<f64>() / n;
        let min = lengths.iter().copied().fold(f64::INFINITY, f64::min);
        let max = lengths.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let accuracy = if target_length > 0.0 {
            (1.0 - (avg - target_length).abs() / target_length) * 100.0
        } else {
            0.0
        };

        Self {
            num_segments: lengths.len(),
            avg_length: avg,
            min_length: min,
            max_length: max,
            std_dev: variance.sqrt(),
            accuracy_percent: accuracy,
        }
    }
}

/// A broken nesting invariant found by [`audit_curve_set`].
///
/// `curve` indices refer to positions in the audited set.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum InvariantViolation {
    /// A vertex is not strictly inside the previous curve.
    NotContained {
        /// Curve index.
        curve: usize,
        /// Vertex index.
        point: usize,
    },
    /// A vertex's distance to the previous curve is outside the band.
    SeparationOutOfBand {
        /// Curve index.
        curve: usize,
        /// Vertex index.
        point: usize,
        /// Measured separation.
        separation: f64,
    },
    /// An edge length is outside the tolerance.
    SegmentLength {
        /// Curve index.
        curve: usize,
        /// Edge index.
        edge: usize,
        /// Measured length.
        length: f64,
    },
    /// Two non-adjacent edges of one curve meet.
    SelfIntersection {
        /// Curve index.
        curve: usize,
        /// The two edge indices.
        edges: (usize, usize),
    },
    /// An edge meets an edge of an earlier curve.
    Crossing {
        /// Curve index.
        curve: usize,
        /// Edge index.
        edge: usize,
        /// Index of the earlier curve.
        other: usize,
    },
}

/// Checks containment, separation, segment length, simplicity and pairwise
/// non-crossing for every generated curve of `set`.
///
/// The reference curve (index 0) is only used as a container and crossing
/// partner; its own edge lengths are not checked.
pub fn audit_curve_set(set: &CurveSet, config: &NestingConfig) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let index = EdgeIndex::from_curve_set(set);

    for (ci, pair) in set.curves().windows(2).enumerate() {
        let (outer, curve) = (&pair[0], &pair[1]);
        let ci = ci + 1;

        for (pi, &p) in curve.points().iter().enumerate() {
            if !inside(p, outer) {
                violations.push(InvariantViolation::NotContained {
                    curve: ci,
                    point: pi,
                });
            }
            let separation = distance_to_curve(p, outer);
            if !config.accepts_separation(separation) {
                violations.push(InvariantViolation::SeparationOutOfBand {
                    curve: ci,
                    point: pi,
                    separation,
                });
            }
        }

        for (ei, length) in curve.edge_lengths().into_iter().enumerate() {
            if (length - config.segment_length).abs() > config.segment_length_tolerance + LENGTH_SLACK
            {
                violations.push(InvariantViolation::SegmentLength {
                    curve: ci,
                    edge: ei,
                    length,
                });
            }
        }

        if let Some(edges) = index.first_self_intersection(ci) {
            violations.push(InvariantViolation::SelfIntersection { curve: ci, edges });
        }

        for (ei, (a, b)) in curve.edges().enumerate() {
            let hit = index
                .query_segment(a, b)
                .into_iter()
                .filter(|e| e.curve < ci && segments_intersect(a, b, e.start, e.end))
                .map(|e| e.curve)
                .min();
            if let Some(other) = hit {
                violations.push(InvariantViolation::Crossing {
                    curve: ci,
                    edge: ei,
                    other,
                });
            }
        }
    }

    violations
}
