//! Generation outcomes.
//!
//! Everything in this module is an expected result of a generation run. A
//! rejected point, an unreachable step, or a curve that cannot close are all
//! reported as values so that callers can render or inspect them.

use crate::geometry::{Curve, Point};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Why a candidate point was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Rejection {
    /// Not strictly inside the containing curve.
    OutOfBounds,
    /// Distance to the containing curve outside `[min, max]` separation.
    SeparationViolation,
    /// The new edge meets an edge of the containing curve or of a prior curve.
    Crossing,
    /// The new edge meets a non-adjacent edge of the curve being built.
    SelfIntersection,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Rejection::OutOfBounds => "out of bounds",
            Rejection::SeparationViolation => "separation violation",
            Rejection::Crossing => "crossing",
            Rejection::SelfIntersection => "self-intersection",
        };
        f.write_str(name)
    }
}

/// Why a curve could not be completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FailureKind {
    /// The seed point itself was inadmissible.
    SeedRejected(Rejection),
    /// Every alternative direction of a step was rejected; carries the last rejection.
    Unreachable(Rejection),
    /// No closing variant produced an admissible closing edge.
    ClosureRejected(Rejection),
    /// The gap back to the seed cannot be split into edges within tolerance.
    ClosureGap,
    /// The curve reached `max_points_per_curve` without closing.
    MaxPointsExceeded,
}

impl FailureKind {
    /// The validator rejection behind this failure, if any.
    pub fn rejection(&self) -> Option<Rejection> {
        match *self {
            FailureKind::SeedRejected(r)
            | FailureKind::Unreachable(r)
            | FailureKind::ClosureRejected(r) => Some(r),
            FailureKind::ClosureGap | FailureKind::MaxPointsExceeded => None,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::SeedRejected(r) => write!(f, "seed rejected ({})", r),
            FailureKind::Unreachable(r) => write!(f, "unreachable step ({})", r),
            FailureKind::ClosureRejected(r) => write!(f, "closure rejected ({})", r),
            FailureKind::ClosureGap => f.write_str("closing gap does not fit the segment length"),
            FailureKind::MaxPointsExceeded => f.write_str("max points exceeded"),
        }
    }
}

/// Diagnostics for the curve that terminated a run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FailureReport {
    /// Index the failed curve would have had in the [`CurveSet`].
    pub curve_index: usize,

    /// Points accepted before the failure, in order. Empty if seeding failed.
    pub partial_points: Vec<Point>,

    /// The last rejected candidate point.
    pub failing_point: Option<Point>,

    /// The last rejected candidate edge, from the prior point to the candidate.
    pub failing_edge: Option<(Point, Point)>,

    /// Failure classification.
    pub reason: FailureKind,
}

impl fmt::Display for FailureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "curve {} failed after {} points: {}",
            self.curve_index,
            self.partial_points.len(),
            self.reason
        )?;
        if let Some(p) = self.failing_point {
            write!(f, " at ({:.4}, {:.4})", p.x, p.y)?;
        }
        Ok(())
    }
}

/// Ordered nested curves; index 0 is the reference curve.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CurveSet {
    curves: Vec<Curve>,
}

impl CurveSet {
    /// Creates a set holding only the reference curve.
    pub fn new(reference: Curve) -> Self {
        Self {
            curves: vec![reference],
        }
    }

    /// Appends a closed curve. Only the generator extends a set.
    pub fn push(&mut self, curve: Curve) {
        self.curves.push(curve);
    }

    /// The reference curve.
    pub fn reference(&self) -> &Curve {
        &self.curves[0]
    }

    /// The innermost curve, which contains the next one to be generated.
    pub fn innermost(&self) -> &Curve {
        &self.curves[self.curves.len() - 1]
    }

    /// All curves, outermost first.
    pub fn curves(&self) -> &[Curve] {
        &self.curves
    }

    /// Curves produced by generation (everything but the reference).
    pub fn generated(&self) -> &[Curve] {
        &self.curves[1..]
    }

    /// Number of curves including the reference.
    pub fn len(&self) -> usize {
        self.curves.len()
    }

    /// Always false; the reference curve is always present.
    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    /// Returns the curve at `index`.
    pub fn get(&self, index: usize) -> Option<&Curve> {
        self.curves.get(index)
    }

    /// Iterates over the curves, outermost first.
    pub fn iter(&self) -> std::slice::Iter<'_, Curve> {
        self.curves.iter()
    }
}

impl<'a> IntoIterator for &'a CurveSet {
    type Item = &'a Curve;
    type IntoIter = std::slice::Iter<'a, Curve>;

    fn into_iter(self) -> Self::IntoIter {
        self.curves.iter()
    }
}

/// How a generation run ended.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GenerationStatus {
    /// All requested curves were generated.
    Complete,
    /// Stopped on request before the next curve; the prefix is valid.
    Cancelled,
    /// A curve failed; generation stopped there.
    Failed(FailureReport),
}

/// Terminal value of a generation run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GenerationResult {
    /// Reference curve plus every curve closed before the run ended.
    pub curves: CurveSet,

    /// Outcome of the run.
    pub status: GenerationStatus,

    /// Computation time in milliseconds.
    pub computation_time_ms: u64,
}

impl GenerationResult {
    /// Returns true if every requested curve was generated.
    pub fn is_complete(&self) -> bool {
        matches!(self.status, GenerationStatus::Complete)
    }

    /// Returns true if the run was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.status, GenerationStatus::Cancelled)
    }

    /// The failure report, if a curve failed.
    pub fn failure(&self) -> Option<&FailureReport> {
        match &self.status {
            GenerationStatus::Failed(report) => Some(report),
            _ => None,
        }
    }

    /// Number of generated curves (excluding the reference).
    pub fn generated_count(&self) -> usize {
        self.curves.len() - 1
    }
}

/// Summary statistics for a generation result.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GenerationSummary {
    /// Curves generated inside the reference.
    pub curves_generated: usize,
    /// Total points over all generated curves.
    pub total_points: usize,
    /// Area enclosed by the innermost curve.
    pub innermost_area: f64,
    /// Whether the run completed.
    pub complete: bool,
    /// Failure description, if the run failed.
    pub failure: Option<String>,
    /// Computation time in milliseconds.
    pub time_ms: u64,
}

impl From<&GenerationResult> for GenerationSummary {
    fn from(result: &GenerationResult) -> Self {
        Self {
            curves_generated: result.generated_count(),
            total_points: result.curves.generated().iter().map(Curve::len).sum(),
            innermost_area: result.curves.innermost().area(),
            complete: result.is_complete(),
            failure: result.failure().map(|f| f.to_string()),
            time_ms: result.computation_time_ms,
        }
    }
}
