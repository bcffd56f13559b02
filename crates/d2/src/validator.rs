//! Safety validator: the single admissibility gate for candidate points.
//!
//! Checks run cheapest first and the first failure wins:
//!
//! 1. the candidate is strictly inside the containing curve ([`Rejection::OutOfBounds`])
//! 2. its separation from the containing curve is within `[min, max]`
//!    ([`Rejection::SeparationViolation`])
//! 3. the new edge from the prior point meets no edge of any closed curve,
//!    the containing curve included ([`Rejection::Crossing`])
//! 4. the new edge meets no non-adjacent edge of the curve being built
//!    ([`Rejection::SelfIntersection`])
//!
//! Checks 3 and 4 only apply when there is a prior point.

use crate::kernel::{distance_to_curve, inside, segments_intersect};
use crate::spatial_index::EdgeIndex;
use u_contour_core::{Curve, NestingConfig, Point, Rejection};

/// Outcome of validating one candidate.
pub type Verdict = std::result::Result<(), Rejection>;

/// Validates candidates for one curve against its containing curve and the
/// full history of closed curves.
#[derive(Debug, Clone, Copy)]
pub struct SafetyValidator<'a> {
    config: &'a NestingConfig,
    containing: &'a Curve,
    history: &'a EdgeIndex,
}

impl<'a> SafetyValidator<'a> {
    /// Creates a validator.
    ///
    /// `history` must index every closed curve, `containing` included.
    pub fn new(config: &'a NestingConfig, containing: &'a Curve, history: &'a EdgeIndex) -> Self {
        Self {
            config,
            containing,
            history,
        }
    }

    /// The curve new points must stay inside.
    pub fn containing(&self) -> &'a Curve {
        self.containing
    }

    /// The configuration in use.
    pub fn config(&self) -> &'a NestingConfig {
        self.config
    }

    /// Point-only checks: containment and separation band.
    pub fn check_position(&self, candidate: Point) -> Verdict {
        if !inside(candidate, self.containing) {
            return Err(Rejection::OutOfBounds);
        }

        let separation = distance_to_curve(candidate, self.containing);
        if !self.config.accepts_separation(separation) {
            return Err(Rejection::SeparationViolation);
        }

        Ok(())
    }

    /// Validates `candidate` as the next point after `building`.
    ///
    /// The prior point is the last point of `building`; with an empty
    /// `building` only the point-only checks run. When `closing` is set the
    /// candidate is the seed itself, so the first edge of `building` is
    /// adjacent to the new edge and exempt from the self-intersection check.
    pub fn validate(&self, candidate: Point, building: &[Point], closing: bool) -> Verdict {
        self.check_position(candidate)?;

        let Some(&prior) = building.last() else {
            return Ok(());
        };

        if self.history.intersects_segment(prior, candidate) {
            return Err(Rejection::Crossing);
        }

        // The edge ending at `prior` is adjacent; everything before it is not.
        let n = building.len();
        let first = usize::from(closing);
        for i in first..n.saturating_sub(2) {
            if segments_intersect(prior, candidate, building[i], building[i + 1]) {
                return Err(Rejection::SelfIntersection);
            }
        }

        Ok(())
    }
}
