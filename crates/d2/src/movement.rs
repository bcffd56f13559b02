//! Movement engine: proposes the next point of the curve under construction.
//!
//! A step starts from one deterministic base direction: the local tangent of
//! the containing curve, bent along the inward normal towards the target
//! separation. If the validator rejects the base candidate, a fixed list of
//! angular offsets is tried in order and the first admissible candidate wins.
//! The step length is always exactly `segment_length`.

use crate::kernel::{
    curve_tangent, direction, distance_to_curve, inward_normal, local_tangent, to_vector,
    unit_or_x,
};
use crate::validator::{SafetyValidator, Verdict};
use nalgebra::{Rotation2, Vector2};
use u_contour_core::predicates::orient2d;
use u_contour_core::{Curve, NestingConfig, Orientation, Point, Rejection};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Angular offsets in degrees, in evaluation order.
pub const ANGULAR_OFFSETS_DEG: [f64; 7] = [0.0, 15.0, -15.0, 30.0, -30.0, 45.0, -45.0];

/// Upper bound on the seed offset scale at sharp corners.
pub const MITER_LIMIT: f64 = 4.0;

/// Share of `segment_length` the separation correction may bend a step by.
const MAX_CORRECTION: f64 = 0.5;

/// Result of one movement step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// The first admissible candidate.
    Accepted(Point),
    /// Every alternative was rejected; carries the last one tried.
    Exhausted {
        /// The last rejected candidate.
        candidate: Point,
        /// Its rejection.
        rejection: Rejection,
    },
}

/// Proposes and validates points inside one containing curve.
#[derive(Debug, Clone, Copy)]
pub struct MovementEngine<'a> {
    validator: SafetyValidator<'a>,
    orientation: Orientation,
}

impl<'a> MovementEngine<'a> {
    /// Creates an engine that moves inside the validator's containing curve.
    pub fn new(validator: SafetyValidator<'a>) -> Self {
        Self {
            orientation: validator.containing().orientation(),
            validator,
        }
    }

    /// The validator every candidate goes through.
    pub fn validator(&self) -> &SafetyValidator<'a> {
        &self.validator
    }

    fn containing(&self) -> &'a Curve {
        self.validator.containing()
    }

    fn config(&self) -> &'a NestingConfig {
        self.validator.config()
    }

    /// Seed point of a new curve: vertex 0 of the containing curve moved
    /// inward by `inter_curve_distance`.
    ///
    /// At a convex corner the offset along the vertex normal is scaled by the
    /// miter factor so that the seed keeps `inter_curve_distance` from both
    /// adjacent edges, up to [`MITER_LIMIT`]. At a reflex corner the vertex
    /// itself is the nearest feature, so the plain offset is used.
    pub fn seed_point(&self) -> Point {
        let curve = self.containing();
        let n = curve.len();
        let (prev, vertex, next) = (curve.point(n - 1), curve.point(0), curve.point(1));

        let normal = inward_normal(curve_tangent(curve, 0), self.orientation);
        let scale = if self.is_reflex(prev, vertex, next) {
            1.0
        } else {
            let prev_normal = inward_normal(direction(prev, vertex), self.orientation);
            let next_normal = inward_normal(direction(vertex, next), self.orientation);
            let cos = normal.dot(&prev_normal).min(normal.dot(&next_normal));
            if cos > 1.0 / MITER_LIMIT {
                (1.0 / cos).max(1.0)
            } else {
                MITER_LIMIT
            }
        };

        let offset = normal * (self.config().inter_curve_distance * scale);
        Point::new(vertex.x + offset.x, vertex.y + offset.y)
    }

    /// True when the turn at `vertex` goes against the curve's orientation.
    fn is_reflex(&self, prev: Point, vertex: Point, next: Point) -> bool {
        match orient2d(prev, vertex, next) {
            Orientation::Collinear => false,
            turn => turn != self.orientation,
        }
    }

    /// Base direction of a step from `current`.
    pub fn base_direction(&self, current: Point) -> Vector2<f64> {
        let config = self.config();
        let curve = self.containing();

        let tangent = local_tangent(current, curve);
        let normal = inward_normal(tangent, self.orientation);

        let limit = MAX_CORRECTION * config.segment_length;
        let correction =
            (config.target_separation - distance_to_curve(current, curve)).clamp(-limit, limit);

        unit_or_x(tangent * config.segment_length + normal * correction)
    }

    /// The unvalidated base proposal for point `point_index` of the curve.
    ///
    /// Point 0 is the seed; later points step from `current` along the base
    /// direction.
    pub fn propose_next_point(&self, current: Point, point_index: usize) -> Point {
        if point_index == 0 {
            return self.seed_point();
        }
        self.offset_candidate(current, self.base_direction(current), 0.0)
    }

    fn offset_candidate(&self, current: Point, base: Vector2<f64>, offset_deg: f64) -> Point {
        let dir = Rotation2::new(offset_deg.to_radians()) * base;
        let next = to_vector(current) + dir * self.config().segment_length;
        Point::new(next.x, next.y)
    }

    /// The rotated alternatives to the base proposal from `current`, in
    /// evaluation order.
    pub fn alternatives(&self, current: Point) -> Vec<Point> {
        let base = self.base_direction(current);
        ANGULAR_OFFSETS_DEG[1..]
            .iter()
            .map(|&deg| self.offset_candidate(current, base, deg))
            .collect()
    }

    /// Extends `building` by one validated point.
    ///
    /// The base proposal is validated first. With an empty `building` that is
    /// the seed and there are no alternatives.
    pub fn step(&self, building: &[Point]) -> StepOutcome {
        let current = building.last().copied();
        let proposal = self.propose_next_point(current.unwrap_or_default(), building.len());

        let rejection = match self.validator.validate(proposal, building, false) {
            Ok(()) => return StepOutcome::Accepted(proposal),
            Err(rejection) => rejection,
        };
        match current {
            Some(current) => self.first_admissible(&self.alternatives(current), building),
            None => StepOutcome::Exhausted {
                candidate: proposal,
                rejection,
            },
        }
    }

    fn first_admissible(&self, candidates: &[Point], building: &[Point]) -> StepOutcome {
        #[cfg(feature = "parallel")]
        let verdicts: Vec<(Point, Verdict)> = candidates
            .par_iter()
            .map(|&c| (c, self.validator.validate(c, building, false)))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let verdicts = candidates
            .iter()
            .map(|&c| (c, self.validator.validate(c, building, false)));

        pick_first(verdicts)
    }
}

/// First admissible candidate in evaluation order, else the last rejection.
fn pick_first(verdicts: impl IntoIterator<Item = (Point, Verdict)>) -> StepOutcome {
    let mut last = None;
    for (candidate, verdict) in verdicts {
        match verdict {
            Ok(()) => return StepOutcome::Accepted(candidate),
            Err(rejection) => last = Some((candidate, rejection)),
        }
    }

    // Only an empty alternative list leaves `last` unset
    let (candidate, rejection) = last.unwrap_or((Point::default(), Rejection::OutOfBounds));
    StepOutcome::Exhausted {
        candidate,
        rejection,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial_index::EdgeIndex;
    use approx::assert_relative_eq;
    use u_contour_core::CurveSet;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    struct Fixture {
        config: NestingConfig,
        curves: CurveSet,
        index: EdgeIndex,
    }

    impl Fixture {
        fn new(reference: Curve, config: NestingConfig) -> Self {
            let curves = CurveSet::new(reference);
            let index = EdgeIndex::from_curve_set(&curves);
            Self {
                config,
                curves,
                index,
            }
        }

        fn square() -> Self {
            Self::new(Curve::rectangle(10.0, 10.0).unwrap(), NestingConfig::default())
        }

        fn engine(&self) -> MovementEngine<'_> {
            MovementEngine::new(SafetyValidator::new(
                &self.config,
                self.curves.innermost(),
                &self.index,
            ))
        }
    }

    #[test]
    fn test_seed_is_mitered_at_square_corner() {
        let fx = Fixture::square();
        let seed = fx.engine().seed_point();
        // Distance 2 from both edges meeting at (0, 0)
        assert_relative_eq!(seed.x, 2.0, epsilon = 1e-9);
        assert_relative_eq!(seed.y, 2.0, epsilon = 1e-9);
        assert_eq!(fx.engine().propose_next_point(p(9.0, 9.0), 0), seed);
    }

    #[test]
    fn test_seed_on_smooth_curve_is_plain_offset() {
        let circle = Curve::circle(p(0.0, 0.0), 40.0, 96).unwrap();
        let fx = Fixture::new(circle, NestingConfig::default());
        let seed = fx.engine().seed_point();
        // Vertex 0 is (40, 0); the inward normal there is -x
        assert!(seed.x < 38.0 && seed.x > 37.9);
        assert_relative_eq!(seed.y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_seed_respects_cw_orientation() {
        let cw = Curve::rectangle(10.0, 10.0).unwrap().reversed();
        let fx = Fixture::new(cw, NestingConfig::default());
        let seed = fx.engine().seed_point();
        assert_relative_eq!(seed.x, 2.0, epsilon = 1e-9);
        assert_relative_eq!(seed.y, 2.0, epsilon = 1e-9);
    }

    /// 40x40 square with a 60 degree V-notch cut into the top edge; vertex 0
    /// is the notch tip at (20, 25).
    fn notched_square() -> Curve {
        let h = 15.0 * 30.0_f64.to_radians().tan();
        Curve::from_tuples(&[
            (20.0, 25.0),
            (20.0 - h, 40.0),
            (0.0, 40.0),
            (0.0, 0.0),
            (40.0, 0.0),
            (40.0, 40.0),
            (20.0 + h, 40.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_seed_at_reflex_vertex_is_plain_offset() {
        let fx = Fixture::new(notched_square(), NestingConfig::default());
        let engine = fx.engine();
        let seed = engine.seed_point();
        // Nearest feature is the tip itself
        assert_relative_eq!(seed.x, 20.0, epsilon = 1e-9);
        assert_relative_eq!(seed.y, 23.0, epsilon = 1e-9);
        assert_relative_eq!(distance_to_curve(seed, fx.curves.innermost()), 2.0, epsilon = 1e-9);
        assert!(matches!(engine.step(&[]), StepOutcome::Accepted(_)));
    }

    #[test]
    fn test_seed_at_reflex_corner_of_l_shape() {
        let l_shape = Curve::from_tuples(&[
            (12.0, 12.0),
            (12.0, 30.0),
            (0.0, 30.0),
            (0.0, 0.0),
            (30.0, 0.0),
            (30.0, 12.0),
        ])
        .unwrap();
        let fx = Fixture::new(l_shape, NestingConfig::default());
        let seed = fx.engine().seed_point();
        let d = 12.0 - std::f64::consts::SQRT_2;
        assert_relative_eq!(seed.x, d, epsilon = 1e-9);
        assert_relative_eq!(seed.y, d, epsilon = 1e-9);
    }

    #[test]
    fn test_base_direction_at_target_follows_tangent() {
        let fx = Fixture::square();
        // Separation 2 from the bottom edge equals the target
        let dir = fx.engine().base_direction(p(5.0, 2.0));
        assert_relative_eq!(dir.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(dir.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_base_direction_corrects_towards_target() {
        let fx = Fixture::square();
        // Too close to the bottom edge: bends inward (+y), capped at L/2
        let dir = fx.engine().base_direction(p(5.0, 1.0));
        assert!(dir.y > 0.0);
        assert_relative_eq!(dir.y / dir.x, 0.5, epsilon = 1e-12);

        // Too far: bends outward
        let dir = fx.engine().base_direction(p(5.0, 2.8));
        assert!(dir.y < 0.0);
    }

    #[test]
    fn test_proposal_and_alternatives_have_segment_length() {
        let fx = Fixture::square();
        let engine = fx.engine();
        let current = p(5.0, 2.0);

        let base = engine.propose_next_point(current, 1);
        assert_relative_eq!(base.x, 6.0, epsilon = 1e-12);
        assert_relative_eq!(base.y, 2.0, epsilon = 1e-12);

        let alternatives = engine.alternatives(current);
        assert_eq!(alternatives.len(), ANGULAR_OFFSETS_DEG.len() - 1);
        for c in &alternatives {
            assert_relative_eq!(current.distance(c), 1.0, epsilon = 1e-12);
        }
        // +15 degrees (counter-clockwise) first, then -15
        assert!(alternatives[0].y > 2.0);
        assert!(alternatives[1].y < 2.0);
    }

    #[test]
    fn test_step_accepts_base_candidate() {
        let fx = Fixture::square();
        let outcome = fx.engine().step(&[p(2.0, 2.0)]);
        match outcome {
            StepOutcome::Accepted(q) => {
                assert_relative_eq!(q.x, 3.0, epsilon = 1e-12);
                assert_relative_eq!(q.y, 2.0, epsilon = 1e-12);
            }
            other => panic!("expected acceptance, got {:?}", other),
        }
    }

    #[test]
    fn test_step_exhausts_in_narrow_band() {
        let config = NestingConfig::default().with_separation(0.01, 0.015, 0.02);
        let fx = Fixture::new(Curve::rectangle(10.0, 10.0).unwrap(), config);
        // Every alternative lands either too far from the bottom edge or below it
        let outcome = fx.engine().step(&[p(5.0, 0.5)]);
        assert!(matches!(
            outcome,
            StepOutcome::Exhausted {
                rejection: Rejection::OutOfBounds,
                ..
            }
        ));
    }

    #[test]
    fn test_step_without_points_validates_seed() {
        let fx = Fixture::square();
        match fx.engine().step(&[]) {
            StepOutcome::Accepted(seed) => {
                assert_relative_eq!(seed.x, 2.0, epsilon = 1e-9);
                assert_relative_eq!(seed.y, 2.0, epsilon = 1e-9);
            }
            other => panic!("expected the seed, got {:?}", other),
        }
    }
}
