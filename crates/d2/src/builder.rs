//! Curve builder: grows one closed curve point by point.
//!
//! The builder is a state machine over [`BuildState`]:
//!
//! ```text
//! Seeding -> Growing -> Closing -> Closed
//!               |          |
//!               +----------+-----> Failed
//! ```
//!
//! The point sequence is carried as the state's payload, so a closed curve
//! cannot be extended and a failed one cannot be resumed.

use crate::movement::{MovementEngine, StepOutcome};
use u_contour_core::{Curve, FailureKind, NestingConfig, Point, Rejection};

/// How many trailing points closing may drop before giving up.
const MAX_CLOSING_BACKOFF: usize = 3;

/// Diagnostics of a curve that could not be completed.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveFailure {
    /// Points accepted before the failure.
    pub partial_points: Vec<Point>,
    /// Failure classification.
    pub reason: FailureKind,
    /// The last rejected candidate, if any.
    pub failing_point: Option<Point>,
    /// The last rejected edge, if any.
    pub failing_edge: Option<(Point, Point)>,
}

/// State of one curve under construction.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildState {
    /// No point placed yet.
    Seeding,
    /// Accepting points; `departed` records that the curve has moved far enough
    /// from its seed for closure to be meaningful.
    Growing {
        /// Accepted points, seed first.
        points: Vec<Point>,
        /// Whether some point lay farther than `2 * (L + tol)` from the seed.
        departed: bool,
    },
    /// The last point is within one segment of the seed.
    Closing {
        /// Accepted points, seed first.
        points: Vec<Point>,
    },
    /// Terminal success.
    Closed(Curve),
    /// Terminal failure.
    Failed(CurveFailure),
}

impl BuildState {
    /// Returns true for `Closed` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BuildState::Closed(_) | BuildState::Failed(_))
    }

    /// Points accepted so far (the closed curve's points once closed).
    pub fn points(&self) -> &[Point] {
        match self {
            BuildState::Seeding => &[],
            BuildState::Growing { points, .. } | BuildState::Closing { points } => points,
            BuildState::Closed(curve) => curve.points(),
            BuildState::Failed(failure) => &failure.partial_points,
        }
    }
}

/// Terminal outcome of building one curve.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildOutcome {
    /// The curve closed.
    Closed(Curve),
    /// The curve failed.
    Failed(CurveFailure),
}

/// Drives the point-addition loop for one curve.
#[derive(Debug, Clone, Copy)]
pub struct CurveBuilder<'a> {
    engine: MovementEngine<'a>,
}

impl<'a> CurveBuilder<'a> {
    /// Creates a builder around a movement engine.
    pub fn new(engine: MovementEngine<'a>) -> Self {
        Self { engine }
    }

    fn config(&self) -> &'a NestingConfig {
        self.engine.validator().config()
    }

    /// Runs the state machine to a terminal state.
    pub fn build(&self) -> BuildOutcome {
        let mut state = BuildState::Seeding;
        loop {
            state = match self.advance(state) {
                BuildState::Closed(curve) => return BuildOutcome::Closed(curve),
                BuildState::Failed(failure) => return BuildOutcome::Failed(failure),
                next => next,
            };
        }
    }

    /// Performs one transition. Terminal states are returned unchanged; a
    /// `Growing` or `Closing` state without points starts over at `Seeding`.
    pub fn advance(&self, state: BuildState) -> BuildState {
        match state {
            BuildState::Seeding => self.seed(),
            BuildState::Growing { points, departed } => self.grow(points, departed),
            BuildState::Closing { points } => self.close(points),
            terminal => terminal,
        }
    }

    fn seed(&self) -> BuildState {
        match self.engine.step(&[]) {
            StepOutcome::Accepted(seed) => BuildState::Growing {
                points: vec![seed],
                departed: false,
            },
            StepOutcome::Exhausted {
                candidate,
                rejection,
            } => {
                log::debug!("seed ({:.4}, {:.4}) rejected: {}", candidate.x, candidate.y, rejection);
                BuildState::Failed(CurveFailure {
                    partial_points: Vec::new(),
                    reason: FailureKind::SeedRejected(rejection),
                    failing_point: Some(candidate),
                    failing_edge: None,
                })
            }
        }
    }

    fn grow(&self, mut points: Vec<Point>, mut departed: bool) -> BuildState {
        let config = self.config();
        if points.len() >= config.max_points_per_curve {
            return BuildState::Failed(CurveFailure {
                partial_points: points,
                reason: FailureKind::MaxPointsExceeded,
                failing_point: None,
                failing_edge: None,
            });
        }

        let Some(&prior) = points.last() else {
            return BuildState::Seeding;
        };
        let next = match self.engine.step(&points) {
            StepOutcome::Accepted(next) => next,
            StepOutcome::Exhausted {
                candidate,
                rejection,
            } => {
                log::debug!(
                    "step {} unreachable from ({:.4}, {:.4}): {}",
                    points.len(),
                    prior.x,
                    prior.y,
                    rejection
                );
                return BuildState::Failed(CurveFailure {
                    partial_points: points,
                    reason: FailureKind::Unreachable(rejection),
                    failing_point: Some(candidate),
                    failing_edge: Some((prior, candidate)),
                });
            }
        };

        points.push(next);
        let reach = config.segment_length + config.segment_length_tolerance;
        let to_seed = next.distance(&points[0]);
        if to_seed > 2.0 * reach {
            departed = true;
        }

        if departed && points.len() >= 3 && to_seed <= reach {
            BuildState::Closing { points }
        } else {
            BuildState::Growing { points, departed }
        }
    }

    /// Closes the curve back to its seed.
    ///
    /// A closing edge within tolerance is validated as is. Otherwise up to
    /// [`MAX_CLOSING_BACKOFF`] trailing points are dropped in turn and the gap
    /// from the new tail to the seed is split into equal edges, trying the
    /// split closest to `segment_length` first.
    fn close(&self, points: Vec<Point>) -> BuildState {
        let config = self.config();
        let validator = self.engine.validator();
        let (Some(&seed), Some(&last)) = (points.first(), points.last()) else {
            return BuildState::Seeding;
        };

        if config.accepts_segment_length(last.distance(&seed)) {
            return match validator.validate(seed, &points, true) {
                Ok(()) => self.finish(points),
                Err(rejection) => BuildState::Failed(CurveFailure {
                    partial_points: points,
                    reason: FailureKind::ClosureRejected(rejection),
                    failing_point: Some(seed),
                    failing_edge: Some((last, seed)),
                }),
            };
        }

        let mut last_rejection: Option<(Rejection, Point, Point)> = None;
        for drop in 1..=MAX_CLOSING_BACKOFF {
            if points.len() < 3 + drop {
                break;
            }
            let keep = &points[..points.len() - drop];
            let tail = keep[keep.len() - 1];

            for k in closing_splits(tail.distance(&seed), config) {
                if keep.len() + k - 1 > config.max_points_per_curve {
                    continue;
                }

                let mut trial = keep.to_vec();
                let mut rejected = false;
                for j in 1..k {
                    let inserted = tail.lerp(&seed, j as f64 / k as f64);
                    let prior = trial[trial.len() - 1];
                    if let Err(rejection) = validator.validate(inserted, &trial, false) {
                        last_rejection = Some((rejection, prior, inserted));
                        rejected = true;
                        break;
                    }
                    trial.push(inserted);
                }
                if rejected {
                    continue;
                }

                let prior = trial[trial.len() - 1];
                match validator.validate(seed, &trial, true) {
                    Ok(()) => {
                        log::debug!("closed after dropping {} points, {} new edges", drop, k);
                        return self.finish(trial);
                    }
                    Err(rejection) => last_rejection = Some((rejection, prior, seed)),
                }
            }
        }

        let (reason, failing_point, failing_edge) = match last_rejection {
            Some((rejection, a, b)) => (FailureKind::ClosureRejected(rejection), Some(b), Some((a, b))),
            None => (FailureKind::ClosureGap, None, Some((last, seed))),
        };
        BuildState::Failed(CurveFailure {
            partial_points: points,
            reason,
            failing_point,
            failing_edge,
        })
    }

    fn finish(&self, points: Vec<Point>) -> BuildState {
        match Curve::new(points.clone()) {
            Ok(curve) => BuildState::Closed(curve),
            // Coincident consecutive points are a degenerate self-intersection
            Err(err) => {
                log::warn!("closed point sequence is degenerate: {}", err);
                BuildState::Failed(CurveFailure {
                    partial_points: points,
                    reason: FailureKind::ClosureRejected(Rejection::SelfIntersection),
                    failing_point: None,
                    failing_edge: None,
                })
            }
        }
    }
}

/// Edge counts that split `gap` into equal edges within tolerance, best first.
fn closing_splits(gap: f64, config: &NestingConfig) -> Vec<usize> {
    let length = config.segment_length;
    let lower = ((gap / length).floor() as usize).max(1);
    let upper = ((gap / length).ceil() as usize).max(1);

    let mut splits = vec![lower];
    if upper != lower {
        splits.push(upper);
    }
    splits.retain(|&k| config.accepts_segment_length(gap / k as f64));
    splits.sort_by(|&a, &b| {
        let da = (gap / a as f64 - length).abs();
        let db = (gap / b as f64 - length).abs();
        da.total_cmp(&db)
    });
    splits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial_index::EdgeIndex;
    use crate::validator::SafetyValidator;
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
        fn square(config: NestingConfig) -> Self {
            let curves = CurveSet::new(Curve::rectangle(10.0, 10.0).unwrap());
            let index = EdgeIndex::from_curve_set(&curves);
            Self {
                config,
                curves,
                index,
            }
        }

        fn builder(&self) -> CurveBuilder<'_> {
            CurveBuilder::new(MovementEngine::new(SafetyValidator::new(
                &self.config,
                self.curves.innermost(),
                &self.index,
            )))
        }
    }

    /// A ring two units inside the 10x10 square, ending short of the seed.
    fn open_ring(tail: &[(f64, f64)]) -> Vec<Point> {
        let mut pts = Vec::new();
        for x in 2..=8 {
            pts.push(p(x as f64, 2.0));
        }
        for y in 3..=8 {
            pts.push(p(8.0, y as f64));
        }
        for x in (2..=7).rev() {
            pts.push(p(x as f64, 8.0));
        }
        pts.extend(tail.iter().map(|&(x, y)| p(x, y)));
        pts
    }

    #[test]
    fn test_build_square() {
        let fx = Fixture::square(NestingConfig::default());
        let curve = match fx.builder().build() {
            BuildOutcome::Closed(curve) => curve,
            BuildOutcome::Failed(f) => panic!("curve failed: {:?}", f.reason),
        };

        assert!(curve.len() > 20);
        assert_relative_eq!(curve.point(0).x, 2.0, epsilon = 1e-9);
        assert_relative_eq!(curve.point(0).y, 2.0, epsilon = 1e-9);
        for len in curve.edge_lengths() {
            assert!((len - 1.0).abs() <= 0.25 + 1e-9, "edge length {}", len);
        }
        assert!(curve.is_simple());
        assert!(curve.orientation().is_ccw());
    }

    #[test]
    fn test_states_progress_from_seeding() {
        let fx = Fixture::square(NestingConfig::default());
        let builder = fx.builder();

        let state = builder.advance(BuildState::Seeding);
        assert!(matches!(state, BuildState::Growing { departed: false, .. }));
        assert_eq!(state.points().len(), 1);

        let state = builder.advance(state);
        assert_eq!(state.points().len(), 2);
        assert!(!state.is_terminal());
    }

    #[test]
    fn test_terminal_state_is_unchanged() {
        let fx = Fixture::square(NestingConfig::default());
        let failed = BuildState::Failed(CurveFailure {
            partial_points: vec![p(2.0, 2.0)],
            reason: FailureKind::MaxPointsExceeded,
            failing_point: None,
            failing_edge: None,
        });
        assert_eq!(fx.builder().advance(failed.clone()), failed);
    }

    #[test]
    fn test_empty_payload_restarts_at_seeding() {
        let fx = Fixture::square(NestingConfig::default());
        let builder = fx.builder();

        let growing = BuildState::Growing {
            points: Vec::new(),
            departed: true,
        };
        assert_eq!(builder.advance(growing), BuildState::Seeding);

        let closing = BuildState::Closing { points: Vec::new() };
        assert_eq!(builder.advance(closing), BuildState::Seeding);

        // From there the machine proceeds as usual
        assert!(matches!(
            builder.advance(BuildState::Seeding),
            BuildState::Growing { .. }
        ));
    }

    #[test]
    fn test_seed_rejected_in_narrow_band() {
        let config = NestingConfig::default().with_separation(0.01, 0.015, 0.02);
        let fx = Fixture::square(config);
        match fx.builder().build() {
            BuildOutcome::Failed(f) => {
                assert_eq!(
                    f.reason,
                    FailureKind::SeedRejected(Rejection::SeparationViolation)
                );
                assert!(f.partial_points.is_empty());
                assert!(f.failing_point.is_some());
            }
            BuildOutcome::Closed(_) => panic!("narrow band should not close"),
        }
    }

    #[test]
    fn test_max_points_exceeded() {
        let fx = Fixture::square(NestingConfig::default().with_max_points(5));
        match fx.builder().build() {
            BuildOutcome::Failed(f) => {
                assert_eq!(f.reason, FailureKind::MaxPointsExceeded);
                assert_eq!(f.partial_points.len(), 5);
            }
            BuildOutcome::Closed(_) => panic!("5 points cannot close this curve"),
        }
    }

    #[test]
    fn test_close_direct() {
        let fx = Fixture::square(NestingConfig::default());
        let points = open_ring(&[(2.0, 7.0), (2.0, 6.0), (2.0, 5.0), (2.0, 4.0), (2.0, 3.0)]);
        let n = points.len();

        match fx.builder().advance(BuildState::Closing { points }) {
            BuildState::Closed(curve) => assert_eq!(curve.len(), n),
            other => panic!("expected closure, got {:?}", other),
        }
    }

    #[test]
    fn test_close_with_backoff() {
        let fx = Fixture::square(NestingConfig::default());
        // Gap of 2.1 from (2, 4.1): dropping it leaves a gap of 3 from (2, 5)
        let points = open_ring(&[(2.0, 7.0), (2.0, 6.0), (2.0, 5.0), (2.0, 4.1)]);
        let n = points.len();

        let curve = match fx.builder().advance(BuildState::Closing { points }) {
            BuildState::Closed(curve) => curve,
            other => panic!("expected closure, got {:?}", other),
        };

        assert_eq!(curve.len(), n - 1 + 2);
        assert_relative_eq!(curve.point(n - 1).y, 4.0, epsilon = 1e-9);
        assert_relative_eq!(curve.point(n).y, 3.0, epsilon = 1e-9);
        for len in curve.edge_lengths() {
            assert!((len - 1.0).abs() <= 0.25 + 1e-9);
        }
    }

    #[test]
    fn test_closing_splits() {
        let config = NestingConfig::default();
        assert_eq!(closing_splits(3.0, &config), vec![3]);
        // 1.6 / 2 = 0.8 fits, 1.6 / 1 does not
        assert_eq!(closing_splits(1.6, &config), vec![2]);
        // Neither 1.4 nor 0.7 is within tolerance
        assert!(closing_splits(1.4, &config).is_empty());
        // 2.5 / 3 is closer to 1 than 2.5 / 2
        assert_eq!(closing_splits(2.5, &config), vec![3, 2]);
    }
}
