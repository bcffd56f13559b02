//! Nesting orchestrator.

use crate::builder::{BuildOutcome, CurveBuilder};
use crate::movement::MovementEngine;
use crate::spatial_index::EdgeIndex;
use crate::validator::SafetyValidator;
use u_contour_core::progress::{CurveGenerator, ProgressCallback, ProgressInfo};
use u_contour_core::{
    Curve, CurveSet, Error, FailureReport, GenerationResult, GenerationStatus, NestingConfig,
    Result,
};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Generates a sequence of nested curves inside a reference curve.
///
/// Each curve is built inside the previous one and checked against every
/// curve before it. The first curve that fails ends the run; there is no retry
/// from another starting position.
pub struct CurveNester {
    config: NestingConfig,
    cancelled: Arc<AtomicBool>,
}

impl CurveNester {
    /// Creates a new nester with the given configuration.
    pub fn new(config: NestingConfig) -> Self {
        Self {
            config,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Creates a nester with default configuration.
    pub fn default_config() -> Self {
        Self::new(NestingConfig::default())
    }

    /// Shared cancellation flag.
    ///
    /// Setting it stops generation before the next curve starts. The flag is
    /// cleared when a run begins.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    fn run(&self, reference: &Curve, callback: Option<&ProgressCallback>) -> Result<GenerationResult> {
        self.config.validate()?;
        validate_reference(reference)?;

        // Reset cancellation flag
        self.cancelled.store(false, Ordering::Relaxed);

        let start = Instant::now();
        let total = self.config.max_curve_count;
        let mut curves = CurveSet::new(reference.clone().into_ccw());
        let mut history = EdgeIndex::from_curve_set(&curves);

        if let Some(callback) = callback {
            callback(
                ProgressInfo::new()
                    .with_phase("Generating")
                    .with_curve(0, total)
                    .with_elapsed(0),
            );
        }

        let status = self.generate_curves(&mut curves, &mut history, callback, start);

        let elapsed = start.elapsed().as_millis() as u64;
        match &status {
            GenerationStatus::Complete => {
                log::info!("generated {} curves in {} ms", total, elapsed)
            }
            GenerationStatus::Cancelled => log::warn!(
                "generation cancelled after {} of {} curves",
                curves.len() - 1,
                total
            ),
            GenerationStatus::Failed(report) => log::warn!("generation stopped: {}", report),
        }

        if let Some(callback) = callback {
            let phase = match &status {
                GenerationStatus::Complete => "Complete",
                GenerationStatus::Cancelled => "Cancelled",
                GenerationStatus::Failed(_) => "Failed",
            };
            callback(
                ProgressInfo::new()
                    .with_phase(phase)
                    .with_curve(curves.len() - 1, total)
                    .with_points(curves.innermost().len())
                    .with_elapsed(elapsed)
                    .finished(),
            );
        }

        Ok(GenerationResult {
            curves,
            status,
            computation_time_ms: elapsed,
        })
    }

    fn generate_curves(
        &self,
        curves: &mut CurveSet,
        history: &mut EdgeIndex,
        callback: Option<&ProgressCallback>,
        start: Instant,
    ) -> GenerationStatus {
        let total = self.config.max_curve_count;

        for curve_index in 1..=total {
            if self.cancelled.load(Ordering::Relaxed) {
                return GenerationStatus::Cancelled;
            }

            let outcome = {
                let validator = SafetyValidator::new(&self.config, curves.innermost(), history);
                CurveBuilder::new(MovementEngine::new(validator)).build()
            };

            match outcome {
                BuildOutcome::Closed(curve) => {
                    log::debug!(
                        "curve {} closed with {} points, area {:.3}",
                        curve_index,
                        curve.len(),
                        curve.area()
                    );
                    let points = curve.len();
                    history.insert_curve(&curve);
                    curves.push(curve);

                    if let Some(callback) = callback {
                        callback(
                            ProgressInfo::new()
                                .with_phase("Curve closed")
                                .with_curve(curve_index, total)
                                .with_points(points)
                                .with_elapsed(start.elapsed().as_millis() as u64),
                        );
                    }
                }
                BuildOutcome::Failed(failure) => {
                    return GenerationStatus::Failed(FailureReport {
                        curve_index: curves.len(),
                        partial_points: failure.partial_points,
                        failing_point: failure.failing_point,
                        failing_edge: failure.failing_edge,
                        reason: failure.reason,
                    });
                }
            }
        }

        GenerationStatus::Complete
    }
}

impl CurveGenerator for CurveNester {
    fn config(&self) -> &NestingConfig {
        &self.config
    }

    fn generate(&self, reference: &Curve) -> Result<GenerationResult> {
        self.run(reference, None)
    }

    fn generate_with_progress(
        &self,
        reference: &Curve,
        callback: ProgressCallback,
    ) -> Result<GenerationResult> {
        self.run(reference, Some(&callback))
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

/// Rejects a self-intersecting or zero-area reference curve.
fn validate_reference(reference: &Curve) -> Result<()> {
    let index = EdgeIndex::from_curves([reference]);
    if let Some((i, j)) = index.first_self_intersection(0) {
        return Err(Error::InvalidCurve(format!(
            "edges {} and {} intersect",
            i, j
        )));
    }
    if reference.orientation().is_collinear() {
        return Err(Error::InvalidCurve("curve encloses zero area".into()));
    }
    Ok(())
}

/// Generates nested curves inside `reference` with the given configuration.
///
/// Fails fast with an error for an invalid configuration or a degenerate,
/// self-intersecting, or zero-area reference curve. A clockwise reference is
/// reoriented to counter-clockwise, and that reoriented curve is element 0 of
/// the returned set.
pub fn generate_nested_curves(reference: &Curve, config: &NestingConfig) -> Result<GenerationResult> {
    CurveNester::new(config.clone()).generate(reference)
}
