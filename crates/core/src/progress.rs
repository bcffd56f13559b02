//! Progress reporting and the generator interface.

use crate::config::NestingConfig;
use crate::geometry::Curve;
use crate::result::GenerationResult;
use crate::Result;

/// Progress callback for long-running generation.
pub type ProgressCallback = Box<dyn Fn(ProgressInfo) + Send + Sync>;

/// Progress information reported between curves.
#[derive(Debug, Clone, Default)]
pub struct ProgressInfo {
    /// Index of the most recently closed curve (0 before the first one).
    pub curve_index: usize,
    /// Number of curves requested.
    pub total_curves: usize,
    /// Point count of the most recently closed curve.
    pub points_in_curve: usize,
    /// Elapsed time in milliseconds.
    pub elapsed_ms: u64,
    /// Current phase description.
    pub phase: String,
    /// Whether generation is still running.
    pub running: bool,
}

impl ProgressInfo {
    /// Creates a new progress info with default values.
    pub fn new() -> Self {
        Self {
            running: true,
            ..Default::default()
        }
    }

    /// Sets the curve counters.
    pub fn with_curve(mut self, current: usize, total: usize) -> Self {
        self.curve_index = current;
        self.total_curves = total;
        self
    }

    /// Sets the point count of the latest curve.
    pub fn with_points(mut self, points: usize) -> Self {
        self.points_in_curve = points;
        self
    }

    /// Sets the elapsed time.
    pub fn with_elapsed(mut self, elapsed_ms: u64) -> Self {
        self.elapsed_ms = elapsed_ms;
        self
    }

    /// Sets the phase description.
    pub fn with_phase(mut self, phase: impl Into<String>) -> Self {
        self.phase = phase.into();
        self
    }

    /// Marks generation as finished.
    pub fn finished(mut self) -> Self {
        self.running = false;
        self
    }

    /// Fraction of requested curves completed (0.0 to 1.0).
    pub fn progress_percent(&self) -> f64 {
        if self.total_curves > 0 {
            self.curve_index as f64 / self.total_curves as f64
        } else {
            0.0
        }
    }
}

/// Interface for nested-curve generators.
pub trait CurveGenerator {
    /// The configuration this generator runs with.
    fn config(&self) -> &NestingConfig;

    /// Generates nested curves inside `reference`.
    ///
    /// Returns `Err` only when the run cannot start (invalid configuration or
    /// degenerate reference). Curve failures are reported in the result.
    fn generate(&self, reference: &Curve) -> Result<GenerationResult>;

    /// Generates with a progress callback invoked after every closed curve.
    fn generate_with_progress(
        &self,
        reference: &Curve,
        callback: ProgressCallback,
    ) -> Result<GenerationResult>;

    /// Requests that generation stop before the next curve starts.
    fn cancel(&self);
}
