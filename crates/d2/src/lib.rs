//! # U-Contour 2D
//!
//! Constrained nested-curve generation inside a closed 2D reference curve.
//!
//! Starting from a supplied reference curve, each new curve is grown point by
//! point inside the previous one. Every point keeps a bounded distance from
//! the containing curve, every edge has a near-constant length, and no edge
//! touches any earlier curve or its own non-adjacent edges. When a curve
//! cannot be completed, generation stops and reports why.
//!
//! ## Pipeline
//!
//! | Module | Role |
//! |--------|------|
//! | [`kernel`] | Point-in-curve, distance, segment intersection, tangents and normals |
//! | [`validator`] | Single admissibility gate for candidate points |
//! | [`movement`] | Base proposal plus a fixed set of angular alternatives |
//! | [`builder`] | Seeding / Growing / Closing state machine for one curve |
//! | [`nester`] | Curve sequence, cancellation and progress reporting |
//! | [`analysis`] | Segment statistics and an invariant audit of finished sets |
//!
//! ## Quick Start
//!
//! ```rust
//! use u_contour_d2::{generate_nested_curves, Curve, NestingConfig};
//!
//! let square = Curve::rectangle(10.0, 10.0).unwrap();
//! let config = NestingConfig::new()
//!     .with_segment_length(1.0)
//!     .with_tolerance(0.25)
//!     .with_separation(1.0, 2.0, 3.0)
//!     .with_inter_curve_distance(2.0);
//!
//! let result = generate_nested_curves(&square, &config).unwrap();
//! assert!(result.is_complete());
//! println!("inner curve has {} points", result.curves.innermost().len());
//! ```
//!
//! ## Failures
//!
//! ```rust
//! use u_contour_d2::{generate_nested_curves, Curve, NestingConfig};
//!
//! let square = Curve::rectangle(10.0, 10.0).unwrap();
//! // A 0.01-wide separation band cannot be held with unit steps
//! let config = NestingConfig::new().with_separation(0.01, 0.015, 0.02);
//!
//! let result = generate_nested_curves(&square, &config).unwrap();
//! let report = result.failure().unwrap();
//! println!("{}", report);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization support
//! - `parallel`: Evaluate the angular alternatives of a step with rayon

pub mod analysis;
pub mod builder;
pub mod kernel;
pub mod movement;
pub mod nester;
pub mod spatial_index;
pub mod validator;

// Re-exports
pub use analysis::{audit_curve_set, InvariantViolation, SegmentStats};
pub use builder::{BuildOutcome, BuildState, CurveBuilder, CurveFailure};
pub use movement::{MovementEngine, StepOutcome};
pub use nester::{generate_nested_curves, CurveNester};
pub use spatial_index::{EdgeEntry, EdgeIndex};
pub use validator::{SafetyValidator, Verdict};
pub use u_contour_core::{
    Curve, CurveGenerator, CurveSet, Error, FailureKind, FailureReport, GenerationResult,
    GenerationStatus, GenerationSummary, NestingConfig, Orientation, Point, ProgressCallback,
    ProgressInfo, Rejection, Result,
};
