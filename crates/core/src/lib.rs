//! # U-Contour Core
//!
//! Shared types for the U-Contour nested-curve generator.
//!
//! This crate holds the data model and infrastructure used by the 2D
//! generation engine in `u-contour-d2`: points and closed curves, exact
//! predicates, configuration, and the outcome types of a generation run.
//!
//! ## Core Components
//!
//! - **Geometry**: [`Point`], [`Curve`] with reference constructors and geo-backed measures
//! - **Predicates**: [`predicates`] - exact orientation, segment intersection, signed area
//! - **Configuration**: [`NestingConfig`] - segment length, separation band, limits
//! - **Results**: [`CurveSet`], [`GenerationResult`], [`FailureReport`], [`Rejection`]
//! - **Generator trait**: [`CurveGenerator`] with progress callbacks and cancellation
//!
//! ## Configuration
//!
//! ```rust
//! use u_contour_core::NestingConfig;
//!
//! let config = NestingConfig::new()
//!     .with_segment_length(1.0)
//!     .with_tolerance(0.25)
//!     .with_separation(1.0, 2.0, 3.0)
//!     .with_inter_curve_distance(2.0)
//!     .with_curve_count(3);
//!
//! assert!(config.validate().is_ok());
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization support

pub mod config;
pub mod error;
pub mod geometry;
pub mod predicates;
pub mod progress;
pub mod result;

// Re-exports
pub use config::NestingConfig;
pub use error::{Error, Result};
pub use geometry::{Curve, Point};
pub use predicates::Orientation;
pub use progress::{CurveGenerator, ProgressCallback, ProgressInfo};
pub use result::{
    CurveSet, FailureKind, FailureReport, GenerationResult, GenerationStatus, GenerationSummary,
    Rejection,
};
