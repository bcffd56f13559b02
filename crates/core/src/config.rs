//! Generation configuration.

use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters controlling nested-curve generation.
///
/// All distances share the unit of the reference curve's coordinates.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NestingConfig {
    /// Nominal edge length of generated curves.
    pub segment_length: f64,

    /// Allowed deviation of any generated edge from `segment_length`.
    pub segment_length_tolerance: f64,

    /// Preferred distance of generated points from the containing curve.
    pub target_separation: f64,

    /// Smallest admissible distance from the containing curve (inclusive).
    pub min_separation: f64,

    /// Largest admissible distance from the containing curve (inclusive).
    pub max_separation: f64,

    /// Inward offset of each curve's seed point from the containing curve.
    pub inter_curve_distance: f64,

    /// Upper bound on the number of points in one curve.
    pub max_points_per_curve: usize,

    /// Number of curves to generate inside the reference curve.
    pub max_curve_count: usize,
}

impl Default for NestingConfig {
    fn default() -> Self {
        Self {
            segment_length: 1.0,
            segment_length_tolerance: 0.25,
            target_separation: 2.0,
            min_separation: 1.0,
            max_separation: 3.0,
            inter_curve_distance: 2.0,
            max_points_per_curve: 10_000,
            max_curve_count: 1,
        }
    }
}

impl NestingConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the nominal segment length.
    pub fn with_segment_length(mut self, length: f64) -> Self {
        self.segment_length = length;
        self
    }

    /// Sets the segment length tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.segment_length_tolerance = tolerance;
        self
    }

    /// Sets the separation band as `(min, target, max)`.
    pub fn with_separation(mut self, min: f64, target: f64, max: f64) -> Self {
        self.min_separation = min;
        self.target_separation = target;
        self.max_separation = max;
        self
    }

    /// Sets the seed offset between consecutive curves.
    pub fn with_inter_curve_distance(mut self, distance: f64) -> Self {
        self.inter_curve_distance = distance;
        self
    }

    /// Sets the per-curve point limit.
    pub fn with_max_points(mut self, n: usize) -> Self {
        self.max_points_per_curve = n;
        self
    }

    /// Sets the number of curves to generate.
    pub fn with_curve_count(mut self, n: usize) -> Self {
        self.max_curve_count = n;
        self
    }

    /// Checks the configuration, failing fast on the first invalid parameter.
    pub fn validate(&self) -> Result<()> {
        let distances = [
            ("segment_length", self.segment_length),
            ("segment_length_tolerance", self.segment_length_tolerance),
            ("target_separation", self.target_separation),
            ("min_separation", self.min_separation),
            ("max_separation", self.max_separation),
            ("inter_curve_distance", self.inter_curve_distance),
        ];
        for (name, value) in distances {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{} must be positive and finite, got {}",
                    name, value
                )));
            }
        }

        if self.min_separation >= self.target_separation
            || self.target_separation >= self.max_separation
        {
            return Err(Error::InvalidConfig(format!(
                "separation must satisfy min < target < max, got {} / {} / {}",
                self.min_separation, self.target_separation, self.max_separation
            )));
        }

        if self.segment_length_tolerance >= self.segment_length {
            return Err(Error::InvalidConfig(format!(
                "segment_length_tolerance ({}) must be smaller than segment_length ({})",
                self.segment_length_tolerance, self.segment_length
            )));
        }

        if self.max_points_per_curve < 3 {
            return Err(Error::InvalidConfig(format!(
                "max_points_per_curve must be at least 3, got {}",
                self.max_points_per_curve
            )));
        }

        if self.max_curve_count == 0 {
            return Err(Error::InvalidConfig(
                "max_curve_count must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Returns true if `length` is within tolerance of the segment length.
    #[inline]
    pub fn accepts_segment_length(&self, length: f64) -> bool {
        (length - self.segment_length).abs() <= self.segment_length_tolerance
    }

    /// Returns true if `separation` lies in the closed admissible band.
    #[inline]
    pub fn accepts_separation(&self, separation: f64) -> bool {
        separation >= self.min_separation && separation <= self.max_separation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(NestingConfig::default().validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = NestingConfig::new()
            .with_segment_length(2.0)
            .with_tolerance(0.5)
            .with_separation(1.5, 3.0, 4.5)
            .with_inter_curve_distance(3.0)
            .with_max_points(500)
            .with_curve_count(5);

        assert_eq!(config.segment_length, 2.0);
        assert_eq!(config.segment_length_tolerance, 0.5);
        assert_eq!(config.min_separation, 1.5);
        assert_eq!(config.target_separation, 3.0);
        assert_eq!(config.max_separation, 4.5);
        assert_eq!(config.inter_curve_distance, 3.0);
        assert_eq!(config.max_points_per_curve, 500);
        assert_eq!(config.max_curve_count, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_unordered_separation() {
        let cases = [
            (3.0, 2.0, 4.0), // min > target
            (2.0, 2.0, 4.0), // min == target
            (1.0, 3.0, 3.0), // target == max
            (1.0, 4.0, 3.0), // target > max
            (3.0, 2.0, 1.0), // reversed
        ];
        for (min, target, max) in cases {
            let config = NestingConfig::new().with_separation(min, target, max);
            assert!(
                matches!(config.validate(), Err(Error::InvalidConfig(_))),
                "accepted {} / {} / {}",
                min,
                target,
                max
            );
        }
    }

    #[test]
    fn test_rejects_non_positive_distances() {
        assert!(NestingConfig::new().with_segment_length(0.0).validate().is_err());
        assert!(NestingConfig::new().with_segment_length(f64::NAN).validate().is_err());
        assert!(NestingConfig::new().with_tolerance(-0.1).validate().is_err());
        assert!(NestingConfig::new()
            .with_inter_curve_distance(0.0)
            .validate()
            .is_err());
        assert!(NestingConfig::new()
            .with_separation(-1.0, 2.0, 3.0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_rejects_tolerance_not_below_length() {
        let config = NestingConfig::new().with_segment_length(1.0).with_tolerance(1.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_counts() {
        assert!(NestingConfig::new().with_max_points(2).validate().is_err());
        assert!(NestingConfig::new().with_curve_count(0).validate().is_err());
    }

    #[test]
    fn test_acceptance_bands_are_closed() {
        let config = NestingConfig::default();
        assert!(config.accepts_separation(1.0));
        assert!(config.accepts_separation(3.0));
        assert!(!config.accepts_separation(0.999));
        assert!(config.accepts_segment_length(1.25));
        assert!(config.accepts_segment_length(0.75));
        assert!(!config.accepts_segment_length(1.3));
    }
}
