//! Error types.
//!
//! Only conditions that make a generation run impossible to start are errors.
//! Point rejections and curve failures are ordinary outcomes and live in
//! [`crate::result`].

use thiserror::Error;

/// Errors raised before any curve generation starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A configuration parameter is out of range or the separation bounds are
    /// not ordered `min < target < max`.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A curve is degenerate: too few points, non-finite coordinates,
    /// repeated consecutive points, zero area, or self-intersecting.
    #[error("invalid curve: {0}")]
    InvalidCurve(String),
}

/// Result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;
