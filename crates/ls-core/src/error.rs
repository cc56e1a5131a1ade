//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]`.

use thiserror::Error;

/// Errors produced by geometry operations and configuration validation.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("polyline needs at least 2 distinct points, got {0}")]
    TooFewPoints(usize),

    #[error("polyline point is not finite: ({x}, {y})")]
    NonFinitePoint { x: f64, y: f64 },

    #[error("range [{start}, {end}] is empty or outside line of length {length}")]
    InvalidRange { start: f64, end: f64, length: f64 },

    #[error("distance {distance} is outside line of length {length}")]
    OutOfBounds { distance: f64, length: f64 },

    #[error("lines are {gap} apart, exceeding tolerance {tolerance}")]
    Disjoint { gap: f64, tolerance: f64 },

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `ls-core`.
pub type CoreResult<T> = Result<T, CoreError>;
