//! Error taxonomy for geometry construction and shape mutation.
//!
//! Invalid input (bad colors, non-positive dimensions, empty geometry) is
//! surfaced as an `Err` from the function that received it; callers decide
//! what to do. Geometric degeneracies that have a documented fallback
//! (identity rotations, parallel alignment vectors) are not errors.

use thiserror::Error;

/// Failure modes of the factory, shape and math layers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// A shape needs at least one triangle or line.
    #[error("a shape needs at least one triangle or line")]
    EmptyShape,

    /// A color component was outside [0, 1].
    #[error("invalid color: every component must lie in [0, 1]")]
    InvalidColor,

    /// A color collection had a length the constructor does not accept.
    #[error("invalid color count {got}: expected one of {expected:?}")]
    InvalidColorCount {
        /// Accepted lengths for this constructor.
        expected: &'static [usize],
        /// Length that was supplied.
        got: usize,
    },

    /// A vector was too short to define a direction.
    #[error("degenerate vector: length below 1e-9")]
    DegenerateVector,

    /// A size, radius or extent was not strictly positive.
    #[error("invalid dimension: {0} must be positive")]
    InvalidDimension(&'static str),

    /// A count (corners, points, parts) was out of range.
    #[error("invalid count: {0}")]
    InvalidCount(&'static str),
}
