use thiserror::Error;

/// Failures surfaced by the numeric core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumericError {
    /// Malformed textual or serialised input.
    #[error("Invalid numeric format: {0}")]
    Format(String),
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Modulus must be positive")]
    InvalidModulus,
    #[error("Negative exponent {0}")]
    InvalidExponent(i64),
    #[error("Value is not invertible for the given modulus")]
    NotInvertible,
    /// Division with [`RoundingMode::Unnecessary`](super::RoundingMode::Unnecessary) left a remainder.
    #[error("Rounding necessary")]
    InexactResult,
    #[error("Invalid cast: {0}")]
    InvalidCast(String),
    /// A scale or power of ten beyond what a decimal may carry.
    #[error("Out of range: {0}")]
    OutOfRange(String),
}
