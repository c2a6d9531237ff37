//! Error type shared by the series accessor, indicators, and the feature engine.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureError {
    /// Index access beyond the series bounds. Indicates a windowing bug.
    #[error("index {index} out of range for series of length {len}")]
    OutOfRange { index: usize, len: usize },

    /// `lookback` or `window` is not smaller than the series length.
    #[error("{param} = {value} needs more history than the {len} bars available")]
    InsufficientHistory {
        param: &'static str,
        value: usize,
        len: usize,
    },

    /// Zero price range, zero average loss, or a zero divisor inside a window.
    ///
    /// Never escapes the engine: each indicator resolves it through its
    /// saturation or sentinel policy before output.
    #[error("degenerate window in {indicator} at bar {index}")]
    DegenerateWindow { indicator: String, index: usize },

    /// A module produced a vector whose length differs from the series.
    #[error("column '{column}' has {actual} values, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("series is empty")]
    EmptySeries,

    #[error("dates not strictly increasing at bar {index}")]
    UnorderedDates { index: usize },

    #[error("bar {index} is invalid: {reason}")]
    InvalidBar { index: usize, reason: String },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("unknown column: {0}")]
    UnknownColumn(String),
}
