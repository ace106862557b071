//! Error types for the state-feedback engine.

use thiserror::Error;

/// Errors produced by plants, loops and gain files.
#[derive(Debug, Error)]
pub enum ControlError {
    /// A command outside the actuator's hardware range reached the plant.
    ///
    /// This is a controller defect: the loop is expected to cap its output
    /// before it is applied.
    #[error("saturation violation: U[{index}] = {value} outside [{min}, {max}]")]
    SaturationViolation {
        /// Input component that violated its range.
        index: usize,
        /// Offending command value.
        value: f64,
        /// Lower hardware bound for that input.
        min: f64,
        /// Upper hardware bound for that input.
        max: f64,
    },

    /// A matrix read from untyped data has the wrong number of elements.
    #[error("dimension mismatch for {matrix}: expected {expected} elements, got {actual}")]
    DimensionMismatch {
        /// Matrix name (`A`, `B`, `L`, ...).
        matrix: &'static str,
        /// Element count implied by the requested dimensions.
        expected: usize,
        /// Element count actually supplied.
        actual: usize,
    },

    /// Loaded input bounds with `U_min > U_max`.
    #[error("invalid input bounds: U_min[{index}] = {min} > U_max[{index}] = {max}")]
    InvalidBounds {
        /// Input component with inverted bounds.
        index: usize,
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },

    /// A schedule was built without any entries.
    #[error("schedule must contain at least one entry")]
    EmptySchedule,

    /// Reading or writing a gain file failed.
    #[error("gain file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A gain file is not valid TOML or does not match the expected layout.
    #[error("failed to parse gain file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A gain schedule could not be rendered as TOML.
    #[error("failed to serialize gain schedule: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl ControlError {
    /// Creates a saturation violation error.
    #[must_use]
    pub const fn saturation_violation(index: usize, value: f64, min: f64, max: f64) -> Self {
        Self::SaturationViolation {
            index,
            value,
            min,
            max,
        }
    }

    /// Creates a dimension mismatch error.
    #[must_use]
    pub const fn dimension_mismatch(matrix: &'static str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            matrix,
            expected,
            actual,
        }
    }
}

/// Result type for state-feedback operations.
pub type Result<T> = std::result::Result<T, ControlError>;
