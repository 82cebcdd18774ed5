// src/error.rs
use std::fmt;

/// Error types for the bsm-mc library
///
/// Numeric overflow inside a simulation is deliberately absent: an
/// overflowing path yields an infinite or NaN estimate rather than an error.
#[derive(Debug, Clone)]
pub enum McError {
    /// Invalid market parameter values
    InvalidParameters {
        parameter: String,
        value: f64,
        constraint: String,
    },

    /// Invalid simulation configuration
    InvalidConfiguration { field: String, reason: String },

    /// The full path matrix could not be allocated
    AllocationFailure {
        paths: usize,
        points: usize,
        reason: String,
    },

    /// A dedicated worker pool could not be built
    ThreadPool { reason: String },

    /// A configuration document could not be read or parsed
    ConfigLoad { source_name: String, reason: String },

    /// Sample path export failed
    Export { path: String, reason: String },
}

impl fmt::Display for McError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            McError::InvalidParameters {
                parameter,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "Invalid parameter '{}' = {}: {}",
                    parameter, value, constraint
                )
            }
            McError::InvalidConfiguration { field, reason } => {
                write!(f, "Invalid configuration for '{}': {}", field, reason)
            }
            McError::AllocationFailure {
                paths,
                points,
                reason,
            } => {
                write!(
                    f,
                    "Cannot allocate path matrix of {} paths x {} points: {}",
                    paths, points, reason
                )
            }
            McError::ThreadPool { reason } => {
                write!(f, "Failed to build worker pool: {}", reason)
            }
            McError::ConfigLoad {
                source_name,
                reason,
            } => {
                write!(f, "Failed to load configuration from {}: {}", source_name, reason)
            }
            McError::Export { path, reason } => {
                write!(f, "Failed to export sample paths to {}: {}", path, reason)
            }
        }
    }
}

impl std::error::Error for McError {}

/// Result type alias for bsm-mc operations
pub type McResult<T> = Result<T, McError>;

/// Validation utilities
pub mod validation {
    use super::{McError, McResult};

    /// Validate that a parameter is positive and finite
    pub fn validate_positive(name: &str, value: f64) -> McResult<()> {
        validate_finite(name, value)?;
        if value <= 0.0 {
            Err(McError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be positive (> 0)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a parameter is non-negative and finite
    pub fn validate_non_negative(name: &str, value: f64) -> McResult<()> {
        validate_finite(name, value)?;
        if value < 0.0 {
            Err(McError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be non-negative (≥ 0)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a value is finite and not NaN
    pub fn validate_finite(name: &str, value: f64) -> McResult<()> {
        if !value.is_finite() {
            Err(McError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be finite (not NaN or infinite)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a count field is at least 1
    ///
    /// There is no upper bound: the fast engine runs in constant memory and
    /// the full engine reports an oversized path matrix as
    /// [`McError::AllocationFailure`].
    pub fn validate_count(field: &str, count: usize) -> McResult<()> {
        if count == 0 {
            Err(McError::InvalidConfiguration {
                field: field.to_string(),
                reason: "must be greater than 0".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate paths count
    pub fn validate_paths(paths: usize) -> McResult<()> {
        validate_count("paths", paths)
    }

    /// Validate steps count
    pub fn validate_steps(steps: usize) -> McResult<()> {
        validate_count("steps", steps)
    }
}
