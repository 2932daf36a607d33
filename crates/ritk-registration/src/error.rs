//! Error types for registration operations.
//!
//! Rejected samples are not errors: a sample that maps outside the moving
//! image, the mask or the transform support simply does not contribute.
//! Errors are reserved for conditions that make a whole evaluation invalid.

use thiserror::Error;

/// Main error type for registration operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistrationError {
    /// Too few samples survived the validity gates.
    #[error(
        "Too many samples map outside moving image buffer: {counted} / {total} \
         (mask weight sum {mask_weight_sum})"
    )]
    InsufficientSamples {
        total: usize,
        counted: usize,
        mask_weight_sum: f64,
    },

    /// Image intensity ranges give no usable normalization factor.
    #[error("Degenerate normalization: maximum intensity difference is {max_difference}")]
    DegenerateNormalization { max_difference: f64 },

    /// Parameter vector length does not match the transform.
    #[error("Parameter count mismatch: expected {expected}, got {actual}")]
    ParameterCountMismatch { expected: usize, actual: usize },

    /// Evaluation requested before `initialize`.
    #[error("Metric is not initialized")]
    NotInitialized,

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Result type for registration operations.
pub type Result<T> = std::result::Result<T, RegistrationError>;

impl RegistrationError {
    /// Create an insufficient samples error.
    pub fn insufficient_samples(total: usize, counted: usize, mask_weight_sum: f64) -> Self {
        Self::InsufficientSamples {
            total,
            counted,
            mask_weight_sum,
        }
    }

    /// Create a degenerate normalization error.
    pub fn degenerate_normalization(max_difference: f64) -> Self {
        Self::DegenerateNormalization { max_difference }
    }

    /// Create a parameter count mismatch error.
    pub fn parameter_count_mismatch(expected: usize, actual: usize) -> Self {
        Self::ParameterCountMismatch { expected, actual }
    }

    /// Create an invalid configuration error.
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = RegistrationError::insufficient_samples(100, 3, 3.0);
        assert!(matches!(err, RegistrationError::InsufficientSamples { counted: 3, .. }));
    }

    #[test]
    fn test_error_display() {
        let err = RegistrationError::parameter_count_mismatch(6, 2);
        assert_eq!(err.to_string(), "Parameter count mismatch: expected 6, got 2");
    }

    #[test]
    fn test_insufficient_samples_display() {
        let err_str = RegistrationError::insufficient_samples(10, 1, 0.5).to_string();
        assert!(err_str.contains("1 / 10"));
        assert!(err_str.contains("0.5"));
    }
}
