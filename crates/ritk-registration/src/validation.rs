//! Validation utilities for metric evaluation.
//!
//! Sample-count validation decides whether enough samples survived the
//! per-sample gates for an evaluation to be meaningful. The free functions
//! check caller input before any sample is touched.

use serde::{Deserialize, Serialize};
use crate::error::{RegistrationError, Result};

/// Default fraction of samples that must be valid.
pub const DEFAULT_REQUIRED_RATIO: f64 = 0.25;

/// Mask weight sums below this are treated as no valid samples.
pub const DEFAULT_MINIMUM_MASK_WEIGHT: f64 = 1e-14;

/// Decides whether an evaluation had enough valid samples.
pub trait SampleCountValidator: Send + Sync {
    /// `Ok` when `counted` out of `total` samples, with total mask weight
    /// `mask_weight_sum`, are enough to finalize the evaluation.
    fn check(&self, total: usize, counted: usize, mask_weight_sum: f64) -> Result<()>;

    /// Check the validator's own settings.
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Requires a minimum fraction of valid samples and a non-vanishing mask
/// weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequiredRatioValidator {
    /// Minimum `counted / total`.
    pub required_ratio: f64,
    /// Minimum accumulated mask weight.
    pub minimum_mask_weight: f64,
}

impl Default for RequiredRatioValidator {
    fn default() -> Self {
        Self {
            required_ratio: DEFAULT_REQUIRED_RATIO,
            minimum_mask_weight: DEFAULT_MINIMUM_MASK_WEIGHT,
        }
    }
}

impl RequiredRatioValidator {
    /// Create a new validator with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the required fraction of valid samples.
    pub fn with_required_ratio(mut self, ratio: f64) -> Self {
        self.required_ratio = ratio;
        self
    }

    /// Set the minimum accumulated mask weight.
    pub fn with_minimum_mask_weight(mut self, weight: f64) -> Self {
        self.minimum_mask_weight = weight;
        self
    }
}

impl SampleCountValidator for RequiredRatioValidator {
    fn check(&self, total: usize, counted: usize, mask_weight_sum: f64) -> Result<()> {
        let required = self.required_ratio * total as f64;
        if (counted as f64) < required || mask_weight_sum < self.minimum_mask_weight {
            tracing::warn!(
                total,
                counted,
                mask_weight_sum,
                required_ratio = self.required_ratio,
                "Rejecting evaluation: too few valid samples"
            );
            return Err(RegistrationError::insufficient_samples(total, counted, mask_weight_sum));
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.required_ratio) {
            return Err(RegistrationError::invalid_configuration(format!(
                "Required sample ratio must be within [0, 1], got {}",
                self.required_ratio
            )));
        }
        if !(self.minimum_mask_weight >= 0.0) {
            return Err(RegistrationError::invalid_configuration(format!(
                "Minimum mask weight must be non-negative, got {}",
                self.minimum_mask_weight
            )));
        }
        Ok(())
    }
}

/// Validate a parameter vector length against the transform.
pub fn validate_parameter_count(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(RegistrationError::parameter_count_mismatch(expected, actual));
    }
    Ok(())
}

/// Validate a limiter range ratio.
pub fn validate_limit_range_ratio(ratio: f64) -> Result<()> {
    if !(ratio >= 0.0 && ratio.is_finite()) {
        return Err(RegistrationError::invalid_configuration(format!(
            "Limit range ratio must be non-negative, got {}",
            ratio
        )));
    }
    Ok(())
}
