//! Intensity-range normalization of squared differences.
//!
//! Squared intensity differences scale with the square of the intensity
//! range. Normalizing by the largest possible difference between the two
//! images makes metric values (and the step sizes an optimizer needs)
//! comparable across image pairs.

use ritk_core::filter::ImageExtrema;
use crate::error::{RegistrationError, Result};

/// Value a maximal difference maps to after normalization.
pub const NORMALIZATION_SCALE: f64 = 100.0;

/// Normalization factor `100 / maxdiff^2` for a fixed/moving pair, where
/// `maxdiff` is the larger of `fixed_max - moving_min` and
/// `moving_max - fixed_min`.
///
/// Fails with [`RegistrationError::DegenerateNormalization`] when both
/// images are the same constant (or the ranges are otherwise unusable).
pub fn calibrate(fixed: &ImageExtrema, moving: &ImageExtrema) -> Result<f64> {
    let diff1 = fixed.true_max - moving.true_min;
    let diff2 = moving.true_max - fixed.true_min;
    let max_difference = diff1.max(diff2);

    let factor = NORMALIZATION_SCALE / max_difference / max_difference;
    if !(max_difference > 0.0) || !factor.is_finite() {
        return Err(RegistrationError::degenerate_normalization(max_difference));
    }
    Ok(factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_ranges() {
        let range = ImageExtrema::from_range(0.0, 100.0, 0.01);
        assert!((calibrate(&range, &range).unwrap() - 0.01).abs() < 1e-15);
    }

    #[test]
    fn test_offset_ranges() {
        let fixed = ImageExtrema::from_range(0.0, 10.0, 0.0);
        let moving = ImageExtrema::from_range(-10.0, 5.0, 0.0);
        // maxdiff = max(10 - -10, 5 - 0) = 20
        assert!((calibrate(&fixed, &moving).unwrap() - 0.25).abs() < 1e-15);
    }

    #[test]
    fn test_identical_constants_are_degenerate() {
        let constant = ImageExtrema::from_range(3.0, 3.0, 0.01);
        assert!(matches!(
            calibrate(&constant, &constant),
            Err(RegistrationError::DegenerateNormalization { .. })
        ));
    }

    #[test]
    fn test_distinct_constants_are_fine() {
        let fixed = ImageExtrema::from_range(1.0, 1.0, 0.0);
        let moving = ImageExtrema::from_range(3.0, 3.0, 0.0);
        assert!((calibrate(&fixed, &moving).unwrap() - 25.0).abs() < 1e-12);
    }
}
