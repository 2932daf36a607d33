//! Intensity extrema of an image.
//!
//! Besides the true minimum and maximum, an estimator reports *limited*
//! extrema: the true range widened on both sides by `limit_range_ratio`
//! times its width. Metrics use the limited range to bound intensities that
//! an interpolator may overshoot to.

use burn::tensor::backend::Backend;
use burn::tensor::ElementConversion;
use serde::{Deserialize, Serialize};
use crate::image::{Image, ImageBuffer};

/// Default widening ratio for the limited range.
pub const DEFAULT_LIMIT_RANGE_RATIO: f64 = 0.01;

/// Intensity range of an image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageExtrema {
    pub true_min: f64,
    pub true_max: f64,
    pub limited_min: f64,
    pub limited_max: f64,
}

impl ImageExtrema {
    /// Build extrema from the true range, widening by `limit_range_ratio`.
    pub fn from_range(true_min: f64, true_max: f64, limit_range_ratio: f64) -> Self {
        let margin = limit_range_ratio * (true_max - true_min);
        Self {
            true_min,
            true_max,
            limited_min: true_min - margin,
            limited_max: true_max + margin,
        }
    }

    /// Width of the true range.
    pub fn range(&self) -> f64 {
        self.true_max - self.true_min
    }
}

/// Source of [`ImageExtrema`] for a whole image.
pub trait ExtremaEstimator: Send + Sync {
    /// Compute the extrema over the full image.
    fn compute_extrema(&self, limit_range_ratio: f64) -> ImageExtrema;
}

impl<B: Backend, const D: usize> ExtremaEstimator for Image<B, D> {
    fn compute_extrema(&self, limit_range_ratio: f64) -> ImageExtrema {
        let true_min = self.data().clone().min().into_scalar().elem::<f64>();
        let true_max = self.data().clone().max().into_scalar().elem::<f64>();
        ImageExtrema::from_range(true_min, true_max, limit_range_ratio)
    }
}

impl<const D: usize> ExtremaEstimator for ImageBuffer<D> {
    fn compute_extrema(&self, limit_range_ratio: f64) -> ImageExtrema {
        let (true_min, true_max) = self
            .data()
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        ImageExtrema::from_range(true_min, true_max, limit_range_ratio)
    }
}
