//! Metric trait for image similarity measurement.
//!
//! Metrics are evaluated as functions of the transform parameters: the caller
//! (usually an optimizer) passes a parameter vector and receives the
//! dissimilarity and, optionally, its gradient with respect to every
//! parameter. Lower values indicate better alignment.

use serde::{Deserialize, Serialize};
use crate::error::Result;

/// Metric trait for measuring dissimilarity between images as a function of
/// transform parameters.
pub trait Metric {
    /// One-time setup before any evaluation (e.g. intensity normalization).
    fn initialize(&mut self) -> Result<()>;

    /// Length of the parameter vectors this metric accepts.
    fn number_of_parameters(&self) -> usize;

    /// Dissimilarity at `parameters`.
    fn get_value(&mut self, parameters: &[f64]) -> Result<f64>;

    /// Gradient of the dissimilarity at `parameters`.
    fn get_derivative(&mut self, parameters: &[f64]) -> Result<Vec<f64>> {
        self.get_value_and_derivative(parameters).map(|(_, derivative)| derivative)
    }

    /// Dissimilarity and its gradient at `parameters`, from one pass over
    /// the samples.
    fn get_value_and_derivative(&mut self, parameters: &[f64]) -> Result<(f64, Vec<f64>)>;

    /// Get the name of this metric.
    fn name(&self) -> &'static str;
}

/// Sample counters of a single evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleStatistics {
    /// Samples drawn.
    pub total: usize,
    /// Samples that passed every validity gate.
    pub counted: usize,
    /// Sum of the mask weights of counted samples.
    pub mask_weight_sum: f64,
}

impl SampleStatistics {
    /// Fraction of drawn samples that were counted.
    pub fn valid_fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.counted as f64 / self.total as f64
        }
    }
}

/// Result of a single evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub value: f64,
    /// Present when the derivative was requested.
    pub derivative: Option<Vec<f64>>,
    pub samples: SampleStatistics,
}
