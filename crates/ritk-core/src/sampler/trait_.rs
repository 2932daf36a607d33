//! Sampler trait and sample type.

use crate::spatial::Point;
use serde::{Deserialize, Serialize};

/// A fixed-image physical point and the fixed intensity at it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageSample<const D: usize> {
    pub point: Point<D>,
    pub value: f64,
}

impl<const D: usize> ImageSample<D> {
    pub fn new(point: Point<D>, value: f64) -> Self {
        Self { point, value }
    }
}

/// Produces the sample set of one metric evaluation.
pub trait ImageSampler<const D: usize>: Send + Sync {
    /// Refresh the sample set and return it.
    fn update(&mut self) -> &[ImageSample<D>];
}
