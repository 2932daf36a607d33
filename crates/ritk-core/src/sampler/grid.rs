//! Regular-grid subsampling.

use crate::image::ImageBuffer;
use super::trait_::{ImageSample, ImageSampler};

/// Every `step[d]`-th pixel along each axis, starting at index 0.
#[derive(Debug, Clone)]
pub struct GridSampler<const D: usize> {
    samples: Vec<ImageSample<D>>,
}

impl<const D: usize> GridSampler<D> {
    /// # Panics
    /// Panics if any step is zero.
    pub fn new(image: &ImageBuffer<D>, step: [usize; D]) -> Self {
        assert!(step.iter().all(|&s| s > 0), "Grid step must be positive, got {:?}", step);
        let samples = (0..image.len())
            .map(|offset| image.index_of(offset))
            .filter(|index| (0..D).all(|d| index[d] % step[d] == 0))
            .map(|index| ImageSample::new(image.physical_point_of(index), image.get(index)))
            .collect();
        Self { samples }
    }
}

impl<const D: usize> ImageSampler<D> for GridSampler<D> {
    fn update(&mut self) -> &[ImageSample<D>] {
        &self.samples
    }
}
