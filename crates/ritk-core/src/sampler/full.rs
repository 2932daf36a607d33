//! Sampler returning every pixel.

use crate::image::ImageBuffer;
use super::trait_::{ImageSample, ImageSampler};

/// Uses every pixel of the fixed image, or an explicit list of samples.
#[derive(Debug, Clone)]
pub struct FullSampler<const D: usize> {
    samples: Vec<ImageSample<D>>,
}

impl<const D: usize> FullSampler<D> {
    /// All pixels of `image`, in buffer order.
    pub fn new(image: &ImageBuffer<D>) -> Self {
        let samples = (0..image.len())
            .map(|offset| {
                let index = image.index_of(offset);
                ImageSample::new(image.physical_point_of(index), image.data()[offset])
            })
            .collect();
        Self { samples }
    }

    /// A fixed, caller-supplied sample set.
    pub fn from_samples(samples: Vec<ImageSample<D>>) -> Self {
        Self { samples }
    }

    pub fn samples(&self) -> &[ImageSample<D>] {
        &self.samples
    }
}

impl<const D: usize> ImageSampler<D> for FullSampler<D> {
    fn update(&mut self) -> &[ImageSample<D>] {
        &self.samples
    }
}
