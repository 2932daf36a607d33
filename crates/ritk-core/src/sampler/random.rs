//! Uniform random subsampling.

use crate::image::ImageBuffer;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use super::trait_::{ImageSample, ImageSampler};

/// Draws `number_of_samples` pixels uniformly with replacement on every
/// update. Seeded, so a sequence of updates is reproducible.
#[derive(Debug, Clone)]
pub struct RandomSampler<const D: usize> {
    image: ImageBuffer<D>,
    number_of_samples: usize,
    rng: StdRng,
    samples: Vec<ImageSample<D>>,
}

impl<const D: usize> RandomSampler<D> {
    pub fn new(image: ImageBuffer<D>, number_of_samples: usize, seed: u64) -> Self {
        Self {
            image,
            number_of_samples,
            rng: StdRng::seed_from_u64(seed),
            samples: Vec::with_capacity(number_of_samples),
        }
    }

    pub fn number_of_samples(&self) -> usize {
        self.number_of_samples
    }
}

impl<const D: usize> ImageSampler<D> for RandomSampler<D> {
    fn update(&mut self) -> &[ImageSample<D>] {
        self.samples.clear();
        if self.image.is_empty() {
            return &self.samples;
        }
        for _ in 0..self.number_of_samples {
            let offset = self.rng.random_range(0..self.image.len());
            let index = self.image.index_of(offset);
            self.samples
                .push(ImageSample::new(self.image.physical_point_of(index), self.image.data()[offset]));
        }
        &self.samples
    }
}
