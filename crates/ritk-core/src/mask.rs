//! Spatial masks.
//!
//! A mask assigns every physical point a weight in `[0, 1]` (soft masks may
//! take any value in between) together with its spatial gradient. Metrics
//! weight each sample's contribution by the mask value at the mapped point.

use crate::image::{Image, ImageBuffer};
use crate::interpolation::{Interpolator, LinearInterpolator};
use crate::spatial::{Point, Vector};
use burn::tensor::backend::Backend;

/// Mask weight evaluated at physical points.
pub trait MaskEvaluator<const D: usize>: Send + Sync {
    /// Mask weight at `point`.
    fn value(&self, point: &Point<D>) -> f64;

    /// Mask weight and its gradient with respect to physical coordinates.
    fn value_and_derivative(&self, point: &Point<D>) -> (f64, Vector<D>);
}

/// The mask that accepts everything with weight 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformMask;

impl<const D: usize> MaskEvaluator<D> for UniformMask {
    fn value(&self, _point: &Point<D>) -> f64 {
        1.0
    }

    fn value_and_derivative(&self, _point: &Point<D>) -> (f64, Vector<D>) {
        (1.0, Vector::zeros())
    }
}

/// Mask backed by an image, linearly interpolated.
///
/// Binary mask images give a soft edge one pixel wide; points outside the
/// mask image have weight 0 and zero gradient.
#[derive(Debug, Clone)]
pub struct ImageMask<const D: usize> {
    interpolator: LinearInterpolator<D>,
}

impl<const D: usize> ImageMask<D> {
    /// Mask from a host-side buffer of weights.
    pub fn new(buffer: ImageBuffer<D>) -> Self {
        Self {
            interpolator: LinearInterpolator::new(buffer),
        }
    }

    /// Mask from a tensor image of weights.
    pub fn from_image<B: Backend>(image: &Image<B, D>) -> Self {
        Self::new(image.to_buffer())
    }
}

impl<const D: usize> MaskEvaluator<D> for ImageMask<D> {
    fn value(&self, point: &Point<D>) -> f64 {
        self.interpolator.evaluate(point).unwrap_or(0.0)
    }

    fn value_and_derivative(&self, point: &Point<D>) -> (f64, Vector<D>) {
        self.interpolator
            .evaluate_with_derivative(point)
            .unwrap_or((0.0, Vector::zeros()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageGeometry;

    #[test]
    fn test_uniform_mask() {
        let mask = UniformMask;
        let (value, gradient) = MaskEvaluator::<3>::value_and_derivative(&mask, &Point::new([1e9, -4.0, 0.0]));
        assert_eq!(value, 1.0);
        assert_eq!(gradient, Vector::zeros());
    }

    #[test]
    fn test_image_mask_soft_edge() {
        let buffer = ImageBuffer::from_fn([4, 1], ImageGeometry::default(), |[i, _]| if i < 2 { 1.0 } else { 0.0 });
        let mask = ImageMask::new(buffer);
        assert_eq!(mask.value(&Point::new([0.5, 0.0])), 1.0);
        let (value, gradient) = mask.value_and_derivative(&Point::new([1.25, 0.0]));
        assert!((value - 0.75).abs() < 1e-12);
        assert!((gradient[0] + 1.0).abs() < 1e-12);
        assert_eq!(mask.value(&Point::new([7.0, 0.0])), 0.0);
    }
}
