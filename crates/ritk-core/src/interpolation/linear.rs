//! Linear interpolation implementation.
//!
//! Multilinear interpolation (bilinear in 2D, trilinear in 3D) over an
//! [`ImageBuffer`], with the analytic gradient of the interpolant.

use crate::image::{Image, ImageBuffer};
use crate::spatial::{Point, Vector};
use burn::tensor::backend::Backend;
use super::trait_::Interpolator;

/// Linear Interpolator.
///
/// A point is inside when every continuous index component lies within
/// `[0, size - 1]`. The gradient is the derivative of the multilinear
/// interpolant inside the containing cell, mapped to physical space through
/// the image geometry.
#[derive(Debug, Clone)]
pub struct LinearInterpolator<const D: usize> {
    buffer: ImageBuffer<D>,
}

impl<const D: usize> LinearInterpolator<D> {
    /// Create a new linear interpolator over a buffer.
    pub fn new(buffer: ImageBuffer<D>) -> Self {
        Self { buffer }
    }

    /// Read an image back from its tensor and interpolate it.
    pub fn from_image<B: Backend>(image: &Image<B, D>) -> Self {
        Self::new(image.to_buffer())
    }

    /// The sampled buffer.
    pub fn buffer(&self) -> &ImageBuffer<D> {
        &self.buffer
    }

    fn inside_index(&self, index: &Point<D>) -> bool {
        let size = self.buffer.size();
        (0..D).all(|d| index[d] >= 0.0 && index[d] <= (size[d] - 1) as f64)
    }

    /// Cell origin and fractional offsets. Points on the upper face use the
    /// last cell so that the corner walk never leaves the buffer.
    fn cell(&self, index: &Point<D>) -> ([usize; D], [f64; D]) {
        let size = self.buffer.size();
        let mut base = [0usize; D];
        let mut frac = [0.0; D];
        for d in 0..D {
            if size[d] < 2 {
                continue;
            }
            let b = (index[d].floor() as usize).min(size[d] - 2);
            base[d] = b;
            frac[d] = index[d] - b as f64;
        }
        (base, frac)
    }

    fn interpolate_at_index(&self, index: &Point<D>, with_gradient: bool) -> (f64, Vector<D>) {
        let size = self.buffer.size();
        let (base, frac) = self.cell(index);
        let mut value = 0.0;
        let mut gradient = Vector::<D>::zeros();

        // Axis weight of a corner; single-pixel axes have one corner only.
        let axis_weight = |d: usize, upper: bool| match (size[d] < 2, upper) {
            (true, _) => 1.0,
            (false, true) => frac[d],
            (false, false) => 1.0 - frac[d],
        };

        for corner in 0..(1usize << D) {
            let is_upper = |d: usize| (corner >> d) & 1 == 1;
            if (0..D).any(|d| is_upper(d) && size[d] < 2) {
                continue;
            }
            let mut position = base;
            for d in (0..D).filter(|&d| is_upper(d)) {
                position[d] += 1;
            }
            let sample = self.buffer.get(position);
            value += (0..D).map(|d| axis_weight(d, is_upper(d))).product::<f64>() * sample;

            if with_gradient {
                for g in (0..D).filter(|&g| size[g] > 1) {
                    let sign = if is_upper(g) { 1.0 } else { -1.0 };
                    let partial: f64 = (0..D)
                        .filter(|&d| d != g)
                        .map(|d| axis_weight(d, is_upper(d)))
                        .product();
                    gradient[g] += sign * partial * sample;
                }
            }
        }
        (value, gradient)
    }
}

impl<const D: usize> Interpolator<D> for LinearInterpolator<D> {
    fn is_inside_buffer(&self, point: &Point<D>) -> bool {
        self.inside_index(&self.buffer.geometry().continuous_index(point))
    }

    fn evaluate(&self, point: &Point<D>) -> Option<f64> {
        let index = self.buffer.geometry().continuous_index(point);
        if !self.inside_index(&index) {
            return None;
        }
        Some(self.interpolate_at_index(&index, false).0)
    }

    fn evaluate_with_derivative(&self, point: &Point<D>) -> Option<(f64, Vector<D>)> {
        let geometry = self.buffer.geometry();
        let index = geometry.continuous_index(point);
        if !self.inside_index(&index) {
            return None;
        }
        let (value, index_gradient) = self.interpolate_at_index(&index, true);
        Some((value, geometry.index_gradient_to_physical(&index_gradient)))
    }
}
