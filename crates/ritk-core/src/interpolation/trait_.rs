//! Interpolator trait for sampling values at continuous coordinates.

use crate::spatial::{Point, Vector};

/// Samples an image at arbitrary physical points.
///
/// Interpolators own (or share) the image they sample, so a metric can hold
/// one per image and query it from several worker threads at once.
pub trait Interpolator<const D: usize>: Send + Sync {
    /// True when `point` lies inside the region the interpolator can evaluate.
    fn is_inside_buffer(&self, point: &Point<D>) -> bool;

    /// Interpolated intensity at a physical point, `None` outside the buffer.
    fn evaluate(&self, point: &Point<D>) -> Option<f64>;

    /// Interpolated intensity and its spatial gradient with respect to
    /// physical coordinates, `None` outside the buffer.
    fn evaluate_with_derivative(&self, point: &Point<D>) -> Option<(f64, Vector<D>)>;
}
