//! Image geometry: the mapping between index space and physical space.

use nalgebra::SMatrix;
use crate::spatial::{Direction, Point, Spacing, Vector};

/// Physical-space description of an image grid.
///
/// `point = origin + Direction * diag(spacing) * index`. Both directions of
/// the mapping are cached as matrices so per-point evaluation never inverts
/// anything.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageGeometry<const D: usize> {
    /// Physical coordinate of the first pixel (index 0, 0, ...).
    origin: Point<D>,
    /// Physical distance between pixels along each index axis.
    spacing: Spacing<D>,
    /// Orientation of the image axes.
    direction: Direction<D>,
    index_to_physical: SMatrix<f64, D, D>,
    physical_to_index: SMatrix<f64, D, D>,
}

impl<const D: usize> ImageGeometry<D> {
    /// Create a new geometry.
    ///
    /// # Panics
    /// Panics if a spacing component is not strictly positive or the direction
    /// matrix is singular.
    pub fn new(origin: Point<D>, spacing: Spacing<D>, direction: Direction<D>) -> Self {
        assert!(spacing.is_valid_spacing(), "Spacing must be positive, got {:?}", spacing);
        let index_to_physical = direction.0 * SMatrix::from_diagonal(&spacing.0);
        let physical_to_index = index_to_physical
            .try_inverse()
            .expect("Direction matrix must be invertible");
        Self {
            origin,
            spacing,
            direction,
            index_to_physical,
            physical_to_index,
        }
    }

    /// Get the origin.
    pub fn origin(&self) -> &Point<D> {
        &self.origin
    }

    /// Get the spacing.
    pub fn spacing(&self) -> &Spacing<D> {
        &self.spacing
    }

    /// Get the direction.
    pub fn direction(&self) -> &Direction<D> {
        &self.direction
    }

    /// Matrix mapping physical offsets to index offsets.
    pub fn physical_to_index(&self) -> &SMatrix<f64, D, D> {
        &self.physical_to_index
    }

    /// Convert a physical point to a continuous index.
    pub fn continuous_index(&self, point: &Point<D>) -> Point<D> {
        let diff = *point - self.origin;
        Point::origin() + Vector(self.physical_to_index * diff.0)
    }

    /// Convert a continuous index to a physical point.
    pub fn physical_point(&self, index: &Point<D>) -> Point<D> {
        self.origin + Vector(self.index_to_physical * index.0.coords)
    }

    /// Physical location of a discrete pixel index.
    pub fn physical_point_of(&self, index: [usize; D]) -> Point<D> {
        self.physical_point(&Point::new(index.map(|i| i as f64)))
    }

    /// Convert a derivative taken along index axes to one taken along
    /// physical axes (chain rule through `physical_to_index`).
    pub fn index_gradient_to_physical(&self, gradient: &Vector<D>) -> Vector<D> {
        Vector(self.physical_to_index.transpose() * gradient.0)
    }
}

impl<const D: usize> Default for ImageGeometry<D> {
    fn default() -> Self {
        Self::new(Point::origin(), Spacing::uniform(1.0), Direction::identity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_geometry_is_identity() {
        let geometry = ImageGeometry::<3>::default();
        let p = Point::new([1.5, 2.0, -3.0]);
        assert_eq!(geometry.continuous_index(&p), p);
        assert_eq!(geometry.physical_point(&p), p);
    }

    #[test]
    fn test_spacing_and_origin() {
        let geometry = ImageGeometry::new(
            Point::new([10.0, 20.0]),
            Spacing::new([2.0, 0.5]),
            Direction::identity(),
        );
        let index = geometry.continuous_index(&Point::new([14.0, 21.0]));
        assert!((index[0] - 2.0).abs() < 1e-12);
        assert!((index[1] - 2.0).abs() < 1e-12);
        assert_eq!(geometry.physical_point_of([2, 2]), Point::new([14.0, 21.0]));
    }

    #[test]
    fn test_index_gradient_to_physical_scales_by_spacing() {
        let geometry = ImageGeometry::new(
            Point::origin(),
            Spacing::new([2.0, 4.0]),
            Direction::identity(),
        );
        let g = geometry.index_gradient_to_physical(&Vector::new([1.0, 1.0]));
        assert!((g[0] - 0.5).abs() < 1e-12);
        assert!((g[1] - 0.25).abs() < 1e-12);
    }

    #[test]
    #[should_panic]
    fn test_zero_spacing_panics() {
        let _ = ImageGeometry::new(Point::<2>::origin(), Spacing::new([1.0, 0.0]), Direction::identity());
    }
}
