//! Point type for representing spatial coordinates.
//!
//! Points are positions, either in physical space or as continuous indices
//! into an image grid.

use nalgebra::Point as NaPoint;
use serde::{Deserialize, Serialize};
use super::Vector;

/// A point in D-dimensional space.
///
/// Thin wrapper around nalgebra's `Point` so that domain code can index
/// coordinates directly and subtract points into [`Vector`]s.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point<const D: usize>(pub NaPoint<f64, D>);

impl<const D: usize> Point<D> {
    /// Create a new point from coordinates.
    pub fn new(coords: [f64; D]) -> Self {
        Self(NaPoint::from(coords))
    }

    /// The point with all coordinates zero.
    pub fn origin() -> Self {
        Self(NaPoint::origin())
    }

    /// Create a point from a slice of coordinates.
    ///
    /// # Panics
    /// Panics if `coords.len() != D`.
    pub fn from_slice(coords: &[f64]) -> Self {
        assert_eq!(coords.len(), D, "Coordinate slice length must match dimension");
        Self(NaPoint::from(std::array::from_fn::<f64, D, _>(|i| coords[i])))
    }

    /// Coordinates as a fixed-size array.
    pub fn to_array(&self) -> [f64; D] {
        std::array::from_fn(|i| self.0.coords[i])
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Self) -> f64 {
        (*self - *other).norm()
    }

    /// True when every coordinate is finite.
    pub fn is_finite(&self) -> bool {
        self.0.coords.iter().all(|c| c.is_finite())
    }
}

impl<const D: usize> std::ops::Index<usize> for Point<D> {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0.coords[index]
    }
}

impl<const D: usize> std::ops::IndexMut<usize> for Point<D> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.0.coords[index]
    }
}

impl<const D: usize> std::ops::Sub for Point<D> {
    type Output = Vector<D>;

    fn sub(self, other: Self) -> Self::Output {
        Vector(self.0 - other.0)
    }
}

impl<const D: usize> std::ops::Add<Vector<D>> for Point<D> {
    type Output = Self;

    fn add(self, vector: Vector<D>) -> Self::Output {
        Self(self.0 + vector.0)
    }
}

impl<const D: usize> std::ops::Sub<Vector<D>> for Point<D> {
    type Output = Self;

    fn sub(self, vector: Vector<D>) -> Self::Output {
        Self(self.0 - vector.0)
    }
}
