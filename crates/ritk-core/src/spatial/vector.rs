//! Vector type for displacements and spatial derivatives.

use nalgebra::SVector;
use serde::{Deserialize, Serialize};

/// A vector in D-dimensional space.
///
/// Used for displacements, spacings, and the spatial derivatives returned by
/// interpolators and masks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vector<const D: usize>(pub SVector<f64, D>);

impl<const D: usize> Vector<D> {
    /// Create a new vector from components.
    pub fn new(components: [f64; D]) -> Self {
        Self(SVector::from(components))
    }

    /// Create a zero vector.
    pub fn zeros() -> Self {
        Self(SVector::zeros())
    }

    /// Components as a fixed-size array.
    pub fn to_array(&self) -> [f64; D] {
        std::array::from_fn(|i| self.0[i])
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f64 {
        self.0.norm()
    }

    /// Dot product with another vector.
    pub fn dot(&self, other: &Self) -> f64 {
        self.0.dot(&other.0)
    }

    /// Unit vector along `axis`.
    ///
    /// # Panics
    /// Panics if `axis >= D`.
    pub fn axis(axis: usize) -> Self {
        assert!(axis < D, "axis {} out of range for dimension {}", axis, D);
        let mut v = Self::zeros();
        v.0[axis] = 1.0;
        v
    }
}

impl<const D: usize> std::ops::Index<usize> for Vector<D> {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl<const D: usize> std::ops::IndexMut<usize> for Vector<D> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.0[index]
    }
}

impl<const D: usize> std::ops::Add for Vector<D> {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self(self.0 + other.0)
    }
}

impl<const D: usize> std::ops::Sub for Vector<D> {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        Self(self.0 - other.0)
    }
}

impl<const D: usize> std::ops::Mul<f64> for Vector<D> {
    type Output = Self;

    fn mul(self, scalar: f64) -> Self::Output {
        Self(self.0 * scalar)
    }
}

impl<const D: usize> std::ops::Neg for Vector<D> {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}
