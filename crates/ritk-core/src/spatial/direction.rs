//! Direction matrices for image orientation.

use nalgebra::SMatrix;
use serde::{Deserialize, Serialize};
use super::Vector;

/// Direction matrix representing image orientation.
///
/// Column `i` is the physical direction of the `i`-th index axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Direction<const D: usize>(pub SMatrix<f64, D, D>);

impl<const D: usize> Direction<D> {
    /// Identity orientation.
    pub fn identity() -> Self {
        Self(SMatrix::identity())
    }

    /// Check if the matrix is orthogonal within `1e-6`.
    pub fn is_orthogonal(&self) -> bool {
        let product = self.0 * self.0.transpose();
        (product - SMatrix::<f64, D, D>::identity()).amax() < 1e-6
    }

    /// Try to compute the inverse of the direction matrix.
    pub fn try_inverse(&self) -> Option<Self> {
        self.0.try_inverse().map(Self)
    }
}

impl Direction<2> {
    /// Rotation by `angle` radians (counter-clockwise).
    pub fn from_angle(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self(SMatrix::<f64, 2, 2>::new(c, -s, s, c))
    }
}

impl<const D: usize> std::ops::Index<(usize, usize)> for Direction<D> {
    type Output = f64;

    fn index(&self, index: (usize, usize)) -> &Self::Output {
        &self.0[index]
    }
}

impl<const D: usize> std::ops::Mul<Vector<D>> for Direction<D> {
    type Output = Vector<D>;

    fn mul(self, vector: Vector<D>) -> Self::Output {
        Vector(self.0 * vector.0)
    }
}
