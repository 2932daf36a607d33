//! Affine transform implementation.

use nalgebra::SMatrix;
use crate::spatial::{Point, Vector};
use super::trait_::{Transform, TransformJacobian};

/// Affine transform with a fixed center.
///
/// `T(x) = A (x - c) + c + t`
///
/// Parameters: the `D x D` entries of `A` in row-major order, followed by the
/// `D` components of `t`. The center `c` is not a parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct AffineTransform<const D: usize> {
    matrix: SMatrix<f64, D, D>,
    translation: Vector<D>,
    center: Point<D>,
}

impl<const D: usize> AffineTransform<D> {
    /// Create a new affine transform.
    pub fn new(matrix: SMatrix<f64, D, D>, translation: Vector<D>, center: Point<D>) -> Self {
        Self {
            matrix,
            translation,
            center,
        }
    }

    /// Identity transform rotating/scaling about `center`.
    pub fn identity(center: Point<D>) -> Self {
        Self::new(SMatrix::identity(), Vector::zeros(), center)
    }

    /// Get the linear part.
    pub fn matrix(&self) -> &SMatrix<f64, D, D> {
        &self.matrix
    }

    /// Get the translation vector.
    pub fn translation(&self) -> &Vector<D> {
        &self.translation
    }

    /// Get the center of rotation.
    pub fn center(&self) -> &Point<D> {
        &self.center
    }
}

impl<const D: usize> Transform<D> for AffineTransform<D> {
    fn number_of_parameters(&self) -> usize {
        D * D + D
    }

    fn parameters(&self) -> Vec<f64> {
        let mut parameters = Vec::with_capacity(D * D + D);
        for row in 0..D {
            for col in 0..D {
                parameters.push(self.matrix[(row, col)]);
            }
        }
        parameters.extend(self.translation.to_array());
        parameters
    }

    fn set_parameters(&mut self, parameters: &[f64]) {
        assert_eq!(parameters.len(), D * D + D, "Affine expects {} parameters", D * D + D);
        for row in 0..D {
            for col in 0..D {
                self.matrix[(row, col)] = parameters[row * D + col];
            }
        }
        for d in 0..D {
            self.translation[d] = parameters[D * D + d];
        }
    }

    fn transform_point(&self, point: &Point<D>) -> Option<Point<D>> {
        let centered = *point - self.center;
        Some(self.center + Vector(self.matrix * centered.0) + self.translation)
    }

    fn jacobian(&self, point: &Point<D>) -> TransformJacobian<D> {
        // dT_i/dA_ij = (x - c)_j, dT_i/dt_i = 1
        let centered = *point - self.center;
        let mut jacobian = TransformJacobian::dense(D * D + D);
        let matrix = jacobian.matrix_mut();
        for row in 0..D {
            for col in 0..D {
                matrix[(row, row * D + col)] = centered[col];
            }
            matrix[(row, D * D + row)] = 1.0;
        }
        jacobian
    }
}
