//! Transform trait for parametric spatial transformations.
//!
//! A transform maps fixed-image physical points into moving-image physical
//! space and exposes the derivative of that mapping with respect to its
//! parameters.

use nalgebra::{Const, Dyn, OMatrix};
use crate::spatial::Point;

/// `D x K` matrix of partial derivatives `dT_d / dmu_k`.
pub type JacobianMatrix<const D: usize> = OMatrix<f64, Const<D>, Dyn>;

/// Parameter Jacobian of a transform at one point.
///
/// Only the `K` parameters that influence the point are stored. Column `k`
/// holds the derivative with respect to global parameter
/// `nonzero_indices[k]`.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformJacobian<const D: usize> {
    matrix: JacobianMatrix<D>,
    nonzero_indices: Vec<usize>,
}

impl<const D: usize> TransformJacobian<D> {
    /// Build a Jacobian from its columns and global indices.
    ///
    /// # Panics
    /// Panics if the column count differs from `nonzero_indices.len()`.
    pub fn new(matrix: JacobianMatrix<D>, nonzero_indices: Vec<usize>) -> Self {
        assert_eq!(
            matrix.ncols(),
            nonzero_indices.len(),
            "Jacobian column count must match the nonzero index count"
        );
        Self { matrix, nonzero_indices }
    }

    /// All-zero Jacobian over `nonzero_indices`.
    pub fn zeros(nonzero_indices: Vec<usize>) -> Self {
        let matrix = JacobianMatrix::<D>::zeros_generic(Const::<D>, Dyn(nonzero_indices.len()));
        Self { matrix, nonzero_indices }
    }

    /// Dense Jacobian touching every one of `number_of_parameters` parameters.
    pub fn dense(number_of_parameters: usize) -> Self {
        Self::zeros((0..number_of_parameters).collect())
    }

    /// Partial derivatives, one column per affected parameter.
    pub fn matrix(&self) -> &JacobianMatrix<D> {
        &self.matrix
    }

    /// Mutable access to the partial derivatives.
    pub fn matrix_mut(&mut self) -> &mut JacobianMatrix<D> {
        &mut self.matrix
    }

    /// Global parameter index of each column.
    pub fn nonzero_indices(&self) -> &[usize] {
        &self.nonzero_indices
    }

    /// Number of affected parameters.
    pub fn len(&self) -> usize {
        self.nonzero_indices.len()
    }

    /// True when no parameter affects the point.
    pub fn is_empty(&self) -> bool {
        self.nonzero_indices.is_empty()
    }
}

/// Parametric spatial transform.
///
/// Implementations must be `Send + Sync`; metrics evaluate them from several
/// threads at once.
///
/// When a Jacobian touches every parameter, its `nonzero_indices` are
/// `0..number_of_parameters()` in order.
pub trait Transform<const D: usize>: Send + Sync {
    /// Total number of parameters.
    fn number_of_parameters(&self) -> usize;

    /// Current parameter vector.
    fn parameters(&self) -> Vec<f64>;

    /// Replace the parameter vector.
    ///
    /// # Panics
    /// Panics if `parameters.len() != self.number_of_parameters()`.
    fn set_parameters(&mut self, parameters: &[f64]);

    /// Map a point. `None` means the point lies outside the transform's
    /// support region.
    fn transform_point(&self, point: &Point<D>) -> Option<Point<D>>;

    /// Parameter Jacobian at `point` (in the transform's input space).
    fn jacobian(&self, point: &Point<D>) -> TransformJacobian<D>;
}
