//! Translation transform implementation.

use crate::spatial::{Point, Vector};
use super::trait_::{Transform, TransformJacobian};

/// Translates points by a fixed offset vector.
///
/// Parameters: the `D` offset components.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationTransform<const D: usize> {
    translation: Vector<D>,
}

impl<const D: usize> TranslationTransform<D> {
    /// Create a new translation transform.
    pub fn new(translation: Vector<D>) -> Self {
        Self { translation }
    }

    /// Zero translation.
    pub fn identity() -> Self {
        Self::new(Vector::zeros())
    }

    /// Get the translation vector.
    pub fn translation(&self) -> &Vector<D> {
        &self.translation
    }
}

impl<const D: usize> Transform<D> for TranslationTransform<D> {
    fn number_of_parameters(&self) -> usize {
        D
    }

    fn parameters(&self) -> Vec<f64> {
        self.translation.to_array().to_vec()
    }

    fn set_parameters(&mut self, parameters: &[f64]) {
        assert_eq!(parameters.len(), D, "Translation expects {} parameters", D);
        for d in 0..D {
            self.translation[d] = parameters[d];
        }
    }

    fn transform_point(&self, point: &Point<D>) -> Option<Point<D>> {
        Some(*point + self.translation)
    }

    fn jacobian(&self, _point: &Point<D>) -> TransformJacobian<D> {
        let mut jacobian = TransformJacobian::dense(D);
        jacobian.matrix_mut().fill_with_identity();
        jacobian
    }
}
