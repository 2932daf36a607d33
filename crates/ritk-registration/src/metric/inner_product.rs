//! Chain rule from spatial derivatives to parameter derivatives.

use ritk_core::spatial::Vector;
use ritk_core::transform::TransformJacobian;

/// Contract the transform Jacobian with the moving image gradient and the
/// mask gradient.
///
/// For each nonzero Jacobian column `mu`:
/// `image_jacobian[mu] = sum_d J[d][mu] * image_derivative[d]` and likewise
/// for `mask_jacobian`. Both outputs are resized to the column count and
/// overwritten, so callers can reuse them across samples.
pub fn transform_jacobian_inner_products<const D: usize>(
    jacobian: &TransformJacobian<D>,
    image_derivative: &Vector<D>,
    mask_derivative: &Vector<D>,
    image_jacobian: &mut Vec<f64>,
    mask_jacobian: &mut Vec<f64>,
) {
    let columns = jacobian.len();
    image_jacobian.clear();
    image_jacobian.resize(columns, 0.0);
    mask_jacobian.clear();
    mask_jacobian.resize(columns, 0.0);

    // Column-major storage: each column is contiguous.
    for (mu, column) in jacobian.matrix().column_iter().enumerate() {
        let mut image_sum = 0.0;
        let mut mask_sum = 0.0;
        for d in 0..D {
            image_sum += column[d] * image_derivative[d];
            mask_sum += column[d] * mask_derivative[d];
        }
        image_jacobian[mu] = image_sum;
        mask_jacobian[mu] = mask_sum;
    }
}
