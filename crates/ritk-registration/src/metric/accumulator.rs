//! Per-sample accumulation of mean-squares terms.
//!
//! Each sample is mapped through the transform and checked against the
//! transform support, the mask and the moving image buffer. Samples that
//! fail any check are skipped silently. Valid samples add their weighted
//! squared difference, and on the derivative path their contribution to the
//! per-parameter numerator and denominator sums.

use ritk_core::interpolation::Interpolator;
use ritk_core::mask::MaskEvaluator;
use ritk_core::sampler::ImageSample;
use ritk_core::transform::Transform;
use super::inner_product::transform_jacobian_inner_products;

/// Mask values (and mask gradient norms) at or below this are treated as
/// outside the mask.
pub const MASK_THRESHOLD: f64 = 1e-10;

/// Sums collected over the samples of one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct RunningSums {
    /// Sum of `mask * diff^2`.
    pub measure: f64,
    /// Per-parameter numerator of the derivative (empty on the value path).
    pub numerator: Vec<f64>,
    /// Per-parameter sum of mask Jacobians (empty on the value path).
    pub denominator: Vec<f64>,
    pub counted: usize,
    pub mask_weight_sum: f64,
}

impl RunningSums {
    /// Zeroed sums for `number_of_parameters` derivative entries.
    pub fn new(number_of_parameters: usize) -> Self {
        Self {
            measure: 0.0,
            numerator: vec![0.0; number_of_parameters],
            denominator: vec![0.0; number_of_parameters],
            counted: 0,
            mask_weight_sum: 0.0,
        }
    }

    /// Zeroed sums without derivative storage.
    pub fn value_only() -> Self {
        Self::new(0)
    }

    /// Combine the sums of two disjoint sample subsets.
    pub fn merge(mut self, other: Self) -> Self {
        self.measure += other.measure;
        for (a, b) in self.numerator.iter_mut().zip(&other.numerator) {
            *a += b;
        }
        for (a, b) in self.denominator.iter_mut().zip(&other.denominator) {
            *a += b;
        }
        self.counted += other.counted;
        self.mask_weight_sum += other.mask_weight_sum;
        self
    }

    fn add_sample(&mut self, mask: f64, diff: f64) {
        self.counted += 1;
        self.mask_weight_sum += mask;
        self.measure += mask * diff * diff;
    }
}

/// Reusable per-worker buffers for the Jacobian inner products.
#[derive(Debug, Clone, Default)]
pub struct JacobianScratch {
    pub image_jacobian: Vec<f64>,
    pub mask_jacobian: Vec<f64>,
}

/// Borrowed view of the collaborators needed to score one sample.
pub struct SampleAccumulator<'a, T, I, M> {
    transform: &'a T,
    interpolator: &'a I,
    mask: &'a M,
}

impl<'a, T, I, M> SampleAccumulator<'a, T, I, M> {
    pub fn new(transform: &'a T, interpolator: &'a I, mask: &'a M) -> Self {
        Self {
            transform,
            interpolator,
            mask,
        }
    }

    /// Add one sample's value contribution. Returns whether it was counted.
    pub fn accumulate_value<const D: usize>(&self, sums: &mut RunningSums, sample: &ImageSample<D>) -> bool
    where
        T: Transform<D>,
        I: Interpolator<D>,
        M: MaskEvaluator<D>,
    {
        let Some(mapped) = self.transform.transform_point(&sample.point) else {
            return false;
        };
        let mask = self.mask.value(&mapped);
        if !(mask > MASK_THRESHOLD) {
            return false;
        }
        let Some(moving) = self.interpolator.evaluate(&mapped) else {
            return false;
        };
        sums.add_sample(mask, moving - sample.value);
        true
    }

    /// Add one sample's value and derivative contributions. Returns whether
    /// it was counted.
    ///
    /// Points where the mask itself vanishes but its gradient does not are
    /// kept: moving the transform there changes how much of the sample
    /// enters the measure.
    pub fn accumulate_value_and_derivative<const D: usize>(
        &self,
        sums: &mut RunningSums,
        scratch: &mut JacobianScratch,
        sample: &ImageSample<D>,
    ) -> bool
    where
        T: Transform<D>,
        I: Interpolator<D>,
        M: MaskEvaluator<D>,
    {
        let Some(mapped) = self.transform.transform_point(&sample.point) else {
            return false;
        };
        let (mask, mask_derivative) = self.mask.value_and_derivative(&mapped);
        if !(mask > MASK_THRESHOLD || mask_derivative.norm() > MASK_THRESHOLD) {
            return false;
        }
        let Some((moving, moving_derivative)) = self.interpolator.evaluate_with_derivative(&mapped) else {
            return false;
        };

        let diff = moving - sample.value;
        sums.add_sample(mask, diff);

        let jacobian = self.transform.jacobian(&sample.point);
        transform_jacobian_inner_products(
            &jacobian,
            &moving_derivative,
            &mask_derivative,
            &mut scratch.image_jacobian,
            &mut scratch.mask_jacobian,
        );
        update_value_and_derivative_terms(
            sums,
            diff,
            mask,
            &scratch.image_jacobian,
            &scratch.mask_jacobian,
            jacobian.nonzero_indices(),
        );
        true
    }
}

/// Add `(2 mask diff) dM/dmu + diff^2 dmask/dmu` to the numerator and
/// `dmask/dmu` to the denominator of every affected parameter.
pub fn update_value_and_derivative_terms(
    sums: &mut RunningSums,
    diff: f64,
    mask: f64,
    image_jacobian: &[f64],
    mask_jacobian: &[f64],
    nonzero_indices: &[usize],
) {
    if nonzero_indices.len() == sums.numerator.len() {
        update_dense(sums, diff, mask, image_jacobian, mask_jacobian);
    } else {
        update_sparse(sums, diff, mask, image_jacobian, mask_jacobian, nonzero_indices);
    }
}

/// Every parameter is affected, in index order.
fn update_dense(sums: &mut RunningSums, diff: f64, mask: f64, image_jacobian: &[f64], mask_jacobian: &[f64]) {
    let weighted_diff = 2.0 * mask * diff;
    let diff_squared = diff * diff;
    let terms = sums
        .numerator
        .iter_mut()
        .zip(sums.denominator.iter_mut())
        .zip(image_jacobian.iter().zip(mask_jacobian));
    for ((numerator, denominator), (&image, &mask_term)) in terms {
        *numerator += weighted_diff * image + diff_squared * mask_term;
        *denominator += mask_term;
    }
}

/// Scatter into the affected global indices.
fn update_sparse(
    sums: &mut RunningSums,
    diff: f64,
    mask: f64,
    image_jacobian: &[f64],
    mask_jacobian: &[f64],
    nonzero_indices: &[usize],
) {
    let weighted_diff = 2.0 * mask * diff;
    let diff_squared = diff * diff;
    for (k, &mu) in nonzero_indices.iter().enumerate() {
        sums.numerator[mu] += weighted_diff * image_jacobian[k] + diff_squared * mask_jacobian[k];
        sums.denominator[mu] += mask_jacobian[k];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ritk_core::image::{ImageBuffer, ImageGeometry};
    use ritk_core::interpolation::LinearInterpolator;
    use ritk_core::mask::{ImageMask, UniformMask};
    use ritk_core::spatial::{Point, Vector};
    use ritk_core::transform::TranslationTransform;

    #[test]
    fn test_dense_and_sparse_branches_agree() {
        let image_jacobian = [0.3, -1.2, 2.0, 0.7];
        let mask_jacobian = [0.1, 0.0, -0.4, 0.25];
        let indices = [0, 1, 2, 3];

        let mut dense = RunningSums::new(4);
        dense.numerator = vec![1.0, 2.0, 3.0, 4.0];
        dense.denominator = vec![-1.0, 0.5, 0.0, 2.0];
        let mut sparse = dense.clone();

        update_dense(&mut dense, 1.7, 0.6, &image_jacobian, &mask_jacobian);
        update_sparse(&mut sparse, 1.7, 0.6, &image_jacobian, &mask_jacobian, &indices);

        for mu in 0..4 {
            assert!((dense.numerator[mu] - sparse.numerator[mu]).abs() < 1e-15);
            assert!((dense.denominator[mu] - sparse.denominator[mu]).abs() < 1e-15);
        }
    }

    #[test]
    fn test_sparse_scatter_touches_only_indices() {
        let mut sums = RunningSums::new(6);
        update_value_and_derivative_terms(&mut sums, 2.0, 0.5, &[1.0, 3.0], &[0.5, -1.0], &[4, 1]);
        // numerator = 2 * 0.5 * 2 * image + 4 * mask
        assert_eq!(sums.numerator, vec![0.0, 2.0, 0.0, 0.0, 4.0, 0.0]);
        assert_eq!(sums.denominator, vec![0.0, -1.0, 0.0, 0.0, 0.5, 0.0]);
    }

    #[test]
    fn test_merge() {
        let mut a = RunningSums::new(2);
        a.add_sample(1.0, 2.0);
        a.numerator[1] = 3.0;
        let mut b = RunningSums::new(2);
        b.add_sample(0.5, 1.0);
        b.numerator[1] = 1.0;
        let merged = a.merge(b);
        assert_eq!(merged.counted, 2);
        assert_eq!(merged.mask_weight_sum, 1.5);
        assert_eq!(merged.measure, 4.5);
        assert_eq!(merged.numerator, vec![0.0, 4.0]);
    }

    #[test]
    fn test_sample_gates() {
        let moving = LinearInterpolator::new(ImageBuffer::filled([4, 4], ImageGeometry::default(), 3.0));
        let transform = TranslationTransform::new(Vector::new([2.0, 0.0]));
        let mask = UniformMask;
        let accumulator = SampleAccumulator::new(&transform, &moving, &mask);

        let mut sums = RunningSums::value_only();
        assert!(accumulator.accumulate_value(&mut sums, &ImageSample::new(Point::new([1.0, 1.0]), 1.0)));
        // Maps to x = 4, outside the moving buffer.
        assert!(!accumulator.accumulate_value(&mut sums, &ImageSample::new(Point::new([2.0, 1.0]), 1.0)));
        assert_eq!(sums.counted, 1);
        assert_eq!(sums.measure, 4.0);
    }

    #[test]
    fn test_mask_gradient_keeps_sample_on_derivative_path() {
        // Mask is zero at x <= 1 and ramps up to 1 at x = 2.
        let mask_buffer =
            ImageBuffer::from_fn([4, 1], ImageGeometry::default(), |[i, _]| if i >= 2 { 1.0 } else { 0.0 });
        let mask = ImageMask::new(mask_buffer);
        let moving = LinearInterpolator::new(ImageBuffer::filled([4, 1], ImageGeometry::default(), 3.0));
        let transform = TranslationTransform::<2>::identity();
        let accumulator = SampleAccumulator::new(&transform, &moving, &mask);

        // At x = 1 the mask value is 0 but the gradient (upper cell) is 1.
        let sample = ImageSample::new(Point::new([1.0, 0.0]), 1.0);
        let mut value_sums = RunningSums::value_only();
        assert!(!accumulator.accumulate_value(&mut value_sums, &sample));

        let mut sums = RunningSums::new(2);
        let mut scratch = JacobianScratch::default();
        assert!(accumulator.accumulate_value_and_derivative(&mut sums, &mut scratch, &sample));
        assert_eq!(sums.counted, 1);
        assert_eq!(sums.mask_weight_sum, 0.0);
        // diff^2 * dmask/dx = 4
        assert_eq!(sums.numerator, vec![4.0, 0.0]);
        assert_eq!(sums.denominator, vec![1.0, 0.0]);
    }
}
