use nalgebra::SMatrix;
use ritk_core::image::{ImageBuffer, ImageGeometry};
use ritk_core::interpolation::LinearInterpolator;
use ritk_core::mask::{ImageMask, MaskEvaluator, UniformMask};
use ritk_core::sampler::FullSampler;
use ritk_core::spatial::{Direction, Point, Spacing, Vector};
use ritk_core::transform::{AffineTransform, BSplineTransform, Transform, TranslationTransform};
use ritk_registration::metric::{AdvancedMeanSquares, AdvancedMeanSquaresConfig, Metric};

const FIXED_SIZE: usize = 16;
const EPS: f64 = 1e-6;

/// Moving-image geometry covering [-4, 19]^2, so every mapped sample stays
/// inside for the small transforms used here.
fn moving_geometry() -> ImageGeometry<2> {
    ImageGeometry::new(Point::new([-4.0, -4.0]), Spacing::uniform(1.0), Direction::identity())
}

fn fixed_image() -> ImageBuffer<2> {
    ImageBuffer::from_fn([FIXED_SIZE, FIXED_SIZE], ImageGeometry::default(), |[i, j]| {
        let (x, y) = (i as f64, j as f64);
        12.0 + 2.2 * x + 2.6 * y + 0.2 * x * y + (0.7 * x).sin()
    })
}

/// Bilinear in physical coordinates, so linear interpolation reproduces it
/// exactly and the metric is smooth in the parameters.
fn moving_image() -> ImageBuffer<2> {
    ImageBuffer::from_fn([24, 24], moving_geometry(), |[i, j]| {
        let (x, y) = (i as f64 - 4.0, j as f64 - 4.0);
        10.0 + 2.0 * x + 3.0 * y + 0.25 * x * y
    })
}

fn soft_mask() -> ImageMask<2> {
    ImageMask::new(ImageBuffer::from_fn([24, 24], moving_geometry(), |[i, j]| {
        let (x, y) = (i as f64 - 4.0, j as f64 - 4.0);
        0.4 + 0.01 * x + 0.01 * y + 0.0005 * x * y
    }))
}

fn metric<T, M>(transform: T, mask: M) -> AdvancedMeanSquares<T, LinearInterpolator<2>, M, FullSampler<2>, 2>
where
    T: Transform<2>,
    M: MaskEvaluator<2>,
{
    let mut metric = AdvancedMeanSquares::new(
        transform,
        LinearInterpolator::new(moving_image()),
        mask,
        FullSampler::new(&fixed_image()),
    )
    .with_config(AdvancedMeanSquaresConfig::new().with_parallel(false));
    metric.initialize().unwrap();
    metric
}

/// Compare the analytic derivative with central differences of the value.
fn check_derivative<M: Metric>(metric: &mut M, parameters: &[f64]) {
    let (value, derivative) = metric.get_value_and_derivative(parameters).unwrap();
    assert!(value > 0.0);
    assert_eq!(derivative.len(), parameters.len());

    for mu in 0..parameters.len() {
        let mut p = parameters.to_vec();
        p[mu] += EPS;
        let plus = metric.get_value(&p).unwrap();
        p[mu] -= 2.0 * EPS;
        let minus = metric.get_value(&p).unwrap();
        let numeric = (plus - minus) / (2.0 * EPS);

        let tolerance = 1e-5 * derivative[mu].abs().max(1.0);
        assert!(
            (numeric - derivative[mu]).abs() < tolerance,
            "parameter {}: numeric {} vs analytic {}",
            mu, numeric, derivative[mu]
        );
    }
}

#[test]
fn test_translation_derivative() {
    let mut metric = metric(TranslationTransform::<2>::identity(), UniformMask);
    check_derivative(&mut metric, &[0.3, 0.2]);
}

#[test]
fn test_translation_derivative_soft_mask() {
    let mut metric = metric(TranslationTransform::<2>::identity(), soft_mask());
    check_derivative(&mut metric, &[0.3, -0.45]);
}

#[test]
fn test_affine_derivative() {
    let mut metric = metric(AffineTransform::<2>::identity(Point::new([7.5, 7.5])), UniformMask);
    check_derivative(&mut metric, &[1.004, 0.003, -0.002, 0.996, 0.3, 0.2]);
}

#[test]
fn test_affine_derivative_soft_mask() {
    let mut metric = metric(AffineTransform::<2>::identity(Point::new([7.5, 7.5])), soft_mask());
    check_derivative(&mut metric, &[0.98, 0.02, 0.01, 1.03, -0.4, 0.25]);
}

fn bspline() -> BSplineTransform<2> {
    BSplineTransform::covering(Point::origin(), [15.0, 15.0], [3, 3])
}

fn bspline_parameters(n: usize) -> Vec<f64> {
    (0..n).map(|i| 0.4 * (i as f64 * 1.3).sin()).collect()
}

#[test]
fn test_bspline_derivative() {
    let transform = bspline();
    let parameters = bspline_parameters(transform.number_of_parameters());
    let mut metric = metric(transform, UniformMask);
    check_derivative(&mut metric, &parameters);
}

#[test]
fn test_bspline_derivative_soft_mask() {
    let transform = bspline();
    let parameters = bspline_parameters(transform.number_of_parameters());
    let mut metric = metric(transform, soft_mask());
    check_derivative(&mut metric, &parameters);
}

#[test]
fn test_minimal_bspline_grid_uses_every_parameter() {
    // A 4x4 grid makes every Jacobian touch every parameter.
    let transform = BSplineTransform::<2>::new([4, 4], Point::new([-15.0, -15.0]), Spacing::uniform(15.0));
    let parameters = bspline_parameters(transform.number_of_parameters());
    let mut metric = metric(transform, soft_mask());
    check_derivative(&mut metric, &parameters);
}

#[test]
fn test_translation_derivative_3d() {
    let fixed = ImageBuffer::from_fn([6, 6, 6], ImageGeometry::default(), |[i, j, k]| (i + 2 * j + 3 * k) as f64);
    let moving_geometry = ImageGeometry::new(Point::new([-2.0, -2.0, -2.0]), Spacing::uniform(1.0), Direction::identity());
    let moving = ImageBuffer::from_fn([10, 10, 10], moving_geometry, |[i, j, k]| {
        let (x, y, z) = (i as f64 - 2.0, j as f64 - 2.0, k as f64 - 2.0);
        1.0 + x + 0.5 * y * z + 0.1 * x * y * z
    });
    let mut metric = AdvancedMeanSquares::new(
        TranslationTransform::new(Vector::<3>::zeros()),
        LinearInterpolator::new(moving),
        UniformMask,
        FullSampler::new(&fixed),
    );
    metric.initialize().unwrap();
    check_derivative(&mut metric, &[0.25, -0.5, 0.75]);
}

#[test]
fn test_affine_matrix_parameters_are_row_major() {
    let transform = AffineTransform::new(
        SMatrix::<f64, 2, 2>::new(1.0, 0.5, 0.0, 1.0),
        Vector::new([0.0, 0.0]),
        Point::origin(),
    );
    assert_eq!(transform.parameters(), vec![1.0, 0.5, 0.0, 1.0, 0.0, 0.0]);
}
