use burn::tensor::Tensor;
use burn_ndarray::NdArray;
use ritk_core::filter::ExtremaEstimator;
use ritk_core::image::{Image, ImageBuffer, ImageGeometry};
use ritk_core::interpolation::{Interpolator, LinearInterpolator};
use ritk_core::spatial::{Point, Spacing, Direction};
use nalgebra::{Vector3, Rotation3};
use std::f64::consts::PI;

type Backend = NdArray<f32>;
type Point3 = Point<3>;
type Spacing3 = Spacing<3>;
type Direction3 = Direction<3>;

#[test]
fn test_rotated_image_transform() {
    let device = Default::default();
    let data = Tensor::<Backend, 3>::zeros([10, 10, 10], &device);
    let origin = Point3::new([0.0, 0.0, 0.0]);
    let spacing = Spacing3::new([1.0, 1.0, 1.0]);

    // Rotate 90 degrees around Z: X -> Y, Y -> -X.
    let rotation = Rotation3::from_axis_angle(&Vector3::z_axis(), PI / 2.0);
    let direction: Direction3 = Direction(rotation.into_inner());

    let image = Image::new(data, origin, spacing, direction);

    // Physical (1, 0, 0) lies along -Y of the index frame.
    let point = Point3::new([1.0, 0.0, 0.0]);
    let index = image.transform_physical_point_to_continuous_index(&point);

    assert!((index[0] - 0.0).abs() < 1e-10, "Expected index[0] to be 0.0, got {}", index[0]);
    assert!((index[1] - (-1.0)).abs() < 1e-10, "Expected index[1] to be -1.0, got {}", index[1]);
    assert!((index[2] - 0.0).abs() < 1e-10, "Expected index[2] to be 0.0, got {}", index[2]);
}

#[test]
fn test_image_and_buffer_extrema_agree() {
    let buffer = ImageBuffer::from_fn([6, 5], ImageGeometry::default(), |[i, j]| i as f64 * 3.0 - j as f64 * 2.0);
    let image = Image::<Backend, 2>::from_buffer(&buffer, &Default::default());

    let from_image = image.compute_extrema(0.01);
    let from_buffer = buffer.compute_extrema(0.01);

    assert_eq!(from_buffer.true_min, -8.0);
    assert_eq!(from_buffer.true_max, 15.0);
    assert!((from_image.true_min - from_buffer.true_min).abs() < 1e-6);
    assert!((from_image.true_max - from_buffer.true_max).abs() < 1e-6);
    assert!((from_buffer.limited_max - 15.23).abs() < 1e-12);
}

#[test]
fn test_interpolator_from_image_matches_buffer() {
    let geometry = ImageGeometry::new(Point::new([-2.0, 1.0]), Spacing::new([0.5, 1.5]), Direction::identity());
    let buffer = ImageBuffer::from_fn([4, 3], geometry, |[i, j]| (i * i + j) as f64);
    let image = Image::<Backend, 2>::from_buffer(&buffer, &Default::default());

    let from_image = LinearInterpolator::from_image(&image);
    let from_buffer = LinearInterpolator::new(buffer);

    let p = Point::new([-1.3, 2.2]);
    let a = from_image.evaluate(&p).unwrap();
    let b = from_buffer.evaluate(&p).unwrap();
    assert!((a - b).abs() < 1e-6);
    assert!(!from_image.is_inside_buffer(&Point::new([-2.1, 1.0])));
}
