//! Image type with physical metadata.
//!
//! An [`Image`] keeps its pixels in a burn tensor (so it can live on any
//! backend) together with the [`ImageGeometry`] describing how indices map
//! into physical space.

use burn::tensor::backend::Backend;
use burn::tensor::{Tensor, TensorData};
use super::{ImageBuffer, ImageGeometry};
use crate::spatial::{Direction, Point, Spacing};

/// Medical image with physical metadata.
///
/// # Type Parameters
/// * `B` - The backend (CPU or GPU) for tensor operations
/// * `D` - The dimensionality of the image (2 or 3)
///
/// # Axis order
/// The tensor has shape `[.., H, W]`; continuous index component 0 is the
/// last tensor axis (`x`), component 1 the one before it, and so on.
///
/// # Examples
/// ```rust
/// use ritk_core::Image;
/// use ritk_core::spatial::{Point2, Spacing2, Direction2};
/// use burn::tensor::Tensor;
/// use burn_ndarray::NdArray;
///
/// type Backend = NdArray<f32>;
///
/// let device = Default::default();
/// let data = Tensor::<Backend, 2>::zeros([4, 6], &device);
/// let image = Image::new(data, Point2::origin(), Spacing2::uniform(1.0), Direction2::identity());
/// assert_eq!(image.size(), [6, 4]);
/// ```
#[derive(Debug, Clone)]
pub struct Image<B: Backend, const D: usize> {
    /// The pixel data, potentially on GPU.
    data: Tensor<B, D>,
    geometry: ImageGeometry<D>,
}

impl<B: Backend, const D: usize> Image<B, D> {
    /// Create a new image with the given data and metadata.
    pub fn new(data: Tensor<B, D>, origin: Point<D>, spacing: Spacing<D>, direction: Direction<D>) -> Self {
        Self {
            data,
            geometry: ImageGeometry::new(origin, spacing, direction),
        }
    }

    /// Upload a host buffer to `device`.
    pub fn from_buffer(buffer: &ImageBuffer<D>, device: &B::Device) -> Self {
        let mut shape = buffer.size();
        shape.reverse();
        let values: Vec<f32> = buffer.data().iter().map(|&v| v as f32).collect();
        let data = Tensor::<B, D>::from_data(TensorData::new(values, shape), device);
        Self {
            data,
            geometry: buffer.geometry().clone(),
        }
    }

    /// Get the image data tensor.
    pub fn data(&self) -> &Tensor<B, D> {
        &self.data
    }

    /// Get the geometry.
    pub fn geometry(&self) -> &ImageGeometry<D> {
        &self.geometry
    }

    /// Get the origin (physical coordinate of first pixel).
    pub fn origin(&self) -> &Point<D> {
        self.geometry.origin()
    }

    /// Get the spacing (physical distance between pixels).
    pub fn spacing(&self) -> &Spacing<D> {
        self.geometry.spacing()
    }

    /// Get the direction (orientation matrix).
    pub fn direction(&self) -> &Direction<D> {
        self.geometry.direction()
    }

    /// Tensor shape, slowest axis first.
    pub fn shape(&self) -> [usize; D] {
        self.data.dims()
    }

    /// Size along each index axis (index 0 first).
    pub fn size(&self) -> [usize; D] {
        let mut size = self.shape();
        size.reverse();
        size
    }

    /// Convert a continuous physical point to a continuous index.
    pub fn transform_physical_point_to_continuous_index(&self, point: &Point<D>) -> Point<D> {
        self.geometry.continuous_index(point)
    }

    /// Convert a continuous index to a physical point.
    pub fn transform_continuous_index_to_physical_point(&self, index: &Point<D>) -> Point<D> {
        self.geometry.physical_point(index)
    }

    /// Download the pixels into a host-side [`ImageBuffer`].
    pub fn to_buffer(&self) -> ImageBuffer<D> {
        let values: Vec<f64> = self.data.to_data().iter::<f64>().collect();
        ImageBuffer::new(self.size(), values, self.geometry.clone())
    }
}
