//! Host-side image buffer used for per-point evaluation.

use super::ImageGeometry;
use crate::spatial::Point;

/// Dense `f64` pixel buffer with geometry.
///
/// Index component 0 varies fastest in memory, which matches the row-major
/// layout of an [`Image`](super::Image) tensor of shape `[.., H, W]`
/// (index 0 is the column `x`).
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer<const D: usize> {
    size: [usize; D],
    strides: [usize; D],
    data: Vec<f64>,
    geometry: ImageGeometry<D>,
}

impl<const D: usize> ImageBuffer<D> {
    /// Wrap `data` laid out with index 0 fastest.
    ///
    /// # Panics
    /// Panics if a size component is zero or `data.len()` does not match.
    pub fn new(size: [usize; D], data: Vec<f64>, geometry: ImageGeometry<D>) -> Self {
        assert!(size.iter().all(|&s| s > 0), "Image size must be non-zero, got {:?}", size);
        let mut strides = [0usize; D];
        let mut stride = 1;
        for d in 0..D {
            strides[d] = stride;
            stride *= size[d];
        }
        assert_eq!(data.len(), stride, "Pixel count does not match size {:?}", size);
        Self {
            size,
            strides,
            data,
            geometry,
        }
    }

    /// Build a buffer by evaluating `f` at every pixel index.
    pub fn from_fn(size: [usize; D], geometry: ImageGeometry<D>, f: impl Fn([usize; D]) -> f64) -> Self {
        let len = size.iter().product();
        let mut data = Vec::with_capacity(len);
        let mut index = [0usize; D];
        for _ in 0..len {
            data.push(f(index));
            for d in 0..D {
                index[d] += 1;
                if index[d] < size[d] {
                    break;
                }
                index[d] = 0;
            }
        }
        Self::new(size, data, geometry)
    }

    /// Constant-valued buffer.
    pub fn filled(size: [usize; D], geometry: ImageGeometry<D>, value: f64) -> Self {
        Self::from_fn(size, geometry, |_| value)
    }

    /// Apply `f` to every pixel value, keeping the geometry.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            size: self.size,
            strides: self.strides,
            data: self.data.iter().map(|&v| f(v)).collect(),
            geometry: self.geometry.clone(),
        }
    }

    /// Size along each index axis.
    pub fn size(&self) -> [usize; D] {
        self.size
    }

    /// Number of pixels.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false; buffers have at least one pixel.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw pixel values.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Physical geometry.
    pub fn geometry(&self) -> &ImageGeometry<D> {
        &self.geometry
    }

    /// Linear offset of a pixel index.
    pub fn offset(&self, index: [usize; D]) -> usize {
        (0..D).map(|d| index[d] * self.strides[d]).sum()
    }

    /// Pixel index of a linear offset.
    pub fn index_of(&self, mut offset: usize) -> [usize; D] {
        let mut index = [0usize; D];
        for d in 0..D {
            index[d] = offset % self.size[d];
            offset /= self.size[d];
        }
        index
    }

    /// Pixel value at a discrete index.
    ///
    /// # Panics
    /// Panics if the index lies outside the buffer.
    pub fn get(&self, index: [usize; D]) -> f64 {
        assert!((0..D).all(|d| index[d] < self.size[d]), "Index {:?} outside {:?}", index, self.size);
        self.data[self.offset(index)]
    }

    /// Physical location of a pixel.
    pub fn physical_point_of(&self, index: [usize; D]) -> Point<D> {
        self.geometry.physical_point_of(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_fn_layout() {
        let buffer = ImageBuffer::<2>::from_fn([3, 2], ImageGeometry::default(), |[x, y]| (x + 10 * y) as f64);
        assert_eq!(buffer.data(), &[0.0, 1.0, 2.0, 10.0, 11.0, 12.0]);
        assert_eq!(buffer.get([2, 1]), 12.0);
    }

    #[test]
    fn test_offset_round_trip() {
        let buffer = ImageBuffer::<3>::filled([4, 3, 2], ImageGeometry::default(), 0.0);
        for offset in 0..buffer.len() {
            assert_eq!(buffer.offset(buffer.index_of(offset)), offset);
        }
    }

    #[test]
    #[should_panic]
    fn test_length_mismatch_panics() {
        let _ = ImageBuffer::<2>::new([2, 2], vec![0.0; 3], ImageGeometry::default());
    }

    #[test]
    fn test_map_scales_values() {
        let buffer = ImageBuffer::<2>::filled([2, 2], ImageGeometry::default(), 3.0).map(|v| 2.0 * v);
        assert!(buffer.data().iter().all(|&v| v == 6.0));
    }
}
