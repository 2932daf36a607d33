//! Image types.
//!
//! [`Image`] is the tensor-backed image used across ritk; [`ImageBuffer`] is
//! its host-side `f64` copy used by point-wise interpolators, masks and
//! samplers.

pub mod image;
pub mod geometry;
pub mod buffer;

pub use image::Image;
pub use geometry::ImageGeometry;
pub use buffer::ImageBuffer;
