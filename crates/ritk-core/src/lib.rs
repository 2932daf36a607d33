pub mod image;
pub mod spatial;
pub mod transform;
pub mod interpolation;
pub mod mask;
pub mod sampler;
pub mod filter;

pub use image::{Image, ImageBuffer, ImageGeometry};
pub use spatial::{Point, Vector, Spacing, Direction};
