//! Image samplers.
//!
//! A sampler selects the fixed-image points a metric integrates over. Full
//! and grid samplers return the same set on every update; the random sampler
//! draws a new set each time.

pub mod trait_;
pub mod full;
pub mod grid;
pub mod random;

pub use trait_::{ImageSample, ImageSampler};
pub use full::FullSampler;
pub use grid::GridSampler;
pub use random::RandomSampler;
