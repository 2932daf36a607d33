//! Image-wide filters and statistics.

pub mod extrema;

pub use extrema::{ExtremaEstimator, ImageExtrema, DEFAULT_LIMIT_RANGE_RATIO};
