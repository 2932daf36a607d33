//! Metric implementations.
//!
//! [`AdvancedMeanSquares`] is built from small parts that are usable on
//! their own: the normalization calibrator, the Jacobian inner products and
//! the per-sample accumulator.

pub mod trait_;
pub mod normalization;
pub mod inner_product;
pub mod accumulator;
pub mod advanced_mean_squares;

pub use trait_::{Evaluation, Metric, SampleStatistics};
pub use normalization::calibrate;
pub use inner_product::transform_jacobian_inner_products;
pub use accumulator::{RunningSums, SampleAccumulator, MASK_THRESHOLD};
pub use advanced_mean_squares::{AdvancedMeanSquares, AdvancedMeanSquaresConfig};
