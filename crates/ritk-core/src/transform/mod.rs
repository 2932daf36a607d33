//! Transform types and operations.
//!
//! Parametric transforms map fixed-image physical points into moving-image
//! physical space and expose their parameter Jacobian, which the metrics use
//! to chain image gradients into parameter derivatives.

pub mod trait_;
pub mod translation;
pub mod affine;
pub mod bspline;

pub use trait_::{JacobianMatrix, Transform, TransformJacobian};
pub use translation::TranslationTransform;
pub use affine::AffineTransform;
pub use bspline::BSplineTransform;
