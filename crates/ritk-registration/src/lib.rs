pub mod metric;
pub mod error;
pub mod validation;

pub use error::{RegistrationError, Result};
pub use metric::{AdvancedMeanSquares, AdvancedMeanSquaresConfig, Evaluation, Metric, SampleStatistics};
pub use validation::{RequiredRatioValidator, SampleCountValidator};
