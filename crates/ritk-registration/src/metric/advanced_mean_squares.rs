//! Advanced Mean Squares metric.
//!
//! Weighted mean of squared intensity differences between the fixed image
//! samples and the moving image at the transformed sample positions:
//!
//! `MS(mu) = factor / sum_x m(T(x)) * sum_x m(T(x)) (M(T(x)) - F(x))^2`
//!
//! where `m` is a (possibly soft) moving mask. The derivative accounts for
//! the mask moving with the transform, so soft masks give exact gradients.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use ritk_core::filter::{ExtremaEstimator, DEFAULT_LIMIT_RANGE_RATIO};
use ritk_core::interpolation::Interpolator;
use ritk_core::mask::MaskEvaluator;
use ritk_core::sampler::ImageSampler;
use ritk_core::transform::Transform;
use crate::error::{RegistrationError, Result};
use crate::validation::{
    validate_limit_range_ratio, validate_parameter_count, RequiredRatioValidator, SampleCountValidator,
};
use super::accumulator::{JacobianScratch, RunningSums, SampleAccumulator};
use super::normalization::calibrate;
use super::trait_::{Evaluation, Metric, SampleStatistics};

/// Configuration for [`AdvancedMeanSquares`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedMeanSquaresConfig {
    /// Scale by `100 / maxdiff^2` computed from the image intensity ranges.
    pub use_normalization: bool,
    /// Range widening ratio for the fixed image extrema.
    pub fixed_limit_range_ratio: f64,
    /// Range widening ratio for the moving image extrema.
    pub moving_limit_range_ratio: f64,
    /// Accumulate samples on the rayon thread pool.
    pub parallel: bool,
}

impl Default for AdvancedMeanSquaresConfig {
    fn default() -> Self {
        Self {
            use_normalization: false,
            fixed_limit_range_ratio: DEFAULT_LIMIT_RANGE_RATIO,
            moving_limit_range_ratio: DEFAULT_LIMIT_RANGE_RATIO,
            parallel: true,
        }
    }
}

impl AdvancedMeanSquaresConfig {
    /// Create a new config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable intensity normalization.
    pub fn with_normalization(mut self, enabled: bool) -> Self {
        self.use_normalization = enabled;
        self
    }

    /// Set both limiter range ratios.
    pub fn with_limit_range_ratios(mut self, fixed: f64, moving: f64) -> Self {
        self.fixed_limit_range_ratio = fixed;
        self.moving_limit_range_ratio = moving;
        self
    }

    /// Enable or disable parallel accumulation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_limit_range_ratio(self.fixed_limit_range_ratio)?;
        validate_limit_range_ratio(self.moving_limit_range_ratio)
    }
}

/// Advanced Mean Squares metric.
///
/// Owns its transform, moving image interpolator, moving mask and fixed
/// image sampler. Parameters passed to an evaluation are written into the
/// transform before sampling, so after an evaluation the transform holds the
/// last evaluated parameters.
///
/// # Example
/// ```
/// use ritk_core::image::{ImageBuffer, ImageGeometry};
/// use ritk_core::interpolation::LinearInterpolator;
/// use ritk_core::mask::UniformMask;
/// use ritk_core::sampler::FullSampler;
/// use ritk_core::transform::TranslationTransform;
/// use ritk_registration::metric::{AdvancedMeanSquares, Metric};
///
/// let fixed = ImageBuffer::filled([8, 8], ImageGeometry::default(), 1.0);
/// let moving = ImageBuffer::filled([8, 8], ImageGeometry::default(), 3.0);
/// let mut metric = AdvancedMeanSquares::new(
///     TranslationTransform::<2>::identity(),
///     LinearInterpolator::new(moving),
///     UniformMask,
///     FullSampler::new(&fixed),
/// );
/// metric.initialize()?;
/// assert_eq!(metric.get_value(&[0.0, 0.0])?, 4.0);
/// # Ok::<(), ritk_registration::RegistrationError>(())
/// ```
pub struct AdvancedMeanSquares<T, I, M, S, const D: usize> {
    transform: T,
    interpolator: I,
    mask: M,
    sampler: S,
    validator: Box<dyn SampleCountValidator>,
    fixed_extrema: Option<Box<dyn ExtremaEstimator>>,
    moving_extrema: Option<Box<dyn ExtremaEstimator>>,
    config: AdvancedMeanSquaresConfig,
    normalization_factor: f64,
    initialized: bool,
}

impl<T, I, M, S, const D: usize> AdvancedMeanSquares<T, I, M, S, D>
where
    T: Transform<D>,
    I: Interpolator<D>,
    M: MaskEvaluator<D>,
    S: ImageSampler<D>,
{
    /// Create a new metric with default configuration and a
    /// [`RequiredRatioValidator`].
    pub fn new(transform: T, interpolator: I, mask: M, sampler: S) -> Self {
        Self {
            transform,
            interpolator,
            mask,
            sampler,
            validator: Box::new(RequiredRatioValidator::default()),
            fixed_extrema: None,
            moving_extrema: None,
            config: AdvancedMeanSquaresConfig::default(),
            normalization_factor: 1.0,
            initialized: false,
        }
    }

    /// Replace the configuration. Takes effect at the next `initialize`.
    pub fn with_config(mut self, config: AdvancedMeanSquaresConfig) -> Self {
        self.config = config;
        self.initialized = false;
        self
    }

    /// Replace the sample-count validator.
    pub fn with_validator(mut self, validator: impl SampleCountValidator + 'static) -> Self {
        self.validator = Box::new(validator);
        self.initialized = false;
        self
    }

    /// Sources of the intensity ranges used for normalization.
    pub fn with_image_extrema(
        mut self,
        fixed: impl ExtremaEstimator + 'static,
        moving: impl ExtremaEstimator + 'static,
    ) -> Self {
        self.fixed_extrema = Some(Box::new(fixed));
        self.moving_extrema = Some(Box::new(moving));
        self.initialized = false;
        self
    }

    pub fn config(&self) -> &AdvancedMeanSquaresConfig {
        &self.config
    }

    /// Factor applied to every value and derivative; 1.0 unless
    /// normalization is enabled.
    pub fn normalization_factor(&self) -> f64 {
        self.normalization_factor
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn transform(&self) -> &T {
        &self.transform
    }
}

impl<T, I, M, S, const D: usize> AdvancedMeanSquares<T, I, M, S, D> {
    fn compute_normalization_factor(&self) -> Result<f64> {
        if !self.config.use_normalization {
            return Ok(1.0);
        }
        let (Some(fixed), Some(moving)) = (&self.fixed_extrema, &self.moving_extrema) else {
            return Err(RegistrationError::invalid_configuration(
                "Normalization requires fixed and moving image extrema",
            ));
        };
        let fixed = fixed.compute_extrema(self.config.fixed_limit_range_ratio);
        let moving = moving.compute_extrema(self.config.moving_limit_range_ratio);
        tracing::debug!(
            fixed_min = fixed.true_min,
            fixed_max = fixed.true_max,
            fixed_limited_min = fixed.limited_min,
            fixed_limited_max = fixed.limited_max,
            moving_min = moving.true_min,
            moving_max = moving.true_max,
            moving_limited_min = moving.limited_min,
            moving_limited_max = moving.limited_max,
            "Computed image extrema"
        );
        calibrate(&fixed, &moving)
    }
}

impl<T, I, M, S, const D: usize> AdvancedMeanSquares<T, I, M, S, D>
where
    T: Transform<D>,
    I: Interpolator<D>,
    M: MaskEvaluator<D>,
    S: ImageSampler<D>,
{
    /// Check the parameters and write them into the transform.
    fn set_parameters(&mut self, parameters: &[f64]) -> Result<()> {
        validate_parameter_count(self.transform.number_of_parameters(), parameters.len())?;
        if !self.initialized {
            return Err(RegistrationError::NotInitialized);
        }
        self.transform.set_parameters(parameters);
        Ok(())
    }

    /// Value at `parameters`, with sample counters.
    pub fn evaluate_value(&mut self, parameters: &[f64]) -> Result<Evaluation> {
        self.set_parameters(parameters)?;

        let samples = self.sampler.update();
        let accumulator = SampleAccumulator::new(&self.transform, &self.interpolator, &self.mask);
        let sums = if self.config.parallel {
            samples
                .par_iter()
                .fold(RunningSums::value_only, |mut sums, sample| {
                    accumulator.accumulate_value(&mut sums, sample);
                    sums
                })
                .reduce(RunningSums::value_only, RunningSums::merge)
        } else {
            samples.iter().fold(RunningSums::value_only(), |mut sums, sample| {
                accumulator.accumulate_value(&mut sums, sample);
                sums
            })
        };

        let stats = SampleStatistics {
            total: samples.len(),
            counted: sums.counted,
            mask_weight_sum: sums.mask_weight_sum,
        };
        tracing::trace!(total = stats.total, counted = stats.counted, mask_weight_sum = stats.mask_weight_sum, "Accumulated value");
        self.validator.check(stats.total, stats.counted, stats.mask_weight_sum)?;

        let scale = self.normalization_factor / sums.mask_weight_sum;
        Ok(Evaluation {
            value: sums.measure * scale,
            derivative: None,
            samples: stats,
        })
    }

    /// Value and derivative at `parameters`, with sample counters.
    pub fn evaluate_value_and_derivative(&mut self, parameters: &[f64]) -> Result<Evaluation> {
        self.set_parameters(parameters)?;
        let n = self.transform.number_of_parameters();

        let samples = self.sampler.update();
        let accumulator = SampleAccumulator::new(&self.transform, &self.interpolator, &self.mask);
        let sums = if self.config.parallel {
            samples
                .par_iter()
                .fold(
                    || (RunningSums::new(n), JacobianScratch::default()),
                    |(mut sums, mut scratch), sample| {
                        accumulator.accumulate_value_and_derivative(&mut sums, &mut scratch, sample);
                        (sums, scratch)
                    },
                )
                .map(|(sums, _)| sums)
                .reduce(|| RunningSums::new(n), RunningSums::merge)
        } else {
            let mut sums = RunningSums::new(n);
            let mut scratch = JacobianScratch::default();
            for sample in samples {
                accumulator.accumulate_value_and_derivative(&mut sums, &mut scratch, sample);
            }
            sums
        };

        let stats = SampleStatistics {
            total: samples.len(),
            counted: sums.counted,
            mask_weight_sum: sums.mask_weight_sum,
        };
        tracing::trace!(total = stats.total, counted = stats.counted, mask_weight_sum = stats.mask_weight_sum, "Accumulated value and derivative");
        self.validator.check(stats.total, stats.counted, stats.mask_weight_sum)?;

        let weight = sums.mask_weight_sum;
        let scale = self.normalization_factor / weight;
        let value = sums.measure * scale;
        let per_weight = value / weight;
        let derivative = sums
            .numerator
            .iter()
            .zip(&sums.denominator)
            .map(|(numerator, denominator)| numerator * scale - denominator * per_weight)
            .collect();

        Ok(Evaluation {
            value,
            derivative: Some(derivative),
            samples: stats,
        })
    }
}

impl<T, I, M, S, const D: usize> Metric for AdvancedMeanSquares<T, I, M, S, D>
where
    T: Transform<D>,
    I: Interpolator<D>,
    M: MaskEvaluator<D>,
    S: ImageSampler<D>,
{
    fn initialize(&mut self) -> Result<()> {
        self.config.validate()?;
        self.validator.validate()?;
        self.normalization_factor = self.compute_normalization_factor()?;
        self.initialized = true;
        tracing::debug!(
            normalization_factor = self.normalization_factor,
            number_of_parameters = self.transform.number_of_parameters(),
            "Initialized {}",
            self.name()
        );
        Ok(())
    }

    fn number_of_parameters(&self) -> usize {
        self.transform.number_of_parameters()
    }

    fn get_value(&mut self, parameters: &[f64]) -> Result<f64> {
        self.evaluate_value(parameters).map(|evaluation| evaluation.value)
    }

    fn get_value_and_derivative(&mut self, parameters: &[f64]) -> Result<(f64, Vec<f64>)> {
        let evaluation = self.evaluate_value_and_derivative(parameters)?;
        Ok((evaluation.value, evaluation.derivative.unwrap_or_default()))
    }

    fn name(&self) -> &'static str {
        "AdvancedMeanSquares"
    }
}
