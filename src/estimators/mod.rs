//! Mutual-information estimators over embedded observations.
//!
//! Two estimators are provided:
//!
//! 1. **Gaussian** ([`GaussianMutualInfo`]): closed-form MI from covariance
//!    log-determinants, with analytic bias correction and an analytic
//!    chi-square null distribution
//! 2. **Kraskov** ([`KraskovMutualInfo`]): KSG nearest-neighbour estimator,
//!    which also produces the one-step prediction errors used by the
//!    Ragwitz embedding criterion
//!
//! The embedding search only talks to them through the traits below.

mod gaussian;
mod kraskov;

pub use gaussian::{GaussianMutualInfo, PROP_BIAS_CORRECTION};
pub use kraskov::{KraskovMutualInfo, DEFAULT_NEIGHBOURS, PROP_K, PROP_NORMALISE};

use nalgebra::DMatrix;

use crate::error::Result;
use crate::significance::ChiSquareMeasurementDistribution;

/// Common surface of a mutual-information estimator between a source
/// (past state) and a destination (next value).
pub trait MutualInfoEstimator {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Set a named property.
    ///
    /// Returns `Ok(false)` when the name is not recognised by this estimator.
    fn set_property(&mut self, name: &str, value: &str) -> Result<bool>;

    /// Current value of a named property, or `None` if not recognised.
    fn property(&self, name: &str) -> Option<String>;

    /// Replace all observations. Rows of `source` and `dest` are paired.
    fn set_observations(&mut self, source: DMatrix<f64>, dest: DMatrix<f64>) -> Result<()>;

    /// Number of paired observations currently held.
    fn num_observations(&self) -> usize;

    /// Average MI over the observations, in nats.
    fn compute_average_local_of_observations(&self) -> Result<f64>;

    /// Local MI value for every observation, in nats.
    fn compute_local_of_previous_observations(&self) -> Result<Vec<f64>>;
}

/// Estimators whose average can be adjusted for finite-sample bias.
pub trait BiasCorrection {
    /// Whether bias correction is currently applied.
    fn bias_correction(&self) -> bool;

    /// Turn bias correction on or off.
    fn set_bias_correction(&mut self, enabled: bool);
}

/// Estimators that can predict the destination from source-space neighbours.
pub trait PredictionErrors {
    /// Sum of squared one-step prediction errors, one entry per destination
    /// dimension.
    ///
    /// `neighbours` overrides the estimator's configured neighbour count.
    fn compute_prediction_errors(&self, neighbours: Option<usize>) -> Result<Vec<f64>>;
}

/// Estimators with a closed-form null distribution for their statistic.
pub trait AnalyticNullDistribution {
    /// Distribution of the statistic under the hypothesis of no relationship,
    /// evaluated at the observed value.
    fn compute_significance(&self) -> Result<ChiSquareMeasurementDistribution>;
}
