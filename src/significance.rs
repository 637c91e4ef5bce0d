//! Analytic (non-resampled) significance for Gaussian mutual information.
//!
//! Under the null hypothesis of no relationship between source and
//! destination, `2 N I` is asymptotically chi-square distributed with
//! `d_source * d_dest` degrees of freedom (Brillinger; Geweke).

use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::error::{AisError, Result};

/// Observed MI together with its analytic chi-square null distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChiSquareMeasurementDistribution {
    /// Observed (uncorrected) MI in nats.
    pub actual_value: f64,
    /// Test statistic `2 N I`.
    pub test_statistic: f64,
    /// Degrees of freedom of the null chi-square distribution.
    pub degrees_of_freedom: usize,
    /// Number of observations `N`.
    pub observations: usize,
    /// Probability of a statistic at least as large under the null.
    pub p_value: f64,
}

impl ChiSquareMeasurementDistribution {
    /// Evaluate the null distribution at an observed MI value.
    pub fn new(actual_value: f64, observations: usize, degrees_of_freedom: usize) -> Result<Self> {
        if degrees_of_freedom == 0 {
            return Err(AisError::invalid_input(
                "chi-square null distribution needs at least one degree of freedom",
            ));
        }
        let test_statistic = 2.0 * observations as f64 * actual_value;
        let null = ChiSquared::new(degrees_of_freedom as f64)
            .map_err(|e| AisError::numerical(format!("invalid chi-square distribution: {e}")))?;
        // Negative MI estimates sit below the support; the tail mass is then 1.
        let p_value = null.sf(test_statistic.max(0.0)).clamp(0.0, 1.0);
        Ok(Self {
            actual_value,
            test_statistic,
            degrees_of_freedom,
            observations,
            p_value,
        })
    }

    /// Mean of the null distribution expressed as MI (`dof / 2N`).
    ///
    /// This is the quantity subtracted by analytic bias correction.
    pub fn null_mean(&self) -> f64 {
        self.degrees_of_freedom as f64 / (2.0 * self.observations as f64)
    }

    /// True if the p-value is below `alpha`.
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}
