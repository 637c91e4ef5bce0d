//! Gaussian (linear) mutual-information estimator.
//!
//! ## Model
//!
//! Source `S` and destination `D` are jointly normal. Then
//!
//! I(S; D) = ½ (ln|Σ_S| + ln|Σ_D| − ln|Σ_SD|)
//!
//! in nats, with all covariances estimated from the observations.
//!
//! ## Bias correction
//!
//! Under independence `2 N I ~ χ²(d_S · d_D)`, so the finite-sample estimate
//! is inflated by `d_S · d_D / (2N)` on average. When bias correction is on,
//! that null mean is subtracted from the average and from every local value.

use nalgebra::{DMatrix, DVector};

use crate::error::{AisError, Result};
use crate::estimators::{AnalyticNullDistribution, BiasCorrection, MutualInfoEstimator};
use crate::significance::ChiSquareMeasurementDistribution;
use crate::statistics::{hstack, GaussianModel};

/// Property name toggling analytic bias correction. Default: `false`.
pub const PROP_BIAS_CORRECTION: &str = "BIAS_CORRECTION";

/// Fitted state, present once observations are supplied.
#[derive(Debug, Clone)]
struct Fitted {
    source: DMatrix<f64>,
    dest: DMatrix<f64>,
    source_model: GaussianModel,
    dest_model: GaussianModel,
    joint_model: GaussianModel,
}

impl Fitted {
    fn mutual_info(&self) -> f64 {
        0.5 * (self.source_model.log_det() + self.dest_model.log_det()
            - self.joint_model.log_det())
    }

    fn degrees_of_freedom(&self) -> usize {
        self.source_model.dims() * self.dest_model.dims()
    }

    fn local(&self, s: DVector<f64>, d: DVector<f64>) -> f64 {
        let joint = DVector::from_iterator(s.len() + d.len(), s.iter().chain(d.iter()).copied());
        self.joint_model.log_pdf(&joint) - self.source_model.log_pdf(&s) - self.dest_model.log_pdf(&d)
    }
}

/// Mutual information under a linear-Gaussian model.
#[derive(Debug, Clone, Default)]
pub struct GaussianMutualInfo {
    bias_correction: bool,
    fitted: Option<Fitted>,
}

impl GaussianMutualInfo {
    /// Create an estimator with bias correction off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop any fitted observations, keeping properties.
    pub fn clear(&mut self) {
        self.fitted = None;
    }

    fn fitted(&self, operation: &'static str) -> Result<&Fitted> {
        self.fitted.as_ref().ok_or(AisError::State {
            operation,
            reason: "no observations have been supplied",
        })
    }

    fn correction(&self, fitted: &Fitted) -> f64 {
        if self.bias_correction {
            fitted.degrees_of_freedom() as f64 / (2.0 * fitted.source.nrows() as f64)
        } else {
            0.0
        }
    }

    /// Local MI values for new observations under the already-fitted model.
    pub fn compute_local_using_previous_observations(
        &self,
        source: &DMatrix<f64>,
        dest: &DMatrix<f64>,
    ) -> Result<Vec<f64>> {
        let fitted = self.fitted("computing locals for new observations")?;
        if source.ncols() != fitted.source.ncols() || dest.ncols() != fitted.dest.ncols() {
            return Err(AisError::invalid_input(format!(
                "dimension mismatch: model is {}x{}, got {}x{}",
                fitted.source.ncols(),
                fitted.dest.ncols(),
                source.ncols(),
                dest.ncols()
            )));
        }
        if source.nrows() != dest.nrows() {
            return Err(AisError::invalid_input(format!(
                "source has {} rows but destination has {}",
                source.nrows(),
                dest.nrows()
            )));
        }
        let correction = self.correction(fitted);
        Ok(source
            .row_iter()
            .zip(dest.row_iter())
            .map(|(s, d)| fitted.local(s.transpose(), d.transpose()) - correction)
            .collect())
    }
}

impl MutualInfoEstimator for GaussianMutualInfo {
    fn name(&self) -> &'static str {
        "gaussian"
    }

    fn set_property(&mut self, name: &str, value: &str) -> Result<bool> {
        if name.eq_ignore_ascii_case(PROP_BIAS_CORRECTION) {
            self.bias_correction = parse_bool(name, value)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn property(&self, name: &str) -> Option<String> {
        if name.eq_ignore_ascii_case(PROP_BIAS_CORRECTION) {
            Some(self.bias_correction.to_string())
        } else {
            None
        }
    }

    fn set_observations(&mut self, source: DMatrix<f64>, dest: DMatrix<f64>) -> Result<()> {
        self.fitted = None;
        if source.nrows() != dest.nrows() {
            return Err(AisError::invalid_input(format!(
                "source has {} rows but destination has {}",
                source.nrows(),
                dest.nrows()
            )));
        }
        if source.nrows() < 2 {
            return Err(AisError::InsufficientObservations {
                required: 2,
                actual: source.nrows(),
            });
        }
        let joint = hstack(&source, &dest);
        let fitted = Fitted {
            source_model: GaussianModel::fit(&source)?,
            dest_model: GaussianModel::fit(&dest)?,
            joint_model: GaussianModel::fit(&joint)?,
            source,
            dest,
        };
        self.fitted = Some(fitted);
        Ok(())
    }

    fn num_observations(&self) -> usize {
        self.fitted.as_ref().map_or(0, |f| f.source.nrows())
    }

    fn compute_average_local_of_observations(&self) -> Result<f64> {
        let fitted = self.fitted("computing the average MI")?;
        Ok(fitted.mutual_info() - self.correction(fitted))
    }

    fn compute_local_of_previous_observations(&self) -> Result<Vec<f64>> {
        let fitted = self.fitted("computing local MI values")?;
        self.compute_local_using_previous_observations(&fitted.source, &fitted.dest)
    }
}

impl BiasCorrection for GaussianMutualInfo {
    fn bias_correction(&self) -> bool {
        self.bias_correction
    }

    fn set_bias_correction(&mut self, enabled: bool) {
        self.bias_correction = enabled;
    }
}

impl AnalyticNullDistribution for GaussianMutualInfo {
    fn compute_significance(&self) -> Result<ChiSquareMeasurementDistribution> {
        let fitted = self.fitted("computing significance")?;
        ChiSquareMeasurementDistribution::new(
            fitted.mutual_info(),
            fitted.source.nrows(),
            fitted.degrees_of_freedom(),
        )
    }
}

pub(crate) fn parse_bool(name: &str, value: &str) -> Result<bool> {
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(AisError::parse(name, value))
    }
}
