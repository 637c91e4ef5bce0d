//! Active information storage calculator with automatic embedding.
//!
//! [`ActiveInfoStorageGaussian`] collects observations of a univariate
//! process, selects `k` and `tau` when an auto-embedding method is
//! configured, and estimates AIS under a linear-Gaussian model.
//!
//! # Example
//!
//! ```ignore
//! use active_info::ActiveInfoStorageGaussian;
//!
//! let mut calc = ActiveInfoStorageGaussian::new();
//! calc.set_property("AUTO_EMBED_METHOD", "MAX_CORR_AIS")?;
//! calc.set_property("AUTO_EMBED_K_SEARCH_MAX", "5")?;
//! calc.set_observations(&series)?;
//! let ais = calc.compute_average_local_of_observations()?;
//! ```

use crate::config::{
    AutoEmbedMethod, SearchConfig, PROP_AUTO_EMBED_METHOD, PROP_K_HISTORY, PROP_K_SEARCH_MAX,
    PROP_RAGWITZ_NUM_NNS, PROP_TAU, PROP_TAU_SEARCH_MAX,
};
use crate::embedding::{prepare_estimator, EmbeddingSelector};
use crate::error::{AisError, Result};
use crate::estimators::{
    AnalyticNullDistribution, GaussianMutualInfo, KraskovMutualInfo, MutualInfoEstimator, PROP_K,
};
use crate::observations::{embed_series, pad_locals, ObservationSet};
use crate::significance::ChiSquareMeasurementDistribution;
use crate::types::{Candidate, Embedding};

/// Where the calculator is in its observation lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Freshly created or re-initialised; no observations pending.
    Initialised,
    /// Between `start_add_observations` and `finalise_add_observations`.
    Accumulating,
    /// Embedding committed and the estimator fitted.
    Finalised,
}

/// Gaussian AIS calculator.
#[derive(Debug, Clone)]
pub struct ActiveInfoStorageGaussian {
    selector: EmbeddingSelector,
    estimator: GaussianMutualInfo,
    observations: ObservationSet,
    phase: Phase,
    /// `AUTO_EMBED_METHOD` exactly as last passed to `set_property`.
    method_value: Option<String>,
}

impl Default for ActiveInfoStorageGaussian {
    fn default() -> Self {
        Self::new()
    }
}

impl ActiveInfoStorageGaussian {
    /// Create a calculator with embedding (1, 1) and no auto-embedding.
    pub fn new() -> Self {
        Self::with_search_config(SearchConfig::default())
    }

    /// Create a calculator driven by a typed search configuration.
    pub fn with_search_config(config: SearchConfig) -> Self {
        Self {
            selector: EmbeddingSelector::new(config),
            estimator: GaussianMutualInfo::new(),
            observations: ObservationSet::new(),
            phase: Phase::Initialised,
            method_value: None,
        }
    }

    /// Current search configuration.
    pub fn search_config(&self) -> &SearchConfig {
        self.selector.config()
    }

    /// The embedding selector, for inspecting its state.
    pub fn selector(&self) -> &EmbeddingSelector {
        &self.selector
    }

    /// Lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Discard observations and any fitted model. Properties and the
    /// current embedding are kept.
    pub fn initialise(&mut self) {
        self.observations.clear();
        self.estimator.clear();
        self.phase = Phase::Initialised;
    }

    /// As [`initialise`](Self::initialise), also setting the embedding.
    pub fn initialise_with(&mut self, k: usize, tau: usize) -> Result<()> {
        let embedding = Embedding::new(k, tau)?;
        self.initialise();
        self.selector.set_embedding(embedding);
        Ok(())
    }

    /// Set a named property. Names are matched case-insensitively.
    ///
    /// Auto-embedding properties are handled here, then `k_HISTORY` and
    /// `TAU`, then anything the Gaussian estimator recognises. Unknown names
    /// are ignored.
    ///
    /// # Errors
    ///
    /// - [`AisError::Parse`] if a numeric or boolean value is malformed
    /// - [`AisError::Configuration`] if a count is zero
    pub fn set_property(&mut self, name: &str, value: &str) -> Result<()> {
        if self.set_search_property(name, value)? || self.set_embedding_property(name, value)? {
            tracing::debug!("Set property {} to {}", name, value);
            return Ok(());
        }
        if self.estimator.set_property(name, value)? {
            tracing::debug!("Set property {} to {} on {} estimator", name, value, self.estimator.name());
        } else {
            tracing::debug!("Ignoring unrecognised property {}", name);
        }
        Ok(())
    }

    fn set_search_property(&mut self, name: &str, value: &str) -> Result<bool> {
        if name.eq_ignore_ascii_case(PROP_AUTO_EMBED_METHOD) {
            self.selector.config_mut().method = AutoEmbedMethod::from_name(value.trim());
            self.method_value = Some(value.to_string());
        } else if name.eq_ignore_ascii_case(PROP_K_SEARCH_MAX) {
            let k_max = parse_positive(name, value)?;
            self.selector.config_mut().k_search_max = k_max;
        } else if name.eq_ignore_ascii_case(PROP_TAU_SEARCH_MAX) {
            let tau_max = parse_positive(name, value)?;
            self.selector.config_mut().tau_search_max = tau_max;
        } else if name.eq_ignore_ascii_case(PROP_RAGWITZ_NUM_NNS) {
            let neighbours = parse_positive(name, value)?;
            self.selector.config_mut().ragwitz_neighbours = Some(neighbours);
        } else {
            return Ok(false);
        }
        Ok(true)
    }

    fn set_embedding_property(&mut self, name: &str, value: &str) -> Result<bool> {
        let current = self.selector.embedding();
        let embedding = if name.eq_ignore_ascii_case(PROP_K_HISTORY) {
            Embedding::new(parse_positive(name, value)?, current.tau)?
        } else if name.eq_ignore_ascii_case(PROP_TAU) {
            Embedding::new(current.k, parse_positive(name, value)?)?
        } else {
            return Ok(false);
        };
        self.selector.set_embedding(embedding);
        Ok(true)
    }

    /// Current value of a named property, or `None` if not recognised.
    ///
    /// `AUTO_EMBED_METHOD` is returned as the caller set it; a method that
    /// came from the typed configuration is reported by its canonical name.
    pub fn property(&self, name: &str) -> Option<String> {
        let config = self.selector.config();
        if name.eq_ignore_ascii_case(PROP_AUTO_EMBED_METHOD) {
            match &self.method_value {
                Some(raw) => Some(raw.clone()),
                None => Some(config.method.to_string()),
            }
        } else if name.eq_ignore_ascii_case(PROP_K_SEARCH_MAX) {
            Some(config.k_search_max.to_string())
        } else if name.eq_ignore_ascii_case(PROP_TAU_SEARCH_MAX) {
            Some(config.tau_search_max.to_string())
        } else if name.eq_ignore_ascii_case(PROP_RAGWITZ_NUM_NNS) {
            match config.ragwitz_neighbours {
                Some(neighbours) => Some(neighbours.to_string()),
                None => KraskovMutualInfo::new().property(PROP_K),
            }
        } else if name.eq_ignore_ascii_case(PROP_K_HISTORY) {
            Some(self.selector.embedding().k.to_string())
        } else if name.eq_ignore_ascii_case(PROP_TAU) {
            Some(self.selector.embedding().tau.to_string())
        } else {
            self.estimator.property(name)
        }
    }

    /// Begin a fresh batch of observations, discarding any previous ones.
    pub fn start_add_observations(&mut self) {
        self.observations.clear();
        self.estimator.clear();
        self.phase = Phase::Accumulating;
    }

    /// Add one series.
    ///
    /// # Errors
    ///
    /// - [`AisError::State`] outside `start_add_observations` /
    ///   `finalise_add_observations`
    /// - [`AisError::InvalidInput`] if the series has non-finite values
    pub fn add_observations(&mut self, series: &[f64]) -> Result<()> {
        self.require_accumulating("add_observations")?;
        check_finite(series)?;
        self.observations.push(series.to_vec());
        Ok(())
    }

    /// Add one series, keeping only samples whose `valid` flag is set.
    ///
    /// Each contiguous run of valid samples becomes a separate series, so no
    /// embedding vector spans an invalid sample.
    pub fn add_observations_with_validity(&mut self, series: &[f64], valid: &[bool]) -> Result<()> {
        self.require_accumulating("add_observations_with_validity")?;
        if series.len() != valid.len() {
            return Err(AisError::invalid_input(format!(
                "series has {} samples but validity mask has {}",
                series.len(),
                valid.len()
            )));
        }
        check_finite_where(series, valid)?;

        let mut start = None;
        for (t, &ok) in valid.iter().enumerate() {
            match (ok, start) {
                (true, None) => start = Some(t),
                (false, Some(s)) => {
                    self.observations.push(series[s..t].to_vec());
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            self.observations.push(series[s..].to_vec());
        }
        Ok(())
    }

    /// Start, add a single series and finalise in one call.
    pub fn set_observations(&mut self, series: &[f64]) -> Result<Embedding> {
        self.start_add_observations();
        self.add_observations(series)?;
        self.finalise_add_observations()
    }

    /// Close the batch: run the configured embedding search, then fit the
    /// estimator at the committed embedding.
    ///
    /// Returns the committed embedding.
    ///
    /// # Errors
    ///
    /// - [`AisError::State`] if no batch was started
    /// - [`AisError::InsufficientObservations`] if nothing was added
    /// - any search error (see [`EmbeddingSelector::select`]), or a failure
    ///   to fit the estimator at the chosen embedding. In both cases the
    ///   embedding and last search result are left as they were before the
    ///   call, and the calculator stays in the accumulating phase so the
    ///   batch can be retried
    pub fn finalise_add_observations(&mut self) -> Result<Embedding> {
        self.require_accumulating("finalise_add_observations")?;
        if self.observations.is_empty() {
            return Err(AisError::InsufficientObservations {
                required: 1,
                actual: 0,
            });
        }

        let previous = self.selector.snapshot();
        let embedding = match self.selector.select(&self.observations, &mut self.estimator) {
            Ok(embedding) => embedding,
            Err(e) => {
                self.estimator.clear();
                return Err(e);
            }
        };

        let skipped = self
            .observations
            .series()
            .iter()
            .filter(|s| embedding.observations_in(s.len()) == 0)
            .count();
        if skipped > 0 {
            tracing::warn!(
                "{} series too short for {}; they contribute no observations",
                skipped,
                embedding
            );
        }

        let samples = match prepare_estimator(&mut self.estimator, embedding, &self.observations) {
            Ok(samples) => samples,
            Err(e) => {
                self.selector.rollback(previous);
                self.estimator.clear();
                return Err(e);
            }
        };
        tracing::debug!("Finalised {} observations at {}", samples, embedding);
        self.phase = Phase::Finalised;
        Ok(embedding)
    }

    /// Average AIS over the supplied observations, in nats.
    pub fn compute_average_local_of_observations(&self) -> Result<f64> {
        self.require_finalised("compute_average_local_of_observations")?;
        self.estimator.compute_average_local_of_observations()
    }

    /// Local AIS for every supplied sample, concatenated over series.
    ///
    /// The first `(k-1)*tau+1` samples of each series have no full past state
    /// and are reported as zero.
    pub fn compute_local_of_previous_observations(&self) -> Result<Vec<f64>> {
        self.require_finalised("compute_local_of_previous_observations")?;
        let locals = self.estimator.compute_local_of_previous_observations()?;
        Ok(pad_locals(
            self.embedding(),
            &self.observations.series_lengths(),
            &locals,
        ))
    }

    /// Local AIS for a new series under the fitted model, padded as in
    /// [`compute_local_of_previous_observations`](Self::compute_local_of_previous_observations).
    pub fn compute_local_using_previous_observations(&self, series: &[f64]) -> Result<Vec<f64>> {
        self.require_finalised("compute_local_using_previous_observations")?;
        check_finite(series)?;
        let embedded = embed_series(series, self.embedding());
        let locals = self
            .estimator
            .compute_local_using_previous_observations(&embedded.past, &embedded.next)?;
        Ok(embedded.pad_locals(&locals))
    }

    /// Analytic chi-square significance of the observed AIS.
    ///
    /// # Errors
    ///
    /// [`AisError::State`] before observations have been finalised.
    pub fn compute_significance(&self) -> Result<ChiSquareMeasurementDistribution> {
        self.require_finalised("compute_significance")?;
        self.estimator.compute_significance()
    }

    /// Number of (past, next) pairs the fitted estimator holds.
    pub fn num_observations(&self) -> usize {
        self.estimator.num_observations()
    }

    /// The current (manual or committed) embedding.
    pub fn embedding(&self) -> Embedding {
        self.selector.embedding()
    }

    /// Best candidate of the most recent search, if one has run.
    pub fn last_search(&self) -> Option<Candidate> {
        self.selector.last_best()
    }

    fn require_accumulating(&self, operation: &'static str) -> Result<()> {
        if self.phase == Phase::Accumulating {
            Ok(())
        } else {
            Err(AisError::State {
                operation,
                reason: "start_add_observations has not been called",
            })
        }
    }

    fn require_finalised(&self, operation: &'static str) -> Result<()> {
        if self.phase == Phase::Finalised {
            Ok(())
        } else {
            Err(AisError::State {
                operation,
                reason: "observations have not been finalised",
            })
        }
    }
}

fn parse_positive(name: &str, value: &str) -> Result<usize> {
    let parsed: usize = value.trim().parse().map_err(|_| AisError::parse(name, value))?;
    if parsed == 0 {
        return Err(AisError::configuration(format!("{} must be >= 1", name)));
    }
    Ok(parsed)
}

fn check_finite(series: &[f64]) -> Result<()> {
    match series.iter().position(|x| !x.is_finite()) {
        Some(t) => Err(AisError::invalid_input(format!(
            "non-finite value {} at index {}",
            series[t], t
        ))),
        None => Ok(()),
    }
}

fn check_finite_where(series: &[f64], valid: &[bool]) -> Result<()> {
    match (0..series.len()).find(|&t| valid[t] && !series[t].is_finite()) {
        Some(t) => Err(AisError::invalid_input(format!(
            "non-finite value {} at valid index {}",
            series[t], t
        ))),
        None => Ok(()),
    }
}
