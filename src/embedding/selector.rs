//! Orchestration of the embedding search and commitment of its result.

use crate::config::{AutoEmbedMethod, SearchConfig, PROP_AUTO_EMBED_METHOD};
use crate::embedding::{max_corr_ais_search, ragwitz_search};
use crate::error::{AisError, Result};
use crate::estimators::{BiasCorrection, KraskovMutualInfo, MutualInfoEstimator, PredictionErrors};
use crate::observations::ObservationSet;
use crate::types::{Candidate, Embedding};

/// Lifecycle of the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorState {
    /// No selection has run since the last configuration change.
    Idle,
    /// A search is evaluating candidates.
    SearchRunning,
    /// An embedding has been committed (by search or as a no-op for `None`).
    Committed,
}

/// Owns the search configuration and the committed embedding.
#[derive(Debug, Clone)]
pub struct EmbeddingSelector {
    config: SearchConfig,
    embedding: Embedding,
    state: SelectorState,
    last_best: Option<Candidate>,
}

impl Default for EmbeddingSelector {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

impl EmbeddingSelector {
    /// Create a selector with the default (1, 1) embedding.
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            embedding: Embedding::default(),
            state: SelectorState::Idle,
            last_best: None,
        }
    }

    /// Current search configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Mutable access to the search configuration.
    pub fn config_mut(&mut self) -> &mut SearchConfig {
        self.state = SelectorState::Idle;
        &mut self.config
    }

    /// The committed embedding.
    pub fn embedding(&self) -> Embedding {
        self.embedding
    }

    /// Set the embedding manually.
    ///
    /// With a search method configured, the next [`select`](Self::select)
    /// overwrites it.
    pub fn set_embedding(&mut self, embedding: Embedding) {
        self.embedding = embedding;
        self.state = SelectorState::Idle;
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SelectorState {
        self.state
    }

    /// Best candidate of the most recent successful search.
    pub fn last_best(&self) -> Option<Candidate> {
        self.last_best
    }

    /// Committed embedding and last search result, for [`rollback`](Self::rollback).
    pub(crate) fn snapshot(&self) -> (Embedding, Option<Candidate>) {
        (self.embedding, self.last_best)
    }

    /// Undo a commit whose embedding could not be used downstream.
    pub(crate) fn rollback(&mut self, (embedding, last_best): (Embedding, Option<Candidate>)) {
        tracing::debug!(
            "Rolling back committed {} to {}",
            self.embedding,
            embedding
        );
        self.embedding = embedding;
        self.last_best = last_best;
        self.state = SelectorState::Idle;
    }

    /// Run the configured strategy and commit its result.
    ///
    /// `estimator` is the calculator's persistent estimator (used by the max
    /// bias-corrected AIS criterion). Ragwitz builds a fresh
    /// [`KraskovMutualInfo`] for every candidate.
    ///
    /// # Errors
    ///
    /// - [`AisError::Configuration`] for an unrecognised method or invalid
    ///   bounds, before any candidate is evaluated
    /// - [`AisError::CandidateEvaluation`] if a candidate fails; the
    ///   committed embedding is left unchanged
    pub fn select<E>(&mut self, observations: &ObservationSet, estimator: &mut E) -> Result<Embedding>
    where
        E: MutualInfoEstimator + BiasCorrection + ?Sized,
    {
        self.select_with(observations, estimator, KraskovMutualInfo::new)
    }

    /// As [`select`](Self::select), with a custom factory for the Ragwitz
    /// prediction-error estimator.
    pub fn select_with<E, R, F>(
        &mut self,
        observations: &ObservationSet,
        estimator: &mut E,
        new_ragwitz_estimator: F,
    ) -> Result<Embedding>
    where
        E: MutualInfoEstimator + BiasCorrection + ?Sized,
        R: MutualInfoEstimator + PredictionErrors,
        F: FnMut() -> R,
    {
        match &self.config.method {
            AutoEmbedMethod::None => {
                self.state = SelectorState::Committed;
                return Ok(self.embedding);
            }
            AutoEmbedMethod::Unrecognized(name) => {
                return Err(AisError::configuration(format!(
                    "Unexpected value {} for property {}",
                    name, PROP_AUTO_EMBED_METHOD
                )));
            }
            AutoEmbedMethod::Ragwitz | AutoEmbedMethod::MaxCorrAis => {}
        }
        self.config.validate().map_err(AisError::configuration)?;

        self.state = SelectorState::SearchRunning;
        let outcome = if self.config.method == AutoEmbedMethod::Ragwitz {
            ragwitz_search(&self.config, observations, new_ragwitz_estimator)
        } else {
            max_corr_ais_search(&self.config, observations, estimator)
        };

        match outcome {
            Ok(best) => {
                self.embedding = best.embedding();
                self.last_best = Some(best);
                self.state = SelectorState::Committed;
                tracing::debug!("Embedding parameters set to {}", self.embedding);
                Ok(self.embedding)
            }
            Err(e) => {
                self.state = SelectorState::Idle;
                Err(e)
            }
        }
    }
}
