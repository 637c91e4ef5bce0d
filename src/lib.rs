//! # active-info
//!
//! Active information storage (AIS) of univariate time series under a
//! linear-Gaussian model, with automatic selection of the embedding length
//! `k` and delay `tau`.
//!
//! AIS is the mutual information between a process's past state
//! `(x_{t-1}, x_{t-1-tau}, ..., x_{t-1-(k-1)tau})` and its next value `x_t`.
//! It is reported in nats.
//!
//! ## Embedding selection
//!
//! With `AUTO_EMBED_METHOD` set, `k` and `tau` are chosen when observations
//! are finalised:
//!
//! - `RAGWITZ`: minimise the nearest-neighbour one-step prediction error
//! - `MAX_CORR_AIS`: maximise the bias-corrected Gaussian AIS
//!
//! ## Quick Start
//!
//! ```
//! use active_info::{ActiveInfoStorageGaussian, SearchConfig};
//! use active_info::helpers::autoregressive;
//!
//! let series = autoregressive(&[0.2, 0.6], 1.0, 2_000, 1);
//!
//! let mut calc = ActiveInfoStorageGaussian::with_search_config(SearchConfig::max_corr_ais(4, 2));
//! let embedding = calc.set_observations(&series).unwrap();
//! let ais = calc.compute_average_local_of_observations().unwrap();
//! let significance = calc.compute_significance().unwrap();
//!
//! assert!(embedding.k >= 2);
//! assert!(ais > 0.0);
//! assert!(significance.is_significant(0.05));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
mod calculator;
mod config;
mod error;
mod observations;
mod significance;
mod types;

// Functional modules
pub mod embedding;
pub mod estimators;
pub mod helpers;
pub mod statistics;

// Re-exports for public API
pub use calculator::{ActiveInfoStorageGaussian, Phase};
pub use config::{
    AutoEmbedMethod, SearchConfig, AUTO_EMBED_METHOD_MAX_CORR_AIS, AUTO_EMBED_METHOD_NONE,
    AUTO_EMBED_METHOD_RAGWITZ, PROP_AUTO_EMBED_METHOD, PROP_K_HISTORY, PROP_K_SEARCH_MAX,
    PROP_RAGWITZ_NUM_NNS, PROP_TAU, PROP_TAU_SEARCH_MAX,
};
pub use error::{AisError, Result};
pub use observations::{embed_series, EmbeddedObservations, ObservationSet};
pub use significance::ChiSquareMeasurementDistribution;
pub use types::{Candidate, Embedding};
