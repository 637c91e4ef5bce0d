//! Configuration for automatic embedding selection.
//!
//! [`SearchConfig`] is the typed form; the string property names below are
//! the surface accepted by
//! [`ActiveInfoStorageGaussian::set_property`](crate::ActiveInfoStorageGaussian::set_property).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Property name for the auto-embedding method. Defaults to `NONE`.
pub const PROP_AUTO_EMBED_METHOD: &str = "AUTO_EMBED_METHOD";

/// Property name for the maximum embedding length searched. Defaults to 1.
pub const PROP_K_SEARCH_MAX: &str = "AUTO_EMBED_K_SEARCH_MAX";

/// Property name for the maximum embedding delay searched. Defaults to 1.
pub const PROP_TAU_SEARCH_MAX: &str = "AUTO_EMBED_TAU_SEARCH_MAX";

/// Property name for the nearest-neighbour count used by the Ragwitz search.
///
/// Defaults to the neighbour count of a default
/// [`KraskovMutualInfo`](crate::estimators::KraskovMutualInfo).
pub const PROP_RAGWITZ_NUM_NNS: &str = "AUTO_EMBED_RAGWITZ_NUM_NNS";

/// Property name for the embedding length of the calculator.
pub const PROP_K_HISTORY: &str = "k_HISTORY";

/// Property name for the embedding delay of the calculator.
pub const PROP_TAU: &str = "TAU";

/// Property value for [`AutoEmbedMethod::None`].
pub const AUTO_EMBED_METHOD_NONE: &str = "NONE";

/// Property value for [`AutoEmbedMethod::Ragwitz`].
pub const AUTO_EMBED_METHOD_RAGWITZ: &str = "RAGWITZ";

/// Property value for [`AutoEmbedMethod::MaxCorrAis`].
pub const AUTO_EMBED_METHOD_MAX_CORR_AIS: &str = "MAX_CORR_AIS";

/// Strategy used to pick the embedding parameters.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AutoEmbedMethod {
    /// Use the manually configured `k` and `tau`.
    #[default]
    None,
    /// Minimise the nearest-neighbour one-step prediction error.
    Ragwitz,
    /// Maximise the bias-corrected active information storage.
    MaxCorrAis,
    /// A method name that was set through the property surface but is not
    /// known. Kept verbatim and rejected when a search starts.
    Unrecognized(String),
}

impl AutoEmbedMethod {
    /// Property value naming this method.
    pub fn as_str(&self) -> &str {
        match self {
            Self::None => AUTO_EMBED_METHOD_NONE,
            Self::Ragwitz => AUTO_EMBED_METHOD_RAGWITZ,
            Self::MaxCorrAis => AUTO_EMBED_METHOD_MAX_CORR_AIS,
            Self::Unrecognized(name) => name,
        }
    }

    /// True unless the method is [`AutoEmbedMethod::None`].
    pub fn is_search(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Parse a property value. Case-insensitive; unknown names map to
    /// [`AutoEmbedMethod::Unrecognized`].
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case(AUTO_EMBED_METHOD_NONE) {
            Self::None
        } else if name.eq_ignore_ascii_case(AUTO_EMBED_METHOD_RAGWITZ) {
            Self::Ragwitz
        } else if name.eq_ignore_ascii_case(AUTO_EMBED_METHOD_MAX_CORR_AIS) {
            Self::MaxCorrAis
        } else {
            Self::Unrecognized(name.to_string())
        }
    }
}

impl FromStr for AutoEmbedMethod {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

impl fmt::Display for AutoEmbedMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings that drive the embedding search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Which search strategy to run, if any. Default: `None`.
    pub method: AutoEmbedMethod,

    /// Largest embedding length in the search grid. Default: 1.
    pub k_search_max: usize,

    /// Largest embedding delay in the search grid. Default: 1.
    pub tau_search_max: usize,

    /// Neighbours used for Ragwitz prediction errors.
    ///
    /// `None` defers to the nearest-neighbour estimator's own default.
    pub ragwitz_neighbours: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            method: AutoEmbedMethod::None,
            k_search_max: 1,
            tau_search_max: 1,
            ragwitz_neighbours: None,
        }
    }
}

impl SearchConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ragwitz search over `k <= k_max`, `tau <= tau_max`.
    pub fn ragwitz(k_max: usize, tau_max: usize) -> Self {
        Self::new()
            .method(AutoEmbedMethod::Ragwitz)
            .k_search_max(k_max)
            .tau_search_max(tau_max)
    }

    /// Max bias-corrected AIS search over `k <= k_max`, `tau <= tau_max`.
    pub fn max_corr_ais(k_max: usize, tau_max: usize) -> Self {
        Self::new()
            .method(AutoEmbedMethod::MaxCorrAis)
            .k_search_max(k_max)
            .tau_search_max(tau_max)
    }

    /// Set the search method.
    pub fn method(mut self, method: AutoEmbedMethod) -> Self {
        self.method = method;
        self
    }

    /// Set the maximum embedding length.
    pub fn k_search_max(mut self, k_max: usize) -> Self {
        assert!(k_max > 0, "k_search_max must be positive");
        self.k_search_max = k_max;
        self
    }

    /// Set the maximum embedding delay.
    pub fn tau_search_max(mut self, tau_max: usize) -> Self {
        assert!(tau_max > 0, "tau_search_max must be positive");
        self.tau_search_max = tau_max;
        self
    }

    /// Set the Ragwitz neighbour count.
    pub fn ragwitz_neighbours(mut self, neighbours: usize) -> Self {
        assert!(neighbours > 0, "ragwitz_neighbours must be positive");
        self.ragwitz_neighbours = Some(neighbours);
        self
    }

    /// Number of candidates the search grid contains.
    ///
    /// Zero when either bound is zero, matching
    /// [`candidate_grid`](crate::embedding::candidate_grid).
    pub fn grid_size(&self) -> usize {
        if self.k_search_max == 0 || self.tau_search_max == 0 {
            return 0;
        }
        1 + (self.k_search_max - 1) * self.tau_search_max
    }

    /// Check if the configuration is valid.
    ///
    /// Returns an error message if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.k_search_max == 0 {
            return Err("k_search_max must be positive".to_string());
        }
        if self.tau_search_max == 0 {
            return Err("tau_search_max must be positive".to_string());
        }
        if self.ragwitz_neighbours == Some(0) {
            return Err("ragwitz_neighbours must be positive".to_string());
        }
        if let AutoEmbedMethod::Unrecognized(name) = &self.method {
            return Err(format!(
                "Unexpected value {} for property {}",
                name, PROP_AUTO_EMBED_METHOD
            ));
        }
        Ok(())
    }
}
