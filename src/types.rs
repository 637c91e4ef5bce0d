//! Embedding and candidate types shared by the estimators and the search.

use serde::{Deserialize, Serialize};

use crate::error::{AisError, Result};

/// Past-state embedding: `k` lagged samples spaced `tau` apart.
///
/// For a target index `t`, the past state is
/// `[x[t-1], x[t-1-tau], ..., x[t-1-(k-1)*tau]]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Embedding {
    /// Embedding length (number of past samples).
    pub k: usize,
    /// Embedding delay (spacing between past samples).
    pub tau: usize,
}

impl Default for Embedding {
    fn default() -> Self {
        Self { k: 1, tau: 1 }
    }
}

impl Embedding {
    /// Create a validated embedding.
    pub fn new(k: usize, tau: usize) -> Result<Self> {
        if k == 0 {
            return Err(AisError::configuration("embedding length k must be >= 1"));
        }
        if tau == 0 {
            return Err(AisError::configuration("embedding delay tau must be >= 1"));
        }
        Ok(Self { k, tau })
    }

    /// Index of the first sample in a series that has a full past state.
    ///
    /// This is also the number of leading samples consumed by the embedding.
    pub fn first_target_index(&self) -> usize {
        (self.k - 1) * self.tau + 1
    }

    /// Number of (past, next) pairs a series of length `len` yields.
    pub fn observations_in(&self, len: usize) -> usize {
        len.saturating_sub(self.first_target_index())
    }
}

impl std::fmt::Display for Embedding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "k={}, tau={}", self.k, self.tau)
    }
}

/// A scored embedding candidate from an auto-embedding search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Embedding length.
    pub k: usize,
    /// Embedding delay.
    pub tau: usize,
    /// Criterion value (normalised prediction error or bias-corrected AIS).
    pub score: f64,
    /// Observations usable at this embedding.
    pub sample_count: usize,
}

impl Candidate {
    /// The embedding this candidate describes.
    pub fn embedding(&self) -> Embedding {
        Embedding {
            k: self.k,
            tau: self.tau,
        }
    }
}
