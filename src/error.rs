//! Error types for active information storage estimation.

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AisError>;

/// Errors that can occur while configuring or running an estimation.
#[derive(Debug, thiserror::Error)]
pub enum AisError {
    /// Invalid configuration, e.g. an unrecognised auto-embedding method
    /// or a zero search bound.
    #[error("Invalid configuration: {message}")]
    Configuration {
        /// Description of the offending setting.
        message: String,
    },

    /// A numeric property value could not be parsed.
    #[error("Could not parse value {value:?} for property {name}")]
    Parse {
        /// Property name as supplied by the caller.
        name: String,
        /// The raw value that failed to parse.
        value: String,
    },

    /// Scoring a specific embedding candidate failed; the whole search is aborted.
    #[error("Auto-embedding failed while evaluating candidate k={k}, tau={tau}")]
    CandidateEvaluation {
        /// Embedding length of the failing candidate.
        k: usize,
        /// Embedding delay of the failing candidate.
        tau: usize,
        /// Underlying estimator failure.
        #[source]
        source: Box<AisError>,
    },

    /// An operation was called in the wrong lifecycle state.
    #[error("{operation} is not available: {reason}")]
    State {
        /// The operation that was attempted.
        operation: &'static str,
        /// Why it cannot run yet.
        reason: &'static str,
    },

    /// Too few observations for the requested computation.
    #[error("Insufficient observations: need at least {required}, got {actual}")]
    InsufficientObservations {
        /// Minimum number required.
        required: usize,
        /// Number actually available.
        actual: usize,
    },

    /// Malformed input data.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Description of the problem.
        message: String,
    },

    /// A numerical routine failed (e.g. a singular covariance matrix).
    #[error("Numerical failure: {message}")]
    Numerical {
        /// Description of the failure.
        message: String,
    },
}

impl AisError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub(crate) fn numerical(message: impl Into<String>) -> Self {
        Self::Numerical {
            message: message.into(),
        }
    }

    pub(crate) fn parse(name: &str, value: &str) -> Self {
        Self::Parse {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    /// Returns the failing `(k, tau)` if this error came from a candidate evaluation.
    pub fn failing_candidate(&self) -> Option<(usize, usize)> {
        match self {
            Self::CandidateEvaluation { k, tau, .. } => Some((*k, *tau)),
            _ => None,
        }
    }
}
