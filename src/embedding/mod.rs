//! Automatic selection of the embedding length `k` and delay `tau`.
//!
//! Two criteria are supported, both evaluated over the same grid
//! (see [`candidate_grid`]):
//!
//! 1. **Ragwitz** ([`ragwitz_search`]): minimise the nearest-neighbour
//!    one-step prediction error, normalised by the number of usable
//!    observations
//! 2. **Max bias-corrected AIS** ([`max_corr_ais_search`]): maximise the
//!    bias-corrected AIS of the calculator's own estimator
//!
//! [`EmbeddingSelector`] owns the search configuration and the committed
//! embedding and dispatches to the configured strategy.

mod grid;
mod guard;
mod search;
mod selector;

pub use grid::{candidate_grid, CandidateGrid};
pub use guard::BiasCorrectionGuard;
pub use search::{max_corr_ais_search, ragwitz_search};
pub use selector::{EmbeddingSelector, SelectorState};

use crate::error::Result;
use crate::estimators::MutualInfoEstimator;
use crate::observations::ObservationSet;
use crate::types::Embedding;

/// Embed `observations` at `embedding` and load them into `estimator`.
///
/// Returns the number of observations the estimator now holds.
pub fn prepare_estimator<E>(
    estimator: &mut E,
    embedding: Embedding,
    observations: &ObservationSet,
) -> Result<usize>
where
    E: MutualInfoEstimator + ?Sized,
{
    let embedded = observations.embed(embedding);
    estimator.set_observations(embedded.past, embedded.next)?;
    Ok(estimator.num_observations())
}
