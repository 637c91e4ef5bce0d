//! Traversal order of the (k, tau) search grid.

use crate::types::Embedding;

/// Iterator over candidate embeddings.
///
/// Visits `k = 1..=k_max` in order and, for each `k`, `tau = 1..=tau_max`.
/// For `k = 1` only `tau = 1` is produced: the delay has no effect on a
/// one-dimensional past state.
#[derive(Debug, Clone)]
pub struct CandidateGrid {
    k_max: usize,
    tau_max: usize,
    next: Option<Embedding>,
}

/// Candidate grid for the given (inclusive) bounds.
///
/// Bounds of zero produce an empty grid.
pub fn candidate_grid(k_max: usize, tau_max: usize) -> CandidateGrid {
    let next = (k_max >= 1 && tau_max >= 1).then_some(Embedding { k: 1, tau: 1 });
    CandidateGrid {
        k_max,
        tau_max,
        next,
    }
}

impl Iterator for CandidateGrid {
    type Item = Embedding;

    fn next(&mut self) -> Option<Embedding> {
        let current = self.next?;
        self.next = if current.k == 1 || current.tau == self.tau_max {
            (current.k < self.k_max).then_some(Embedding {
                k: current.k + 1,
                tau: 1,
            })
        } else {
            Some(Embedding {
                k: current.k,
                tau: current.tau + 1,
            })
        };
        Some(current)
    }
}
