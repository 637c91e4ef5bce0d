//! The two candidate-evaluation strategies.

use crate::config::SearchConfig;
use crate::embedding::{candidate_grid, prepare_estimator, BiasCorrectionGuard};
use crate::error::{AisError, Result};
use crate::estimators::{BiasCorrection, MutualInfoEstimator, PredictionErrors};
use crate::observations::ObservationSet;
use crate::types::{Candidate, Embedding};

fn wrap_candidate_error(embedding: Embedding, source: AisError) -> AisError {
    AisError::CandidateEvaluation {
        k: embedding.k,
        tau: embedding.tau,
        source: Box::new(source),
    }
}

/// Starting point for both searches: (1, 1) with a sentinel score.
fn floor_candidate(score: f64) -> Candidate {
    Candidate {
        k: 1,
        tau: 1,
        score,
        sample_count: 0,
    }
}

/// Ragwitz criterion: pick the embedding with the lowest one-step prediction
/// error per usable observation.
///
/// A fresh estimator is built by `new_estimator` for every candidate. The
/// prediction uses `config.ragwitz_neighbours` when set, otherwise the
/// estimator's own neighbour count. Dividing by the observation count puts
/// embeddings that consume more leading samples on a comparable basis.
///
/// Ties keep the earlier candidate (smaller k, then smaller tau). If no
/// candidate improves on +∞, the result is (1, 1).
///
/// # Errors
///
/// The first failing candidate aborts the search with
/// [`AisError::CandidateEvaluation`] carrying its `(k, tau)`.
pub fn ragwitz_search<E, F>(
    config: &SearchConfig,
    observations: &ObservationSet,
    mut new_estimator: F,
) -> Result<Candidate>
where
    E: MutualInfoEstimator + PredictionErrors,
    F: FnMut() -> E,
{
    tracing::debug!(
        "Beginning Ragwitz auto-embedding with k_max={}, tau_max={}",
        config.k_search_max,
        config.tau_search_max
    );

    let mut best = floor_candidate(f64::INFINITY);
    for embedding in candidate_grid(config.k_search_max, config.tau_search_max) {
        let mut estimator = new_estimator();
        let (score, sample_count) =
            evaluate_ragwitz(&mut estimator, embedding, observations, config.ragwitz_neighbours)
                .map_err(|e| wrap_candidate_error(embedding, e))?;

        tracing::debug!(
            "Embedding prediction error for {} is {:.5} ({} samples)",
            embedding,
            score,
            sample_count
        );
        if score < best.score {
            best = Candidate {
                k: embedding.k,
                tau: embedding.tau,
                score,
                sample_count,
            };
        }
    }
    Ok(best)
}

fn evaluate_ragwitz<E>(
    estimator: &mut E,
    embedding: Embedding,
    observations: &ObservationSet,
    neighbours: Option<usize>,
) -> Result<(f64, usize)>
where
    E: MutualInfoEstimator + PredictionErrors,
{
    let samples = prepare_estimator(estimator, embedding, observations)?;
    let errors = estimator.compute_prediction_errors(neighbours)?;
    let first = errors
        .first()
        .copied()
        .ok_or_else(|| AisError::numerical("estimator returned no prediction errors"))?;
    Ok((first / samples as f64, samples))
}

/// Max bias-corrected AIS criterion: pick the embedding whose bias-corrected
/// AIS is highest.
///
/// The calculator's own estimator is reused for every candidate so that any
/// properties configured on it apply. Its bias correction is forced on for
/// the duration of the search and restored afterwards on every exit path,
/// including a failed candidate.
///
/// Ties keep the earlier candidate. If no candidate improves on −∞, the
/// result is (1, 1).
///
/// # Errors
///
/// The first failing candidate aborts the search with
/// [`AisError::CandidateEvaluation`] carrying its `(k, tau)`.
pub fn max_corr_ais_search<E>(
    config: &SearchConfig,
    observations: &ObservationSet,
    estimator: &mut E,
) -> Result<Candidate>
where
    E: MutualInfoEstimator + BiasCorrection + ?Sized,
{
    tracing::debug!(
        "Beginning max bias corrected AIS auto-embedding with k_max={}, tau_max={}",
        config.k_search_max,
        config.tau_search_max
    );

    let mut estimator = BiasCorrectionGuard::enable(estimator);
    let mut best = floor_candidate(f64::NEG_INFINITY);
    for embedding in candidate_grid(config.k_search_max, config.tau_search_max) {
        let (score, sample_count) = evaluate_max_corr(&mut *estimator, embedding, observations)
            .map_err(|e| wrap_candidate_error(embedding, e))?;

        tracing::debug!(
            "AIS (bias corrected) for {} ({} samples) is {:.5}",
            embedding,
            sample_count,
            score
        );
        if score > best.score {
            best = Candidate {
                k: embedding.k,
                tau: embedding.tau,
                score,
                sample_count,
            };
        }
    }
    Ok(best)
}

fn evaluate_max_corr<E>(
    estimator: &mut E,
    embedding: Embedding,
    observations: &ObservationSet,
) -> Result<(f64, usize)>
where
    E: MutualInfoEstimator + ?Sized,
{
    let samples = prepare_estimator(estimator, embedding, observations)?;
    let ais = estimator.compute_average_local_of_observations()?;
    Ok((ais, samples))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Estimator whose score is a fixed function of the embedding it was
    /// prepared with, identified through the past-state width and the
    /// number of rows.
    #[derive(Debug, Default)]
    struct Scripted {
        k: usize,
        rows: usize,
        bias: bool,
        fail_at: Option<(usize, usize)>,
        series_len: usize,
        visited: Rc<RefCell<Vec<(usize, usize)>>>,
        requested_neighbours: Rc<RefCell<Vec<Option<usize>>>>,
        score: Option<fn(usize, usize) -> f64>,
    }

    impl Scripted {
        fn tau(&self) -> usize {
            // rows = len - (k-1)*tau - 1
            if self.k == 1 {
                1
            } else {
                (self.series_len - 1 - self.rows) / (self.k - 1)
            }
        }
    }

    impl MutualInfoEstimator for Scripted {
        fn name(&self) -> &'static str {
            "scripted"
        }
        fn set_property(&mut self, _: &str, _: &str) -> Result<bool> {
            Ok(false)
        }
        fn property(&self, _: &str) -> Option<String> {
            None
        }
        fn set_observations(&mut self, source: DMatrix<f64>, _: DMatrix<f64>) -> Result<()> {
            self.k = source.ncols();
            self.rows = source.nrows();
            let tau = self.tau();
            self.visited.borrow_mut().push((self.k, tau));
            if self.fail_at == Some((self.k, tau)) {
                return Err(AisError::numerical("scripted failure"));
            }
            Ok(())
        }
        fn num_observations(&self) -> usize {
            self.rows
        }
        fn compute_average_local_of_observations(&self) -> Result<f64> {
            let f = self.score.unwrap_or(|_, _| 0.0);
            Ok(f(self.k, self.tau()))
        }
        fn compute_local_of_previous_observations(&self) -> Result<Vec<f64>> {
            Ok(vec![])
        }
    }

    impl BiasCorrection for Scripted {
        fn bias_correction(&self) -> bool {
            self.bias
        }
        fn set_bias_correction(&mut self, enabled: bool) {
            self.bias = enabled;
        }
    }

    impl PredictionErrors for Scripted {
        fn compute_prediction_errors(&self, neighbours: Option<usize>) -> Result<Vec<f64>> {
            self.requested_neighbours.borrow_mut().push(neighbours);
            let f = self.score.unwrap_or(|_, _| 1.0);
            Ok(vec![f(self.k, self.tau()) * self.rows as f64])
        }
    }

    const LEN: usize = 200;

    fn observations() -> ObservationSet {
        let mut set = ObservationSet::new();
        set.push((0..LEN).map(|i| (i as f64).sin()).collect());
        set
    }

    fn scripted(visited: &Rc<RefCell<Vec<(usize, usize)>>>) -> Scripted {
        Scripted {
            series_len: LEN,
            visited: Rc::clone(visited),
            ..Default::default()
        }
    }

    #[test]
    fn test_ragwitz_picks_lowest_normalised_error() {
        let visited = Rc::new(RefCell::new(Vec::new()));
        let config = SearchConfig::ragwitz(3, 3);
        let best = ragwitz_search(&config, &observations(), || Scripted {
            score: Some(|k, tau| if (k, tau) == (2, 3) { 0.1 } else { 0.5 }),
            ..scripted(&visited)
        })
        .unwrap();
        assert_eq!((best.k, best.tau), (2, 3));
        assert!((best.score - 0.1).abs() < 1e-12);
        assert_eq!(best.sample_count, LEN - 4);
        assert_eq!(visited.borrow().len(), config.grid_size());
    }

    #[test]
    fn test_ragwitz_forwards_neighbour_count() {
        for (config, expected) in [
            (SearchConfig::ragwitz(3, 2), None),
            (SearchConfig::ragwitz(3, 2).ragwitz_neighbours(7), Some(7)),
        ] {
            let visited = Rc::new(RefCell::new(Vec::new()));
            let requested = Rc::new(RefCell::new(Vec::new()));
            ragwitz_search(&config, &observations(), || Scripted {
                requested_neighbours: Rc::clone(&requested),
                ..scripted(&visited)
            })
            .unwrap();
            assert_eq!(*requested.borrow(), vec![expected; config.grid_size()]);
        }
    }

    #[test]
    fn test_ragwitz_ties_keep_earliest() {
        let visited = Rc::new(RefCell::new(Vec::new()));
        let best = ragwitz_search(&SearchConfig::ragwitz(4, 4), &observations(), || {
            scripted(&visited)
        })
        .unwrap();
        assert_eq!((best.k, best.tau), (1, 1));
    }

    #[test]
    fn test_ragwitz_nan_scores_fall_back_to_floor() {
        let visited = Rc::new(RefCell::new(Vec::new()));
        let best = ragwitz_search(&SearchConfig::ragwitz(3, 2), &observations(), || Scripted {
            score: Some(|_, _| f64::NAN),
            ..scripted(&visited)
        })
        .unwrap();
        assert_eq!((best.k, best.tau), (1, 1));
        assert!(best.score.is_infinite());
    }

    #[test]
    fn test_ragwitz_failure_carries_candidate() {
        let visited = Rc::new(RefCell::new(Vec::new()));
        let err = ragwitz_search(&SearchConfig::ragwitz(3, 2), &observations(), || Scripted {
            fail_at: Some((2, 2)),
            ..scripted(&visited)
        })
        .unwrap_err();
        assert_eq!(err.failing_candidate(), Some((2, 2)));
        // nothing after the failing candidate is evaluated
        assert_eq!(*visited.borrow(), vec![(1, 1), (2, 1), (2, 2)]);
    }

    #[test]
    fn test_max_corr_picks_highest_and_restores_bias() {
        let visited = Rc::new(RefCell::new(Vec::new()));
        let mut est = Scripted {
            score: Some(|k, tau| (k * 10 + tau) as f64 * if k > 2 { -1.0 } else { 1.0 }),
            ..scripted(&visited)
        };
        let best = max_corr_ais_search(&SearchConfig::max_corr_ais(3, 2), &observations(), &mut est)
            .unwrap();
        assert_eq!((best.k, best.tau), (2, 2));
        assert!(!est.bias_correction());
    }

    #[test]
    fn test_max_corr_failure_restores_bias() {
        for previous in [false, true] {
            let visited = Rc::new(RefCell::new(Vec::new()));
            let mut est = Scripted {
                fail_at: Some((3, 1)),
                bias: previous,
                ..scripted(&visited)
            };
            let err =
                max_corr_ais_search(&SearchConfig::max_corr_ais(3, 2), &observations(), &mut est)
                    .unwrap_err();
            assert_eq!(err.failing_candidate(), Some((3, 1)));
            assert_eq!(est.bias_correction(), previous);
        }
    }
}
