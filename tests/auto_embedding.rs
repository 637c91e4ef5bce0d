//! End-to-end tests for automatic embedding selection.
//!
//! Series come from seeded autoregressive processes so that the best
//! embedding is known in advance.

use active_info::embedding::prepare_estimator;
use active_info::estimators::{KraskovMutualInfo, PredictionErrors, PROP_BIAS_CORRECTION};
use active_info::helpers::autoregressive;
use active_info::{
    ActiveInfoStorageGaussian, AisError, Embedding, ObservationSet, SearchConfig,
    Phase, PROP_AUTO_EMBED_METHOD, PROP_K_HISTORY, PROP_K_SEARCH_MAX, PROP_RAGWITZ_NUM_NNS,
    PROP_TAU, PROP_TAU_SEARCH_MAX,
};

/// x_t = 0.2 x_{t-1} + 0.6 x_{t-2} + e_t: the second lag carries most of the memory.
fn ar2(len: usize, seed: u64) -> Vec<f64> {
    autoregressive(&[0.2, 0.6], 1.0, len, seed)
}

// =============================================================================
// RAGWITZ
// =============================================================================

#[test]
fn ragwitz_single_cell_grid_commits_one_one() {
    let mut calc = ActiveInfoStorageGaussian::with_search_config(SearchConfig::ragwitz(1, 1));
    calc.initialise_with(3, 2).unwrap();
    let embedding = calc.set_observations(&ar2(400, 1)).unwrap();

    assert_eq!(embedding, Embedding::default());
    assert_eq!(calc.num_observations(), 399);
    let best = calc.last_search().unwrap();
    assert_eq!((best.k, best.tau), (1, 1));
}

#[test]
fn ragwitz_prefers_second_order_history() {
    let mut calc = ActiveInfoStorageGaussian::new();
    calc.set_property(PROP_AUTO_EMBED_METHOD, "RAGWITZ").unwrap();
    calc.set_property(PROP_K_SEARCH_MAX, "3").unwrap();
    let embedding = calc.set_observations(&ar2(1_000, 2)).unwrap();
    assert!(embedding.k >= 2, "committed {embedding}");
}

#[test]
fn ragwitz_best_score_no_worse_than_one_one() {
    let series = ar2(600, 3);
    let mut calc = ActiveInfoStorageGaussian::with_search_config(SearchConfig::ragwitz(3, 2));
    calc.set_observations(&series).unwrap();
    let best = calc.last_search().unwrap();

    let mut observations = ObservationSet::new();
    observations.push(series);
    let mut ksg = KraskovMutualInfo::new();
    let samples = prepare_estimator(&mut ksg, Embedding::default(), &observations).unwrap();
    let errors = ksg.compute_prediction_errors(None).unwrap();
    let baseline = errors[0] / samples as f64;

    assert!(best.score <= baseline, "best={} baseline={}", best.score, baseline);
}

#[test]
fn ragwitz_uses_configured_neighbour_count() {
    let series = ar2(600, 10);

    let mut default_calc =
        ActiveInfoStorageGaussian::with_search_config(SearchConfig::ragwitz(3, 2));
    default_calc.set_observations(&series).unwrap();
    let default_best = default_calc.last_search().unwrap();

    let mut wide_calc = ActiveInfoStorageGaussian::with_search_config(SearchConfig::ragwitz(3, 2));
    wide_calc.set_property(PROP_RAGWITZ_NUM_NNS, "20").unwrap();
    wide_calc.set_observations(&series).unwrap();
    let wide_best = wide_calc.last_search().unwrap();

    assert_ne!(default_best.score, wide_best.score);

    // the winning score is the 20-neighbour prediction error at that embedding
    let mut observations = ObservationSet::new();
    observations.push(series);
    let mut ksg = KraskovMutualInfo::new();
    let samples = prepare_estimator(&mut ksg, wide_best.embedding(), &observations).unwrap();
    let errors = ksg.compute_prediction_errors(Some(20)).unwrap();
    assert_eq!(wide_best.score, errors[0] / samples as f64);
}

#[test]
fn repeated_ragwitz_search_is_idempotent() {
    let series = ar2(500, 11);
    let mut calc = ActiveInfoStorageGaussian::with_search_config(SearchConfig::ragwitz(3, 3));
    let first = calc.set_observations(&series).unwrap();
    let first_best = calc.last_search().unwrap();
    let second = calc.set_observations(&series).unwrap();
    let second_best = calc.last_search().unwrap();

    assert_eq!(first, second);
    assert_eq!(first_best, second_best);
}

// =============================================================================
// MAX BIAS-CORRECTED AIS
// =============================================================================

#[test]
fn max_corr_ais_finds_second_order_history() {
    let mut calc = ActiveInfoStorageGaussian::with_search_config(SearchConfig::max_corr_ais(3, 2));
    let embedding = calc.set_observations(&ar2(5_000, 4)).unwrap();

    assert!(embedding.k >= 2, "committed {embedding}");
    let best = calc.last_search().unwrap();
    assert_eq!(best.embedding(), embedding);
    assert_eq!(best.sample_count, embedding.observations_in(5_000));
}

#[test]
fn max_corr_ais_restores_bias_correction() {
    for setting in ["false", "true"] {
        let mut calc =
            ActiveInfoStorageGaussian::with_search_config(SearchConfig::max_corr_ais(3, 2));
        calc.set_property(PROP_BIAS_CORRECTION, setting).unwrap();
        calc.set_observations(&ar2(1_000, 5)).unwrap();
        assert_eq!(calc.property(PROP_BIAS_CORRECTION).as_deref(), Some(setting));
    }
}

#[test]
fn max_corr_ais_reported_value_follows_caller_setting() {
    let series = ar2(2_000, 6);
    let mut calc = ActiveInfoStorageGaussian::with_search_config(SearchConfig::max_corr_ais(3, 1));
    calc.set_observations(&series).unwrap();
    let raw = calc.compute_average_local_of_observations().unwrap();

    // the search ran with correction on; the final estimate must not
    let best = calc.last_search().unwrap();
    assert!(raw > best.score);
    let significance = calc.compute_significance().unwrap();
    assert!((raw - best.score - significance.null_mean()).abs() < 1e-9);
}

#[test]
fn repeated_search_is_idempotent() {
    let series = ar2(1_500, 7);
    let mut calc = ActiveInfoStorageGaussian::with_search_config(SearchConfig::max_corr_ais(4, 3));
    let first = calc.set_observations(&series).unwrap();
    let first_ais = calc.compute_average_local_of_observations().unwrap();
    let second = calc.set_observations(&series).unwrap();
    let second_ais = calc.compute_average_local_of_observations().unwrap();

    assert_eq!(first, second);
    assert_eq!(first_ais, second_ais);
}

// =============================================================================
// NO SEARCH / BAD METHOD
// =============================================================================

#[test]
fn none_keeps_manual_embedding() {
    let mut calc = ActiveInfoStorageGaussian::new();
    calc.set_property(PROP_K_HISTORY, "3").unwrap();
    calc.set_property(PROP_TAU, "2").unwrap();
    // bounds are irrelevant without a method
    calc.set_property(PROP_K_SEARCH_MAX, "8").unwrap();
    calc.set_property(PROP_TAU_SEARCH_MAX, "8").unwrap();

    let embedding = calc.set_observations(&ar2(300, 8)).unwrap();
    assert_eq!(embedding, Embedding::new(3, 2).unwrap());
    assert_eq!(calc.num_observations(), 300 - 5);
    assert!(calc.last_search().is_none());
}

#[test]
fn unrecognized_method_rejected_at_search_start() {
    let mut calc = ActiveInfoStorageGaussian::new();
    calc.initialise_with(2, 1).unwrap();
    // accepted when set
    calc.set_property(PROP_AUTO_EMBED_METHOD, "CAO").unwrap();
    assert_eq!(calc.property(PROP_AUTO_EMBED_METHOD).as_deref(), Some("CAO"));

    let err = calc.set_observations(&ar2(300, 9)).unwrap_err();
    assert!(matches!(err, AisError::Configuration { .. }), "got {err:?}");
    assert!(err.to_string().contains("CAO"));
    assert_eq!(calc.embedding(), Embedding::new(2, 1).unwrap());
    assert!(calc.compute_average_local_of_observations().is_err());
}

#[test]
fn failed_final_fit_keeps_previous_embedding() {
    let mut calc = ActiveInfoStorageGaussian::with_search_config(SearchConfig::ragwitz(2, 1));
    calc.initialise_with(3, 2).unwrap();
    // the search succeeds on a constant series, the Gaussian fit cannot
    let err = calc.set_observations(&[1.5; 200]).unwrap_err();

    assert!(matches!(err, AisError::Numerical { .. }), "got {err:?}");
    assert_eq!(calc.embedding(), Embedding::new(3, 2).unwrap());
    assert!(calc.last_search().is_none());
    assert_eq!(calc.phase(), Phase::Accumulating);
    assert_eq!(calc.num_observations(), 0);
}

#[test]
fn failed_candidate_is_reported() {
    let mut calc = ActiveInfoStorageGaussian::with_search_config(SearchConfig::max_corr_ais(4, 1));
    // 4 samples: k >= 2 leaves too few rows to fit a covariance
    let err = calc.set_observations(&[0.3, -1.2, 0.8, 0.1]).unwrap_err();
    assert!(err.failing_candidate().is_some(), "got {err:?}");
    assert_eq!(calc.embedding(), Embedding::default());
    assert_eq!(calc.num_observations(), 0);
}
