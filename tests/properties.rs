//! Property-based checks for the search grid and the no-search path.

use std::collections::HashSet;

use active_info::embedding::candidate_grid;
use active_info::helpers::white_noise;
use active_info::{ActiveInfoStorageGaussian, Embedding, SearchConfig};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The grid visits every cell once, within bounds, with tau = 1 for k = 1
    #[test]
    fn prop_grid_cardinality(k_max in 1usize..12, tau_max in 1usize..12) {
        let cells: Vec<Embedding> = candidate_grid(k_max, tau_max).collect();
        let expected = SearchConfig::ragwitz(k_max, tau_max).grid_size();
        prop_assert_eq!(cells.len(), expected);
        prop_assert_eq!(cells.len(), 1 + (k_max - 1) * tau_max);

        let unique: HashSet<_> = cells.iter().copied().collect();
        prop_assert_eq!(unique.len(), cells.len());
        for cell in &cells {
            prop_assert!(cell.k >= 1 && cell.k <= k_max);
            prop_assert!(cell.tau >= 1 && cell.tau <= tau_max);
            if cell.k == 1 {
                prop_assert_eq!(cell.tau, 1);
            }
        }
        prop_assert_eq!(cells[0], Embedding::default());
    }

    /// The grid is ordered by k, then tau
    #[test]
    fn prop_grid_is_ordered(k_max in 1usize..8, tau_max in 1usize..8) {
        let cells: Vec<(usize, usize)> = candidate_grid(k_max, tau_max).map(|e| (e.k, e.tau)).collect();
        let mut sorted = cells.clone();
        sorted.sort_unstable();
        prop_assert_eq!(cells, sorted);
    }

    /// Without a search method the manual embedding survives finalisation
    #[test]
    fn prop_none_method_is_noop(k in 1usize..5, tau in 1usize..4, seed in any::<u64>()) {
        let mut calc = ActiveInfoStorageGaussian::new();
        calc.initialise_with(k, tau).unwrap();
        let committed = calc.set_observations(&white_noise(200, seed)).unwrap();
        prop_assert_eq!(committed, Embedding::new(k, tau).unwrap());
        prop_assert!(calc.last_search().is_none());
        prop_assert_eq!(calc.num_observations(), 200 - ((k - 1) * tau + 1));
    }
}
