//! Kraskov-Stögbauer-Grassberger (KSG) nearest-neighbour MI estimator.
//!
//! Implements algorithm 1 with the max-norm:
//!
//! I(S; D) = ψ(K) + ψ(N) − ⟨ψ(n_S + 1) + ψ(n_D + 1)⟩
//!
//! where, for each point, ε is the distance to its K-th nearest neighbour in
//! the joint space and n_S, n_D count marginal neighbours strictly within ε.
//!
//! The same neighbour machinery provides one-step prediction errors: the
//! destination of each point is predicted as the mean destination of its K
//! nearest neighbours in source space. This is the Ragwitz criterion.
//!
//! Neighbour searches are brute force, O(N²) per evaluation.

use nalgebra::DMatrix;
use statrs::function::gamma::digamma;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{AisError, Result};
use crate::estimators::gaussian::parse_bool;
use crate::estimators::{MutualInfoEstimator, PredictionErrors};
use crate::statistics::normalise_columns;

/// Property name for the number of nearest neighbours K.
pub const PROP_K: &str = "k";

/// Property name toggling per-column normalisation. Default: `true`.
pub const PROP_NORMALISE: &str = "NORMALISE";

/// Default number of nearest neighbours.
pub const DEFAULT_NEIGHBOURS: usize = 4;

/// KSG mutual-information estimator.
#[derive(Debug, Clone)]
pub struct KraskovMutualInfo {
    neighbours: usize,
    normalise: bool,
    source: DMatrix<f64>,
    dest: DMatrix<f64>,
}

impl Default for KraskovMutualInfo {
    fn default() -> Self {
        Self {
            neighbours: DEFAULT_NEIGHBOURS,
            normalise: true,
            source: DMatrix::zeros(0, 0),
            dest: DMatrix::zeros(0, 0),
        }
    }
}

impl KraskovMutualInfo {
    /// Create an estimator with default properties.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configured neighbour count.
    pub fn neighbours(&self) -> usize {
        self.neighbours
    }

    fn check_enough(&self, neighbours: usize) -> Result<()> {
        let n = self.source.nrows();
        if n <= neighbours {
            return Err(AisError::InsufficientObservations {
                required: neighbours + 1,
                actual: n,
            });
        }
        Ok(())
    }
}

/// Max-norm distance between rows `i` and `j`.
fn max_norm(data: &DMatrix<f64>, i: usize, j: usize) -> f64 {
    (0..data.ncols())
        .map(|c| (data[(i, c)] - data[(j, c)]).abs())
        .fold(0.0, f64::max)
}

/// Indices of the `k` nearest rows to `i` (excluding `i`), and the distances
/// to them, under `dist`.
fn nearest<F>(n: usize, i: usize, k: usize, dist: F) -> Vec<(f64, usize)>
where
    F: Fn(usize) -> f64,
{
    let mut all: Vec<(f64, usize)> = (0..n).filter(|&j| j != i).map(|j| (dist(j), j)).collect();
    let k = k.min(all.len());
    if k == 0 {
        return Vec::new();
    }
    all.select_nth_unstable_by(k - 1, |a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    all.truncate(k);
    all
}

/// Map `f` over point indices, in parallel when the feature is enabled.
fn per_point<F>(n: usize, f: F) -> Vec<f64>
where
    F: Fn(usize) -> f64 + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        (0..n).into_par_iter().map(f).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        (0..n).map(f).collect()
    }
}

impl MutualInfoEstimator for KraskovMutualInfo {
    fn name(&self) -> &'static str {
        "kraskov"
    }

    fn set_property(&mut self, name: &str, value: &str) -> Result<bool> {
        if name.eq_ignore_ascii_case(PROP_K) {
            let k: usize = value.trim().parse().map_err(|_| AisError::parse(name, value))?;
            if k == 0 {
                return Err(AisError::configuration("KSG neighbour count must be >= 1"));
            }
            self.neighbours = k;
            Ok(true)
        } else if name.eq_ignore_ascii_case(PROP_NORMALISE) {
            self.normalise = parse_bool(name, value)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn property(&self, name: &str) -> Option<String> {
        if name.eq_ignore_ascii_case(PROP_K) {
            Some(self.neighbours.to_string())
        } else if name.eq_ignore_ascii_case(PROP_NORMALISE) {
            Some(self.normalise.to_string())
        } else {
            None
        }
    }

    fn set_observations(&mut self, mut source: DMatrix<f64>, mut dest: DMatrix<f64>) -> Result<()> {
        if source.nrows() != dest.nrows() {
            return Err(AisError::invalid_input(format!(
                "source has {} rows but destination has {}",
                source.nrows(),
                dest.nrows()
            )));
        }
        if self.normalise {
            normalise_columns(&mut source);
            normalise_columns(&mut dest);
        }
        self.source = source;
        self.dest = dest;
        Ok(())
    }

    fn num_observations(&self) -> usize {
        self.source.nrows()
    }

    fn compute_average_local_of_observations(&self) -> Result<f64> {
        let locals = self.compute_local_of_previous_observations()?;
        Ok(locals.iter().sum::<f64>() / locals.len() as f64)
    }

    fn compute_local_of_previous_observations(&self) -> Result<Vec<f64>> {
        let k = self.neighbours;
        self.check_enough(k)?;
        let n = self.source.nrows();
        let (source, dest) = (&self.source, &self.dest);
        let constant = digamma(k as f64) + digamma(n as f64);

        Ok(per_point(n, |i| {
            let joint = nearest(n, i, k, |j| max_norm(source, i, j).max(max_norm(dest, i, j)));
            let eps = joint.iter().map(|&(d, _)| d).fold(0.0, f64::max);
            let (mut n_source, mut n_dest) = (0usize, 0usize);
            for j in (0..n).filter(|&j| j != i) {
                if max_norm(source, i, j) < eps {
                    n_source += 1;
                }
                if max_norm(dest, i, j) < eps {
                    n_dest += 1;
                }
            }
            constant - digamma((n_source + 1) as f64) - digamma((n_dest + 1) as f64)
        }))
    }
}

impl PredictionErrors for KraskovMutualInfo {
    fn compute_prediction_errors(&self, neighbours: Option<usize>) -> Result<Vec<f64>> {
        let k = neighbours.unwrap_or(self.neighbours);
        if k == 0 {
            return Err(AisError::configuration("prediction neighbour count must be >= 1"));
        }
        self.check_enough(k)?;
        let n = self.source.nrows();
        let (source, dest) = (&self.source, &self.dest);

        let mut totals = vec![0.0; dest.ncols()];
        for (dim, total) in totals.iter_mut().enumerate() {
            let squared = per_point(n, |i| {
                let near = nearest(n, i, k, |j| max_norm(source, i, j));
                let prediction =
                    near.iter().map(|&(_, j)| dest[(j, dim)]).sum::<f64>() / near.len() as f64;
                (dest[(i, dim)] - prediction).powi(2)
            });
            *total = squared.iter().sum();
        }
        Ok(totals)
    }
}
