//! Sample moments and Gaussian log-densities over observation matrices.
//!
//! All matrices are laid out one observation per row.

use nalgebra::{Cholesky, DMatrix, DVector, Dyn};

use crate::error::{AisError, Result};

/// Natural log of 2π.
pub const LN_2PI: f64 = 1.837_877_066_409_345_3;

/// Column means of `data`.
pub fn column_means(data: &DMatrix<f64>) -> DVector<f64> {
    let n = data.nrows().max(1) as f64;
    DVector::from_fn(data.ncols(), |j, _| data.column(j).sum() / n)
}

/// Unbiased sample covariance (divisor n - 1) of the columns of `data`.
///
/// Returns an all-zero matrix when fewer than two rows are present.
pub fn sample_covariance(data: &DMatrix<f64>, means: &DVector<f64>) -> DMatrix<f64> {
    let (n, d) = data.shape();
    if n < 2 {
        return DMatrix::zeros(d, d);
    }
    let mut cov = DMatrix::zeros(d, d);
    for row in data.row_iter() {
        for a in 0..d {
            let da = row[a] - means[a];
            for b in a..d {
                cov[(a, b)] += da * (row[b] - means[b]);
            }
        }
    }
    let denom = (n - 1) as f64;
    for a in 0..d {
        for b in a..d {
            cov[(a, b)] /= denom;
            cov[(b, a)] = cov[(a, b)];
        }
    }
    cov
}

/// Place `left` and `right` side by side (same number of rows).
pub fn hstack(left: &DMatrix<f64>, right: &DMatrix<f64>) -> DMatrix<f64> {
    let n = left.nrows();
    let (dl, dr) = (left.ncols(), right.ncols());
    DMatrix::from_fn(n, dl + dr, |i, j| {
        if j < dl {
            left[(i, j)]
        } else {
            right[(i, j - dl)]
        }
    })
}

/// Rescale every column to zero mean and unit sample variance.
///
/// Constant columns are only centred.
pub fn normalise_columns(data: &mut DMatrix<f64>) {
    let means = column_means(data);
    let n = data.nrows();
    for (j, mut col) in data.column_iter_mut().enumerate() {
        let mean = means[j];
        let var = if n > 1 {
            col.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };
        let std = var.sqrt();
        for x in col.iter_mut() {
            *x -= mean;
            if std > 0.0 {
                *x /= std;
            }
        }
    }
}

/// A fitted multivariate normal, cached for repeated density evaluation.
#[derive(Debug, Clone)]
pub struct GaussianModel {
    means: DVector<f64>,
    chol: Cholesky<f64, Dyn>,
    log_det: f64,
}

impl GaussianModel {
    /// Fit means and covariance to the rows of `data`.
    pub fn fit(data: &DMatrix<f64>) -> Result<Self> {
        let means = column_means(data);
        let cov = sample_covariance(data, &means);
        Self::from_moments(means, cov)
    }

    /// Build from precomputed means and covariance.
    pub fn from_moments(means: DVector<f64>, cov: DMatrix<f64>) -> Result<Self> {
        let dims = cov.nrows();
        let chol = Cholesky::new(cov).ok_or_else(|| {
            AisError::numerical(format!(
                "covariance matrix ({dims}x{dims}) is not positive definite"
            ))
        })?;
        let log_det = 2.0 * chol.l().diagonal().iter().map(|d| d.ln()).sum::<f64>();
        Ok(Self {
            means,
            chol,
            log_det,
        })
    }

    /// Dimension of the model.
    pub fn dims(&self) -> usize {
        self.means.len()
    }

    /// ln |Σ|.
    pub fn log_det(&self) -> f64 {
        self.log_det
    }

    /// Log-density of `x` under the model.
    pub fn log_pdf(&self, x: &DVector<f64>) -> f64 {
        let centred = x - &self.means;
        let solved = self.chol.solve(&centred);
        let mahalanobis = centred.dot(&solved);
        -0.5 * (self.dims() as f64 * LN_2PI + self.log_det + mahalanobis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_covariance_matches_hand_computation() {
        let data = DMatrix::from_row_slice(4, 2, &[1.0, 2.0, 2.0, 4.0, 3.0, 6.0, 4.0, 8.0]);
        let means = column_means(&data);
        assert_eq!(means[0], 2.5);
        assert_eq!(means[1], 5.0);

        let cov = sample_covariance(&data, &means);
        // var(x) = 5/3, var(y) = 20/3, cov = 10/3
        assert!((cov[(0, 0)] - 5.0 / 3.0).abs() < 1e-12);
        assert!((cov[(1, 1)] - 20.0 / 3.0).abs() < 1e-12);
        assert!((cov[(0, 1)] - 10.0 / 3.0).abs() < 1e-12);
        assert_eq!(cov[(0, 1)], cov[(1, 0)]);
    }

    #[test]
    fn test_normalise_columns() {
        let mut data = DMatrix::from_row_slice(3, 2, &[1.0, 5.0, 2.0, 5.0, 3.0, 5.0]);
        normalise_columns(&mut data);
        assert!((data[(0, 0)] + 1.0).abs() < 1e-12);
        assert!(data[(1, 0)].abs() < 1e-12);
        assert!((data[(2, 0)] - 1.0).abs() < 1e-12);
        // constant column is centred only
        assert!(data.column(1).iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_standard_normal_log_pdf() {
        let model = GaussianModel::from_moments(DVector::zeros(2), DMatrix::identity(2, 2))
            .expect("identity is positive definite");
        assert!(model.log_det().abs() < 1e-12);
        let at_origin = model.log_pdf(&DVector::zeros(2));
        assert!((at_origin + LN_2PI).abs() < 1e-12);
    }

    #[test]
    fn test_singular_covariance_is_numerical_error() {
        let data = DMatrix::from_row_slice(3, 2, &[1.0, 2.0, 2.0, 4.0, 3.0, 6.0]);
        let err = GaussianModel::fit(&data).unwrap_err();
        assert!(matches!(err, AisError::Numerical { .. }));
    }

    #[test]
    fn test_hstack() {
        let a = DMatrix::from_row_slice(2, 1, &[1.0, 2.0]);
        let b = DMatrix::from_row_slice(2, 2, &[3.0, 4.0, 5.0, 6.0]);
        let joined = hstack(&a, &b);
        assert_eq!(joined.shape(), (2, 3));
        assert_eq!(joined[(1, 0)], 2.0);
        assert_eq!(joined[(1, 2)], 6.0);
    }
}
