//! Statistical building blocks shared by the estimators:
//! - Sample means and covariances over row-major observation matrices
//! - Column normalisation for nearest-neighbour searches
//! - Fitted multivariate normals with cached Cholesky factors

mod moments;

pub use moments::{
    column_means, hstack, normalise_columns, sample_covariance, GaussianModel, LN_2PI,
};
