//! Synthetic series for tests, benches and examples.
//!
//! All generators are seeded, so the same seed always yields the same series.

use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};
use rand_xoshiro::Xoshiro256PlusPlus;

/// Samples discarded before recording, so the output starts near stationarity.
const BURN_IN: usize = 500;

/// Autoregressive process `x_t = Σ_i coefficients[i] * x_{t-1-i} + noise_std * ε_t`
/// with standard normal innovations.
///
/// The caller is responsible for choosing stationary coefficients.
///
/// # Example
///
/// ```
/// use active_info::helpers::autoregressive;
///
/// let x = autoregressive(&[0.2, 0.6], 1.0, 1_000, 42);
/// assert_eq!(x.len(), 1_000);
/// ```
pub fn autoregressive(coefficients: &[f64], noise_std: f64, len: usize, seed: u64) -> Vec<f64> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let order = coefficients.len();
    let mut x = vec![0.0; order + BURN_IN + len];
    for t in order..x.len() {
        let eps: f64 = StandardNormal.sample(&mut rng);
        let predicted: f64 = coefficients
            .iter()
            .enumerate()
            .map(|(i, c)| c * x[t - 1 - i])
            .sum();
        x[t] = predicted + noise_std * eps;
    }
    x.split_off(order + BURN_IN)
}

/// Independent standard normal samples.
pub fn white_noise(len: usize, seed: u64) -> Vec<f64> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    (0..len).map(|_| StandardNormal.sample(&mut rng)).collect()
}

/// Theoretical AIS (nats) of a stationary AR(1) process with coefficient `phi`.
///
/// The past fully determines the predictable part, so AIS is
/// `-½ ln(1 - phi²)` for every `k`.
pub fn ar1_active_info(phi: f64) -> f64 {
    -0.5 * (1.0 - phi * phi).ln()
}
