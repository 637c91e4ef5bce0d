//! Scoped bias-correction override for a borrowed estimator.
//!
//! # Example
//!
//! ```ignore
//! use active_info::embedding::BiasCorrectionGuard;
//!
//! // Force bias correction on (RAII - prior setting restored on drop)
//! let mut guard = BiasCorrectionGuard::enable(&mut estimator);
//! let ais = guard.compute_average_local_of_observations()?;
//! // Guard dropped here, prior setting restored even on early return
//! ```

use std::ops::{Deref, DerefMut};

use crate::estimators::BiasCorrection;

/// RAII guard that forces an estimator's bias correction to a value and
/// restores the previous setting when dropped.
pub struct BiasCorrectionGuard<'a, E: BiasCorrection + ?Sized> {
    estimator: &'a mut E,
    /// Setting to restore on drop.
    previous: bool,
}

impl<'a, E: BiasCorrection + ?Sized> BiasCorrectionGuard<'a, E> {
    /// Force bias correction to `enabled` for the guard's lifetime.
    pub fn set(estimator: &'a mut E, enabled: bool) -> Self {
        let previous = estimator.bias_correction();
        estimator.set_bias_correction(enabled);
        Self {
            estimator,
            previous,
        }
    }

    /// Force bias correction on for the guard's lifetime.
    pub fn enable(estimator: &'a mut E) -> Self {
        Self::set(estimator, true)
    }

    /// The setting that will be restored.
    pub fn previous(&self) -> bool {
        self.previous
    }
}

impl<E: BiasCorrection + ?Sized> Deref for BiasCorrectionGuard<'_, E> {
    type Target = E;

    fn deref(&self) -> &E {
        self.estimator
    }
}

impl<E: BiasCorrection + ?Sized> DerefMut for BiasCorrectionGuard<'_, E> {
    fn deref_mut(&mut self) -> &mut E {
        self.estimator
    }
}

impl<E: BiasCorrection + ?Sized> Drop for BiasCorrectionGuard<'_, E> {
    fn drop(&mut self) {
        self.estimator.set_bias_correction(self.previous);
        tracing::debug!("Restored bias correction to {}", self.previous);
    }
}

impl<E: BiasCorrection + ?Sized> std::fmt::Debug for BiasCorrectionGuard<'_, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BiasCorrectionGuard")
            .field("current", &self.estimator.bias_correction())
            .field("previous", &self.previous)
            .finish()
    }
}
