//! Exponential Smoothing for the Pressure Channel
//!
//! A first-order IIR low-pass:
//!
//! ```text
//! s[0] = x[0]
//! s[n] = s[n-1] + α × (x[n] - s[n-1])
//! ```
//!
//! After a step change the remaining error shrinks by `(1 - α)` per sample,
//! so with α = 0.2 about 1/e of a step is left after five samples.
//!
//! ## Invalid samples
//!
//! An invalid input (`None`) is not skipped. If the filter was tracking, the
//! output for that step is `None` and the state is dropped; the next valid
//! sample seeds the filter again from scratch. If the filter has never seen a
//! valid sample, `None` simply leaves it unseeded.
//!
//! ```rust
//! use oilpress_core::FilterState;
//!
//! let mut filter = FilterState::new(0.2);
//! assert_eq!(filter.update(Some(2.0)), Some(2.0)); // seed
//! assert_eq!(filter.update(Some(3.0)), Some(2.2));
//! assert_eq!(filter.update(None), None);            // poisoned step
//! assert_eq!(filter.update(Some(4.0)), Some(4.0)); // re-seeded
//! ```

use crate::constants::firmware::FILTER_ALPHA;
use crate::traits::Validatable;

/// Running state of one smoothed channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterState {
    alpha: f32,
    last: Option<f32>,
}

impl FilterState {
    /// Fresh filter with coefficient `alpha` in `(0, 1]`
    pub const fn new(alpha: f32) -> Self {
        Self { alpha, last: None }
    }

    /// Feed one sample and return the smoothed value
    pub fn update(&mut self, sample: Option<f32>) -> Option<f32> {
        let sample = sample.and_then(Validatable::valid);

        self.last = match (self.last, sample) {
            (None, seed) => seed,
            (Some(last), Some(x)) => Some(last + self.alpha * (x - last)),
            (Some(_), None) => None,
        };
        self.last
    }

    /// Current smoothed value, if any
    pub fn value(&self) -> Option<f32> {
        self.last
    }

    /// Smoothing coefficient
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Forget the running state
    pub fn reset(&mut self) {
        self.last = None;
    }
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new(FILTER_ALPHA)
    }
}
