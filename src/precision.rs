//! Machine precision used by the numerical derivative code.
//!
//! The finite-difference step heuristics and the bound transforms both need to
//! know how close to each other two floating point numbers can get before their
//! difference is rounding noise.

use serde::{Deserialize, Serialize};

/// Relative machine precision and its derived tolerance.
///
/// `eps` is the smallest relative change that survives an addition (with a safety
/// factor of 4 over `f64::EPSILON`), `eps2` is `2 * sqrt(eps)`, the typical
/// relative accuracy of a first derivative obtained from differences.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MachinePrecision {
    eps: f64,
    eps2: f64,
}

impl Default for MachinePrecision {
    fn default() -> Self {
        Self::with_eps(4.0 * f64::EPSILON)
    }
}

impl MachinePrecision {
    /// Create the default machine precision for `f64`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a machine precision from an explicit relative precision.
    ///
    /// Useful when the objective is computed with fewer significant digits
    /// than a full `f64` carries.
    pub fn with_eps(eps: f64) -> Self {
        Self {
            eps,
            eps2: 2.0 * eps.sqrt(),
        }
    }

    /// Relative machine precision.
    pub fn eps(&self) -> f64 {
        self.eps
    }

    /// `2 * sqrt(eps)`.
    pub fn eps2(&self) -> f64 {
        self.eps2
    }

    /// Override the relative precision; `eps2` follows.
    pub fn set_precision(&mut self, eps: f64) {
        *self = Self::with_eps(eps);
    }
}
