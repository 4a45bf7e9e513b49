//! Configuration options for the gradient calculators.
//!
//! This module defines the minimization strategy, which sets how much effort the
//! numerical derivative code spends per parameter, and the calculator-level
//! configuration that bundles the strategy with the machine precision and the
//! gradient consistency check.

use serde::{Deserialize, Serialize};

use crate::precision::MachinePrecision;

/// Cost/precision tradeoff of numerical derivative estimation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyLevel {
    /// Cheap: few refinement cycles, loose tolerances
    Low,

    /// The default balance
    #[default]
    Medium,

    /// Thorough: more cycles, tighter tolerances
    High,
}

/// Step-size and iteration settings derived from a [`StrategyLevel`].
///
/// The `grad_*` settings drive the two-point numerical gradient; the `hessian_*`
/// settings are carried for second-derivative calculators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    level: StrategyLevel,

    /// Maximum refinement cycles per parameter in the numerical gradient
    pub grad_ncycles: usize,

    /// Relative change of the step below which the gradient refinement stops
    pub grad_step_tolerance: f64,

    /// Relative change of the gradient below which the refinement stops
    pub grad_tolerance: f64,

    /// Maximum refinement cycles for the numerical Hessian diagonal
    pub hessian_ncycles: usize,

    /// Relative step change tolerance for the numerical Hessian
    pub hessian_step_tolerance: f64,

    /// Relative second-derivative change tolerance for the numerical Hessian
    pub hessian_g2_tolerance: f64,
}

impl Default for Strategy {
    fn default() -> Self {
        Self::new(StrategyLevel::default())
    }
}

impl Strategy {
    /// Create the settings for a strategy level.
    ///
    /// # Examples
    ///
    /// ```
    /// use fumiopt_rs::gradient::config::{Strategy, StrategyLevel};
    ///
    /// let strategy = Strategy::new(StrategyLevel::High);
    /// assert_eq!(strategy.grad_ncycles, 5);
    /// ```
    pub fn new(level: StrategyLevel) -> Self {
        let (grad_ncycles, grad_step_tolerance, grad_tolerance) = match level {
            StrategyLevel::Low => (2, 0.5, 0.1),
            StrategyLevel::Medium => (3, 0.3, 0.05),
            StrategyLevel::High => (5, 0.1, 0.02),
        };
        let (hessian_ncycles, hessian_step_tolerance, hessian_g2_tolerance) = match level {
            StrategyLevel::Low => (3, 0.5, 0.1),
            StrategyLevel::Medium => (5, 0.3, 0.05),
            StrategyLevel::High => (7, 0.1, 0.02),
        };

        Self {
            level,
            grad_ncycles,
            grad_step_tolerance,
            grad_tolerance,
            hessian_ncycles,
            hessian_step_tolerance,
            hessian_g2_tolerance,
        }
    }

    /// Map the conventional integer level (0, 1, 2) onto a strategy.
    ///
    /// Anything above 2 is treated as 2.
    pub fn from_level(level: u32) -> Self {
        match level {
            0 => Self::low(),
            1 => Self::medium(),
            _ => Self::high(),
        }
    }

    /// Cheap strategy.
    pub fn low() -> Self {
        Self::new(StrategyLevel::Low)
    }

    /// Default strategy.
    pub fn medium() -> Self {
        Self::new(StrategyLevel::Medium)
    }

    /// Thorough strategy.
    pub fn high() -> Self {
        Self::new(StrategyLevel::High)
    }

    /// The level these settings were derived from.
    pub fn level(&self) -> StrategyLevel {
        self.level
    }

    /// Override the number of gradient refinement cycles.
    pub fn with_grad_ncycles(mut self, ncycles: usize) -> Self {
        self.grad_ncycles = ncycles;
        self
    }

    /// Override the gradient step tolerance.
    pub fn with_grad_step_tolerance(mut self, tolerance: f64) -> Self {
        self.grad_step_tolerance = tolerance;
        self
    }

    /// Override the gradient tolerance.
    pub fn with_grad_tolerance(mut self, tolerance: f64) -> Self {
        self.grad_tolerance = tolerance;
        self
    }
}

/// Configuration shared by the gradient calculators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientConfig {
    /// Strategy for numerical derivatives. Default: Medium
    pub strategy: Strategy,

    /// Machine precision used for step sizes. Default: 4 * f64::EPSILON
    pub precision: MachinePrecision,

    /// Compare analytic gradients against a numerical estimate on every call,
    /// even when debug logging is off. Default: false
    pub check_gradient: bool,
}

impl Default for GradientConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            precision: MachinePrecision::default(),
            check_gradient: false,
        }
    }
}

impl GradientConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the numerical derivative strategy.
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the machine precision.
    pub fn with_precision(mut self, precision: MachinePrecision) -> Self {
        self.precision = precision;
        self
    }

    /// Enable or disable the analytic-vs-numerical gradient comparison.
    pub fn with_check_gradient(mut self, check: bool) -> Self {
        self.check_gradient = check;
        self
    }
}
