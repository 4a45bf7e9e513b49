//! Analytic versus numerical gradient comparison.
//!
//! Used by [`AnalyticGradientCalculator`](super::AnalyticGradientCalculator) to
//! trace both estimates side by side when debugging user-supplied derivatives.
//! The comparison is informational only.

use std::fmt;

use ndarray::Array1;

use crate::error::{FumiOptError, Result};

/// Side-by-side analytic and numerical gradients at one point.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientComparison {
    analytic: Array1<f64>,
    numerical: Array1<f64>,
    differences: Array1<f64>,
    max_abs_difference: f64,
}

impl GradientComparison {
    /// Compare two gradients of the same length.
    pub fn new(analytic: Array1<f64>, numerical: Array1<f64>) -> Result<Self> {
        if analytic.len() != numerical.len() {
            return Err(FumiOptError::DimensionMismatch(format!(
                "Analytic gradient has {} entries, numerical gradient has {}",
                analytic.len(),
                numerical.len()
            )));
        }

        let differences = &analytic - &numerical;
        let max_abs_difference = differences.iter().fold(0.0_f64, |acc, d| acc.max(d.abs()));

        Ok(Self {
            analytic,
            numerical,
            differences,
            max_abs_difference,
        })
    }

    pub fn analytic(&self) -> &Array1<f64> {
        &self.analytic
    }

    pub fn numerical(&self) -> &Array1<f64> {
        &self.numerical
    }

    /// Component-wise `analytic - numerical`.
    pub fn differences(&self) -> &Array1<f64> {
        &self.differences
    }

    pub fn max_abs_difference(&self) -> f64 {
        self.max_abs_difference
    }

    /// Whether every component agrees within `tolerance`, relative to the
    /// larger of the two magnitudes (absolute below magnitude 1).
    pub fn is_consistent(&self, tolerance: f64) -> bool {
        self.analytic
            .iter()
            .zip(self.numerical.iter())
            .all(|(&a, &n)| (a - n).abs() <= tolerance * a.abs().max(n.abs()).max(1.0))
    }
}

fn write_vector(f: &mut fmt::Formatter<'_>, label: &str, values: &Array1<f64>) -> fmt::Result {
    write!(f, "{:<20}", label)?;
    for v in values.iter() {
        write!(f, " {:>14.6e}", v)?;
    }
    writeln!(f)
}

impl fmt::Display for GradientComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_vector(f, "Analytic gradient", &self.analytic)?;
        write_vector(f, "Numerical gradient", &self.numerical)?;
        write_vector(f, "Difference", &self.differences)?;
        write!(f, "Max |difference|: {:.6e}", self.max_abs_difference)
    }
}
