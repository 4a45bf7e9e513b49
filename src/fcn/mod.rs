//! Objective function contract.
//!
//! This module defines the `Fcn` trait, the scalar function of the external
//! parameters being minimized. An objective may also be able to supply its own
//! gradient and Hessian, in which case it returns them together with the value
//! from [`Fcn::evaluate_all`] as an [`Evaluation`].

pub mod fumili;

use ndarray::Array1;

use crate::error::{FumiOptError, Result};
use crate::sym_matrix::SymMatrix;

pub use fumili::{Chi2Fcn, LikelihoodFcn, MeasuredData, ModelFunction};

/// Value, gradient, and Hessian of an objective at one external point.
///
/// The gradient has one entry per external parameter and the Hessian is
/// `n_external x n_external`, fixed parameters included.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Objective value
    pub value: f64,

    /// Gradient with respect to the external parameters
    pub gradient: Array1<f64>,

    /// Hessian with respect to the external parameters
    pub hessian: SymMatrix,
}

impl Evaluation {
    /// Bundle a value with its derivatives.
    ///
    /// # Returns
    ///
    /// An error if the gradient length and the Hessian dimension disagree.
    pub fn new(value: f64, gradient: Array1<f64>, hessian: SymMatrix) -> Result<Self> {
        if gradient.len() != hessian.dim() {
            return Err(FumiOptError::DimensionMismatch(format!(
                "Gradient has {} entries but Hessian is {}x{}",
                gradient.len(),
                hessian.dim(),
                hessian.dim()
            )));
        }
        Ok(Self {
            value,
            gradient,
            hessian,
        })
    }

    /// Hessian entry `(i, j)` in external indices.
    pub fn hessian_at(&self, i: usize, j: usize) -> f64 {
        self.hessian.get(i, j)
    }
}

/// A scalar objective function of the external parameters.
pub trait Fcn {
    /// Evaluate the objective at the given external parameter values.
    ///
    /// # Arguments
    ///
    /// * `params` - All external parameter values, fixed ones included
    ///
    /// # Returns
    ///
    /// * The objective value, or an error if the evaluation fails
    fn value(&self, params: &Array1<f64>) -> Result<f64>;

    /// Change of the objective that defines a one-sigma parameter error.
    ///
    /// 1.0 for chi-square objectives, 0.5 for negative log-likelihoods.
    fn error_def(&self) -> f64 {
        1.0
    }

    /// Check if this objective provides its own gradient and Hessian.
    ///
    /// If this returns true, [`evaluate_all`](Fcn::evaluate_all) must be
    /// implemented and the analytic gradient calculator is used.
    fn has_analytic_derivatives(&self) -> bool {
        false
    }

    /// Evaluate the objective together with its gradient and Hessian.
    ///
    /// The result must cover every external parameter index.
    ///
    /// # Default Implementation
    ///
    /// Returns [`FumiOptError::NotImplemented`].
    fn evaluate_all(&self, params: &Array1<f64>) -> Result<Evaluation> {
        let _ = params;
        Err(FumiOptError::NotImplemented(
            "objective does not provide analytic derivatives".to_string(),
        ))
    }
}

impl<F: Fcn + ?Sized> Fcn for &F {
    fn value(&self, params: &Array1<f64>) -> Result<f64> {
        (**self).value(params)
    }

    fn error_def(&self) -> f64 {
        (**self).error_def()
    }

    fn has_analytic_derivatives(&self) -> bool {
        (**self).has_analytic_derivatives()
    }

    fn evaluate_all(&self, params: &Array1<f64>) -> Result<Evaluation> {
        (**self).evaluate_all(params)
    }
}
