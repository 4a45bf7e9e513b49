//! Finite difference helpers for model derivatives.
//!
//! Used where a model function does not supply its own parameter derivatives.
//! This is a plain central-difference rule with a step scaled to the parameter;
//! the strategy-driven calculator for the objective itself lives in
//! [`crate::gradient::numerical`].

use crate::error::Result;
use ndarray::Array1;

/// Default relative step size for central differences.
///
/// Roughly the cube root of the machine precision, the optimal step for a
/// central difference of a function computed to full precision.
const DEFAULT_EPSILON: f64 = 6.0e-6;

/// Compute the gradient of a scalar function using central finite differences.
///
/// grad[j] = (f(p + h_j e_j) - f(p - h_j e_j)) / (2 h_j), with
/// `h_j = epsilon * max(|p_j|, 1)`.
///
/// # Arguments
///
/// * `f` - The function to differentiate
/// * `params` - The parameter values at which to evaluate the gradient
/// * `epsilon` - The relative step size (optional)
///
/// # Returns
///
/// * `Result<Array1<f64>>` - The gradient vector
pub fn gradient<F>(f: F, params: &Array1<f64>, epsilon: Option<f64>) -> Result<Array1<f64>>
where
    F: Fn(&Array1<f64>) -> Result<f64>,
{
    let eps = epsilon.unwrap_or(DEFAULT_EPSILON);
    let mut grad = Array1::zeros(params.len());
    let mut shifted = params.clone();

    for j in 0..params.len() {
        let step = eps * params[j].abs().max(1.0);

        shifted[j] = params[j] + step;
        let f_forward = f(&shifted)?;
        shifted[j] = params[j] - step;
        let f_backward = f(&shifted)?;
        shifted[j] = params[j];

        grad[j] = (f_forward - f_backward) / (2.0 * step);
    }

    Ok(grad)
}
