//! Objectives with Fumili-style analytic derivatives.
//!
//! A chi-square or a negative log-likelihood built from a model function can
//! supply its own gradient and an approximate Hessian using only first
//! derivatives of the model with respect to the parameters:
//!
//! - chi-square: `f = sum r_k^2` with `r_k = (m_k - y_k) / sigma_k`,
//!   `g_i = 2 sum r_k dr_k/dp_i`, `H_ij = 2 sum dr_k/dp_i dr_k/dp_j`
//! - likelihood: `f = -sum ln m_k`, `g_i = -sum (dm_k/dp_i) / m_k`,
//!   `H_ij = sum (dm_k/dp_i)(dm_k/dp_j) / m_k^2`
//!
//! The Hessian drops the second-derivative terms of the model, which vanish at
//! a good fit (chi-square) or in expectation (likelihood).

use ndarray::Array1;

use crate::error::{FumiOptError, Result};
use crate::fcn::{Evaluation, Fcn};
use crate::sym_matrix::SymMatrix;
use crate::utils::finite_difference;

/// Smallest model density used in a logarithm.
const MIN_DENSITY: f64 = 8.0 * f64::MIN_POSITIVE;

/// A model function evaluated at a data coordinate for given parameters.
///
/// Closures `Fn(&[f64], &Array1<f64>) -> Result<f64>` implement this trait
/// with finite-difference parameter derivatives.
pub trait ModelFunction {
    /// Model value at coordinate `x`.
    ///
    /// # Arguments
    ///
    /// * `x` - Coordinates of the data point
    /// * `params` - All external parameter values
    fn eval(&self, x: &[f64], params: &Array1<f64>) -> Result<f64>;

    /// Derivatives of the model value with respect to every parameter.
    ///
    /// # Default Implementation
    ///
    /// Central finite differences of [`eval`](ModelFunction::eval).
    fn parameter_gradient(&self, x: &[f64], params: &Array1<f64>) -> Result<Array1<f64>> {
        finite_difference::gradient(|p| self.eval(x, p), params, None)
    }
}

impl<F> ModelFunction for F
where
    F: Fn(&[f64], &Array1<f64>) -> Result<f64>,
{
    fn eval(&self, x: &[f64], params: &Array1<f64>) -> Result<f64> {
        self(x, params)
    }
}

/// Measured values with their coordinates and uncertainties.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredData {
    coordinates: Vec<Vec<f64>>,
    values: Vec<f64>,
    errors: Vec<f64>,
}

impl MeasuredData {
    /// Bundle coordinates, measured values, and their errors.
    ///
    /// # Returns
    ///
    /// An error if the three inputs differ in length or an error is not a
    /// positive finite number.
    pub fn new(coordinates: Vec<Vec<f64>>, values: Vec<f64>, errors: Vec<f64>) -> Result<Self> {
        if coordinates.len() != values.len() || values.len() != errors.len() {
            return Err(FumiOptError::DimensionMismatch(format!(
                "Got {} coordinates, {} values and {} errors",
                coordinates.len(),
                values.len(),
                errors.len()
            )));
        }
        if let Some((k, e)) = errors
            .iter()
            .enumerate()
            .find(|&(_, &e)| !(e > 0.0 && e.is_finite()))
        {
            return Err(FumiOptError::InvalidInput(format!(
                "Error of point {} must be positive, got {}",
                k, e
            )));
        }

        Ok(Self {
            coordinates,
            values,
            errors,
        })
    }

    /// One-dimensional data with the same error on every point.
    pub fn from_xy(x: &[f64], y: &[f64], error: f64) -> Result<Self> {
        Self::new(
            x.iter().map(|&xi| vec![xi]).collect(),
            y.to_vec(),
            vec![error; y.len()],
        )
    }

    /// Number of data points.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if there are no data points.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn points(&self) -> impl Iterator<Item = (&[f64], f64, f64)> {
        self.coordinates
            .iter()
            .zip(self.values.iter().zip(self.errors.iter()))
            .map(|(x, (&y, &e))| (x.as_slice(), y, e))
    }
}

fn check_gradient_len(dm: &Array1<f64>, n: usize) -> Result<()> {
    if dm.len() != n {
        return Err(FumiOptError::DimensionMismatch(format!(
            "Model returned {} parameter derivatives for {} parameters",
            dm.len(),
            n
        )));
    }
    Ok(())
}

/// Chi-square objective `sum ((m(x_k) - y_k) / sigma_k)^2`.
#[derive(Debug, Clone)]
pub struct Chi2Fcn<M> {
    model: M,
    data: MeasuredData,
}

impl<M: ModelFunction> Chi2Fcn<M> {
    /// Create a chi-square objective for a model and measured data.
    pub fn new(model: M, data: MeasuredData) -> Self {
        Self { model, data }
    }

    /// The measured data.
    pub fn data(&self) -> &MeasuredData {
        &self.data
    }
}

impl<M: ModelFunction> Fcn for Chi2Fcn<M> {
    fn value(&self, params: &Array1<f64>) -> Result<f64> {
        let mut chi2 = 0.0;
        for (x, y, e) in self.data.points() {
            let r = (self.model.eval(x, params)? - y) / e;
            chi2 += r * r;
        }
        Ok(chi2)
    }

    fn has_analytic_derivatives(&self) -> bool {
        true
    }

    fn evaluate_all(&self, params: &Array1<f64>) -> Result<Evaluation> {
        let n = params.len();
        let mut value = 0.0;
        let mut gradient = Array1::zeros(n);
        let mut hessian = SymMatrix::new(n);

        for (x, y, e) in self.data.points() {
            let r = (self.model.eval(x, params)? - y) / e;
            let dm = self.model.parameter_gradient(x, params)?;
            check_gradient_len(&dm, n)?;
            let dr = dm / e;

            value += r * r;
            for i in 0..n {
                gradient[i] += 2.0 * r * dr[i];
                for j in 0..=i {
                    let h = hessian.get(i, j) + 2.0 * dr[i] * dr[j];
                    hessian.set(i, j, h);
                }
            }
        }

        Evaluation::new(value, gradient, hessian)
    }
}

/// Unbinned negative log-likelihood `-sum ln m(x_k)`.
///
/// The model must be a (normalised) probability density; values below
/// `8 * f64::MIN_POSITIVE` are floored to that value, and such observations
/// add nothing to the gradient or the Hessian.
#[derive(Debug, Clone)]
pub struct LikelihoodFcn<M> {
    model: M,
    points: Vec<Vec<f64>>,
}

impl<M: ModelFunction> LikelihoodFcn<M> {
    /// Create a likelihood objective for a density model and observed points.
    pub fn new(model: M, points: Vec<Vec<f64>>) -> Self {
        Self { model, points }
    }

    /// One-dimensional observations.
    pub fn from_samples(model: M, samples: &[f64]) -> Self {
        Self::new(model, samples.iter().map(|&s| vec![s]).collect())
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if there are no observations.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl<M: ModelFunction> Fcn for LikelihoodFcn<M> {
    fn value(&self, params: &Array1<f64>) -> Result<f64> {
        let mut nll = 0.0;
        for x in &self.points {
            nll -= self.model.eval(x, params)?.max(MIN_DENSITY).ln();
        }
        Ok(nll)
    }

    fn error_def(&self) -> f64 {
        0.5
    }

    fn has_analytic_derivatives(&self) -> bool {
        true
    }

    fn evaluate_all(&self, params: &Array1<f64>) -> Result<Evaluation> {
        let n = params.len();
        let mut value = 0.0;
        let mut gradient = Array1::zeros(n);
        let mut hessian = SymMatrix::new(n);

        for x in &self.points {
            let density = self.model.eval(x, params)?;
            if !(density > MIN_DENSITY) {
                // A floored term does not depend on the parameters
                value -= MIN_DENSITY.ln();
                continue;
            }

            let dm = self.model.parameter_gradient(x, params)?;
            check_gradient_len(&dm, n)?;
            let dlog = dm / density;

            value -= density.ln();
            for i in 0..n {
                gradient[i] -= dlog[i];
                for j in 0..=i {
                    let h = hessian.get(i, j) + dlog[i] * dlog[j];
                    hessian.set(i, j, h);
                }
            }
        }

        Evaluation::new(value, gradient, hessian)
    }
}
