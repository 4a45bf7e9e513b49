//! Gradient and Hessian from objective-supplied derivatives.
//!
//! The objective reports its gradient and Hessian with respect to the external
//! parameters. This calculator carries them into internal coordinates with the
//! chain rule through the parameter transformation:
//!
//! ```text
//! v(i)    = g_ext[ext(i)] * d(i)
//! h(i, j) = H_ext[ext(i), ext(j)] * d(i) * d(j)
//! ```
//!
//! where `d(i)` is the derivative of the internal-to-external map of internal
//! parameter `i` at the current point (1 for parameters without limits).

use log::{debug, log_enabled, warn, Level};
use ndarray::Array1;

use crate::error::Result;
use crate::fcn::{Evaluation, Fcn};
use crate::gradient::check::GradientComparison;
use crate::gradient::config::GradientConfig;
use crate::gradient::numerical::NumericalGradientCalculator;
use crate::gradient::{FunctionGradient, GradientCalculator, MinimumParameters};
use crate::sym_matrix::SymMatrix;
use crate::transform::ParameterTransformation;

/// Gradient calculator for objectives with analytic derivatives.
///
/// Besides the gradient returned from [`compute`](GradientCalculator::compute),
/// every call leaves the internal Hessian of that point in
/// [`hessian`](AnalyticGradientCalculator::hessian). It is overwritten by the
/// next call.
#[derive(Debug, Clone)]
pub struct AnalyticGradientCalculator<'a, F: ?Sized> {
    fcn: &'a F,
    trafo: &'a ParameterTransformation,
    config: GradientConfig,
    hessian: SymMatrix,
    last_comparison: Option<GradientComparison>,
}

impl<'a, F: Fcn + ?Sized> AnalyticGradientCalculator<'a, F> {
    /// Create an analytic calculator.
    ///
    /// # Arguments
    ///
    /// * `fcn` - Objective that implements [`Fcn::evaluate_all`]
    /// * `trafo` - Transformation between internal and external parameters
    /// * `config` - Strategy and precision, used only by the numerical
    ///   comparison
    pub fn new(fcn: &'a F, trafo: &'a ParameterTransformation, config: GradientConfig) -> Self {
        Self {
            fcn,
            trafo,
            config,
            hessian: SymMatrix::new(trafo.n_internal()),
            last_comparison: None,
        }
    }

    /// Internal Hessian from the last `compute` call.
    ///
    /// All zeros before the first call.
    pub fn hessian(&self) -> &SymMatrix {
        &self.hessian
    }

    /// Comparison with the numerical gradient from the last `compute` call, if
    /// one was made.
    pub fn last_comparison(&self) -> Option<&GradientComparison> {
        self.last_comparison.as_ref()
    }

    pub fn config(&self) -> &GradientConfig {
        &self.config
    }

    fn to_internal(&self, x: &Array1<f64>, eval: &Evaluation) -> (Array1<f64>, SymMatrix) {
        let n = x.len();

        // Recomputed at every point
        let d: Array1<f64> = (0..n)
            .map(|i| {
                if self.trafo.has_limits(self.trafo.ext_of_int(i)) {
                    self.trafo.d_int_to_ext(i, x[i])
                } else {
                    1.0
                }
            })
            .collect();

        let mut grad = Array1::zeros(n);
        let mut hessian = SymMatrix::new(n);
        for i in 0..n {
            let ext_i = self.trafo.ext_of_int(i);
            grad[i] = eval.gradient[ext_i] * d[i];
            for j in 0..=i {
                let ext_j = self.trafo.ext_of_int(j);
                hessian.set(i, j, d[i] * d[j] * eval.hessian_at(ext_i, ext_j));
            }
        }

        (grad, hessian)
    }

    fn compare_with_numerical(&mut self, par: &MinimumParameters, fval: f64, grad: &Array1<f64>) {
        let point = MinimumParameters::new(par.vec().clone(), fval);
        let mut numerical = NumericalGradientCalculator::new(self.fcn, self.trafo, self.config);

        let comparison = numerical
            .compute(&point)
            .and_then(|num| GradientComparison::new(grad.clone(), num.grad().clone()));

        match comparison {
            Ok(comparison) => {
                debug!("Gradient comparison:\n{}", comparison);
                self.last_comparison = Some(comparison);
            }
            Err(e) => {
                warn!("Numerical gradient comparison failed: {}", e);
                self.last_comparison = None;
            }
        }
    }
}

impl<'a, F: Fcn + ?Sized> GradientCalculator for AnalyticGradientCalculator<'a, F> {
    fn compute(&mut self, par: &MinimumParameters) -> Result<FunctionGradient> {
        let external = self.trafo.apply(par.vec());
        let eval = self.fcn.evaluate_all(&external)?;

        let (grad, hessian) = self.to_internal(par.vec(), &eval);
        self.hessian = hessian;

        if self.config.check_gradient || log_enabled!(Level::Debug) {
            self.compare_with_numerical(par, eval.value, &grad);
        }

        Ok(FunctionGradient::analytical(grad))
    }

    /// Same as [`compute`](GradientCalculator::compute); the prior is not used.
    fn compute_with_prior(
        &mut self,
        par: &MinimumParameters,
        _prior: &FunctionGradient,
    ) -> Result<FunctionGradient> {
        self.compute(par)
    }

    fn hessian(&self) -> Option<&SymMatrix> {
        Some(&self.hessian)
    }
}
