//! First-guess gradient from the parameter step errors.
//!
//! Before any derivative is known, the user's step error for each parameter
//! is the only scale available. Mapping `value +/- error` into internal
//! coordinates gives an internal step `dirin`; assuming the objective rises by
//! `up` over that step gives second-derivative and gradient guesses that seed
//! the iterative numerical gradient.

use ndarray::Array1;

use crate::error::Result;
use crate::gradient::{FunctionGradient, MinimumParameters};
use crate::precision::MachinePrecision;
use crate::transform::ParameterTransformation;

/// Produces the starting estimate for the numerical gradient calculator.
///
/// See [`NumericalGradientCalculator`](super::NumericalGradientCalculator).
#[derive(Debug, Clone)]
pub struct InitialGradientCalculator<'a> {
    trafo: &'a ParameterTransformation,
    precision: MachinePrecision,
    up: f64,
}

impl<'a> InitialGradientCalculator<'a> {
    /// Create the calculator.
    ///
    /// # Arguments
    ///
    /// * `trafo` - Parameter transformation (supplies the step errors)
    /// * `precision` - Machine precision
    /// * `up` - Error definition of the objective ([`Fcn::error_def`](crate::fcn::Fcn::error_def))
    pub fn new(trafo: &'a ParameterTransformation, precision: MachinePrecision, up: f64) -> Self {
        Self {
            trafo,
            precision,
            up,
        }
    }

    /// Estimate gradient, second derivatives, and steps at `par`.
    ///
    /// # Returns
    ///
    /// An error only if a parameter value cannot be mapped back into internal
    /// coordinates, which means the point lies outside the parameter limits.
    pub fn compute(&self, par: &MinimumParameters) -> Result<FunctionGradient> {
        let (grd, g2, gstep) = self.seed(par)?;
        Ok(FunctionGradient::numerical(grd, g2, gstep))
    }

    /// Gradient, second derivatives and steps as separate arrays.
    pub(crate) fn seed(
        &self,
        par: &MinimumParameters,
    ) -> Result<(Array1<f64>, Array1<f64>, Array1<f64>)> {
        let n = par.len();
        let eps2 = self.precision.eps2();
        let mut grd = Array1::zeros(n);
        let mut g2 = Array1::zeros(n);
        let mut gstep = Array1::zeros(n);

        for i in 0..n {
            let ext = self.trafo.ext_of_int(i);
            let param = self.trafo.parameter(ext);
            let var = par.vec()[i];
            let werr = param.error();
            let centre = self.trafo.int_to_ext(i, var);

            let mut upper = centre + werr;
            if param.has_upper_limit() && upper > param.max() {
                upper = param.max();
            }
            let vplu = self.trafo.ext_to_int(ext, upper)? - var;

            let mut lower = centre - werr;
            if param.has_lower_limit() && lower < param.min() {
                lower = param.min();
            }
            let vmin = self.trafo.ext_to_int(ext, lower)? - var;

            let gsmin = 8.0 * eps2 * (var.abs() + eps2);
            let dirin = (0.5 * (vplu.abs() + vmin.abs())).max(gsmin);

            g2[i] = 2.0 * self.up / (dirin * dirin);
            gstep[i] = gsmin.max(0.1 * dirin);
            grd[i] = g2[i] * dirin;
            if param.has_limits() && gstep[i] > 0.5 {
                gstep[i] = 0.5;
            }
        }

        Ok((grd, g2, gstep))
    }
}
