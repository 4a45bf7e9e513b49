//! Two-point numerical gradient.
//!
//! Each component is estimated with central differences in internal
//! coordinates. The step is not fixed: it starts from the optimal step for the
//! current curvature estimate and is refined for a few cycles (set by the
//! [`Strategy`](super::Strategy)) until either the step or the derivative
//! settles. The second-difference byproduct `g2` is kept and reused by the
//! next call through [`compute_with_prior`](GradientCalculator::compute_with_prior).

use ndarray::Array1;

use crate::error::Result;
use crate::fcn::Fcn;
use crate::gradient::config::GradientConfig;
use crate::gradient::initial::InitialGradientCalculator;
use crate::gradient::{FunctionGradient, GradientCalculator, MinimumParameters};
use crate::transform::ParameterTransformation;

/// Finite-difference gradient of an objective in internal coordinates.
#[derive(Debug, Clone)]
pub struct NumericalGradientCalculator<'a, F: ?Sized> {
    fcn: &'a F,
    trafo: &'a ParameterTransformation,
    config: GradientConfig,
}

impl<'a, F: Fcn + ?Sized> NumericalGradientCalculator<'a, F> {
    /// Create a numerical calculator for an objective and its transformation.
    pub fn new(fcn: &'a F, trafo: &'a ParameterTransformation, config: GradientConfig) -> Self {
        Self { fcn, trafo, config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &GradientConfig {
        &self.config
    }

    fn value_at(&self, internal: &Array1<f64>) -> Result<f64> {
        self.fcn.value(&self.trafo.apply(internal))
    }

    fn seed(
        &self,
        par: &MinimumParameters,
    ) -> Result<(Array1<f64>, Array1<f64>, Array1<f64>)> {
        InitialGradientCalculator::new(self.trafo, self.config.precision, self.fcn.error_def())
            .seed(par)
    }

    fn refine(
        &self,
        par: &MinimumParameters,
        mut grd: Array1<f64>,
        mut g2: Array1<f64>,
        mut gstep: Array1<f64>,
    ) -> Result<FunctionGradient> {
        let n = par.len();
        let strategy = &self.config.strategy;
        let eps = self.config.precision.eps();
        let eps2 = self.config.precision.eps2();
        let up = self.fcn.error_def();

        let fcnmin = par.fval();
        let dfmin = 8.0 * eps2 * (fcnmin.abs() + up);
        let vrysml = 8.0 * eps * eps;

        let mut x = par.vec().clone();

        for i in 0..n {
            let xtf = x[i];
            let epspri = eps2 + (grd[i] * eps2).abs();
            let has_limits = self.trafo.has_limits(self.trafo.ext_of_int(i));
            let mut stepb4 = 0.0;

            for _ in 0..strategy.grad_ncycles {
                let optstp = (dfmin / (g2[i].abs() + epspri)).sqrt();
                let mut step = optstp.max((0.1 * gstep[i]).abs());

                if has_limits && step > 0.5 {
                    step = 0.5;
                }
                let stpmax = 10.0 * gstep[i].abs();
                if step > stpmax {
                    step = stpmax;
                }
                let stpmin = vrysml.max(8.0 * (eps2 * x[i]).abs());
                if step < stpmin {
                    step = stpmin;
                }
                if ((step - stepb4) / step).abs() < strategy.grad_step_tolerance {
                    break;
                }
                gstep[i] = step;
                stepb4 = step;

                x[i] = xtf + step;
                let fs1 = self.value_at(&x)?;
                x[i] = xtf - step;
                let fs2 = self.value_at(&x)?;
                x[i] = xtf;

                let grdb4 = grd[i];
                grd[i] = 0.5 * (fs1 - fs2) / step;
                g2[i] = (fs1 + fs2 - 2.0 * fcnmin) / step / step;

                if (grdb4 - grd[i]).abs() / (grd[i].abs() + dfmin / step)
                    < strategy.grad_tolerance
                {
                    break;
                }
            }
        }

        Ok(FunctionGradient::numerical(grd, g2, gstep))
    }
}

impl<'a, F: Fcn + ?Sized> GradientCalculator for NumericalGradientCalculator<'a, F> {
    /// Estimate the gradient, seeded by the step errors of the parameters.
    fn compute(&mut self, par: &MinimumParameters) -> Result<FunctionGradient> {
        let (grd, g2, gstep) = self.seed(par)?;
        self.refine(par, grd, g2, gstep)
    }

    /// Estimate the gradient, seeded by a previous estimate.
    ///
    /// An analytic prior carries no curvature or steps; those are then taken
    /// from the initial estimate while its gradient is kept.
    fn compute_with_prior(
        &mut self,
        par: &MinimumParameters,
        prior: &FunctionGradient,
    ) -> Result<FunctionGradient> {
        if let (Some(g2), Some(gstep)) = (prior.g2(), prior.gstep()) {
            return self.refine(par, prior.grad().clone(), g2.clone(), gstep.clone());
        }
        let (_, g2, gstep) = self.seed(par)?;
        self.refine(par, prior.grad().clone(), g2, gstep)
    }
}
