//! # Gradient calculators
//!
//! A gradient calculator turns a point in internal parameter space into the
//! derivative information a descent-direction solver needs: the gradient in
//! internal coordinates and, for second-order methods, a Hessian.
//!
//! Two implementations share the [`GradientCalculator`] interface:
//!
//! - [`AnalyticGradientCalculator`]: takes the gradient and Hessian supplied by
//!   the objective ([`Fcn::evaluate_all`]) and carries them into internal
//!   coordinates with the chain rule through the parameter transformation.
//! - [`NumericalGradientCalculator`]: estimates the gradient with iterative
//!   two-point finite differences, tuned by a [`Strategy`].
//!
//! [`Calculator::select`] picks one of them for a minimization run, based on
//! whether the objective declares analytic derivatives.
//!
//! ## Example Usage
//!
//! ```rust
//! use fumiopt_rs::fcn::{Chi2Fcn, MeasuredData};
//! use fumiopt_rs::gradient::{Calculator, GradientCalculator, GradientConfig, MinimumParameters};
//! use fumiopt_rs::parameters::Parameters;
//! use fumiopt_rs::transform::ParameterTransformation;
//! use fumiopt_rs::Result;
//! use ndarray::Array1;
//!
//! let model = |x: &[f64], p: &Array1<f64>| -> Result<f64> { Ok(p[0] + p[1] * x[0]) };
//! let data = MeasuredData::from_xy(&[0.0, 1.0, 2.0], &[1.0, 3.0, 5.0], 0.1).unwrap();
//! let fcn = Chi2Fcn::new(model, data);
//!
//! let mut params = Parameters::new();
//! params.add_param("offset", 0.5).unwrap();
//! params.add_param_with_bounds("slope", 1.5, 0.0, 5.0).unwrap();
//! let trafo = ParameterTransformation::new(&params).unwrap();
//!
//! let mut calculator = Calculator::select(&fcn, &trafo, GradientConfig::default());
//! assert!(calculator.is_analytic());
//!
//! let internal = trafo.initial_internal().unwrap();
//! let point = MinimumParameters::evaluate(&fcn, &trafo, internal).unwrap();
//! let gradient = calculator.compute(&point).unwrap();
//! assert_eq!(gradient.len(), 2);
//! assert!(calculator.hessian().is_some());
//! ```

pub mod analytic;
pub mod check;
pub mod config;
pub mod initial;
pub mod numerical;

use ndarray::Array1;

use crate::error::Result;
use crate::fcn::Fcn;
use crate::sym_matrix::SymMatrix;
use crate::transform::ParameterTransformation;

pub use analytic::AnalyticGradientCalculator;
pub use check::GradientComparison;
pub use config::{GradientConfig, Strategy, StrategyLevel};
pub use initial::InitialGradientCalculator;
pub use numerical::NumericalGradientCalculator;

/// A point in internal parameter space together with the objective value there.
#[derive(Debug, Clone, PartialEq)]
pub struct MinimumParameters {
    vec: Array1<f64>,
    fval: f64,
    step: Option<Array1<f64>>,
}

impl MinimumParameters {
    /// Create a point from internal values and the objective value at them.
    pub fn new(vec: Array1<f64>, fval: f64) -> Self {
        Self {
            vec,
            fval,
            step: None,
        }
    }

    /// Evaluate the objective at an internal point and wrap the result.
    pub fn evaluate<F: Fcn + ?Sized>(
        fcn: &F,
        trafo: &ParameterTransformation,
        vec: Array1<f64>,
    ) -> Result<Self> {
        let fval = fcn.value(&trafo.apply(&vec))?;
        Ok(Self::new(vec, fval))
    }

    /// Attach the last step taken by the minimizer.
    pub fn with_step(mut self, step: Array1<f64>) -> Self {
        self.step = Some(step);
        self
    }

    /// Internal parameter values.
    pub fn vec(&self) -> &Array1<f64> {
        &self.vec
    }

    /// Objective value at this point.
    pub fn fval(&self) -> f64 {
        self.fval
    }

    /// Last step taken by the minimizer, if any.
    pub fn step(&self) -> Option<&Array1<f64>> {
        self.step.as_ref()
    }

    /// Number of internal parameters.
    pub fn len(&self) -> usize {
        self.vec.len()
    }

    /// Check if there are no internal parameters.
    pub fn is_empty(&self) -> bool {
        self.vec.is_empty()
    }
}

/// Gradient in internal coordinates.
///
/// A numerical gradient also carries the diagonal second-derivative estimates
/// (`g2`) and the steps (`gstep`) it used, which seed the next estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionGradient {
    grad: Array1<f64>,
    g2: Option<Array1<f64>>,
    gstep: Option<Array1<f64>>,
    analytical: bool,
}

impl FunctionGradient {
    /// A gradient computed from analytic derivatives.
    pub fn analytical(grad: Array1<f64>) -> Self {
        Self {
            grad,
            g2: None,
            gstep: None,
            analytical: true,
        }
    }

    /// A gradient estimated numerically.
    pub fn numerical(grad: Array1<f64>, g2: Array1<f64>, gstep: Array1<f64>) -> Self {
        Self {
            grad,
            g2: Some(g2),
            gstep: Some(gstep),
            analytical: false,
        }
    }

    /// The gradient vector.
    pub fn grad(&self) -> &Array1<f64> {
        &self.grad
    }

    /// Diagonal second derivatives, numerical gradients only.
    pub fn g2(&self) -> Option<&Array1<f64>> {
        self.g2.as_ref()
    }

    /// Steps used for each component, numerical gradients only.
    pub fn gstep(&self) -> Option<&Array1<f64>> {
        self.gstep.as_ref()
    }

    /// Whether the gradient came from analytic derivatives.
    pub fn is_analytical(&self) -> bool {
        self.analytical
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.grad.len()
    }

    /// Check if the gradient has no components.
    pub fn is_empty(&self) -> bool {
        self.grad.is_empty()
    }

    /// Whether every component is finite.
    pub fn is_finite(&self) -> bool {
        self.grad.iter().all(|g| g.is_finite())
    }
}

/// Common interface of all gradient calculators.
///
/// The minimizer calls one of the `compute` methods once per iteration and then
/// reads [`hessian`](GradientCalculator::hessian) for its second-order step.
pub trait GradientCalculator {
    /// Compute the gradient at `par`.
    fn compute(&mut self, par: &MinimumParameters) -> Result<FunctionGradient>;

    /// Compute the gradient at `par`, starting from a previous estimate.
    ///
    /// Calculators that do not refine a previous estimate ignore `prior`.
    fn compute_with_prior(
        &mut self,
        par: &MinimumParameters,
        prior: &FunctionGradient,
    ) -> Result<FunctionGradient>;

    /// Hessian in internal coordinates from the last `compute` call, if this
    /// calculator produces one.
    fn hessian(&self) -> Option<&SymMatrix> {
        None
    }
}

/// The calculator chosen for one minimization run.
#[derive(Debug)]
pub enum Calculator<'a, F: Fcn + ?Sized> {
    /// Objective-supplied derivatives
    Analytic(AnalyticGradientCalculator<'a, F>),

    /// Finite-difference estimate
    Numerical(NumericalGradientCalculator<'a, F>),
}

impl<'a, F: Fcn + ?Sized> Calculator<'a, F> {
    /// Pick the analytic calculator when the objective supplies derivatives,
    /// the numerical one otherwise.
    pub fn select(fcn: &'a F, trafo: &'a ParameterTransformation, config: GradientConfig) -> Self {
        if fcn.has_analytic_derivatives() {
            log::debug!("Using analytic gradient calculator");
            Calculator::Analytic(AnalyticGradientCalculator::new(fcn, trafo, config))
        } else {
            log::debug!(
                "Using numerical gradient calculator ({:?} strategy)",
                config.strategy.level()
            );
            Calculator::Numerical(NumericalGradientCalculator::new(fcn, trafo, config))
        }
    }

    /// Whether the analytic variant was selected.
    pub fn is_analytic(&self) -> bool {
        matches!(self, Calculator::Analytic(_))
    }
}

impl<'a, F: Fcn + ?Sized> GradientCalculator for Calculator<'a, F> {
    fn compute(&mut self, par: &MinimumParameters) -> Result<FunctionGradient> {
        match self {
            Calculator::Analytic(calc) => calc.compute(par),
            Calculator::Numerical(calc) => calc.compute(par),
        }
    }

    fn compute_with_prior(
        &mut self,
        par: &MinimumParameters,
        prior: &FunctionGradient,
    ) -> Result<FunctionGradient> {
        match self {
            Calculator::Analytic(calc) => calc.compute_with_prior(par, prior),
            Calculator::Numerical(calc) => calc.compute_with_prior(par, prior),
        }
    }

    fn hessian(&self) -> Option<&SymMatrix> {
        match self {
            Calculator::Analytic(calc) => GradientCalculator::hessian(calc),
            Calculator::Numerical(calc) => GradientCalculator::hessian(calc),
        }
    }
}
