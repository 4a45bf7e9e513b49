//! # fumiopt-rs
//!
//! `fumiopt-rs` computes the derivative information a second-order minimizer
//! needs at each iteration: the gradient and Hessian of an objective, expressed
//! in the unconstrained internal coordinates the minimizer works in.
//!
//! The library provides:
//! - A parameter system with bounds and fixed parameters
//! - The transformation between bounded external and unconstrained internal parameters
//! - An analytic gradient calculator that applies the chain rule to objective-supplied
//!   derivatives, with an optional numerical cross-check
//! - An iterative two-point numerical gradient for objectives without derivatives
//! - Chi-square and likelihood objectives with Fumili-style derivatives
//! - A packed symmetric matrix for the Hessian
//!
//! ## Basic Usage
//!
//! ```
//! use fumiopt_rs::fcn::{Evaluation, Fcn};
//! use fumiopt_rs::gradient::{Calculator, GradientCalculator, GradientConfig, MinimumParameters};
//! use fumiopt_rs::parameters::Parameters;
//! use fumiopt_rs::{ParameterTransformation, Result, SymMatrix};
//! use ndarray::Array1;
//!
//! struct Paraboloid;
//!
//! impl Fcn for Paraboloid {
//!     fn value(&self, p: &Array1<f64>) -> Result<f64> {
//!         Ok(p.iter().map(|x| x * x).sum())
//!     }
//!
//!     fn has_analytic_derivatives(&self) -> bool {
//!         true
//!     }
//!
//!     fn evaluate_all(&self, p: &Array1<f64>) -> Result<Evaluation> {
//!         let mut hessian = SymMatrix::new(p.len());
//!         for i in 0..p.len() {
//!             hessian.set(i, i, 2.0);
//!         }
//!         Evaluation::new(self.value(p)?, p * 2.0, hessian)
//!     }
//! }
//!
//! let mut params = Parameters::new();
//! params.add_param("x", 1.0).unwrap();
//! params.add_param("y", 2.0).unwrap();
//! let trafo = ParameterTransformation::new(&params).unwrap();
//!
//! let mut calculator = Calculator::select(&Paraboloid, &trafo, GradientConfig::default());
//! let internal = trafo.initial_internal().unwrap();
//! let point = MinimumParameters::evaluate(&Paraboloid, &trafo, internal).unwrap();
//! let gradient = calculator.compute(&point).unwrap();
//!
//! assert_eq!(gradient.grad()[0], 2.0);
//! assert_eq!(gradient.grad()[1], 4.0);
//! assert_eq!(calculator.hessian().unwrap().get(1, 1), 2.0);
//! ```

// Public modules
pub mod error;

// Parameter system
pub mod parameters;
pub mod precision;
pub mod transform;

// Objectives and derivatives
pub mod fcn;
pub mod gradient;
pub mod sym_matrix;

mod utils;

// Re-exports for convenience
pub use error::{FumiOptError, Result};
pub use fcn::{Evaluation, Fcn};
pub use gradient::{
    AnalyticGradientCalculator, Calculator, FunctionGradient, GradientCalculator,
    GradientConfig, MinimumParameters, NumericalGradientCalculator, Strategy,
};
pub use precision::MachinePrecision;
pub use sym_matrix::SymMatrix;
pub use transform::ParameterTransformation;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
