//! Fits with Fumili-style objectives
//!
//! These tests take a few Newton steps with the gradient and Hessian handed out
//! by the calculators, the way a second-order minimizer would use them.

use crate::test_helpers::ValueOnly;
use approx::assert_relative_eq;
use fumiopt_rs::fcn::{Chi2Fcn, LikelihoodFcn, MeasuredData, ModelFunction};
use fumiopt_rs::gradient::{Calculator, GradientCalculator, GradientConfig, MinimumParameters};
use fumiopt_rs::parameters::Parameters;
use fumiopt_rs::{Fcn, ParameterTransformation, Result};
use ndarray::{array, Array1};

/// y = offset + slope * x with exact parameter derivatives
struct Line;

impl ModelFunction for Line {
    fn eval(&self, x: &[f64], p: &Array1<f64>) -> Result<f64> {
        Ok(p[0] + p[1] * x[0])
    }

    fn parameter_gradient(&self, x: &[f64], _p: &Array1<f64>) -> Result<Array1<f64>> {
        Ok(array![1.0, x[0]])
    }
}

fn line_data() -> MeasuredData {
    let x: Vec<f64> = (0..8).map(|i| i as f64 * 0.5).collect();
    let y: Vec<f64> = x.iter().map(|&xi| 1.0 + 2.0 * xi).collect();
    MeasuredData::from_xy(&x, &y, 0.2).unwrap()
}

/// Solve the 2x2 system `h * step = -g`.
fn newton_step(h: [[f64; 2]; 2], g: &Array1<f64>) -> Array1<f64> {
    let det = h[0][0] * h[1][1] - h[0][1] * h[1][0];
    array![
        -(h[1][1] * g[0] - h[0][1] * g[1]) / det,
        -(-h[1][0] * g[0] + h[0][0] * g[1]) / det,
    ]
}

#[test]
fn test_chi2_newton_step_reaches_least_squares_solution() {
    let fcn = Chi2Fcn::new(Line, line_data());
    let mut params = Parameters::new();
    params.add_param("offset", 0.0).unwrap();
    params.add_param("slope", 0.5).unwrap();
    let trafo = ParameterTransformation::new(&params).unwrap();

    let mut calc = Calculator::select(&fcn, &trafo, GradientConfig::default());
    assert!(calc.is_analytic());

    let start =
        MinimumParameters::evaluate(&fcn, &trafo, trafo.initial_internal().unwrap()).unwrap();
    let g = calc.compute(&start).unwrap();
    let h = calc.hessian().unwrap();
    let step = newton_step([[h.get(0, 0), h.get(0, 1)], [h.get(1, 0), h.get(1, 1)]], g.grad());

    // Chi-square of a linear model is quadratic: one step is enough
    let solution = start.vec() + &step;
    let external = trafo.apply(&solution);
    assert_relative_eq!(external[0], 1.0, epsilon = 1e-9);
    assert_relative_eq!(external[1], 2.0, epsilon = 1e-9);
    assert!(fcn.value(&external).unwrap() < 1e-15);
}

#[test]
fn test_bounded_chi2_fit_converges() {
    let model = |x: &[f64], p: &Array1<f64>| -> Result<f64> { Ok(p[0] * (-p[1] * x[0]).exp()) };
    let x: Vec<f64> = (0..10).map(|i| i as f64 * 0.3).collect();
    let y: Vec<f64> = x.iter().map(|&xi| 4.0 * (-0.7 * xi).exp()).collect();
    let fcn = Chi2Fcn::new(model, MeasuredData::from_xy(&x, &y, 0.05).unwrap());

    let mut params = Parameters::new();
    params.add_param_with_bounds("amplitude", 3.0, 0.0, 10.0).unwrap();
    params.add_param_with_bounds("rate", 0.5, 0.0, f64::INFINITY).unwrap();
    let trafo = ParameterTransformation::new(&params).unwrap();

    let mut calc = Calculator::select(&fcn, &trafo, GradientConfig::default());
    let mut point =
        MinimumParameters::evaluate(&fcn, &trafo, trafo.initial_internal().unwrap()).unwrap();
    let initial_value = point.fval();

    for _ in 0..25 {
        let g = calc.compute(&point).unwrap();
        let h = calc.hessian().unwrap();
        let step = newton_step([[h.get(0, 0), h.get(0, 1)], [h.get(1, 0), h.get(1, 1)]], g.grad());

        // Halve the step until the objective decreases
        let mut scale = 1.0;
        let mut next = None;
        for _ in 0..30 {
            let candidate = point.vec() + &(&step * scale);
            let trial = MinimumParameters::evaluate(&fcn, &trafo, candidate).unwrap();
            if trial.fval() <= point.fval() {
                next = Some(trial);
                break;
            }
            scale *= 0.5;
        }
        match next {
            Some(trial) => point = trial,
            None => break,
        }
    }

    assert!(point.fval() < initial_value);
    let external = trafo.apply(point.vec());
    assert_relative_eq!(external[0], 4.0, max_relative = 1e-4);
    assert_relative_eq!(external[1], 0.7, max_relative = 1e-4);
}

#[test]
fn test_likelihood_gradient_vanishes_at_sample_mean() {
    // p(t) = exp(-t / tau) / tau; the maximum-likelihood tau is the sample mean
    let density = |x: &[f64], p: &Array1<f64>| -> Result<f64> { Ok((-x[0] / p[0]).exp() / p[0]) };
    let samples = [0.3, 1.1, 0.7, 2.4, 0.5, 1.6];
    let mean = samples.iter().sum::<f64>() / samples.len() as f64;
    let fcn = LikelihoodFcn::from_samples(density, &samples);
    assert_eq!(fcn.error_def(), 0.5);

    let mut params = Parameters::new();
    params.add_param_with_bounds("tau", mean, 0.1, 10.0).unwrap();
    let trafo = ParameterTransformation::new(&params).unwrap();
    let point =
        MinimumParameters::evaluate(&fcn, &trafo, trafo.initial_internal().unwrap()).unwrap();

    let mut calc = Calculator::select(&fcn, &trafo, GradientConfig::default());
    let g = calc.compute(&point).unwrap();
    assert!(g.grad()[0].abs() < 1e-6);
    assert!(calc.hessian().unwrap().get(0, 0) > 0.0);

    // Away from the mean the gradient points uphill
    let above = MinimumParameters::evaluate(&fcn, &trafo, point.vec() + 0.1).unwrap();
    assert!(calc.compute(&above).unwrap().grad()[0] > 0.0);
}

#[test]
fn test_fumili_gradient_agrees_with_numerical_path() {
    let fcn = Chi2Fcn::new(Line, line_data());
    let value_only = ValueOnly(&fcn);

    let mut params = Parameters::new();
    params.add_param_with_bounds("offset", 0.4, -5.0, 5.0).unwrap();
    params.add_param("slope", 2.5).unwrap();
    let trafo = ParameterTransformation::new(&params).unwrap();
    let point =
        MinimumParameters::evaluate(&fcn, &trafo, trafo.initial_internal().unwrap()).unwrap();

    let mut analytic = Calculator::select(&fcn, &trafo, GradientConfig::default());
    let mut numerical = Calculator::select(&value_only, &trafo, GradientConfig::default());

    let ga = analytic.compute(&point).unwrap();
    let gn = numerical.compute(&point).unwrap();
    for i in 0..2 {
        assert_relative_eq!(ga.grad()[i], gn.grad()[i], max_relative = 1e-5);
    }
}

#[test]
fn test_likelihood_with_zero_density_sample_gives_finite_derivatives() {
    // Triangle density that vanishes beyond the parameter
    let density = |x: &[f64], p: &Array1<f64>| -> Result<f64> { Ok((p[0] - x[0]).max(0.0)) };
    let fcn = LikelihoodFcn::from_samples(density, &[0.5, 1.0]);

    let mut params = Parameters::new();
    params.add_param("edge", 1.0).unwrap();
    let trafo = ParameterTransformation::new(&params).unwrap();
    let point = MinimumParameters::evaluate(&fcn, &trafo, array![1.0]).unwrap();

    let mut calc = Calculator::select(&fcn, &trafo, GradientConfig::default());
    let g = calc.compute(&point).unwrap();
    let h = calc.hessian().unwrap();

    assert!(g.grad().iter().all(|v| v.is_finite()));
    assert!(h.as_packed().iter().all(|v| v.is_finite()));
    assert_relative_eq!(g.grad()[0], -2.0);
    assert_relative_eq!(h.get(0, 0), 4.0);
}
