//! Tests for the analytic gradient calculator

use crate::test_helpers::{array_approx_eq, WeightedQuadratic};
use approx::assert_relative_eq;
use fumiopt_rs::fcn::{Evaluation, Fcn};
use fumiopt_rs::gradient::{
    AnalyticGradientCalculator, GradientCalculator, GradientConfig, MinimumParameters,
};
use fumiopt_rs::parameters::Parameters;
use fumiopt_rs::{ParameterTransformation, Result, SymMatrix};
use ndarray::{array, Array1};

/// Reports a fixed external gradient and Hessian at every point.
struct FixedDerivatives {
    gradient: Array1<f64>,
    hessian: SymMatrix,
}

impl Fcn for FixedDerivatives {
    fn value(&self, params: &Array1<f64>) -> Result<f64> {
        Ok(self.gradient.dot(params))
    }

    fn has_analytic_derivatives(&self) -> bool {
        true
    }

    fn evaluate_all(&self, params: &Array1<f64>) -> Result<Evaluation> {
        Evaluation::new(
            self.value(params)?,
            self.gradient.clone(),
            self.hessian.clone(),
        )
    }
}

fn fixed_derivatives() -> FixedDerivatives {
    let mut hessian = SymMatrix::new(3);
    hessian.set(0, 0, 2.0);
    hessian.set(1, 0, -0.5);
    hessian.set(1, 1, 3.0);
    hessian.set(2, 0, 0.25);
    hessian.set(2, 1, 1.0);
    hessian.set(2, 2, 4.0);
    FixedDerivatives {
        gradient: array![1.0, -2.0, 0.5],
        hessian,
    }
}

fn at_start<F: Fcn>(fcn: &F, trafo: &ParameterTransformation) -> MinimumParameters {
    MinimumParameters::evaluate(fcn, trafo, trafo.initial_internal().unwrap()).unwrap()
}

#[test]
fn test_unbounded_quadratic_scenario() {
    let fcn = WeightedQuadratic::unit(2);
    let mut params = Parameters::new();
    params.add_param("x", 1.0).unwrap();
    params.add_param("y", 2.0).unwrap();
    let trafo = ParameterTransformation::new(&params).unwrap();

    let mut calc = AnalyticGradientCalculator::new(&fcn, &trafo, GradientConfig::default());
    let gradient = calc.compute(&at_start(&fcn, &trafo)).unwrap();

    assert_eq!(gradient.grad(), &array![2.0, 4.0]);
    let hessian = calc.hessian().to_array2();
    assert_eq!(hessian, array![[2.0, 0.0], [0.0, 2.0]]);
}

#[test]
fn test_bounded_midpoint_scenario() {
    struct Identity;
    impl Fcn for Identity {
        fn value(&self, params: &Array1<f64>) -> Result<f64> {
            Ok(params[0])
        }
        fn has_analytic_derivatives(&self) -> bool {
            true
        }
        fn evaluate_all(&self, params: &Array1<f64>) -> Result<Evaluation> {
            Evaluation::new(params[0], array![1.0], SymMatrix::new(1))
        }
    }

    let mut params = Parameters::new();
    params.add_param_with_bounds("x", 5.0, 0.0, 10.0).unwrap();
    let trafo = ParameterTransformation::new(&params).unwrap();
    let point = at_start(&Identity, &trafo);

    let mut calc = AnalyticGradientCalculator::new(&Identity, &trafo, GradientConfig::default());
    let gradient = calc.compute(&point).unwrap();

    let d = trafo.d_int_to_ext(0, point.vec()[0]);
    assert_relative_eq!(d, 5.0, epsilon = 1e-12);
    assert_relative_eq!(gradient.grad()[0], d, epsilon = 1e-12);
    assert_eq!(calc.hessian().get(0, 0), 0.0);
}

#[test]
fn test_scaling_law_when_bounds_change() {
    let fcn = fixed_derivatives();
    let values = [1.0, 2.0, 3.0];

    let bounds_sets = [
        [(-5.0, 5.0), (0.0, 4.0), (2.0, f64::INFINITY)],
        [(0.5, 1.5), (1.9, 2.1), (2.9, f64::INFINITY)],
        [(-100.0, 100.0), (-100.0, 100.0), (-100.0, f64::INFINITY)],
    ];

    let mut free = Parameters::new();
    for (k, &v) in values.iter().enumerate() {
        free.add_param(&format!("p{}", k), v).unwrap();
    }
    let free_trafo = ParameterTransformation::new(&free).unwrap();
    let mut free_calc =
        AnalyticGradientCalculator::new(&fcn, &free_trafo, GradientConfig::default());
    let g_free = free_calc.compute(&at_start(&fcn, &free_trafo)).unwrap();
    let h_free = free_calc.hessian().clone();

    // Unbounded: raw external derivatives
    assert_eq!(g_free.grad(), &fcn.gradient);
    assert_eq!(h_free, fcn.hessian);

    for bounds in bounds_sets.iter() {
        let mut params = Parameters::new();
        for (k, (&v, &(lo, hi))) in values.iter().zip(bounds.iter()).enumerate() {
            params
                .add_param_with_bounds(&format!("p{}", k), v, lo, hi)
                .unwrap();
        }
        let trafo = ParameterTransformation::new(&params).unwrap();
        let point = at_start(&fcn, &trafo);
        let d: Vec<f64> = (0..3).map(|i| trafo.d_int_to_ext(i, point.vec()[i])).collect();

        let mut calc = AnalyticGradientCalculator::new(&fcn, &trafo, GradientConfig::default());
        let g = calc.compute(&point).unwrap();

        for i in 0..3 {
            assert_relative_eq!(g.grad()[i], g_free.grad()[i] * d[i], max_relative = 1e-14);
            for j in 0..=i {
                assert_relative_eq!(
                    calc.hessian().get(i, j),
                    h_free.get(i, j) * d[i] * d[j],
                    max_relative = 1e-14
                );
            }
        }
    }
}

#[test]
fn test_compute_twice_is_bit_identical() {
    let fcn = WeightedQuadratic::new(array![0.5, -1.0, 2.0], array![1.0, 3.0, 0.5]);
    let mut params = Parameters::new();
    params.add_param_with_bounds("a", 0.2, -1.0, 1.0).unwrap();
    params.add_param_with_bounds("b", 3.0, 1.0, f64::INFINITY).unwrap();
    params.add_param("c", -0.7).unwrap();
    let trafo = ParameterTransformation::new(&params).unwrap();
    let point = at_start(&fcn, &trafo);

    let mut calc = AnalyticGradientCalculator::new(&fcn, &trafo, GradientConfig::default());
    let first = calc.compute(&point).unwrap();
    let first_hessian = calc.hessian().as_packed().to_vec();
    let second = calc.compute(&point).unwrap();

    assert_eq!(first.grad(), second.grad());
    assert_eq!(first_hessian.as_slice(), calc.hessian().as_packed());
}

#[test]
fn test_prior_is_ignored() {
    let fcn = WeightedQuadratic::unit(2);
    let mut params = Parameters::new();
    params.add_param("x", 1.0).unwrap();
    params.add_param("y", 2.0).unwrap();
    let trafo = ParameterTransformation::new(&params).unwrap();
    let point = at_start(&fcn, &trafo);

    let mut calc = AnalyticGradientCalculator::new(&fcn, &trafo, GradientConfig::default());
    let plain = calc.compute(&point).unwrap();

    let bogus = fumiopt_rs::FunctionGradient::numerical(
        array![100.0, -100.0],
        array![1.0, 1.0],
        array![0.1, 0.1],
    );
    let with_prior = calc.compute_with_prior(&point, &bogus).unwrap();
    assert_eq!(plain, with_prior);
}

#[test]
fn test_hessian_symmetric_through_accessor() {
    let fcn = fixed_derivatives();
    let mut params = Parameters::new();
    params.add_param_with_bounds("a", 1.0, 0.0, 3.0).unwrap();
    params.add_param("b", 2.0).unwrap();
    params.add_param_with_bounds("c", 3.0, 0.0, f64::INFINITY).unwrap();
    let trafo = ParameterTransformation::new(&params).unwrap();

    let mut calc = AnalyticGradientCalculator::new(&fcn, &trafo, GradientConfig::default());
    calc.compute(&at_start(&fcn, &trafo)).unwrap();

    let h = calc.hessian();
    for i in 0..3 {
        for j in 0..3 {
            assert_eq!(h.get(i, j), h.get(j, i));
            assert_eq!(h[(i, j)], h.get(i, j));
        }
    }
    // Only the lower triangle is stored
    assert_eq!(h.as_packed().len(), 6);
}

#[test]
fn test_fixed_parameter_is_skipped() {
    let fcn = fixed_derivatives();
    let mut params = Parameters::new();
    params.add_param("a", 1.0).unwrap();
    params.add_fixed("b", 2.0).unwrap();
    params.add_param("c", 3.0).unwrap();
    let trafo = ParameterTransformation::new(&params).unwrap();

    let mut calc = AnalyticGradientCalculator::new(&fcn, &trafo, GradientConfig::default());
    let g = calc.compute(&at_start(&fcn, &trafo)).unwrap();

    assert_eq!(g.grad(), &array![1.0, 0.5]);
    assert_eq!(
        calc.hessian().to_array2(),
        array![[2.0, 0.25], [0.25, 4.0]]
    );
}

#[test]
fn test_wrong_gradient_changes_trace_not_result() {
    // Reports 3 * the true gradient of x^2 + y^2
    struct Scaled;
    impl Fcn for Scaled {
        fn value(&self, params: &Array1<f64>) -> Result<f64> {
            Ok(params.iter().map(|x| x * x).sum())
        }
        fn has_analytic_derivatives(&self) -> bool {
            true
        }
        fn evaluate_all(&self, params: &Array1<f64>) -> Result<Evaluation> {
            Evaluation::new(
                self.value(params)?,
                params * 6.0,
                SymMatrix::identity(params.len()),
            )
        }
    }

    let mut params = Parameters::new();
    params.add_param("x", 0.5).unwrap();
    params.add_param_with_bounds("y", 1.0, -2.0, 2.0).unwrap();
    let trafo = ParameterTransformation::new(&params).unwrap();
    let point = at_start(&Scaled, &trafo);

    let checked_config = GradientConfig::default().with_check_gradient(true);

    let mut wrong = AnalyticGradientCalculator::new(&Scaled, &trafo, checked_config);
    let wrong_gradient = wrong.compute(&point).unwrap();

    let mut unchecked = AnalyticGradientCalculator::new(&Scaled, &trafo, GradientConfig::default());
    assert_eq!(unchecked.compute(&point).unwrap(), wrong_gradient);

    let right = WeightedQuadratic::unit(2);
    let mut good = AnalyticGradientCalculator::new(&right, &trafo, checked_config);
    good.compute(&point).unwrap();

    let wrong_trace = wrong.last_comparison().unwrap();
    let good_trace = good.last_comparison().unwrap();

    assert!(!wrong_trace.is_consistent(1e-3));
    assert!(good_trace.is_consistent(1e-3));
    assert_ne!(wrong_trace.to_string(), good_trace.to_string());

    // Both comparisons saw the same numerical gradient
    assert!(array_approx_eq(
        wrong_trace.numerical(),
        good_trace.numerical(),
        1e-12
    ));
}

#[test]
fn test_no_comparison_without_check_or_debug_logging() {
    let fcn = WeightedQuadratic::unit(1);
    let mut params = Parameters::new();
    params.add_param("x", 1.0).unwrap();
    let trafo = ParameterTransformation::new(&params).unwrap();

    let mut calc = AnalyticGradientCalculator::new(&fcn, &trafo, GradientConfig::default());
    calc.compute(&at_start(&fcn, &trafo)).unwrap();

    // No logger is installed in the test binary
    assert!(calc.last_comparison().is_none());
}
