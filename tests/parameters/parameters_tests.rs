//! Integration tests for the Parameters collection
//!
//! These tests verify that the Parameters collection behaves correctly in various scenarios.

use fumiopt_rs::parameters::{Parameter, ParameterError, Parameters, SerializationError};
use std::f64::INFINITY;

fn gaussian_parameters() -> Parameters {
    let mut params = Parameters::new();
    params.add_param_with_bounds("amplitude", 10.0, 0.0, INFINITY).unwrap();
    params.add_param("center", 5.0).unwrap();
    params.add_param_with_bounds("sigma", 2.0, 0.1, 10.0).unwrap();
    params.add_fixed("background", 0.3).unwrap();
    params
}

#[test]
fn test_parameters_basic_operations() {
    let mut params = Parameters::new();
    assert_eq!(params.len(), 0);
    assert!(params.is_empty());

    // Insertion order is the external index
    assert_eq!(params.add(Parameter::new("amplitude", 10.0)).unwrap(), 0);
    assert_eq!(params.add_param("center", 5.0).unwrap(), 1);
    assert_eq!(params.len(), 2);
    assert!(params.contains("center"));
    assert_eq!(params.index_of("center"), Some(1));
    assert_eq!(params.at(0).unwrap().name(), "amplitude");
    assert!(params.get("nonexistent").is_none());

    params.get_mut("center").unwrap().set_value(7.5).unwrap();
    assert_eq!(params.get("center").unwrap().value(), 7.5);
    assert_eq!(params.names(), vec!["amplitude", "center"]);
    assert_eq!(params.values(), vec![10.0, 7.5]);

    params.reset();
    assert_eq!(params.get("center").unwrap().value(), 5.0);
}

#[test]
fn test_duplicate_names_rejected() {
    let mut params = Parameters::new();
    params.add_param("x", 1.0).unwrap();

    match params.add_param("x", 2.0) {
        Err(ParameterError::DuplicateParameter { .. }) => (),
        other => panic!("Expected DuplicateParameter, got {:?}", other),
    }
    assert_eq!(params.len(), 1);
}

#[test]
fn test_fix_and_release() {
    let mut params = gaussian_parameters();
    assert_eq!(params.varying().len(), 3);
    assert_eq!(params.fixed().len(), 1);

    params.fix("center").unwrap();
    assert_eq!(params.varying().len(), 2);
    assert!(params.get("center").unwrap().is_fixed());

    params.release("background").unwrap();
    assert_eq!(params.fixed().len(), 1);

    assert!(params.fix("missing").is_err());
}

#[test]
fn test_one_sided_bounds_from_infinite_side() {
    let params = gaussian_parameters();
    let amplitude = params.get("amplitude").unwrap();
    assert!(amplitude.has_lower_limit());
    assert!(!amplitude.has_upper_limit());
}

#[test]
fn test_json_round_trip() {
    let mut params = gaussian_parameters();
    params.get_mut("sigma").unwrap().set_error(0.05).unwrap();

    let json = params.to_json().unwrap();
    let loaded = Parameters::from_json(&json).unwrap();

    assert_eq!(loaded.names(), params.names());
    assert_eq!(loaded.values(), params.values());
    assert_eq!(loaded.get("sigma").unwrap().error(), 0.05);
    assert!(loaded.get("background").unwrap().is_fixed());
    assert_eq!(loaded.get("amplitude").unwrap().max(), INFINITY);

    // Name lookup works after loading
    assert_eq!(loaded.index_of("sigma"), Some(2));
}

#[test]
fn test_json_file_round_trip() {
    let params = gaussian_parameters();
    let path = std::env::temp_dir().join(format!("fumiopt_params_{}.json", std::process::id()));

    params.save_json(&path).unwrap();
    let loaded = Parameters::load_json(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(loaded.values(), params.values());
}

#[test]
fn test_invalid_json() {
    match Parameters::from_json("{ not json") {
        Err(SerializationError::JsonError(_)) => (),
        other => panic!("Expected JsonError, got {:?}", other),
    }
}
