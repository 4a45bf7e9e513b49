//! Mapping between the internal and the external parameter vectors.
//!
//! The minimizer works on an unconstrained *internal* vector holding only the
//! varying parameters. The objective function is called with the full *external*
//! vector: fixed parameters are filled in with their stored values and bounded
//! parameters go through their [`BoundsTransform`].

use ndarray::Array1;

use crate::error::{FumiOptError, Result};
use crate::parameters::{BoundsTransform, Parameter, Parameters};
use crate::precision::MachinePrecision;

/// Transformation between internal (unconstrained, varying only) and external
/// (user-facing, possibly bounded, including fixed) parameters.
///
/// # Examples
///
/// ```
/// use fumiopt_rs::parameters::Parameters;
/// use fumiopt_rs::transform::ParameterTransformation;
///
/// let mut params = Parameters::new();
/// params.add_fixed("offset", 1.0).unwrap();
/// params.add_param_with_bounds("amp", 5.0, 0.0, 10.0).unwrap();
///
/// let trafo = ParameterTransformation::new(&params).unwrap();
/// assert_eq!(trafo.n_internal(), 1);
/// assert_eq!(trafo.ext_of_int(0), 1);
///
/// let internal = trafo.initial_internal().unwrap();
/// let external = trafo.apply(&internal);
/// assert_eq!(external[0], 1.0);
/// assert!((external[1] - 5.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct ParameterTransformation {
    parameters: Vec<Parameter>,
    transforms: Vec<BoundsTransform>,
    ext_of_int: Vec<usize>,
    int_of_ext: Vec<Option<usize>>,
    precision: MachinePrecision,
}

impl ParameterTransformation {
    /// Build the transformation for a parameter collection.
    ///
    /// # Returns
    ///
    /// An error if a parameter value is not finite or lies outside its limits.
    pub fn new(params: &Parameters) -> Result<Self> {
        Self::with_precision(params, MachinePrecision::default())
    }

    /// Build the transformation with an explicit machine precision.
    pub fn with_precision(params: &Parameters, precision: MachinePrecision) -> Result<Self> {
        let mut parameters = Vec::with_capacity(params.len());
        let mut transforms = Vec::with_capacity(params.len());
        let mut ext_of_int = Vec::new();
        let mut int_of_ext = Vec::with_capacity(params.len());

        for (ext, param) in params.iter().enumerate() {
            if !param.value().is_finite() {
                return Err(FumiOptError::BoundsError(format!(
                    "Parameter '{}' has non-finite value {}",
                    param.name(),
                    param.value()
                )));
            }
            if !param.bounds().is_within_bounds(param.value()) {
                return Err(FumiOptError::BoundsError(format!(
                    "Parameter '{}' value {} is outside [{}, {}]",
                    param.name(),
                    param.value(),
                    param.min(),
                    param.max()
                )));
            }

            if param.vary() {
                int_of_ext.push(Some(ext_of_int.len()));
                ext_of_int.push(ext);
            } else {
                int_of_ext.push(None);
            }
            transforms.push(param.bounds_transform());
            parameters.push(param.clone());
        }

        Ok(Self {
            parameters,
            transforms,
            ext_of_int,
            int_of_ext,
            precision,
        })
    }

    /// Number of internal (varying) parameters.
    pub fn n_internal(&self) -> usize {
        self.ext_of_int.len()
    }

    /// Number of external parameters, fixed ones included.
    pub fn n_external(&self) -> usize {
        self.parameters.len()
    }

    /// External index of internal parameter `i`.
    pub fn ext_of_int(&self, i: usize) -> usize {
        self.ext_of_int[i]
    }

    /// Internal index of external parameter `ext`, `None` when it is fixed.
    pub fn int_of_ext(&self, ext: usize) -> Option<usize> {
        self.int_of_ext.get(ext).copied().flatten()
    }

    /// External parameter definition at `ext`.
    pub fn parameter(&self, ext: usize) -> &Parameter {
        &self.parameters[ext]
    }

    /// Whether external parameter `ext` is bounded on at least one side.
    pub fn has_limits(&self, ext: usize) -> bool {
        self.parameters[ext].has_limits()
    }

    /// Machine precision used for the inverse transform.
    pub fn precision(&self) -> &MachinePrecision {
        &self.precision
    }

    /// External value of internal parameter `i` at internal value `value`.
    pub fn int_to_ext(&self, i: usize, value: f64) -> f64 {
        self.transforms[self.ext_of_int[i]].to_external(value)
    }

    /// Internal value for external parameter `ext` at external value `value`.
    ///
    /// # Returns
    ///
    /// An error if the value is not finite or lies outside the parameter limits.
    pub fn ext_to_int(&self, ext: usize, value: f64) -> Result<f64> {
        Ok(self.transforms[ext].to_internal(value, &self.precision)?)
    }

    /// Derivative of the internal-to-external map of internal parameter `i` at
    /// internal value `value`; exactly 1 for parameters without limits.
    pub fn d_int_to_ext(&self, i: usize, value: f64) -> f64 {
        let ext = self.ext_of_int[i];
        if self.parameters[ext].has_limits() {
            self.transforms[ext].derivative(value)
        } else {
            1.0
        }
    }

    /// Map an internal vector onto the full external vector.
    ///
    /// Fixed parameters take their stored value. `internal` must hold
    /// [`n_internal`](Self::n_internal) entries.
    pub fn apply(&self, internal: &Array1<f64>) -> Array1<f64> {
        let mut external: Array1<f64> = self.parameters.iter().map(|p| p.value()).collect();
        for (i, &ext) in self.ext_of_int.iter().enumerate() {
            external[ext] = self.transforms[ext].to_external(internal[i]);
        }
        external
    }

    /// Internal vector corresponding to the stored parameter values.
    pub fn initial_internal(&self) -> Result<Array1<f64>> {
        self.ext_of_int
            .iter()
            .map(|&ext| self.ext_to_int(ext, self.parameters[ext].value()))
            .collect()
    }
}
