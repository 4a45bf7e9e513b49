//! Parameter definition and implementation
//!
//! This module provides the Parameter struct, the user-facing ("external")
//! description of one argument of the objective function: its value, the initial
//! step used by numerical derivatives, optional limits, and whether it is varied
//! or held fixed.

use crate::parameters::bounds::{Bounds, BoundsError, BoundsTransform};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when working with parameters
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    #[error("Bounds error: {0}")]
    BoundsError(#[from] BoundsError),

    #[error("Parameter '{name}' not found")]
    ParameterNotFound { name: String },

    #[error("Parameter '{name}' already exists")]
    DuplicateParameter { name: String },

    #[error("Parameter '{name}' has a non-positive step error {error}")]
    InvalidError { name: String, error: f64 },
}

/// A parameter of the objective function
///
/// Parameters can be varied during minimization or fixed, and may carry lower
/// and/or upper limits. The `error` is the user's estimate of the parameter
/// uncertainty; it seeds the step sizes of numerical derivatives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    /// Name of the parameter
    pub name: String,

    /// Current value of the parameter
    value: f64,

    /// Initial value when created (for reset operations)
    init_value: f64,

    /// Initial step / uncertainty estimate
    error: f64,

    /// Whether this parameter can be varied during minimization
    pub vary: bool,

    /// Minimum and maximum bounds for the parameter value
    bounds: Bounds,
}

/// Step error used when the caller gives none.
fn default_error(value: f64) -> f64 {
    if value == 0.0 {
        0.1
    } else {
        0.1 * value.abs()
    }
}

impl Parameter {
    /// Create a new parameter with the given name and value
    ///
    /// The parameter is varied, unbounded, and gets a step error of 10% of its
    /// value (0.1 for a zero value).
    ///
    /// # Examples
    ///
    /// ```
    /// use fumiopt_rs::parameters::parameter::Parameter;
    ///
    /// let param = Parameter::new("amplitude", 10.0);
    /// assert_eq!(param.name(), "amplitude");
    /// assert_eq!(param.value(), 10.0);
    /// assert_eq!(param.error(), 1.0);
    /// assert!(param.vary());
    /// ```
    pub fn new(name: &str, value: f64) -> Self {
        Self {
            name: name.to_string(),
            value,
            init_value: value,
            error: default_error(value),
            vary: true,
            bounds: Bounds::default(),
        }
    }

    /// Create a new parameter with the given name, value, and bounds
    ///
    /// # Arguments
    ///
    /// * `name` - Name of the parameter
    /// * `value` - Initial value of the parameter
    /// * `min` - Minimum allowed value for the parameter
    /// * `max` - Maximum allowed value for the parameter
    ///
    /// # Returns
    ///
    /// A new parameter, or an error if `min >= max`. A value outside the limits
    /// is clamped onto the nearest limit.
    ///
    /// # Examples
    ///
    /// ```
    /// use fumiopt_rs::parameters::parameter::Parameter;
    ///
    /// let param = Parameter::with_bounds("amplitude", 10.0, 0.0, 20.0).unwrap();
    /// assert_eq!(param.min(), 0.0);
    /// assert_eq!(param.max(), 20.0);
    /// assert!(param.has_limits());
    /// ```
    pub fn with_bounds(name: &str, value: f64, min: f64, max: f64) -> Result<Self, ParameterError> {
        let bounds = Bounds::new(min, max)?;
        Ok(Self::with_bounds_struct(name, value, bounds))
    }

    /// Create a new parameter bounded from below only
    pub fn with_lower(name: &str, value: f64, min: f64) -> Self {
        Self::with_bounds_struct(name, value, Bounds::min_only(min))
    }

    /// Create a new parameter bounded from above only
    pub fn with_upper(name: &str, value: f64, max: f64) -> Self {
        Self::with_bounds_struct(name, value, Bounds::max_only(max))
    }

    fn with_bounds_struct(name: &str, value: f64, bounds: Bounds) -> Self {
        let value = bounds.clamp(value);
        Self {
            name: name.to_string(),
            value,
            init_value: value,
            error: default_error(value),
            vary: true,
            bounds,
        }
    }

    /// Create a fixed parameter, excluded from the internal parameter vector
    pub fn fixed(name: &str, value: f64) -> Self {
        let mut param = Self::new(name, value);
        param.vary = false;
        param
    }

    /// Set the step error, builder style
    pub fn with_error(mut self, error: f64) -> Result<Self, ParameterError> {
        self.set_error(error)?;
        Ok(self)
    }

    /// Get the current value of the parameter
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Set the value of the parameter
    ///
    /// # Returns
    ///
    /// `Ok(())` if the value was set successfully, or an error if the value is outside bounds
    pub fn set_value(&mut self, value: f64) -> Result<(), ParameterError> {
        if !self.bounds.is_within_bounds(value) {
            return Err(ParameterError::BoundsError(BoundsError::ValueOutsideBounds {
                value,
                min: self.bounds.min,
                max: self.bounds.max,
            }));
        }

        self.value = value;
        Ok(())
    }

    /// Get the initial value of the parameter
    pub fn init_value(&self) -> f64 {
        self.init_value
    }

    /// Reset the parameter to its initial value
    pub fn reset(&mut self) {
        self.value = self.bounds.clamp(self.init_value);
    }

    /// Get the name of the parameter
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the step error of the parameter
    pub fn error(&self) -> f64 {
        self.error
    }

    /// Set the step error of the parameter
    ///
    /// # Returns
    ///
    /// An error if `error` is not a positive finite number
    pub fn set_error(&mut self, error: f64) -> Result<(), ParameterError> {
        if !(error > 0.0 && error.is_finite()) {
            return Err(ParameterError::InvalidError {
                name: self.name.clone(),
                error,
            });
        }
        self.error = error;
        Ok(())
    }

    /// Check if the parameter is varied during minimization
    pub fn vary(&self) -> bool {
        self.vary
    }

    /// Set whether the parameter is varied during minimization
    pub fn set_vary(&mut self, vary: bool) {
        self.vary = vary;
    }

    /// Check if the parameter is held fixed
    pub fn is_fixed(&self) -> bool {
        !self.vary
    }

    /// Get the minimum allowed value for the parameter
    pub fn min(&self) -> f64 {
        self.bounds.min
    }

    /// Get the maximum allowed value for the parameter
    pub fn max(&self) -> f64 {
        self.bounds.max
    }

    /// Set the bounds for the parameter
    ///
    /// The current value is clamped into the new limits.
    pub fn set_bounds(&mut self, min: f64, max: f64) -> Result<(), ParameterError> {
        let bounds = Bounds::new(min, max)?;
        self.bounds = bounds;
        self.value = bounds.clamp(self.value);
        Ok(())
    }

    /// Remove all limits from the parameter
    pub fn remove_bounds(&mut self) {
        self.bounds = Bounds::unbounded();
    }

    /// Get the bounds of the parameter
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Whether the parameter is bounded on at least one side
    pub fn has_limits(&self) -> bool {
        self.bounds.has_limits()
    }

    /// Whether the parameter has a lower limit
    pub fn has_lower_limit(&self) -> bool {
        self.bounds.has_lower_bound()
    }

    /// Whether the parameter has an upper limit
    pub fn has_upper_limit(&self) -> bool {
        self.bounds.has_upper_bound()
    }

    /// Create a bounds transform for this parameter
    pub fn bounds_transform(&self) -> BoundsTransform {
        BoundsTransform::new(self.bounds)
    }
}
