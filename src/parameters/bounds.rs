//! Parameter bounds implementation
//!
//! This module provides the lower/upper limits a parameter may carry and the
//! Minuit-style transformation that lets the minimizer work in an unconstrained
//! internal coordinate while the external value stays inside its limits.

use crate::precision::MachinePrecision;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;
use std::f64::{INFINITY, NEG_INFINITY};
use thiserror::Error;

/// Errors that can occur when working with parameter bounds
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoundsError {
    #[error("Invalid bounds: min ({min}) must be less than max ({max})")]
    InvalidBounds { min: f64, max: f64 },

    #[error("Parameter value {value} is outside bounds: [{min}, {max}]")]
    ValueOutsideBounds { value: f64, min: f64, max: f64 },

    #[error("Infinite parameter value is not allowed")]
    InfiniteValue,
}

/// Represents the bounds constraints on a parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Minimum allowed value for the parameter
    pub min: f64,

    /// Maximum allowed value for the parameter
    pub max: f64,
}

impl Serialize for Bounds {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Bounds", 2)?;

        // JSON has no infinity, an open side is written as null
        if self.min.is_infinite() && self.min.is_sign_negative() {
            state.serialize_field("min", &serde_json::Value::Null)?;
        } else {
            state.serialize_field("min", &self.min)?;
        }

        if self.max.is_infinite() && self.max.is_sign_positive() {
            state.serialize_field("max", &serde_json::Value::Null)?;
        } else {
            state.serialize_field("max", &self.max)?;
        }

        state.end()
    }
}

impl<'de> Deserialize<'de> for Bounds {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct BoundsHelper {
            #[serde(default)]
            min: Option<f64>,

            #[serde(default)]
            max: Option<f64>,
        }

        let helper = BoundsHelper::deserialize(deserializer)?;

        let min = helper.min.unwrap_or(NEG_INFINITY);
        let max = helper.max.unwrap_or(INFINITY);

        Bounds::new(min, max).map_err(serde::de::Error::custom)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min: NEG_INFINITY,
            max: INFINITY,
        }
    }
}

impl Bounds {
    /// Create a new bounds constraint with min and max values
    ///
    /// # Arguments
    ///
    /// * `min` - Minimum allowed value for the parameter
    /// * `max` - Maximum allowed value for the parameter
    ///
    /// # Returns
    ///
    /// A new `Bounds` object if min < max, or an error otherwise
    ///
    /// # Examples
    ///
    /// ```
    /// use fumiopt_rs::parameters::bounds::Bounds;
    ///
    /// let bounds = Bounds::new(0.0, 10.0).unwrap();
    /// assert_eq!(bounds.min, 0.0);
    /// assert_eq!(bounds.max, 10.0);
    /// ```
    pub fn new(min: f64, max: f64) -> Result<Self, BoundsError> {
        if !(min < max) {
            return Err(BoundsError::InvalidBounds { min, max });
        }

        Ok(Self { min, max })
    }

    /// Create an unbounded constraint (negative infinity to positive infinity)
    ///
    /// # Examples
    ///
    /// ```
    /// use fumiopt_rs::parameters::bounds::Bounds;
    /// use std::f64::{INFINITY, NEG_INFINITY};
    ///
    /// let bounds = Bounds::unbounded();
    /// assert_eq!(bounds.min, NEG_INFINITY);
    /// assert_eq!(bounds.max, INFINITY);
    /// ```
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Create a bounds constraint with only a minimum value
    pub fn min_only(min: f64) -> Self {
        Self { min, max: INFINITY }
    }

    /// Create a bounds constraint with only a maximum value
    pub fn max_only(max: f64) -> Self {
        Self {
            min: NEG_INFINITY,
            max,
        }
    }

    /// Check if a value is within the bounds (limits included)
    pub fn is_within_bounds(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Check if the bounds are finite (both min and max are finite)
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Check if the parameter is bounded from below
    pub fn has_lower_bound(&self) -> bool {
        self.min.is_finite()
    }

    /// Check if the parameter is bounded from above
    pub fn has_upper_bound(&self) -> bool {
        self.max.is_finite()
    }

    /// Check if the parameter is bounded on at least one side
    pub fn has_limits(&self) -> bool {
        self.has_lower_bound() || self.has_upper_bound()
    }

    /// Clamp a value to be within the bounds
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// Implements the Minuit-style parameter transformations for handling bounds constraints
///
/// A parameter with both limits uses the sine transform
/// `ext = min + (max - min) / 2 * (sin(int) + 1)`; a parameter with a single limit
/// uses the square-root transform `ext = min - 1 + sqrt(int^2 + 1)` (or its mirror
/// for an upper limit). Unbounded parameters map onto themselves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundsTransform {
    bounds: Bounds,
}

impl BoundsTransform {
    /// Create a new bounds transform
    pub fn new(bounds: Bounds) -> Self {
        Self { bounds }
    }

    /// The bounds this transform maps into
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Transform an internal parameter value to an external value
    ///
    /// # Arguments
    ///
    /// * `internal_value` - The internal parameter value
    ///
    /// # Returns
    ///
    /// The corresponding external value, constrained to be within bounds
    pub fn to_external(&self, internal_value: f64) -> f64 {
        let bounds = &self.bounds;
        match (bounds.has_lower_bound(), bounds.has_upper_bound()) {
            (false, false) => internal_value,
            (true, false) => bounds.min - 1.0 + (internal_value * internal_value + 1.0).sqrt(),
            (false, true) => bounds.max + 1.0 - (internal_value * internal_value + 1.0).sqrt(),
            (true, true) => {
                let bound_range = bounds.max - bounds.min;
                bounds.min + (internal_value.sin() + 1.0) * bound_range / 2.0
            }
        }
    }

    /// Transform an external parameter value to an internal value
    ///
    /// Uses the principal branch of the inverse: `asin` for two limits (so the
    /// result lies in `[-pi/2, pi/2]`), the non-negative root for a lower limit
    /// and the non-positive root for an upper limit. On these branches the
    /// derivative of the forward transform is positive away from the limits.
    /// A value within a relative `eps2` of both-sided limits is pulled slightly
    /// inside, so the internal value never lands exactly on the turning point of
    /// the sine where the derivative vanishes.
    ///
    /// # Arguments
    ///
    /// * `external_value` - The external parameter value
    /// * `precision` - Machine precision used to detect values sitting on a limit
    ///
    /// # Returns
    ///
    /// The corresponding internal value, or an error if the external value is outside bounds
    pub fn to_internal(
        &self,
        external_value: f64,
        precision: &MachinePrecision,
    ) -> Result<f64, BoundsError> {
        if !external_value.is_finite() {
            return Err(BoundsError::InfiniteValue);
        }

        let bounds = &self.bounds;
        if !bounds.is_within_bounds(external_value) {
            return Err(BoundsError::ValueOutsideBounds {
                value: external_value,
                min: bounds.min,
                max: bounds.max,
            });
        }

        let internal = match (bounds.has_lower_bound(), bounds.has_upper_bound()) {
            (false, false) => external_value,
            (true, false) => {
                let yy = external_value - bounds.min + 1.0;
                (yy * yy - 1.0).max(0.0).sqrt()
            }
            (false, true) => {
                let yy = bounds.max - external_value + 1.0;
                -(yy * yy - 1.0).max(0.0).sqrt()
            }
            (true, true) => {
                let distnn = 8.0 * precision.eps2().sqrt();
                let yy = 2.0 * (external_value - bounds.min) / (bounds.max - bounds.min) - 1.0;
                if yy * yy > 1.0 - precision.eps2() {
                    if yy < 0.0 {
                        -FRAC_PI_2 + distnn
                    } else {
                        FRAC_PI_2 - distnn
                    }
                } else {
                    yy.asin()
                }
            }
        };

        Ok(internal)
    }

    /// Derivative of the internal-to-external map at an internal value
    ///
    /// This is the factor that carries a derivative with respect to the external
    /// value over to the internal coordinate: `df/dint = df/dext * derivative(int)`.
    /// It is 1 for unbounded parameters.
    ///
    /// # Examples
    ///
    /// ```
    /// use fumiopt_rs::parameters::bounds::{Bounds, BoundsTransform};
    ///
    /// let transform = BoundsTransform::new(Bounds::new(0.0, 10.0).unwrap());
    /// // The midpoint of the limits is the steepest point of the sine transform
    /// assert_eq!(transform.derivative(0.0), 5.0);
    /// ```
    pub fn derivative(&self, internal_value: f64) -> f64 {
        let bounds = &self.bounds;
        match (bounds.has_lower_bound(), bounds.has_upper_bound()) {
            (false, false) => 1.0,
            (true, false) => internal_value / (internal_value * internal_value + 1.0).sqrt(),
            (false, true) => -internal_value / (internal_value * internal_value + 1.0).sqrt(),
            (true, true) => 0.5 * (bounds.max - bounds.min) * internal_value.cos(),
        }
    }
}
