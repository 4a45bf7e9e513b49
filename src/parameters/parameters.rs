//! Parameters collection implementation
//!
//! This module provides the Parameters struct, the ordered list of external
//! parameters of an objective function. The position of a parameter in the
//! collection is its external index.

use crate::parameters::parameter::{Parameter, ParameterError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// An ordered collection of named parameters
///
/// Parameters keep their insertion order; that order defines the external
/// parameter vector handed to the objective function.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "ParametersRepr")]
pub struct Parameters {
    /// Parameters in external order
    params: Vec<Parameter>,

    /// Map of parameter names to external indices
    #[serde(skip)]
    index: HashMap<String, usize>,
}

/// Serialized form; the name index is rebuilt from it.
#[derive(Deserialize)]
struct ParametersRepr {
    params: Vec<Parameter>,
}

impl TryFrom<ParametersRepr> for Parameters {
    type Error = ParameterError;

    fn try_from(repr: ParametersRepr) -> Result<Self, Self::Error> {
        let mut params = Parameters {
            params: repr.params,
            index: HashMap::new(),
        };
        params.rebuild_index()?;
        Ok(params)
    }
}

impl Parameters {
    /// Create a new empty parameters collection
    ///
    /// # Examples
    ///
    /// ```
    /// use fumiopt_rs::parameters::parameters::Parameters;
    ///
    /// let params = Parameters::new();
    /// assert_eq!(params.len(), 0);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter to the end of the collection
    ///
    /// # Returns
    ///
    /// The external index of the new parameter, or an error if a parameter with the
    /// same name already exists
    ///
    /// # Examples
    ///
    /// ```
    /// use fumiopt_rs::parameters::{Parameter, Parameters};
    ///
    /// let mut params = Parameters::new();
    /// let index = params.add(Parameter::new("amplitude", 10.0)).unwrap();
    /// assert_eq!(index, 0);
    /// assert_eq!(params.len(), 1);
    /// ```
    pub fn add(&mut self, param: Parameter) -> Result<usize, ParameterError> {
        if self.index.contains_key(param.name()) {
            return Err(ParameterError::DuplicateParameter {
                name: param.name().to_string(),
            });
        }

        let index = self.params.len();
        self.index.insert(param.name().to_string(), index);
        self.params.push(param);
        Ok(index)
    }

    /// Add a new unbounded parameter with the given name and value
    pub fn add_param(&mut self, name: &str, value: f64) -> Result<usize, ParameterError> {
        self.add(Parameter::new(name, value))
    }

    /// Add a new parameter with the given name, value, and bounds
    ///
    /// Either limit may be infinite to leave that side open.
    ///
    /// # Examples
    ///
    /// ```
    /// use fumiopt_rs::parameters::Parameters;
    ///
    /// let mut params = Parameters::new();
    /// params.add_param_with_bounds("amplitude", 10.0, 0.0, 20.0).unwrap();
    /// params.add_param_with_bounds("decay", 0.5, 0.0, f64::INFINITY).unwrap();
    /// assert!(params.get("decay").unwrap().has_lower_limit());
    /// assert!(!params.get("decay").unwrap().has_upper_limit());
    /// ```
    pub fn add_param_with_bounds(
        &mut self,
        name: &str,
        value: f64,
        min: f64,
        max: f64,
    ) -> Result<usize, ParameterError> {
        let param = match (min.is_finite(), max.is_finite()) {
            (true, false) => Parameter::with_lower(name, value, min),
            (false, true) => Parameter::with_upper(name, value, max),
            (false, false) => Parameter::new(name, value),
            (true, true) => Parameter::with_bounds(name, value, min, max)?,
        };
        self.add(param)
    }

    /// Add a fixed parameter
    pub fn add_fixed(&mut self, name: &str, value: f64) -> Result<usize, ParameterError> {
        self.add(Parameter::fixed(name, value))
    }

    /// Get a parameter by name
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.index.get(name).map(|&i| &self.params[i])
    }

    /// Get a mutable reference to a parameter by name
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        match self.index.get(name) {
            Some(&i) => self.params.get_mut(i),
            None => None,
        }
    }

    /// Get a parameter by external index
    pub fn at(&self, index: usize) -> Option<&Parameter> {
        self.params.get(index)
    }

    /// External index of a named parameter
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Check if a parameter exists in the collection
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Fix a parameter by name
    pub fn fix(&mut self, name: &str) -> Result<(), ParameterError> {
        self.param_mut_or_err(name)?.set_vary(false);
        Ok(())
    }

    /// Release a fixed parameter by name
    pub fn release(&mut self, name: &str) -> Result<(), ParameterError> {
        self.param_mut_or_err(name)?.set_vary(true);
        Ok(())
    }

    fn param_mut_or_err(&mut self, name: &str) -> Result<&mut Parameter, ParameterError> {
        self.get_mut(name)
            .ok_or_else(|| ParameterError::ParameterNotFound {
                name: name.to_string(),
            })
    }

    /// Get the number of parameters in the collection
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Check if the collection is empty
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Parameter names in external order
    pub fn names(&self) -> Vec<String> {
        self.params.iter().map(|p| p.name().to_string()).collect()
    }

    /// Iterate over parameters in external order
    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter()
    }

    /// Parameter values in external order
    pub fn values(&self) -> Vec<f64> {
        self.params.iter().map(|p| p.value()).collect()
    }

    /// Get a vector of the varying parameters, in external order
    ///
    /// # Examples
    ///
    /// ```
    /// use fumiopt_rs::parameters::Parameters;
    ///
    /// let mut params = Parameters::new();
    /// params.add_param("amplitude", 10.0).unwrap();
    /// params.add_fixed("center", 5.0).unwrap();
    ///
    /// let varying = params.varying();
    /// assert_eq!(varying.len(), 1);
    /// assert_eq!(varying[0].name(), "amplitude");
    /// ```
    pub fn varying(&self) -> Vec<&Parameter> {
        self.params.iter().filter(|p| p.vary()).collect()
    }

    /// Get a vector of the fixed parameters, in external order
    pub fn fixed(&self) -> Vec<&Parameter> {
        self.params.iter().filter(|p| !p.vary()).collect()
    }

    /// Reset all parameters to their initial values
    pub fn reset(&mut self) {
        for param in &mut self.params {
            param.reset();
        }
    }

    fn rebuild_index(&mut self) -> Result<(), ParameterError> {
        self.index.clear();
        for (i, param) in self.params.iter().enumerate() {
            if self.index.insert(param.name().to_string(), i).is_some() {
                return Err(ParameterError::DuplicateParameter {
                    name: param.name().to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Error type for serialization and deserialization operations
#[derive(Error, Debug)]
pub enum SerializationError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid parameter set: {0}")]
    Invalid(#[from] ParameterError),
}

impl Parameters {
    /// Save parameters to a JSON file
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), SerializationError> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Save parameters to a JSON string
    pub fn to_json(&self) -> Result<String, SerializationError> {
        let json = serde_json::to_string_pretty(self)?;
        Ok(json)
    }

    /// Load parameters from a JSON file
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, SerializationError> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Self::from_json(&contents)
    }

    /// Load parameters from a JSON string
    ///
    /// # Examples
    ///
    /// ```
    /// use fumiopt_rs::parameters::Parameters;
    ///
    /// let json = r#"{
    ///   "params": [
    ///     {
    ///       "name": "amplitude",
    ///       "value": 10.0,
    ///       "init_value": 10.0,
    ///       "error": 1.0,
    ///       "vary": true,
    ///       "bounds": { "min": 0.0, "max": 20.0 }
    ///     }
    ///   ]
    /// }"#;
    ///
    /// let params = Parameters::from_json(json).unwrap();
    /// assert_eq!(params.len(), 1);
    /// assert_eq!(params.get("amplitude").unwrap().value(), 10.0);
    /// ```
    pub fn from_json(json: &str) -> Result<Self, SerializationError> {
        let repr: ParametersRepr = serde_json::from_str(json)?;
        Ok(Parameters::try_from(repr)?)
    }
}
