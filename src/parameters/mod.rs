//! # Parameter System
//!
//! This module describes the user-facing ("external") parameters of an objective
//! function. Each parameter has a name, a value, a step error, and optionally
//! lower and/or upper limits; parameters may also be held fixed.
//!
//! ## Core Components
//!
//! - [`Parameter`]: Individual parameters with values, step errors, bounds, and varying flags
//! - [`Parameters`]: An ordered collection; insertion order is the external index
//! - [`Bounds`] and [`BoundsTransform`]: Limits and the Minuit-style transform that removes them
//!
//! ## Example Usage
//!
//! ```rust
//! use fumiopt_rs::parameters::Parameters;
//!
//! let mut params = Parameters::new();
//! params.add_param("linear", 1.0).unwrap();
//! params.add_param_with_bounds("amplitude", 3.0, 0.0, 10.0).unwrap();
//! params.add_param_with_bounds("decay", 0.5, 0.0, f64::INFINITY).unwrap();
//!
//! // Fixed parameters are left out of the internal vector
//! params.fix("linear").unwrap();
//! assert_eq!(params.varying().len(), 2);
//! ```

pub mod bounds;
pub mod parameter;
pub mod parameters;

pub use bounds::{Bounds, BoundsError, BoundsTransform};
pub use parameter::{Parameter, ParameterError};
pub use parameters::{Parameters, SerializationError};
