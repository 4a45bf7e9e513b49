use thiserror::Error;

/// Error types for the fumiopt-rs library.
#[derive(Error, Debug)]
pub enum FumiOptError {
    /// Error indicating a mismatch in vector or matrix dimensions.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Error for invalid parameter values.
    #[error("Invalid parameter value: {0}")]
    InvalidParameter(String),

    /// Error for parameter-related problems.
    #[error("Parameter error: {0}")]
    ParameterError(String),

    /// Error for boundary constraint violations.
    #[error("Bounds error: {0}")]
    BoundsError(String),

    /// Error during objective function evaluation.
    #[error("Function evaluation error: {0}")]
    FunctionEvaluation(String),

    /// Not implemented functionality.
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// Invalid input data.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O error wrapper.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Generic error for cases that don't fit the other categories.
    #[error("Error: {0}")]
    Other(String),
}

impl From<crate::parameters::parameter::ParameterError> for FumiOptError {
    fn from(err: crate::parameters::parameter::ParameterError) -> Self {
        FumiOptError::ParameterError(format!("{}", err))
    }
}

impl From<crate::parameters::bounds::BoundsError> for FumiOptError {
    fn from(err: crate::parameters::bounds::BoundsError) -> Self {
        FumiOptError::BoundsError(format!("{}", err))
    }
}

impl From<crate::parameters::parameters::SerializationError> for FumiOptError {
    fn from(err: crate::parameters::parameters::SerializationError) -> Self {
        use crate::parameters::parameters::SerializationError;
        match err {
            SerializationError::IoError(e) => FumiOptError::IoError(e),
            SerializationError::JsonError(e) => FumiOptError::JsonError(e),
            SerializationError::Invalid(e) => FumiOptError::ParameterError(format!("{}", e)),
        }
    }
}

/// Result type alias for fumiopt-rs operations.
pub type Result<T> = std::result::Result<T, FumiOptError>;

/// Extensions for converting from other error types.
impl From<String> for FumiOptError {
    fn from(s: String) -> Self {
        FumiOptError::Other(s)
    }
}

impl From<&str> for FumiOptError {
    fn from(s: &str) -> Self {
        FumiOptError::Other(s.to_string())
    }
}
