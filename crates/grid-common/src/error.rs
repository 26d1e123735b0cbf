//! Error types for UTFGrid rendering.

use thiserror::Error;

use crate::extent::ExtentParseError;
use crate::field::ScalarKind;

/// Result type alias using GridError.
pub type GridResult<T> = Result<T, GridError>;

/// Broad classification of a [`GridError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad request or job setup, detected before rasterization starts.
    Configuration,
    /// Source data or grid content that cannot be interpreted.
    Data,
    /// Failure reading or writing external resources.
    Io,
}

/// Primary error type for grid rendering, encoding and lookup.
#[derive(Debug, Error)]
pub enum GridError {
    // === Configuration Errors ===
    #[error("No valid fields, field_names was {requested:?}")]
    NoValidFields { requested: Vec<String> },

    #[error("Id field '{0}' is not among the selected fields")]
    IdFieldNotSelected(String),

    #[error("Invalid configuration value for '{param}': {message}")]
    InvalidConfig { param: String, message: String },

    #[error(transparent)]
    InvalidExtent(#[from] ExtentParseError),

    // === Data Errors ===
    #[error("Feature {feature} has no value for field '{field}'")]
    MissingAttribute { feature: usize, field: String },

    #[error("Field '{field}' value '{value}' cannot be read as {expected}")]
    InvalidAttribute {
        field: String,
        expected: ScalarKind,
        value: String,
    },

    #[error("Feature id '{0}' is not an integer")]
    InvalidFeatureId(String),

    #[error("Unsupported geometry: {0}")]
    UnsupportedGeometry(String),

    #[error("Grid has too many distinct keys to encode ({0})")]
    KeySpaceExhausted(usize),

    #[error("Grid lookup failed: {0}")]
    InvalidLookup(String),

    // === IO Errors ===
    #[error("Source error: {0}")]
    SourceError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GridError {
    /// Get the category for this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            GridError::NoValidFields { .. }
            | GridError::IdFieldNotSelected(_)
            | GridError::InvalidConfig { .. }
            | GridError::InvalidExtent(_) => ErrorCategory::Configuration,

            GridError::MissingAttribute { .. }
            | GridError::InvalidAttribute { .. }
            | GridError::InvalidFeatureId(_)
            | GridError::UnsupportedGeometry(_)
            | GridError::KeySpaceExhausted(_)
            | GridError::InvalidLookup(_) => ErrorCategory::Data,

            GridError::SourceError(_) | GridError::Io(_) | GridError::Json(_) => ErrorCategory::Io,
        }
    }

    /// Process exit code for command line tools.
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Configuration => 2,
            ErrorCategory::Data => 3,
            ErrorCategory::Io => 4,
        }
    }
}
