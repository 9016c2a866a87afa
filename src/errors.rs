//! Centralized error handling for windtile
//!
//! This module provides structured error types used throughout the crate,
//! enabling better error context and type safety than a generic `Box<dyn Error>`.

use std::fmt;

/// Main error type for windtile operations
#[derive(Debug)]
pub enum WindTileError {
    /// NetCDF dataset operation errors
    NetCDFError(netcdf::Error),

    /// I/O operation errors
    IoError(std::io::Error),

    /// A physical coordinate or parameter outside its valid domain
    Domain { message: String },

    /// No candidate dataset covers the requested instant
    DatasetNotFound { target: String, tried: usize },

    /// No time axis value falls inside the requested range
    EmptyWindow { min: String, max: String },

    /// A fetched slice covers fewer than one time step
    InsufficientData { variable: String, message: String },

    /// The three fetched variables disagree on shape
    ShapeMismatch {
        variable: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// Variable not found in the dataset
    VariableNotFound { var: String },

    /// Invalid slice specification against the dataset axes
    InvalidSlice { message: String },

    /// Malformed text input (tile headers, wgrib2 records)
    Parse { message: String },

    /// Array shape or dimension error
    ArrayError(ndarray::ShapeError),

    /// Generic error for anything without a dedicated variant
    Generic(String),
}

impl fmt::Display for WindTileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindTileError::NetCDFError(e) => write!(f, "NetCDF error: {}", e),
            WindTileError::IoError(e) => write!(f, "I/O error: {}", e),
            WindTileError::Domain { message } => write!(f, "Domain error: {}", message),
            WindTileError::DatasetNotFound { target, tried } => write!(
                f,
                "No dataset covering {} found after trying {} candidates",
                target, tried
            ),
            WindTileError::EmptyWindow { min, max } => {
                write!(f, "No time axis values inside window {} -> {}", min, max)
            }
            WindTileError::InsufficientData { variable, message } => {
                write!(
                    f,
                    "Insufficient data for variable '{}': {}",
                    variable, message
                )
            }
            WindTileError::ShapeMismatch {
                variable,
                expected,
                actual,
            } => write!(
                f,
                "Variable '{}' has shape {:?}, expected {:?}",
                variable, actual, expected
            ),
            WindTileError::VariableNotFound { var } => {
                write!(f, "Variable '{}' not found in dataset", var)
            }
            WindTileError::InvalidSlice { message } => {
                write!(f, "Invalid slice specification: {}", message)
            }
            WindTileError::Parse { message } => write!(f, "Parse error: {}", message),
            WindTileError::ArrayError(e) => write!(f, "Array error: {}", e),
            WindTileError::Generic(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for WindTileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WindTileError::NetCDFError(e) => Some(e),
            WindTileError::IoError(e) => Some(e),
            WindTileError::ArrayError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<netcdf::Error> for WindTileError {
    fn from(error: netcdf::Error) -> Self {
        WindTileError::NetCDFError(error)
    }
}

impl From<std::io::Error> for WindTileError {
    fn from(error: std::io::Error) -> Self {
        WindTileError::IoError(error)
    }
}

impl From<ndarray::ShapeError> for WindTileError {
    fn from(error: ndarray::ShapeError) -> Self {
        WindTileError::ArrayError(error)
    }
}

impl From<String> for WindTileError {
    fn from(error: String) -> Self {
        WindTileError::Generic(error)
    }
}

impl From<&str> for WindTileError {
    fn from(error: &str) -> Self {
        WindTileError::Generic(error.to_string())
    }
}

/// Result type alias for windtile operations
pub type Result<T> = std::result::Result<T, WindTileError>;
