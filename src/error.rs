// src/error.rs
use crate::args::Precision;
use std::fmt;

/// Ways a random generator can break its `(count, width) -> count x width` contract.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratorViolation {
    /// The generator itself reported a failure
    Failed { reason: String },

    /// Nothing was returned for a non-empty request
    MissingOutput { expected: (usize, usize) },

    /// The returned array has the wrong dimensions
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// A returned entry is NaN or infinite
    NonFinite { row: usize, col: usize, value: f64 },
}

impl fmt::Display for GeneratorViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratorViolation::Failed { reason } => {
                write!(f, "generator failed: {}", reason)
            }
            GeneratorViolation::MissingOutput { expected } => {
                write!(
                    f,
                    "generator returned no values, expected a {}x{} array",
                    expected.0, expected.1
                )
            }
            GeneratorViolation::ShapeMismatch { expected, found } => {
                write!(
                    f,
                    "generator returned a {}x{} array, expected {}x{}",
                    found.0, found.1, expected.0, expected.1
                )
            }
            GeneratorViolation::NonFinite { row, col, value } => {
                write!(
                    f,
                    "generator returned non-finite value {} at ({}, {})",
                    value, row, col
                )
            }
        }
    }
}

/// Custom error types for the exact-sde library
#[derive(Debug, Clone)]
pub enum SdeError {
    /// Empty or non-finite coefficient
    InvalidParameter { parameter: String, reason: String },

    /// Coefficient length is neither 1 nor the state dimension
    DimensionMismatch {
        parameter: String,
        found: usize,
        expected: usize,
    },

    /// Diffusion coefficient below zero
    NegativeDiffusion {
        parameter: String,
        index: usize,
        value: f64,
    },

    /// Inputs mix single and double precision. Reported as a warning only.
    PrecisionInconsistency {
        promoted: Precision,
        inputs: Vec<(String, Precision)>,
    },

    /// A custom random generator broke its output contract
    RandGeneratorContractViolation(GeneratorViolation),

    /// An output was requested that the configured mode cannot produce
    TooManyOutputsRequested { requested: String, reason: String },

    /// Time grid too short, non-finite or not strictly monotone
    InvalidTimeGrid { reason: String },

    /// Empty or non-finite initial condition
    InvalidInitialCondition { reason: String },

    /// Event function returned inconsistent or non-finite values
    EventFunctionContract { reason: String },

    /// Invalid configuration
    InvalidConfiguration { field: String, reason: String },
}

impl fmt::Display for SdeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SdeError::InvalidParameter { parameter, reason } => {
                write!(f, "Invalid parameter '{}': {}", parameter, reason)
            }
            SdeError::DimensionMismatch {
                parameter,
                found,
                expected,
            } => {
                write!(
                    f,
                    "Parameter '{}' has length {}; expected 1 or {}",
                    parameter, found, expected
                )
            }
            SdeError::NegativeDiffusion {
                parameter,
                index,
                value,
            } => {
                write!(
                    f,
                    "Diffusion '{}' must be non-negative, found {} at index {}",
                    parameter, value, index
                )
            }
            SdeError::PrecisionInconsistency { promoted, inputs } => {
                let listed = inputs
                    .iter()
                    .map(|(name, p)| format!("{}={}", name, p))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(
                    f,
                    "Inputs mix floating-point precisions ({}); computing in {} precision",
                    listed, promoted
                )
            }
            SdeError::RandGeneratorContractViolation(violation) => {
                write!(f, "Random generator contract violated: {}", violation)
            }
            SdeError::TooManyOutputsRequested { requested, reason } => {
                write!(f, "Too many outputs requested ({}): {}", requested, reason)
            }
            SdeError::InvalidTimeGrid { reason } => {
                write!(f, "Invalid time grid: {}", reason)
            }
            SdeError::InvalidInitialCondition { reason } => {
                write!(f, "Invalid initial condition: {}", reason)
            }
            SdeError::EventFunctionContract { reason } => {
                write!(f, "Event function contract violated: {}", reason)
            }
            SdeError::InvalidConfiguration { field, reason } => {
                write!(f, "Invalid configuration for '{}': {}", field, reason)
            }
        }
    }
}

impl std::error::Error for SdeError {}

impl From<GeneratorViolation> for SdeError {
    fn from(violation: GeneratorViolation) -> Self {
        SdeError::RandGeneratorContractViolation(violation)
    }
}

/// Result type alias for exact-sde operations
pub type SdeResult<T> = Result<T, SdeError>;

/// Validation utilities
pub mod validation {
    use super::{SdeError, SdeResult};

    /// Validate that every value is finite and the slice is not empty
    pub fn validate_finite(name: &str, values: &[f64]) -> SdeResult<()> {
        if values.is_empty() {
            return Err(SdeError::InvalidParameter {
                parameter: name.to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(SdeError::InvalidParameter {
                parameter: name.to_string(),
                reason: format!("must be finite (not NaN or infinite), found {}", bad),
            });
        }
        Ok(())
    }

    /// Validate a diffusion coefficient: elementwise >= 0
    pub fn validate_non_negative(name: &str, values: &[f64]) -> SdeResult<()> {
        match values.iter().position(|&v| v < 0.0) {
            Some(index) => Err(SdeError::NegativeDiffusion {
                parameter: name.to_string(),
                index,
                value: values[index],
            }),
            None => Ok(()),
        }
    }

    /// Validate that a coefficient can be broadcast over `n` dimensions
    pub fn validate_broadcast_len(name: &str, len: usize, n: usize) -> SdeResult<()> {
        if len == 1 || len == n {
            Ok(())
        } else {
            Err(SdeError::DimensionMismatch {
                parameter: name.to_string(),
                found: len,
                expected: n,
            })
        }
    }
}
