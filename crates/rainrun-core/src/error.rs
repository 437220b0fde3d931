//! Error types for model construction, stepping and calibration.

use thiserror::Error;

/// Invalid or physically inconsistent parameters at model creation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConstructionError {
    #[error("{model}: expected {min}..={max} parameters, got {got}")]
    ParameterCount {
        model: &'static str,
        min: usize,
        max: usize,
        got: usize,
    },

    #[error("{name} = {value} is out of range [{min}, {max}]")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("inconsistent parameters: {what}")]
    Inconsistent { what: &'static str },
}

/// An internal invariant failed during `update`; the parameter set lies outside
/// the model's operating envelope.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("numerical inconsistency in {model}: {what}")]
pub struct NumericalInconsistency {
    pub model: &'static str,
    pub what: &'static str,
}

impl NumericalInconsistency {
    pub fn new(model: &'static str, what: &'static str) -> Self {
        Self { model, what }
    }
}

/// Malformed forcing series.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForcingError {
    #[error("forcing series is empty")]
    Empty,

    #[error("{series} length {got} does not match forcing length {expected}")]
    LengthMismatch {
        series: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("{series} contains a non-finite value at index {index}")]
    NonFinite { series: &'static str, index: usize },

    #[error("warmup of {warmup} steps leaves nothing to score in {len} steps")]
    WarmupTooLong { warmup: usize, len: usize },
}

/// A model name that matches no base model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown model '{0}'")]
pub struct UnknownModel(pub String);

/// Everything that can reject a parameter set at the calibration boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error(transparent)]
    Numerical(#[from] NumericalInconsistency),

    #[error(transparent)]
    Forcing(#[from] ForcingError),

    #[error("objective is not finite: {value}")]
    NonFiniteObjective { value: f64 },
}

pub type ModelResult<T> = Result<T, ModelError>;
