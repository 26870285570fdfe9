//! Error types for the spillgrid engine.

use thiserror::Error;

/// Errors raised while resolving references, ranges and formulas.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid cell reference: {0}")]
    InvalidReference(String),

    #[error(
        "Invalid range specification: start_cell must be before end_cell ({start}:{end})"
    )]
    InvalidRange { start: String, end: String },

    #[error("Formula must start with '=': {0:?}")]
    EmptyFormula(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
