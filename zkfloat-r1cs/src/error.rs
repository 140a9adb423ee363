//! Constraint system error types

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum R1csError {
    #[error("Variable {index} ({annotation}) has no assigned value")]
    UnassignedVariable { index: usize, annotation: String },

    #[error("Unknown variable {index}")]
    UnknownVariable { index: usize },

    #[error("The constant-one variable cannot be reassigned")]
    ConstantReassigned,

    #[error("Constraint {index} is not satisfied: {annotation}")]
    Unsatisfied { index: usize, annotation: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<bincode::Error> for R1csError {
    fn from(err: bincode::Error) -> Self {
        R1csError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, R1csError>;
