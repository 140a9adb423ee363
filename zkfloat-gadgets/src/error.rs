//! Gadget error types

use thiserror::Error;
use zkfloat_core::ZkFloatError;
use zkfloat_r1cs::R1csError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GadgetError {
    #[error("Constraint system error: {0}")]
    R1cs(#[from] R1csError),

    #[error("Float error: {0}")]
    Core(#[from] ZkFloatError),

    #[error("Bit width {width} exceeds the field capacity of {capacity} bits")]
    WidthExceedsField { width: u32, capacity: u32 },

    #[error("{gadget}: value {value} is out of range (must be below {bound})")]
    ValueOutOfRange {
        gadget: &'static str,
        value: u128,
        bound: u128,
    },

    #[error("Precondition violated: {0}")]
    PreconditionViolated(String),
}

pub type Result<T> = std::result::Result<T, GadgetError>;
