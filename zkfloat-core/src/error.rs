//! # Error Types for zkfloat core

use crate::config::FormatError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ZkFloatError {
    #[error("Invalid float format: {0}")]
    InvalidFormat(#[from] FormatError),

    #[error("Bit pattern {bits:#x} does not fit in {width} bits")]
    BitPatternTooWide { bits: u64, width: u32 },

    #[error("Malformed float encoding (sign {sign}, exponent {exponent}, mantissa {mantissa:#x}): {reason}")]
    MalformedEncoding {
        sign: bool,
        exponent: u64,
        mantissa: u64,
        reason: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, ZkFloatError>;
