//! # zkfloat core
//!
//! Shared types for proving IEEE-754 arithmetic in R1CS.
//!
//! ## Key Features
//! - Mersenne 127 prime field (p = 2^127 - 1)
//! - Float formats: binary16, bfloat16, binary32, or any validated
//!   `(exponent_bits, mantissa_bits)` pair
//! - Circuit float encoding with renormalized subnormals and a single
//!   abnormal flag for Inf/NaN

pub mod config;
pub mod error;
pub mod field;
pub mod float;

pub use config::{bit_length, FloatFormat, FormatError};
pub use error::{Result, ZkFloatError};
pub use field::{Fp, Mersenne127, FIELD_CAPACITY, MERSENNE127_PRIME};
pub use float::FloatValue;
