//! # zkfloat R1CS
//!
//! Minimal rank-1 constraint system over the Mersenne 127 field: wire
//! allocation, `A * B = C` constraints over linear combinations, witness
//! storage, and satisfiability checks that name the failing constraint.

pub mod constraint_system;
pub mod error;
pub mod lc;

pub use constraint_system::{Constraint, ConstraintSystem};
pub use error::{R1csError, Result};
pub use lc::{LinearCombination, Variable};
pub use zkfloat_core::Fp;
