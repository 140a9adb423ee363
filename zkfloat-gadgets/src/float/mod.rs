//! Float arithmetic gadgets
//!
//! Floats travel through circuits as [`FloatVar`]s: sign, exponent and
//! mantissa wires plus an abnormal flag for Inf/NaN. The add and mul
//! pipelines take two well-formed inputs and allocate a fresh, well-formed
//! output rounded to nearest even.

mod add;
mod circuit;
mod magnitude;
mod mul;
mod round;
mod var;

pub use add::{normalization_offset, FloatAddGadget};
pub use circuit::{FloatCircuit, FloatOp};
pub use magnitude::{MagnitudeSelectGadget, SignedMagnitude};
pub use mul::FloatMulGadget;
pub use round::{RenormalizeGadget, RoundGadget};
pub use var::{FloatVar, WellFormedGadget};
