//! # zkfloat gadgets
//!
//! R1CS gadgets for IEEE-754 addition and multiplication with round to
//! nearest, ties to even.
//!
//! ## Layers
//!
//! - **Primitives**: zero tests, boolean logic, bit decomposition, range
//!   comparison, selection, shifts and one-hot encodings
//! - **Float**: [`FloatAddGadget`], [`FloatMulGadget`] and the
//!   [`FloatCircuit`] driver
//!
//! Every gadget follows the two-phase [`Gadget`] contract: constructing it
//! registers constraints, and [`Gadget::generate_witness`] fills in its wires.
//!
//! ## Example
//!
//! ```rust,no_run
//! use zkfloat_core::FloatFormat;
//! use zkfloat_gadgets::{FloatCircuit, FloatOp};
//!
//! let mut circuit = FloatCircuit::new(FloatFormat::BINARY32, FloatOp::Add).unwrap();
//! assert_eq!(circuit.evaluate_f32(1.5, 2.25).unwrap(), 3.75);
//! println!("Constraints: {}", circuit.num_constraints());
//! ```

pub mod boolean;
pub mod compare;
pub mod error;
pub mod float;
pub mod gadget;
pub mod min;
pub mod onehot;
pub mod pack;
pub mod product;
pub mod select;
pub mod shift;
pub mod zero;

pub use boolean::{AndGadget, OrGadget, XnorGadget};
pub use compare::{CompareGadget, RangeGadget};
pub use error::{GadgetError, Result};
pub use float::{
    normalization_offset, FloatAddGadget, FloatCircuit, FloatMulGadget, FloatOp, FloatVar,
    WellFormedGadget,
};
pub use gadget::Gadget;
pub use min::MinGadget;
pub use onehot::OneHotGadget;
pub use pack::PackGadget;
pub use product::{GrandProductGadget, ProductGadget};
pub use select::{SelectGadget, TernarySelectGadget};
pub use shift::{PowerOfTwoGadget, ShiftGadget};
pub use zero::ZeroTestGadget;
