//! The two-phase gadget contract
//!
//! A gadget's constructor is its constraint phase: it allocates wires and
//! registers constraints on a [`ConstraintSystem`]. [`Gadget::generate_witness`]
//! is its witness phase: once the gadget's inputs carry values, it assigns
//! every wire the constructor allocated. Composite gadgets run their
//! children's witness phases in construction order.

use crate::error::{GadgetError, Result};
use zkfloat_core::FIELD_CAPACITY;
use zkfloat_r1cs::{ConstraintSystem, LinearCombination, Variable};

pub trait Gadget {
    fn generate_witness(&self, cs: &mut ConstraintSystem) -> Result<()>;
}

/// Reject decomposition widths that would let values wrap the field
pub(crate) fn check_width(width: u32) -> Result<()> {
    if width > FIELD_CAPACITY {
        return Err(GadgetError::WidthExceedsField {
            width,
            capacity: FIELD_CAPACITY,
        });
    }
    Ok(())
}

/// `b * (1 - b) = 0`
pub(crate) fn enforce_boolean(cs: &mut ConstraintSystem, var: Variable, annotation: &str) {
    cs.enforce(var, LinearCombination::one() - var, LinearCombination::zero(), annotation);
}

/// Canonical value of `lc`, required to be below `bound`
pub(crate) fn bounded_value(
    cs: &ConstraintSystem,
    lc: &LinearCombination,
    gadget: &'static str,
    bound: u128,
) -> Result<u128> {
    let value = cs.eval(lc)?.value();
    if value >= bound {
        return Err(GadgetError::ValueOutOfRange {
            gadget,
            value,
            bound,
        });
    }
    Ok(value)
}
