//! Zero test
//!
//! Two constraints decide whether a linear combination vanishes:
//!
//! ```text
//! inverse * x       = nonzero
//! (1 - nonzero) * x = 0
//! ```
//!
//! The second forces `nonzero = 1` whenever `x ≠ 0`; the first forces
//! `nonzero = 0` when `x = 0`.

use crate::error::Result;
use crate::gadget::Gadget;
use zkfloat_core::Fp;
use zkfloat_r1cs::{ConstraintSystem, LinearCombination, Variable};

#[derive(Clone, Debug)]
pub struct ZeroTestGadget {
    x: LinearCombination,
    inverse: Variable,
    nonzero: Variable,
}

impl ZeroTestGadget {
    pub fn new(cs: &mut ConstraintSystem, x: impl Into<LinearCombination>) -> Self {
        let x = x.into();
        let inverse = cs.alloc("inverse");
        let nonzero = cs.alloc("nonzero");
        cs.enforce(inverse, x.clone(), nonzero, "inverse * x = nonzero");
        cs.enforce(
            LinearCombination::one() - nonzero,
            x.clone(),
            LinearCombination::zero(),
            "(1 - nonzero) * x = 0",
        );
        Self {
            x,
            inverse,
            nonzero,
        }
    }

    /// Boolean that is zero iff `x == 0`
    pub fn ret(&self) -> LinearCombination {
        self.nonzero.into()
    }

    /// Boolean that is one iff `x == 0`
    pub fn is_zero(&self) -> LinearCombination {
        LinearCombination::one() - self.nonzero
    }
}

impl Gadget for ZeroTestGadget {
    fn generate_witness(&self, cs: &mut ConstraintSystem) -> Result<()> {
        let x = cs.eval(&self.x)?;
        let (inverse, nonzero) = match x.inverse() {
            Some(inv) => (inv, Fp::ONE),
            None => (Fp::ZERO, Fp::ZERO),
        };
        cs.set_value(self.inverse, inverse)?;
        cs.set_value(self.nonzero, nonzero)?;
        Ok(())
    }
}
