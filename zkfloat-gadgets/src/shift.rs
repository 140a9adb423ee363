//! Variable powers of two and left shifts
//!
//! `2^y` for an n-bit `y` is the product over its bits of
//! `bit[i] * (2^(2^i) - 1) + 1`, which is `2^(2^i)` when the bit is set and
//! one otherwise. Cost: `n` booleanity constraints, one aggregate and
//! `n - 1` multiplications.

use crate::error::Result;
use crate::gadget::Gadget;
use crate::pack::PackGadget;
use crate::product::GrandProductGadget;
use zkfloat_core::Fp;
use zkfloat_r1cs::{ConstraintSystem, LinearCombination, Variable};

#[derive(Clone, Debug)]
pub struct PowerOfTwoGadget {
    bits: PackGadget,
    product: GrandProductGadget,
}

impl PowerOfTwoGadget {
    pub fn new(
        cs: &mut ConstraintSystem,
        y: impl Into<LinearCombination>,
        width: u32,
    ) -> Result<Self> {
        let bits = PackGadget::decompose(cs, y, width)?;
        let mut step = Fp::TWO;
        let factors = bits
            .bits()
            .into_iter()
            .map(|bit| {
                let factor = bit * (step - Fp::ONE) + 1u64;
                step = step * step;
                factor
            })
            .collect();
        let product = GrandProductGadget::new(cs, factors);
        Ok(Self { bits, product })
    }

    pub fn ret(&self) -> LinearCombination {
        self.product.ret()
    }
}

impl Gadget for PowerOfTwoGadget {
    fn generate_witness(&self, cs: &mut ConstraintSystem) -> Result<()> {
        self.bits.generate_witness(cs)?;
        self.product.generate_witness(cs)
    }
}

/// `x * 2^y` for an n-bit `y`, one constraint on top of the power of two.
///
/// The caller keeps `x * 2^y` below the field capacity.
#[derive(Clone, Debug)]
pub struct ShiftGadget {
    x: LinearCombination,
    power: PowerOfTwoGadget,
    result: Variable,
}

impl ShiftGadget {
    pub fn new(
        cs: &mut ConstraintSystem,
        x: impl Into<LinearCombination>,
        y: impl Into<LinearCombination>,
        width: u32,
    ) -> Result<Self> {
        let x = x.into();
        let power = cs.namespace("pow2", |cs| PowerOfTwoGadget::new(cs, y, width))?;
        let result = cs.alloc("shifted");
        cs.enforce(x.clone(), power.ret(), result, "x * 2^y = shifted");
        Ok(Self { x, power, result })
    }

    pub fn ret(&self) -> LinearCombination {
        self.result.into()
    }
}

impl Gadget for ShiftGadget {
    fn generate_witness(&self, cs: &mut ConstraintSystem) -> Result<()> {
        self.power.generate_witness(cs)?;
        let value = cs.eval(&self.x)? * cs.eval(&self.power.ret())?;
        cs.set_value(self.result, value)?;
        Ok(())
    }
}
