//! `min(x, y)` for n-bit values: a comparison feeding a select.

use crate::compare::CompareGadget;
use crate::error::Result;
use crate::gadget::Gadget;
use crate::select::SelectGadget;
use zkfloat_r1cs::{ConstraintSystem, LinearCombination};

#[derive(Clone, Debug)]
pub struct MinGadget {
    compare: CompareGadget,
    select: SelectGadget,
}

impl MinGadget {
    pub fn new(
        cs: &mut ConstraintSystem,
        x: impl Into<LinearCombination>,
        y: impl Into<LinearCombination>,
        width: u32,
    ) -> Result<Self> {
        let (x, y) = (x.into(), y.into());
        let compare = CompareGadget::new(cs, x.clone(), y.clone(), width)?;
        let select = SelectGadget::scalar(cs, compare.lt(), x, y);
        Ok(Self { compare, select })
    }

    pub fn ret(&self) -> LinearCombination {
        self.select.ret()
    }
}

impl Gadget for MinGadget {
    fn generate_witness(&self, cs: &mut ConstraintSystem) -> Result<()> {
        self.compare.generate_witness(cs)?;
        self.select.generate_witness(cs)
    }
}
