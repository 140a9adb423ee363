//! Orders two floats by magnitude.
//!
//! Each operand's key `exponent * 2^(M+1) + mantissa` grows with its
//! absolute value, so one `E + M + 2` bit comparison decides which operand is
//! larger. A tuple select picks the larger one; the smaller is the
//! component-wise remainder `a + b - larger` and costs nothing.

use super::var::FloatVar;
use crate::compare::CompareGadget;
use crate::error::Result;
use crate::gadget::Gadget;
use crate::select::SelectGadget;
use zkfloat_core::{FloatFormat, Fp};
use zkfloat_r1cs::{ConstraintSystem, LinearCombination};

/// Sign, exponent and mantissa of a finite operand
#[derive(Clone, Debug)]
pub struct SignedMagnitude {
    pub sign: LinearCombination,
    pub exponent: LinearCombination,
    pub mantissa: LinearCombination,
}

impl SignedMagnitude {
    fn of(v: &FloatVar) -> Self {
        Self {
            sign: v.sign.into(),
            exponent: v.exponent.into(),
            mantissa: v.mantissa.into(),
        }
    }

    fn parts(&self) -> Vec<LinearCombination> {
        vec![self.sign.clone(), self.exponent.clone(), self.mantissa.clone()]
    }

    fn key(&self, format: &FloatFormat) -> LinearCombination {
        self.exponent.clone() * Fp::pow2(format.mantissa_width()) + self.mantissa.clone()
    }
}

#[derive(Clone, Debug)]
pub struct MagnitudeSelectGadget {
    compare: CompareGadget,
    select: SelectGadget,
    larger: SignedMagnitude,
    smaller: SignedMagnitude,
}

impl MagnitudeSelectGadget {
    pub fn new(
        cs: &mut ConstraintSystem,
        format: &FloatFormat,
        a: &FloatVar,
        b: &FloatVar,
    ) -> Result<Self> {
        let (a, b) = (SignedMagnitude::of(a), SignedMagnitude::of(b));
        let compare =
            CompareGadget::new(cs, a.key(format), b.key(format), format.magnitude_width())?;
        // |a| < |b| selects b; ties keep a first
        let select = SelectGadget::tuple(cs, compare.lt(), b.parts(), a.parts())?;

        let chosen = select.results();
        let larger = SignedMagnitude {
            sign: chosen[0].clone(),
            exponent: chosen[1].clone(),
            mantissa: chosen[2].clone(),
        };
        let smaller = SignedMagnitude {
            sign: a.sign + b.sign - larger.sign.clone(),
            exponent: a.exponent + b.exponent - larger.exponent.clone(),
            mantissa: a.mantissa + b.mantissa - larger.mantissa.clone(),
        };
        Ok(Self {
            compare,
            select,
            larger,
            smaller,
        })
    }

    pub fn larger(&self) -> &SignedMagnitude {
        &self.larger
    }

    pub fn smaller(&self) -> &SignedMagnitude {
        &self.smaller
    }
}

impl Gadget for MagnitudeSelectGadget {
    fn generate_witness(&self, cs: &mut ConstraintSystem) -> Result<()> {
        self.compare.generate_witness(cs)?;
        self.select.generate_witness(cs)
    }
}
