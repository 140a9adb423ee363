//! Float wires
//!
//! A [`FloatVar`] is the four-wire circuit image of a [`FloatValue`]. The
//! arithmetic pipelines assume their inputs are well formed; inputs that do
//! not come from another pipeline can be range checked with
//! [`FloatVar::enforce_well_formed`].

use crate::error::{GadgetError, Result};
use crate::gadget::{enforce_boolean, Gadget};
use crate::pack::PackGadget;
use serde::{Deserialize, Serialize};
use zkfloat_core::{FloatFormat, FloatValue, Fp};
use zkfloat_r1cs::{ConstraintSystem, Variable};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloatVar {
    pub sign: Variable,
    pub exponent: Variable,
    pub mantissa: Variable,
    pub abnormal: Variable,
}

impl FloatVar {
    pub fn alloc(cs: &mut ConstraintSystem) -> Self {
        Self {
            sign: cs.alloc("sign"),
            exponent: cs.alloc("exponent"),
            mantissa: cs.alloc("mantissa"),
            abnormal: cs.alloc("abnormal"),
        }
    }

    pub fn assign(&self, cs: &mut ConstraintSystem, value: &FloatValue) -> Result<()> {
        cs.set_value(self.sign, Fp::from(value.sign))?;
        cs.set_value(self.exponent, Fp::from(value.exponent))?;
        cs.set_value(self.mantissa, Fp::from(value.mantissa))?;
        cs.set_value(self.abnormal, Fp::from(value.abnormal))?;
        Ok(())
    }

    /// Read the assigned value back
    pub fn value(&self, cs: &ConstraintSystem) -> Result<FloatValue> {
        Ok(FloatValue {
            sign: read_bit(cs, self.sign)?,
            exponent: read_u64(cs, self.exponent)?,
            mantissa: read_u64(cs, self.mantissa)?,
            abnormal: read_bit(cs, self.abnormal)?,
        })
    }

    /// Constrain the wires to the shapes the pipelines assume: boolean flags,
    /// an `E + 1` bit exponent and an `M + 1` bit mantissa.
    pub fn enforce_well_formed(
        &self,
        cs: &mut ConstraintSystem,
        format: &FloatFormat,
    ) -> Result<WellFormedGadget> {
        cs.namespace("well_formed", |cs| {
            enforce_boolean(cs, self.sign, "sign is boolean");
            enforce_boolean(cs, self.abnormal, "abnormal is boolean");
            let exponent = cs.namespace("exponent", |cs| {
                PackGadget::decompose(cs, self.exponent, format.exponent_width())
            })?;
            let mantissa = cs.namespace("mantissa", |cs| {
                PackGadget::decompose(cs, self.mantissa, format.mantissa_width())
            })?;
            Ok(WellFormedGadget { exponent, mantissa })
        })
    }
}

fn read(cs: &ConstraintSystem, var: Variable) -> Result<Fp> {
    Ok(cs.eval(&var.into())?)
}

fn read_bit(cs: &ConstraintSystem, var: Variable) -> Result<bool> {
    let value = read(cs, var)?.value();
    match value {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(GadgetError::ValueOutOfRange {
            gadget: "float_var",
            value,
            bound: 2,
        }),
    }
}

fn read_u64(cs: &ConstraintSystem, var: Variable) -> Result<u64> {
    let value = read(cs, var)?;
    value.to_u64().ok_or(GadgetError::ValueOutOfRange {
        gadget: "float_var",
        value: value.value(),
        bound: 1u128 << 64,
    })
}

/// Range checks on a float's wires
#[derive(Clone, Debug)]
pub struct WellFormedGadget {
    exponent: PackGadget,
    mantissa: PackGadget,
}

impl Gadget for WellFormedGadget {
    fn generate_witness(&self, cs: &mut ConstraintSystem) -> Result<()> {
        self.exponent.generate_witness(cs)?;
        self.mantissa.generate_witness(cs)
    }
}
