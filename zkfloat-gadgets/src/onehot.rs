//! One-hot encoding of `x ∈ [0, n)`
//!
//! Booleanity on each of the `n` bits, `Σ i * bits[i] = x` and
//! `Σ bits[i] = 1`: exactly one bit is set, at index `x`.

use crate::error::Result;
use crate::gadget::{bounded_value, enforce_boolean, Gadget};
use zkfloat_core::Fp;
use zkfloat_r1cs::{ConstraintSystem, LinearCombination, Variable};

#[derive(Clone, Debug)]
pub struct OneHotGadget {
    x: LinearCombination,
    bits: Vec<Variable>,
}

impl OneHotGadget {
    pub fn new(cs: &mut ConstraintSystem, x: impl Into<LinearCombination>, n: usize) -> Self {
        let x = x.into();
        let bits: Vec<Variable> = (0..n)
            .map(|i| {
                let bit = cs.alloc(&format!("hot[{}]", i));
                enforce_boolean(cs, bit, &format!("hot[{}] is boolean", i));
                bit
            })
            .collect();
        let index: LinearCombination = bits
            .iter()
            .enumerate()
            .map(|(i, &b)| b * Fp::from(i as u64))
            .sum();
        let count: LinearCombination = bits.iter().map(|&b| LinearCombination::from(b)).sum();
        cs.enforce(index, Variable::ONE, x.clone(), "hot index = x");
        cs.enforce(count, Variable::ONE, LinearCombination::one(), "one bit set");
        Self { x, bits }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn bit(&self, i: usize) -> LinearCombination {
        self.bits
            .get(i)
            .map(|&b| b.into())
            .unwrap_or_else(LinearCombination::zero)
    }
}

impl Gadget for OneHotGadget {
    fn generate_witness(&self, cs: &mut ConstraintSystem) -> Result<()> {
        let x = bounded_value(cs, &self.x, "one_hot", self.bits.len() as u128)?;
        for (i, &bit) in self.bits.iter().enumerate() {
            cs.set_value(bit, Fp::from(i as u128 == x))?;
        }
        Ok(())
    }
}
