//! Bit decomposition and packing
//!
//! [`PackGadget::decompose`] splits a value into `n` little-endian boolean
//! wires: one booleanity constraint per bit plus one aggregate
//! `Σ bits[i] * 2^i = x`. Because `n` stays below the field capacity, the
//! decomposition doubles as the range check `0 <= x < 2^n`.
//!
//! [`PackGadget::compose`] goes the other way for bits that are already
//! constrained elsewhere and costs nothing.

use crate::error::{GadgetError, Result};
use crate::gadget::{check_width, enforce_boolean, Gadget};
use zkfloat_core::Fp;
use zkfloat_r1cs::{ConstraintSystem, LinearCombination, Variable};

#[derive(Clone, Debug)]
pub enum PackGadget {
    Decompose {
        value: LinearCombination,
        bits: Vec<Variable>,
    },
    Compose {
        bits: Vec<LinearCombination>,
    },
}

fn pack(bits: impl Iterator<Item = LinearCombination>) -> LinearCombination {
    bits.enumerate()
        .map(|(i, bit)| bit * Fp::pow2(i as u32))
        .sum()
}

impl PackGadget {
    pub fn decompose(
        cs: &mut ConstraintSystem,
        value: impl Into<LinearCombination>,
        width: u32,
    ) -> Result<Self> {
        check_width(width)?;
        let value = value.into();
        let bits: Vec<Variable> = (0..width)
            .map(|i| {
                let bit = cs.alloc(&format!("bit[{}]", i));
                enforce_boolean(cs, bit, &format!("bit[{}] is boolean", i));
                bit
            })
            .collect();
        cs.enforce(
            pack(bits.iter().map(|&b| b.into())),
            Variable::ONE,
            value.clone(),
            "bits pack to value",
        );
        Ok(PackGadget::Decompose { value, bits })
    }

    pub fn compose(bits: Vec<LinearCombination>) -> Result<Self> {
        check_width(bits.len() as u32)?;
        Ok(PackGadget::Compose { bits })
    }

    pub fn width(&self) -> usize {
        match self {
            PackGadget::Decompose { bits, .. } => bits.len(),
            PackGadget::Compose { bits } => bits.len(),
        }
    }

    /// Bit `i`, or zero beyond the width
    pub fn bit(&self, i: usize) -> LinearCombination {
        match self {
            PackGadget::Decompose { bits, .. } => bits
                .get(i)
                .map(|&b| b.into())
                .unwrap_or_else(LinearCombination::zero),
            PackGadget::Compose { bits } => bits
                .get(i)
                .cloned()
                .unwrap_or_else(LinearCombination::zero),
        }
    }

    pub fn bits(&self) -> Vec<LinearCombination> {
        (0..self.width()).map(|i| self.bit(i)).collect()
    }

    /// `Σ bits[i] * 2^i` over bits `[0, end)`
    pub fn low(&self, end: usize) -> LinearCombination {
        pack((0..end.min(self.width())).map(|i| self.bit(i)))
    }

    /// The packed value
    pub fn packed(&self) -> LinearCombination {
        match self {
            PackGadget::Decompose { value, .. } => value.clone(),
            PackGadget::Compose { bits } => pack(bits.iter().cloned()),
        }
    }
}

impl Gadget for PackGadget {
    fn generate_witness(&self, cs: &mut ConstraintSystem) -> Result<()> {
        let PackGadget::Decompose { value, bits } = self else {
            return Ok(());
        };
        let x = cs.eval(value)?;
        if x.num_bits() > bits.len() as u32 {
            return Err(GadgetError::ValueOutOfRange {
                gadget: "pack",
                value: x.value(),
                bound: 1u128 << bits.len(),
            });
        }
        for (i, &bit) in bits.iter().enumerate() {
            cs.set_value(bit, Fp::from(x.bit(i as u32)))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::input;
    use proptest::prelude::*;

    #[test]
    fn test_decompose() {
        let mut cs = ConstraintSystem::new();
        let x = input(&mut cs, "x", 0b1101u64);
        let gadget = PackGadget::decompose(&mut cs, x, 6).unwrap();
        gadget.generate_witness(&mut cs).unwrap();
        assert!(cs.is_satisfied());
        assert_eq!(cs.num_constraints(), 7);

        let bits: Vec<Fp> = gadget.bits().iter().map(|b| cs.eval(b).unwrap()).collect();
        let expected: Vec<Fp> = [1u64, 0, 1, 1, 0, 0].iter().map(|&b| Fp::from(b)).collect();
        assert_eq!(bits, expected);
        assert_eq!(cs.eval(&gadget.low(3)).unwrap(), Fp::from(0b101u64));
        assert_eq!(cs.eval(&gadget.bit(10)).unwrap(), Fp::ZERO);
    }

    #[test]
    fn test_compose() {
        let mut cs = ConstraintSystem::new();
        let bits: Vec<LinearCombination> = [1u64, 1, 0, 1]
            .iter()
            .map(|&b| input(&mut cs, "b", b).into())
            .collect();
        let gadget = PackGadget::compose(bits).unwrap();
        gadget.generate_witness(&mut cs).unwrap();
        assert_eq!(cs.num_constraints(), 0);
        assert_eq!(cs.eval(&gadget.packed()).unwrap(), Fp::from(0b1011u64));
    }

    #[test]
    fn test_out_of_range_witness() {
        let mut cs = ConstraintSystem::new();
        let x = input(&mut cs, "x", 16u64);
        let gadget = PackGadget::decompose(&mut cs, x, 4).unwrap();
        assert_eq!(
            gadget.generate_witness(&mut cs),
            Err(GadgetError::ValueOutOfRange {
                gadget: "pack",
                value: 16,
                bound: 16
            })
        );
    }

    #[test]
    fn test_non_boolean_bit_is_rejected() {
        let mut cs = ConstraintSystem::new();
        let x = input(&mut cs, "x", 2u64);
        let gadget = PackGadget::decompose(&mut cs, x, 2).unwrap();
        gadget.generate_witness(&mut cs).unwrap();
        let PackGadget::Decompose { bits, .. } = &gadget else {
            unreachable!()
        };
        // bit[0] = 2, bit[1] = 0 still packs to 2
        cs.set_value(bits[0], Fp::from(2u64)).unwrap();
        cs.set_value(bits[1], Fp::ZERO).unwrap();
        assert_eq!(cs.which_is_unsatisfied(), Some("bit[0] is boolean"));
    }

    #[test]
    fn test_width_exceeds_field() {
        let mut cs = ConstraintSystem::new();
        let x = input(&mut cs, "x", 1u64);
        assert_eq!(
            PackGadget::decompose(&mut cs, x, 127).unwrap_err(),
            GadgetError::WidthExceedsField {
                width: 127,
                capacity: 126
            }
        );
    }

    proptest! {
        #[test]
        fn test_decompose_then_pack(value in any::<u64>(), extra in 0u32..8) {
            let width = 64 + extra;
            let mut cs = ConstraintSystem::new();
            let x = input(&mut cs, "x", value);
            let gadget = PackGadget::decompose(&mut cs, x, width).unwrap();
            gadget.generate_witness(&mut cs).unwrap();
            prop_assert!(cs.is_satisfied());

            let repacked = PackGadget::compose(gadget.bits()).unwrap();
            prop_assert_eq!(cs.eval(&repacked.packed()).unwrap(), Fp::from(value));
            for i in 0..width {
                let bit = cs.eval(&gadget.bit(i as usize)).unwrap();
                prop_assert_eq!(bit, Fp::from(i < 64 && (value >> i) & 1 == 1));
            }
        }
    }
}
