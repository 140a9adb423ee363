//! Unsigned comparison of n-bit values
//!
//! For `x, y < 2^n`, `z = y - x + 2^n` lies in `(0, 2^(n+1))`. Its top bit
//! is set iff `x <= y`, and `x < y` additionally needs some low bit set.
//! Cost: `n + 5` constraints.

use crate::boolean::{AndGadget, OrGadget};
use crate::error::Result;
use crate::gadget::{check_width, Gadget};
use crate::pack::PackGadget;
use zkfloat_core::Fp;
use zkfloat_r1cs::{ConstraintSystem, LinearCombination};

#[derive(Clone, Debug)]
pub struct CompareGadget {
    width: u32,
    bits: PackGadget,
    low_nonzero: OrGadget,
    lt: AndGadget,
}

impl CompareGadget {
    pub fn new(
        cs: &mut ConstraintSystem,
        x: impl Into<LinearCombination>,
        y: impl Into<LinearCombination>,
        width: u32,
    ) -> Result<Self> {
        check_width(width + 1)?;
        let shifted = y.into() - x.into() + Fp::pow2(width);
        let bits = PackGadget::decompose(cs, shifted, width + 1)?;
        let low_nonzero = OrGadget::new(cs, (0..width as usize).map(|i| bits.bit(i)).collect());
        let lt = AndGadget::new(cs, bits.bit(width as usize), low_nonzero.ret());
        Ok(Self {
            width,
            bits,
            low_nonzero,
            lt,
        })
    }

    /// 1 iff `x < y`
    pub fn lt(&self) -> LinearCombination {
        self.lt.ret()
    }

    /// 1 iff `x <= y`
    pub fn leq(&self) -> LinearCombination {
        self.bits.bit(self.width as usize)
    }
}

impl Gadget for CompareGadget {
    fn generate_witness(&self, cs: &mut ConstraintSystem) -> Result<()> {
        self.bits.generate_witness(cs)?;
        self.low_nonzero.generate_witness(cs)?;
        self.lt.generate_witness(cs)
    }
}

/// Classifies `x` against `[a, b]` for `a <= b`.
///
/// | position    | `below` | `not_above` |
/// |-------------|---------|-------------|
/// | `x < a`     | 1       | 1           |
/// | `a <= x <= b` | 0     | 1           |
/// | `x > b`     | 0       | 0           |
///
/// The flag pair is always ordered for a ternary select.
#[derive(Clone, Debug)]
pub struct RangeGadget {
    lower: CompareGadget,
    upper: CompareGadget,
}

impl RangeGadget {
    pub fn new(
        cs: &mut ConstraintSystem,
        x: impl Into<LinearCombination>,
        a: impl Into<LinearCombination>,
        b: impl Into<LinearCombination>,
        width: u32,
    ) -> Result<Self> {
        let x = x.into();
        let lower = cs.namespace("lower", |cs| CompareGadget::new(cs, x.clone(), a, width))?;
        let upper = cs.namespace("upper", |cs| CompareGadget::new(cs, x, b, width))?;
        Ok(Self { lower, upper })
    }

    /// 1 iff `x < a`
    pub fn below(&self) -> LinearCombination {
        self.lower.lt()
    }

    /// 1 iff `x <= b`
    pub fn not_above(&self) -> LinearCombination {
        self.upper.leq()
    }
}

impl Gadget for RangeGadget {
    fn generate_witness(&self, cs: &mut ConstraintSystem) -> Result<()> {
        self.lower.generate_witness(cs)?;
        self.upper.generate_witness(cs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::input;
    use proptest::prelude::*;

    fn compare(x: u64, y: u64, width: u32) -> (ConstraintSystem, CompareGadget) {
        let mut cs = ConstraintSystem::new();
        let a = input(&mut cs, "x", x);
        let b = input(&mut cs, "y", y);
        let gadget = CompareGadget::new(&mut cs, a, b, width).unwrap();
        gadget.generate_witness(&mut cs).unwrap();
        (cs, gadget)
    }

    #[test]
    fn test_exhaustive_four_bits() {
        for x in 0u64..16 {
            for y in 0u64..16 {
                let (cs, gadget) = compare(x, y, 4);
                assert!(cs.is_satisfied());
                assert_eq!(cs.eval(&gadget.lt()).unwrap(), Fp::from(x < y), "{} < {}", x, y);
                assert_eq!(cs.eval(&gadget.leq()).unwrap(), Fp::from(x <= y), "{} <= {}", x, y);
            }
        }
    }

    #[test]
    fn test_constraint_count() {
        let (cs, _) = compare(3, 5, 4);
        assert_eq!(cs.num_constraints(), 4 + 5);
    }

    #[test]
    fn test_forged_order_is_rejected() {
        let (mut cs, gadget) = compare(9, 3, 4);
        // claim 9 <= 3 by flipping the top bit
        let top = gadget.leq().terms()[0].0;
        cs.set_value(top, Fp::ONE).unwrap();
        assert_eq!(cs.which_is_unsatisfied(), Some("bits pack to value"));
    }

    #[test]
    fn test_out_of_range_input() {
        let mut cs = ConstraintSystem::new();
        let a = input(&mut cs, "x", 0u64);
        let b = input(&mut cs, "y", 16u64);
        let gadget = CompareGadget::new(&mut cs, a, b, 4).unwrap();
        assert!(gadget.generate_witness(&mut cs).is_err());
    }

    #[test]
    fn test_range_classification() {
        for x in 0u64..16 {
            let mut cs = ConstraintSystem::new();
            let v = input(&mut cs, "x", x);
            let gadget = RangeGadget::new(&mut cs, v, 5u64, 9u64, 4).unwrap();
            gadget.generate_witness(&mut cs).unwrap();
            assert!(cs.is_satisfied());
            assert_eq!(cs.eval(&gadget.below()).unwrap(), Fp::from(x < 5));
            assert_eq!(cs.eval(&gadget.not_above()).unwrap(), Fp::from(x <= 9));
        }
    }

    proptest! {
        #[test]
        fn test_compare_matches_integers(x in 0u64..1 << 40, y in 0u64..1 << 40) {
            let (cs, gadget) = compare(x, y, 40);
            prop_assert!(cs.is_satisfied());
            prop_assert_eq!(cs.eval(&gadget.lt()).unwrap(), Fp::from(x < y));
            prop_assert_eq!(cs.eval(&gadget.leq()).unwrap(), Fp::from(x <= y));
        }
    }
}
