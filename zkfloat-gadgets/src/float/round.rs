//! Round to nearest, ties to even
//!
//! [`RoundGadget`] rounds a normalized bit vector at a fixed position.
//! [`RenormalizeGadget`] handles the carry a round-up can push past the top
//! of the mantissa: a rounded value of exactly `2^(M+1)` becomes `2^M` and
//! reports an overflow so the caller bumps the exponent.

use crate::error::{GadgetError, Result};
use crate::gadget::Gadget;
use crate::pack::PackGadget;
use crate::select::SelectGadget;
use crate::zero::ZeroTestGadget;
use zkfloat_core::Fp;
use zkfloat_r1cs::{ConstraintSystem, LinearCombination};

#[derive(Clone, Debug)]
pub struct RenormalizeGadget {
    overflow: ZeroTestGadget,
    select: SelectGadget,
    zero: ZeroTestGadget,
}

impl RenormalizeGadget {
    /// `rounded` must lie in `[0, 2^(M+1)]`
    pub fn new(
        cs: &mut ConstraintSystem,
        rounded: impl Into<LinearCombination>,
        mantissa_bits: u32,
    ) -> Self {
        let rounded = rounded.into();
        let overflow = cs.namespace("overflow", |cs| {
            ZeroTestGadget::new(cs, rounded.clone() - Fp::pow2(mantissa_bits + 1))
        });
        let select = SelectGadget::scalar(cs, overflow.is_zero(), Fp::pow2(mantissa_bits), rounded);
        let zero = cs.namespace("mantissa_zero", |cs| ZeroTestGadget::new(cs, select.ret()));
        Self {
            overflow,
            select,
            zero,
        }
    }

    /// 1 iff rounding carried into bit `M + 1`
    pub fn overflow(&self) -> LinearCombination {
        self.overflow.is_zero()
    }

    /// Mantissa in `[2^M, 2^(M+1))`, or zero
    pub fn mantissa(&self) -> LinearCombination {
        self.select.ret()
    }

    pub fn mantissa_is_zero(&self) -> LinearCombination {
        self.zero.is_zero()
    }
}

impl Gadget for RenormalizeGadget {
    fn generate_witness(&self, cs: &mut ConstraintSystem) -> Result<()> {
        self.overflow.generate_witness(cs)?;
        self.select.generate_witness(cs)?;
        self.zero.generate_witness(cs)
    }
}

/// Rounds `bits` to the `M + 1` bits starting at `drop`.
///
/// Bit `drop - 1` is the round bit and everything below it is sticky. The
/// value is exactly halfway when the dropped part equals `2^(drop-1)`; then
/// the least significant kept bit decides, otherwise the round bit does.
/// `drop` must be at least one.
#[derive(Clone, Debug)]
pub struct RoundGadget {
    tie: ZeroTestGadget,
    carry: SelectGadget,
    renormalize: RenormalizeGadget,
}

impl RoundGadget {
    pub fn new(
        cs: &mut ConstraintSystem,
        bits: &PackGadget,
        drop: usize,
        mantissa_bits: u32,
    ) -> Result<Self> {
        if drop == 0 {
            return Err(GadgetError::PreconditionViolated(
                "rounding needs at least one dropped bit".to_string(),
            ));
        }
        let half = Fp::pow2(drop as u32 - 1);
        let tie = cs.namespace("tie", |cs| ZeroTestGadget::new(cs, bits.low(drop) - half));
        let carry = cs.namespace("carry", |cs| {
            SelectGadget::scalar(cs, tie.is_zero(), bits.bit(drop), bits.bit(drop - 1))
        });
        let kept: LinearCombination = (0..=mantissa_bits as usize)
            .map(|i| bits.bit(drop + i) * Fp::pow2(i as u32))
            .sum();
        let renormalize = RenormalizeGadget::new(cs, kept + carry.ret(), mantissa_bits);
        Ok(Self {
            tie,
            carry,
            renormalize,
        })
    }

    pub fn overflow(&self) -> LinearCombination {
        self.renormalize.overflow()
    }

    pub fn mantissa(&self) -> LinearCombination {
        self.renormalize.mantissa()
    }

    pub fn mantissa_is_zero(&self) -> LinearCombination {
        self.renormalize.mantissa_is_zero()
    }
}

impl Gadget for RoundGadget {
    fn generate_witness(&self, cs: &mut ConstraintSystem) -> Result<()> {
        self.tie.generate_witness(cs)?;
        self.carry.generate_witness(cs)?;
        self.renormalize.generate_witness(cs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::input;

    /// Round `value` (given as `2M + 5` bits, M = 3) at bit M + 4 = 7.
    fn round(value: u64) -> (u64, u64) {
        let mut cs = ConstraintSystem::new();
        let x = input(&mut cs, "x", value);
        let bits = PackGadget::decompose(&mut cs, x, 11).unwrap();
        let gadget = RoundGadget::new(&mut cs, &bits, 7, 3).unwrap();
        bits.generate_witness(&mut cs).unwrap();
        gadget.generate_witness(&mut cs).unwrap();
        assert!(cs.is_satisfied());
        let mantissa = cs.eval(&gadget.mantissa()).unwrap().to_u64().unwrap();
        let overflow = cs.eval(&gadget.overflow()).unwrap().to_u64().unwrap();
        (mantissa, overflow)
    }

    #[test]
    fn test_round_down_and_up() {
        // kept 0b1010, dropped below half
        assert_eq!(round(0b1010_0111111), (0b1010, 0));
        // kept 0b1010, dropped above half
        assert_eq!(round(0b1010_1000001), (0b1011, 0));
    }

    #[test]
    fn test_ties_to_even() {
        assert_eq!(round(0b1010_1000000), (0b1010, 0));
        assert_eq!(round(0b1011_1000000), (0b1100, 0));
    }

    #[test]
    fn test_carry_overflow() {
        // 0b1111 rounds up to 0b10000, renormalized to 0b1000
        assert_eq!(round(0b1111_1000000), (0b1000, 1));
        assert_eq!(round(0b1111_1100000), (0b1000, 1));
    }

    #[test]
    fn test_nothing_to_drop() {
        let mut cs = ConstraintSystem::new();
        let x = input(&mut cs, "x", 9u64);
        let bits = PackGadget::decompose(&mut cs, x, 4).unwrap();
        assert!(matches!(
            RoundGadget::new(&mut cs, &bits, 0, 3),
            Err(GadgetError::PreconditionViolated(_))
        ));
    }

    #[test]
    fn test_zero() {
        let mut cs = ConstraintSystem::new();
        let x = input(&mut cs, "x", 0u64);
        let bits = PackGadget::decompose(&mut cs, x, 11).unwrap();
        let gadget = RoundGadget::new(&mut cs, &bits, 7, 3).unwrap();
        bits.generate_witness(&mut cs).unwrap();
        gadget.generate_witness(&mut cs).unwrap();
        assert!(cs.is_satisfied());
        assert_eq!(cs.eval(&gadget.mantissa_is_zero()).unwrap(), Fp::ONE);
    }

    #[test]
    fn test_renormalize() {
        for (rounded, mantissa, overflow) in [(16u64, 8u64, 1u64), (9, 9, 0), (0, 0, 0)] {
            let mut cs = ConstraintSystem::new();
            let x = input(&mut cs, "x", rounded);
            let gadget = RenormalizeGadget::new(&mut cs, x, 3);
            gadget.generate_witness(&mut cs).unwrap();
            assert!(cs.is_satisfied());
            assert_eq!(cs.eval(&gadget.mantissa()).unwrap(), Fp::from(mantissa));
            assert_eq!(cs.eval(&gadget.overflow()).unwrap(), Fp::from(overflow));
            assert_eq!(
                cs.eval(&gadget.mantissa_is_zero()).unwrap(),
                Fp::from(mantissa == 0)
            );
        }
    }
}
