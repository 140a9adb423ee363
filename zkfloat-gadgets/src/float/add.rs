//! Float addition
//!
//! ## Pipeline
//!
//! 1. Order the operands by magnitude: `x` is the larger, `y` the smaller.
//! 2. Clamp the exponent difference to `M + 3`; anything further right only
//!    contributes sticky bits.
//! 3. Align: `x.mantissa * 2^(M+3)` against `y.mantissa * 2^(M+3 - shift)`.
//! 4. Add or subtract depending on whether the signs agree.
//! 5. Normalize: shift left by a witness-supplied offset so the top bit lands
//!    on bit `2M + 4` of a `2M + 5` bit decomposition, unless the sum is zero.
//! 6. Round the top `M + 1` bits to nearest even.
//! 7. Flag exponent overflow (→ abnormal) and underflow, then zero the
//!    output fields of zero and abnormal results.
//!
//! The result exponent is `x.exponent + 1 + round_overflow - offset`.

use super::magnitude::MagnitudeSelectGadget;
use super::round::RoundGadget;
use super::var::FloatVar;
use crate::boolean::{AndGadget, OrGadget, XnorGadget};
use crate::compare::CompareGadget;
use crate::error::Result;
use crate::gadget::Gadget;
use crate::min::MinGadget;
use crate::pack::PackGadget;
use crate::select::SelectGadget;
use crate::shift::ShiftGadget;
use crate::zero::ZeroTestGadget;
use zkfloat_core::{FloatFormat, Fp, ZkFloatError};
use zkfloat_r1cs::{ConstraintSystem, LinearCombination, Variable};

/// Left shift that brings the top set bit of `value` up to `top_bit`.
///
/// Zero needs no shift. Values already wider than `top_bit + 1` bits are
/// left alone; the circuit rejects them.
pub fn normalization_offset(value: Fp, top_bit: u32) -> u32 {
    if value.is_zero() {
        return 0;
    }
    top_bit.saturating_sub(value.num_bits() - 1)
}

#[derive(Clone, Debug)]
struct Normalization {
    offset: Variable,
    shift: ShiftGadget,
    bits: PackGadget,
    zero: ZeroTestGadget,
}

#[derive(Clone, Debug)]
pub struct FloatAddGadget {
    format: FloatFormat,
    magnitude: MagnitudeSelectGadget,
    shift_amount: MinGadget,
    align: ShiftGadget,
    same_sign: XnorGadget,
    combined: SelectGadget,
    normalization: Normalization,
    round: RoundGadget,
    underflow: CompareGadget,
    overflow: CompareGadget,
    nonzero_overflow: AndGadget,
    is_zero: OrGadget,
    is_abnormal: OrGadget,
    sign: LinearCombination,
    exponent: LinearCombination,
    out: FloatVar,
}

impl FloatAddGadget {
    pub fn new(
        cs: &mut ConstraintSystem,
        format: &FloatFormat,
        a: &FloatVar,
        b: &FloatVar,
    ) -> Result<Self> {
        format.validate().map_err(ZkFloatError::from)?;
        let gadget = cs.namespace("float_add", |cs| Self::build(cs, *format, a, b))?;
        tracing::debug!(
            "float add circuit for {}: {} constraints, {} variables",
            format,
            cs.num_constraints(),
            cs.num_variables()
        );
        Ok(gadget)
    }

    fn build(
        cs: &mut ConstraintSystem,
        format: FloatFormat,
        a: &FloatVar,
        b: &FloatVar,
    ) -> Result<Self> {
        let m = format.mantissa_bits;
        let k = format.alignment_shift();

        let magnitude =
            cs.namespace("magnitude", |cs| MagnitudeSelectGadget::new(cs, &format, a, b))?;
        let x = magnitude.larger().clone();
        let y = magnitude.smaller().clone();

        let shift_amount = cs.namespace("shift_amount", |cs| {
            MinGadget::new(
                cs,
                x.exponent.clone() - y.exponent.clone(),
                k as u64,
                format.exponent_width(),
            )
        })?;
        let align = cs.namespace("align", |cs| {
            ShiftGadget::new(
                cs,
                y.mantissa.clone(),
                LinearCombination::from(k as u64) - shift_amount.ret(),
                format.shift_bits(),
            )
        })?;
        let x_scaled = x.mantissa.clone() * Fp::pow2(k);

        let same_sign = cs.namespace("same_sign", |cs| {
            XnorGadget::new(cs, x.sign.clone(), y.sign.clone())
        });
        let combined = cs.namespace("combine", |cs| {
            SelectGadget::scalar(
                cs,
                same_sign.ret(),
                x_scaled.clone() + align.ret(),
                x_scaled - align.ret(),
            )
        });

        let normalization = cs.namespace("normalize", |cs| -> Result<Normalization> {
            let offset = cs.alloc("offset");
            let shift = ShiftGadget::new(cs, combined.ret(), offset, format.offset_bits())?;
            let bits = PackGadget::decompose(cs, shift.ret(), format.normalized_width())?;
            let zero = cs.namespace("zero", |cs| ZeroTestGadget::new(cs, shift.ret()));
            let top = bits.bit(format.normalized_width() as usize - 1);
            cs.enforce(
                zero.is_zero() + top,
                Variable::ONE,
                LinearCombination::one(),
                "top bit set unless zero",
            );
            cs.enforce(
                offset,
                zero.is_zero(),
                LinearCombination::zero(),
                "zero sum has no offset",
            );
            Ok(Normalization {
                offset,
                shift,
                bits,
                zero,
            })
        })?;
        let offset = normalization.offset;

        let round = cs.namespace("round", |cs| {
            RoundGadget::new(cs, &normalization.bits, k as usize + 1, m)
        })?;

        let base = x.exponent.clone() + 1u64 + round.overflow();
        let exponent = base.clone() - offset;
        let underflow = cs.namespace("underflow", |cs| {
            CompareGadget::new(cs, base.clone(), offset, format.exponent_width())
        })?;
        let overflow = cs.namespace("overflow", |cs| {
            CompareGadget::new(
                cs,
                LinearCombination::from(offset) + format.overflow_exponent(),
                base,
                format.exponent_width(),
            )
        })?;
        // a zero sum keeps the larger exponent and must not read as overflow
        let nonzero_overflow = cs.namespace("nonzero_overflow", |cs| {
            AndGadget::new(cs, overflow.leq(), normalization.zero.ret())
        });

        let abnormal_inputs: Vec<LinearCombination> = vec![a.abnormal.into(), b.abnormal.into()];
        let is_zero = cs.namespace("is_zero", |cs| {
            let mut flags = abnormal_inputs.clone();
            flags.extend([round.mantissa_is_zero(), nonzero_overflow.ret(), underflow.leq()]);
            OrGadget::new(cs, flags)
        });
        let is_abnormal = cs.namespace("is_abnormal", |cs| {
            let mut flags = abnormal_inputs;
            flags.extend([nonzero_overflow.ret(), underflow.leq()]);
            OrGadget::new(cs, flags)
        });

        let sign = x.sign.clone();
        let out = cs.namespace("out", |cs| {
            let out = FloatVar::alloc(cs);
            let keep = LinearCombination::one() - is_zero.ret();
            cs.enforce(keep.clone(), sign.clone(), out.sign, "sign");
            cs.enforce(keep.clone(), exponent.clone(), out.exponent, "exponent");
            cs.enforce(keep, round.mantissa(), out.mantissa, "mantissa");
            cs.enforce(is_abnormal.ret(), Variable::ONE, out.abnormal, "abnormal");
            out
        });

        Ok(Self {
            format,
            magnitude,
            shift_amount,
            align,
            same_sign,
            combined,
            normalization,
            round,
            underflow,
            overflow,
            nonzero_overflow,
            is_zero,
            is_abnormal,
            sign,
            exponent,
            out,
        })
    }

    /// The freshly allocated result
    pub fn output(&self) -> &FloatVar {
        &self.out
    }

    pub fn format(&self) -> &FloatFormat {
        &self.format
    }
}

impl Gadget for FloatAddGadget {
    fn generate_witness(&self, cs: &mut ConstraintSystem) -> Result<()> {
        self.magnitude.generate_witness(cs)?;
        self.shift_amount.generate_witness(cs)?;
        self.align.generate_witness(cs)?;
        self.same_sign.generate_witness(cs)?;
        self.combined.generate_witness(cs)?;

        let combined = cs.eval(&self.combined.ret())?;
        let offset = normalization_offset(combined, self.format.normalized_width() - 1);
        tracing::trace!("normalization offset {} for sum {}", offset, combined);
        cs.set_value(self.normalization.offset, Fp::from(offset as u64))?;
        self.normalization.shift.generate_witness(cs)?;
        self.normalization.bits.generate_witness(cs)?;
        self.normalization.zero.generate_witness(cs)?;

        self.round.generate_witness(cs)?;
        self.underflow.generate_witness(cs)?;
        self.overflow.generate_witness(cs)?;
        self.nonzero_overflow.generate_witness(cs)?;
        self.is_zero.generate_witness(cs)?;
        self.is_abnormal.generate_witness(cs)?;

        let keep = Fp::ONE - cs.eval(&self.is_zero.ret())?;
        let sign = keep * cs.eval(&self.sign)?;
        let exponent = keep * cs.eval(&self.exponent)?;
        let mantissa = keep * cs.eval(&self.round.mantissa())?;
        let abnormal = cs.eval(&self.is_abnormal.ret())?;
        cs.set_value(self.out.sign, sign)?;
        cs.set_value(self.out.exponent, exponent)?;
        cs.set_value(self.out.mantissa, mantissa)?;
        cs.set_value(self.out.abnormal, abnormal)?;
        Ok(())
    }
}
