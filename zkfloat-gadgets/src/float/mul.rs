//! Float multiplication
//!
//! The `2M + 2` bit mantissa product keeps its top `M + 1` bits when the
//! result is normal. A subnormal result keeps fewer: with
//! `S = a.exponent + b.exponent + h` (`h` the product's top bit) and
//! `lo = M + bias`, the number of retained bits beyond the hidden one is
//!
//! ```text
//! t = clamp(S + 1 - lo, 0, M + 2)
//! ```
//!
//! so `q = 2M + 2 + h - t` low bits are dropped. A one-hot over `q - M`
//! selects the dropped part, round bit and least significant kept bit, which
//! then round to nearest even. The rounded product is rescaled by
//! `2^-(M + h)`; dropped low bits stay zero, keeping subnormals in their
//! renormalized form.

use super::round::RenormalizeGadget;
use super::var::FloatVar;
use crate::boolean::{OrGadget, XnorGadget};
use crate::compare::{CompareGadget, RangeGadget};
use crate::error::Result;
use crate::gadget::Gadget;
use crate::onehot::OneHotGadget;
use crate::pack::PackGadget;
use crate::product::ProductGadget;
use crate::select::{SelectGadget, TernarySelectGadget};
use crate::zero::ZeroTestGadget;
use zkfloat_core::{FloatFormat, Fp, ZkFloatError};
use zkfloat_r1cs::{ConstraintSystem, LinearCombination, Variable};

/// Dropped part, round bit and lsb at the one-hot rounding position
#[derive(Clone, Debug)]
struct Extraction {
    position: OneHotGadget,
    products: Vec<ProductGadget>,
    dropped: LinearCombination,
    round_bit: LinearCombination,
    lsb: LinearCombination,
    half: LinearCombination,
    unit: LinearCombination,
}

impl Extraction {
    fn new(
        cs: &mut ConstraintSystem,
        product: &LinearCombination,
        bits: &PackGadget,
        index: LinearCombination,
        mantissa_bits: u32,
    ) -> Self {
        let m = mantissa_bits as usize;
        let width = 2 * m + 2;
        let position = cs.namespace("position", |cs| OneHotGadget::new(cs, index, m + 4));

        let mut products = Vec::new();
        let mut dropped = LinearCombination::zero();
        let mut round_bit = LinearCombination::zero();
        let mut lsb = LinearCombination::zero();
        let mut half = LinearCombination::zero();
        let mut unit = LinearCombination::zero();
        for j in 0..position.len() {
            let k = m + j;
            let hot = position.bit(j);
            cs.namespace(&format!("extract[{}]", k), |cs| {
                let low = if k < width {
                    bits.low(k)
                } else {
                    product.clone()
                };
                let gadget = ProductGadget::new(cs, hot.clone(), low);
                dropped = dropped.clone() + gadget.ret();
                products.push(gadget);
                if k <= width {
                    let gadget = ProductGadget::new(cs, hot.clone(), bits.bit(k - 1));
                    round_bit = round_bit.clone() + gadget.ret();
                    products.push(gadget);
                }
                if k < width {
                    let gadget = ProductGadget::new(cs, hot.clone(), bits.bit(k));
                    lsb = lsb.clone() + gadget.ret();
                    products.push(gadget);
                }
            });
            half = half + hot.clone() * Fp::pow2(k as u32 - 1);
            unit = unit + hot * Fp::pow2(k as u32);
        }

        Self {
            position,
            products,
            dropped,
            round_bit,
            lsb,
            half,
            unit,
        }
    }
}

impl Gadget for Extraction {
    fn generate_witness(&self, cs: &mut ConstraintSystem) -> Result<()> {
        self.position.generate_witness(cs)?;
        self.products
            .iter()
            .try_for_each(|gadget| gadget.generate_witness(cs))
    }
}

#[derive(Clone, Debug)]
pub struct FloatMulGadget {
    format: FloatFormat,
    product: ProductGadget,
    bits: PackGadget,
    range: RangeGadget,
    retained: TernarySelectGadget,
    extraction: Extraction,
    tie: ZeroTestGadget,
    carry: SelectGadget,
    carry_unit: ProductGadget,
    rounded: Variable,
    rounded_sum: LinearCombination,
    scale: LinearCombination,
    renormalize: RenormalizeGadget,
    overflow: CompareGadget,
    sign: XnorGadget,
    is_zero: OrGadget,
    is_abnormal: OrGadget,
    exponent: LinearCombination,
    out: FloatVar,
}

impl FloatMulGadget {
    pub fn new(
        cs: &mut ConstraintSystem,
        format: &FloatFormat,
        a: &FloatVar,
        b: &FloatVar,
    ) -> Result<Self> {
        format.validate().map_err(ZkFloatError::from)?;
        let gadget = cs.namespace("float_mul", |cs| Self::build(cs, *format, a, b))?;
        tracing::debug!(
            "float mul circuit for {}: {} constraints, {} variables",
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
        let lo = m as u64 + format.bias();
        let hi = lo + m as u64 + 2;
        let width = format.exponent_width() + 1;

        let product = cs.namespace("product", |cs| ProductGadget::new(cs, a.mantissa, b.mantissa));
        let bits = cs.namespace("product_bits", |cs| {
            PackGadget::decompose(cs, product.ret(), format.product_width())
        })?;
        let high = bits.bit(format.product_width() as usize - 1);
        let sum = LinearCombination::from(a.exponent) + b.exponent + high.clone();

        let range = cs.namespace("retained_range", |cs| {
            RangeGadget::new(cs, sum.clone() + 1u64, lo, hi, width)
        })?;
        let retained = cs.namespace("retained", |cs| {
            TernarySelectGadget::new(
                cs,
                range.below(),
                range.not_above(),
                m as u64 + 2,
                sum.clone() + 1u64 - lo,
                0u64,
            )
        });
        let index = LinearCombination::from(m as u64 + 2) + high.clone() - retained.ret();
        let extraction = Extraction::new(cs, &product.ret(), &bits, index, m);

        let tie = cs.namespace("tie", |cs| {
            ZeroTestGadget::new(cs, extraction.dropped.clone() - extraction.half.clone())
        });
        let carry = cs.namespace("carry", |cs| {
            SelectGadget::scalar(
                cs,
                tie.is_zero(),
                extraction.lsb.clone(),
                extraction.round_bit.clone(),
            )
        });
        let carry_unit = cs.namespace("carry_unit", |cs| {
            ProductGadget::new(cs, carry.ret(), extraction.unit.clone())
        });

        // 2^-(M+h) = 2^-M - h * 2^-(M+1)
        let scale = LinearCombination::constant(Fp::inv_pow2(m)) - high * Fp::inv_pow2(m + 1);
        let rounded_sum = product.ret() - extraction.dropped.clone() + carry_unit.ret();
        let rounded = cs.alloc("rounded");
        cs.enforce(rounded_sum.clone(), scale.clone(), rounded, "rounded mantissa");
        let renormalize = cs.namespace("renormalize", |cs| RenormalizeGadget::new(cs, rounded, m));

        let exponent = sum.clone() - lo + renormalize.overflow();
        let overflow = cs.namespace("overflow", |cs| {
            CompareGadget::new(
                cs,
                format.overflow_exponent() + lo,
                sum + renormalize.overflow(),
                width,
            )
        })?;
        let sign = cs.namespace("sign", |cs| XnorGadget::new(cs, a.sign, b.sign));

        let is_zero = cs.namespace("is_zero", |cs| {
            OrGadget::new(
                cs,
                vec![
                    a.abnormal.into(),
                    b.abnormal.into(),
                    renormalize.mantissa_is_zero(),
                    overflow.leq(),
                ],
            )
        });
        let is_abnormal = cs.namespace("is_abnormal", |cs| {
            OrGadget::new(cs, vec![a.abnormal.into(), b.abnormal.into(), overflow.leq()])
        });

        let out = cs.namespace("out", |cs| {
            let out = FloatVar::alloc(cs);
            let keep = LinearCombination::one() - is_zero.ret();
            cs.enforce(keep.clone(), sign.xor(), out.sign, "sign");
            cs.enforce(keep.clone(), exponent.clone(), out.exponent, "exponent");
            cs.enforce(keep, renormalize.mantissa(), out.mantissa, "mantissa");
            cs.enforce(is_abnormal.ret(), Variable::ONE, out.abnormal, "abnormal");
            out
        });

        Ok(Self {
            format,
            product,
            bits,
            range,
            retained,
            extraction,
            tie,
            carry,
            carry_unit,
            rounded,
            rounded_sum,
            scale,
            renormalize,
            overflow,
            sign,
            is_zero,
            is_abnormal,
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

impl Gadget for FloatMulGadget {
    fn generate_witness(&self, cs: &mut ConstraintSystem) -> Result<()> {
        self.product.generate_witness(cs)?;
        self.bits.generate_witness(cs)?;
        self.range.generate_witness(cs)?;
        self.retained.generate_witness(cs)?;
        self.extraction.generate_witness(cs)?;
        self.tie.generate_witness(cs)?;
        self.carry.generate_witness(cs)?;
        self.carry_unit.generate_witness(cs)?;

        let rounded = cs.eval(&self.rounded_sum)? * cs.eval(&self.scale)?;
        tracing::trace!("rounded mantissa {}", rounded);
        cs.set_value(self.rounded, rounded)?;
        self.renormalize.generate_witness(cs)?;
        self.overflow.generate_witness(cs)?;
        self.sign.generate_witness(cs)?;
        self.is_zero.generate_witness(cs)?;
        self.is_abnormal.generate_witness(cs)?;

        let keep = Fp::ONE - cs.eval(&self.is_zero.ret())?;
        let sign = keep * cs.eval(&self.sign.xor())?;
        let exponent = keep * cs.eval(&self.exponent)?;
        let mantissa = keep * cs.eval(&self.renormalize.mantissa())?;
        let abnormal = cs.eval(&self.is_abnormal.ret())?;
        cs.set_value(self.out.sign, sign)?;
        cs.set_value(self.out.exponent, exponent)?;
        cs.set_value(self.out.mantissa, mantissa)?;
        cs.set_value(self.out.abnormal, abnormal)?;
        Ok(())
    }
}
