//! # Float Values
//!
//! Host-side representation of a float as the circuits see it:
//! `(sign, exponent, mantissa, abnormal)`.
//!
//! ## Encoding
//!
//! - Zero: all fields zero. Negative zero encodes as positive zero.
//! - Finite non-zero: `mantissa ∈ [2^M, 2^(M+1))` with the implicit one made
//!   explicit, and the value is `mantissa * 2^(exponent - 2M - bias)`.
//!   Normal numbers use `exponent = biased + M`. Subnormals are
//!   renormalized: the exponent starts at `M + 1` and drops by one per
//!   left shift of the mantissa, so it lands in `[1, M]`.
//! - Infinity and NaN: `abnormal = 1`, every other field zero.

use crate::config::FloatFormat;
use crate::error::{Result, ZkFloatError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A float in circuit encoding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FloatValue {
    pub sign: bool,
    pub exponent: u64,
    pub mantissa: u64,
    pub abnormal: bool,
}

impl FloatValue {
    pub const ZERO: Self = Self {
        sign: false,
        exponent: 0,
        mantissa: 0,
        abnormal: false,
    };

    /// Encoding shared by every infinity and NaN
    pub const ABNORMAL: Self = Self {
        sign: false,
        exponent: 0,
        mantissa: 0,
        abnormal: true,
    };

    pub const fn new(sign: bool, exponent: u64, mantissa: u64, abnormal: bool) -> Self {
        Self {
            sign,
            exponent,
            mantissa,
            abnormal,
        }
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        !self.abnormal && self.mantissa == 0
    }

    #[inline]
    pub const fn is_abnormal(&self) -> bool {
        self.abnormal
    }

    /// Encode a binary32 value
    pub fn from_f32(value: f32) -> Self {
        Self::from_fields(&FloatFormat::BINARY32, value.to_bits() as u64)
    }

    /// Decode to a binary32 value. Abnormal values decode to NaN.
    pub fn to_f32(&self) -> Result<f32> {
        let bits = self.to_bits(&FloatFormat::BINARY32)?;
        Ok(f32::from_bits(bits as u32))
    }

    /// Encode an IEEE-754 style bit pattern of the given format
    pub fn from_bits(format: &FloatFormat, bits: u64) -> Result<Self> {
        format.validate()?;
        let width = format.total_bits();
        if bits >> width != 0 {
            return Err(ZkFloatError::BitPatternTooWide { bits, width });
        }
        Ok(Self::from_fields(format, bits))
    }

    fn from_fields(format: &FloatFormat, bits: u64) -> Self {
        let m = format.mantissa_bits;
        let sign = (bits >> (format.exponent_bits + m)) & 1 == 1;
        let biased = (bits >> m) & format.max_biased_exponent();
        let fraction = bits & format.fraction_mask();

        if biased == format.max_biased_exponent() {
            return Self::ABNORMAL;
        }
        if biased == 0 && fraction == 0 {
            return Self::ZERO;
        }

        if biased == 0 {
            // Subnormal: renormalize so the hidden bit is set
            let mut exponent = m as u64 + 1;
            let mut mantissa = fraction;
            while mantissa < format.hidden_bit() {
                mantissa <<= 1;
                exponent -= 1;
            }
            Self::new(sign, exponent, mantissa, false)
        } else {
            Self::new(sign, biased + m as u64, fraction + format.hidden_bit(), false)
        }
    }

    /// Decode to an IEEE-754 style bit pattern of the given format.
    ///
    /// Abnormal values decode to the canonical quiet NaN.
    pub fn to_bits(&self, format: &FloatFormat) -> Result<u64> {
        format.validate()?;
        let m = format.mantissa_bits;
        let sign_bit = (self.sign as u64) << (format.exponent_bits + m);

        if self.abnormal {
            if self.sign || self.exponent != 0 || self.mantissa != 0 {
                return Err(self.malformed("abnormal value must have zero fields"));
            }
            return Ok((format.max_biased_exponent() << m) | (1u64 << (m - 1)));
        }

        if self.exponent == 0 {
            if self.sign || self.mantissa != 0 {
                return Err(self.malformed("zero exponent must carry an unsigned zero"));
            }
            return Ok(0);
        }

        if self.mantissa < format.hidden_bit() || self.mantissa >= format.hidden_bit() << 1 {
            return Err(self.malformed("mantissa outside [2^M, 2^(M+1))"));
        }

        if self.exponent <= m as u64 {
            let shift = m as u64 + 1 - self.exponent;
            if self.mantissa & ((1u64 << shift) - 1) != 0 {
                return Err(
                    self.malformed("subnormal mantissa has bits below the smallest subnormal")
                );
            }
            Ok(sign_bit | (self.mantissa >> shift))
        } else if self.exponent <= format.max_exponent() {
            let biased = self.exponent - m as u64;
            Ok(sign_bit | (biased << m) | (self.mantissa - format.hidden_bit()))
        } else {
            Err(self.malformed("exponent beyond the finite range"))
        }
    }

    fn malformed(&self, reason: &'static str) -> ZkFloatError {
        ZkFloatError::MalformedEncoding {
            sign: self.sign,
            exponent: self.exponent,
            mantissa: self.mantissa,
            reason,
        }
    }
}

impl fmt::Display for FloatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.abnormal {
            write!(f, "abnormal")
        } else {
            write!(
                f,
                "{}{:#x} * 2^({} - 2M - bias)",
                if self.sign { "-" } else { "+" },
                self.mantissa,
                self.exponent
            )
        }
    }
}
