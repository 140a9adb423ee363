//! # Float Formats
//!
//! A [`FloatFormat`] fixes the exponent and mantissa widths of the IEEE-754
//! style format a circuit operates on. Every float gadget takes a format at
//! construction time; all bit widths the gadgets decompose into are derived
//! from it here.
//!
//! ## Derived quantities
//!
//! With `E` exponent bits and `M` explicit mantissa bits:
//!
//! | quantity              | value            |
//! |-----------------------|------------------|
//! | bias                  | `2^(E-1) - 1`    |
//! | circuit exponent bits | `E + 1`          |
//! | mantissa bits         | `M + 1`          |
//! | add alignment shift   | `M + 3`          |
//! | add normalized width  | `2M + 5`         |
//! | mul product width     | `2M + 2`         |

use crate::field::FIELD_CAPACITY;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of bits needed to represent `x`.
#[inline]
pub const fn bit_length(x: u64) -> u32 {
    64 - x.leading_zeros()
}

/// Binary floating-point format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FloatFormat {
    /// Width of the biased exponent field (2-15)
    pub exponent_bits: u32,
    /// Width of the stored fraction, without the implicit one (1-60)
    pub mantissa_bits: u32,
}

impl FloatFormat {
    /// IEEE-754 half precision
    pub const BINARY16: Self = Self {
        exponent_bits: 5,
        mantissa_bits: 10,
    };

    /// Brain floating point
    pub const BFLOAT16: Self = Self {
        exponent_bits: 8,
        mantissa_bits: 7,
    };

    /// IEEE-754 single precision (default)
    pub const BINARY32: Self = Self {
        exponent_bits: 8,
        mantissa_bits: 23,
    };

    pub const DEFAULT: Self = Self::BINARY32;

    /// Create a new format with validation
    pub const fn new(exponent_bits: u32, mantissa_bits: u32) -> Result<Self, FormatError> {
        let format = Self {
            exponent_bits,
            mantissa_bits,
        };

        if exponent_bits < 2 || exponent_bits > 15 {
            return Err(FormatError::InvalidExponentBits);
        }
        if mantissa_bits < 1 || mantissa_bits > 60 {
            return Err(FormatError::InvalidMantissaBits);
        }
        if 2 * mantissa_bits as u64 + 2 >= 1u64 << exponent_bits {
            return Err(FormatError::ExponentTooNarrow);
        }
        if format.max_shifted_width() > FIELD_CAPACITY {
            return Err(FormatError::ExceedsFieldCapacity);
        }

        Ok(format)
    }

    /// Exponent bias: 2^(E-1) - 1
    #[inline]
    pub const fn bias(&self) -> u64 {
        (1u64 << (self.exponent_bits - 1)) - 1
    }

    /// Width of an encoded value: sign + exponent + fraction
    #[inline]
    pub const fn total_bits(&self) -> u32 {
        1 + self.exponent_bits + self.mantissa_bits
    }

    /// Width of the circuit exponent (shifted by M to absorb subnormals)
    #[inline]
    pub const fn exponent_width(&self) -> u32 {
        self.exponent_bits + 1
    }

    /// Width of the circuit mantissa (implicit one made explicit)
    #[inline]
    pub const fn mantissa_width(&self) -> u32 {
        self.mantissa_bits + 1
    }

    /// Value of the implicit leading one: 2^M
    #[inline]
    pub const fn hidden_bit(&self) -> u64 {
        1u64 << self.mantissa_bits
    }

    /// Mask of the stored fraction bits
    #[inline]
    pub const fn fraction_mask(&self) -> u64 {
        self.hidden_bit() - 1
    }

    /// All-ones biased exponent (Inf/NaN)
    #[inline]
    pub const fn max_biased_exponent(&self) -> u64 {
        (1u64 << self.exponent_bits) - 1
    }

    /// Largest circuit exponent of a finite value: 2^E - 2 + M
    #[inline]
    pub const fn max_exponent(&self) -> u64 {
        self.max_biased_exponent() - 1 + self.mantissa_bits as u64
    }

    /// Smallest circuit exponent that no longer fits: 2^E - 1 + M
    #[inline]
    pub const fn overflow_exponent(&self) -> u64 {
        self.max_biased_exponent() + self.mantissa_bits as u64
    }

    /// Extra precision kept below the larger operand during addition: M + 3
    #[inline]
    pub const fn alignment_shift(&self) -> u32 {
        self.mantissa_bits + 3
    }

    /// Bits needed for an alignment shift amount in [0, M + 3]
    #[inline]
    pub const fn shift_bits(&self) -> u32 {
        bit_length(self.alignment_shift() as u64)
    }

    /// Largest normalization offset of a non-zero sum: M + 2
    #[inline]
    pub const fn max_normalization_offset(&self) -> u32 {
        self.mantissa_bits + 2
    }

    /// Bits needed for a normalization offset in [0, M + 2]
    #[inline]
    pub const fn offset_bits(&self) -> u32 {
        bit_length(self.max_normalization_offset() as u64)
    }

    /// Width of a normalized sum: 2M + 5
    #[inline]
    pub const fn normalized_width(&self) -> u32 {
        2 * self.mantissa_bits + 5
    }

    /// Width of a mantissa product: 2M + 2
    #[inline]
    pub const fn product_width(&self) -> u32 {
        2 * self.mantissa_bits + 2
    }

    /// Width of the magnitude key `exponent * 2^(M+1) + mantissa`: E + M + 2
    #[inline]
    pub const fn magnitude_width(&self) -> u32 {
        self.exponent_bits + self.mantissa_bits + 2
    }

    /// Widest integer the normalization shift can produce for any offset
    /// that fits in `offset_bits`. Must stay below the field capacity so the
    /// shift never wraps.
    #[inline]
    pub const fn max_shifted_width(&self) -> u32 {
        self.normalized_width() + (1u32 << self.offset_bits()) - 1
    }

    /// Validate format
    pub fn validate(&self) -> Result<(), FormatError> {
        Self::new(self.exponent_bits, self.mantissa_bits).map(|_| ())
    }
}

impl Default for FloatFormat {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for FloatFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FloatFormat {{ exponent: {} bits (bias {}), mantissa: {}+1 bits, encoded: {} bits }}",
            self.exponent_bits,
            self.bias(),
            self.mantissa_bits,
            self.total_bits(),
        )
    }
}

/// Format error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatError {
    /// Exponent bits must be in range [2, 15]
    InvalidExponentBits,
    /// Mantissa bits must be in range [1, 60]
    InvalidMantissaBits,
    /// Exponent range must exceed 2 * mantissa_bits + 2
    ExponentTooNarrow,
    /// Some circuit decomposition would not fit in the field
    ExceedsFieldCapacity,
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::InvalidExponentBits => {
                write!(f, "exponent_bits must be in range [2, 15]")
            }
            FormatError::InvalidMantissaBits => {
                write!(f, "mantissa_bits must be in range [1, 60]")
            }
            FormatError::ExponentTooNarrow => {
                write!(f, "2^exponent_bits must exceed 2 * mantissa_bits + 2")
            }
            FormatError::ExceedsFieldCapacity => {
                write!(f, "circuit widths exceed the field capacity of {} bits", FIELD_CAPACITY)
            }
        }
    }
}

impl std::error::Error for FormatError {}
