//! Mersenne 127 field arithmetic
//!
//! p = 2^127 - 1
//!
//! Properties:
//! - 127-bit prime, canonical values stored in a `u128`
//! - Unsigned integers below 2^126 never wrap, which bounds every bit
//!   decomposition used by the float circuits
//! - 2^127 = 1 mod p, so powers of two are rotations
//! - Efficient modular reduction without division

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// Mersenne 127 prime: p = 2^127 - 1
pub const MERSENNE127_PRIME: u128 = (1u128 << 127) - 1;

/// Number of bits an unsigned integer may occupy without wrapping around p.
pub const FIELD_CAPACITY: u32 = 126;

/// Mersenne 127 field element
///
/// Values are stored in canonical form: 0 ≤ value < p
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Mersenne127(u128);

/// Field used by every wire of the constraint system.
pub type Fp = Mersenne127;

impl Mersenne127 {
    pub const PRIME: u128 = MERSENNE127_PRIME;
    pub const ZERO: Self = Mersenne127(0);
    pub const ONE: Self = Mersenne127(1);
    pub const TWO: Self = Mersenne127(2);

    /// Create a new field element from a u128 (reduces modulo p)
    #[inline]
    pub const fn new(value: u128) -> Self {
        Mersenne127(Self::reduce(value))
    }

    /// Get the canonical value
    #[inline]
    pub const fn value(self) -> u128 {
        self.0
    }

    /// Canonical value as a u64, if it fits
    #[inline]
    pub const fn to_u64(self) -> Option<u64> {
        if self.0 <= u64::MAX as u128 {
            Some(self.0 as u64)
        } else {
            None
        }
    }

    /// Reduce a u128 modulo p = 2^127 - 1
    ///
    /// For Mersenne primes: x mod (2^n - 1) = (x & (2^n - 1)) + (x >> n)
    /// The sum is at most p + 1, so one conditional subtraction suffices.
    #[inline]
    const fn reduce(x: u128) -> u128 {
        let sum = (x & MERSENNE127_PRIME) + (x >> 127);
        if sum >= MERSENNE127_PRIME {
            sum - MERSENNE127_PRIME
        } else {
            sum
        }
    }

    /// Reduce a 256-bit value given as (hi, lo) with hi < 2^127
    #[inline]
    const fn reduce_wide(hi: u128, lo: u128) -> u128 {
        // hi * 2^128 = 2 * hi mod p
        let low = Self::reduce(lo);
        let high = Self::reduce(hi << 1);
        Self::reduce(low + high)
    }

    /// Full 254-bit product of two canonical values as (hi, lo)
    #[inline]
    const fn widening_mul(a: u128, b: u128) -> (u128, u128) {
        const MASK: u128 = u64::MAX as u128;
        let (a0, a1) = (a & MASK, a >> 64);
        let (b0, b1) = (b & MASK, b >> 64);

        let low = a0 * b0;
        // a1, b1 < 2^63, so the middle sum stays below 2^128
        let mid = a1 * b0 + a0 * b1;
        let high = a1 * b1;

        let (lo, carry) = low.overflowing_add(mid << 64);
        let hi = high + (mid >> 64) + carry as u128;
        (hi, lo)
    }

    /// Compute additive inverse: -a mod p
    #[inline]
    pub const fn neg(self) -> Self {
        if self.0 == 0 {
            Self::ZERO
        } else {
            Mersenne127(MERSENNE127_PRIME - self.0)
        }
    }

    /// Compute multiplicative inverse: a^(-1) mod p
    ///
    /// Uses Fermat's little theorem: a^(p-2) = a^(-1) mod p.
    /// Returns `None` for zero.
    pub fn inverse(self) -> Option<Self> {
        if self.0 == 0 {
            return None;
        }
        Some(self.pow(MERSENNE127_PRIME - 2))
    }

    /// Compute self^exp mod p using binary exponentiation
    pub fn pow(self, mut exp: u128) -> Self {
        let mut base = self;
        let mut result = Self::ONE;

        while exp > 0 {
            if exp & 1 == 1 {
                result = result * base;
            }
            base = base * base;
            exp >>= 1;
        }

        result
    }

    /// 2^k mod p
    #[inline]
    pub const fn pow2(k: u32) -> Self {
        Mersenne127(1u128 << (k % 127))
    }

    /// 2^(-k) mod p
    #[inline]
    pub const fn inv_pow2(k: u32) -> Self {
        Mersenne127(1u128 << ((127 - k % 127) % 127))
    }

    /// Check if this is zero
    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Check if this is one
    #[inline]
    pub const fn is_one(self) -> bool {
        self.0 == 1
    }

    /// Bit `i` of the canonical value
    #[inline]
    pub const fn bit(self, i: u32) -> bool {
        i < 128 && (self.0 >> i) & 1 == 1
    }

    /// Number of significant bits in the canonical value
    #[inline]
    pub const fn num_bits(self) -> u32 {
        128 - self.0.leading_zeros()
    }

    /// Little-endian bits of the canonical value, truncated to `n` bits
    pub fn to_bits_le(self, n: u32) -> Vec<bool> {
        (0..n).map(|i| self.bit(i)).collect()
    }

    /// Pack little-endian bits into a field element
    pub fn from_bits_le(bits: &[bool]) -> Self {
        bits.iter()
            .rev()
            .fold(Self::ZERO, |acc, &b| acc + acc + Self::from(b))
    }
}

// Arithmetic implementations

impl Add for Mersenne127 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Mersenne127(Self::reduce(self.0 + rhs.0))
    }
}

impl AddAssign for Mersenne127 {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Mersenne127 {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Mersenne127(Self::reduce(self.0 + (MERSENNE127_PRIME - rhs.0)))
    }
}

impl SubAssign for Mersenne127 {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul for Mersenne127 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let (hi, lo) = Self::widening_mul(self.0, rhs.0);
        Mersenne127(Self::reduce_wide(hi, lo))
    }
}

impl MulAssign for Mersenne127 {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl Neg for Mersenne127 {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::neg(self)
    }
}

impl std::iter::Sum for Mersenne127 {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, x| acc + x)
    }
}

impl std::iter::Product for Mersenne127 {
    fn product<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ONE, |acc, x| acc * x)
    }
}

// Conversions

impl From<bool> for Mersenne127 {
    #[inline]
    fn from(value: bool) -> Self {
        if value {
            Self::ONE
        } else {
            Self::ZERO
        }
    }
}

impl From<u64> for Mersenne127 {
    #[inline]
    fn from(value: u64) -> Self {
        Mersenne127(value as u128)
    }
}

impl From<u128> for Mersenne127 {
    #[inline]
    fn from(value: u128) -> Self {
        Self::new(value)
    }
}

impl From<i64> for Mersenne127 {
    #[inline]
    fn from(value: i64) -> Self {
        if value >= 0 {
            Mersenne127(value as u128)
        } else {
            Mersenne127(value.unsigned_abs() as u128).neg()
        }
    }
}

impl From<Mersenne127> for u128 {
    #[inline]
    fn from(f: Mersenne127) -> u128 {
        f.0
    }
}

// Display

impl fmt::Display for Mersenne127 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
