//! Variables and linear combinations
//!
//! A [`LinearCombination`] is a weighted sum of variables. Constants are
//! terms on [`Variable::ONE`], so any expression of degree one can be passed
//! to a constraint without allocating a wire.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::{Add, Mul, Neg, Sub};
use zkfloat_core::Fp;

/// Index of a wire in a constraint system
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Variable(pub(crate) usize);

impl Variable {
    /// Wire 0, fixed to the constant one
    pub const ONE: Variable = Variable(0);

    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Weighted sum of variables
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinearCombination {
    terms: Vec<(Variable, Fp)>,
}

impl LinearCombination {
    pub fn zero() -> Self {
        Self { terms: Vec::new() }
    }

    pub fn one() -> Self {
        Self::constant(Fp::ONE)
    }

    pub fn constant(value: impl Into<Fp>) -> Self {
        Self {
            terms: vec![(Variable::ONE, value.into())],
        }
    }

    pub fn terms(&self) -> &[(Variable, Fp)] {
        &self.terms
    }

    /// Append `coeff * var`
    pub fn add_term(mut self, var: Variable, coeff: Fp) -> Self {
        self.terms.push((var, coeff));
        self
    }

    /// Merge duplicate variables and drop zero coefficients
    pub fn simplify(self) -> Self {
        let mut merged: BTreeMap<Variable, Fp> = BTreeMap::new();
        for (var, coeff) in self.terms {
            *merged.entry(var).or_insert(Fp::ZERO) += coeff;
        }
        Self {
            terms: merged.into_iter().filter(|(_, c)| !c.is_zero()).collect(),
        }
    }

    /// Evaluate against a value lookup; `None` if any variable is unassigned
    pub fn evaluate_with<F>(&self, mut value: F) -> Option<Fp>
    where
        F: FnMut(Variable) -> Option<Fp>,
    {
        self.terms
            .iter()
            .try_fold(Fp::ZERO, |acc, &(var, coeff)| Some(acc + coeff * value(var)?))
    }

    /// Variables referenced with a non-zero coefficient
    pub fn variables(&self) -> impl Iterator<Item = Variable> + '_ {
        self.terms.iter().filter(|(_, c)| !c.is_zero()).map(|(v, _)| *v)
    }
}

impl From<Variable> for LinearCombination {
    fn from(var: Variable) -> Self {
        Self {
            terms: vec![(var, Fp::ONE)],
        }
    }
}

impl From<Fp> for LinearCombination {
    fn from(value: Fp) -> Self {
        Self::constant(value)
    }
}

impl From<u64> for LinearCombination {
    fn from(value: u64) -> Self {
        Self::constant(Fp::from(value))
    }
}

impl From<&LinearCombination> for LinearCombination {
    fn from(lc: &LinearCombination) -> Self {
        lc.clone()
    }
}

impl<T: Into<LinearCombination>> Add<T> for LinearCombination {
    type Output = LinearCombination;

    fn add(mut self, rhs: T) -> Self {
        self.terms.extend(rhs.into().terms);
        self
    }
}

impl<T: Into<LinearCombination>> Sub<T> for LinearCombination {
    type Output = LinearCombination;

    fn sub(self, rhs: T) -> Self {
        self + -rhs.into()
    }
}

impl Neg for LinearCombination {
    type Output = LinearCombination;

    fn neg(self) -> Self {
        self * -Fp::ONE
    }
}

impl Mul<Fp> for LinearCombination {
    type Output = LinearCombination;

    fn mul(mut self, rhs: Fp) -> Self {
        for (_, coeff) in self.terms.iter_mut() {
            *coeff *= rhs;
        }
        self
    }
}

impl Mul<u64> for LinearCombination {
    type Output = LinearCombination;

    fn mul(self, rhs: u64) -> Self {
        self * Fp::from(rhs)
    }
}

impl<T: Into<LinearCombination>> Add<T> for Variable {
    type Output = LinearCombination;

    fn add(self, rhs: T) -> LinearCombination {
        LinearCombination::from(self) + rhs
    }
}

impl<T: Into<LinearCombination>> Sub<T> for Variable {
    type Output = LinearCombination;

    fn sub(self, rhs: T) -> LinearCombination {
        LinearCombination::from(self) - rhs
    }
}

impl Mul<Fp> for Variable {
    type Output = LinearCombination;

    fn mul(self, rhs: Fp) -> LinearCombination {
        LinearCombination::from(self) * rhs
    }
}

impl Neg for Variable {
    type Output = LinearCombination;

    fn neg(self) -> LinearCombination {
        -LinearCombination::from(self)
    }
}

impl std::iter::Sum for LinearCombination {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, lc| acc + lc)
    }
}
