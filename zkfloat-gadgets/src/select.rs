//! Conditional selection
//!
//! A binary select `b ? x : y` costs one constraint per component:
//! `b * (x - y) = t`, result `y + t`. The ordered ternary select picks among
//! three values with two constraints.

use crate::error::{GadgetError, Result};
use crate::gadget::Gadget;
use zkfloat_core::Fp;
use zkfloat_r1cs::{ConstraintSystem, LinearCombination, Variable};

#[derive(Clone, Debug)]
pub struct SelectTerm {
    x: LinearCombination,
    y: LinearCombination,
    blend: Variable,
}

impl SelectTerm {
    fn new(
        cs: &mut ConstraintSystem,
        flag: &LinearCombination,
        x: LinearCombination,
        y: LinearCombination,
    ) -> Self {
        let blend = cs.alloc("blend");
        cs.enforce(flag.clone(), x.clone() - y.clone(), blend, "flag * (x - y) = blend");
        Self { x, y, blend }
    }

    fn result(&self) -> LinearCombination {
        self.y.clone() + self.blend
    }

    fn assign(&self, cs: &mut ConstraintSystem, flag: Fp) -> Result<()> {
        let value = flag * (cs.eval(&self.x)? - cs.eval(&self.y)?);
        cs.set_value(self.blend, value)?;
        Ok(())
    }
}

/// `flag ? x : y` over a single value or a tuple sharing one flag
#[derive(Clone, Debug)]
pub enum SelectGadget {
    Scalar {
        flag: LinearCombination,
        term: SelectTerm,
    },
    Tuple {
        flag: LinearCombination,
        terms: Vec<SelectTerm>,
    },
}

impl SelectGadget {
    pub fn scalar(
        cs: &mut ConstraintSystem,
        flag: impl Into<LinearCombination>,
        x: impl Into<LinearCombination>,
        y: impl Into<LinearCombination>,
    ) -> Self {
        let flag = flag.into();
        let term = SelectTerm::new(cs, &flag, x.into(), y.into());
        SelectGadget::Scalar { flag, term }
    }

    pub fn tuple(
        cs: &mut ConstraintSystem,
        flag: impl Into<LinearCombination>,
        xs: Vec<LinearCombination>,
        ys: Vec<LinearCombination>,
    ) -> Result<Self> {
        if xs.len() != ys.len() {
            return Err(GadgetError::PreconditionViolated(format!(
                "tuple select over {} and {} components",
                xs.len(),
                ys.len()
            )));
        }
        let flag = flag.into();
        let terms = xs
            .into_iter()
            .zip(ys)
            .map(|(x, y)| SelectTerm::new(cs, &flag, x, y))
            .collect();
        Ok(SelectGadget::Tuple { flag, terms })
    }

    /// The selected value; for a tuple, its first component
    pub fn ret(&self) -> LinearCombination {
        match self {
            SelectGadget::Scalar { term, .. } => term.result(),
            SelectGadget::Tuple { terms, .. } => terms
                .first()
                .map(SelectTerm::result)
                .unwrap_or_else(LinearCombination::zero),
        }
    }

    /// Every selected component
    pub fn results(&self) -> Vec<LinearCombination> {
        match self {
            SelectGadget::Scalar { term, .. } => vec![term.result()],
            SelectGadget::Tuple { terms, .. } => terms.iter().map(SelectTerm::result).collect(),
        }
    }
}

impl Gadget for SelectGadget {
    fn generate_witness(&self, cs: &mut ConstraintSystem) -> Result<()> {
        match self {
            SelectGadget::Scalar { flag, term } => {
                let flag = cs.eval(flag)?;
                term.assign(cs, flag)
            }
            SelectGadget::Tuple { flag, terms } => {
                let flag = cs.eval(flag)?;
                terms.iter().try_for_each(|term| term.assign(cs, flag))
            }
        }
    }
}

/// Ordered three-way select on flags `(b0, b1) ≠ (1, 0)`:
///
/// | b0 | b1 | result |
/// |----|----|--------|
/// | 0  | 0  | x      |
/// | 0  | 1  | y      |
/// | 1  | 1  | z      |
///
/// `result = x + b1 * (y - x) + b0 * (z - y)`
#[derive(Clone, Debug)]
pub struct TernarySelectGadget {
    b0: LinearCombination,
    b1: LinearCombination,
    x: LinearCombination,
    y: LinearCombination,
    z: LinearCombination,
    t0: Variable,
    t1: Variable,
}

impl TernarySelectGadget {
    pub fn new(
        cs: &mut ConstraintSystem,
        b0: impl Into<LinearCombination>,
        b1: impl Into<LinearCombination>,
        x: impl Into<LinearCombination>,
        y: impl Into<LinearCombination>,
        z: impl Into<LinearCombination>,
    ) -> Self {
        let (b0, b1) = (b0.into(), b1.into());
        let (x, y, z) = (x.into(), y.into(), z.into());
        let t1 = cs.alloc("t1");
        cs.enforce(b1.clone(), y.clone() - x.clone(), t1, "b1 * (y - x) = t1");
        let t0 = cs.alloc("t0");
        cs.enforce(b0.clone(), z.clone() - y.clone(), t0, "b0 * (z - y) = t0");
        Self {
            b0,
            b1,
            x,
            y,
            z,
            t0,
            t1,
        }
    }

    pub fn ret(&self) -> LinearCombination {
        self.x.clone() + self.t1 + self.t0
    }
}

impl Gadget for TernarySelectGadget {
    fn generate_witness(&self, cs: &mut ConstraintSystem) -> Result<()> {
        let b0 = cs.eval(&self.b0)?;
        let b1 = cs.eval(&self.b1)?;
        let ordered = matches!((b0.value(), b1.value()), (0, 0) | (0, 1) | (1, 1));
        if !ordered {
            return Err(GadgetError::PreconditionViolated(format!(
                "ternary select flags ({}, {}) are not ordered",
                b0, b1
            )));
        }
        let (x, y, z) = (cs.eval(&self.x)?, cs.eval(&self.y)?, cs.eval(&self.z)?);
        cs.set_value(self.t1, b1 * (y - x))?;
        cs.set_value(self.t0, b0 * (z - y))?;
        Ok(())
    }
}
