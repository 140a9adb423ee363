//! Boolean primitives over wires already known to be 0 or 1.
//!
//! None of these gadgets constrain their inputs to be boolean; callers feed
//! them bits produced by decompositions, comparisons or zero tests.

use crate::error::Result;
use crate::gadget::Gadget;
use crate::zero::ZeroTestGadget;
use zkfloat_r1cs::{ConstraintSystem, LinearCombination, Variable};

/// `x * y = z`
#[derive(Clone, Debug)]
pub struct AndGadget {
    x: LinearCombination,
    y: LinearCombination,
    z: Variable,
}

impl AndGadget {
    pub fn new(
        cs: &mut ConstraintSystem,
        x: impl Into<LinearCombination>,
        y: impl Into<LinearCombination>,
    ) -> Self {
        let (x, y) = (x.into(), y.into());
        let z = cs.alloc("and");
        cs.enforce(x.clone(), y.clone(), z, "x * y = and");
        Self { x, y, z }
    }

    pub fn ret(&self) -> LinearCombination {
        self.z.into()
    }
}

impl Gadget for AndGadget {
    fn generate_witness(&self, cs: &mut ConstraintSystem) -> Result<()> {
        let value = cs.eval(&self.x)? * cs.eval(&self.y)?;
        cs.set_value(self.z, value)?;
        Ok(())
    }
}

/// n-ary OR: the sum of the inputs is non-zero iff some input is set.
///
/// Valid for fewer than p inputs, which always holds.
#[derive(Clone, Debug)]
pub enum OrGadget {
    /// No inputs: constant zero
    Empty,
    /// A single input passes through unconstrained
    Single(LinearCombination),
    Many(ZeroTestGadget),
}

impl OrGadget {
    pub fn new(cs: &mut ConstraintSystem, inputs: Vec<LinearCombination>) -> Self {
        match inputs.len() {
            0 => OrGadget::Empty,
            1 => OrGadget::Single(inputs.into_iter().sum()),
            _ => {
                let sum: LinearCombination = inputs.into_iter().sum();
                OrGadget::Many(ZeroTestGadget::new(cs, sum))
            }
        }
    }

    pub fn ret(&self) -> LinearCombination {
        match self {
            OrGadget::Empty => LinearCombination::zero(),
            OrGadget::Single(x) => x.clone(),
            OrGadget::Many(test) => test.ret(),
        }
    }
}

impl Gadget for OrGadget {
    fn generate_witness(&self, cs: &mut ConstraintSystem) -> Result<()> {
        match self {
            OrGadget::Many(test) => test.generate_witness(cs),
            _ => Ok(()),
        }
    }
}

/// XNOR with one constraint: `t = x * y`, result `1 - x - y + 2t`
#[derive(Clone, Debug)]
pub struct XnorGadget {
    x: LinearCombination,
    y: LinearCombination,
    product: AndGadget,
}

impl XnorGadget {
    pub fn new(
        cs: &mut ConstraintSystem,
        x: impl Into<LinearCombination>,
        y: impl Into<LinearCombination>,
    ) -> Self {
        let (x, y) = (x.into(), y.into());
        let product = AndGadget::new(cs, x.clone(), y.clone());
        Self { x, y, product }
    }

    /// 1 iff the inputs are equal
    pub fn ret(&self) -> LinearCombination {
        LinearCombination::one() - self.xor()
    }

    /// 1 iff the inputs differ
    pub fn xor(&self) -> LinearCombination {
        self.x.clone() + self.y.clone() - self.product.ret() * 2u64
    }
}

impl Gadget for XnorGadget {
    fn generate_witness(&self, cs: &mut ConstraintSystem) -> Result<()> {
        self.product.generate_witness(cs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::input;
    use zkfloat_core::Fp;

    #[test]
    fn test_and_truth_table() {
        for (x, y) in [(0u64, 0u64), (0, 1), (1, 0), (1, 1)] {
            let mut cs = ConstraintSystem::new();
            let a = input(&mut cs, "x", x);
            let b = input(&mut cs, "y", y);
            let gadget = AndGadget::new(&mut cs, a, b);
            gadget.generate_witness(&mut cs).unwrap();
            assert!(cs.is_satisfied());
            assert_eq!(cs.eval(&gadget.ret()).unwrap(), Fp::from(x & y));
        }
    }

    #[test]
    fn test_xnor_truth_table() {
        for (x, y) in [(0u64, 0u64), (0, 1), (1, 0), (1, 1)] {
            let mut cs = ConstraintSystem::new();
            let a = input(&mut cs, "x", x);
            let b = input(&mut cs, "y", y);
            let gadget = XnorGadget::new(&mut cs, a, b);
            gadget.generate_witness(&mut cs).unwrap();
            assert!(cs.is_satisfied());
            assert_eq!(cs.num_constraints(), 1);
            assert_eq!(cs.eval(&gadget.ret()).unwrap(), Fp::from((x == y) as u64));
            assert_eq!(cs.eval(&gadget.xor()).unwrap(), Fp::from(x ^ y));
        }
    }

    #[test]
    fn test_or_all_patterns() {
        for pattern in 0u64..16 {
            let mut cs = ConstraintSystem::new();
            let inputs: Vec<LinearCombination> = (0..4)
                .map(|i| input(&mut cs, "x", (pattern >> i) & 1).into())
                .collect();
            let gadget = OrGadget::new(&mut cs, inputs);
            gadget.generate_witness(&mut cs).unwrap();
            assert!(cs.is_satisfied());
            assert_eq!(cs.num_constraints(), 2);
            assert_eq!(cs.eval(&gadget.ret()).unwrap(), Fp::from((pattern != 0) as u64));
        }
    }

    #[test]
    fn test_or_degenerate() {
        let mut cs = ConstraintSystem::new();
        let empty = OrGadget::new(&mut cs, vec![]);
        assert_eq!(cs.eval(&empty.ret()).unwrap(), Fp::ZERO);

        let x = input(&mut cs, "x", 1u64);
        let single = OrGadget::new(&mut cs, vec![x.into()]);
        single.generate_witness(&mut cs).unwrap();
        assert_eq!(cs.num_constraints(), 0);
        assert_eq!(cs.eval(&single.ret()).unwrap(), Fp::ONE);
    }
}
