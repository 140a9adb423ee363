//! Products: a single multiplication and a chained grand product.

use crate::error::Result;
use crate::gadget::Gadget;
use zkfloat_core::Fp;
use zkfloat_r1cs::{ConstraintSystem, LinearCombination, Variable};

/// `x * y = z`, one constraint
#[derive(Clone, Debug)]
pub struct ProductGadget {
    x: LinearCombination,
    y: LinearCombination,
    z: Variable,
}

impl ProductGadget {
    pub fn new(
        cs: &mut ConstraintSystem,
        x: impl Into<LinearCombination>,
        y: impl Into<LinearCombination>,
    ) -> Self {
        let (x, y) = (x.into(), y.into());
        let z = cs.alloc("product");
        cs.enforce(x.clone(), y.clone(), z, "x * y = product");
        Self { x, y, z }
    }

    pub fn ret(&self) -> LinearCombination {
        self.z.into()
    }
}

impl Gadget for ProductGadget {
    fn generate_witness(&self, cs: &mut ConstraintSystem) -> Result<()> {
        let value = cs.eval(&self.x)? * cs.eval(&self.y)?;
        cs.set_value(self.z, value)?;
        Ok(())
    }
}

/// `x[0] * x[1] * ... * x[k-1]` with `k - 1` constraints.
///
/// An empty product is the constant one; a single factor passes through.
#[derive(Clone, Debug)]
pub struct GrandProductGadget {
    factors: Vec<LinearCombination>,
    partials: Vec<Variable>,
}

impl GrandProductGadget {
    pub fn new(cs: &mut ConstraintSystem, factors: Vec<LinearCombination>) -> Self {
        let mut partials = Vec::with_capacity(factors.len().saturating_sub(1));
        let mut acc = factors.first().cloned();
        for (i, factor) in factors.iter().enumerate().skip(1) {
            let partial = cs.alloc(&format!("partial[{}]", i));
            if let Some(prev) = acc {
                cs.enforce(prev, factor.clone(), partial, &format!("partial[{}]", i));
            }
            acc = Some(partial.into());
            partials.push(partial);
        }
        Self { factors, partials }
    }

    pub fn ret(&self) -> LinearCombination {
        match (self.partials.last(), self.factors.first()) {
            (Some(&last), _) => last.into(),
            (None, Some(only)) => only.clone(),
            (None, None) => LinearCombination::one(),
        }
    }
}

impl Gadget for GrandProductGadget {
    fn generate_witness(&self, cs: &mut ConstraintSystem) -> Result<()> {
        let Some(first) = self.factors.first() else {
            return Ok(());
        };
        let mut acc: Fp = cs.eval(first)?;
        for (factor, &partial) in self.factors.iter().skip(1).zip(&self.partials) {
            acc *= cs.eval(factor)?;
            cs.set_value(partial, acc)?;
        }
        Ok(())
    }
}
