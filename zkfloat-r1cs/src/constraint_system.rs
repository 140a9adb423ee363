//! Rank-1 constraint system
//!
//! Wires live in an arena indexed by [`Variable`]. Each constraint asserts
//! `<A, w> * <B, w> = <C, w>` for linear combinations `A`, `B`, `C` over the
//! witness `w`. Witness values are optional until assigned, so the same
//! system serves the constraint phase (allocation and `enforce`) and the
//! witness phase (`set_value`).
//!
//! Annotations carry the namespace path active at allocation time, e.g.
//! `add/round/tie/inverse`, so a failing constraint points at its gadget.

use crate::error::{R1csError, Result};
use crate::lc::{LinearCombination, Variable};
use serde::{Deserialize, Serialize};
use zkfloat_core::Fp;

/// A single `A * B = C` constraint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    pub a: LinearCombination,
    pub b: LinearCombination,
    pub c: LinearCombination,
    pub annotation: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintSystem {
    values: Vec<Option<Fp>>,
    annotations: Vec<String>,
    constraints: Vec<Constraint>,
    #[serde(skip)]
    namespace: Vec<String>,
}

impl ConstraintSystem {
    pub fn new() -> Self {
        Self {
            values: vec![Some(Fp::ONE)],
            annotations: vec!["ONE".to_string()],
            constraints: Vec::new(),
            namespace: Vec::new(),
        }
    }

    /// Allocate a fresh, unassigned wire
    pub fn alloc(&mut self, annotation: &str) -> Variable {
        let var = Variable(self.values.len());
        self.values.push(None);
        self.annotations.push(self.path(annotation));
        var
    }

    /// Register `a * b = c`
    pub fn enforce(
        &mut self,
        a: impl Into<LinearCombination>,
        b: impl Into<LinearCombination>,
        c: impl Into<LinearCombination>,
        annotation: &str,
    ) {
        let annotation = self.path(annotation);
        self.constraints.push(Constraint {
            a: a.into().simplify(),
            b: b.into().simplify(),
            c: c.into().simplify(),
            annotation,
        });
    }

    /// Run `f` with `name` pushed onto the annotation path
    pub fn namespace<T>(&mut self, name: &str, f: impl FnOnce(&mut Self) -> T) -> T {
        self.namespace.push(name.to_string());
        let result = f(self);
        self.namespace.pop();
        result
    }

    fn path(&self, annotation: &str) -> String {
        if self.namespace.is_empty() {
            annotation.to_string()
        } else {
            format!("{}/{}", self.namespace.join("/"), annotation)
        }
    }

    pub fn set_value(&mut self, var: Variable, value: Fp) -> Result<()> {
        if var == Variable::ONE {
            return Err(R1csError::ConstantReassigned);
        }
        match self.values.get_mut(var.0) {
            Some(slot) => {
                *slot = Some(value);
                Ok(())
            }
            None => Err(R1csError::UnknownVariable { index: var.0 }),
        }
    }

    pub fn value(&self, var: Variable) -> Option<Fp> {
        self.values.get(var.0).copied().flatten()
    }

    pub fn annotation(&self, var: Variable) -> Option<&str> {
        self.annotations.get(var.0).map(String::as_str)
    }

    /// Evaluate a linear combination against the current witness
    pub fn eval(&self, lc: &LinearCombination) -> Result<Fp> {
        let mut missing = None;
        let value = lc.evaluate_with(|var| {
            let value = self.value(var);
            if value.is_none() {
                missing = Some(var);
            }
            value
        });
        match (value, missing) {
            (Some(v), _) => Ok(v),
            (None, Some(var)) => Err(self.unassigned(var)),
            (None, None) => Err(R1csError::UnknownVariable { index: 0 }),
        }
    }

    fn unassigned(&self, var: Variable) -> R1csError {
        match self.annotations.get(var.0) {
            Some(annotation) => R1csError::UnassignedVariable {
                index: var.0,
                annotation: annotation.clone(),
            },
            None => R1csError::UnknownVariable { index: var.0 },
        }
    }

    /// Number of constraints
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Number of wires, including the constant one
    pub fn num_variables(&self) -> usize {
        self.values.len()
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Drop every witness value, keeping the constraints
    pub fn clear_witness(&mut self) {
        for slot in self.values.iter_mut().skip(1) {
            *slot = None;
        }
    }

    /// Check every constraint against the witness.
    ///
    /// Fails on the first constraint that references an unassigned wire or
    /// does not hold.
    pub fn check(&self) -> Result<()> {
        for (index, constraint) in self.constraints.iter().enumerate() {
            let a = self.eval(&constraint.a)?;
            let b = self.eval(&constraint.b)?;
            let c = self.eval(&constraint.c)?;
            if a * b != c {
                tracing::debug!(
                    "constraint {} ({}) failed: {} * {} != {}",
                    index,
                    constraint.annotation,
                    a,
                    b,
                    c
                );
                return Err(R1csError::Unsatisfied {
                    index,
                    annotation: constraint.annotation.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn is_satisfied(&self) -> bool {
        self.check().is_ok()
    }

    /// Annotation of the first failing constraint, if any
    pub fn which_is_unsatisfied(&self) -> Option<&str> {
        self.constraints.iter().find_map(|constraint| {
            let holds = self
                .eval(&constraint.a)
                .and_then(|a| Ok(a * self.eval(&constraint.b)?))
                .and_then(|ab| Ok(ab == self.eval(&constraint.c)?));
            match holds {
                Ok(true) => None,
                _ => Some(constraint.annotation.as_str()),
            }
        })
    }

    /// Serialize constraints and witness
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}

impl Default for ConstraintSystem {
    fn default() -> Self {
        Self::new()
    }
}
