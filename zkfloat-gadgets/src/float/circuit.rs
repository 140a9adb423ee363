//! A self-contained float circuit: two inputs, one operation, one output.
//!
//! [`FloatCircuit`] builds the constraint system once and can then evaluate
//! any number of input pairs against it, checking satisfiability each time.

use super::add::FloatAddGadget;
use super::mul::FloatMulGadget;
use super::var::{FloatVar, WellFormedGadget};
use crate::error::{GadgetError, Result};
use crate::gadget::Gadget;
use serde::{Deserialize, Serialize};
use std::fmt;
use zkfloat_core::{FloatFormat, FloatValue};
use zkfloat_r1cs::ConstraintSystem;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FloatOp {
    Add,
    Mul,
}

impl fmt::Display for FloatOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FloatOp::Add => write!(f, "add"),
            FloatOp::Mul => write!(f, "mul"),
        }
    }
}

#[derive(Clone, Debug)]
enum OpGadget {
    Add(FloatAddGadget),
    Mul(FloatMulGadget),
}

impl OpGadget {
    fn output(&self) -> &FloatVar {
        match self {
            OpGadget::Add(gadget) => gadget.output(),
            OpGadget::Mul(gadget) => gadget.output(),
        }
    }
}

impl Gadget for OpGadget {
    fn generate_witness(&self, cs: &mut ConstraintSystem) -> Result<()> {
        match self {
            OpGadget::Add(gadget) => gadget.generate_witness(cs),
            OpGadget::Mul(gadget) => gadget.generate_witness(cs),
        }
    }
}

#[derive(Clone, Debug)]
pub struct FloatCircuit {
    format: FloatFormat,
    op: FloatOp,
    cs: ConstraintSystem,
    lhs: FloatVar,
    rhs: FloatVar,
    input_checks: Vec<WellFormedGadget>,
    gadget: OpGadget,
}

impl FloatCircuit {
    /// Build the circuit for `op`, trusting the inputs to be well formed
    pub fn new(format: FloatFormat, op: FloatOp) -> Result<Self> {
        Self::build(format, op, false)
    }

    /// Build the circuit for `op` with range checks on both inputs
    pub fn with_input_checks(format: FloatFormat, op: FloatOp) -> Result<Self> {
        Self::build(format, op, true)
    }

    fn build(format: FloatFormat, op: FloatOp, check_inputs: bool) -> Result<Self> {
        let mut cs = ConstraintSystem::new();
        let lhs = cs.namespace("lhs", FloatVar::alloc);
        let rhs = cs.namespace("rhs", FloatVar::alloc);

        let mut input_checks = Vec::new();
        if check_inputs {
            input_checks.push(cs.namespace("lhs", |cs| lhs.enforce_well_formed(cs, &format))?);
            input_checks.push(cs.namespace("rhs", |cs| rhs.enforce_well_formed(cs, &format))?);
        }

        let gadget = match op {
            FloatOp::Add => OpGadget::Add(FloatAddGadget::new(&mut cs, &format, &lhs, &rhs)?),
            FloatOp::Mul => OpGadget::Mul(FloatMulGadget::new(&mut cs, &format, &lhs, &rhs)?),
        };
        tracing::info!(
            "built float {} circuit ({}): {} constraints",
            op,
            format,
            cs.num_constraints()
        );

        Ok(Self {
            format,
            op,
            cs,
            lhs,
            rhs,
            input_checks,
            gadget,
        })
    }

    /// Assign the inputs, generate the witness, check every constraint and
    /// return the output.
    pub fn evaluate(&mut self, a: &FloatValue, b: &FloatValue) -> Result<FloatValue> {
        self.cs.clear_witness();
        self.lhs.assign(&mut self.cs, a)?;
        self.rhs.assign(&mut self.cs, b)?;
        for check in &self.input_checks {
            check.generate_witness(&mut self.cs)?;
        }
        self.gadget.generate_witness(&mut self.cs)?;
        self.cs.check()?;

        let result = self.gadget.output().value(&self.cs)?;
        tracing::debug!("{} {} {} = {}", a, self.op, b, result);
        Ok(result)
    }

    /// [`FloatCircuit::evaluate`] on native binary32 values
    pub fn evaluate_f32(&mut self, a: f32, b: f32) -> Result<f32> {
        if self.format != FloatFormat::BINARY32 {
            return Err(GadgetError::PreconditionViolated(format!(
                "native f32 evaluation on a {} circuit",
                self.format
            )));
        }
        let result = self.evaluate(&FloatValue::from_f32(a), &FloatValue::from_f32(b))?;
        Ok(result.to_f32()?)
    }

    pub fn format(&self) -> &FloatFormat {
        &self.format
    }

    pub fn op(&self) -> FloatOp {
        self.op
    }

    pub fn inputs(&self) -> (FloatVar, FloatVar) {
        (self.lhs, self.rhs)
    }

    pub fn output(&self) -> FloatVar {
        *self.gadget.output()
    }

    pub fn num_constraints(&self) -> usize {
        self.cs.num_constraints()
    }

    pub fn constraint_system(&self) -> &ConstraintSystem {
        &self.cs
    }

    /// Direct access to the witness, for tampering with an evaluated circuit
    pub fn constraint_system_mut(&mut self) -> &mut ConstraintSystem {
        &mut self.cs
    }
}
