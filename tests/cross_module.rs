//! Cross-module interaction tests
//!
//! Tests the integration between the float encoding, the constraint system
//! and the gadgets: composing pipelines in one system, tampering with
//! witnesses, serialization and error propagation.

use zkfloat_core::{FloatFormat, FloatValue, Fp, FormatError, ZkFloatError};
use zkfloat_gadgets::{
    FloatAddGadget, FloatCircuit, FloatMulGadget, FloatOp, FloatVar, Gadget, GadgetError,
};
use zkfloat_r1cs::{ConstraintSystem, R1csError};

// ============================================================================
// Composed pipelines
// ============================================================================

/// `(a + b) * c` in a single constraint system
struct FusedCircuit {
    cs: ConstraintSystem,
    inputs: [FloatVar; 3],
    add: FloatAddGadget,
    mul: FloatMulGadget,
}

impl FusedCircuit {
    fn new(format: &FloatFormat) -> Self {
        let mut cs = ConstraintSystem::new();
        let inputs = [
            FloatVar::alloc(&mut cs),
            FloatVar::alloc(&mut cs),
            FloatVar::alloc(&mut cs),
        ];
        let add = FloatAddGadget::new(&mut cs, format, &inputs[0], &inputs[1]).unwrap();
        let mul = FloatMulGadget::new(&mut cs, format, add.output(), &inputs[2]).unwrap();
        Self {
            cs,
            inputs,
            add,
            mul,
        }
    }

    fn evaluate(&mut self, values: [f32; 3]) -> FloatValue {
        for (var, value) in self.inputs.iter().zip(values) {
            var.assign(&mut self.cs, &FloatValue::from_f32(value)).unwrap();
        }
        self.add.generate_witness(&mut self.cs).unwrap();
        self.mul.generate_witness(&mut self.cs).unwrap();
        self.cs.check().unwrap();
        self.mul.output().value(&self.cs).unwrap()
    }
}

#[test]
fn test_chained_add_then_mul() {
    let mut circuit = FusedCircuit::new(&FloatFormat::BINARY32);
    for values in [[1.5f32, 2.25, 2.0], [0.1, 0.2, 10.0], [-3.0, 1.0, -0.5], [1e38, 1e38, 0.5]] {
        let [a, b, c] = values;
        let expected = (a + b) * c;
        let result = circuit.evaluate(values);
        if expected.is_finite() {
            assert_eq!(result.to_f32().unwrap(), expected, "({} + {}) * {}", a, b, c);
        } else {
            assert!(result.is_abnormal());
        }
    }
}

#[test]
fn test_abnormal_flows_through_chain() {
    let mut circuit = FusedCircuit::new(&FloatFormat::BINARY32);
    // the sum overflows, and abnormal times zero stays abnormal
    let result = circuit.evaluate([f32::MAX, f32::MAX, 0.0]);
    assert_eq!(result, FloatValue::ABNORMAL);
}

#[test]
fn test_pipelines_share_annotations() {
    let circuit = FusedCircuit::new(&FloatFormat::BFLOAT16);
    let constraints = circuit.cs.constraints();
    assert!(constraints.iter().any(|c| c.annotation.starts_with("float_add/")));
    assert!(constraints.iter().any(|c| c.annotation.starts_with("float_mul/")));
    assert!(constraints
        .iter()
        .all(|c| c.annotation.starts_with("float_add/") || c.annotation.starts_with("float_mul/")));
}

// ============================================================================
// Tampering
// ============================================================================

#[test]
fn test_tampered_exponent_is_unsatisfied() {
    let mut circuit = FloatCircuit::new(FloatFormat::BINARY32, FloatOp::Mul).unwrap();
    circuit.evaluate_f32(3.0, 0.5).unwrap();
    let out = circuit.output();
    let cs = circuit.constraint_system_mut();
    let honest = cs.value(out.exponent).unwrap();
    cs.set_value(out.exponent, honest + Fp::ONE).unwrap();
    match cs.check() {
        Err(R1csError::Unsatisfied { annotation, .. }) => {
            assert_eq!(annotation, "float_mul/out/exponent")
        }
        other => panic!("expected an unsatisfied constraint, got {:?}", other),
    }
}

#[test]
fn test_forged_zero_is_unsatisfied() {
    let mut circuit = FloatCircuit::new(FloatFormat::BINARY32, FloatOp::Add).unwrap();
    circuit.evaluate_f32(1.0, 1.0).unwrap();
    let out = circuit.output();
    let cs = circuit.constraint_system_mut();
    for var in [out.exponent, out.mantissa] {
        cs.set_value(var, Fp::ZERO).unwrap();
    }
    assert!(!cs.is_satisfied());
}

#[test]
fn test_forged_abnormal_is_unsatisfied() {
    let mut circuit = FloatCircuit::new(FloatFormat::BINARY16, FloatOp::Add).unwrap();
    let one = FloatValue::from_bits(&FloatFormat::BINARY16, 0x3c00).unwrap();
    circuit.evaluate(&one, &one).unwrap();
    let out = circuit.output();
    let cs = circuit.constraint_system_mut();
    cs.set_value(out.abnormal, Fp::ONE).unwrap();
    assert_eq!(cs.which_is_unsatisfied(), Some("float_add/out/abnormal"));
}

#[test]
fn test_unassigned_input_names_wire() {
    let circuit = FloatCircuit::new(FloatFormat::BINARY32, FloatOp::Add).unwrap();
    match circuit.constraint_system().check() {
        Err(R1csError::UnassignedVariable { annotation, .. }) => {
            assert!(["lhs/", "rhs/", "float_add/"]
                .iter()
                .any(|prefix| annotation.starts_with(prefix)))
        }
        other => panic!("expected an unassigned wire, got {:?}", other),
    }
}

// ============================================================================
// Serialization
// ============================================================================

#[test]
fn test_serialized_system_stays_satisfied() {
    let mut circuit = FloatCircuit::new(FloatFormat::BINARY16, FloatOp::Mul).unwrap();
    let a = FloatValue::from_bits(&FloatFormat::BINARY16, 0x4248).unwrap();
    let b = FloatValue::from_bits(&FloatFormat::BINARY16, 0xb555).unwrap();
    let result = circuit.evaluate(&a, &b).unwrap();

    let bytes = circuit.constraint_system().to_bytes().unwrap();
    let restored = ConstraintSystem::from_bytes(&bytes).unwrap();
    assert!(restored.is_satisfied());
    assert_eq!(restored.num_constraints(), circuit.num_constraints());
    assert_eq!(circuit.output().value(&restored).unwrap(), result);
}

#[test]
fn test_corrupt_bytes_rejected() {
    assert!(matches!(
        ConstraintSystem::from_bytes(&[0xff, 0x01]),
        Err(R1csError::Serialization(_))
    ));
}

// ============================================================================
// Error propagation
// ============================================================================

#[test]
fn test_invalid_format_rejected_by_gadgets() {
    let binary64 = FloatFormat {
        exponent_bits: 11,
        mantissa_bits: 52,
    };
    assert_eq!(binary64.validate(), Err(FormatError::ExceedsFieldCapacity));

    let mut cs = ConstraintSystem::new();
    let (a, b) = (FloatVar::alloc(&mut cs), FloatVar::alloc(&mut cs));
    assert!(matches!(
        FloatAddGadget::new(&mut cs, &binary64, &a, &b),
        Err(GadgetError::Core(ZkFloatError::InvalidFormat(
            FormatError::ExceedsFieldCapacity
        )))
    ));
    assert!(matches!(
        FloatCircuit::new(binary64, FloatOp::Mul),
        Err(GadgetError::Core(ZkFloatError::InvalidFormat(_)))
    ));
}

#[test]
fn test_narrow_exponent_rejected() {
    let narrow = FloatFormat {
        exponent_bits: 3,
        mantissa_bits: 4,
    };
    assert!(matches!(
        FloatCircuit::new(narrow, FloatOp::Add),
        Err(GadgetError::Core(ZkFloatError::InvalidFormat(
            FormatError::ExponentTooNarrow
        )))
    ));
}

#[test]
fn test_wide_bit_pattern_rejected() {
    assert!(matches!(
        FloatValue::from_bits(&FloatFormat::BINARY16, 0x1_0000),
        Err(ZkFloatError::BitPatternTooWide { .. })
    ));
}

#[test]
fn test_malformed_input_caught_by_input_checks() {
    let mut circuit =
        FloatCircuit::with_input_checks(FloatFormat::BINARY32, FloatOp::Add).unwrap();
    let malformed = FloatValue::new(false, 1 << 9, 1 << 23, false);
    let result = circuit.evaluate(&malformed, &FloatValue::from_f32(1.0));
    assert!(matches!(
        result,
        Err(GadgetError::ValueOutOfRange { gadget: "pack", .. })
    ));
}

// ============================================================================
// Independent circuits
// ============================================================================

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_circuits_are_send_and_sync() {
    assert_send_sync::<ConstraintSystem>();
    assert_send_sync::<FloatCircuit>();
    assert_send_sync::<Fp>();
}

#[test]
fn test_circuits_on_separate_threads() {
    let handles: Vec<_> = [FloatOp::Add, FloatOp::Mul]
        .into_iter()
        .map(|op| {
            std::thread::spawn(move || {
                let mut circuit = FloatCircuit::new(FloatFormat::BINARY32, op).unwrap();
                circuit.evaluate_f32(6.0, 0.75).unwrap()
            })
        })
        .collect();
    let results: Vec<f32> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results, vec![6.75, 4.5]);
}
