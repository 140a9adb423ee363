//! Stress tests: long evaluation runs against native binary32 arithmetic
//!
//! Inputs come from a fixed xorshift sequence so failures reproduce.

use proptest::prelude::*;
use zkfloat_core::{FloatFormat, FloatValue};
use zkfloat_gadgets::{FloatCircuit, FloatOp};

struct XorShift(u64);

impl XorShift {
    fn next_u32(&mut self) -> u32 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        (self.0 >> 32) as u32
    }

    /// Finite binary32 value with an exponent field in `[lo, hi)`
    fn next_f32(&mut self, lo: u32, hi: u32) -> f32 {
        let bits = self.next_u32();
        let exponent = lo + (bits >> 8) % (hi - lo);
        f32::from_bits((bits & 0x8000_0000) | (exponent << 23) | (bits & 0x007f_ffff))
    }
}

fn check(result: FloatValue, expected: f32, what: &str) {
    if expected.is_finite() {
        let got = result.to_f32().unwrap();
        assert!(
            got.to_bits() == expected.to_bits() || (got == 0.0 && expected == 0.0),
            "{}: expected {:e}, got {:e}",
            what,
            expected,
            got
        );
    } else {
        assert!(result.is_abnormal(), "{}: expected Inf/NaN, got {}", what, result);
    }
}

fn run(op: FloatOp, lo: u32, hi: u32, count: usize, seed: u64) {
    let mut circuit = FloatCircuit::new(FloatFormat::BINARY32, op).unwrap();
    let mut rng = XorShift(seed);
    for _ in 0..count {
        let (a, b) = (rng.next_f32(lo, hi), rng.next_f32(lo, hi));
        let result = circuit.evaluate_f32(a, b);
        let expected = match op {
            FloatOp::Add => a + b,
            FloatOp::Mul => a * b,
        };
        let what = format!("{:e} {} {:e}", a, op, b);
        match result {
            Ok(got) if expected.is_finite() => {
                assert!(
                    got.to_bits() == expected.to_bits() || (got == 0.0 && expected == 0.0),
                    "{}: expected {:e}, got {:e}",
                    what,
                    expected,
                    got
                );
            }
            Ok(got) => assert!(got.is_nan(), "{}: expected Inf/NaN, got {:e}", what, got),
            Err(e) => panic!("{}: {}", what, e),
        }
    }
}

// ============================================================================
// Addition
// ============================================================================

#[test]
fn test_add_similar_magnitudes() {
    run(FloatOp::Add, 120, 135, 2000, 0x9e37_79b9_7f4a_7c15);
}

#[test]
fn test_add_full_range() {
    run(FloatOp::Add, 0, 255, 2000, 0x2545_f491_4f6c_dd1d);
}

#[test]
fn test_add_near_overflow() {
    run(FloatOp::Add, 250, 255, 500, 0x1234_5678_9abc_def1);
}

#[test]
fn test_add_subnormal_range() {
    run(FloatOp::Add, 0, 3, 500, 0x0fed_cba9_8765_4321);
}

// ============================================================================
// Multiplication
// ============================================================================

#[test]
fn test_mul_similar_magnitudes() {
    run(FloatOp::Mul, 110, 145, 2000, 0x5851_f42d_4c95_7f2d);
}

#[test]
fn test_mul_full_range() {
    run(FloatOp::Mul, 0, 255, 2000, 0x1405_7b7e_f767_814f);
}

#[test]
fn test_mul_subnormal_boundary() {
    // products landing around the smallest normal exponent
    run(FloatOp::Mul, 40, 90, 2000, 0x8c6d_4bf1_6e3a_9d05);
}

// ============================================================================
// Repeated use
// ============================================================================

#[test]
fn test_accumulate_sum() {
    let mut circuit = FloatCircuit::new(FloatFormat::BINARY32, FloatOp::Add).unwrap();
    let mut native = 0.0f32;
    let mut acc = FloatValue::ZERO;
    for i in 1..=500 {
        let term = 1.0 / i as f32;
        native += term;
        acc = circuit.evaluate(&acc, &FloatValue::from_f32(term)).unwrap();
        check(acc, native, "harmonic sum");
    }
}

#[test]
fn test_accumulate_product() {
    let mut circuit = FloatCircuit::new(FloatFormat::BINARY32, FloatOp::Mul).unwrap();
    let mut native = 1.0f32;
    let mut acc = FloatValue::from_f32(1.0);
    for _ in 0..1000 {
        native *= 1.1;
        acc = circuit.evaluate(&acc, &FloatValue::from_f32(1.1)).unwrap();
        check(acc, native, "power of 1.1");
    }
    assert!(acc.is_abnormal());
}

#[test]
fn test_constraint_count_is_stable() {
    let mut circuit = FloatCircuit::new(FloatFormat::BINARY32, FloatOp::Add).unwrap();
    let before = circuit.num_constraints();
    for x in [1.0f32, -2.0, 1e-40, f32::INFINITY] {
        circuit.evaluate_f32(x, 3.0).unwrap();
    }
    assert_eq!(circuit.num_constraints(), before);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_add_commutes(a in any::<u32>(), b in any::<u32>()) {
        let mut circuit = FloatCircuit::new(FloatFormat::BINARY32, FloatOp::Add).unwrap();
        let (x, y) = (f32::from_bits(a), f32::from_bits(b));
        let ab = circuit.evaluate_f32(x, y).unwrap();
        let ba = circuit.evaluate_f32(y, x).unwrap();
        prop_assert_eq!(ab.to_bits(), ba.to_bits());
    }

    #[test]
    fn prop_mul_commutes(a in any::<u32>(), b in any::<u32>()) {
        let mut circuit = FloatCircuit::new(FloatFormat::BINARY32, FloatOp::Mul).unwrap();
        let (x, y) = (f32::from_bits(a), f32::from_bits(b));
        let ab = circuit.evaluate_f32(x, y).unwrap();
        let ba = circuit.evaluate_f32(y, x).unwrap();
        prop_assert_eq!(ab.to_bits(), ba.to_bits());
    }
}
