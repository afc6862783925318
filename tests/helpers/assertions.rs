//! Assertion helpers for evaluated fields.

use fieldexpr::{ErrorCode, EvalError, TypedField};

pub const TOLERANCE: f64 = 1e-9;

/// Scalar (or logical) values of a field.
pub fn scalars(field: &TypedField) -> Vec<f64> {
    field
        .scalar_values()
        .unwrap_or_else(|| panic!("expected scalar storage, got {:?}", field.kind()))
        .to_vec()
}

pub fn assert_close(actual: &[f64], expected: &[f64]) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "length differs: {:?} vs {:?}",
        actual,
        expected
    );
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            (a - e).abs() <= TOLERANCE * (1.0 + e.abs()),
            "element {} differs: {} vs {} (in {:?})",
            i,
            a,
            e,
            actual
        );
    }
}

/// Elementwise equality of two fields of the same storage.
pub fn assert_fields_close(actual: &TypedField, expected: &TypedField) {
    assert_eq!(actual.kind(), expected.kind());
    assert_eq!(actual.location(), expected.location());
    match (actual.scalar_values(), expected.scalar_values()) {
        (Some(a), Some(e)) => return assert_close(a, e),
        (None, None) => {}
        _ => panic!("storage differs: {:?} vs {:?}", actual, expected),
    }
    if let (Some(a), Some(e)) = (actual.vector_values(), expected.vector_values()) {
        let flat = |v: &[nalgebra::Vector3<f64>]| v.iter().flat_map(|x| x.iter().copied()).collect::<Vec<_>>();
        return assert_close(&flat(a), &flat(e));
    }
    if let (Some(a), Some(e)) = (actual.tensor_values(), expected.tensor_values()) {
        let flat = |v: &[nalgebra::Matrix3<f64>]| v.iter().flat_map(|x| x.iter().copied()).collect::<Vec<_>>();
        return assert_close(&flat(a), &flat(e));
    }
    panic!("storage differs: {:?} vs {:?}", actual, expected);
}

/// Code of a lexical or syntax error.
pub fn syntax_code(err: &EvalError) -> ErrorCode {
    err.syntax_error()
        .unwrap_or_else(|| panic!("expected a syntax error, got {:?}", err))
        .code
}
