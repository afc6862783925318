//! End-to-end scenarios: expression text in, field values out.

use fieldexpr::{Driver, Kind, Location, ValueType};
use rstest::rstest;

use crate::helpers::assertions::{assert_close, scalars, syntax_code};
use crate::helpers::fixtures::{database_with, scalar, vector};

#[test]
fn test_affine_expression_over_scalar_field() {
    let db = database_with(3, vec![("p", scalar(&[1.0, 2.0, 3.0]))]);
    let mut driver = Driver::new(&db);
    let value = driver.parse("2*p + 1").unwrap();
    assert_eq!(value.value_type(), Some(ValueType::volume(Kind::Scalar)));
    assert_close(&scalars(value), &[3.0, 5.0, 7.0]);
    assert_eq!(driver.end_offset(), 7);
}

#[test]
fn test_magnitude_of_vector_field() {
    let db = database_with(1, vec![("U", vector(&[[3.0, 4.0, 0.0]]))]);
    let mut driver = Driver::new(&db);
    let value = driver.parse("mag(U)").unwrap();
    assert_eq!(value.kind(), Kind::Scalar);
    assert_close(&scalars(value), &[5.0]);
}

#[test]
fn test_conditional_picks_elementwise_maximum() {
    let db = database_with(
        2,
        vec![("a", scalar(&[1.0, 5.0])), ("b", scalar(&[3.0, 2.0]))],
    );
    let mut driver = Driver::new(&db);
    let value = driver.parse("a>b?a:b").unwrap();
    assert_close(&scalars(value), &[3.0, 5.0]);
}

#[test]
fn test_vector_plus_tensor_is_rejected() {
    let db = crate::helpers::fixtures::standard_database();
    let mut driver = Driver::new(&db);
    let err = driver.parse("U + tau").unwrap_err();
    assert_eq!(syntax_code(&err), fieldexpr::ErrorCode::E0403);
    let syntax = err.syntax_error().unwrap();
    assert_eq!(syntax.found, "+");
    assert_eq!(u32::from(syntax.offset()), 2);
    assert!(driver.result().is_none());
}

#[rstest]
#[case("p*p - q", &[-3.0, 3.5, 11.0])]
#[case("(p + q) / 2", &[2.5, 1.25, 0.5])]
#[case("-p + 10", &[9.0, 8.0, 7.0])]
#[case("p > 1 && q > 0 ? 1 : 0", &[0.0, 1.0, 0.0])]
#[case("sqrt(p*p)", &[1.0, 2.0, 3.0])]
#[case("max(p, q)", &[4.0, 2.0, 3.0])]
#[case("U.x + U.y", &[1.0, 7.0, -2.0])]
#[case("U & V", &[0.0, 7.0, -1.0])]
#[case("pi*0 + 3 % 2 == 1 ? p : q", &[1.0, 2.0, 3.0])]
fn test_scalar_expressions(#[case] expression: &str, #[case] expected: &[f64]) {
    let db = crate::helpers::fixtures::standard_database();
    let mut driver = Driver::new(&db);
    let value = driver
        .parse(expression)
        .unwrap_or_else(|e| panic!("{} failed: {}", expression, e));
    assert_close(&scalars(value), expected);
}

#[test]
fn test_logical_entry_point() {
    let db = database_with(3, vec![("p", scalar(&[1.0, 2.0, 3.0]))]);
    let mut driver = Driver::new(&db);
    let mask = driver.parse_logical("p >= 2", Location::Volume).unwrap();
    assert_eq!(mask.kind(), Kind::Logical);
    assert_eq!(mask.truth_values(), Some(vec![false, true, true]));
    assert!(driver.is_logical());
}
